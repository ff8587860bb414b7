//! Citations used by the library materials.

use crate::references::Reference;

pub fn choong_1975() -> Reference {
    Reference::new("choong1975", "report")
        .author("Choong, S. K")
        .title("Thermophysical Properties of Stainless Steels")
        .year("1975")
        .url("https://www.osti.gov/servlets/purl/4152287")
}

pub fn iter_ss316_density() -> Reference {
    Reference::new("ss316_density", "report").title("ITER_D_222RLN v3.3 Table A.S03.2.4-1")
}

pub fn iapws_if97() -> Reference {
    Reference::new("iapws_if97", "standard")
        .author("International Association for the Properties of Water and Steam")
        .title(
            "Revised Release on the IAPWS Industrial Formulation 1997 \
             for the Thermodynamic Properties of Water and Steam",
        )
        .year("2007")
}
