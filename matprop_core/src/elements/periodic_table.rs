//! Periodic table data: standard atomic weights (amu) for H to Pu, natural
//! isotopic abundances for the elements common in structural and fusion
//! materials, and isotope masses.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Symbol and standard atomic weight, indexed by `Z - 1`
const STANDARD_WEIGHTS: [(&str, f64); 94] = [
    ("H", 1.00794),
    ("He", 4.002602),
    ("Li", 6.941),
    ("Be", 9.012182),
    ("B", 10.811),
    ("C", 12.0107),
    ("N", 14.0067),
    ("O", 15.9994),
    ("F", 18.9984032),
    ("Ne", 20.1797),
    ("Na", 22.98977),
    ("Mg", 24.305),
    ("Al", 26.981538),
    ("Si", 28.0855),
    ("P", 30.973761),
    ("S", 32.065),
    ("Cl", 35.453),
    ("Ar", 39.948),
    ("K", 39.0983),
    ("Ca", 40.078),
    ("Sc", 44.95591),
    ("Ti", 47.867),
    ("V", 50.9415),
    ("Cr", 51.9961),
    ("Mn", 54.938049),
    ("Fe", 55.845),
    ("Co", 58.9332),
    ("Ni", 58.6934),
    ("Cu", 63.546),
    ("Zn", 65.409),
    ("Ga", 69.723),
    ("Ge", 72.64),
    ("As", 74.9216),
    ("Se", 78.96),
    ("Br", 79.904),
    ("Kr", 83.798),
    ("Rb", 85.4678),
    ("Sr", 87.62),
    ("Y", 88.90585),
    ("Zr", 91.224),
    ("Nb", 92.90638),
    ("Mo", 95.94),
    ("Tc", 98.0),
    ("Ru", 101.07),
    ("Rh", 102.9055),
    ("Pd", 106.42),
    ("Ag", 107.8682),
    ("Cd", 112.411),
    ("In", 114.818),
    ("Sn", 118.71),
    ("Sb", 121.76),
    ("Te", 127.6),
    ("I", 126.90447),
    ("Xe", 131.293),
    ("Cs", 132.90545),
    ("Ba", 137.327),
    ("La", 138.9055),
    ("Ce", 140.116),
    ("Pr", 140.90765),
    ("Nd", 144.24),
    ("Pm", 145.0),
    ("Sm", 150.36),
    ("Eu", 151.964),
    ("Gd", 157.25),
    ("Tb", 158.92534),
    ("Dy", 162.5),
    ("Ho", 164.93032),
    ("Er", 167.259),
    ("Tm", 168.93421),
    ("Yb", 173.04),
    ("Lu", 174.967),
    ("Hf", 178.49),
    ("Ta", 180.9479),
    ("W", 183.84),
    ("Re", 186.207),
    ("Os", 190.23),
    ("Ir", 192.217),
    ("Pt", 195.078),
    ("Au", 196.96655),
    ("Hg", 200.59),
    ("Tl", 204.3833),
    ("Pb", 207.2),
    ("Bi", 208.98038),
    ("Po", 209.0),
    ("At", 210.0),
    ("Rn", 222.0),
    ("Fr", 223.0),
    ("Ra", 226.0),
    ("Ac", 227.0),
    ("Th", 232.0381),
    ("Pa", 231.03588),
    ("U", 238.02891),
    ("Np", 237.0),
    ("Pu", 244.0),
];

/// One naturally occurring isotope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalIsotope {
    pub mass_number: u32,
    pub abundance: f64,
    /// Isotope mass (amu)
    pub mass: f64,
}

const fn iso(mass_number: u32, abundance: f64, mass: f64) -> NaturalIsotope {
    NaturalIsotope {
        mass_number,
        abundance,
        mass,
    }
}

const NATURAL_ABUNDANCES: &[(&str, &[NaturalIsotope])] = &[
    ("H", &[iso(1, 0.999885, 1.00782503207), iso(2, 0.000115, 2.0141017778)]),
    ("He", &[iso(3, 1.34e-6, 3.0160293191), iso(4, 0.99999866, 4.00260325415)]),
    ("Li", &[iso(6, 0.0759, 6.015122795), iso(7, 0.9241, 7.01600455)]),
    ("Be", &[iso(9, 1.0, 9.0121822)]),
    ("B", &[iso(10, 0.199, 10.012937), iso(11, 0.801, 11.0093054)]),
    ("C", &[iso(12, 0.9893, 12.0), iso(13, 0.0107, 13.0033548378)]),
    ("N", &[iso(14, 0.99636, 14.0030740048), iso(15, 0.00364, 15.0001088982)]),
    (
        "O",
        &[
            iso(16, 0.99757, 15.99491461956),
            iso(17, 0.00038, 16.9991317),
            iso(18, 0.00205, 17.999161),
        ],
    ),
    ("Al", &[iso(27, 1.0, 26.98153863)]),
    (
        "Si",
        &[
            iso(28, 0.92223, 27.9769265325),
            iso(29, 0.04685, 28.9764947),
            iso(30, 0.03092, 29.97377017),
        ],
    ),
    (
        "Cr",
        &[
            iso(50, 0.04345, 49.9460442),
            iso(52, 0.83789, 51.9405075),
            iso(53, 0.09501, 52.9406494),
            iso(54, 0.02365, 53.9388804),
        ],
    ),
    (
        "Fe",
        &[
            iso(54, 0.05845, 53.9396105),
            iso(56, 0.91754, 55.9349375),
            iso(57, 0.02119, 56.935394),
            iso(58, 0.00282, 57.9332756),
        ],
    ),
    (
        "Ni",
        &[
            iso(58, 0.68077, 57.9353429),
            iso(60, 0.26223, 59.9307864),
            iso(61, 0.011399, 60.931056),
            iso(62, 0.036346, 61.9283451),
            iso(64, 0.009255, 63.927966),
        ],
    ),
    ("Cu", &[iso(63, 0.6915, 62.9295975), iso(65, 0.3085, 64.9277895)]),
    (
        "Mo",
        &[
            iso(92, 0.1477, 91.906811),
            iso(94, 0.0923, 93.9050883),
            iso(95, 0.159, 94.9058421),
            iso(96, 0.1668, 95.9046795),
            iso(97, 0.0956, 96.9060215),
            iso(98, 0.2419, 97.9054082),
            iso(100, 0.0967, 99.907477),
        ],
    ),
    (
        "W",
        &[
            iso(180, 0.0012, 179.946704),
            iso(182, 0.265, 181.9482042),
            iso(183, 0.1431, 182.950223),
            iso(184, 0.3064, 183.9509312),
            iso(186, 0.2843, 185.9543641),
        ],
    ),
];

/// Masses of isotopes with no natural abundance entry
const EXTRA_ISOTOPE_MASSES: &[(&str, u32, f64)] = &[
    ("H", 3, 3.0160492),
    ("Th", 232, 232.0380553),
    ("U", 235, 235.0439299),
    ("U", 238, 238.0507882),
    ("Pu", 239, 239.0521634),
];

/// Atomic number and standard weight by symbol
static BY_SYMBOL: Lazy<HashMap<&'static str, (u32, f64)>> = Lazy::new(|| {
    STANDARD_WEIGHTS
        .iter()
        .enumerate()
        .map(|(i, (symbol, weight))| (*symbol, (i as u32 + 1, *weight)))
        .collect()
});

static NATURAL: Lazy<HashMap<&'static str, &'static [NaturalIsotope]>> =
    Lazy::new(|| NATURAL_ABUNDANCES.iter().copied().collect());

/// Atomic number of `symbol`
pub fn atomic_number(symbol: &str) -> Option<u32> {
    BY_SYMBOL.get(symbol).map(|(z, _)| *z)
}

/// Standard atomic weight (amu) of `symbol`
pub fn standard_weight(symbol: &str) -> Option<f64> {
    BY_SYMBOL.get(symbol).map(|(_, w)| *w)
}

/// Element symbol for atomic number `z`
pub fn symbol(z: u32) -> Option<&'static str> {
    let index = usize::try_from(z).ok()?.checked_sub(1)?;
    STANDARD_WEIGHTS.get(index).map(|(s, _)| *s)
}

/// Naturally occurring isotopes of `symbol`; empty if no data is tabulated
pub fn natural_isotopes(symbol: &str) -> &'static [NaturalIsotope] {
    NATURAL.get(symbol).copied().unwrap_or(&[])
}

/// Mass of an isotope (amu), falling back to the mass number
pub fn isotope_mass(symbol: &str, mass_number: u32) -> f64 {
    natural_isotopes(symbol)
        .iter()
        .find(|i| i.mass_number == mass_number)
        .map(|i| i.mass)
        .or_else(|| {
            EXTRA_ISOTOPE_MASSES
                .iter()
                .find(|(s, a, _)| *s == symbol && *a == mass_number)
                .map(|(_, _, m)| *m)
        })
        .unwrap_or(mass_number as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(atomic_number("Fe"), Some(26));
        assert_eq!(atomic_number("Pu"), Some(94));
        assert_eq!(symbol(8), Some("O"));
        assert_eq!(symbol(0), None);
        assert_eq!(standard_weight("C"), Some(12.0107));
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn test_abundances_sum_to_one() {
        for (symbol, isotopes) in NATURAL_ABUNDANCES {
            let total: f64 = isotopes.iter().map(|i| i.abundance).sum();
            assert!((total - 1.0).abs() < 1e-3, "{} abundances sum to {}", symbol, total);
        }
    }

    #[test]
    fn test_isotope_mass() {
        assert_eq!(isotope_mass("H", 2), 2.0141017778);
        assert_eq!(isotope_mass("U", 235), 235.0439299);
        assert_eq!(isotope_mass("Sn", 120), 120.0);
    }
}
