//! # File I/O Module
//!
//! Saves and loads [`MaterialDocument`]s as JSON with:
//! - **Atomic saves**: Write to a `.tmp` sibling, sync, rename to prevent corruption
//! - **Version validation**: Refuse documents written by an incompatible schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use matprop_core::file_io::{load_material, save_material};
//! use matprop_core::material::material;
//! use matprop_core::properties::props;
//! use std::path::Path;
//!
//! let water = material("Water")
//!     .elements("H2O")
//!     .properties(props().density((1.0, "g/cm^3")).build()?)
//!     .build()?
//!     .instantiate();
//!
//! save_material(&water, Path::new("water.json"))?;
//! let loaded = load_material(Path::new("water.json"))?;
//! assert_eq!(loaded.name(), "Water");
//! # Ok::<(), matprop_core::errors::MatError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::converters::ConverterRegistry;
use crate::errors::{MatError, MatResult};
use crate::material::document::SCHEMA_VERSION;
use crate::material::{Material, MaterialDocument};

/// Save a material with atomic write semantics.
///
/// The save process:
/// 1. Build the document and serialize it to JSON
/// 2. Write to a temporary file (`<ext>.tmp`)
/// 3. Sync to disk (fsync)
/// 4. Rename over `path`
///
/// Function-valued properties cannot be stored; the save then fails with
/// `NotImplemented` before anything is written.
pub fn save_material(material: &Material, path: &Path) -> MatResult<()> {
    let json = material.to_document()?.to_json()?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        MatError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        MatError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        MatError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        MatError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(material = material.name(), path = %path.display(), "Saved material");
    Ok(())
}

/// Read and version-check a material document without rebuilding it
pub fn load_document(path: &Path) -> MatResult<MaterialDocument> {
    let mut file = File::open(path)
        .map_err(|e| MatError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| MatError::file_error("read", path.display().to_string(), e.to_string()))?;

    let document: MaterialDocument = serde_json::from_str(&contents).map_err(|e| {
        MatError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&document.version)?;
    Ok(document)
}

/// Load a material, restoring converters from the built-in registry
pub fn load_material(path: &Path) -> MatResult<Material> {
    load_material_with(path, &ConverterRegistry::default())
}

/// Load a material, restoring converters from `registry`
pub fn load_material_with(path: &Path, registry: &ConverterRegistry) -> MatResult<Material> {
    load_document(path)?.into_material(registry)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let extension = tmp
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp.set_extension(extension);
    tmp
}

/// Validate that a document version is compatible with the current schema.
fn validate_version(file_version: &str) -> MatResult<()> {
    let mismatch = || MatError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // 0.x: a newer minor version may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::OperationalConditions;
    use crate::converters::McnpConverter;
    use crate::material::material;
    use crate::properties::{props, PropertySource};
    use std::env::temp_dir;

    fn temp_material_path(name: &str) -> PathBuf {
        temp_dir().join(format!("matprop_test_{}.json", name))
    }

    fn water() -> Material {
        material("Water")
            .elements("H2O")
            .properties(props().density((1.0, "g/cm^3")).build().unwrap())
            .converter(McnpConverter::new().material_id(5))
            .build()
            .unwrap()
            .instantiate()
    }

    #[test]
    fn test_tmp_path_generation() {
        assert_eq!(tmp_path_for(Path::new("/data/water.json")), Path::new("/data/water.json.tmp"));
        assert_eq!(tmp_path_for(Path::new("/data/water")), Path::new("/data/water.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_material_path("roundtrip");

        save_material(&water(), &path).unwrap();
        let loaded = load_material(&path).unwrap();

        let cond = OperationalConditions::new(300.0).unwrap();
        assert_eq!(loaded.name(), "Water");
        assert!((loaded.density(&cond).unwrap().as_scalar().unwrap() - 1000.0).abs() < 1e-9);
        assert!(loaded.convert("mcnp", &cond).unwrap().as_card().unwrap().contains("M5 "));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_material_path("atomic");

        save_material(&water(), &path).unwrap();

        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_function_property_writes_nothing() {
        let path = temp_material_path("function");
        let m = material("Fn")
            .properties(
                props()
                    .density(PropertySource::function(|c| Ok(c.temperature() * 1.0)))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
            .instantiate();
        assert_eq!(save_material(&m, &path).unwrap_err().error_code(), "NOT_IMPLEMENTED");
        assert!(!path.exists());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.0.5").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_material_path("newer");
        let mut doc = water().to_document().unwrap();
        doc.version = "0.9.0".to_string();
        fs::write(&path, doc.to_json().unwrap()).unwrap();

        let err = load_material(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_material(Path::new("/nonexistent/matprop.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_material_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_material(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }
}
