//! File formats
//!
//! Each format converts between file bytes and a [`Catalog`]. The format is
//! chosen from the file extension:
//!
//! | extension | format | load | save |
//! |---|---|---|---|
//! | `.ts` | Qt Linguist translation source (XML) | yes | yes |
//! | `.qph` | Qt Linguist phrase book (XML) | yes | yes |
//! | `.qm` | compiled Qt translation (binary) | no | yes |
//!
//! # Example
//!
//! ```ignore
//! use linguist_model::format::{load_catalog, save_catalog, ConversionOptions};
//!
//! let catalog = load_catalog(Path::new("app_de.ts"))?;
//! save_catalog(&catalog, Path::new("app_de.qph"), &ConversionOptions::default())?;
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{LinguistError, Result};

pub mod qm;
pub mod qph;
pub mod ts;

pub use qm::{QmFormat, ReleaseReport, SaveMode};
pub use qph::QphFormat;
pub use ts::TsFormat;

/// Settings that influence how a catalog is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionOptions {
    /// Log a summary of what was written
    pub verbose: bool,
    /// Leave unfinished messages out of compiled output
    pub ignore_unfinished: bool,
    pub save_mode: SaveMode,
    /// Compiled output is looked up by message id instead of source text
    pub id_based: bool,
}

/// A translation file format
pub trait CatalogFormat: Sync {
    /// File extension without the dot, lower case
    fn extension(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn can_load(&self) -> bool {
        true
    }

    /// Parses file content. `path` is only used in error messages.
    fn load(&self, data: &[u8], path: &Path) -> Result<Catalog>;

    /// Serializes a catalog to file content.
    fn save(&self, catalog: &Catalog, options: &ConversionOptions, path: &Path) -> Result<Vec<u8>>;
}

static FORMATS: [&dyn CatalogFormat; 3] = [&TsFormat, &QphFormat, &QmFormat];

/// The format registered for the extension of `path`, if any
pub fn format_for_path(path: &Path) -> Option<&'static dyn CatalogFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    FORMATS.iter().copied().find(|f| f.extension() == ext)
}

/// Reads and parses a translation file, picking the format by extension.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let format = format_for_path(path)
        .filter(|f| f.can_load())
        .ok_or_else(|| LinguistError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
    let data = fs::read(path).map_err(|e| LinguistError::io(path, e))?;
    debug!(
        "Loading '{}' as {} ({} bytes)",
        path.display(),
        format.description(),
        data.len()
    );
    format.load(&data, path)
}

/// Serializes a catalog and writes it to `path`. Nothing is written when
/// serialization fails.
pub fn save_catalog(catalog: &Catalog, path: &Path, options: &ConversionOptions) -> Result<()> {
    let format = format_for_path(path).ok_or_else(|| LinguistError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let data = format.save(catalog, options, path)?;
    fs::write(path, &data).map_err(|e| LinguistError::io(path, e))?;
    debug!(
        "Saved '{}' as {} ({} bytes)",
        path.display(),
        format.description(),
        data.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TranslatorMessage;

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Path::new("a/b_de.ts")).unwrap().extension(), "ts");
        assert_eq!(format_for_path(Path::new("BOOK.QPH")).unwrap().extension(), "qph");
        assert_eq!(format_for_path(Path::new("out.qm")).unwrap().extension(), "qm");
        assert!(format_for_path(Path::new("messages.po")).is_none());
        assert!(format_for_path(Path::new("noextension")).is_none());
    }

    #[test]
    fn test_qm_cannot_be_loaded() {
        let err = load_catalog(Path::new("does-not-matter.qm")).unwrap_err();
        assert!(matches!(err, LinguistError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("missing.ts")).unwrap_err();
        assert!(matches!(err, LinguistError::Io { .. }));
    }

    #[test]
    fn test_save_and_load_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.qph");

        let mut catalog = Catalog::new();
        catalog.language_code = "fr".to_string();
        catalog.append(TranslatorMessage::new("", "Cancel", "").with_translation("Annuler"));
        save_catalog(&catalog, &path, &ConversionOptions::default()).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.language_code, "fr");
        assert_eq!(loaded.messages()[0].translation(), "Annuler");
    }

    #[test]
    fn test_save_to_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("book.qph");
        let err = save_catalog(&Catalog::new(), &path, &ConversionOptions::default()).unwrap_err();
        assert!(matches!(err, LinguistError::Io { .. }));
    }
}
