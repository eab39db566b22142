use std::{fs, io::ErrorKind, path::Path};

use crate::{Error, SeedData};

/// The result of reading a seed file.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedLoad {
    /// The parsed document, empty if the file does not exist.
    pub data: SeedData,
    /// Set when the file was missing, so the caller can tell the user.
    pub warning: Option<String>,
}

/// Read and parse the seed file at `path`.
///
/// A missing file is not an error: it yields an empty document and a warning,
/// so the app can start with an empty store.
///
/// # Errors
/// Returns [Error::InvalidSeedFile] if the file exists but cannot be read or is
/// not a valid seed document.
pub fn load_seed_file(path: &Path) -> Result<SeedLoad, Error> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            let warning = format!(
                "The seed file {} was not found, no categories, subcategories or users were loaded.",
                path.display()
            );
            tracing::warn!("{warning}");

            return Ok(SeedLoad {
                data: SeedData::default(),
                warning: Some(warning),
            });
        }
        Err(error) => {
            tracing::error!("could not read seed file {}: {error}", path.display());
            return Err(Error::InvalidSeedFile(format!(
                "{} could not be read: {error}",
                path.display()
            )));
        }
    };

    let data = serde_json::from_str(&text).map_err(|error| {
        tracing::error!("could not parse seed file {}: {error}", path.display());
        Error::InvalidSeedFile(format!("{} is not a valid seed file: {error}", path.display()))
    })?;

    Ok(SeedLoad {
        data,
        warning: None,
    })
}
