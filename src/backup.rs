pub mod folder;
pub mod message;
pub mod project;
pub mod worker;

use std::{fs, io, path::Path, path::PathBuf};

use jiff::Zoned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Source folder does not exist: {0}")]
    SourceMissing(PathBuf),
    #[error("Backup does not exist: {0}")]
    BackupMissing(PathBuf),
    #[error("Could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No files found in source folder: {0}")]
    NoFiles(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("Failed to walk {0}")]
    Walk(#[from] walkdir::Error),
}

/// Local timestamp used in backup names, formatted with `strftime` `format`.
pub(crate) fn timestamp(format: &str) -> String {
    Zoned::now().strftime(format).to_string()
}

pub(crate) fn ensure_dir(path: &Path) -> Result<(), BackupError> {
    fs::create_dir_all(path).map_err(|source| BackupError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
