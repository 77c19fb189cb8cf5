use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{info, warn};
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::{ensure_dir, timestamp, worker::BackupHost, BackupError};

/// Zips a folder into `<dest>/<folder>_backup_<yyyyMMdd_HHmmss>.zip`.
pub struct ZipFolderBackup {
    /// Used when a request comes without a destination.
    pub default_destination: PathBuf,
}

impl ZipFolderBackup {
    pub fn new<P: Into<PathBuf>>(default_destination: P) -> ZipFolderBackup {
        ZipFolderBackup {
            default_destination: default_destination.into(),
        }
    }

    pub fn archive_name(folder_name: &str) -> String {
        format!("{}_backup_{}.zip", folder_name, timestamp("%Y%m%d_%H%M%S"))
    }
}

impl BackupHost for ZipFolderBackup {
    fn create_folder_backup(
        &self,
        source: &Path,
        destination: Option<&Path>,
    ) -> Result<PathBuf, BackupError> {
        if !source.is_dir() {
            return Err(BackupError::SourceMissing(source.to_path_buf()));
        }
        let source = source.canonicalize()?;
        let folder_name = source
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "folder".to_string());

        let dest_dir = destination.unwrap_or(self.default_destination.as_path());
        ensure_dir(dest_dir)?;

        let files = list_files(&source)?;
        if files.is_empty() {
            warn!("No files found in source folder: {}", source.display());
            return Err(BackupError::NoFiles(source));
        }

        let zip_path = dest_dir.join(ZipFolderBackup::archive_name(&folder_name));
        info!(
            "Creating backup of {} files: {}",
            files.len(),
            zip_path.display()
        );
        write_zip(&zip_path, &source, &files)?;
        info!("Backup successfully created: {}", zip_path.display());
        Ok(zip_path)
    }
}

/// All regular files under `root`, hidden ones included, in a stable order.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, BackupError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Archive entry name: the path relative to `root`, '/' separated.
fn entry_name(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/")
}

/// Entries this large need ZIP64 headers.
pub fn needs_zip64(len: u64) -> bool {
    len >= u32::MAX as u64
}

/// Write the archive under `<zip_path>.partial` and move it into place once
/// complete.  On failure the partial file is removed, so `zip_path` only ever
/// holds a finished archive.
fn write_zip(zip_path: &Path, root: &Path, files: &[PathBuf]) -> Result<(), BackupError> {
    let mut partial = zip_path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    match write_entries(&partial, root, files) {
        Ok(()) => {
            fs::rename(&partial, zip_path)?;
            Ok(())
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&partial) {
                warn!("Could not remove {}: {}", partial.display(), rm);
            }
            Err(e)
        }
    }
}

fn write_entries(path: &Path, root: &Path, files: &[PathBuf]) -> Result<(), BackupError> {
    let mut zip = ZipWriter::new(File::create(path)?);
    for file in files {
        let mut input = File::open(file)?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(needs_zip64(input.metadata()?.len()));
        zip.start_file(entry_name(root, file), options)?;
        io::copy(&mut input, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{error::Error, io::Read};

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn zip_folder() -> Result<(), Box<dyn Error>> {
        let tmp = tempfile::tempdir()?;
        let source = tmp.path().join("project");
        fs::create_dir_all(source.join("data/sub"))?;
        fs::write(source.join("project.qgs"), "<qgis/>")?;
        fs::write(source.join("data/parcels.gpkg"), "gpkg")?;
        fs::write(source.join("data/sub/.hidden"), "h")?;
        let dest = tmp.path().join("backups");

        let host = ZipFolderBackup::new(tmp.path().join("unused"));
        let path = host.create_folder_backup(&source, Some(dest.as_path()))?;
        assert!(path.starts_with(&dest));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("project_backup_"));
        assert!(name.ends_with(".zip"));

        let mut archive = ZipArchive::new(File::open(&path)?)?;
        let mut names: Vec<String> = archive.file_names().map(|s| s.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["data/parcels.gpkg", "data/sub/.hidden", "project.qgs"]
        );
        let mut content = String::new();
        archive.by_name("project.qgs")?.read_to_string(&mut content)?;
        assert_eq!(content, "<qgis/>");
        Ok(())
    }

    #[test]
    fn default_destination_is_created() -> Result<(), Box<dyn Error>> {
        let tmp = tempfile::tempdir()?;
        let source = tmp.path().join("p");
        fs::create_dir_all(&source)?;
        fs::write(source.join("a.txt"), "a")?;
        let default = tmp.path().join("SIGPACGO_Backups");

        let host = ZipFolderBackup::new(&default);
        let path = host.create_folder_backup(&source, None)?;
        assert!(default.is_dir());
        assert_eq!(path.parent(), Some(default.as_path()));
        Ok(())
    }

    #[test]
    fn failed_write_leaves_no_archive() -> Result<(), Box<dyn Error>> {
        let tmp = tempfile::tempdir()?;
        let source = tmp.path().join("p");
        fs::create_dir_all(&source)?;
        fs::write(source.join("a.txt"), "a")?;
        let out = tmp.path().join("out");
        fs::create_dir_all(&out)?;

        // b.txt vanished between listing and archiving
        let files = vec![source.join("a.txt"), source.join("b.txt")];
        let zip_path = out.join("p_backup_20240101_120000.zip");
        assert!(write_zip(&zip_path, &source, &files).is_err());
        assert_eq!(fs::read_dir(&out)?.count(), 0);
        Ok(())
    }

    #[test]
    fn zip64_threshold() {
        assert!(!needs_zip64(0));
        assert!(!needs_zip64(u32::MAX as u64 - 1));
        assert!(needs_zip64(u32::MAX as u64));
        assert!(needs_zip64(5 * 1024 * 1024 * 1024));
    }

    #[test]
    fn missing_source() {
        let host = ZipFolderBackup::new("/tmp");
        let res = host.create_folder_backup(Path::new("/nonexistent/folder"), None);
        assert!(matches!(res, Err(BackupError::SourceMissing(_))));
    }

    #[test]
    fn empty_source() -> Result<(), Box<dyn Error>> {
        let tmp = tempfile::tempdir()?;
        let source = tmp.path().join("empty");
        fs::create_dir_all(source.join("nested"))?;
        let host = ZipFolderBackup::new(tmp.path().join("out"));
        let res = host.create_folder_backup(&source, None);
        assert!(matches!(res, Err(BackupError::NoFiles(_))));
        Ok(())
    }
}
