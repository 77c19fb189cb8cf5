use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use itertools::Itertools;
use log::{info, warn};
use regex::Regex;

use super::{ensure_dir, timestamp, BackupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    /// Only the project file
    ProjectOnly,
    /// The project file and the GeoPackages it references
    ProjectAndGpkg,
}

/// Keeps timestamped copies of a project under a single backup directory.
pub struct ProjectBackupManager {
    backup_directory: PathBuf,
}

impl ProjectBackupManager {
    pub fn new<P: Into<PathBuf>>(backup_directory: P) -> Result<ProjectBackupManager, BackupError> {
        let backup_directory = backup_directory.into();
        ensure_dir(&backup_directory)?;
        Ok(ProjectBackupManager { backup_directory })
    }

    pub fn backup_directory(&self) -> &Path {
        &self.backup_directory
    }

    /// Copy the project (and its GeoPackages for [`BackupMode::ProjectAndGpkg`])
    /// into a new `<project>_<yyyy-MM-dd_HH-mm-ss>` directory.  Returns that
    /// directory.
    pub fn create_backup(&self, project_path: &Path, mode: BackupMode) -> Result<PathBuf, BackupError> {
        if !project_path.is_file() {
            return Err(BackupError::SourceMissing(project_path.to_path_buf()));
        }
        let backup_path = self.backup_directory.join(backup_name(project_path));
        ensure_dir(&backup_path)?;

        info!("Copying project file {} ...", project_path.display());
        let file_name = project_path.file_name().unwrap_or(project_path.as_os_str());
        copy_file(project_path, &backup_path.join(file_name))?;

        if mode == BackupMode::ProjectAndGpkg {
            let gpkg_files = find_associated_gpkg_files(project_path)?;
            if !gpkg_files.is_empty() {
                let data_dir = backup_path.join("data");
                ensure_dir(&data_dir)?;
                let total = gpkg_files.len();
                for (i, gpkg) in gpkg_files.iter().enumerate() {
                    info!(
                        "Copying GPKG file {} of {} ({}%)",
                        i + 1,
                        total,
                        i * 100 / total
                    );
                    let name = gpkg.file_name().unwrap_or(gpkg.as_os_str());
                    copy_file(gpkg, &data_dir.join(name))?;
                }
            }
        }
        info!("Backup completed: {}", backup_path.display());
        Ok(backup_path)
    }

    /// Replace `destination` with the content of `backup_path`.
    pub fn restore_backup(&self, backup_path: &Path, destination: &Path) -> Result<(), BackupError> {
        if !backup_path.is_dir() {
            return Err(BackupError::BackupMissing(backup_path.to_path_buf()));
        }
        if destination.exists() {
            fs::remove_dir_all(destination)?;
        }
        copy_dir(backup_path, destination)?;
        info!("Backup {} restored to {}", backup_path.display(), destination.display());
        Ok(())
    }

    /// Names of the backups of `project_name`, newest first.
    pub fn list_backups(&self, project_name: &str) -> Result<Vec<String>, BackupError> {
        let prefix = format!("{}_", project_name);
        let mut backups: Vec<(SystemTime, String)> = Vec::new();
        for entry in fs::read_dir(&self.backup_directory)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_dir() && name.starts_with(&prefix) {
                backups.push((entry.metadata()?.modified()?, name));
            }
        }
        Ok(backups
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)))
            .map(|(_, name)| name)
            .collect())
    }

    /// Remove a backup directory.  A missing backup is not an error.
    pub fn delete_backup(&self, backup_path: &Path) -> Result<(), BackupError> {
        if backup_path.exists() {
            fs::remove_dir_all(backup_path)?;
            info!("Deleted backup {}", backup_path.display());
        }
        Ok(())
    }
}

/// `<project stem>_<yyyy-MM-dd_HH-mm-ss>`
pub fn backup_name(project_path: &Path) -> String {
    let stem = project_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}_{}", stem, timestamp("%Y-%m-%d_%H-%M-%S"))
}

/// GeoPackages referenced as `source="....gpkg"` in a project file that exist
/// on disk.  Relative paths are resolved against the project's folder.
pub fn find_associated_gpkg_files(project_path: &Path) -> Result<Vec<PathBuf>, BackupError> {
    let content = match fs::read_to_string(project_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Can't read project {}: {}", project_path.display(), e);
            return Ok(vec![]);
        }
    };
    let project_dir = project_path.parent().unwrap_or(Path::new(""));
    let re = Regex::new(r#"source="([^"]*\.gpkg)""#)?;

    let files = re
        .captures_iter(&content)
        .map(|caps| {
            let path = PathBuf::from(&caps[1]);
            if path.is_relative() {
                project_dir.join(path)
            } else {
                path
            }
        })
        .filter(|path| path.is_file())
        .unique()
        .collect();
    Ok(files)
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), BackupError> {
    if destination.exists() {
        fs::remove_file(destination)?;
    }
    fs::copy(source, destination)?;
    Ok(())
}

fn copy_dir(source: &Path, destination: &Path) -> Result<(), BackupError> {
    ensure_dir(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            copy_file(&entry.path(), &target)?;
        }
    }
    Ok(())
}
