use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use sigpac_tools::backup::project::{BackupMode, ProjectBackupManager};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Folder holding all project backups
    #[arg(short, long, default_value = "backups")]
    backup_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Back up a project file
    Create {
        project: PathBuf,
        /// Also copy the GeoPackages the project references
        #[arg(long)]
        with_gpkg: bool,
    },
    /// Replace a folder with the content of a backup
    Restore { backup: PathBuf, destination: PathBuf },
    /// List the backups of a project, newest first
    List { project_name: String },
    /// Delete a backup
    Delete { backup: PathBuf },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let manager = ProjectBackupManager::new(args.backup_dir)?;
    match args.command {
        Command::Create { project, with_gpkg } => {
            let mode = if with_gpkg {
                BackupMode::ProjectAndGpkg
            } else {
                BackupMode::ProjectOnly
            };
            let path = manager.create_backup(&project, mode)?;
            println!("{}", path.display());
        }
        Command::Restore {
            backup,
            destination,
        } => manager.restore_backup(&backup, &destination)?,
        Command::List { project_name } => {
            let backups = manager.list_backups(&project_name)?;
            info!(
                "{} backups of {} in {}",
                backups.len(),
                project_name,
                manager.backup_directory().display()
            );
            for name in backups {
                println!("{}", name);
            }
        }
        Command::Delete { backup } => manager.delete_backup(&backup)?,
    }
    Ok(())
}
