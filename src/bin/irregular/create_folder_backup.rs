use std::{error::Error, path::PathBuf};

use clap::Parser;
use log::error;
use sigpac_tools::backup::{
    folder::ZipFolderBackup,
    message::BackupRequest,
    worker::BackupWorker,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Folder to back up
    #[arg(short, long)]
    source: PathBuf,

    /// Folder where the zip archive goes
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Used when no destination is given
    #[arg(long, default_value = "SIGPACGO_Backups")]
    default_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut worker = BackupWorker::spawn(ZipFolderBackup::new(args.default_dir));
    let request = BackupRequest {
        source_path: args.source,
        destination_path: args.destination,
    };
    let response = worker.request(request).await;
    worker.shutdown().await;
    let Some(response) = response else {
        error!("backup worker stopped before answering");
        return Err("backup worker stopped before answering".into());
    };

    println!("{}", serde_json::to_string(&response)?);
    response.into_result()?;
    Ok(())
}
