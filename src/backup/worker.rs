use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{error, info, warn};
use tokio::{
    sync::mpsc::{self, error::SendError},
    task::JoinHandle,
};

use super::{
    message::{BackupRequest, BackupResponse},
    BackupError,
};

/// The routine that actually produces a backup.  Returns the path of the
/// backup it created; an empty path means nothing was created.
pub trait BackupHost: Send + Sync + 'static {
    fn create_folder_backup(
        &self,
        source: &Path,
        destination: Option<&Path>,
    ) -> Result<PathBuf, BackupError>;
}

impl<T: BackupHost + ?Sized> BackupHost for Arc<T> {
    fn create_folder_backup(
        &self,
        source: &Path,
        destination: Option<&Path>,
    ) -> Result<PathBuf, BackupError> {
        (**self).create_folder_backup(source, destination)
    }
}

/// Run one request against the host.  Host errors become a failure response,
/// they are never propagated.
pub fn handle_request<H: BackupHost + ?Sized>(host: &H, request: &BackupRequest) -> BackupResponse {
    match host.create_folder_backup(&request.source_path, request.destination_path.as_deref()) {
        Ok(path) if !path.as_os_str().is_empty() => {
            info!("backup of {} created at {}", request.source_path.display(), path.display());
            BackupResponse::Success { backup_path: path }
        }
        Ok(_) => {
            warn!("no backup created for {}", request.source_path.display());
            BackupResponse::Failure {
                error: "Failed to create backup".to_string(),
            }
        }
        Err(e) => {
            error!("backup of {} failed: {}", request.source_path.display(), e);
            BackupResponse::Failure {
                error: format!("Backup error: {}", e),
            }
        }
    }
}

/// Background worker answering each [`BackupRequest`] with one
/// [`BackupResponse`], in order.  Must be spawned from within a tokio runtime.
///
/// Both queues are unbounded, so any number of requests can be sent before the
/// first response is read.
pub struct BackupWorker {
    requests: mpsc::UnboundedSender<BackupRequest>,
    responses: mpsc::UnboundedReceiver<BackupResponse>,
    handle: JoinHandle<()>,
}

impl BackupWorker {
    pub fn spawn<H: BackupHost>(host: H) -> BackupWorker {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (res_tx, res_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(Arc::new(host), req_rx, res_tx));
        BackupWorker {
            requests: req_tx,
            responses: res_rx,
            handle,
        }
    }

    /// Queue a request.  Fails only once the worker has stopped.
    pub fn send(&self, request: BackupRequest) -> Result<(), SendError<BackupRequest>> {
        self.requests.send(request)
    }

    /// Next response, or `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<BackupResponse> {
        self.responses.recv().await
    }

    /// Send a request and wait for its response.
    pub async fn request(&mut self, request: BackupRequest) -> Option<BackupResponse> {
        self.send(request).ok()?;
        self.recv().await
    }

    /// Stop accepting requests and wait for pending ones to finish.
    pub async fn shutdown(self) {
        drop(self.requests);
        if let Err(e) = self.handle.await {
            error!("backup worker ended abnormally: {}", e);
        }
    }
}

async fn run<H: BackupHost>(
    host: Arc<H>,
    mut requests: mpsc::UnboundedReceiver<BackupRequest>,
    responses: mpsc::UnboundedSender<BackupResponse>,
) {
    while let Some(request) = requests.recv().await {
        let host = Arc::clone(&host);
        let response =
            match tokio::task::spawn_blocking(move || handle_request(&*host, &request))
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!("backup task failed: {}", e);
                    BackupResponse::Failure {
                        error: format!("Backup task failed: {}", e),
                    }
                }
            };
        if responses.send(response).is_err() {
            warn!("response receiver dropped, stopping backup worker");
            break;
        }
    }
}
