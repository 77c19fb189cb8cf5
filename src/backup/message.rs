use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ask the worker to back up `source_path`.  Without a destination the host
/// picks its default backup folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequest {
    pub source_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_path: Option<PathBuf>,
}

/// Reply sent by the worker for every request.
///
/// On the wire this is `{"success": true, "backupPath": ...}` or
/// `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResponse", try_from = "WireResponse")]
pub enum BackupResponse {
    Success { backup_path: PathBuf },
    Failure { error: String },
}

impl BackupResponse {
    /// The backup path, or the failure message as an error.
    pub fn into_result(self) -> Result<PathBuf, String> {
        match self {
            BackupResponse::Success { backup_path } => Ok(backup_path),
            BackupResponse::Failure { error } => Err(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backup_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<BackupResponse> for WireResponse {
    fn from(value: BackupResponse) -> Self {
        match value {
            BackupResponse::Success { backup_path } => WireResponse {
                success: true,
                backup_path: Some(backup_path),
                error: None,
            },
            BackupResponse::Failure { error } => WireResponse {
                success: false,
                backup_path: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<WireResponse> for BackupResponse {
    type Error = String;

    fn try_from(value: WireResponse) -> Result<Self, Self::Error> {
        match (value.success, value.backup_path, value.error) {
            (true, Some(backup_path), _) => Ok(BackupResponse::Success { backup_path }),
            (true, None, _) => Err("successful response without a backupPath".to_string()),
            (false, _, error) => Ok(BackupResponse::Failure {
                error: error.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use serde_json::json;

    use super::*;

    #[test]
    fn request_from_json() -> Result<(), Box<dyn Error>> {
        let req: BackupRequest = serde_json::from_value(json!({"sourcePath": "/data/project"}))?;
        assert_eq!(req.source_path, PathBuf::from("/data/project"));
        assert_eq!(req.destination_path, None);

        let req: BackupRequest = serde_json::from_value(
            json!({"sourcePath": "/data/project", "destinationPath": "/mnt/usb"}),
        )?;
        assert_eq!(req.destination_path, Some(PathBuf::from("/mnt/usb")));
        Ok(())
    }

    #[test]
    fn response_wire_format() -> Result<(), Box<dyn Error>> {
        let ok = BackupResponse::Success {
            backup_path: PathBuf::from("/b/project_backup_20240101_120000.zip"),
        };
        assert_eq!(
            serde_json::to_value(&ok)?,
            json!({"success": true, "backupPath": "/b/project_backup_20240101_120000.zip"})
        );

        let failed = BackupResponse::Failure {
            error: "Failed to create backup".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed)?,
            json!({"success": false, "error": "Failed to create backup"})
        );
        Ok(())
    }

    #[test]
    fn failure_becomes_error() {
        let failed = BackupResponse::Failure {
            error: "Failed to create backup".to_string(),
        };
        assert_eq!(failed.into_result(), Err("Failed to create backup".to_string()));
        let ok = BackupResponse::Success {
            backup_path: PathBuf::from("/b/p.zip"),
        };
        assert_eq!(ok.into_result(), Ok(PathBuf::from("/b/p.zip")));
    }

    #[test]
    fn response_from_json() -> Result<(), Box<dyn Error>> {
        let res: BackupResponse =
            serde_json::from_value(json!({"success": false, "error": "disk full"}))?;
        assert_eq!(
            res,
            BackupResponse::Failure {
                error: "disk full".to_string()
            }
        );
        assert!(serde_json::from_value::<BackupResponse>(json!({"success": true})).is_err());
        Ok(())
    }
}
