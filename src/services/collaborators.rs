//! Seams to the host environment.
//!
//! The save pipeline only talks to the outside world through these traits:
//! where the selection comes from, where bytes go, how the user is told, and
//! where settings and stats live. [`FilesystemDownloadSink`] and
//! [`LogNotificationSink`] are the implementations used by the CLI; the
//! stores are implemented by [`crate::config::ConfigManager`].

use crate::models::{Settings, Stats};
use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Messages the host reports while its messaging layer is restarting.
const TRANSIENT_MARKERS: [&str; 4] = [
    "Could not establish connection",
    "Receiving end does not exist",
    "The message port closed before a response was received",
    "Extension context invalidated",
];

const UNAVAILABLE_MARKER: &str = "runtime unavailable";

/// Upper bound on `name (n).ext` probing.
const MAX_UNIQUE_SUFFIX: u32 = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Temporary failure: {0}")]
    Transient(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Not accessible: {0}")]
    Inaccessible(String),
}

impl CollaboratorError {
    /// Map a host error message onto an error kind.
    pub fn classify_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if TRANSIENT_MARKERS.iter().any(|m| message.contains(m)) {
            Self::Transient(message)
        } else if message.contains(UNAVAILABLE_MARKER) {
            Self::Inaccessible(message)
        } else {
            Self::Io(message)
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transient(m) | Self::Io(m) | Self::Inaccessible(m) => m,
        }
    }
}

impl From<io::Error> for CollaboratorError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::Inaccessible(err.to_string()),
            io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Self::Transient(err.to_string())
            }
            _ => Self::Io(err.to_string()),
        }
    }
}

/// What to do when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Append ` (1)`, ` (2)`, ... to the stem
    #[default]
    Uniquify,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Path relative to the sink's root, e.g. `FlashDocs/sql/query.sql`
    pub path: Utf8PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    /// Ask the user where to save; always false for this pipeline
    pub prompt: bool,
    pub conflict: ConflictPolicy,
}

/// Receipt for a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadId {
    pub id: u64,
    /// Where the bytes actually landed, after conflict resolution
    pub saved_path: Utf8PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            title: crate::DISPLAY_NAME.to_string(),
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: crate::DISPLAY_NAME.to_string(),
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Source of the user's current text selection.
pub trait SelectionProvider: Send + Sync {
    fn selection(&self) -> impl Future<Output = Result<String, CollaboratorError>> + Send;
}

/// Destination for encoded documents.
pub trait DownloadSink: Send + Sync {
    fn download(
        &self,
        request: &DownloadRequest,
    ) -> impl Future<Output = Result<DownloadId, CollaboratorError>> + Send;
}

/// Fire-and-forget user notifications. Callers log and ignore errors.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

pub trait SettingsStore: Send + Sync {
    fn load_settings(&self) -> Result<Settings>;
}

pub trait StatsStore: Send + Sync {
    fn load_stats(&self) -> Result<Stats>;
    fn save_stats(&self, stats: &Stats) -> Result<()>;
}

/// Writes downloads below a root directory.
#[derive(Debug)]
pub struct FilesystemDownloadSink {
    root: Utf8PathBuf,
    next_id: AtomicU64,
}

impl FilesystemDownloadSink {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn write(&self, request: &DownloadRequest) -> Result<Utf8PathBuf, CollaboratorError> {
        if request.path.is_absolute()
            || request
                .path
                .components()
                .any(|c| matches!(c, camino::Utf8Component::ParentDir))
        {
            return Err(CollaboratorError::Inaccessible(format!(
                "Refusing to write outside {}: {}",
                self.root, request.path
            )));
        }

        let target = self.root.join(&request.path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match request.conflict {
            ConflictPolicy::Overwrite => {
                tokio::fs::write(&target, &request.bytes).await?;
                Ok(target)
            }
            ConflictPolicy::Uniquify => {
                for n in 0..MAX_UNIQUE_SUFFIX {
                    let candidate = numbered_path(&target, n);
                    // create_new claims the name atomically, so parallel saves never share a file
                    match OpenOptions::new()
                        .write(true)
                        .create_new(true)
                        .open(&candidate)
                        .await
                    {
                        Ok(mut file) => {
                            file.write_all(&request.bytes).await?;
                            file.flush().await?;
                            return Ok(candidate);
                        }
                        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(CollaboratorError::Io(format!(
                    "No free file name for {}",
                    target
                )))
            }
        }
    }
}

impl DownloadSink for FilesystemDownloadSink {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadId, CollaboratorError> {
        let saved_path = self.write(request).await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            "Download {} wrote {} bytes ({}) to {}",
            id,
            request.bytes.len(),
            request.mime_type,
            saved_path
        );

        Ok(DownloadId { id, saved_path })
    }
}

/// `dir/name.ext` for `n == 0`, else `dir/name (n).ext`.
pub fn numbered_path(path: &Utf8Path, n: u32) -> Utf8PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }

    let stem = path.file_stem().unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}

/// Sends notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, notification: &Notification) -> Result<()> {
        match notification.level {
            NotificationLevel::Info => {
                tracing::info!("[{}] {}", notification.title, notification.message)
            }
            NotificationLevel::Error => {
                tracing::error!("[{}] {}", notification.title, notification.message)
            }
        }
        Ok(())
    }
}

/// Selection held in memory, e.g. read from stdin.
#[derive(Debug, Clone)]
pub struct StaticSelection(pub String);

impl SelectionProvider for StaticSelection {
    async fn selection(&self) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}
