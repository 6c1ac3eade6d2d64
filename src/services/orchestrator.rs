//! The save pipeline: classify, name, encode, download, count, notify.

use crate::metrics::Metrics;
use crate::models::{FormatTag, SaveRecord};
use crate::services::collaborators::{
    CollaboratorError, ConflictPolicy, DownloadRequest, DownloadSink, Notification,
    NotificationSink, SelectionProvider, SettingsStore, StatsStore,
};
use crate::services::detection;
use crate::services::encoder::{self, EncodedDocument};
use crate::services::filename::{NameDecoration, generate_filename_with};
use crate::services::retry::{RetryError, RetryPolicy};
use crate::state::{StateChange, StateManager};
use anyhow::Context;
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("No content to save")]
    EmptyContent,

    #[error("Download failed: {0}")]
    Download(CollaboratorError),

    #[error("{message} (gave up after {attempts} attempts)")]
    CollaboratorUnavailable { attempts: u32, message: String },

    #[error("No text selected: {0}")]
    Selection(CollaboratorError),
}

impl SaveError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyContent => "❌ No content to save".to_string(),
            Self::Selection(_) => "❌ No text selected".to_string(),
            other => format!("❌ Error: {}", other),
        }
    }

    fn from_retry(err: RetryError, permanent: fn(CollaboratorError) -> SaveError) -> Self {
        match err {
            RetryError::Failed(e) => permanent(e),
            RetryError::Exhausted { attempts, last } => Self::CollaboratorUnavailable {
                attempts,
                message: last.message().to_string(),
            },
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub filename: String,
    /// Path handed to the download sink
    pub path: Utf8PathBuf,
    /// Path the sink reported after conflict resolution
    pub saved_path: Utf8PathBuf,
    pub format: FormatTag,
    pub auto_detected: bool,
    pub mime_type: &'static str,
    pub download_id: u64,
    pub bytes_written: usize,
}

/// Source of "now" for filenames and stats.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Ties the classifier, filename generator and encoder to the collaborators.
///
/// Settings are read as a snapshot at the start of every save; stats are
/// mutated and persisted through [`StateManager::record_save_with`] so
/// parallel saves never lose counts and the stats file never goes backwards.
pub struct SaveOrchestrator<D, N, S> {
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
    downloads: D,
    notifier: N,
    stats_store: S,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl<D, N, S> SaveOrchestrator<D, N, S>
where
    D: DownloadSink,
    N: NotificationSink,
    S: StatsStore,
{
    pub fn new(
        state: Arc<StateManager>,
        metrics: Arc<Metrics>,
        downloads: D,
        notifier: N,
        stats_store: S,
    ) -> Self {
        Self {
            state,
            metrics,
            downloads,
            notifier,
            stats_store,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Save `content` as `requested` (or a detected format for `Auto`).
    ///
    /// On failure nothing is counted and one error notification is sent.
    pub async fn save(
        &self,
        content: &str,
        requested: FormatTag,
    ) -> Result<SaveOutcome, SaveError> {
        let result = self.try_save(content, requested).await;
        self.report(&result);
        result
    }

    /// Fetch the selection from `provider` (retrying transient failures), then save it.
    pub async fn save_selection<P: SelectionProvider>(
        &self,
        provider: &P,
        requested: FormatTag,
    ) -> Result<SaveOutcome, SaveError> {
        let selection = self
            .retry
            .run(
                "selection",
                || provider.selection(),
                |_, _| self.metrics.record_retry(),
            )
            .await
            .map_err(|e| SaveError::from_retry(e, SaveError::Selection));

        match selection {
            Ok(content) => self.save(&content, requested).await,
            Err(err) => {
                let result = Err(err);
                self.report(&result);
                result
            }
        }
    }

    /// Reload settings from `store` and swap the snapshot.
    pub fn refresh_settings(&self, store: &impl SettingsStore) -> anyhow::Result<Vec<StateChange>> {
        let settings = store
            .load_settings()
            .context("Failed to reload settings")?;
        let changes = self.state.replace_settings(settings);
        if !changes.is_empty() {
            tracing::info!("Settings refreshed");
        }
        Ok(changes)
    }

    async fn try_save(
        &self,
        content: &str,
        requested: FormatTag,
    ) -> Result<SaveOutcome, SaveError> {
        if content.trim().is_empty() {
            return Err(SaveError::EmptyContent);
        }

        let settings = self.state.settings_snapshot();
        let now = self.clock.now();

        let (format, auto_detected) = match requested {
            FormatTag::Auto if settings.auto_detect_type => (detection::detect(content), true),
            FormatTag::Auto => (FormatTag::Txt, false),
            explicit => (explicit, false),
        };

        // Numbered names share a number when saves overlap; the sink uniquifies
        let counter = settings
            .use_counter
            .then(|| self.state.read(|s| s.stats.next_file_number()));
        let filename = generate_filename_with(
            content,
            format,
            settings.naming_pattern,
            &settings.custom_pattern,
            NameDecoration {
                prefix: &settings.prefix,
                counter,
            },
            now,
        );
        let path = Utf8PathBuf::from(format!(
            "{}{}",
            settings.target_directory(format),
            filename
        ));

        let document = self.encode(content, format);
        let bytes_written = document.len();
        let mime_type = document.mime_type;

        let request = DownloadRequest {
            path: path.clone(),
            bytes: document.bytes,
            mime_type,
            prompt: false,
            conflict: ConflictPolicy::Uniquify,
        };

        let receipt = self
            .retry
            .run(
                "download",
                || self.downloads.download(&request),
                |_, _| self.metrics.record_retry(),
            )
            .await
            .map_err(|e| SaveError::from_retry(e, SaveError::Download))?;

        // Persisted under the state lock so parallel saves write in order
        let record = SaveRecord {
            filename: &filename,
            format,
            auto_detected,
            at: now,
            track_format_usage: settings.track_format_usage,
            track_detection_accuracy: settings.track_detection_accuracy,
            use_counter: settings.use_counter,
        };
        self.state.record_save_with(&record, |stats| {
            if let Err(e) = self.stats_store.save_stats(stats) {
                tracing::warn!("Failed to persist stats after saving {}: {:#}", filename, e);
            }
        });

        self.metrics.record_save(bytes_written, auto_detected);
        tracing::info!("File saved: {} ({}, {} bytes)", receipt.saved_path, format, bytes_written);

        Ok(SaveOutcome {
            filename,
            path,
            saved_path: receipt.saved_path,
            format,
            auto_detected,
            mime_type,
            download_id: receipt.id,
            bytes_written,
        })
    }

    fn encode(&self, content: &str, format: FormatTag) -> EncodedDocument {
        encoder::encode(content, format).unwrap_or_else(|e| {
            tracing::warn!("{}; saving {} as plain text", e, format);
            self.metrics.record_encode_fallback();
            encoder::encode_plain(content, format)
        })
    }

    /// Count the outcome and notify the user if enabled.
    fn report(&self, result: &Result<SaveOutcome, SaveError>) {
        let notification = match result {
            Ok(outcome) => Notification::info(format!("✨ {} created!", outcome.filename)),
            Err(err) => {
                self.metrics.record_save_failed();
                tracing::error!("Save failed: {}", err);
                Notification::error(err.user_message())
            }
        };

        if !self.state.read(|s| s.settings.show_notifications) {
            return;
        }
        if let Err(e) = self.notifier.notify(&notification) {
            tracing::warn!("Notification failed: {:#}", e);
        }
    }
}
