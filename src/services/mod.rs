//! Services module - the save pipeline and everything it is built from.
//!
//! The services have no knowledge of where text comes from or where files end up;
//! that is behind the traits in [`collaborators`]. Everything except the
//! orchestrator and the filesystem sink is synchronous and pure.
//!
//! # Components
//!
//! - [`detection`]: content-type classifier. A declarative rule table evaluated in
//!   a fixed priority order (YAML first, CSS last, `txt` as fallback). Each
//!   format's check is also available on its own through [`is_format`].
//!
//! - [`filename`]: file names from content, format, naming pattern and a clock.
//!   Names are sanitized, at most 100 characters, and never empty.
//!
//! - [`encoder`] and [`pdf`]: text to bytes plus MIME type. Text formats are UTF-8
//!   verbatim; `pdf` and `label` are rendered by a small PDF 1.4 writer with a
//!   byte-accurate cross-reference table.
//!
//! - [`retry`]: bounded retry with backoff for transient collaborator failures.
//!
//! - [`orchestrator`]: [`SaveOrchestrator`] runs one save end to end and updates
//!   the counters in [`crate::state::StateManager`].
//!
//! - [`recommendations`]: usage insights derived from the counters.
//!
//! # Usage Example
//!
//! ```ignore
//! use flashdoc::services::{FilesystemDownloadSink, LogNotificationSink, SaveOrchestrator};
//!
//! let orchestrator = SaveOrchestrator::new(
//!     state,
//!     metrics,
//!     FilesystemDownloadSink::new("Downloads"),
//!     LogNotificationSink,
//!     config_manager,
//! );
//!
//! let outcome = orchestrator.save("SELECT * FROM users WHERE id = 1;", FormatTag::Auto).await?;
//! assert_eq!(outcome.format, FormatTag::Sql);
//! ```

pub mod collaborators;
pub mod detection;
pub mod encoder;
pub mod filename;
pub mod orchestrator;
pub mod pdf;
pub mod recommendations;
pub mod retry;

pub use collaborators::{
    CollaboratorError, ConflictPolicy, DownloadId, DownloadRequest, DownloadSink,
    FilesystemDownloadSink, LogNotificationSink, Notification, NotificationLevel,
    NotificationSink, SelectionProvider, SettingsStore, StaticSelection, StatsStore,
};
pub use detection::{detect, is_format};
pub use encoder::{EncodeError, EncodedDocument, encode, encode_plain};
pub use filename::{MAX_FILENAME_LEN, NameDecoration, generate_filename, generate_filename_with};
pub use orchestrator::{Clock, FixedClock, SaveError, SaveOrchestrator, SaveOutcome, SystemClock};
pub use recommendations::{Recommendation, recommendations};
pub use retry::{RetryError, RetryPolicy};
