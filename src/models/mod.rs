//! Data models for FlashDoc.
//!
//! - [`FormatTag`]: the closed set of output formats, with extension and MIME lookup
//! - [`Settings`]: user preferences loaded from `settings.yaml`
//! - [`Stats`]: usage counters persisted in `stats.yaml`
//! - [`AppState`]: settings and stats as held by [`crate::state::StateManager`]
//!
//! All persisted structs derive `Serialize`/`Deserialize` with `#[serde(default)]`
//! so older or hand-edited files load without errors.

pub mod app_state;
pub mod format;
pub mod settings;
pub mod stats;

pub use app_state::AppState;
pub use format::{DEFAULT_MIME_TYPE, FormatTag, PDF_MIME_TYPE, UnknownFormat, mime_type_for};
pub use settings::{NamingPattern, Settings};
pub use stats::{DetectionAccuracy, SaveRecord, Stats};
