// FlashDoc - save selected text as a file in a detected or chosen format
//
// This is the library crate containing the detection, naming, encoding and save
// pipeline. The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AppState, FormatTag, NamingPattern, Settings, Stats};
pub use services::{SaveError, SaveOrchestrator, SaveOutcome, detect, generate_filename};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Name shown in notifications
pub const DISPLAY_NAME: &str = "FlashDoc";
