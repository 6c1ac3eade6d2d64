//! Shared state of the save pipeline.

use crate::models::{FormatTag, Settings, Stats};

/// Everything the save pipeline shares between calls.
///
/// Wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`]; use
/// its [`read()`](crate::state::StateManager::read) and
/// [`update()`](crate::state::StateManager::update) instead of touching this
/// directly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Current settings snapshot, replaced wholesale
    pub settings: Settings,

    /// Persistent usage counters
    pub stats: Stats,

    // Session-only bookkeeping, not persisted
    pub last_format: Option<FormatTag>,
    pub session_saves: u64,
}

impl AppState {
    pub fn new(settings: Settings, stats: Stats) -> Self {
        Self {
            settings,
            stats,
            ..Self::default()
        }
    }
}
