// State management module
//
// StateManager wraps AppState (settings snapshot + stats counters) in
// Arc<RwLock<T>> and broadcasts change events to subscribers.

use crate::models::{AppState, FormatTag, SaveRecord, Settings, Stats};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Capacity of the change broadcast channel.
const CHANNEL_CAPACITY: usize = 100;

/// Change events emitted when state is modified.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The settings snapshot was replaced with different values
    SettingsChanged,

    /// A save completed and the counters were updated
    FileSaved {
        filename: String,
        format: FormatTag,
        total_files: u64,
    },

    /// Counters were replaced from the stats store
    StatsLoaded { total_files: u64 },

    /// Counters were cleared
    StatsReset,
}

/// Thread-safe state manager with event emission.
///
/// - [`read()`](Self::read) and [`snapshot()`](Self::snapshot) for reads
/// - [`update()`](Self::update) for mutations; the closure runs under the
///   write lock, so read-modify-write sequences never interleave
/// - [`subscribe()`](Self::subscribe) for change events
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Sending fails only when nobody is subscribed, which is fine
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        let (state_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(state)),
            state_tx,
        }
    }

    /// Cloned copy of the whole state.
    pub fn snapshot(&self) -> AppState {
        self.read(|state| state.clone())
    }

    pub fn settings_snapshot(&self) -> Settings {
        self.read(|state| state.settings.clone())
    }

    pub fn stats_snapshot(&self) -> Stats {
        self.read(|state| state.stats.clone())
    }

    /// Execute a function with read access to the state.
    ///
    /// # Example
    /// ```ignore
    /// let total = state_manager.read(|state| state.stats.total_files);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate the state, then emit an event for every detected change.
    ///
    /// Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let changes = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let old_state = state.clone();
            update_fn(&mut state);
            Self::detect_changes(&old_state, &state)
        };

        for change in &changes {
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.settings != new.settings {
            changes.push(StateChange::SettingsChanged);
        }

        if new.session_saves != old.session_saves {
            if let Some(format) = new.last_format {
                changes.push(StateChange::FileSaved {
                    filename: new.stats.last_file.clone(),
                    format,
                    total_files: new.stats.total_files,
                });
            }
        } else if old.stats != new.stats {
            if new.stats == Stats::default() {
                changes.push(StateChange::StatsReset);
            } else {
                changes.push(StateChange::StatsLoaded {
                    total_files: new.stats.total_files,
                });
            }
        }

        changes
    }

    /// Swap in a new settings snapshot. Settings are normalized first.
    pub fn replace_settings(&self, settings: Settings) -> Vec<StateChange> {
        let settings = settings.normalized();
        self.update(|state| state.settings = settings)
    }

    /// Replace the counters, e.g. after loading them from disk.
    pub fn load_stats(&self, stats: Stats) -> Vec<StateChange> {
        self.update(|state| state.stats = stats)
    }

    pub fn reset_stats(&self) -> Vec<StateChange> {
        self.update(|state| state.stats = Stats::default())
    }

    /// Apply one successful save and return the resulting counters.
    ///
    /// The whole read-modify-write happens under the write lock.
    pub fn record_save(&self, record: &SaveRecord<'_>) -> Stats {
        self.record_save_with(record, |_| {})
    }

    /// Like [`record_save`](Self::record_save), handing the new counters to
    /// `persist` before the write lock is released.
    ///
    /// Persisted snapshots therefore land in the same order as the updates,
    /// and the last one written always carries the highest `total_files`.
    pub fn record_save_with<F>(&self, record: &SaveRecord<'_>, persist: F) -> Stats
    where
        F: FnOnce(&Stats),
    {
        let mut updated = Stats::default();
        self.update(|state| {
            state.stats.record_save(record);
            state.last_format = Some(record.format);
            state.session_saves += 1;
            persist(&state.stats);
            updated = state.stats.clone();
        });
        updated
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
