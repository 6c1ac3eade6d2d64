//! User preferences and their normalization.

use crate::models::FormatTag;
use serde::{Deserialize, Serialize};

/// How a filename stem is derived from the saved content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPattern {
    /// `flashdoc_<YYYY-MM-DD_HH-MM-SS>`
    #[default]
    Timestamp,
    /// Cleaned first line of the content, timestamp fallback
    Firstline,
    /// User template with `{date}`, `{time}` and `{type}` tokens
    Custom,
    /// First three words, Unicode aware, `document` fallback. Takes the
    /// optional `prefix` and file number
    Firstwords,
}

/// User settings, read from `settings.yaml` (see [`crate::config::ConfigManager`]).
///
/// The orchestrator never writes settings. It takes a snapshot from
/// [`crate::state::StateManager`] at the start of every save, and the snapshot
/// is only replaced wholesale by an explicit refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Destination folder relative to the download root. A trailing slash is implied.
    pub folder_path: String,

    pub naming_pattern: NamingPattern,

    pub custom_pattern: String,

    /// Leading segment of `firstwords` names, e.g. `work` in `work-0007-...`
    pub prefix: String,

    /// Put a zero-padded file number after the prefix of `firstwords` names.
    /// The number advances after every successful save while enabled
    pub use_counter: bool,

    /// Save into a `<type>/` subfolder of `folder_path`
    pub organize_by_type: bool,

    /// Resolve `auto` with the classifier; otherwise `auto` saves as txt
    pub auto_detect_type: bool,

    /// Minimum selection length (in characters) before quick-save is offered
    pub selection_threshold: u32,

    /// Formats offered in the context menu
    pub context_menu_formats: Vec<FormatTag>,

    pub show_notifications: bool,

    pub track_format_usage: bool,

    pub track_detection_accuracy: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            folder_path: "FlashDocs/".to_string(),
            naming_pattern: NamingPattern::Timestamp,
            custom_pattern: "file_{date}".to_string(),
            prefix: String::new(),
            use_counter: false,
            organize_by_type: true,
            auto_detect_type: true,
            selection_threshold: 10,
            context_menu_formats: FormatTag::ALL.to_vec(),
            show_notifications: true,
            track_format_usage: true,
            track_detection_accuracy: true,
        }
    }
}

impl Settings {
    /// Fix up values a hand-edited file may get wrong.
    ///
    /// - an empty context menu selection falls back to every format
    /// - duplicate context menu entries are dropped, first occurrence wins
    /// - an empty custom pattern falls back to the default template
    pub fn normalized(mut self) -> Self {
        if self.context_menu_formats.is_empty() {
            self.context_menu_formats = FormatTag::ALL.to_vec();
        } else {
            let mut seen = Vec::with_capacity(self.context_menu_formats.len());
            self.context_menu_formats.retain(|tag| {
                if seen.contains(tag) {
                    false
                } else {
                    seen.push(*tag);
                    true
                }
            });
        }

        if self.custom_pattern.trim().is_empty() {
            self.custom_pattern = Settings::default().custom_pattern;
        }

        self
    }

    /// Destination directory for a resolved format, always ending with `/`
    /// unless it is empty.
    pub fn target_directory(&self, format: FormatTag) -> String {
        let mut dir = self.folder_path.trim().replace('\\', "/");
        if !dir.is_empty() && !dir.ends_with('/') {
            dir.push('/');
        }
        if self.organize_by_type {
            dir.push_str(format.as_str());
            dir.push('/');
        }
        dir
    }

    /// True when a selection is long enough to offer quick-save.
    pub fn meets_selection_threshold(&self, selection: &str) -> bool {
        selection.trim().chars().count() > self.selection_threshold as usize
    }

    pub fn offers_format(&self, format: FormatTag) -> bool {
        self.context_menu_formats.contains(&format)
    }
}
