//! Usage counters and the per-save update applied to them.

use crate::models::FormatTag;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Auto-detection counters.
///
/// Every auto-detected save is counted as correct: there is no feedback
/// channel through which a user could contest a detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionAccuracy {
    pub total: u64,
    pub correct: u64,
}

impl DetectionAccuracy {
    /// Rounded percentage of correct detections, 0 when nothing was detected.
    pub fn rate_percent(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            ((self.correct as f64 / self.total as f64) * 100.0).round() as u64
        }
    }
}

/// Usage counters, persisted in `stats.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Monotonic count of successful saves
    pub total_files: u64,

    /// Saves on `todays_date`
    pub today_files: u64,

    pub todays_date: Option<NaiveDate>,

    pub last_file: String,

    /// Epoch milliseconds of the last successful save
    pub last_timestamp: Option<i64>,

    /// Saves per resolved format tag, in first-use order
    pub format_usage: IndexMap<String, u64>,

    pub detection_accuracy: DetectionAccuracy,

    /// Saves made with the numbered naming option enabled
    pub file_counter: u64,
}

/// What the orchestrator reports about one successful save.
#[derive(Debug, Clone)]
pub struct SaveRecord<'a> {
    pub filename: &'a str,
    pub format: FormatTag,
    pub auto_detected: bool,
    pub at: DateTime<Utc>,
    pub track_format_usage: bool,
    pub track_detection_accuracy: bool,
    /// Advance [`Stats::file_counter`]
    pub use_counter: bool,
}

impl Stats {
    /// Apply one successful save.
    ///
    /// `today_files` restarts at 1 when the stored date differs from the
    /// date of `record.at`.
    pub fn record_save(&mut self, record: &SaveRecord<'_>) {
        let today = record.at.date_naive();

        self.total_files += 1;

        if self.todays_date != Some(today) {
            self.todays_date = Some(today);
            self.today_files = 0;
        }
        self.today_files += 1;

        self.last_file = record.filename.to_string();
        self.last_timestamp = Some(record.at.timestamp_millis());

        if record.track_format_usage {
            *self
                .format_usage
                .entry(record.format.as_str().to_string())
                .or_insert(0) += 1;
        }

        if record.auto_detected && record.track_detection_accuracy {
            self.detection_accuracy.total += 1;
            self.detection_accuracy.correct += 1;
        }

        if record.use_counter {
            self.file_counter += 1;
        }
    }

    /// Number given to the next numbered file name. Numbering starts at 1.
    pub fn next_file_number(&self) -> u64 {
        self.file_counter + 1
    }

    /// Today's count as of `now`, without mutating the stored value.
    pub fn today_files_on(&self, now: DateTime<Utc>) -> u64 {
        if self.todays_date == Some(now.date_naive()) {
            self.today_files
        } else {
            0
        }
    }

    /// Most used format and its count. Ties go to the format used first.
    pub fn most_used_format(&self) -> Option<(&str, u64)> {
        self.format_usage
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (tag, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((tag.as_str(), count)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(at: DateTime<Utc>, format: FormatTag, auto: bool) -> SaveRecord<'static> {
        SaveRecord {
            filename: "note.txt",
            format,
            auto_detected: auto,
            at,
            track_format_usage: true,
            track_detection_accuracy: true,
            use_counter: false,
        }
    }

    #[test]
    fn test_record_save_counts() {
        let mut stats = Stats::default();
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();

        stats.record_save(&record(at, FormatTag::Sql, true));
        stats.record_save(&record(at, FormatTag::Txt, false));

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.today_files, 2);
        assert_eq!(stats.todays_date, Some(at.date_naive()));
        assert_eq!(stats.last_file, "note.txt");
        assert_eq!(stats.last_timestamp, Some(at.timestamp_millis()));
        assert_eq!(stats.format_usage.get("sql"), Some(&1));
        assert_eq!(stats.format_usage.get("txt"), Some(&1));
        assert_eq!(stats.detection_accuracy.total, 1);
        assert_eq!(stats.detection_accuracy.correct, 1);
    }

    #[test]
    fn test_today_resets_on_new_date() {
        let mut stats = Stats::default();
        let day1 = Utc.with_ymd_and_hms(2026, 10, 16, 23, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 10, 17, 0, 1, 0).unwrap();

        stats.record_save(&record(day1, FormatTag::Txt, false));
        stats.record_save(&record(day1, FormatTag::Txt, false));
        assert_eq!(stats.today_files, 2);

        stats.record_save(&record(day2, FormatTag::Txt, false));
        assert_eq!(stats.today_files, 1);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.today_files_on(day2), 1);
        assert_eq!(stats.today_files_on(day1), 0);
    }

    #[test]
    fn test_tracking_flags_respected() {
        let mut stats = Stats::default();
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let rec = SaveRecord {
            track_format_usage: false,
            track_detection_accuracy: false,
            ..record(at, FormatTag::Md, true)
        };

        stats.record_save(&rec);
        assert!(stats.format_usage.is_empty());
        assert_eq!(stats.detection_accuracy, DetectionAccuracy::default());
        assert_eq!(stats.total_files, 1);
    }

    #[test]
    fn test_file_counter_advances_only_when_enabled() {
        let mut stats = Stats::default();
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        assert_eq!(stats.next_file_number(), 1);

        stats.record_save(&record(at, FormatTag::Txt, false));
        assert_eq!(stats.next_file_number(), 1);

        let numbered = SaveRecord {
            use_counter: true,
            ..record(at, FormatTag::Txt, false)
        };
        stats.record_save(&numbered);
        stats.record_save(&numbered);
        assert_eq!(stats.file_counter, 2);
        assert_eq!(stats.next_file_number(), 3);
    }

    #[test]
    fn test_most_used_format() {
        let mut stats = Stats::default();
        assert_eq!(stats.most_used_format(), None);

        stats.format_usage.insert("js".to_string(), 10);
        stats.format_usage.insert("ts".to_string(), 5);
        stats.format_usage.insert("py".to_string(), 10);
        assert_eq!(stats.most_used_format(), Some(("js", 10)));
    }

    #[test]
    fn test_accuracy_rate() {
        let accuracy = DetectionAccuracy { total: 3, correct: 2 };
        assert_eq!(accuracy.rate_percent(), 67);
        assert_eq!(DetectionAccuracy::default().rate_percent(), 0);
    }
}
