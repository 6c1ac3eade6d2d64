//! Usage insights derived from [`Stats`].

use crate::models::Stats;
use serde::Serialize;

/// Formats suggested to users who have not tried them yet, in suggestion order.
const SUGGESTED_FORMATS: [&str; 5] = ["ts", "xml", "sql", "sh", "css"];

const MAX_SUGGESTIONS: usize = 3;

/// Detections needed before the accuracy rate is worth showing.
const MIN_DETECTIONS: u64 = 5;

/// Saves needed before format suggestions are made.
const MIN_FILES_FOR_SUGGESTIONS: u64 = 10;

const GOOD_ACCURACY_PERCENT: u64 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub icon: &'static str,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    fn new(icon: &'static str, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            icon,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Three recommendations: top format, detection accuracy, formats to try.
pub fn recommendations(stats: &Stats) -> Vec<Recommendation> {
    vec![
        most_used(stats),
        detection_accuracy(stats),
        suggested_formats(stats),
    ]
}

fn most_used(stats: &Stats) -> Recommendation {
    match stats.most_used_format() {
        Some((format, count)) => {
            let share = if stats.total_files == 0 {
                0
            } else {
                ((count as f64 / stats.total_files as f64) * 100.0).round() as u64
            };
            Recommendation::new(
                "📊",
                format!("Most Used Format: {}", format.to_uppercase()),
                format!(
                    "You've saved {} files in this format ({}% of total)",
                    count, share
                ),
            )
        }
        None => Recommendation::new(
            "🎯",
            "Smart Auto-Detection Enabled",
            "FlashDoc will automatically detect the best format for your content",
        ),
    }
}

fn detection_accuracy(stats: &Stats) -> Recommendation {
    let accuracy = &stats.detection_accuracy;
    if accuracy.total > MIN_DETECTIONS {
        let rate = accuracy.rate_percent();
        let icon = if rate > GOOD_ACCURACY_PERCENT { "✅" } else { "⚠️" };
        Recommendation::new(
            icon,
            format!("Detection Accuracy: {}%", rate),
            format!(
                "{} out of {} auto-detections were accurate",
                accuracy.correct, accuracy.total
            ),
        )
    } else {
        Recommendation::new(
            "💡",
            "New Format Detection Features",
            "Now supports TypeScript, XML, SQL, Shell scripts, and more!",
        )
    }
}

fn suggested_formats(stats: &Stats) -> Recommendation {
    let unused: Vec<String> = SUGGESTED_FORMATS
        .iter()
        .filter(|f| stats.format_usage.get(**f).copied().unwrap_or(0) == 0)
        .take(MAX_SUGGESTIONS)
        .map(|f| f.to_uppercase())
        .collect();

    if !unused.is_empty() && stats.total_files > MIN_FILES_FOR_SUGGESTIONS {
        Recommendation::new(
            "🆕",
            "Try New Formats",
            format!("Explore these newly available formats: {}", unused.join(", ")),
        )
    } else {
        Recommendation::new(
            "⚡",
            format!("{} Files Saved", stats.total_files),
            "Keep saving with FlashDoc for better recommendations!",
        )
    }
}
