//! Filename generation.
//!
//! Turns (content, format, naming policy, clock) into a file name that is safe
//! on every platform, never empty, and at most [`MAX_FILENAME_LEN`] characters
//! including the extension. Pure: the caller supplies `now`.

use crate::models::{FormatTag, NamingPattern};
use chrono::{DateTime, Utc};
use sanitize_filename::Options;

/// Upper bound on the whole file name, extension included.
pub const MAX_FILENAME_LEN: usize = 100;

/// Prefix of timestamp names.
pub const TIMESTAMP_PREFIX: &str = "flashdoc";

/// Characters of the first line considered by the `firstline` pattern.
const FIRST_LINE_CHARS: usize = 50;

/// Words used by the `firstwords` pattern.
const FIRST_WORDS: usize = 3;

/// Stem used when `firstwords` cleans everything away.
const EMPTY_STEM_FALLBACK: &str = "document";

/// Parts of the filename timestamp.
///
/// The format is the ISO-8601 UTC time with `:`/`.` turned into `-` and `T`
/// into `_`, cut to whole seconds: `2026-10-17_09-30-00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTimestamp {
    pub date: String,
    pub time: String,
}

impl FileTimestamp {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H-%M-%S").to_string(),
        }
    }

    pub fn full(&self) -> String {
        format!("{}_{}", self.date, self.time)
    }
}

/// Leading segments of `firstwords` names: `<prefix>-<NNNN>-<words>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameDecoration<'a> {
    pub prefix: &'a str,
    /// Zero-padded to four digits
    pub counter: Option<u64>,
}

/// Build the file name for `content` saved as `format`.
///
/// `format` is the logical tag: `{type}` in a custom pattern receives it
/// verbatim (`label`), while the appended extension is the physical one
/// (`pdf`).
pub fn generate_filename(
    content: &str,
    format: FormatTag,
    pattern: NamingPattern,
    custom_pattern: &str,
    now: DateTime<Utc>,
) -> String {
    generate_filename_with(
        content,
        format,
        pattern,
        custom_pattern,
        NameDecoration::default(),
        now,
    )
}

/// [`generate_filename`] with a prefix and file number for `firstwords`.
/// Other patterns ignore `decoration`.
pub fn generate_filename_with(
    content: &str,
    format: FormatTag,
    pattern: NamingPattern,
    custom_pattern: &str,
    decoration: NameDecoration<'_>,
    now: DateTime<Utc>,
) -> String {
    let extension = format.extension();
    let stamp = FileTimestamp::new(now);

    let stem = match pattern {
        NamingPattern::Timestamp => timestamp_stem(&stamp),
        NamingPattern::Firstline => {
            first_line_stem(content).unwrap_or_else(|| timestamp_stem(&stamp))
        }
        NamingPattern::Firstwords => first_words_stem(content, decoration),
        NamingPattern::Custom => custom_stem(custom_pattern, format, &stamp)
            .unwrap_or_else(|| timestamp_stem(&stamp)),
    };

    bounded(stem, extension)
}

fn timestamp_stem(stamp: &FileTimestamp) -> String {
    format!("{}_{}", TIMESTAMP_PREFIX, stamp.full())
}

/// Cleaned first line, or `None` when it is shorter than four characters.
///
/// Underscores from the line's edges are kept: `Hello World!` becomes
/// `hello_world_`.
pub fn first_line_stem(content: &str) -> Option<String> {
    let first_line = content.split('\n').next().unwrap_or_default();

    let mut cleaned = String::with_capacity(FIRST_LINE_CHARS);
    for c in first_line.chars().take(FIRST_LINE_CHARS) {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && cleaned.ends_with('_') {
            continue;
        }
        cleaned.push(c.to_ascii_lowercase());
    }

    (cleaned.chars().count() > 3).then_some(cleaned)
}

/// First words joined with `-`, keeping Unicode letters and digits, after
/// the optional prefix and file number.
pub fn first_words_stem(content: &str, decoration: NameDecoration<'_>) -> String {
    let mut words = String::new();
    if !decoration.prefix.is_empty() {
        words.push_str(decoration.prefix);
        words.push('-');
    }
    if let Some(number) = decoration.counter {
        words.push_str(&format!("{:04}-", number));
    }
    words.push_str(
        &content
            .split_whitespace()
            .take(FIRST_WORDS)
            .collect::<Vec<_>>()
            .join("-"),
    );

    let mut cleaned = String::with_capacity(words.len());
    for c in words.chars() {
        let c = if c.is_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '-'
        };
        if c == '-' && cleaned.ends_with('-') {
            continue;
        }
        cleaned.push(c);
    }

    let cleaned: String = cleaned
        .trim_matches('-')
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect();

    if cleaned.is_empty() {
        EMPTY_STEM_FALLBACK.to_string()
    } else {
        cleaned
    }
}

/// Expand a custom template. Only the first occurrence of each token is
/// replaced; unknown tokens stay literal. Returns `None` if nothing usable
/// is left after sanitizing.
pub fn custom_stem(template: &str, format: FormatTag, stamp: &FileTimestamp) -> Option<String> {
    let expanded = template
        .replacen("{date}", &stamp.date, 1)
        .replacen("{time}", &stamp.time, 1)
        .replacen("{type}", format.as_str(), 1);

    let sanitized = sanitize_filename::sanitize_with_options(
        &expanded,
        Options {
            windows: true,
            truncate: false,
            replacement: "_",
        },
    );

    let sanitized = sanitized.trim();
    (!sanitized.is_empty()).then(|| sanitized.to_string())
}

/// Append the extension, truncating the stem so the name fits
/// [`MAX_FILENAME_LEN`].
fn bounded(stem: String, extension: &str) -> String {
    let budget = MAX_FILENAME_LEN.saturating_sub(extension.chars().count() + 1);
    let stem = if stem.chars().count() > budget {
        stem.chars().take(budget).collect()
    } else {
        stem
    };
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 5, 7).unwrap()
    }

    fn name(content: &str, format: FormatTag, pattern: NamingPattern, custom: &str) -> String {
        generate_filename(content, format, pattern, custom, now())
    }

    #[test]
    fn test_timestamp_pattern() {
        let filename = name("content", FormatTag::Txt, NamingPattern::Timestamp, "");
        assert_eq!(filename, "flashdoc_2026-10-17_09-05-07.txt");
    }

    #[test]
    fn test_label_becomes_pdf() {
        let filename = name("content", FormatTag::Label, NamingPattern::Timestamp, "");
        assert!(filename.ends_with(".pdf"));
        assert!(!filename.contains(".label"));
    }

    #[test]
    fn test_firstline_pattern() {
        let filename = name(
            "My Important Document\nRest",
            FormatTag::Txt,
            NamingPattern::Firstline,
            "",
        );
        assert_eq!(filename, "my_important_document.txt");
    }

    #[test]
    fn test_firstline_keeps_edge_underscores() {
        let filename = name("Hello World!\nx", FormatTag::Txt, NamingPattern::Firstline, "");
        assert_eq!(filename, "hello_world_.txt");

        // The leading underscore counts towards the four-character minimum
        let filename = name("# abc", FormatTag::Md, NamingPattern::Firstline, "");
        assert_eq!(filename, "_abc.md");

        let filename = name("# ab", FormatTag::Md, NamingPattern::Firstline, "");
        assert!(filename.starts_with("flashdoc_"));
    }

    #[test]
    fn test_firstline_special_characters() {
        let filename = name(
            "File@Name#With$Special%Chars!\nContent",
            FormatTag::Txt,
            NamingPattern::Firstline,
            "",
        );
        assert_eq!(filename, "file_name_with_special_chars_.txt");

        let filename = name(
            "test/file:name*with?special<chars>|",
            FormatTag::Txt,
            NamingPattern::Firstline,
            "",
        );
        assert!(!filename.contains(['/', ':', '*', '?', '<', '>', '|']));
    }

    #[test]
    fn test_firstline_fallbacks() {
        let short = name("ab\nContent", FormatTag::Txt, NamingPattern::Firstline, "");
        assert!(short.starts_with("flashdoc_2026"));

        let empty = name("\n\nsecond line", FormatTag::Txt, NamingPattern::Firstline, "");
        assert!(empty.starts_with("flashdoc_"));
        assert!(empty.ends_with(".txt"));
    }

    #[test]
    fn test_firstline_long_line_truncated() {
        let filename = name(&"A".repeat(200), FormatTag::Txt, NamingPattern::Firstline, "");
        assert_eq!(filename.len(), 54);
    }

    #[test]
    fn test_custom_pattern_tokens() {
        let filename = name(
            "content",
            FormatTag::Json,
            NamingPattern::Custom,
            "backup_{date}_{time}",
        );
        assert_eq!(filename, "backup_2026-10-17_09-05-07.json");

        let filename = name("content", FormatTag::Ts, NamingPattern::Custom, "doc_{type}");
        assert_eq!(filename, "doc_ts.ts");

        let filename = name("content", FormatTag::Txt, NamingPattern::Custom, "myfile");
        assert_eq!(filename, "myfile.txt");
    }

    #[test]
    fn test_custom_pattern_keeps_logical_type() {
        let filename = name("content", FormatTag::Label, NamingPattern::Custom, "{type}_{date}");
        assert_eq!(filename, "label_2026-10-17.pdf");
    }

    #[test]
    fn test_custom_pattern_unknown_tokens_literal() {
        let filename = name("content", FormatTag::Md, NamingPattern::Custom, "{user}_{date}_{date}");
        assert_eq!(filename, "{user}_2026-10-17_{date}.md");
    }

    #[test]
    fn test_custom_pattern_strips_separators() {
        let filename = name("content", FormatTag::Txt, NamingPattern::Custom, "../etc/{type}");
        assert!(!filename.contains('/'));
        assert!(filename.ends_with(".txt"));

        let filename = name("content", FormatTag::Txt, NamingPattern::Custom, "///");
        assert!(!filename.contains('/'));
    }

    #[test]
    fn test_first_words_pattern() {
        let filename = name(
            "  Grüße aus Köln und mehr",
            FormatTag::Md,
            NamingPattern::Firstwords,
            "",
        );
        assert_eq!(filename, "Grüße-aus-Köln.md");

        let filename = name("!!! ??? ...", FormatTag::Txt, NamingPattern::Firstwords, "");
        assert_eq!(filename, "document.txt");
    }

    #[test]
    fn test_first_words_prefix_and_counter() {
        let decorated = |prefix, counter| {
            generate_filename_with(
                "Quarterly report draft v2",
                FormatTag::Md,
                NamingPattern::Firstwords,
                "",
                NameDecoration { prefix, counter },
                now(),
            )
        };

        assert_eq!(decorated("work", Some(7)), "work-0007-Quarterly-report-draft.md");
        assert_eq!(decorated("", Some(12345)), "12345-Quarterly-report-draft.md");
        assert_eq!(decorated("my notes!", None), "my-notes-Quarterly-report-draft.md");
        assert_eq!(decorated("", None), "Quarterly-report-draft.md");

        let empty = generate_filename_with(
            "   ",
            FormatTag::Txt,
            NamingPattern::Firstwords,
            "",
            NameDecoration {
                prefix: "",
                counter: Some(3),
            },
            now(),
        );
        assert_eq!(empty, "0003.txt");
    }

    #[test]
    fn test_decoration_ignored_by_other_patterns() {
        let filename = generate_filename_with(
            "content",
            FormatTag::Txt,
            NamingPattern::Timestamp,
            "",
            NameDecoration {
                prefix: "work",
                counter: Some(1),
            },
            now(),
        );
        assert_eq!(filename, "flashdoc_2026-10-17_09-05-07.txt");
    }

    #[test]
    fn test_length_ceiling_keeps_extension() {
        let long_word = "x".repeat(300);
        let filename = name(&long_word, FormatTag::Yaml, NamingPattern::Firstwords, "");
        assert_eq!(filename.chars().count(), MAX_FILENAME_LEN);
        assert!(filename.ends_with(".yaml"));

        let filename = name("c", FormatTag::Txt, NamingPattern::Custom, &"y".repeat(250));
        assert_eq!(filename.chars().count(), MAX_FILENAME_LEN);
        assert!(filename.ends_with(".txt"));
    }
}
