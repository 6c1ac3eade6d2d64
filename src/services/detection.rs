//! Content-type detection.
//!
//! A best-effort classifier: every format is described by a [`DetectionRule`]
//! (ordered patterns plus a combination policy), and [`detect`] walks
//! [`PRIORITY`] returning the first format whose rule accepts the content.
//!
//! The order matters because categories overlap. TypeScript is tried before
//! JavaScript, JSON before the looser text formats, XML before HTML. Formats
//! with a near-unique marker accept a single hit; ambiguous ones need at least
//! two corroborating patterns.

use crate::models::FormatTag;
use once_cell::sync::Lazy;
use regex::Regex;

/// How pattern hits are combined into a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// One matching pattern is enough
    Any,
    /// At least `n` distinct patterns must match
    AtLeast(usize),
}

/// Rule body.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Regex sources evaluated against the raw content
    Patterns {
        /// Trimmed content starting with any of these is accepted outright
        prefixes: &'static [&'static str],
        patterns: &'static [&'static str],
        policy: Policy,
    },
    /// Trimmed content parses as a JSON object or array
    Json,
    /// Consistent delimiter-separated columns over two or more lines
    Csv,
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionRule {
    pub format: FormatTag,
    pub check: Check,
}

/// Evaluation order of [`detect`]. Anything not matched falls back to `txt`.
pub const PRIORITY: [FormatTag; 12] = [
    FormatTag::Yaml,
    FormatTag::Py,
    FormatTag::Ts,
    FormatTag::Js,
    FormatTag::Json,
    FormatTag::Xml,
    FormatTag::Sql,
    FormatTag::Sh,
    FormatTag::Csv,
    FormatTag::Md,
    FormatTag::Html,
    FormatTag::Css,
];

/// Rule table. Order here is irrelevant, [`PRIORITY`] decides.
pub static RULES: &[DetectionRule] = &[
    DetectionRule {
        format: FormatTag::Yaml,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"(?m)^[\w-]+:\s+[\w\s]",
                r"(?m)^  - ",
                r"(?m)^---\s*$",
                r"(?m)^\w+:\s*$",
            ],
            policy: Policy::Any,
        },
    },
    DetectionRule {
        format: FormatTag::Py,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"(?m)^def\s+\w+\s*\(",
                r"(?m)^class\s+\w+",
                r"(?m)^import\s+\w+",
                r"(?m)^from\s+\w+\s+import",
                r#"if\s+__name__\s*==\s*['"]__main__['"]"#,
            ],
            policy: Policy::AtLeast(2),
        },
    },
    DetectionRule {
        format: FormatTag::Ts,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r":\s*(string|number|boolean|any|void|never|unknown)\s*[;,)=]",
                r"interface\s+\w+",
                r"type\s+\w+\s*=",
                r"<\w+>",
                r"as\s+(const|string|number|boolean|any)",
                r"export\s+(type|interface)",
                r"React\.FC<",
                r"useState<.*>",
                r":\s*React\.",
            ],
            policy: Policy::AtLeast(2),
        },
    },
    DetectionRule {
        format: FormatTag::Js,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"function\s+\w+\s*\(",
                r"const\s+\w+\s*=",
                r"let\s+\w+\s*=",
                r"=>\s*\{",
                r#"require\(['"]"#,
                r#"import\s+.*\s+from\s+['"]"#,
            ],
            policy: Policy::AtLeast(2),
        },
    },
    DetectionRule {
        format: FormatTag::Json,
        check: Check::Json,
    },
    DetectionRule {
        format: FormatTag::Xml,
        check: Check::Patterns {
            prefixes: &["<?xml", "<svg"],
            patterns: &[
                r"(?i)<\?xml",
                r"(?i)<svg",
                r"<\w+[^>]*xmlns",
                r"<\w+>\s*<\w+>",
                r"(?i)<!ENTITY",
            ],
            policy: Policy::Any,
        },
    },
    DetectionRule {
        format: FormatTag::Sql,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|CREATE|DROP|ALTER|TRUNCATE)\s+",
                r"(?i)\bFROM\s+\w+",
                r"(?i)\bWHERE\s+",
                r"(?i)\bJOIN\s+",
                r"(?i)\bGROUP\s+BY\b",
                r"(?i)\bORDER\s+BY\b",
                r"(?i)\bINTO\s+\w+",
            ],
            policy: Policy::AtLeast(2),
        },
    },
    DetectionRule {
        format: FormatTag::Sh,
        check: Check::Patterns {
            prefixes: &["#!/bin/bash", "#!/bin/sh"],
            patterns: &[
                r"(?m)^#!/bin/(ba)?sh",
                r"(?m)^#!/usr/bin/env\s+(ba)?sh",
                r"\b(echo|export|source|alias)\s+",
                r"\$\{?\w+\}?",
                r"if\s+\[.*\]\s*;\s*then",
                r"for\s+\w+\s+in\s+",
                r"while\s+\[.*\]",
            ],
            policy: Policy::AtLeast(2),
        },
    },
    DetectionRule {
        format: FormatTag::Csv,
        check: Check::Csv,
    },
    DetectionRule {
        format: FormatTag::Md,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"(?m)^#{1,6}\s+",
                r"\[.+\]\(.+\)",
                r"(?m)^\s*[-*+]\s+",
                r"```\w*\n",
                r"(?m)^\d+\.\s+",
            ],
            policy: Policy::AtLeast(2),
        },
    },
    DetectionRule {
        format: FormatTag::Html,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"(?i)<html",
                r"(?i)<body",
                r"(?i)<div",
                r"(?i)<head",
                r"(?i)<!DOCTYPE",
            ],
            policy: Policy::Any,
        },
    },
    DetectionRule {
        format: FormatTag::Css,
        check: Check::Patterns {
            prefixes: &[],
            patterns: &[
                r"[\w-]+\s*\{[^}]*[\w-]+\s*:\s*[^}]+\}",
                r"@media\s*\([^)]+\)",
                r"@import\s+",
                r"[\w-]+:\s*[\w-]+(\([^)]*\))?;",
                r"\.([\w-]+)\s*\{",
                r"#([\w-]+)\s*\{",
                r"@keyframes\s+\w+",
            ],
            policy: Policy::AtLeast(2),
        },
    },
];

/// Rules with their patterns compiled once.
struct CompiledRule {
    rule: &'static DetectionRule,
    patterns: Vec<Regex>,
}

static COMPILED: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let patterns = match rule.check {
                Check::Patterns { patterns, .. } => patterns
                    .iter()
                    .map(|source| Regex::new(source).expect("valid detection regex"))
                    .collect(),
                Check::Json | Check::Csv => Vec::new(),
            };
            CompiledRule { rule, patterns }
        })
        .collect()
});

fn compiled(format: FormatTag) -> Option<&'static CompiledRule> {
    COMPILED.iter().find(|c| c.rule.format == format)
}

/// Guess the format of `content`. Always returns a concrete tag, `txt` when
/// nothing matches; never `auto`.
pub fn detect(content: &str) -> FormatTag {
    let detected = PRIORITY
        .iter()
        .copied()
        .find(|&format| is_format(format, content))
        .unwrap_or(FormatTag::Txt);

    tracing::debug!("Detected content type: {}", detected);
    detected
}

/// Evaluate a single rule in isolation, ignoring priority.
///
/// Formats without a rule (`txt`, `pdf`, `label`, `auto`) never match.
pub fn is_format(format: FormatTag, content: &str) -> bool {
    let Some(compiled) = compiled(format) else {
        return false;
    };

    match compiled.rule.check {
        Check::Json => is_json(content),
        Check::Csv => is_csv(content),
        Check::Patterns {
            prefixes, policy, ..
        } => {
            let trimmed = content.trim();
            if prefixes.iter().any(|p| trimmed.starts_with(p)) {
                return true;
            }
            let score = score_patterns(&compiled.patterns, content);
            match policy {
                Policy::Any => score >= 1,
                Policy::AtLeast(n) => score >= n,
            }
        }
    }
}

/// Number of distinct patterns of `format`'s rule matching `content`.
/// Zero for rules without patterns.
pub fn score(format: FormatTag, content: &str) -> usize {
    compiled(format)
        .map(|c| score_patterns(&c.patterns, content))
        .unwrap_or(0)
}

fn score_patterns(patterns: &[Regex], content: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(content)).count()
}

/// JSON object or array. Bare scalars (`42`, `"text"`) do not count.
pub fn is_json(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content.trim())
        .map(|value| value.is_object() || value.is_array())
        .unwrap_or(false)
}

const CSV_DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Two or more lines whose column count under the first delimiter found in
/// line 1 is consistent. Blank lines are skipped.
pub fn is_csv(content: &str) -> bool {
    let trimmed = content.trim();
    if !trimmed.contains('\n') {
        return false;
    }

    let mut lines = trimmed.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));
    let Some(header) = lines.next() else {
        return false;
    };

    let Some(delimiter) = CSV_DELIMITERS.iter().copied().find(|d| header.contains(*d)) else {
        return false;
    };

    let columns = header.split(delimiter).count();
    if columns < 2 {
        return false;
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .all(|line| line.split(delimiter).count() == columns)
}
