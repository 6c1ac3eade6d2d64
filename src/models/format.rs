//! The closed set of output formats with their extensions and MIME types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Logical output format chosen for a save.
///
/// `Auto` is a request, never a final tag: it is resolved by the classifier
/// (or to `Txt` when auto-detection is disabled) before anything is encoded.
/// `Label` is the only tag whose file extension differs from its name: label
/// documents are PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Txt,
    Md,
    Json,
    Js,
    Ts,
    Py,
    Html,
    Css,
    Xml,
    Sql,
    Sh,
    Csv,
    Yaml,
    Pdf,
    Label,
    Auto,
}

/// Default MIME type for any extension missing from [`mime_type_for`]'s table.
pub const DEFAULT_MIME_TYPE: &str = "text/plain;charset=utf-8";

/// MIME type for PDF and label documents.
pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown format: {0}")]
pub struct UnknownFormat(pub String);

impl FormatTag {
    /// Every tag, in menu order.
    pub const ALL: [FormatTag; 16] = [
        FormatTag::Auto,
        FormatTag::Txt,
        FormatTag::Md,
        FormatTag::Json,
        FormatTag::Js,
        FormatTag::Ts,
        FormatTag::Py,
        FormatTag::Html,
        FormatTag::Css,
        FormatTag::Xml,
        FormatTag::Sql,
        FormatTag::Sh,
        FormatTag::Yaml,
        FormatTag::Csv,
        FormatTag::Pdf,
        FormatTag::Label,
    ];

    /// Identifier used in settings, stats and the `{type}` filename token.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Txt => "txt",
            FormatTag::Md => "md",
            FormatTag::Json => "json",
            FormatTag::Js => "js",
            FormatTag::Ts => "ts",
            FormatTag::Py => "py",
            FormatTag::Html => "html",
            FormatTag::Css => "css",
            FormatTag::Xml => "xml",
            FormatTag::Sql => "sql",
            FormatTag::Sh => "sh",
            FormatTag::Csv => "csv",
            FormatTag::Yaml => "yaml",
            FormatTag::Pdf => "pdf",
            FormatTag::Label => "label",
            FormatTag::Auto => "auto",
        }
    }

    /// Physical file extension. Labels are written as PDFs; an unresolved
    /// `Auto` is written as plain text.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatTag::Label => "pdf",
            FormatTag::Auto => "txt",
            other => other.as_str(),
        }
    }

    /// MIME type of the encoded document.
    pub fn mime_type(&self) -> &'static str {
        match self {
            FormatTag::Pdf | FormatTag::Label => PDF_MIME_TYPE,
            other => mime_type_for(other.extension()),
        }
    }

    /// True for tags that produce a PDF document.
    pub fn is_pdf(&self) -> bool {
        matches!(self, FormatTag::Pdf | FormatTag::Label)
    }

    /// Human readable label shown next to a format choice.
    pub fn display_label(&self) -> &'static str {
        match self {
            FormatTag::Auto => "Smart auto-detect",
            FormatTag::Txt => "Plain text (.txt)",
            FormatTag::Md => "Markdown (.md)",
            FormatTag::Json => "JSON (.json)",
            FormatTag::Js => "JavaScript (.js)",
            FormatTag::Ts => "TypeScript (.ts)",
            FormatTag::Py => "Python (.py)",
            FormatTag::Html => "HTML (.html)",
            FormatTag::Css => "CSS (.css)",
            FormatTag::Xml => "XML (.xml)",
            FormatTag::Sql => "SQL (.sql)",
            FormatTag::Sh => "Shell (.sh)",
            FormatTag::Yaml => "YAML (.yaml)",
            FormatTag::Csv => "CSV (.csv)",
            FormatTag::Pdf => "PDF (.pdf)",
            FormatTag::Label => "Label (89×28mm PDF)",
        }
    }
}

/// Text MIME type for an extension. Unknown extensions map to
/// [`DEFAULT_MIME_TYPE`].
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        "txt" => "text/plain;charset=utf-8",
        "md" => "text/markdown;charset=utf-8",
        "yaml" => "text/yaml;charset=utf-8",
        "py" => "text/x-python;charset=utf-8",
        "js" => "text/javascript;charset=utf-8",
        "ts" | "tsx" => "text/typescript;charset=utf-8",
        "json" => "application/json;charset=utf-8",
        "html" => "text/html;charset=utf-8",
        "css" => "text/css;charset=utf-8",
        "xml" => "application/xml;charset=utf-8",
        "svg" => "image/svg+xml;charset=utf-8",
        "sql" => "application/sql;charset=utf-8",
        "sh" | "bash" => "application/x-sh;charset=utf-8",
        "csv" => "text/csv;charset=utf-8",
        "pdf" | "label" => PDF_MIME_TYPE,
        _ => DEFAULT_MIME_TYPE,
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().trim_start_matches('.').to_ascii_lowercase();
        FormatTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == needle)
            .or(match needle.as_str() {
                "yml" => Some(FormatTag::Yaml),
                "markdown" => Some(FormatTag::Md),
                "bash" => Some(FormatTag::Sh),
                "tsx" => Some(FormatTag::Ts),
                "svg" => Some(FormatTag::Xml),
                _ => None,
            })
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
