//! Document encoding: content + format tag -> bytes + MIME type.

use crate::models::{FormatTag, PDF_MIME_TYPE};
use crate::services::pdf;
use thiserror::Error;

/// Bytes ready for a download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl EncodedDocument {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to write PDF document: {0}")]
    Pdf(#[from] std::io::Error),
}

/// Encode `content` for `format`.
///
/// Text formats are UTF-8 verbatim with the table MIME type. `pdf` and
/// `label` are rendered to PDF. `auto` encodes as plain text.
pub fn encode(content: &str, format: FormatTag) -> Result<EncodedDocument, EncodeError> {
    let bytes = match format {
        FormatTag::Pdf => pdf::page_pdf(content)?,
        FormatTag::Label => pdf::label_pdf(content)?,
        _ => return Ok(encode_plain(content, format)),
    };

    Ok(EncodedDocument {
        bytes,
        mime_type: PDF_MIME_TYPE,
    })
}

/// UTF-8 bytes of `content`.
///
/// Also the fallback when PDF rendering fails, in which case the MIME type is
/// plain text regardless of `format`.
pub fn encode_plain(content: &str, format: FormatTag) -> EncodedDocument {
    let mime_type = if format.is_pdf() {
        FormatTag::Txt.mime_type()
    } else {
        format.mime_type()
    };

    EncodedDocument {
        bytes: content.as_bytes().to_vec(),
        mime_type,
    }
}
