//! Minimal PDF 1.4 generation.
//!
//! Two single-page layouts share one writer:
//! - [`page_pdf`]: US-Letter text dump, one line of content per text line
//! - [`label_pdf`]: 89×28 mm print label with word wrap, font shrinking and
//!   vertical centering
//!
//! Every document has the same five objects (catalog, pages, page, content
//! stream, Helvetica font), a cross-reference table whose offsets are recorded
//! while the bytes are emitted, and a trailer pointing at the catalog.

use std::io::{self, Write};

/// Binary comment after the header so transfer tools treat the file as binary.
const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";

pub const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;
const PAGE_ID: u32 = 3;
const CONTENTS_ID: u32 = 4;
const FONT_ID: u32 = 5;

/// US-Letter in points.
pub const PAGE_WIDTH_PT: f64 = 612.0;
pub const PAGE_HEIGHT_PT: f64 = 792.0;
const PAGE_FONT_SIZE: u32 = 12;
const PAGE_LEADING: u32 = 14;
const PAGE_ORIGIN_X: u32 = 50;
const PAGE_ORIGIN_Y: u32 = 750;
/// Characters kept per line on a page.
pub const PAGE_MAX_LINE_CHARS: usize = 90;
/// Lines kept on a page.
pub const PAGE_MAX_LINES: usize = 50;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
pub const LABEL_WIDTH_MM: f64 = 89.0;
pub const LABEL_HEIGHT_MM: f64 = 28.0;
const LABEL_MARGIN_PT: f64 = 6.0;
/// Characters per wrapped label line.
pub const LABEL_WRAP_CHARS: usize = 32;
/// Lines on a label; extra lines are merged into the last one.
pub const LABEL_MAX_LINES: usize = 4;
pub const LABEL_FONT_MAX: f64 = 14.0;
pub const LABEL_FONT_MIN: f64 = 6.0;
const LABEL_FONT_STEP: f64 = 0.5;
const LABEL_LINE_SPACING: f64 = 1.2;
/// Average Helvetica glyph width as a fraction of the font size.
const HELVETICA_AVG_WIDTH: f64 = 0.55;

pub fn label_width_pt() -> f64 {
    LABEL_WIDTH_MM * POINTS_PER_MM
}

pub fn label_height_pt() -> f64 {
    LABEL_HEIGHT_MM * POINTS_PER_MM
}

/// Sequential object writer with byte-accurate offset bookkeeping.
///
/// Objects get ids 1, 2, 3... in the order they are added, so callers that
/// cross-reference objects must add them in id order.
pub struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            buf: HEADER.to_vec(),
            offsets: Vec::new(),
        }
    }

    /// Append `N 0 obj <body> endobj` and return `N`.
    pub fn add_object(&mut self, body: &str) -> io::Result<u32> {
        let id = self.begin_object();
        write!(self.buf, "{} 0 obj\n{}\nendobj\n", id, body)?;
        Ok(id)
    }

    /// Append a stream object with an exact `/Length` and return its id.
    pub fn add_stream(&mut self, data: &[u8]) -> io::Result<u32> {
        let id = self.begin_object();
        write!(
            self.buf,
            "{} 0 obj\n<< /Length {} >>\nstream\n",
            id,
            data.len()
        )?;
        self.buf.write_all(data)?;
        self.buf.write_all(b"\nendstream\nendobj\n")?;
        Ok(id)
    }

    fn begin_object(&mut self) -> u32 {
        self.offsets.push(self.buf.len());
        self.offsets.len() as u32
    }

    /// Number of objects written so far, excluding the free entry 0.
    pub fn object_count(&self) -> usize {
        self.offsets.len()
    }

    /// Write the xref table and trailer and return the document bytes.
    pub fn finish(mut self, root: u32) -> io::Result<Vec<u8>> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;

        write!(self.buf, "xref\n0 {}\n", size)?;
        // Entries are exactly 20 bytes: 10-digit offset, 5-digit generation, type, space, LF
        self.buf.write_all(b"0000000000 65535 f \n")?;
        for offset in &self.offsets {
            write!(self.buf, "{:010} 00000 n \n", offset)?;
        }

        write!(
            self.buf,
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, root, xref_offset
        )?;

        Ok(self.buf)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// One page, one Helvetica font, one content stream.
fn single_page_document(width: f64, height: f64, content: &[u8]) -> io::Result<Vec<u8>> {
    let mut writer = PdfWriter::new();

    writer.add_object(&format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID))?;
    writer.add_object(&format!(
        "<< /Type /Pages /Kids [{} 0 R] /Count 1 >>",
        PAGE_ID
    ))?;
    writer.add_object(&format!(
        "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
        PAGES_ID,
        format_number(width),
        format_number(height),
        FONT_ID,
        CONTENTS_ID
    ))?;
    writer.add_stream(content)?;
    writer.add_object(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;

    debug_assert_eq!(writer.object_count(), FONT_ID as usize);
    writer.finish(CATALOG_ID)
}

/// Integral values print without decimals, everything else with two.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Encode `text` as the body of a PDF literal string.
///
/// `(`, `)` and `\` are backslash-escaped. Latin-1 characters become single
/// bytes, tabs become spaces, other control characters are dropped and
/// anything Helvetica cannot show becomes `?`.
pub fn escape_pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            '\t' => out.push(b' '),
            c if c.is_control() => {}
            c if (c as u32) < 0x80 || ((c as u32) >= 0xA0 && (c as u32) <= 0xFF) => {
                out.push(c as u32 as u8)
            }
            _ => out.push(b'?'),
        }
    }
    out
}

fn push_text_lines(stream: &mut Vec<u8>, lines: &[String]) -> io::Result<()> {
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            stream.write_all(b"T*\n")?;
        }
        stream.write_all(b"(")?;
        stream.write_all(&escape_pdf_text(line))?;
        stream.write_all(b") Tj\n")?;
    }
    Ok(())
}

/// Lines shown on a page: at most [`PAGE_MAX_LINES`] lines of at most
/// [`PAGE_MAX_LINE_CHARS`] characters.
pub fn page_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .take(PAGE_MAX_LINES)
        .map(|line| line.chars().take(PAGE_MAX_LINE_CHARS).collect())
        .collect()
}

/// Full-page text document.
pub fn page_pdf(content: &str) -> io::Result<Vec<u8>> {
    let lines = page_lines(content);

    let mut stream = Vec::new();
    write!(
        stream,
        "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
        PAGE_FONT_SIZE, PAGE_LEADING, PAGE_ORIGIN_X, PAGE_ORIGIN_Y
    )?;
    push_text_lines(&mut stream, &lines)?;
    stream.write_all(b"ET")?;

    single_page_document(PAGE_WIDTH_PT, PAGE_HEIGHT_PT, &stream)
}

/// Computed placement of label text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub lines: Vec<String>,
    pub font_size: f64,
    pub leading: f64,
    pub origin_x: f64,
    pub first_baseline: f64,
}

/// Greedy word wrap at `width` characters. Words longer than `width` are
/// split. Blank source lines are dropped.
pub fn wrap_words(content: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for source_line in content.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in source_line.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                let chunk_len = chunk.len();
                let needed = if current_len == 0 {
                    chunk_len
                } else {
                    current_len + 1 + chunk_len
                };

                if needed > width && current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(chunk);
                current_len += chunk_len;
            }
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}

/// Longest line (in characters) that fits the printable width at `font_size`.
fn max_chars_at(font_size: f64) -> usize {
    let printable = label_width_pt() - 2.0 * LABEL_MARGIN_PT;
    (printable / (font_size * HELVETICA_AVG_WIDTH)).floor() as usize
}

fn fits(lines: &[String], font_size: f64) -> bool {
    let printable_width = label_width_pt() - 2.0 * LABEL_MARGIN_PT;
    let printable_height = label_height_pt() - 2.0 * LABEL_MARGIN_PT;

    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = widest as f64 * font_size * HELVETICA_AVG_WIDTH;
    let height = lines.len() as f64 * font_size * LABEL_LINE_SPACING;

    width <= printable_width && height <= printable_height
}

/// Wrap, cap the line count, then shrink the font until the block fits.
pub fn layout_label(content: &str) -> LabelLayout {
    let mut lines = wrap_words(content, LABEL_WRAP_CHARS);

    if lines.len() > LABEL_MAX_LINES {
        let tail = lines.split_off(LABEL_MAX_LINES - 1).join(" ");
        lines.push(tail);
    }

    // The merged last line may still be too wide even at the smallest size
    let floor_chars = max_chars_at(LABEL_FONT_MIN);
    for line in lines.iter_mut() {
        if line.chars().count() > floor_chars {
            let mut clipped: String = line.chars().take(floor_chars.saturating_sub(3)).collect();
            clipped.push_str("...");
            *line = clipped;
        }
    }

    let mut font_size = LABEL_FONT_MAX;
    while font_size > LABEL_FONT_MIN && !fits(&lines, font_size) {
        font_size -= LABEL_FONT_STEP;
    }
    let font_size = font_size.max(LABEL_FONT_MIN);

    let leading = font_size * LABEL_LINE_SPACING;
    let block_height = lines.len() as f64 * leading;
    let first_baseline = (label_height_pt() + block_height) / 2.0 - font_size;

    LabelLayout {
        lines,
        font_size,
        leading,
        origin_x: LABEL_MARGIN_PT,
        first_baseline,
    }
}

/// 89×28 mm label document.
pub fn label_pdf(content: &str) -> io::Result<Vec<u8>> {
    let layout = layout_label(content);

    let mut stream = Vec::new();
    write!(
        stream,
        "BT\n/F1 {:.1} Tf\n{:.2} TL\n{:.2} {:.2} Td\n",
        layout.font_size, layout.leading, layout.origin_x, layout.first_baseline
    )?;
    push_text_lines(&mut stream, &layout.lines)?;
    stream.write_all(b"ET")?;

    single_page_document(label_width_pt(), label_height_pt(), &stream)
}
