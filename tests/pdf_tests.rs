//! Integration tests for PDF and label documents
//!
//! These tests verify:
//! - The cross-reference table points at every object for arbitrary text
//! - The trailer declares the object count and the catalog
//! - Label layout respects the line cap and the font size range

use flashdoc::FormatTag;
use flashdoc::services::encode;
use flashdoc::services::pdf::{
    LABEL_FONT_MAX, LABEL_FONT_MIN, LABEL_MAX_LINES, label_pdf, layout_label, page_pdf,
};
use proptest::prelude::*;

/// Byte offsets listed in the xref table, after checking `startxref`.
fn xref_offsets(pdf: &[u8]) -> Vec<usize> {
    let marker = b"startxref\n";
    let tail = pdf
        .windows(marker.len())
        .rposition(|w| w == marker)
        .expect("startxref present")
        + marker.len();
    let xref_at: usize = String::from_utf8_lossy(&pdf[tail..])
        .lines()
        .next()
        .and_then(|n| n.parse().ok())
        .expect("startxref offset");
    assert!(pdf[xref_at..].starts_with(b"xref\n0 6\n0000000000 65535 f \n"));

    String::from_utf8_lossy(&pdf[xref_at..])
        .lines()
        .skip(3)
        .take_while(|line| line.len() == 19 && line.ends_with(" n "))
        .map(|line| line[..10].parse().unwrap())
        .collect()
}

fn assert_well_formed(pdf: &[u8]) {
    assert!(pdf.starts_with(b"%PDF-1.4\n"));
    assert!(pdf.ends_with(b"%%EOF\n"));

    let offsets = xref_offsets(pdf);
    assert_eq!(offsets.len(), 5);
    for (i, offset) in offsets.iter().enumerate() {
        let header = format!("{} 0 obj\n", i + 1);
        assert!(pdf[*offset..].starts_with(header.as_bytes()));
    }

    let text = String::from_utf8_lossy(pdf);
    assert!(text.contains("trailer\n<< /Size 6 /Root 1 0 R >>"));
    assert!(text.contains("/Type /Catalog /Pages 2 0 R"));
    assert!(text.contains("/BaseFont /Helvetica"));
}

#[test]
fn test_page_document() {
    let pdf = page_pdf("Hello (world)\n\\path\\to\\file").unwrap();
    assert_well_formed(&pdf);

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("(Hello \\(world\\)) Tj"));
    assert!(text.contains("T*\n(\\\\path\\\\to\\\\file) Tj"));
}

#[test]
fn test_label_document() {
    let pdf = label_pdf("Storage Box 12\nCables and adapters").unwrap();
    assert_well_formed(&pdf);
    assert!(String::from_utf8_lossy(&pdf).contains("/MediaBox [0 0 252.28 79.37]"));
}

#[test]
fn test_encoder_routes_pdf_formats() {
    let page = encode("content", FormatTag::Pdf).unwrap();
    assert_well_formed(&page.bytes);
    assert!(String::from_utf8_lossy(&page.bytes).contains("/MediaBox [0 0 612 792]"));

    let label = encode("content", FormatTag::Label).unwrap();
    assert_well_formed(&label.bytes);
}

#[test]
fn test_long_label_text_is_merged_and_shrunk() {
    let content = (1..=12)
        .map(|i| format!("Line number {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let layout = layout_label(&content);

    assert_eq!(layout.lines.len(), LABEL_MAX_LINES);
    assert_eq!(layout.lines[0], "Line number 1");
    assert!(layout.lines[3].starts_with("Line number 4 Line number 5"));
    assert!(layout.font_size <= LABEL_FONT_MAX);
    assert!(layout.font_size >= LABEL_FONT_MIN);
}

proptest! {
    #[test]
    fn prop_page_xref_is_exact(content in any::<String>()) {
        let pdf = page_pdf(&content).unwrap();
        assert_well_formed(&pdf);
    }

    #[test]
    fn prop_label_xref_is_exact(content in any::<String>()) {
        let pdf = label_pdf(&content).unwrap();
        assert_well_formed(&pdf);
    }

    #[test]
    fn prop_label_layout_bounds(content in "[a-zA-Z0-9 \n]{0,400}") {
        let layout = layout_label(&content);
        prop_assert!(layout.lines.len() <= LABEL_MAX_LINES);
        prop_assert!(layout.font_size >= LABEL_FONT_MIN);
        prop_assert!(layout.font_size <= LABEL_FONT_MAX);
    }
}
