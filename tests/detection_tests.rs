//! Integration tests for content-type detection
//!
//! These tests verify:
//! - Each format is recognized from a realistic snippet
//! - Priority order resolves overlapping categories
//! - Detection is total: arbitrary input yields a concrete tag, never `auto`

use flashdoc::FormatTag;
use flashdoc::services::detection::{PRIORITY, detect, is_format};
use proptest::prelude::*;

#[test]
fn test_detect_sql() {
    assert_eq!(detect("SELECT * FROM users WHERE id = 1;"), FormatTag::Sql);
    assert_eq!(
        detect("INSERT INTO orders (id, total) VALUES (1, 9.99);"),
        FormatTag::Sql
    );
}

#[test]
fn test_detect_yaml() {
    assert_eq!(detect("name: test\nversion: 1.0"), FormatTag::Yaml);
    assert_eq!(detect("---\nitems:\n  - one\n  - two"), FormatTag::Yaml);
}

#[test]
fn test_detect_python() {
    let content = "import os\n\ndef main():\n    print('hi')\n\nif __name__ == '__main__':\n    main()";
    assert_eq!(detect(content), FormatTag::Py);
}

#[test]
fn test_detect_javascript() {
    let content = "function hello() {\n  return 1;\n}\nconst x = 5;";
    assert_eq!(detect(content), FormatTag::Js);

    let content = "const fs = require('fs');\nlet count = 0;";
    assert_eq!(detect(content), FormatTag::Js);
}

#[test]
fn test_detect_typescript() {
    let content = "interface User {\n  name: string;\n}\nconst u: User = { name: 'a' };";
    assert_eq!(detect(content), FormatTag::Ts);
}

#[test]
fn test_detect_json() {
    assert_eq!(detect("{\"name\": \"test\", \"tags\": [1, 2]}"), FormatTag::Json);
    assert_eq!(detect("  [ {\"a\": 1} ]  "), FormatTag::Json);
}

#[test]
fn test_detect_xml() {
    assert_eq!(
        detect("<?xml version=\"1.0\"?><root><item>1</item></root>"),
        FormatTag::Xml
    );
    assert_eq!(
        detect("<svg width=\"10\" height=\"10\"><circle r=\"4\"/></svg>"),
        FormatTag::Xml
    );
}

#[test]
fn test_detect_html() {
    assert_eq!(detect("<div class=\"card\">Hello</div>"), FormatTag::Html);
    assert_eq!(
        detect("<html lang=\"en\"><body class=\"x\">Hi</body></html>"),
        FormatTag::Html
    );
}

#[test]
fn test_adjacent_tags_read_as_xml() {
    // Two adjacent bare open tags are an XML signal, checked before HTML
    assert_eq!(detect("<html><body>Hi</body></html>"), FormatTag::Xml);
}

#[test]
fn test_detect_csv() {
    assert_eq!(detect("name,age,city\nAlice,30,NYC\nBob,25,LA"), FormatTag::Csv);
    assert_eq!(detect("a;b\nc;d"), FormatTag::Csv);
}

#[test]
fn test_detect_markdown() {
    let content = "# Title\n\nSome text with a [link](http://example.com).\n\n- item one\n- item two";
    assert_eq!(detect(content), FormatTag::Md);
}

#[test]
fn test_detect_shell() {
    assert_eq!(detect("#!/bin/bash\necho \"hello\""), FormatTag::Sh);
    assert_eq!(detect("export PATH=$HOME/bin\necho done"), FormatTag::Sh);
}

#[test]
fn test_detect_css() {
    let content = ".container {\n  display: flex;\n  color: red;\n}";
    assert_eq!(detect(content), FormatTag::Css);
}

#[test]
fn test_detect_plain_text() {
    assert_eq!(detect("Hello world, this is a note."), FormatTag::Txt);
    assert_eq!(detect(""), FormatTag::Txt);
}

#[test]
fn test_yaml_outranks_python() {
    let content = "name: x\nimport os\nfrom os import path";
    assert!(is_format(FormatTag::Py, content));
    assert_eq!(detect(content), FormatTag::Yaml);
}

#[test]
fn test_priority_order_is_fixed() {
    assert_eq!(PRIORITY[0], FormatTag::Yaml);
    assert_eq!(PRIORITY[PRIORITY.len() - 1], FormatTag::Css);

    let position = |tag| PRIORITY.iter().position(|&p| p == tag).unwrap();
    assert!(position(FormatTag::Ts) < position(FormatTag::Js));
    assert!(position(FormatTag::Xml) < position(FormatTag::Html));
    assert!(position(FormatTag::Json) < position(FormatTag::Csv));
}

proptest! {
    #[test]
    fn prop_detect_is_total(content in any::<String>()) {
        let tag = detect(&content);
        prop_assert!(!matches!(tag, FormatTag::Auto | FormatTag::Pdf | FormatTag::Label));
    }

    #[test]
    fn prop_detect_is_deterministic(content in "[ -~\n]{0,200}") {
        prop_assert_eq!(detect(&content), detect(&content));
    }

    #[test]
    fn prop_detected_format_accepts_content(content in "[ -~\n]{0,200}") {
        let tag = detect(&content);
        if tag != FormatTag::Txt {
            prop_assert!(is_format(tag, &content));
        }
    }
}
