//! Paragraph text extraction from OOXML word-processing documents.
//!
//! A `.docx` file is a zip archive; the document body lives in
//! `word/document.xml` as `<w:p>` paragraphs containing `<w:t>` text runs.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::ExtractError;

/// Extract paragraph text in document order, joined by newlines.
pub fn extract_paragraphs(path: &Path) -> Result<String, ExtractError> {
    let file = File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractError::Malformed(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Malformed(format!("no document body: {}", e)))?
        .read_to_string(&mut xml)?;

    Ok(paragraphs_from_xml(&xml).join("\n"))
}

/// Collect the text of each `<w:p>` element, concatenating its `<w:t>` runs.
fn paragraphs_from_xml(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for chunk in xml.split("</w:p>") {
        // The tail after the last paragraph (sectPr etc.) has no opener.
        if !chunk.contains("<w:p>") && !chunk.contains("<w:p ") {
            continue;
        }
        paragraphs.push(text_runs(chunk));
    }
    paragraphs
}

/// Concatenate the contents of every `<w:t>` run in a paragraph chunk.
fn text_runs(chunk: &str) -> String {
    let mut text = String::new();
    let mut rest = chunk;

    while let Some(pos) = rest.find("<w:t") {
        let after = &rest[pos + 4..];
        // Reject sibling tags that share the prefix (<w:tab/>, <w:tc>, ...).
        match after.chars().next() {
            Some('>') | Some(' ') | Some('/') => {}
            _ => {
                rest = after;
                continue;
            }
        }
        let Some(close) = after.find('>') else { break };
        if after[..close].ends_with('/') {
            // Self-closing empty run.
            rest = &after[close + 1..];
            continue;
        }
        let content = &after[close + 1..];
        let Some(end) = content.find("</w:t>") else { break };
        text.push_str(&unescape(&content[..end]));
        rest = &content[end + "</w:t>".len()..];
    }

    text
}

/// Decode the five predefined XML entities.
fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const BODY: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:body>"#,
        r#"<w:p><w:r><w:t>Contact: a@b.com</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Split </w:t></w:r>"#,
        r#"<w:r><w:tab/><w:t>run &amp; entity</w:t></w:r></w:p>"#,
        r#"<w:p/>"#,
        r#"<w:sectPr><w:pgSz w:w="12240"/></w:sectPr>"#,
        r#"</w:body></w:document>"#,
    );

    fn write_docx(document_xml: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
        file
    }

    #[test]
    fn test_extract_paragraphs_in_order() {
        let docx = write_docx(BODY);
        let text = extract_paragraphs(docx.path()).unwrap();
        assert_eq!(text, "Contact: a@b.com\nSplit run & entity");
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            extract_paragraphs(file.path()),
            Err(ExtractError::Malformed(_))
        ));
    }

    #[test]
    fn test_not_a_zip_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();
        assert!(matches!(
            extract_paragraphs(file.path()),
            Err(ExtractError::Malformed(_))
        ));
    }
}
