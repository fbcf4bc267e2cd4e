//! DOCX (Microsoft Word) raw text extraction
//!
//! DOCX files are ZIP archives; the body lives in `word/document.xml`.
//! Only running text is kept: `w:t` runs, tabs and line breaks, and a blank
//! line after every paragraph. Styles, numbering and tables are flattened.
//! The model reads the text, nobody renders it.

use crate::doc;
use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Local file header signature that starts every ZIP (and so every DOCX).
pub const ZIP_SIGNATURE: [u8; 4] = *b"PK\x03\x04";

/// Extract raw text from a DOCX payload.
///
/// # Errors
///
/// Returns an error if the payload is not a ZIP archive, has no
/// `word/document.xml`, or the XML is malformed.
pub fn docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("Not a valid DOCX (ZIP) archive")?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX has no word/document.xml")?
        .read_to_string(&mut xml)
        .context("Failed to read word/document.xml")?;
    document_text(&xml)
}

/// Extract raw text from either word-processing format.
///
/// The payload is sniffed rather than trusted: a `.doc` that is really a
/// DOCX is parsed directly, a genuine Word 97-2003 file is converted first.
///
/// # Errors
///
/// Returns an error if the payload is neither format or parsing fails.
pub fn word_text(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&ZIP_SIGNATURE) {
        docx_text(bytes)
    } else if doc::is_cfb(bytes) {
        let docx = doc::convert_to_docx(bytes)?;
        docx_text(&docx)
    } else {
        anyhow::bail!("Payload is neither a DOCX nor a Word 97-2003 document")
    }
}

/// Walk `word/document.xml` collecting run text.
///
/// Tabs and breaks count only inside a `w:r`; the `w:tab` stops declared
/// in paragraph properties are layout, not content.
fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_run_text = false;

    loop {
        match reader.read_event().context("Malformed word/document.xml")? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" if in_run => in_run_text = true,
                b"w:tab" if in_run => text.push('\t'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if in_run => text.push('\t'),
                b"w:br" | b"w:cr" if in_run => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                text.push_str(&t.unescape().context("Bad XML escape in run text")?);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_run_text = false,
                b"w:p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_paragraphs_and_runs() {
        let xml = body(
            r#"<w:p><w:r><w:t>PRIMEIRO OUTORGANTE:</w:t></w:r><w:r><w:t xml:space="preserve"> Maria Silva</w:t></w:r></w:p><w:p><w:r><w:t>NIF 123 456 789</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            document_text(&xml).unwrap(),
            "PRIMEIRO OUTORGANTE: Maria Silva\n\nNIF 123 456 789"
        );
    }

    #[test]
    fn test_tabs_breaks_and_escapes() {
        let xml = body(
            r#"<w:p><w:r><w:t>Artigo</w:t><w:tab/><w:t>1234</w:t><w:br/><w:t>Fra&#231;&#227;o &quot;A&quot; &amp; B</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            document_text(&xml).unwrap(),
            "Artigo\t1234\nFração \"A\" & B"
        );
    }

    #[test]
    fn test_text_outside_runs_is_ignored() {
        let xml = body(r"<w:p><w:pPr><w:pStyle w:val='Title'/></w:pPr><w:r><w:t>CPCV</w:t></w:r></w:p>");
        assert_eq!(document_text(&xml).unwrap(), "CPCV");
    }

    #[test]
    fn test_tab_stops_in_paragraph_properties_are_ignored() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="4320"/></w:tabs></w:pPr><w:r><w:t>NIF 123</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_text(&xml).unwrap(), "NIF 123");
    }

    #[test]
    fn test_malformed_xml() {
        assert!(document_text("<w:document><w:body><w:p></w:body>").is_err());
    }

    #[test]
    fn test_not_a_zip() {
        let err = docx_text(b"definitely not a zip").unwrap_err();
        assert!(format!("{err:#}").contains("Not a valid DOCX"));
    }

    #[test]
    fn test_word_text_rejects_unknown_signature() {
        let err = word_text(b"{\\rtf1 hello}").unwrap_err();
        assert!(err.to_string().contains("neither a DOCX"));
    }
}
