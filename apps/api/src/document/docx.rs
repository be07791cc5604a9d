use std::io::{Cursor, Read};

use quick_xml::events::{BytesRef, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// WordprocessingML main namespace, transitional and strict.
const WORDML_NAMESPACES: [&[u8]; 2] = [
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    b"http://purl.oclc.org/ooxml/wordprocessingml/main",
];

/// Extracts the text of every top-level body paragraph, one per line.
///
/// Paragraphs inside tables and text boxes are skipped. Empty paragraphs are
/// kept as empty lines so the output mirrors the paragraph sequence.
pub(super) fn extract_docx_text(data: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let mut document_file = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => DocumentError::MissingPart(DOCUMENT_PART),
        other => DocumentError::Zip(other),
    })?;
    let mut xml = String::new();
    document_file.read_to_string(&mut xml)?;

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn is_wordml(ns: &ResolveResult<'_>) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => WORDML_NAMESPACES.contains(uri),
        _ => false,
    }
}

/// Elements are matched by namespace URI and local name, so any prefix bound
/// to the WordprocessingML namespace works, not just `w:`.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, DocumentError> {
    let mut reader = NsReader::from_str(xml);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    // Depth inside tbl / txbxContent, whose paragraphs are not body text.
    let mut skip_depth = 0usize;

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
        let word = is_wordml(&ns);

        match event {
            Event::Start(e) if word => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" => skip_depth += 1,
                b"p" if skip_depth == 0 => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::End(e) if word => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" => skip_depth = skip_depth.saturating_sub(1),
                b"p" if skip_depth == 0 && in_paragraph => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) if word && in_paragraph && skip_depth == 0 => {
                match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" | b"cr" => current.push('\n'),
                    _ => {}
                }
            }
            Event::Empty(e) if word && skip_depth == 0 && e.local_name().as_ref() == b"p" => {
                paragraphs.push(String::new());
            }
            Event::Text(e) if in_paragraph && in_text && skip_depth == 0 => {
                let value = e.xml_content().map_err(quick_xml::Error::from)?;
                current.push_str(&value);
            }
            Event::GeneralRef(e) if in_paragraph && in_text && skip_depth == 0 => {
                if let Some(resolved) = resolve_reference(&e)? {
                    current.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(paragraphs)
}

/// Resolves `&amp;`-style predefined entities and `&#NN;` / `&#xNN;` character references.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<Option<String>, DocumentError> {
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    let resolved = match name.as_ref() {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        other => other
            .strip_prefix('#')
            .and_then(|code| match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            })
            .and_then(char::from_u32)
            .map(String::from),
    };
    Ok(resolved)
}
