//! Resume document handling: format detection from content and plain-text extraction.
//!
//! Detection never fails. Extraction only supports PDF and DOCX; every other
//! format comes back as `DocumentError::UnsupportedFormat` so callers can never
//! mistake an error for resume text.

mod detect;
mod docx;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use detect::detect;

/// Format of a resume buffer, decided from its bytes only (never the file name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Doc,
    Unknown,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentType::Pdf => "PDF",
            DocumentType::Docx => "DOCX",
            DocumentType::Doc => "DOC",
            DocumentType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(DocumentType),

    #[error("Invalid DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid DOCX markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("DOCX archive has no {0} part")]
    MissingPart(&'static str),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),
}

/// Plain text of a resume together with the format it was extracted from.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub document_type: DocumentType,
    pub text: String,
}

/// Detects the format of `data` and extracts its text.
///
/// PDF text keeps pdf-extract's layout heuristics; DOCX text is the body
/// paragraphs joined by `\n`. DOC and unknown buffers are rejected without
/// attempting extraction.
pub fn extract_text(data: &[u8]) -> Result<ExtractedDocument, DocumentError> {
    let document_type = detect(data);
    let text = match document_type {
        DocumentType::Pdf => extract_pdf_text(data)?,
        DocumentType::Docx => docx::extract_docx_text(data)?,
        DocumentType::Doc | DocumentType::Unknown => {
            return Err(DocumentError::UnsupportedFormat(document_type))
        }
    };

    debug!(
        "Extracted {} bytes of text from {} document ({} bytes)",
        text.len(),
        document_type,
        data.len()
    );

    Ok(ExtractedDocument {
        document_type,
        text,
    })
}

fn extract_pdf_text(data: &[u8]) -> Result<String, DocumentError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocumentError::Pdf(e.to_string())),
        Err(_) => Err(DocumentError::Pdf("parser aborted on malformed input".to_string())),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Builds an in-memory ZIP archive holding the given `(name, contents)` entries.
    pub fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Wraps `body` (the children of `<w:body>`) in a minimal WordprocessingML document.
    pub fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    pub fn docx_with_body(body: &str) -> Vec<u8> {
        let document = document_xml(body);
        zip_with(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", document.as_str()),
        ])
    }

    /// Builds a one-page PDF that draws `text` in Helvetica, with a valid xref table.
    pub fn pdf_with_text(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
        }

        let xref_start = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{docx_with_body, pdf_with_text};
    use super::*;

    #[test]
    fn test_extract_pdf_text() {
        let data = pdf_with_text("Ada Lovelace");
        assert_eq!(detect(&data), DocumentType::Pdf);

        let extracted = extract_text(&data).unwrap();
        assert_eq!(extracted.document_type, DocumentType::Pdf);
        assert_eq!(extracted.text.trim(), "Ada Lovelace");
    }

    #[test]
    fn test_extract_docx_paragraphs_in_order() {
        let data = docx_with_body(
            "<w:p><w:r><w:t>Priya Raman</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Senior Data Engineer</w:t></w:r></w:p>",
        );
        let extracted = extract_text(&data).unwrap();
        assert_eq!(extracted.document_type, DocumentType::Docx);
        assert_eq!(extracted.text, "Priya Raman\nSenior Data Engineer");
    }

    #[test]
    fn test_extract_docx_is_idempotent() {
        let data = docx_with_body(
            "<w:p><w:r><w:t>Skills</w:t></w:r></w:p><w:p><w:r><w:t>Rust, SQL</w:t></w:r></w:p>",
        );
        let first = extract_text(&data).unwrap().text;
        let second = extract_text(&data).unwrap().text;
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_rejects_truncated_buffer() {
        let err = extract_text(b"\x01\x02\x03\x04").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnsupportedFormat(DocumentType::Unknown)
        ));
    }

    #[test]
    fn test_extract_rejects_legacy_doc() {
        let mut data = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        data.extend_from_slice(&[0u8; 504]);
        let err = extract_text(&data).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(DocumentType::Doc)));
        assert_eq!(err.to_string(), "Unsupported document format: DOC");
    }

    #[test]
    fn test_extract_corrupt_pdf_is_an_error_not_a_panic() {
        let err = extract_text(b"%PDF-1.7\nthis is not really a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Pdf(_)));
    }

    #[test]
    fn test_document_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(DocumentType::Docx).unwrap(), "docx");
        assert_eq!(DocumentType::Pdf.to_string(), "PDF");
    }
}
