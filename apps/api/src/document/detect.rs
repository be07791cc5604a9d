use std::io::Cursor;

use super::DocumentType;

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK";
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Classifies a resume buffer by its magic bytes.
///
/// A ZIP buffer only counts as DOCX when it opens as an archive and holds at
/// least one `word/` entry; a corrupt archive falls through to the remaining
/// checks rather than failing.
pub fn detect(data: &[u8]) -> DocumentType {
    if data.starts_with(PDF_MAGIC) {
        return DocumentType::Pdf;
    }

    if data.starts_with(ZIP_MAGIC) && has_word_part(data) {
        return DocumentType::Docx;
    }

    if data.starts_with(&OLE_MAGIC) {
        return DocumentType::Doc;
    }

    DocumentType::Unknown
}

fn has_word_part(data: &[u8]) -> bool {
    match zip::ZipArchive::new(Cursor::new(data)) {
        Ok(archive) => archive.file_names().any(|name| name.starts_with("word/")),
        Err(_) => false,
    }
}
