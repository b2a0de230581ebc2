//! Document source — lists a résumé directory and extracts plain text plus contact info.
//!
//! Supported: `.pdf` (text layer via pdf-extract), `.docx` (paragraph text of
//! `word/document.xml`), `.txt`, `.md`.
//! A missing directory is fatal; a single unreadable file is logged and skipped.

use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info, warn};

use crate::errors::AppError;

pub mod contact;

pub use contact::{extract_contact_info, ContactInfo};

const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md"];

/// Main body part inside a DOCX package.
const DOCX_BODY: &str = "word/document.xml";

/// One résumé as handed to the screening pipeline.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub text: String,
    pub contact: ContactInfo,
    pub source_file: String,
}

/// Reads every supported document in `dir`, sorted by file name.
pub fn read_directory(dir: &Path) -> Result<Vec<CandidateDocument>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::DocumentSource(format!(
            "directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| AppError::DocumentSource(format!("cannot list {}: {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        if !is_supported(&path) {
            debug!("Skipping unsupported file: {}", path.display());
            continue;
        }
        info!("Reading file: {}", path.display());
        match read_document(&path) {
            Ok(document) => documents.push(document),
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
    }

    Ok(documents)
}

pub fn read_document(path: &Path) -> Result<CandidateDocument, AppError> {
    let text = extract_text(path)?;
    Ok(CandidateDocument {
        contact: extract_contact_info(&text),
        text,
        source_file: file_name(path),
    })
}

fn extract_text(path: &Path) -> Result<String, AppError> {
    match extension(path).as_deref() {
        Some("pdf") => read_pdf(path),
        Some("docx") => read_docx(path),
        Some("txt") | Some("md") => Ok(std::fs::read_to_string(path)?.trim().to_string()),
        other => Err(AppError::Document {
            file: file_name(path),
            message: format!("unsupported format: {}", other.unwrap_or("<none>")),
        }),
    }
}

fn read_pdf(path: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(path)?;
    // pdf-extract panics on some malformed files; contain it to this document.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes));
    match extracted {
        Ok(Ok(text)) => Ok(text.trim().to_string()),
        Ok(Err(e)) => Err(AppError::Document {
            file: file_name(path),
            message: format!("cannot extract text: {e:?}"),
        }),
        Err(_) => Err(AppError::Document {
            file: file_name(path),
            message: "PDF decoder panicked".to_string(),
        }),
    }
}

fn read_docx(path: &Path) -> Result<String, AppError> {
    let document_error = |message: String| AppError::Document {
        file: file_name(path),
        message,
    };

    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| document_error(format!("not a DOCX package: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| document_error(format!("missing {DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)?;

    docx_paragraphs(&xml)
        .map(|text| text.trim().to_string())
        .map_err(|e| document_error(format!("malformed {DOCX_BODY}: {e}")))
}

/// Concatenates the `<w:t>` runs of every `<w:p>` paragraph, one paragraph per line.
fn docx_paragraphs(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => text.push('\n'),
                b"w:tab" => text.push('\t'),
                _ => {}
            },
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn write_docx(path: &Path, body_xml: &str) {
        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        zip.start_file(DOCX_BODY, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let err = read_directory(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, AppError::DocumentSource(_)));
    }

    #[test]
    fn test_reads_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_maria.txt"), "Maria Souza\nmaria@ex.com\nSQL").unwrap();
        fs::write(dir.path().join("a_joao.md"), "João Silva\n(11) 99999-9999\nPython").unwrap();
        fs::write(dir.path().join("notes.odt"), "binary").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let docs = read_directory(dir.path()).unwrap();
        let files: Vec<_> = docs.iter().map(|d| d.source_file.as_str()).collect();
        assert_eq!(files, vec!["a_joao.md", "b_maria.txt"]);
        assert_eq!(docs[0].contact.name.as_deref(), Some("João Silva"));
        assert_eq!(docs[0].contact.phone.as_deref(), Some("(11) 99999-9999"));
        assert_eq!(docs[1].contact.email.as_deref(), Some("maria@ex.com"));
        assert!(docs[1].text.ends_with("SQL"));
    }

    #[test]
    fn test_broken_pdf_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();
        fs::write(dir.path().join("ok.txt"), "Ana Lima\nRust").unwrap();

        let docs = read_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source_file, "ok.txt");
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        assert!(is_supported(Path::new("CV.PDF")));
        assert!(is_supported(Path::new("cv.Txt")));
        assert!(is_supported(Path::new("cv.DOCX")));
        assert!(!is_supported(Path::new("cv.doc")));
        assert!(!is_supported(Path::new("README")));
    }

    #[test]
    fn test_reads_docx_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        write_docx(
            &dir.path().join("carla.docx"),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Carla Mendes</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">carla@ex.com </w:t></w:r><w:r><w:t>| (21) 98888-7777</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>Python &amp; SQL</w:t></w:r></w:p>
</w:body></w:document>"#,
        );

        let docs = read_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].text,
            "Carla Mendes\ncarla@ex.com | (21) 98888-7777\n\nPython & SQL"
        );
        assert_eq!(docs[0].contact.name.as_deref(), Some("Carla Mendes"));
        assert_eq!(docs[0].contact.email.as_deref(), Some("carla@ex.com"));
        assert_eq!(docs[0].contact.phone.as_deref(), Some("(21) 98888-7777"));
    }

    #[test]
    fn test_corrupt_docx_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.docx"), b"PK not really a zip").unwrap();
        fs::write(dir.path().join("ok.txt"), "Ana Lima\nRust").unwrap();

        let docs = read_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source_file, "ok.txt");
    }
}
