//! DOCX / ODT extraction against small archives built on the fly.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use corpus_stats::{
    Document, LexiconAnnotator, LoadError, TagLang, analyze, extract_text_from_docx,
    extract_text_from_odt, load_text,
};

/// Zip archive `name` in `dir` holding a single `entry`.
fn archive(dir: &TempDir, name: &str, entry: &str, xml: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file(entry, SimpleFileOptions::default()).unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

/// `word/document.xml` whose body is `paragraphs`.
fn docx(dir: &TempDir, name: &str, paragraphs: &str) -> PathBuf {
    let xml = format!("<w:document><w:body>{paragraphs}</w:body></w:document>");
    archive(dir, name, "word/document.xml", &xml)
}

/// `content.xml` whose text body is `paragraphs`.
fn odt(dir: &TempDir, name: &str, paragraphs: &str) -> PathBuf {
    let xml = format!(
        "<office:document-content><office:body><office:text>{paragraphs}</office:text></office:body></office:document-content>"
    );
    archive(dir, name, "content.xml", &xml)
}

fn extract(path: &Path) -> String {
    load_text(path).unwrap()
}

#[test]
fn docx_runs_breaks_and_paragraphs() {
    let dir = tempdir().unwrap();
    let path = docx(
        &dir,
        "breaks.docx",
        "<w:p><w:r><w:t>Ligne 1</w:t></w:r><w:r><w:br/></w:r><w:r><w:t>Ligne 2</w:t></w:r></w:p>\
         <w:p><w:r><w:t>Paragraphe 2</w:t></w:r></w:p>",
    );
    assert_eq!(extract(&path), "Ligne 1\nLigne 2\nParagraphe 2");
}

#[test]
fn odt_headings_paragraphs_and_entities() {
    let dir = tempdir().unwrap();
    let path = odt(
        &dir,
        "fable.odt",
        "<text:h>La Fontaine</text:h><text:p>Tom &amp; Jerry</text:p>",
    );
    assert_eq!(extract(&path), "La Fontaine\nTom & Jerry");
}

#[test]
fn docx_without_document_xml_is_an_error() {
    let dir = tempdir().unwrap();
    let path = archive(&dir, "vide.docx", "other.xml", "<x/>");
    let err = extract_text_from_docx(&path).unwrap_err();
    assert!(err.to_string().contains("word/document.xml"), "got: {err}");
}

#[test]
fn missing_office_files_are_io_errors() {
    let dir = tempdir().unwrap();
    let docx = extract_text_from_docx(&dir.path().join("absent.docx")).unwrap_err();
    let odt = extract_text_from_odt(&dir.path().join("absent.odt")).unwrap_err();
    assert!(matches!(docx, LoadError::Io(_)));
    assert!(matches!(odt, LoadError::Io(_)));
}

#[test]
fn not_a_zip_is_an_office_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("texte.docx");
    std::fs::write(&path, "just text").unwrap();
    assert!(matches!(
        extract_text_from_docx(&path),
        Err(LoadError::Office(_))
    ));
}

#[test]
fn docx_feeds_the_pipeline() {
    let dir = tempdir().unwrap();
    let path = docx(
        &dir,
        "fable.docx",
        "<w:p><w:r><w:t>Le chat mange le poisson et le chat dort.</w:t></w:r></w:p>",
    );
    let stats = analyze(
        &Document::new("fable", extract(&path)),
        &LexiconAnnotator::new(TagLang::Fr),
    )
    .unwrap();
    assert_eq!(stats.total, 9);
    assert_eq!(stats.tokens.count("le"), 3);
}
