//! Document acquisition: walking input paths and turning files into text.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::office::{extract_text_from_docx, extract_text_from_odt};

/// Extensions picked up when walking a directory.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "docx", "odt"];

/// One unit of input text. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A document source: where to read it from and the identifier its outputs use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub path: PathBuf,
}

/// Identifier for a path: the file name without its last extension.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Expands `path` into the files to analyze, sorted by path.
///
/// Directories are walked recursively and filtered by extension. Anything
/// else (including a path that does not exist) is returned as-is so the
/// failure is reported against that document.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();
    files
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Assigns identifiers to `paths`, keeping output names collision-free.
///
/// The first occurrence of a stem keeps it; later ones get `_2`, `_3`, ... in
/// input order.
pub fn assign_ids(paths: Vec<PathBuf>) -> Vec<Source> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: Vec<String> = Vec::new();
    let mut sources = Vec::with_capacity(paths.len());

    for path in paths {
        let stem = document_id(&path);
        let n = seen.entry(stem.clone()).or_insert(0);
        *n += 1;
        let mut id = if *n == 1 { stem.clone() } else { format!("{stem}_{n}") };
        // A literal `x_2.txt` next to two `x.txt` files must not clash either.
        while taken.contains(&id) {
            *n += 1;
            id = format!("{stem}_{n}");
        }
        if id != stem {
            warn!("duplicate document id `{stem}` for {}, using `{id}`", path.display());
        }
        taken.push(id.clone());
        sources.push(Source { id, path });
    }
    sources
}

/// Reads a source file into text according to its extension.
///
/// `.pdf`, `.docx` and `.odt` go through their extractors; every other file is
/// read as strict UTF-8 text.
pub fn load_text(path: &Path) -> Result<String, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => pdf_extract::extract_text(path).map_err(|e| LoadError::Pdf(e.to_string())),
        "docx" => extract_text_from_docx(path),
        "odt" => extract_text_from_odt(path),
        "doc" | "odp" | "xlsx" | "pptx" => Err(LoadError::Unsupported(ext)),
        _ => Ok(String::from_utf8(fs::read(path)?)?),
    }
}

/// Loads `source` as a [`Document`].
pub fn load_document(source: &Source) -> Result<Document, LoadError> {
    Ok(Document::new(source.id.clone(), load_text(&source.path)?))
}
