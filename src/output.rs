//! Output destinations and artifact naming.
//!
//! Every artifact name is a pure function of the document identifier, so
//! reruns overwrite the previous outputs in place and documents never write to
//! the same file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::ValueEnum;
use csv::WriterBuilder;

use crate::stats::{FrequencyTable, Statistics, to_rows};

/// Accepts named artifacts and stores them somewhere.
pub trait OutputSink: Send + Sync {
    /// Stores `bytes` under `name`, replacing any previous content. Returns
    /// the location that was written.
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf>;

    /// Location `name` would be written to.
    fn locate(&self, name: &str) -> PathBuf;
}

/// Writes artifacts as files inside one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Uses `root` as destination, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(DirectorySink { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.locate(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    fn locate(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(name).cloned()
    }

    /// Stored names in lexical order.
    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?;
        files.insert(name.to_string(), bytes.to_vec());
        Ok(self.locate(name))
    }

    fn locate(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

pub fn report_name(id: &str) -> String {
    format!("{id}_rapport.txt")
}

pub fn frequency_chart_name(id: &str) -> String {
    format!("{id}_frequence_mots.png")
}

pub fn category_chart_name(id: &str) -> String {
    format!("{id}_repartition_pos.png")
}

/// Optional export of the full frequency tables.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Report and charts only.
    #[default]
    None,
    Csv,
    Tsv,
    Json,
}

/// Table artifacts for `stats`, each name paired with its rendered bytes.
///
/// CSV/TSV produce `{id}_mots.*` and `{id}_pos.*` with `item,count` rows in
/// ranked order; JSON produces a single `{id}_statistiques.json`.
pub fn table_artifacts(
    id: &str,
    stats: &Statistics,
    format: ExportFormat,
) -> Vec<(String, io::Result<Vec<u8>>)> {
    let (delimiter, ext) = match format {
        ExportFormat::None => return Vec::new(),
        ExportFormat::Json => {
            let json = serde_json::to_vec_pretty(&stats.export(id)).map_err(io::Error::from);
            return vec![(format!("{id}_statistiques.json"), json)];
        }
        ExportFormat::Csv => (b',', "csv"),
        ExportFormat::Tsv => (b'\t', "tsv"),
    };
    vec![
        (
            format!("{id}_mots.{ext}"),
            delimited(&stats.tokens, delimiter),
        ),
        (
            format!("{id}_pos.{ext}"),
            delimited(&stats.categories, delimiter),
        ),
    ]
}

fn delimited(table: &FrequencyTable, delimiter: u8) -> io::Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    wtr.write_record(["item", "count"])?;
    for row in to_rows(table) {
        wtr.write_record([csv_safe_cell(row.item), row.count.to_string()])?;
    }
    wtr.into_inner().map_err(|e| io::Error::other(e.to_string()))
}

/// Prefixes cells that spreadsheets would evaluate as formulas.
pub fn csv_safe_cell(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}
