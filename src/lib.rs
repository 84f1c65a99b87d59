#![forbid(unsafe_code)]
//! # corpus_stats
//!
//! Descriptive statistics for natural-language documents: token counts,
//! vocabulary size, lexical diversity and the distribution of grammatical
//! categories, written out as a text report plus two PNG charts per document.
//!
//! Each document runs through the same stages, independently of the others:
//!
//! 1. [`normalize`]: lowercase, strip ASCII punctuation.
//! 2. [`Annotator::annotate`]: tokens with a grammatical category. The
//!    annotator is injected; [`LexiconAnnotator`] is built in and
//!    [`CommandAnnotator`] wraps an external tagger.
//! 3. [`aggregate`]: frequency tables, unique count and diversity over the
//!    alphabetic tokens.
//! 4. [`build_report`] and the [`ChartRenderer`], written through an
//!    [`OutputSink`].
//!
//! ## Example
//! ```
//! use corpus_stats::{
//!     Document, LexiconAnnotator, MemorySink, Pipeline, PipelineConfig, PngChartRenderer, TagLang,
//! };
//!
//! let annotator = LexiconAnnotator::new(TagLang::Fr);
//! let sink = MemorySink::new();
//! let charts = PngChartRenderer::default();
//! let pipeline = Pipeline::new(&annotator, &sink, &charts, PipelineConfig::default());
//!
//! let doc = Document::new("fable", "Le chat mange le poisson et le chat dort.");
//! let artifacts = pipeline.process(&doc).unwrap();
//! assert_eq!(artifacts.total, 9);
//! assert!(sink.get("fable_rapport.txt").is_some());
//! assert!(sink.get("fable_frequence_mots.png").is_some());
//! ```

mod annotator;
mod chart;
mod config;
mod error;
mod input;
mod lexicon;
mod normalize;
mod office;
mod output;
mod pipeline;
mod report;
mod stats;

pub use annotator::{Annotator, CommandAnnotator, Token, alphabetic_tokens};
pub use chart::{CHART_CATEGORIES, CHART_TOKENS, ChartRenderer, PngChartRenderer};
pub use config::PipelineConfig;
pub use error::{AnnotationError, BoxError, ChartError, LoadError, PipelineError};
pub use input::{
    Document, SUPPORTED_EXTENSIONS, Source, assign_ids, collect_files, document_id,
    load_document, load_text,
};
pub use lexicon::{LexiconAnnotator, TagLang};
pub use normalize::normalize;
pub use office::{extract_text_from_docx, extract_text_from_odt};
pub use output::{
    DirectorySink, ExportFormat, MemorySink, OutputSink, category_chart_name, csv_safe_cell,
    frequency_chart_name, report_name, table_artifacts,
};
pub use pipeline::{
    BatchReport, BatchSummary, DocumentArtifacts, DocumentOutcome, DocumentSummary, Pipeline,
    SUMMARY_NAME, analyze,
};
pub use report::{REPORT_TOP, build_report, build_report_with};
pub use stats::{
    CountRow, FrequencyTable, Statistics, StatisticsExport, aggregate, lexical_diversity,
};

/// Lists failed documents on stderr, one per line.
pub fn print_failed_documents(report: &BatchReport) {
    let failures: Vec<&PipelineError> = report.failures().collect();
    if failures.is_empty() {
        return;
    }
    eprintln!("\n{} document(s) failed:", failures.len());
    for e in failures {
        eprintln!("  {}: {}", e.document_id(), e);
    }
}
