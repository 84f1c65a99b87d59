//! Per-document pipeline and batch driver.
//!
//! Each document goes through normalize → annotate → aggregate, then its
//! report, optional tables and charts are written. Documents share nothing but
//! the read-only collaborators, so a failure in one never affects another.

use std::path::PathBuf;

use chrono::{DateTime, Local, SecondsFormat};
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::annotator::{Annotator, alphabetic_tokens};
use crate::chart::ChartRenderer;
use crate::config::PipelineConfig;
use crate::error::{AnnotationError, BoxError, PipelineError};
use crate::input::{Document, Source, load_document};
use crate::normalize::normalize;
use crate::output::{
    OutputSink, category_chart_name, frequency_chart_name, report_name, table_artifacts,
};
use crate::report::build_report_with;
use crate::stats::{Statistics, aggregate};

/// Name of the optional batch summary written next to the reports.
pub const SUMMARY_NAME: &str = "batch_summary.json";

/// Normalizes and annotates `doc`, then aggregates its alphabetic tokens.
pub fn analyze(doc: &Document, annotator: &dyn Annotator) -> Result<Statistics, AnnotationError> {
    let normalized = normalize(&doc.text);
    let tokens = alphabetic_tokens(annotator.annotate(&normalized)?);
    Ok(aggregate(&tokens))
}

/// What a successful document run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentArtifacts {
    pub total: usize,
    pub unique: usize,
    pub diversity: f64,
    /// Written artifacts, in write order.
    pub written: Vec<PathBuf>,
    /// True when no chart was rendered: charts disabled, both chart limits
    /// at 0, or no tokens.
    pub charts_skipped: bool,
}

/// Result for one document of a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub id: String,
    pub result: Result<DocumentArtifacts, PipelineError>,
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_err())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PipelineError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Serializable overview of the batch, stamped with the current local time.
    pub fn summary(&self) -> BatchSummary {
        let local: DateTime<Local> = Local::now();
        BatchSummary {
            generated_at: local.to_rfc3339_opts(SecondsFormat::Secs, false),
            documents: self.outcomes.len(),
            succeeded: self.succeeded(),
            failed: self.outcomes.len() - self.succeeded(),
            results: self.outcomes.iter().map(DocumentSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub generated_at: String,
    pub documents: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<DocumentSummary>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_diversity: Option<f64>,
    pub artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&DocumentOutcome> for DocumentSummary {
    fn from(outcome: &DocumentOutcome) -> Self {
        match &outcome.result {
            Ok(a) => DocumentSummary {
                id: outcome.id.clone(),
                status: "ok",
                total_tokens: Some(a.total),
                unique_tokens: Some(a.unique),
                lexical_diversity: Some(a.diversity),
                artifacts: a
                    .written
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect(),
                error: None,
            },
            Err(e) => DocumentSummary {
                id: outcome.id.clone(),
                status: e.kind(),
                total_tokens: None,
                unique_tokens: None,
                lexical_diversity: None,
                artifacts: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// The collaborators of a run. Built once, then used for every document.
pub struct Pipeline<'a> {
    annotator: &'a dyn Annotator,
    sink: &'a dyn OutputSink,
    charts: &'a dyn ChartRenderer,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        annotator: &'a dyn Annotator,
        sink: &'a dyn OutputSink,
        charts: &'a dyn ChartRenderer,
        config: PipelineConfig,
    ) -> Self {
        Pipeline {
            annotator,
            sink,
            charts,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline for one loaded document.
    pub fn process(&self, doc: &Document) -> Result<DocumentArtifacts, PipelineError> {
        info!("Analyzing {}", doc.id);
        let stats = analyze(doc, self.annotator).map_err(|source| {
            PipelineError::AnnotationFailure {
                id: doc.id.clone(),
                source,
            }
        })?;
        info!(
            "{}: {} tokens, {} unique, diversity {:.2}",
            doc.id, stats.total, stats.unique, stats.diversity
        );

        let mut written = Vec::new();
        let report = build_report_with(doc, &stats, self.config.report_top);
        written.push(self.store(&doc.id, &report_name(&doc.id), report.as_bytes())?);

        for (name, rendered) in table_artifacts(&doc.id, &stats, self.config.export_format) {
            let bytes = rendered.map_err(|e| self.write_failure(&doc.id, &name, Box::new(e)))?;
            written.push(self.store(&doc.id, &name, &bytes)?);
        }

        let mut charts_skipped = true;
        if self.config.charts && stats.is_empty() {
            warn!("{}: no alphabetic tokens, charts skipped", doc.id);
        } else if self.config.charts {
            let charts = self.emit_charts(&doc.id, &stats)?;
            charts_skipped = charts.is_empty();
            written.extend(charts);
        }

        Ok(DocumentArtifacts {
            total: stats.total,
            unique: stats.unique,
            diversity: stats.diversity,
            written,
            charts_skipped,
        })
    }

    /// Loads `source`, then processes it.
    pub fn process_source(&self, source: &Source) -> Result<DocumentArtifacts, PipelineError> {
        let doc = load_document(source).map_err(|e| PipelineError::InputUnavailable {
            id: source.id.clone(),
            source: e,
        })?;
        self.process(&doc)
    }

    /// Processes already loaded documents.
    pub fn run_documents(&self, docs: &[Document]) -> BatchReport {
        self.run(docs, |doc| (doc.id.clone(), self.process(doc)))
    }

    /// Loads and processes every source.
    pub fn run_sources(&self, sources: &[Source]) -> BatchReport {
        self.run(sources, |source| {
            (source.id.clone(), self.process_source(source))
        })
    }

    /// Writes the batch summary through the sink.
    pub fn write_summary(&self, report: &BatchReport) -> std::io::Result<PathBuf> {
        let json = serde_json::to_vec_pretty(&report.summary())?;
        self.sink.write(SUMMARY_NAME, &json)
    }

    fn run<T, F>(&self, items: &[T], job: F) -> BatchReport
    where
        T: Sync,
        F: Fn(&T) -> (String, Result<DocumentArtifacts, PipelineError>) + Sync + Send,
    {
        let finish = |(id, result): (String, Result<DocumentArtifacts, PipelineError>)| {
            if let Err(e) = &result {
                error!("{e}");
            }
            DocumentOutcome { id, result }
        };
        let outcomes: Vec<DocumentOutcome> = if self.config.parallel {
            items.par_iter().map(|item| finish(job(item))).collect()
        } else {
            items.iter().map(|item| finish(job(item))).collect()
        };
        BatchReport { outcomes }
    }

    /// Renders and stores both charts. A chart whose limit is 0 is skipped.
    fn emit_charts(&self, id: &str, stats: &Statistics) -> Result<Vec<PathBuf>, PipelineError> {
        let mut written = Vec::new();

        if self.config.chart_tokens > 0 {
            let name = frequency_chart_name(id);
            let png = self
                .charts
                .frequency_chart(id, &stats.top_tokens(self.config.chart_tokens))
                .map_err(|e| self.write_failure(id, &name, Box::new(e)))?;
            written.push(self.store(id, &name, &png)?);
        } else {
            warn!("{id}: chart_tokens is 0, frequency chart skipped");
        }

        if self.config.chart_categories > 0 {
            let name = category_chart_name(id);
            let png = self
                .charts
                .category_chart(id, &stats.top_categories(self.config.chart_categories))
                .map_err(|e| self.write_failure(id, &name, Box::new(e)))?;
            written.push(self.store(id, &name, &png)?);
        } else {
            warn!("{id}: chart_categories is 0, category chart skipped");
        }

        Ok(written)
    }

    fn store(&self, id: &str, name: &str, bytes: &[u8]) -> Result<PathBuf, PipelineError> {
        let path = self
            .sink
            .write(name, bytes)
            .map_err(|e| self.write_failure(id, name, Box::new(e)))?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    fn write_failure(&self, id: &str, name: &str, source: BoxError) -> PipelineError {
        PipelineError::OutputWriteFailure {
            id: id.to_string(),
            path: self.sink.locate(name),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::Token;
    use crate::chart::PngChartRenderer;
    use crate::output::MemorySink;

    /// Tags every whitespace-separated word as `W`.
    struct Whitespace;

    impl Annotator for Whitespace {
        fn annotate(&self, text: &str) -> Result<Vec<Token>, AnnotationError> {
            Ok(text.split_whitespace().map(|w| Token::new(w, "W")).collect())
        }
    }

    #[test]
    fn analyze_normalizes_before_annotating() {
        let doc = Document::new("d", "Le chat, LE chat! 42");
        let stats = analyze(&doc, &Whitespace).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.tokens.count("le"), 2);
        assert_eq!(stats.tokens.count("42"), 0);
    }

    #[test]
    fn process_writes_report_then_charts() {
        let sink = MemorySink::new();
        let charts = PngChartRenderer::default();
        let pipeline = Pipeline::new(&Whitespace, &sink, &charts, PipelineConfig::default());
        let artifacts = pipeline.process(&Document::new("d", "un deux un")).unwrap();
        assert_eq!(
            artifacts.written,
            vec![
                PathBuf::from("d_rapport.txt"),
                PathBuf::from("d_frequence_mots.png"),
                PathBuf::from("d_repartition_pos.png"),
            ]
        );
        assert!(!artifacts.charts_skipped);
        assert_eq!(artifacts.total, 3);
    }

    #[test]
    fn disabled_charts_are_not_rendered() {
        let sink = MemorySink::new();
        let charts = PngChartRenderer::default();
        let config = PipelineConfig {
            charts: false,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(&Whitespace, &sink, &charts, config);
        let artifacts = pipeline.process(&Document::new("d", "un deux")).unwrap();
        assert!(artifacts.charts_skipped);
        assert_eq!(sink.names(), vec!["d_rapport.txt"]);
    }

    #[test]
    fn zero_chart_limit_skips_only_that_chart() {
        let sink = MemorySink::new();
        let charts = PngChartRenderer::default();
        let config = PipelineConfig {
            chart_tokens: 0,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(&Whitespace, &sink, &charts, config);
        let artifacts = pipeline.process(&Document::new("d", "le chat dort")).unwrap();
        assert!(!artifacts.charts_skipped);
        assert_eq!(sink.names(), vec!["d_rapport.txt", "d_repartition_pos.png"]);
    }

    #[test]
    fn zero_limits_on_both_charts_is_not_a_failure() {
        let sink = MemorySink::new();
        let charts = PngChartRenderer::default();
        let config = PipelineConfig {
            chart_tokens: 0,
            chart_categories: 0,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(&Whitespace, &sink, &charts, config);
        let artifacts = pipeline.process(&Document::new("d", "le chat dort")).unwrap();
        assert!(artifacts.charts_skipped);
        assert_eq!(sink.names(), vec!["d_rapport.txt"]);
    }

    #[test]
    fn summary_lists_every_document() {
        let sink = MemorySink::new();
        let charts = PngChartRenderer::default();
        let pipeline = Pipeline::new(&Whitespace, &sink, &charts, PipelineConfig::default());
        let missing = Source {
            id: "absent".to_string(),
            path: PathBuf::from("/definitely/not/here.txt"),
        };
        let report = pipeline.run_sources(&[missing]);
        assert!(report.has_failures());
        let summary = report.summary();
        assert_eq!(summary.documents, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[0].status, "input_unavailable");

        pipeline.write_summary(&report).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&sink.get(SUMMARY_NAME).unwrap()).unwrap();
        assert_eq!(json["results"][0]["id"], "absent");
        assert!(json["generated_at"].is_string());
    }
}
