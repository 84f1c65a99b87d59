use crate::chart::{CHART_CATEGORIES, CHART_TOKENS};
use crate::output::ExportFormat;
use crate::report::REPORT_TOP;

/// Options for one pipeline run, shared by every document of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Entries per ranked section of the text report.
    pub report_top: usize,
    /// Tokens shown in the frequency chart.
    pub chart_tokens: usize,
    /// Categories shown in the category chart.
    pub chart_categories: usize,
    /// Render chart images (skipped anyway for documents without tokens).
    pub charts: bool,
    /// Extra table export next to the report.
    pub export_format: ExportFormat,
    /// Process documents on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            report_top: REPORT_TOP,
            chart_tokens: CHART_TOKENS,
            chart_categories: CHART_CATEGORIES,
            charts: true,
            export_format: ExportFormat::None,
            parallel: false,
        }
    }
}
