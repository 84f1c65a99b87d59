#![forbid(unsafe_code)]
//! # corpus_stats CLI
//!
//! Runs the statistics pipeline over `.txt`, `.md`, `.pdf`, `.docx` and `.odt`
//! documents and writes, per document, `{id}_rapport.txt`,
//! `{id}_frequence_mots.png` and `{id}_repartition_pos.png` into the output
//! directory.
//!
//! ## Example
//! ```bash
//! cargo run --release -- corpus/ -o resultats --export-format csv --parallel
//! ```
//!
//! See `--help` for all available options. Set `RUST_LOG=info` for progress.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use log::error;

use corpus_stats::{
    Annotator, CommandAnnotator, DirectorySink, ExportFormat, LexiconAnnotator, Pipeline,
    PipelineConfig, PngChartRenderer, TagLang, assign_ids, collect_files, print_failed_documents,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Files or directories to analyze
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory receiving reports and charts
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Also export the full frequency tables (none, csv, tsv, json)
    #[arg(long, default_value = "none")]
    export_format: ExportFormat,

    /// Language of the built-in tagger (auto, fr, en)
    #[arg(long, default_value = "auto")]
    lang: TagLang,

    /// External tagger command: reads text on stdin, prints [{"text","pos"}] JSON
    #[arg(long)]
    annotator_cmd: Option<String>,

    /// Skip chart generation
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Process documents in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Write batch_summary.json into the output directory
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Entries per section of the text report
    #[arg(long, default_value_t = corpus_stats::REPORT_TOP)]
    report_top: usize,

    /// Tokens shown in the frequency chart
    #[arg(
        long,
        default_value_t = corpus_stats::CHART_TOKENS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    chart_tokens: usize,

    /// Categories shown in the category chart
    #[arg(
        long,
        default_value_t = corpus_stats::CHART_CATEGORIES,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    chart_categories: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let annotator: Box<dyn Annotator> = match &cli.annotator_cmd {
        Some(cmd) => match CommandAnnotator::from_command_line(cmd) {
            Ok(a) => Box::new(a),
            Err(e) => {
                error!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Box::new(LexiconAnnotator::new(cli.lang)),
    };

    let sink = match DirectorySink::create(&cli.output) {
        Ok(sink) => sink,
        Err(e) => {
            error!("Error creating {}: {}", cli.output.display(), e);
            process::exit(1);
        }
    };

    let config = PipelineConfig {
        report_top: cli.report_top,
        chart_tokens: cli.chart_tokens,
        chart_categories: cli.chart_categories,
        charts: !cli.no_charts,
        export_format: cli.export_format,
        parallel: cli.parallel,
    };

    let files: Vec<PathBuf> = cli.paths.iter().flat_map(|p| collect_files(p)).collect();
    if files.is_empty() {
        error!("No supported documents found");
        process::exit(1);
    }
    let sources = assign_ids(files);

    let charts = PngChartRenderer::default();
    let pipeline = Pipeline::new(annotator.as_ref(), &sink, &charts, config);
    let report = pipeline.run_sources(&sources);

    for outcome in &report.outcomes {
        if let Ok(artifacts) = &outcome.result {
            println!(
                "{}: {} mots, {} uniques, richesse lexicale {:.2}",
                outcome.id, artifacts.total, artifacts.unique, artifacts.diversity
            );
            for path in &artifacts.written {
                println!("  {}", path.display());
            }
        }
    }

    if cli.summary {
        match pipeline.write_summary(&report) {
            Ok(path) => println!("Summary: {}", path.display()),
            Err(e) => {
                error!("Error writing summary: {}", e);
                process::exit(1);
            }
        }
    }

    if report.has_failures() {
        print_failed_documents(&report);
        process::exit(1);
    }
}
