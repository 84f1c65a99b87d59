use crate::input::Document;
use crate::stats::Statistics;

/// Number of entries listed in each ranked section of the report.
pub const REPORT_TOP: usize = 10;

/// Renders the text report for `doc` with the default section length.
pub fn build_report(doc: &Document, stats: &Statistics) -> String {
    build_report_with(doc, stats, REPORT_TOP)
}

/// Renders the text report, listing at most `top` entries per ranked section.
///
/// Layout (no trailing newline):
///
/// ```text
/// Rapport statistique pour : <id>
/// ----------------------------------------
/// Nombre total de mots       : <total>
/// Nombre de mots uniques     : <unique>
/// Richesse lexicale : <diversity, 2 decimals>
///
/// Mots les plus fréquents :
///   <token> : <count>
///
/// Parties du discours (POS) les plus fréquentes :
///   <category> : <count>
/// ```
///
/// The output depends only on its inputs, so reruns are byte-identical.
pub fn build_report_with(doc: &Document, stats: &Statistics, top: usize) -> String {
    let mut lines: Vec<String> = vec![
        format!("Rapport statistique pour : {}", doc.id),
        "-".repeat(40),
        format!("Nombre total de mots       : {}", stats.total),
        format!("Nombre de mots uniques     : {}", stats.unique),
        format!("Richesse lexicale : {:.2}", stats.diversity),
        String::new(),
        "Mots les plus fréquents :".to_string(),
    ];
    lines.extend(ranked_lines(&stats.top_tokens(top)));

    lines.push(String::new());
    lines.push("Parties du discours (POS) les plus fréquentes :".to_string());
    lines.extend(ranked_lines(&stats.top_categories(top)));

    lines.join("\n")
}

fn ranked_lines(ranked: &[(&str, usize)]) -> Vec<String> {
    ranked
        .iter()
        .map(|(item, count)| format!("  {item} : {count}"))
        .collect()
}
