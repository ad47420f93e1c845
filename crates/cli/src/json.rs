use std::io;

use code_plagiarism_core::{Analysis, PairReport, ScanStats, SharedRegion, SharedSpan};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonScanStats {
    pub(crate) candidate_files: u64,
    pub(crate) scanned_files: u64,
    pub(crate) scanned_bytes: u64,
    pub(crate) skipped_not_found: u64,
    pub(crate) skipped_permission_denied: u64,
    pub(crate) skipped_too_large: u64,
    pub(crate) skipped_binary: u64,
    pub(crate) skipped_not_utf8: u64,
    pub(crate) skipped_extension: u64,
    pub(crate) skipped_walk_errors: u64,
    pub(crate) skipped_budget_max_files: u64,
    pub(crate) truncated_hashes: u64,
}

impl From<ScanStats> for JsonScanStats {
    fn from(stats: ScanStats) -> Self {
        Self {
            candidate_files: stats.candidate_files,
            scanned_files: stats.scanned_files,
            scanned_bytes: stats.scanned_bytes,
            skipped_not_found: stats.skipped_not_found,
            skipped_permission_denied: stats.skipped_permission_denied,
            skipped_too_large: stats.skipped_too_large,
            skipped_binary: stats.skipped_binary,
            skipped_not_utf8: stats.skipped_not_utf8,
            skipped_extension: stats.skipped_extension,
            skipped_walk_errors: stats.skipped_walk_errors,
            skipped_budget_max_files: stats.skipped_budget_max_files,
            truncated_hashes: stats.truncated_hashes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonFileSummary {
    pub(crate) id: usize,
    pub(crate) path: String,
    pub(crate) tokens: usize,
    pub(crate) fingerprints: usize,
}

/// Token range plus zero-based source coordinates; `endCol` is exclusive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSpan {
    pub(crate) start: usize,
    pub(crate) stop: usize,
    pub(crate) start_row: u32,
    pub(crate) start_col: u32,
    pub(crate) end_row: u32,
    pub(crate) end_col: u32,
}

impl From<SharedSpan> for JsonSpan {
    fn from(span: SharedSpan) -> Self {
        Self {
            start: span.start,
            stop: span.stop,
            start_row: span.region.start_row(),
            start_col: span.region.start_col(),
            end_row: span.region.end_row(),
            end_col: span.region.end_col(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSharedRegion {
    pub(crate) kind: &'static str,
    pub(crate) confidence: f64,
    pub(crate) matches: usize,
    pub(crate) left: JsonSpan,
    pub(crate) right: JsonSpan,
    pub(crate) preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tokens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonPairReport {
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) left_path: String,
    pub(crate) right_path: String,
    pub(crate) similarity: f64,
    pub(crate) overlap: usize,
    pub(crate) coverage_left: f64,
    pub(crate) coverage_right: f64,
    pub(crate) longest_fragment: usize,
    pub(crate) regions: Vec<JsonSharedRegion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonAnalysis {
    pub(crate) files: Vec<JsonFileSummary>,
    pub(crate) pairs: Vec<JsonPairReport>,
    pub(crate) compared_pairs: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonAnalysisWithStats {
    pub(crate) analysis: JsonAnalysis,
    pub(crate) scan_stats: JsonScanStats,
}

fn map_region(region: SharedRegion, with_tokens: bool) -> JsonSharedRegion {
    JsonSharedRegion {
        kind: region.kind.as_str(),
        confidence: region.confidence,
        matches: region.matches,
        left: region.left.into(),
        right: region.right.into(),
        preview: region.preview,
        tokens: with_tokens.then_some(region.tokens),
    }
}

fn map_pair(pair: PairReport, with_tokens: bool) -> JsonPairReport {
    JsonPairReport {
        left: pair.left.index(),
        right: pair.right.index(),
        left_path: pair.left_path,
        right_path: pair.right_path,
        similarity: pair.similarity,
        overlap: pair.overlap,
        coverage_left: pair.coverage_left,
        coverage_right: pair.coverage_right,
        longest_fragment: pair.longest_fragment,
        regions: pair
            .regions
            .into_iter()
            .map(|r| map_region(r, with_tokens))
            .collect(),
    }
}

/// Converts an analysis into its JSON shape. Region token lists are only
/// emitted when `with_tokens` is set.
pub(crate) fn map_analysis(analysis: Analysis, with_tokens: bool) -> JsonAnalysis {
    JsonAnalysis {
        files: analysis
            .files
            .into_iter()
            .map(|f| JsonFileSummary {
                id: f.id.index(),
                path: f.path,
                tokens: f.tokens,
                fingerprints: f.fingerprints,
            })
            .collect(),
        pairs: analysis
            .pairs
            .into_iter()
            .map(|p| map_pair(p, with_tokens))
            .collect(),
        compared_pairs: analysis.compared_pairs,
    }
}

pub(crate) fn write_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::other(format!("json encode: {e}")))?;
    println!("{json}");
    Ok(())
}
