use code_plagiarism_core::ScanStats;

use crate::json::{JsonAnalysis, JsonPairReport, JsonSharedRegion, JsonSpan};

/// Skips that mean part of the tree was never looked at.
pub(crate) fn has_fatal_skips(stats: &ScanStats) -> bool {
    stats.skipped_permission_denied > 0
        || stats.skipped_walk_errors > 0
        || stats.skipped_budget_max_files > 0
}

pub(crate) fn format_scan_stats(stats: &ScanStats) -> String {
    let mut out = String::new();
    out.push_str("== scan stats ==\n");
    out.push_str(&format!(
        "candidates={} scanned={} bytes={}\n",
        stats.candidate_files, stats.scanned_files, stats.scanned_bytes
    ));

    let mut skips: Vec<(&str, u64)> = vec![
        ("not_found", stats.skipped_not_found),
        ("permission_denied", stats.skipped_permission_denied),
        ("too_large", stats.skipped_too_large),
        ("binary", stats.skipped_binary),
        ("not_utf8", stats.skipped_not_utf8),
        ("extension", stats.skipped_extension),
        ("walk_errors", stats.skipped_walk_errors),
        ("budget_max_files", stats.skipped_budget_max_files),
    ];
    skips.retain(|(_, v)| *v > 0);
    if !skips.is_empty() {
        out.push_str("skipped:\n");
        for (k, v) in skips {
            out.push_str(&format!("- {k}={v}\n"));
        }
    }
    if stats.truncated_hashes > 0 {
        out.push_str(&format!("truncated_hashes={}\n", stats.truncated_hashes));
    }
    out.push('\n');
    out
}

fn line_range(span: &JsonSpan) -> String {
    let (start, end) = (span.start_row + 1, span.end_row + 1);
    if start == end {
        format!("{start}")
    } else {
        format!("{start}-{end}")
    }
}

fn format_region(out: &mut String, pair: &JsonPairReport, region: &JsonSharedRegion) {
    out.push_str(&format!(
        "  {} confidence={:.2} matches={} tokens={}\n",
        region.kind,
        region.confidence,
        region.matches,
        region.left.stop - region.left.start + 1
    ));
    out.push_str(&format!(
        "  - A {}:{}\n",
        pair.left_path,
        line_range(&region.left)
    ));
    out.push_str(&format!(
        "  - B {}:{}\n",
        pair.right_path,
        line_range(&region.right)
    ));
    for line in region.preview.lines() {
        out.push_str(&format!("    | {line}\n"));
    }
}

pub(crate) fn format_text_analysis(analysis: &JsonAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "files: {} compared pairs: {} reported pairs: {}\n",
        analysis.files.len(),
        analysis.compared_pairs,
        analysis.pairs.len()
    ));

    for pair in &analysis.pairs {
        out.push('\n');
        out.push_str(&format!(
            "similarity={:.3} overlap={} coverage={:.3}/{:.3} longest={}\n",
            pair.similarity,
            pair.overlap,
            pair.coverage_left,
            pair.coverage_right,
            pair.longest_fragment
        ));
        out.push_str(&format!("- A {}\n", pair.left_path));
        out.push_str(&format!("- B {}\n", pair.right_path));
        for region in &pair.regions {
            format_region(&mut out, pair, region);
        }
    }

    out.push('\n');
    out
}
