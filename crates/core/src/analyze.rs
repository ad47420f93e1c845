use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::{FingerprintError, ScanError};
use crate::file::TokenizedFile;
use crate::index::{FingerprintIndex, PairOrder};
use crate::pair::Pair;
use crate::scan::scan_files;
use crate::types::{Analysis, FileSummary, PairReport, ScanOptions, ScanOutcome, ScanStats};

fn empty_analysis() -> Analysis {
    Analysis {
        files: Vec::new(),
        pairs: Vec::new(),
        compared_pairs: 0,
        truncated_hashes: 0,
    }
}

/// Indexes `files` and reports every pair at or above the similarity
/// threshold, most similar first.
///
/// Pairs with no shared fingerprint are never reported, even with a zero
/// threshold.
pub fn analyze_files(
    files: Vec<TokenizedFile>,
    options: &ScanOptions,
) -> Result<Analysis, FingerprintError> {
    options.validate()?;

    let mut index = FingerprintIndex::new(options.index)?;
    index.add_files(files);

    let summaries: Vec<FileSummary> = index
        .files()
        .map(|(id, file)| FileSummary {
            id,
            path: file.path().to_string(),
            tokens: file.len(),
            fingerprints: index.fingerprint_count(id),
        })
        .collect();

    let pairs = index.all_pairs(PairOrder::Similarity);
    let compared_pairs = pairs.len();
    let selected: Vec<Pair<'_>> = pairs
        .into_iter()
        .filter(|p| p.similarity() > 0.0 && p.similarity() >= options.similarity_threshold)
        .take(options.max_report_items)
        .collect();

    let reports: Vec<PairReport> = selected.par_iter().map(Pair::to_report).collect();
    let truncated_hashes: u64 = reports.iter().map(|r| r.truncated_hashes as u64).sum();
    if truncated_hashes > 0 {
        tracing::warn!(
            truncated_hashes,
            cap = options.index.max_occurrences_per_hash,
            "occurrence fan-out was capped; regions in repetitive files may be incomplete"
        );
    }

    let stats = index.stats();
    tracing::debug!(
        files = stats.files,
        distinct_hashes = stats.distinct_hashes,
        occurrences = stats.occurrences,
        compared_pairs,
        reported_pairs = reports.len(),
        "analysis finished"
    );

    Ok(Analysis {
        files: summaries,
        pairs: reports,
        compared_pairs,
        truncated_hashes,
    })
}

pub fn analyze_paths(roots: &[PathBuf], options: &ScanOptions) -> Result<Analysis, ScanError> {
    Ok(analyze_paths_with_stats(roots, options)?.result)
}

pub fn analyze_paths_with_stats(
    roots: &[PathBuf],
    options: &ScanOptions,
) -> Result<ScanOutcome<Analysis>, ScanError> {
    if roots.is_empty() {
        options.validate()?;
        return Ok(ScanOutcome {
            result: empty_analysis(),
            stats: ScanStats::default(),
        });
    }

    let scanned = scan_files(roots, options)?;
    let mut stats = scanned.stats;
    let analysis = analyze_files(scanned.result, options)?;
    stats.truncated_hashes = analysis.truncated_hashes;

    Ok(ScanOutcome {
        result: analysis,
        stats,
    })
}
