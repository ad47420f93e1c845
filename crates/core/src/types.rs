use std::collections::HashSet;

use crate::error::FingerprintError;
use crate::index::FileId;
use crate::region::Region;

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_KGRAM_LEN: usize = 23;
pub const DEFAULT_WINDOW_SIZE: usize = 17;
pub const DEFAULT_MAX_OCCURRENCES_PER_HASH: usize = 50;

/// Parameters shared by every file of one [`crate::FingerprintIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub kgram_len: usize,
    pub window_size: usize,
    pub keep_kgrams: bool,
    /// Per-file occurrence cap applied to one hash during region
    /// reconstruction.
    pub max_occurrences_per_hash: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            kgram_len: DEFAULT_KGRAM_LEN,
            window_size: DEFAULT_WINDOW_SIZE,
            keep_kgrams: true,
            max_occurrences_per_hash: DEFAULT_MAX_OCCURRENCES_PER_HASH,
        }
    }
}

impl IndexOptions {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.kgram_len == 0 {
            return Err(FingerprintError::ZeroKgramLen);
        }
        if self.window_size == 0 {
            return Err(FingerprintError::ZeroWindowSize);
        }
        Ok(())
    }

    /// Shortest shared run guaranteed to produce a common fingerprint.
    pub fn guarantee_len(&self) -> usize {
        self.kgram_len + self.window_size - 1
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub ignore_dirs: HashSet<String>,
    /// Lower-case file extensions to scan; `None` scans every text file.
    pub extensions: Option<HashSet<String>>,
    pub max_file_size: Option<u64>,
    pub max_files: Option<usize>,
    pub respect_gitignore: bool,
    pub similarity_threshold: f64,
    pub max_report_items: usize,
    pub index: IndexOptions,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_dirs: default_ignore_dirs(),
            extensions: None,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE_BYTES),
            max_files: None,
            respect_gitignore: true,
            similarity_threshold: 0.0,
            max_report_items: 200,
            index: IndexOptions::default(),
        }
    }
}

impl ScanOptions {
    pub fn validate(&self) -> Result<(), FingerprintError> {
        self.index.validate()?;
        if !self.similarity_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(FingerprintError::InvalidThreshold(
                self.similarity_threshold,
            ));
        }
        Ok(())
    }
}

pub fn default_ignore_dirs() -> HashSet<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "node_modules",
        "target",
        "dist",
        "build",
        "out",
        ".next",
        ".turbo",
        ".cache",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub candidate_files: u64,
    pub scanned_files: u64,
    pub scanned_bytes: u64,
    pub skipped_not_found: u64,
    pub skipped_permission_denied: u64,
    pub skipped_too_large: u64,
    pub skipped_binary: u64,
    pub skipped_not_utf8: u64,
    pub skipped_extension: u64,
    pub skipped_walk_errors: u64,
    pub skipped_budget_max_files: u64,
    pub truncated_hashes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome<T> {
    pub result: T,
    pub stats: ScanStats,
}

/// Coarse classification of a reconstructed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    Similar,
    Structural,
}

impl MatchKind {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Self::Exact
        } else if confidence >= 0.7 {
            Self::Similar
        } else {
            Self::Structural
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Similar => "similar",
            Self::Structural => "structural",
        }
    }
}

/// One side of a shared fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedSpan {
    pub start: usize,
    /// Inclusive.
    pub stop: usize,
    pub region: Region,
}

impl SharedSpan {
    pub fn token_len(&self) -> usize {
        self.stop - self.start + 1
    }
}

/// A contiguous fragment believed to be shared by two files.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedRegion {
    pub left: SharedSpan,
    pub right: SharedSpan,
    /// Tokens of the left file covered by the fragment.
    pub tokens: Vec<String>,
    /// Source lines of the left file covered by the fragment, truncated.
    pub preview: String,
    /// Number of k-gram matches that support the fragment.
    pub matches: usize,
    pub confidence: f64,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub id: FileId,
    pub path: String,
    pub tokens: usize,
    pub fingerprints: usize,
}

/// Fully materialized comparison of two files.
#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub left: FileId,
    pub right: FileId,
    pub left_path: String,
    pub right_path: String,
    pub similarity: f64,
    pub overlap: usize,
    pub coverage_left: f64,
    pub coverage_right: f64,
    pub longest_fragment: usize,
    pub truncated_hashes: usize,
    pub regions: Vec<SharedRegion>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub files: Vec<FileSummary>,
    /// Pairs above the threshold, most similar first.
    pub pairs: Vec<PairReport>,
    /// Pairs compared before threshold filtering.
    pub compared_pairs: usize,
    pub truncated_hashes: u64,
}
