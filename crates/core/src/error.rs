use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invariant violations raised while constructing core values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FingerprintError {
    #[error(
        "invalid region: start {start_row}:{start_col} is after end {end_row}:{end_col}"
    )]
    InvalidRegion {
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    },
    #[error("k-gram length must be at least 1")]
    ZeroKgramLen,
    #[error("window size must be at least 1")]
    ZeroWindowSize,
    #[error("token count {tokens} does not match region count {regions}")]
    MismatchedRegions { tokens: usize, regions: usize },
    #[error("similarity threshold must be within 0..=1, got {0}")]
    InvalidThreshold(f64),
    #[error("file {0} is not registered in this index")]
    UnknownFile(usize),
}

/// Errors surfaced by the filesystem-facing scan layer.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error("root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },
}
