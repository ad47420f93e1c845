//! Winnowing-based detection of copied source code.
//!
//! Files are reduced to normalized token streams, fingerprinted with a
//! rolling hash plus winnowing, and indexed so that any two files can be
//! compared for shared fingerprints and reconstructed shared regions.

mod analyze;
mod error;
mod file;
mod hash;
mod index;
mod pair;
mod region;
mod scan;
mod tokenize;
mod types;
mod winnowing;

pub use analyze::{analyze_files, analyze_paths, analyze_paths_with_stats};
pub use error::{FingerprintError, ScanError};
pub use file::TokenizedFile;
pub use hash::{BASE, MOD, RollingHash, hash_token};
pub use index::{
    FileId, FingerprintIndex, IndexStats, Occurrence, PairOrder, SharedFingerprint,
};
pub use pair::Pair;
pub use region::Region;
pub use scan::scan_files;
pub use tokenize::{TOKEN_IDENT, TOKEN_NUMBER, TOKEN_STRING, tokenize};
pub use types::{
    Analysis, DEFAULT_KGRAM_LEN, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_MAX_OCCURRENCES_PER_HASH,
    DEFAULT_WINDOW_SIZE, FileSummary, IndexOptions, MatchKind, PairReport, ScanOptions,
    ScanOutcome, ScanStats, SharedRegion, SharedSpan, default_ignore_dirs,
};
pub use winnowing::{Fingerprint, WinnowFilter};
