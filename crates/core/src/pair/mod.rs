//! Pairwise comparison of two indexed files.

mod reconstruct;


use std::fmt;
use std::sync::OnceLock;

use crate::error::FingerprintError;
use crate::file::TokenizedFile;
use crate::index::{FileId, FingerprintIndex, IndexedFile};
use crate::types::{PairReport, SharedRegion};

use reconstruct::Reconstruction;

/// Comparison of two files of one [`FingerprintIndex`].
///
/// Set metrics are computed eagerly; shared regions are reconstructed on the
/// first call to [`Pair::shared_regions`] and cached.
pub struct Pair<'a> {
    index: &'a FingerprintIndex,
    left: FileId,
    right: FileId,
    a: &'a IndexedFile,
    b: &'a IndexedFile,
    shared: Vec<u64>,
    similarity: f64,
    coverage_left: f64,
    coverage_right: f64,
    reconstruction: OnceLock<Reconstruction>,
}

impl<'a> Pair<'a> {
    pub(crate) fn new(
        index: &'a FingerprintIndex,
        left: FileId,
        right: FileId,
    ) -> Result<Self, FingerprintError> {
        let a = index.indexed(left)?;
        let b = index.indexed(right)?;

        let (small, large) = if a.distinct.len() <= b.distinct.len() {
            (&a.distinct, &b.distinct)
        } else {
            (&b.distinct, &a.distinct)
        };
        let mut shared: Vec<u64> = small
            .iter()
            .copied()
            .filter(|h| large.contains(h))
            .collect();
        shared.sort_unstable();

        let union = a.distinct.len() + b.distinct.len() - shared.len();
        let similarity = if union == 0 {
            0.0
        } else {
            shared.len() as f64 / union as f64
        };

        Ok(Self {
            index,
            left,
            right,
            a,
            b,
            similarity,
            coverage_left: coverage(a, b),
            coverage_right: coverage(b, a),
            shared,
            reconstruction: OnceLock::new(),
        })
    }

    pub fn left(&self) -> FileId {
        self.left
    }

    pub fn right(&self) -> FileId {
        self.right
    }

    pub fn left_file(&self) -> &'a TokenizedFile {
        &self.a.file
    }

    pub fn right_file(&self) -> &'a TokenizedFile {
        &self.b.file
    }

    /// Jaccard similarity of the two files' distinct fingerprint hashes.
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    /// Number of distinct hashes both files produced.
    pub fn overlap(&self) -> usize {
        self.shared.len()
    }

    /// Shared hashes, ascending.
    pub fn shared_hashes(&self) -> &[u64] {
        &self.shared
    }

    /// Fraction of the left file's fingerprints whose hash also occurs in the
    /// right file.
    pub fn coverage_left(&self) -> f64 {
        self.coverage_left
    }

    pub fn coverage_right(&self) -> f64 {
        self.coverage_right
    }

    /// Reconstructed fragments ordered by left token start.
    pub fn shared_regions(&self) -> &[SharedRegion] {
        &self.reconstructed().regions
    }

    /// Token length of the longest side of any shared region, 0 without
    /// regions. Merged regions can be longer on the right than on the left.
    pub fn longest_fragment(&self) -> usize {
        self.shared_regions()
            .iter()
            .map(|r| r.left.token_len().max(r.right.token_len()))
            .max()
            .unwrap_or(0)
    }

    /// Shared hashes whose occurrence lists were capped during
    /// reconstruction.
    pub fn truncated_hashes(&self) -> usize {
        self.reconstructed().truncated_hashes
    }

    pub fn to_report(&self) -> PairReport {
        PairReport {
            left: self.left,
            right: self.right,
            left_path: self.left_file().path().to_string(),
            right_path: self.right_file().path().to_string(),
            similarity: self.similarity,
            overlap: self.overlap(),
            coverage_left: self.coverage_left,
            coverage_right: self.coverage_right,
            longest_fragment: self.longest_fragment(),
            truncated_hashes: self.truncated_hashes(),
            regions: self.shared_regions().to_vec(),
        }
    }

    fn reconstructed(&self) -> &Reconstruction {
        self.reconstruction.get_or_init(|| {
            let out = reconstruct::reconstruct(
                self.index,
                (self.left, self.a),
                (self.right, self.b),
                &self.shared,
            );
            tracing::debug!(
                left = self.left_file().path(),
                right = self.right_file().path(),
                regions = out.regions.len(),
                truncated_hashes = out.truncated_hashes,
                "reconstructed shared regions"
            );
            out
        })
    }
}

impl fmt::Debug for Pair<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("similarity", &self.similarity)
            .field("overlap", &self.shared.len())
            .field("coverage_left", &self.coverage_left)
            .field("coverage_right", &self.coverage_right)
            .field("reconstructed", &self.reconstruction.get().is_some())
            .finish()
    }
}

fn coverage(of: &IndexedFile, against: &IndexedFile) -> f64 {
    if of.hashes.is_empty() {
        return 0.0;
    }
    let hits = of
        .hashes
        .iter()
        .filter(|&&h| against.distinct.contains(&h))
        .count();
    hits as f64 / of.hashes.len() as f64
}
