use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::FingerprintError;
use crate::file::TokenizedFile;
use crate::pair::Pair;
use crate::region::Region;
use crate::types::IndexOptions;
use crate::winnowing::WinnowFilter;

/// Registration order of a file inside one [`FingerprintIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(usize);

impl FileId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One place where a fingerprint hash was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file: FileId,
    /// Position of this fingerprint among the file's fingerprints.
    pub ordinal: usize,
    pub start: usize,
    pub stop: usize,
    pub region: Region,
    pub kgram: Option<Vec<String>>,
}

/// All occurrences of one hash across the index, grouped by file.
#[derive(Debug, Clone)]
pub struct SharedFingerprint {
    hash: u64,
    kgram: Option<Vec<String>>,
    occurrences: BTreeMap<FileId, Vec<Occurrence>>,
}

impl SharedFingerprint {
    fn new(hash: u64, kgram: Option<Vec<String>>) -> Self {
        Self {
            hash,
            kgram,
            occurrences: BTreeMap::new(),
        }
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Literal tokens of the first k-gram seen with this hash.
    pub fn kgram(&self) -> Option<&[String]> {
        self.kgram.as_deref()
    }

    pub fn occurrences_in(&self, file: FileId) -> &[Occurrence] {
        self.occurrences
            .get(&file)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.occurrences.keys().copied()
    }

    pub fn file_count(&self) -> usize {
        self.occurrences.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }
}

#[derive(Debug)]
pub(crate) struct IndexedFile {
    pub(crate) file: TokenizedFile,
    /// Fingerprint hashes in token order.
    pub(crate) hashes: Vec<u64>,
    /// Fingerprint k-gram starts, strictly increasing.
    pub(crate) starts: Vec<usize>,
    pub(crate) distinct: FxHashSet<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub files: usize,
    pub distinct_hashes: usize,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairOrder {
    /// Outer file ascending, then inner file ascending.
    #[default]
    Registration,
    /// Most similar first; ties keep registration order.
    Similarity,
}

/// Global hash → occurrence map over every registered file.
///
/// Append-only: files are never removed or updated. Mutation needs `&mut`,
/// pair queries only `&`, so queries cannot race with [`Self::add_files`].
#[derive(Debug)]
pub struct FingerprintIndex {
    options: IndexOptions,
    filter: WinnowFilter,
    files: Vec<IndexedFile>,
    by_path: FxHashMap<String, FileId>,
    shared: FxHashMap<u64, SharedFingerprint>,
}

impl FingerprintIndex {
    pub fn new(options: IndexOptions) -> Result<Self, FingerprintError> {
        options.validate()?;
        let filter = WinnowFilter::new(
            options.kgram_len,
            options.window_size,
            options.keep_kgrams,
        )?;
        Ok(Self {
            options,
            filter,
            files: Vec::new(),
            by_path: FxHashMap::default(),
            shared: FxHashMap::default(),
        })
    }

    pub fn with_params(kgram_len: usize, window_size: usize) -> Result<Self, FingerprintError> {
        Self::new(IndexOptions {
            kgram_len,
            window_size,
            ..IndexOptions::default()
        })
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Registers files and returns their ids in input order.
    ///
    /// A file whose path is already registered is not indexed again; the id
    /// of the earlier registration is returned for it.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = TokenizedFile>) -> Vec<FileId> {
        files.into_iter().map(|file| self.add_file(file)).collect()
    }

    pub fn add_file(&mut self, file: TokenizedFile) -> FileId {
        if let Some(&existing) = self.by_path.get(file.path()) {
            tracing::debug!(path = file.path(), id = %existing, "file already indexed");
            return existing;
        }

        let id = FileId(self.files.len());
        let fingerprints = self.filter.fingerprints(file.tokens());

        let mut hashes = Vec::with_capacity(fingerprints.len());
        let mut starts = Vec::with_capacity(fingerprints.len());
        let mut distinct = FxHashSet::default();

        for fp in fingerprints {
            let Some(region) = file.span_region(fp.start, fp.stop) else {
                continue;
            };
            let ordinal = hashes.len();
            hashes.push(fp.hash);
            starts.push(fp.start);
            distinct.insert(fp.hash);

            let shared = self
                .shared
                .entry(fp.hash)
                .or_insert_with(|| SharedFingerprint::new(fp.hash, fp.kgram.clone()));
            shared.occurrences.entry(id).or_default().push(Occurrence {
                file: id,
                ordinal,
                start: fp.start,
                stop: fp.stop,
                region,
                kgram: fp.kgram,
            });
        }

        tracing::debug!(
            path = file.path(),
            %id,
            tokens = file.len(),
            fingerprints = hashes.len(),
            "indexed file"
        );

        self.by_path.insert(file.path().to_string(), id);
        self.files.push(IndexedFile {
            file,
            hashes,
            starts,
            distinct,
        });
        id
    }

    pub fn file(&self, id: FileId) -> Option<&TokenizedFile> {
        self.files.get(id.0).map(|f| &f.file)
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &TokenizedFile)> + '_ {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId(i), &f.file))
    }

    /// Number of fingerprints selected for `id` (0 for unknown ids).
    pub fn fingerprint_count(&self, id: FileId) -> usize {
        self.files.get(id.0).map_or(0, |f| f.hashes.len())
    }

    /// Distinct fingerprint hashes of `id`.
    pub fn hashes_of(&self, id: FileId) -> Option<&FxHashSet<u64>> {
        self.files.get(id.0).map(|f| &f.distinct)
    }

    pub fn shared_fingerprint(&self, hash: u64) -> Option<&SharedFingerprint> {
        self.shared.get(&hash)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            files: self.files.len(),
            distinct_hashes: self.shared.len(),
            occurrences: self.files.iter().map(|f| f.hashes.len()).sum(),
        }
    }

    pub(crate) fn indexed(&self, id: FileId) -> Result<&IndexedFile, FingerprintError> {
        self.files
            .get(id.0)
            .ok_or(FingerprintError::UnknownFile(id.0))
    }

    /// Compares two registered files.
    pub fn get_pair(&self, left: FileId, right: FileId) -> Result<Pair<'_>, FingerprintError> {
        Pair::new(self, left, right)
    }

    /// Every unordered pair of distinct files, exactly once.
    pub fn all_pairs(&self, order: PairOrder) -> Vec<Pair<'_>> {
        let n = self.files.len();
        let ids: Vec<(FileId, FileId)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (FileId(i), FileId(j))))
            .collect();

        let mut pairs: Vec<Pair<'_>> = ids
            .into_par_iter()
            .filter_map(|(left, right)| Pair::new(self, left, right).ok())
            .collect();

        if order == PairOrder::Similarity {
            pairs.sort_by(|a, b| b.similarity().total_cmp(&a.similarity()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, tokens: &[&str]) -> TokenizedFile {
        TokenizedFile::from_tokens(path, tokens.iter().copied())
    }

    fn index(k: usize, w: usize) -> FingerprintIndex {
        FingerprintIndex::with_params(k, w).expect("valid params")
    }

    #[test]
    fn rejects_invalid_options() {
        assert_eq!(
            FingerprintIndex::with_params(0, 3).unwrap_err(),
            FingerprintError::ZeroKgramLen
        );
        assert_eq!(
            FingerprintIndex::with_params(3, 0).unwrap_err(),
            FingerprintError::ZeroWindowSize
        );
    }

    #[test]
    fn every_occurrence_traces_back_to_its_kgram() {
        let mut idx = index(3, 2);
        let tokens = ["PROGRAM", "ID", "SEMI", "BEGIN", "WRITE", "ID", "END", "DOT"];
        let id = idx.add_file(file("a", &tokens));

        let hashes = idx.hashes_of(id).unwrap().clone();
        assert!(!hashes.is_empty());
        for hash in hashes {
            let shared = idx.shared_fingerprint(hash).unwrap();
            for occ in shared.occurrences_in(id) {
                assert_eq!(occ.file, id);
                assert_eq!(occ.stop, occ.start + 2);
                assert_eq!(
                    occ.region,
                    Region::new(0, occ.start as u32, 0, occ.stop as u32 + 1).unwrap()
                );
                let expected: Vec<String> = tokens[occ.start..=occ.stop]
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                assert_eq!(occ.kgram.as_ref(), Some(&expected));
            }
        }
        assert_eq!(idx.stats().occurrences, idx.fingerprint_count(id));
    }

    #[test]
    fn shared_hashes_collect_occurrences_from_every_file() {
        let mut idx = index(2, 1);
        let a = idx.add_file(file("a", &["X", "Y", "Z"]));
        let b = idx.add_file(file("b", &["Q", "X", "Y", "X", "Y"]));

        let hash = crate::hash::hash_token("X") * crate::hash::BASE % crate::hash::MOD;
        let hash = (hash + crate::hash::hash_token("Y")) % crate::hash::MOD;
        let shared = idx.shared_fingerprint(hash).expect("X Y is indexed");
        assert_eq!(shared.file_count(), 2);
        assert_eq!(shared.occurrences_in(a).len(), 1);
        let starts: Vec<usize> = shared.occurrences_in(b).iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![1, 3]);
        assert_eq!(shared.occurrence_count(), 3);
        assert_eq!(
            shared.kgram(),
            Some(&["X".to_string(), "Y".to_string()][..])
        );
    }

    #[test]
    fn duplicate_paths_are_ignored() {
        let mut idx = index(2, 2);
        let first = idx.add_files([file("a", &["A", "B", "C"]), file("b", &["B", "C", "D"])]);
        let stats = idx.stats();
        let second = idx.add_files([file("a", &["A", "B", "C"]), file("b", &["B", "C", "D"])]);
        assert_eq!(first, second);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.stats(), stats);
    }

    #[test]
    fn all_pairs_enumerates_each_unordered_pair_once() {
        let mut idx = index(2, 2);
        idx.add_files((0..5).map(|i| file(&format!("f{i}"), &["A", "B", "C"])));
        let pairs = idx.all_pairs(PairOrder::Registration);
        let ids: Vec<(usize, usize)> = pairs
            .iter()
            .map(|p| (p.left().index(), p.right().index()))
            .collect();
        assert_eq!(
            ids,
            vec![
                (0, 1),
                (0, 2),
                (0, 3),
                (0, 4),
                (1, 2),
                (1, 3),
                (1, 4),
                (2, 3),
                (2, 4),
                (3, 4)
            ]
        );
    }

    #[test]
    fn similarity_order_is_descending_and_stable() {
        let mut idx = index(2, 1);
        idx.add_files([
            file("a", &["A", "B", "C", "D"]),
            file("b", &["E", "F", "G", "H"]),
            file("c", &["A", "B", "C", "D"]),
            file("d", &["E", "F", "G", "H"]),
        ]);
        let pairs = idx.all_pairs(PairOrder::Similarity);
        let ids: Vec<(usize, usize, f64)> = pairs
            .iter()
            .map(|p| (p.left().index(), p.right().index(), p.similarity()))
            .collect();
        assert_eq!(ids[0], (0, 2, 1.0));
        assert_eq!(ids[1], (1, 3, 1.0));
        assert!(ids[2..].iter().all(|&(_, _, s)| s == 0.0));
        let rest: Vec<(usize, usize)> = ids[2..].iter().map(|&(l, r, _)| (l, r)).collect();
        assert_eq!(rest, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn zero_and_one_file_have_no_pairs() {
        let mut idx = index(3, 4);
        assert!(idx.all_pairs(PairOrder::Similarity).is_empty());
        idx.add_file(file("only", &["A", "B", "C", "D"]));
        assert!(idx.all_pairs(PairOrder::Similarity).is_empty());
    }

    #[test]
    fn get_pair_rejects_unknown_ids() {
        let mut idx = index(2, 2);
        let a = idx.add_file(file("a", &["A", "B"]));
        let err = idx.get_pair(a, FileId(7)).unwrap_err();
        assert_eq!(err, FingerprintError::UnknownFile(7));
    }
}
