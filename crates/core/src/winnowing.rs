//! Winnowing: selects a sparse, deterministic subset of k-gram hashes.
//!
//! Any run of at least `k + w - 1` identical tokens in two inputs yields at
//! least one common fingerprint.

use crate::error::FingerprintError;
use crate::hash::{RollingHash, hash_token};

/// A selected k-gram hash and the token span of that k-gram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub hash: u64,
    /// First token of the k-gram.
    pub start: usize,
    /// Last token of the k-gram, inclusive: always `start + k - 1`.
    pub stop: usize,
    /// `tokens[start..=stop]`, kept only when the filter retains k-grams.
    pub kgram: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct WinnowFilter {
    kgram_len: usize,
    window_size: usize,
    keep_kgrams: bool,
    /// Fresh rolling hash; each call to [`WinnowFilter::fingerprints`] clones it.
    rolling: RollingHash,
}

impl WinnowFilter {
    pub fn new(
        kgram_len: usize,
        window_size: usize,
        keep_kgrams: bool,
    ) -> Result<Self, FingerprintError> {
        let rolling = RollingHash::new(kgram_len)?;
        if window_size == 0 {
            return Err(FingerprintError::ZeroWindowSize);
        }
        Ok(Self {
            kgram_len,
            window_size,
            keep_kgrams,
            rolling,
        })
    }

    pub fn kgram_len(&self) -> usize {
        self.kgram_len
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Fingerprints in increasing `start` order.
    ///
    /// Robust winnowing: when the slot holding the current minimum is
    /// overwritten, the window is rescanned right to left for the rightmost
    /// minimum; otherwise a new hash that is `<=` the minimum replaces it.
    pub fn fingerprints<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Fingerprint> {
        let k = self.kgram_len;
        let w = self.window_size;
        if tokens.len() < k {
            return Vec::new();
        }

        let mut rolling = self.rolling.clone();

        // (hash, k-gram start); the sentinel never wins against a real hash.
        let mut window: Vec<(u64, usize)> = vec![(u64::MAX, 0); w];
        let mut newest = 0usize;
        let mut min_pos = 0usize;
        let mut out = Vec::with_capacity(tokens.len() / w.max(1) + 1);

        for (idx, token) in tokens.iter().enumerate() {
            let hash = rolling.next(hash_token(token.as_ref()));
            if idx + 1 < k {
                continue;
            }
            let start = idx + 1 - k;

            newest = (newest + 1) % w;
            window[newest] = (hash, start);

            if min_pos == newest {
                let mut i = (newest + w - 1) % w;
                while i != newest {
                    if window[i].0 < window[min_pos].0 {
                        min_pos = i;
                    }
                    i = (i + w - 1) % w;
                }
                out.push(self.record(tokens, window[min_pos]));
            } else if window[newest].0 <= window[min_pos].0 {
                min_pos = newest;
                out.push(self.record(tokens, window[min_pos]));
            }
        }

        out
    }

    fn record<S: AsRef<str>>(&self, tokens: &[S], (hash, start): (u64, usize)) -> Fingerprint {
        let stop = start + self.kgram_len - 1;
        let kgram = self.keep_kgrams.then(|| {
            tokens[start..=stop]
                .iter()
                .map(|t| t.as_ref().to_string())
                .collect()
        });
        Fingerprint {
            hash,
            start,
            stop,
            kgram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{BASE, MOD};

    fn kgram_hash(tokens: &[&str]) -> u64 {
        tokens
            .iter()
            .fold(0u64, |acc, t| (BASE * acc + hash_token(t)) % MOD)
    }

    const PROGRAM: [&str; 8] = ["PROGRAM", "ID", "SEMI", "BEGIN", "WRITE", "ID", "END", "DOT"];

    #[test]
    fn rejects_zero_parameters() {
        assert_eq!(
            WinnowFilter::new(0, 4, false).unwrap_err(),
            FingerprintError::ZeroKgramLen
        );
        assert_eq!(
            WinnowFilter::new(3, 0, false).unwrap_err(),
            FingerprintError::ZeroWindowSize
        );
    }

    #[test]
    fn short_input_has_no_fingerprints() {
        let filter = WinnowFilter::new(3, 2, true).unwrap();
        assert!(filter.fingerprints::<&str>(&[]).is_empty());
        assert!(filter.fingerprints(&["A", "B"]).is_empty());
        assert_eq!(filter.fingerprints(&["A", "B", "C"]).len(), 1);
    }

    #[test]
    fn selects_expected_positions() {
        let filter = WinnowFilter::new(3, 2, false).unwrap();
        let starts: Vec<usize> = filter
            .fingerprints(&PROGRAM)
            .iter()
            .map(|f| f.start)
            .collect();
        assert_eq!(starts, vec![0, 1, 2, 4, 5]);
    }

    #[test]
    fn window_of_one_keeps_every_kgram() {
        let filter = WinnowFilter::new(3, 1, false).unwrap();
        let fps = filter.fingerprints(&PROGRAM);
        assert_eq!(fps.len(), PROGRAM.len() - 2);
        for (i, fp) in fps.iter().enumerate() {
            assert_eq!(fp.start, i);
            assert_eq!(fp.stop, i + 2);
            assert_eq!(fp.hash, kgram_hash(&PROGRAM[i..=i + 2]));
            assert_eq!(fp.kgram, None);
        }
    }

    #[test]
    fn fingerprints_carry_kgram_hash_and_tokens() {
        let filter = WinnowFilter::new(4, 3, true).unwrap();
        let fps = filter.fingerprints(&PROGRAM);
        assert!(!fps.is_empty());
        for fp in &fps {
            assert_eq!(fp.stop, fp.start + 3);
            assert_eq!(fp.hash, kgram_hash(&PROGRAM[fp.start..=fp.stop]));
            let expected: Vec<String> = PROGRAM[fp.start..=fp.stop]
                .iter()
                .map(|s| s.to_string())
                .collect();
            assert_eq!(fp.kgram.as_ref(), Some(&expected));
        }
        assert!(fps.windows(2).all(|p| p[0].start < p[1].start));
    }

    #[test]
    fn ties_prefer_rightmost_position() {
        // Every k-gram is identical, so each new hash ties the minimum.
        let tokens = ["X"; 6];
        let filter = WinnowFilter::new(2, 3, false).unwrap();
        let starts: Vec<usize> = filter
            .fingerprints(&tokens)
            .iter()
            .map(|f| f.start)
            .collect();
        assert_eq!(starts, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn reused_filter_matches_a_fresh_one() {
        let filter = WinnowFilter::new(3, 2, false).unwrap();
        let first = filter.fingerprints(&["Q", "R", "S", "T", "U"]);
        let second = filter.fingerprints(&PROGRAM);
        let fresh = WinnowFilter::new(3, 2, false).unwrap();
        assert_eq!(second, fresh.fingerprints(&PROGRAM));
        assert_eq!(first, fresh.fingerprints(&["Q", "R", "S", "T", "U"]));
    }
}
