//! Polynomial token hashing and the rolling k-gram hash built on top of it.
//!
//! All values live in `[0, MOD)` with `MOD = 2^31 - 1`. Intermediate products
//! are computed in `u64`: the largest term, `(MOD - 1) * (MOD - 1)`, stays below
//! `2^62`, so the rolling update never overflows.

use crate::error::FingerprintError;

/// Mersenne prime `2^31 - 1`.
pub const MOD: u64 = 2_147_483_647;
/// Multiplier shared by the token hash and the rolling hash.
pub const BASE: u64 = 4_194_301;

/// Hashes one normalized token over its UTF-8 bytes.
///
/// `hash = (hash + byte) * BASE mod MOD`. Deterministic across runs and
/// platforms; not collision resistant.
pub fn hash_token(token: &str) -> u64 {
    let mut hash = 0u64;
    for &b in token.as_bytes() {
        hash = (hash + u64::from(b)) * BASE % MOD;
    }
    hash
}

fn pow_mod(mut base: u64, mut exp: u64) -> u64 {
    let mut acc = 1u64;
    base %= MOD;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * base % MOD;
        }
        base = base * base % MOD;
        exp >>= 1;
    }
    acc
}

/// Horner-style hash of the last `k` token hashes, updated in O(1).
///
/// The first `k - 1` values returned by [`RollingHash::next`] cover fewer than
/// `k` tokens; callers skip them.
#[derive(Debug, Clone)]
pub struct RollingHash {
    k: usize,
    evict_factor: u64,
    memory: Vec<u64>,
    pos: usize,
    hash: u64,
}

impl RollingHash {
    pub fn new(k: usize) -> Result<Self, FingerprintError> {
        if k == 0 {
            return Err(FingerprintError::ZeroKgramLen);
        }
        // BASE and MOD are coprime, so BASE^k mod MOD is never 0.
        let evict_factor = MOD - pow_mod(BASE, k as u64);
        Ok(Self {
            k,
            evict_factor,
            memory: vec![0; k],
            pos: 0,
            hash: 0,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Pushes one token hash and returns the hash of the trailing k-window.
    pub fn next(&mut self, token_hash: u64) -> u64 {
        let incoming = token_hash % MOD;
        let evicted = self.memory[self.pos];
        self.memory[self.pos] = incoming;
        self.pos = (self.pos + 1) % self.k;
        self.hash = (BASE * self.hash + incoming + self.evict_factor * evicted) % MOD;
        self.hash
    }
}
