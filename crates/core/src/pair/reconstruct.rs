use rustc_hash::FxHashSet;

use crate::index::{FileId, FingerprintIndex, IndexedFile, Occurrence};
use crate::types::{MatchKind, SharedRegion, SharedSpan};

const PREVIEW_MAX_CHARS: usize = 240;
/// Tokens beyond `k` a single-match cluster must grow by before it is kept.
const SINGLE_MATCH_SLACK: usize = 2;

#[derive(Debug, Clone, Default)]
pub(super) struct Reconstruction {
    pub(super) regions: Vec<SharedRegion>,
    pub(super) truncated_hashes: usize,
}

/// One occurrence of a shared hash in each file.
#[derive(Debug, Clone, Copy)]
struct Match {
    left_start: usize,
    left_ordinal: usize,
    right_start: usize,
}

#[derive(Debug, Clone)]
struct Candidate {
    left: (usize, usize),
    right: (usize, usize),
    confidence: f64,
    matches: usize,
}

pub(super) fn reconstruct(
    index: &FingerprintIndex,
    (left_id, left): (FileId, &IndexedFile),
    (right_id, right): (FileId, &IndexedFile),
    shared: &[u64],
) -> Reconstruction {
    let options = index.options();
    let k = options.kgram_len;
    let cap = options.max_occurrences_per_hash.max(1);

    let (left_tokens, right_tokens) = (left.file.tokens(), right.file.tokens());
    let mut truncated_hashes = 0usize;
    let mut matches = Vec::new();
    for &hash in shared {
        let Some(fp) = index.shared_fingerprint(hash) else {
            continue;
        };
        let lhs = fp.occurrences_in(left_id);
        let rhs = fp.occurrences_in(right_id);
        if lhs.len() > cap || rhs.len() > cap {
            truncated_hashes += 1;
            tracing::debug!(
                hash,
                left = lhs.len(),
                right = rhs.len(),
                cap,
                "capping occurrence fan-out"
            );
        }
        for a in capped(lhs, cap) {
            for b in capped(rhs, cap) {
                // Colliding hashes of different k-grams never pair up.
                if left_tokens[a.start..=a.stop] != right_tokens[b.start..=b.stop] {
                    continue;
                }
                matches.push(Match {
                    left_start: a.start,
                    left_ordinal: a.ordinal,
                    right_start: b.start,
                });
            }
        }
    }
    // A left start belongs to exactly one fingerprint, so keys are unique.
    matches.sort_unstable_by_key(|m| (m.left_start, m.right_start));

    let mut candidates: Vec<Candidate> = cluster(&matches, k)
        .into_iter()
        .map(|c| candidate(&c, left, right, k, options.guarantee_len()))
        .filter(|c| c.matches >= 2 || c.left.1 - c.left.0 + 1 >= k + SINGLE_MATCH_SLACK)
        .collect();
    candidates.sort_by_key(|c| c.left.0);

    let regions = merge(candidates)
        .into_iter()
        .filter_map(|c| build_region(c, left, right))
        .collect();

    Reconstruction {
        regions,
        truncated_hashes,
    }
}

fn capped(occurrences: &[Occurrence], cap: usize) -> &[Occurrence] {
    &occurrences[..occurrences.len().min(cap)]
}

/// Groups matches that advance together in both files.
///
/// Several clusters may be open at once; a match extends the most recently
/// opened compatible one. A cluster is closed once the left gap to its last
/// match exceeds `2k`.
fn cluster(matches: &[Match], k: usize) -> Vec<Vec<Match>> {
    let gap = 2 * k as i64;
    let drift = k as i64;

    let mut open: Vec<Vec<Match>> = Vec::new();
    let mut closed: Vec<Vec<Match>> = Vec::new();

    for &m in matches {
        let (stale, live): (Vec<_>, Vec<_>) = open.into_iter().partition(|c| {
            c.last()
                .is_some_and(|p| (m.left_start - p.left_start) as i64 > gap)
        });
        closed.extend(stale);
        open = live;

        let target = open.iter_mut().rev().find(|c| {
            c.last().is_some_and(|p| {
                let da = (m.left_start - p.left_start) as i64;
                let db = m.right_start as i64 - p.right_start as i64;
                da <= gap && db.abs() <= gap && (da - db).abs() <= drift
            })
        });
        match target {
            Some(c) => c.push(m),
            None => open.push(vec![m]),
        }
    }

    closed.extend(open);
    closed
}

fn candidate(
    matches: &[Match],
    left: &IndexedFile,
    right: &IndexedFile,
    k: usize,
    guarantee_len: usize,
) -> Candidate {
    let mut ls = usize::MAX;
    let mut le = 0;
    let mut rs = usize::MAX;
    let mut re = 0;
    let mut ordinals = FxHashSet::default();
    for m in matches {
        ls = ls.min(m.left_start);
        le = le.max(m.left_start + k - 1);
        rs = rs.min(m.right_start);
        re = re.max(m.right_start + k - 1);
        ordinals.insert(m.left_ordinal);
    }

    // Left fingerprints whose k-gram lies entirely inside the span.
    let lo = left.starts.partition_point(|&s| s < ls);
    let hi = left.starts.partition_point(|&s| s <= le + 1 - k);
    let density = ordinals.len() as f64 / (hi - lo).max(1) as f64;

    let (ls, le, rs, re) = extend(left.file.tokens(), right.file.tokens(), ls, le, rs, re);

    let length = (le - ls + 1) as f64 / guarantee_len.max(1) as f64;
    Candidate {
        left: (ls, le),
        right: (rs, re),
        confidence: (density * 0.8 + length.min(1.0) * 0.2).min(1.0),
        matches: matches.len(),
    }
}

/// Grows both spans outward while the literal tokens keep agreeing.
fn extend(
    a: &[String],
    b: &[String],
    mut ls: usize,
    mut le: usize,
    mut rs: usize,
    mut re: usize,
) -> (usize, usize, usize, usize) {
    while ls > 0 && rs > 0 && a[ls - 1] == b[rs - 1] {
        ls -= 1;
        rs -= 1;
    }
    while le + 1 < a.len() && re + 1 < b.len() && a[le + 1] == b[re + 1] {
        le += 1;
        re += 1;
    }
    (ls, le, rs, re)
}

/// Merges candidates (sorted by left start) whose left token ranges overlap
/// or touch.
fn merge(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        match out.last_mut() {
            Some(cur) if c.left.0 <= cur.left.1 => {
                cur.left.1 = cur.left.1.max(c.left.1);
                cur.right.0 = cur.right.0.min(c.right.0);
                cur.right.1 = cur.right.1.max(c.right.1);
                cur.confidence = cur.confidence.max(c.confidence);
                cur.matches += c.matches;
            }
            _ => out.push(c),
        }
    }
    out
}

fn build_region(c: Candidate, left: &IndexedFile, right: &IndexedFile) -> Option<SharedRegion> {
    let (ls, le) = c.left;
    let (rs, re) = c.right;
    let left_region = left.file.span_region(ls, le)?;
    Some(SharedRegion {
        left: SharedSpan {
            start: ls,
            stop: le,
            region: left_region,
        },
        right: SharedSpan {
            start: rs,
            stop: re,
            region: right.file.span_region(rs, re)?,
        },
        tokens: left.file.tokens().get(ls..=le)?.to_vec(),
        preview: left.file.preview(&left_region, PREVIEW_MAX_CHARS),
        matches: c.matches,
        confidence: c.confidence,
        kind: MatchKind::from_confidence(c.confidence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clusters_reject_drifting_matches() {
        let m = |left_start, right_start| Match {
            left_start,
            left_ordinal: left_start,
            right_start,
        };
        let clusters = cluster(&[m(0, 0), m(2, 2), m(4, 20), m(5, 5)], 3);
        let shapes: Vec<Vec<usize>> = clusters
            .iter()
            .map(|c| c.iter().map(|m| m.left_start).collect())
            .collect();
        assert_eq!(shapes, vec![vec![0, 2, 5], vec![4]]);
    }

    #[test]
    fn merge_unions_touching_left_ranges() {
        let c = |left, right, confidence, matches| Candidate {
            left,
            right,
            confidence,
            matches,
        };
        let merged = merge(vec![
            c((0, 4), (10, 14), 0.5, 2),
            c((4, 9), (3, 8), 0.8, 3),
            c((11, 12), (20, 21), 0.4, 2),
        ]);
        let shapes: Vec<_> = merged
            .iter()
            .map(|c| (c.left, c.right, c.confidence, c.matches))
            .collect();
        assert_eq!(
            shapes,
            vec![((0, 9), (3, 14), 0.8, 5), ((11, 12), (20, 21), 0.4, 2)]
        );
    }

    #[test]
    fn extend_follows_equal_tokens() {
        let a: Vec<String> = ["A", "B", "C", "D", "E"].map(String::from).to_vec();
        let b: Vec<String> = ["Z", "B", "C", "D", "Y"].map(String::from).to_vec();
        assert_eq!(extend(&a, &b, 2, 2, 2, 2), (1, 3, 1, 3));
    }
}
