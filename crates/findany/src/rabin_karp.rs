//! Rabin-Karp over short haystacks
//!
//! Every needle is hashed over its first `hash_len` folded units. The
//! haystack window hash rolls one unit at a time; a window whose hash bit is
//! set in the occupancy filter probes its bucket, where needles are kept
//! shortest-first so the first verified needle is the one that wins.

use findany_ac::ACMatch;
use findany_match_mode::{fold_ascii, CaseMode};

use crate::verify::{fold_needle, starts_with};

const BUCKETS: usize = 64;
const OCCUPANCY_BITS: usize = 1024;
const MAX_HASH_LEN: usize = 8;
/// A bucket holding more needles than this makes the table infeasible.
const MAX_BUCKET_LEN: usize = 8;
const MULTIPLIER: u64 = 31;

#[derive(Debug, Clone)]
pub(crate) struct RabinKarp {
    mode: CaseMode,
    hash_len: usize,
    /// `MULTIPLIER ^ (hash_len - 1)`, to drop the leading unit of a window
    leading_factor: u64,
    needles: Vec<Box<[u16]>>,
    buckets: Vec<Vec<u32>>,
    occupancy: [u64; OCCUPANCY_BITS / 64],
}

impl RabinKarp {
    /// Returns `None` when the table would be overloaded, when a needle is
    /// empty, or in Unicode case-insensitive mode.
    pub(crate) fn new<N: AsRef<[u16]>>(needles: &[N], mode: CaseMode) -> Option<Self> {
        if mode == CaseMode::CaseInsensitiveUnicode {
            return None;
        }
        let needles: Vec<Box<[u16]>> = needles
            .iter()
            .map(|n| fold_needle(n.as_ref(), mode).into_boxed_slice())
            .collect();
        let min_len = needles.iter().map(|n| n.len()).min()?;
        if min_len == 0 {
            return None;
        }
        let hash_len = min_len.min(MAX_HASH_LEN);

        let mut order: Vec<u32> = (0..needles.len() as u32).collect();
        order.sort_by_key(|&i| needles[i as usize].len());

        let mut buckets = vec![Vec::new(); BUCKETS];
        let mut occupancy = [0u64; OCCUPANCY_BITS / 64];
        for id in order {
            let hash = hash_units(&needles[id as usize][..hash_len]);
            let bucket = &mut buckets[(hash % BUCKETS as u64) as usize];
            if bucket.len() == MAX_BUCKET_LEN {
                return None;
            }
            bucket.push(id);
            let bit = (hash % OCCUPANCY_BITS as u64) as usize;
            occupancy[bit / 64] |= 1 << (bit % 64);
        }

        Some(RabinKarp {
            mode,
            hash_len,
            leading_factor: MULTIPLIER.wrapping_pow(hash_len as u32 - 1),
            needles,
            buckets,
            occupancy,
        })
    }

    /// Leftmost start, shortest needle at that start.
    pub(crate) fn find(&self, haystack: &[u16]) -> Option<ACMatch> {
        let n = haystack.len();
        if n < self.hash_len {
            return None;
        }
        let mut hash = haystack[..self.hash_len]
            .iter()
            .fold(0u64, |h, &u| h.wrapping_mul(MULTIPLIER).wrapping_add(self.fold(u)));

        let mut start = 0;
        loop {
            if let Some(found) = self.probe(haystack, start, hash) {
                return Some(found);
            }
            let next = start + self.hash_len;
            if next >= n {
                return None;
            }
            let leading = self.fold(haystack[start]).wrapping_mul(self.leading_factor);
            hash = hash
                .wrapping_sub(leading)
                .wrapping_mul(MULTIPLIER)
                .wrapping_add(self.fold(haystack[next]));
            start += 1;
        }
    }

    #[inline(always)]
    fn probe(&self, haystack: &[u16], start: usize, hash: u64) -> Option<ACMatch> {
        let bit = (hash % OCCUPANCY_BITS as u64) as usize;
        if self.occupancy[bit / 64] & (1 << (bit % 64)) == 0 {
            return None;
        }
        self.buckets[(hash % BUCKETS as u64) as usize]
            .iter()
            .map(|&id| id as usize)
            .find(|&id| starts_with(haystack, start, &self.needles[id], self.mode))
            .map(|id| ACMatch {
                needle: id,
                start,
                len: self.needles[id].len(),
            })
    }

    #[inline(always)]
    fn fold(&self, unit: u16) -> u64 {
        match self.mode {
            CaseMode::CaseSensitive => unit as u64,
            _ => fold_ascii(unit) as u64,
        }
    }
}

fn hash_units(units: &[u16]) -> u64 {
    units
        .iter()
        .fold(0u64, |h, &u| h.wrapping_mul(MULTIPLIER).wrapping_add(u as u64))
}
