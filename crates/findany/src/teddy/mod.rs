//! Teddy: packed multi-needle search over short fingerprints
//!
//! Needles are grouped into at most eight buckets. For each of the first two
//! or three needle offsets, a pair of 16-byte tables maps the low and high
//! nibble of a haystack unit to the set of buckets having a needle whose unit
//! at that offset shares the nibble. Shuffling a block of narrowed haystack
//! units through both tables and ANDing yields, per lane, the buckets whose
//! fingerprint may match there.
//!
//! The per-offset results are realigned with `shift_in_one` / `shift_in_two`,
//! carrying the previous block's trailing lanes, so lane `j` of the combined
//! result speaks for the start `j - (offsets - 1)` relative to the block.
//! Every surviving lane is verified against the needles of its buckets.
//!
//! Fingerprint units are ASCII; saturated non-ASCII haystack units (`0xFF`)
//! land in a high-nibble slot no fingerprint uses, so they never match.

mod bucketize;

use findany_ac::ACMatch;
use findany_match_mode::CaseMode;

use crate::verify::{fold_needle, starts_with};
use crate::vector::{vector_kernel, Isa, Vector, LANES};

use bucketize::{bucketize, Footprint};

/// Largest needle set Teddy accepts.
pub(crate) const MAX_NEEDLES: usize = 64;
pub(crate) const MAX_OFFSETS: usize = 3;
const MIN_OFFSETS: usize = 2;

/// Why a needle set cannot use Teddy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ineligible {
    TooFewNeedles,
    TooManyNeedles,
    NeedleTooShort,
    NonAsciiPrefix,
}

impl Ineligible {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Ineligible::TooFewNeedles => "fewer than two needles",
            Ineligible::TooManyNeedles => "more than 64 needles",
            Ineligible::NeedleTooShort => "needle shorter than two units",
            Ineligible::NonAsciiPrefix => "non-ASCII unit in a fingerprint prefix",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Teddy {
    mode: CaseMode,
    isa: Isa,
    offsets: usize,
    /// Folded needles, indexed by the caller's needle order.
    needles: Vec<Box<[u16]>>,
    /// Reachable needle ids per bucket, shortest first.
    buckets: Vec<Vec<u32>>,
    lo: [[u8; LANES]; MAX_OFFSETS],
    hi: [[u8; LANES]; MAX_OFFSETS],
}

struct Tables<V> {
    lo: [V; MAX_OFFSETS],
    hi: [V; MAX_OFFSETS],
    low_nibble: V,
}

impl<V: Vector> Tables<V> {
    /// Buckets whose fingerprint at offset `k` accepts each lane of `block`.
    #[inline(always)]
    unsafe fn members(&self, k: usize, block: V) -> V {
        self.lo[k]
            .shuffle(block.and(self.low_nibble))
            .and(self.hi[k].shuffle(block.shr4()))
    }
}

impl Teddy {
    /// `unreachable` lists needles that can never be reported because a
    /// prefix of them is also a needle; they get no bucket.
    pub(crate) fn new<N: AsRef<[u16]>>(
        needles: &[N],
        mode: CaseMode,
        isa: Isa,
        unreachable: &[usize],
    ) -> Result<Self, Ineligible> {
        if needles.len() < 2 {
            return Err(Ineligible::TooFewNeedles);
        }
        if needles.len() > MAX_NEEDLES {
            return Err(Ineligible::TooManyNeedles);
        }
        let needles: Vec<Box<[u16]>> = needles
            .iter()
            .map(|n| fold_needle(n.as_ref(), mode).into_boxed_slice())
            .collect();
        let min_len = needles.iter().map(|n| n.len()).min().unwrap_or(0);
        if min_len < MIN_OFFSETS {
            return Err(Ineligible::NeedleTooShort);
        }
        let ascii_prefix = |len: usize| needles.iter().all(|n| n[..len].iter().all(|&u| u < 0x80));
        if !ascii_prefix(MIN_OFFSETS) {
            return Err(Ineligible::NonAsciiPrefix);
        }
        let offsets = if min_len >= MAX_OFFSETS && ascii_prefix(MAX_OFFSETS) {
            MAX_OFFSETS
        } else {
            MIN_OFFSETS
        };

        let mut reachable: Vec<usize> =
            (0..needles.len()).filter(|i| !unreachable.contains(i)).collect();
        reachable.sort_by_key(|&i| needles[i].len());

        let footprints: Vec<Footprint> = reachable
            .iter()
            .map(|&id| {
                let accepted: Vec<[u8; 2]> =
                    needles[id][..offsets].iter().map(|&u| case_variants(u, mode)).collect();
                Footprint::new(accepted.iter().map(|v| &v[..]))
            })
            .collect();
        let buckets: Vec<Vec<u32>> = bucketize(&footprints)
            .into_iter()
            .map(|group| {
                let mut ids: Vec<u32> = group.into_iter().map(|slot| reachable[slot] as u32).collect();
                ids.sort_by_key(|&id| (needles[id as usize].len(), id));
                ids
            })
            .collect();

        let mut lo = [[0u8; LANES]; MAX_OFFSETS];
        let mut hi = [[0u8; LANES]; MAX_OFFSETS];
        for (bucket, ids) in buckets.iter().enumerate() {
            for &id in ids {
                for (k, &unit) in needles[id as usize][..offsets].iter().enumerate() {
                    for byte in case_variants(unit, mode) {
                        lo[k][(byte & 0x0F) as usize] |= 1 << bucket;
                        hi[k][(byte >> 4) as usize] |= 1 << bucket;
                    }
                }
            }
        }

        Ok(Teddy {
            mode,
            isa,
            offsets,
            needles,
            buckets,
            lo,
            hi,
        })
    }

    pub(crate) fn offsets(&self) -> usize {
        self.offsets
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Shortest haystack the vector kernel can scan.
    pub(crate) fn min_haystack_len(&self) -> usize {
        LANES + self.offsets - 1
    }

    /// Leftmost match. The caller routes haystacks shorter than
    /// [`min_haystack_len`](Self::min_haystack_len) elsewhere.
    pub(crate) fn find(&self, haystack: &[u16]) -> Option<ACMatch> {
        debug_assert!(haystack.len() >= self.min_haystack_len());
        if haystack.len() < self.min_haystack_len() {
            return None;
        }
        teddy_find(self.isa, self, haystack)
    }

    #[inline(always)]
    unsafe fn tables<V: Vector>(&self) -> Tables<V> {
        Tables {
            lo: self.lo.map(|t| V::from_array(t)),
            hi: self.hi.map(|t| V::from_array(t)),
            low_nibble: V::splat(0x0F),
        }
    }

    /// Check the lanes of `res` selected by `live`; lane `j` is the start
    /// `base + j`.
    #[inline(always)]
    unsafe fn verify<V: Vector>(
        &self,
        haystack: &[u16],
        base: usize,
        res: V,
        live: u32,
    ) -> Option<ACMatch> {
        let mut lanes = res.nonzero_mask() & live;
        if lanes == 0 {
            return None;
        }
        let bucket_bits = res.to_array();
        while lanes != 0 {
            let lane = lanes.trailing_zeros() as usize;
            let start = base + lane;
            let mut bits = bucket_bits[lane];
            while bits != 0 {
                let bucket = bits.trailing_zeros() as usize;
                for &id in &self.buckets[bucket] {
                    let needle = &self.needles[id as usize];
                    if starts_with(haystack, start, needle, self.mode) {
                        return Some(ACMatch {
                            needle: id as usize,
                            start,
                            len: needle.len(),
                        });
                    }
                }
                bits &= bits - 1;
            }
            lanes &= lanes - 1;
        }
        None
    }
}

/// The byte forms of a fingerprint unit the tables must accept.
fn case_variants(unit: u16, mode: CaseMode) -> [u8; 2] {
    let byte = unit as u8;
    if mode.ignores_case() && byte.is_ascii_alphabetic() {
        [byte.to_ascii_lowercase(), byte.to_ascii_uppercase()]
    } else {
        [byte, byte]
    }
}

unsafe fn teddy_kernel<V: Vector>(teddy: &Teddy, haystack: &[u16]) -> Option<ACMatch> {
    let tables = teddy.tables::<V>();
    if teddy.offsets == MAX_OFFSETS {
        find3(teddy, &tables, haystack)
    } else {
        find2(teddy, &tables, haystack)
    }
}

#[inline(always)]
unsafe fn find2<V: Vector>(teddy: &Teddy, tables: &Tables<V>, haystack: &[u16]) -> Option<ACMatch> {
    let n = haystack.len();
    let ptr = haystack.as_ptr();
    // All buckets for the lane before the first block; verification rejects
    // whatever that lets through.
    let mut prev0 = V::splat(0xFF);
    let mut at = 1;
    while at + LANES <= n {
        let block = V::load_narrow(ptr.add(at));
        let res0 = tables.members(0, block);
        let res1 = tables.members(1, block);
        let res = res1.and(res0.shift_in_one(prev0));
        prev0 = res0;
        if let Some(m) = teddy.verify(haystack, at - 1, res, 0xFFFF) {
            return Some(m);
        }
        at += LANES;
    }
    if at < n {
        let last = n - LANES;
        let res0 = tables.members(0, V::load_narrow(ptr.add(last - 1)));
        let res1 = tables.members(1, V::load_narrow(ptr.add(last)));
        let live = (0xFFFF << (at - last)) & 0xFFFF;
        return teddy.verify(haystack, last - 1, res0.and(res1), live);
    }
    None
}

#[inline(always)]
unsafe fn find3<V: Vector>(teddy: &Teddy, tables: &Tables<V>, haystack: &[u16]) -> Option<ACMatch> {
    let n = haystack.len();
    let ptr = haystack.as_ptr();
    let mut prev0 = V::splat(0xFF);
    let mut prev1 = V::splat(0xFF);
    let mut at = 2;
    while at + LANES <= n {
        let block = V::load_narrow(ptr.add(at));
        let res0 = tables.members(0, block);
        let res1 = tables.members(1, block);
        let res2 = tables.members(2, block);
        let res = res2
            .and(res1.shift_in_one(prev1))
            .and(res0.shift_in_two(prev0));
        prev0 = res0;
        prev1 = res1;
        if let Some(m) = teddy.verify(haystack, at - 2, res, 0xFFFF) {
            return Some(m);
        }
        at += LANES;
    }
    if at < n {
        let last = n - LANES;
        let res0 = tables.members(0, V::load_narrow(ptr.add(last - 2)));
        let res1 = tables.members(1, V::load_narrow(ptr.add(last - 1)));
        let res2 = tables.members(2, V::load_narrow(ptr.add(last)));
        let live = (0xFFFF << (at - last)) & 0xFFFF;
        return teddy.verify(haystack, last - 2, res0.and(res1).and(res2), live);
    }
    None
}

vector_kernel! {
    fn teddy_find(teddy: &Teddy, haystack: &[u16]) -> Option<ACMatch> => teddy_kernel;
}
