//! Single-string search with rare-character anchors
//!
//! Up to three needle positions holding the rarest units (by
//! [`frequency`](findany_ac::frequency::frequency)) are compared lane-wise
//! against the haystack; only starts where every anchor matches are verified
//! with a full comparison.
//!
//! Anchors compare whole 16-bit units by splitting each load into low and
//! high bytes. ASCII letters under a case-insensitive mode compare
//! `low | 0x20` against the lowercase letter and require a zero high byte.

use findany_ac::frequency::frequency;
use findany_match_mode::CaseMode;

use crate::verify::{fold_needle, starts_with};
use crate::vector::{vector_kernel, Isa, Vector, LANES};

const MAX_ANCHORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    offset: usize,
    lo: u8,
    hi: u8,
    /// ASCII letter compared case-insensitively; `lo` holds the lowercase form
    fold_letter: bool,
}

impl Anchor {
    fn new(offset: usize, unit: u16, mode: CaseMode) -> Self {
        let fold_letter = mode.ignores_case() && (unit as u8).is_ascii_alphabetic() && unit < 0x80;
        let unit = if fold_letter { unit | 0x20 } else { unit };
        Anchor {
            offset,
            lo: unit as u8,
            hi: (unit >> 8) as u8,
            fold_letter,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AnchorVector<V> {
    offset: usize,
    lo: V,
    hi: V,
    fold_letter: bool,
}

/// Matcher for one needle of at least two units.
#[derive(Debug, Clone)]
pub(crate) struct SingleString {
    needle: Box<[u16]>,
    mode: CaseMode,
    /// Always three entries; with two distinct anchors the first is repeated.
    anchors: [Anchor; MAX_ANCHORS],
    isa: Isa,
}

impl SingleString {
    /// Returns `None` when fewer than two positions can serve as anchors,
    /// which only happens in Unicode case-insensitive mode where anchors
    /// must be ASCII.
    pub(crate) fn new(needle: &[u16], mode: CaseMode, isa: Isa) -> Option<Self> {
        debug_assert!(needle.len() >= 2);
        let folded = fold_needle(needle, mode);

        let mut candidates: Vec<(u8, usize)> = folded
            .iter()
            .enumerate()
            .filter(|(_, &u)| mode != CaseMode::CaseInsensitiveUnicode || u < 0x80)
            .map(|(offset, &u)| (rarity_key(u), offset))
            .collect();
        if candidates.len() < 2 {
            return None;
        }
        candidates.sort_unstable();
        candidates.truncate(MAX_ANCHORS);
        candidates.sort_unstable_by_key(|&(_, offset)| offset);

        let picked: Vec<Anchor> = candidates
            .iter()
            .map(|&(_, offset)| Anchor::new(offset, folded[offset], mode))
            .collect();
        let anchors = [picked[0], picked[1], *picked.get(2).unwrap_or(&picked[0])];

        Some(SingleString {
            needle: folded.into(),
            mode,
            anchors,
            isa,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.needle.len()
    }

    pub(crate) fn find(&self, haystack: &[u16]) -> Option<usize> {
        let limit = (haystack.len() + 1).checked_sub(self.needle.len())?;
        if limit < LANES {
            return (0..limit).find(|&s| self.matches_at(haystack, s));
        }
        single_first(self.isa, self, haystack)
    }

    pub(crate) fn rfind(&self, haystack: &[u16]) -> Option<usize> {
        let limit = (haystack.len() + 1).checked_sub(self.needle.len())?;
        if limit < LANES {
            return (0..limit).rev().find(|&s| self.matches_at(haystack, s));
        }
        single_last(self.isa, self, haystack)
    }

    #[inline(always)]
    fn matches_at(&self, haystack: &[u16], start: usize) -> bool {
        starts_with(haystack, start, &self.needle, self.mode)
    }

    #[inline(always)]
    unsafe fn anchor_vectors<V: Vector>(&self) -> [AnchorVector<V>; MAX_ANCHORS] {
        self.anchors.map(|a| AnchorVector {
            offset: a.offset,
            lo: V::splat(a.lo),
            hi: V::splat(a.hi),
            fold_letter: a.fold_letter,
        })
    }
}

/// Sort key: rarer first. Letters are ranked by their lowercase form.
fn rarity_key(unit: u16) -> u8 {
    if (b'A' as u16..=b'Z' as u16).contains(&unit) {
        frequency(unit | 0x20)
    } else {
        frequency(unit)
    }
}

/// Lanes of the block starting at `ptr` where all anchors match.
#[inline(always)]
unsafe fn block_mask<V: Vector>(anchors: &[AnchorVector<V>; MAX_ANCHORS], ptr: *const u16) -> u32 {
    let zero = V::splat(0);
    let case_bit = V::splat(0x20);
    let mut all = V::splat(0xFF);
    for anchor in anchors {
        let (lo, hi) = V::load_split(ptr.add(anchor.offset));
        let lo = if anchor.fold_letter { lo.or(case_bit) } else { lo };
        let hi_ok = if anchor.fold_letter { hi.eq(zero) } else { hi.eq(anchor.hi) };
        all = all.and(lo.eq(anchor.lo)).and(hi_ok);
    }
    all.movemask()
}

unsafe fn single_first_kernel<V: Vector>(matcher: &SingleString, haystack: &[u16]) -> Option<usize> {
    // Starts [0, limit) keep the whole needle in bounds, so every anchor
    // load of a full block stays inside the haystack.
    let limit = haystack.len() + 1 - matcher.needle.len();
    let anchors = matcher.anchor_vectors::<V>();
    let ptr = haystack.as_ptr();

    let mut at = 0;
    while at + LANES <= limit {
        let mut mask = block_mask(&anchors, ptr.add(at));
        while mask != 0 {
            let start = at + mask.trailing_zeros() as usize;
            if matcher.matches_at(haystack, start) {
                return Some(start);
            }
            mask &= mask - 1;
        }
        at += LANES;
    }
    if at < limit {
        let done = at;
        let at = limit - LANES;
        let mut mask = block_mask(&anchors, ptr.add(at)) & (0xFFFF << (done - at));
        while mask != 0 {
            let start = at + mask.trailing_zeros() as usize;
            if matcher.matches_at(haystack, start) {
                return Some(start);
            }
            mask &= mask - 1;
        }
    }
    None
}

unsafe fn single_last_kernel<V: Vector>(matcher: &SingleString, haystack: &[u16]) -> Option<usize> {
    let limit = haystack.len() + 1 - matcher.needle.len();
    let anchors = matcher.anchor_vectors::<V>();
    let ptr = haystack.as_ptr();

    let mut end = limit;
    while end >= LANES {
        let at = end - LANES;
        let mut mask = block_mask(&anchors, ptr.add(at));
        while mask != 0 {
            let lane = (31 - mask.leading_zeros()) as usize;
            if matcher.matches_at(haystack, at + lane) {
                return Some(at + lane);
            }
            mask &= !(1 << lane);
        }
        end = at;
    }
    if end > 0 {
        let mut mask = block_mask(&anchors, ptr) & ((1u32 << end) - 1);
        while mask != 0 {
            let lane = (31 - mask.leading_zeros()) as usize;
            if matcher.matches_at(haystack, lane) {
                return Some(lane);
            }
            mask &= !(1 << lane);
        }
    }
    None
}

vector_kernel! {
    fn single_first(matcher: &SingleString, haystack: &[u16]) -> Option<usize> => single_first_kernel;
    fn single_last(matcher: &SingleString, haystack: &[u16]) -> Option<usize> => single_last_kernel;
}
