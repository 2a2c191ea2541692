//! Probabilistic map for small non-ASCII character sets
//!
//! The map records which byte values occur as either the low or the high
//! byte of any member: byte `v` sets bit `v >> 3` of word `v & 7`. A code
//! unit is a candidate when both of its bytes are recorded. Candidates are
//! then confirmed against the sorted member list, so false positives never
//! escape.

use crate::bitmap::NibbleBitmap;
use crate::bitmap::NibbleTables;
use crate::vector::{vector_kernel, Isa, Vector, LANES};

/// Largest set handled by the map; bigger sets use a dense bitmap.
pub(crate) const MAX_VALUES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProbabilisticMap {
    words: [u32; 8],
}

impl ProbabilisticMap {
    pub(crate) fn new(values: &[u16]) -> Self {
        let mut map = ProbabilisticMap { words: [0; 8] };
        for &v in values {
            map.set(v as u8);
            map.set((v >> 8) as u8);
        }
        map
    }

    fn set(&mut self, byte: u8) {
        self.words[(byte & 7) as usize] |= 1u32 << (byte >> 3);
    }

    #[inline(always)]
    fn is_set(&self, byte: u8) -> bool {
        self.words[(byte & 7) as usize] & (1u32 << (byte >> 3)) != 0
    }

    #[inline(always)]
    pub(crate) fn may_contain(&self, unit: u16) -> bool {
        self.is_set(unit as u8) && self.is_set((unit >> 8) as u8)
    }

    /// The recorded bytes as a nibble bitmap, for the vector kernels.
    pub(crate) fn to_nibble_bitmap(&self) -> NibbleBitmap {
        NibbleBitmap::new((0..=255u8).filter(|&b| self.is_set(b)))
    }
}

/// Whether a plain `O(n * m)` scan beats the vectorized candidate search.
#[inline]
pub(crate) fn should_use_simple_loop(haystack_len: usize, value_count: usize) -> bool {
    haystack_len < LANES || (haystack_len < 20 && haystack_len < (value_count >> 2))
}

/// Character set of at most [`MAX_VALUES`] units, some outside ASCII.
#[derive(Debug, Clone)]
pub(crate) struct ProbabilisticSet {
    values: Box<[u16]>,
    map: ProbabilisticMap,
    bitmap: NibbleBitmap,
}

impl ProbabilisticSet {
    /// `values` must be sorted and deduplicated.
    pub(crate) fn new(values: &[u16]) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        let map = ProbabilisticMap::new(values);
        let bitmap = map.to_nibble_bitmap();
        ProbabilisticSet {
            values: values.into(),
            map,
            bitmap,
        }
    }

    #[inline(always)]
    pub(crate) fn contains(&self, unit: u16) -> bool {
        self.map.may_contain(unit) && self.values.binary_search(&unit).is_ok()
    }

    pub(crate) fn values(&self) -> &[u16] {
        &self.values
    }

    pub(crate) fn index_of(&self, isa: Isa, haystack: &[u16], except: bool) -> Option<usize> {
        if should_use_simple_loop(haystack.len(), self.values.len()) {
            return haystack
                .iter()
                .position(|&u| self.values.contains(&u) != except);
        }
        probabilistic_first(isa, self, haystack, except)
    }

    pub(crate) fn last_index_of(&self, isa: Isa, haystack: &[u16], except: bool) -> Option<usize> {
        if should_use_simple_loop(haystack.len(), self.values.len()) {
            return haystack
                .iter()
                .rposition(|&u| self.values.contains(&u) != except);
        }
        probabilistic_last(isa, self, haystack, except)
    }

    /// Lowest lane of `live` that is a hit (`except == false`) or a miss.
    #[inline(always)]
    fn resolve_first(
        &self,
        haystack: &[u16],
        at: usize,
        candidates: u32,
        live: u32,
        except: bool,
    ) -> Option<usize> {
        let mut lanes = if except { live } else { candidates & live };
        while lanes != 0 {
            let j = lanes.trailing_zeros() as usize;
            let hit =
                candidates & (1 << j) != 0 && self.values.binary_search(&haystack[at + j]).is_ok();
            if hit != except {
                return Some(at + j);
            }
            lanes &= lanes - 1;
        }
        None
    }

    #[inline(always)]
    fn resolve_last(
        &self,
        haystack: &[u16],
        at: usize,
        candidates: u32,
        live: u32,
        except: bool,
    ) -> Option<usize> {
        let mut lanes = if except { live } else { candidates & live };
        while lanes != 0 {
            let j = (31 - lanes.leading_zeros()) as usize;
            let hit =
                candidates & (1 << j) != 0 && self.values.binary_search(&haystack[at + j]).is_ok();
            if hit != except {
                return Some(at + j);
            }
            lanes &= !(1 << j);
        }
        None
    }
}

#[inline(always)]
unsafe fn candidates<V: Vector>(tables: &NibbleTables<V>, ptr: *const u16) -> u32 {
    let (lo, hi) = V::load_split(ptr);
    tables.mask(lo) & tables.mask(hi)
}

unsafe fn probabilistic_first_kernel<V: Vector>(
    set: &ProbabilisticSet,
    haystack: &[u16],
    except: bool,
) -> Option<usize> {
    let tables = set.bitmap.tables::<V>();
    let n = haystack.len();
    let ptr = haystack.as_ptr();

    let mut at = 0;
    while at + LANES <= n {
        let cand = candidates(&tables, ptr.add(at));
        if let Some(i) = set.resolve_first(haystack, at, cand, 0xFFFF, except) {
            return Some(i);
        }
        at += LANES;
    }
    if at < n {
        let done = at;
        let at = n - LANES;
        let cand = candidates(&tables, ptr.add(at));
        let live = (0xFFFF << (done - at)) & 0xFFFF;
        return set.resolve_first(haystack, at, cand, live, except);
    }
    None
}

unsafe fn probabilistic_last_kernel<V: Vector>(
    set: &ProbabilisticSet,
    haystack: &[u16],
    except: bool,
) -> Option<usize> {
    let tables = set.bitmap.tables::<V>();
    let ptr = haystack.as_ptr();

    let mut end = haystack.len();
    while end >= LANES {
        let at = end - LANES;
        let cand = candidates(&tables, ptr.add(at));
        if let Some(i) = set.resolve_last(haystack, at, cand, 0xFFFF, except) {
            return Some(i);
        }
        end = at;
    }
    if end > 0 {
        let cand = candidates(&tables, ptr);
        return set.resolve_last(haystack, 0, cand, (1u32 << end) - 1, except);
    }
    None
}

vector_kernel! {
    fn probabilistic_first(set: &ProbabilisticSet, haystack: &[u16], except: bool) -> Option<usize> => probabilistic_first_kernel;
    fn probabilistic_last(set: &ProbabilisticSet, haystack: &[u16], except: bool) -> Option<usize> => probabilistic_last_kernel;
}
