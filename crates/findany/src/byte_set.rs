//! Byte-set search
//!
//! Sets of one to three bytes go straight to `memchr`; contiguous ranges use
//! a subtract-and-compare; everything else runs the full 256-bit nibble
//! bitmap kernel.

use std::sync::OnceLock;

use crate::bitmap::NibbleBitmap;
use crate::vector::{first_in_blocks, last_in_blocks, vector_kernel, Isa, Vector, LANES};

#[derive(Debug, Clone)]
enum Strategy {
    Empty,
    One(u8),
    Two(u8, u8),
    Three(u8, u8, u8),
    Range { lo: u8, hi: u8 },
    Bitmap(NibbleBitmap),
}

impl Strategy {
    fn select(values: &[u8]) -> Strategy {
        match values {
            [] => Strategy::Empty,
            [a] => Strategy::One(*a),
            [lo, .., hi] if (*hi - *lo) as usize + 1 == values.len() && values.len() > 3 => {
                Strategy::Range { lo: *lo, hi: *hi }
            }
            [a, b] => Strategy::Two(*a, *b),
            [a, b, c] => Strategy::Three(*a, *b, *c),
            _ => Strategy::Bitmap(NibbleBitmap::new(values.iter().copied())),
        }
    }

    #[inline(always)]
    fn contains(&self, b: u8) -> bool {
        match self {
            Strategy::Empty => false,
            Strategy::One(x) => b == *x,
            Strategy::Two(x, y) => b == *x || b == *y,
            Strategy::Three(x, y, z) => b == *x || b == *y || b == *z,
            Strategy::Range { lo, hi } => b.wrapping_sub(*lo) <= hi - lo,
            Strategy::Bitmap(bitmap) => bitmap.contains(b),
        }
    }
}

/// Immutable set of bytes compiled for fast scanning.
#[derive(Debug)]
pub struct ByteSearchValues {
    strategy: Strategy,
    isa: Isa,
    values: OnceLock<Vec<u8>>,
}

impl ByteSearchValues {
    /// Build a set using the best instruction set of the running CPU.
    pub fn new(values: &[u8]) -> Self {
        Self::with_isa(values, Isa::detect())
    }

    /// Like [`new`](Self::new), adding the other case of every ASCII letter.
    pub fn new_ignore_case(values: &[u8]) -> Self {
        let expanded: Vec<u8> = values
            .iter()
            .flat_map(|&b| [b.to_ascii_lowercase(), b.to_ascii_uppercase()])
            .collect();
        Self::with_isa(&expanded, Isa::detect())
    }

    pub(crate) fn with_isa(values: &[u8], isa: Isa) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        ByteSearchValues {
            strategy: Strategy::select(&sorted),
            isa,
            values: OnceLock::new(),
        }
    }

    /// Instruction set the vector kernels run with.
    pub fn isa(&self) -> Isa {
        self.isa
    }

    /// Whether `byte` is in the set.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.strategy.contains(byte)
    }

    /// The members of the set, sorted.
    pub fn values(&self) -> &[u8] {
        self.values
            .get_or_init(|| (0..=255u8).filter(|&b| self.strategy.contains(b)).collect())
    }

    /// Index of the first byte in the set.
    pub fn index_of_any(&self, haystack: &[u8]) -> Option<usize> {
        match &self.strategy {
            Strategy::Empty => None,
            Strategy::One(a) => memchr::memchr(*a, haystack),
            Strategy::Two(a, b) => memchr::memchr2(*a, *b, haystack),
            Strategy::Three(a, b, c) => memchr::memchr3(*a, *b, *c, haystack),
            Strategy::Bitmap(bitmap) if haystack.len() >= LANES => {
                bitmap_first(self.isa, bitmap, haystack, false)
            }
            strategy => haystack.iter().position(|&b| strategy.contains(b)),
        }
    }

    /// Index of the first byte not in the set.
    pub fn index_of_any_except(&self, haystack: &[u8]) -> Option<usize> {
        match &self.strategy {
            Strategy::Bitmap(bitmap) if haystack.len() >= LANES => {
                bitmap_first(self.isa, bitmap, haystack, true)
            }
            strategy => haystack.iter().position(|&b| !strategy.contains(b)),
        }
    }

    /// Index of the last byte in the set.
    pub fn last_index_of_any(&self, haystack: &[u8]) -> Option<usize> {
        match &self.strategy {
            Strategy::Empty => None,
            Strategy::One(a) => memchr::memrchr(*a, haystack),
            Strategy::Two(a, b) => memchr::memrchr2(*a, *b, haystack),
            Strategy::Three(a, b, c) => memchr::memrchr3(*a, *b, *c, haystack),
            Strategy::Bitmap(bitmap) if haystack.len() >= LANES => {
                bitmap_last(self.isa, bitmap, haystack, false)
            }
            strategy => haystack.iter().rposition(|&b| strategy.contains(b)),
        }
    }

    /// Index of the last byte not in the set.
    pub fn last_index_of_any_except(&self, haystack: &[u8]) -> Option<usize> {
        match &self.strategy {
            Strategy::Bitmap(bitmap) if haystack.len() >= LANES => {
                bitmap_last(self.isa, bitmap, haystack, true)
            }
            strategy => haystack.iter().rposition(|&b| !strategy.contains(b)),
        }
    }

    /// Whether any byte of `haystack` is in the set.
    pub fn contains_any(&self, haystack: &[u8]) -> bool {
        self.index_of_any(haystack).is_some()
    }
}

unsafe fn bitmap_first_kernel<V: Vector>(
    bitmap: &NibbleBitmap,
    haystack: &[u8],
    except: bool,
) -> Option<usize> {
    let tables = bitmap.tables::<V>();
    let flip = if except { 0xFFFF } else { 0 };
    let ptr = haystack.as_ptr();
    if bitmap.is_ascii_only() {
        first_in_blocks!(haystack.len(), |at| tables.ascii_mask(V::load(ptr.add(at))) ^ flip)
    } else {
        first_in_blocks!(haystack.len(), |at| tables.mask(V::load(ptr.add(at))) ^ flip)
    }
}

unsafe fn bitmap_last_kernel<V: Vector>(
    bitmap: &NibbleBitmap,
    haystack: &[u8],
    except: bool,
) -> Option<usize> {
    let tables = bitmap.tables::<V>();
    let flip = if except { 0xFFFF } else { 0 };
    let ptr = haystack.as_ptr();
    if bitmap.is_ascii_only() {
        last_in_blocks!(haystack.len(), |at| tables.ascii_mask(V::load(ptr.add(at))) ^ flip)
    } else {
        last_in_blocks!(haystack.len(), |at| tables.mask(V::load(ptr.add(at))) ^ flip)
    }
}

vector_kernel! {
    fn bitmap_first(bitmap: &NibbleBitmap, haystack: &[u8], except: bool) -> Option<usize> => bitmap_first_kernel;
    fn bitmap_last(bitmap: &NibbleBitmap, haystack: &[u8], except: bool) -> Option<usize> => bitmap_last_kernel;
}
