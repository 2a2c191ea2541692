//! Nibble bitmaps and dense bitsets for set membership
//!
//! A [`NibbleBitmap`] stores a set of bytes as two 16-byte tables indexed by
//! the low nibble. For a member `b < 0x80`, `low[b & 0xF]` has bit
//! `(b >> 4) & 7` set; members `>= 0x80` go to `high` the same way. A vector
//! of bytes is tested with three table lookups:
//!
//! ```text
//! row = shuffle(low, b & 0x8F) | shuffle(high, (b ^ 0x80) & 0x8F)
//! hit = row & shuffle(BITS, b >> 4)        BITS[h] = 1 << (h & 7)
//! ```
//!
//! Masking with `0x8F` keeps bit 7, so each lookup yields 0 for the half of
//! the byte range its table does not cover.

use crate::vector::{Vector, LANES};

const BIT_TABLE: [u8; LANES] = [1, 2, 4, 8, 16, 32, 64, 128, 1, 2, 4, 8, 16, 32, 64, 128];

/// 256-bit byte set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NibbleBitmap {
    low: [u8; LANES],
    high: [u8; LANES],
    bits: [u64; 4],
}

impl NibbleBitmap {
    pub(crate) fn new<I: IntoIterator<Item = u8>>(bytes: I) -> Self {
        let mut bitmap = NibbleBitmap {
            low: [0; LANES],
            high: [0; LANES],
            bits: [0; 4],
        };
        for b in bytes {
            bitmap.insert(b);
        }
        bitmap
    }

    fn insert(&mut self, b: u8) {
        let row = 1u8 << ((b >> 4) & 7);
        if b < 0x80 {
            self.low[(b & 0x0F) as usize] |= row;
        } else {
            self.high[(b & 0x0F) as usize] |= row;
        }
        self.bits[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    #[inline(always)]
    pub(crate) fn contains(&self, b: u8) -> bool {
        self.bits[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }

    /// Whether every member is below `0x80`.
    pub(crate) fn is_ascii_only(&self) -> bool {
        self.bits[2] == 0 && self.bits[3] == 0
    }

    pub(crate) fn members(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }

    /// Load the tables into vector registers once per scan.
    #[inline(always)]
    pub(crate) unsafe fn tables<V: Vector>(&self) -> NibbleTables<V> {
        NibbleTables {
            low: V::from_array(self.low),
            high: V::from_array(self.high),
            bits: V::from_array(BIT_TABLE),
            keep_high_bit: V::splat(0x8F),
            flip_high_bit: V::splat(0x80),
        }
    }
}

/// Register-resident copy of a [`NibbleBitmap`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct NibbleTables<V> {
    low: V,
    high: V,
    bits: V,
    keep_high_bit: V,
    flip_high_bit: V,
}

impl<V: Vector> NibbleTables<V> {
    /// Lane mask of bytes in the set.
    #[inline(always)]
    pub(crate) unsafe fn mask(&self, v: V) -> u32 {
        let lo_row = self.low.shuffle(v.and(self.keep_high_bit));
        let hi_row = self
            .high
            .shuffle(v.xor(self.flip_high_bit).and(self.keep_high_bit));
        let bit = self.bits.shuffle(v.shr4());
        lo_row.or(hi_row).and(bit).nonzero_mask()
    }

    /// Lane mask for a set known to hold only bytes below `0x80`.
    #[inline(always)]
    pub(crate) unsafe fn ascii_mask(&self, v: V) -> u32 {
        let row = self.low.shuffle(v.and(self.keep_high_bit));
        row.and(self.bits.shuffle(v.shr4())).nonzero_mask()
    }
}

/// Bitset over code units `0..=max`, for large non-ASCII character sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DenseBitmap {
    words: Box<[u64]>,
    max: u16,
}

impl DenseBitmap {
    pub(crate) fn new(values: &[u16]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        let mut words = vec![0u64; max as usize / 64 + 1].into_boxed_slice();
        for &v in values {
            words[v as usize / 64] |= 1u64 << (v % 64);
        }
        DenseBitmap { words, max }
    }

    #[inline(always)]
    pub(crate) fn contains(&self, unit: u16) -> bool {
        unit <= self.max && self.words[unit as usize / 64] & (1u64 << (unit % 64)) != 0
    }

    pub(crate) fn members(&self) -> impl Iterator<Item = u16> + '_ {
        (0..=self.max).filter(move |&u| self.contains(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{supported_isas, vector_kernel};

    unsafe fn masks<V: Vector>(bitmap: &NibbleBitmap, bytes: &[u8; LANES]) -> (u32, u32) {
        let tables = bitmap.tables::<V>();
        let v = V::load(bytes.as_ptr());
        (tables.mask(v), tables.ascii_mask(v))
    }

    vector_kernel! {
        fn run_masks(bitmap: &NibbleBitmap, bytes: &[u8; LANES]) -> (u32, u32) => masks;
    }

    #[test]
    fn test_scalar_membership() {
        let bitmap = NibbleBitmap::new([b'a', b'z', 0x80, 0xFF]);
        assert!(bitmap.contains(b'a'));
        assert!(bitmap.contains(0xFF));
        assert!(!bitmap.contains(b'b'));
        assert!(!bitmap.is_ascii_only());
        assert_eq!(bitmap.members().collect::<Vec<_>>(), vec![b'a', b'z', 0x80, 0xFF]);
    }

    #[test]
    fn test_vector_mask_matches_scalar() {
        let bitmap = NibbleBitmap::new([b'a', b'Q', b'0', 0x7F, 0x80, 0xC3, 0xFF]);
        let ascii = NibbleBitmap::new([b'a', b'Q', b'0', 0x7F]);
        for isa in supported_isas() {
            for chunk in 0..16u8 {
                let bytes: [u8; LANES] = core::array::from_fn(|i| chunk * 16 + i as u8);
                let expected = (0..LANES)
                    .filter(|&i| bitmap.contains(bytes[i]))
                    .fold(0u32, |m, i| m | (1 << i));
                let (full, _) = run_masks(isa, &bitmap, &bytes);
                assert_eq!(full, expected, "isa {} chunk {}", isa, chunk);

                let expected_ascii = (0..LANES)
                    .filter(|&i| ascii.contains(bytes[i]))
                    .fold(0u32, |m, i| m | (1 << i));
                let (_, ascii_only) = run_masks(isa, &ascii, &bytes);
                assert_eq!(ascii_only, expected_ascii, "isa {} chunk {}", isa, chunk);
            }
        }
    }

    #[test]
    fn test_dense_bitmap() {
        let dense = DenseBitmap::new(&[0x100, 0x3A9, 0x4E00]);
        assert!(dense.contains(0x3A9));
        assert!(!dense.contains(0x3AA));
        assert!(!dense.contains(0xFFFF));
        assert_eq!(dense.members().count(), 3);
    }
}
