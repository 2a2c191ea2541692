//! SSSE3 implementation of [`Vector`].

use core::arch::x86_64::*;

use super::{Vector, LANES};

/// Clamp every 16-bit lane to `0x00FF` so `packus` cannot see a negative.
#[inline(always)]
unsafe fn saturate_to_byte(v: __m128i) -> __m128i {
    let small = _mm_cmpeq_epi16(_mm_srli_epi16(v, 8), _mm_setzero_si128());
    _mm_or_si128(
        _mm_and_si128(v, small),
        _mm_andnot_si128(small, _mm_set1_epi16(0x00FF)),
    )
}

impl Vector for __m128i {
    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        _mm_set1_epi8(byte as i8)
    }

    #[inline(always)]
    unsafe fn from_array(bytes: [u8; LANES]) -> Self {
        _mm_loadu_si128(bytes.as_ptr() as *const __m128i)
    }

    #[inline(always)]
    unsafe fn to_array(self) -> [u8; LANES] {
        let mut out = [0u8; LANES];
        _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, self);
        out
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        _mm_loadu_si128(ptr as *const __m128i)
    }

    #[inline(always)]
    unsafe fn load_narrow(ptr: *const u16) -> Self {
        let a = _mm_loadu_si128(ptr as *const __m128i);
        let b = _mm_loadu_si128(ptr.add(8) as *const __m128i);
        _mm_packus_epi16(saturate_to_byte(a), saturate_to_byte(b))
    }

    #[inline(always)]
    unsafe fn load_split(ptr: *const u16) -> (Self, Self) {
        let a = _mm_loadu_si128(ptr as *const __m128i);
        let b = _mm_loadu_si128(ptr.add(8) as *const __m128i);
        let low_byte = _mm_set1_epi16(0x00FF);
        let lo = _mm_packus_epi16(_mm_and_si128(a, low_byte), _mm_and_si128(b, low_byte));
        let hi = _mm_packus_epi16(_mm_srli_epi16(a, 8), _mm_srli_epi16(b, 8));
        (lo, hi)
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        _mm_and_si128(self, other)
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        _mm_or_si128(self, other)
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        _mm_xor_si128(self, other)
    }

    #[inline(always)]
    unsafe fn eq(self, other: Self) -> Self {
        _mm_cmpeq_epi8(self, other)
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        // No 8-bit shift on x86; shift 16-bit lanes and drop the carried bits.
        _mm_and_si128(_mm_srli_epi16(self, 4), _mm_set1_epi8(0x0F))
    }

    #[inline(always)]
    unsafe fn shuffle(self, indices: Self) -> Self {
        _mm_shuffle_epi8(self, indices)
    }

    #[inline(always)]
    unsafe fn movemask(self) -> u32 {
        _mm_movemask_epi8(self) as u32
    }

    #[inline(always)]
    unsafe fn shift_in_one(self, prev: Self) -> Self {
        _mm_alignr_epi8(self, prev, 15)
    }

    #[inline(always)]
    unsafe fn shift_in_two(self, prev: Self) -> Self {
        _mm_alignr_epi8(self, prev, 14)
    }
}
