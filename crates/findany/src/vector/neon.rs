//! NEON implementation of [`Vector`].

use core::arch::aarch64::*;

use super::{Vector, LANES};

static LANE_BITS: [u8; LANES] = [1, 2, 4, 8, 16, 32, 64, 128, 1, 2, 4, 8, 16, 32, 64, 128];

impl Vector for uint8x16_t {
    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        vdupq_n_u8(byte)
    }

    #[inline(always)]
    unsafe fn from_array(bytes: [u8; LANES]) -> Self {
        vld1q_u8(bytes.as_ptr())
    }

    #[inline(always)]
    unsafe fn to_array(self) -> [u8; LANES] {
        let mut out = [0u8; LANES];
        vst1q_u8(out.as_mut_ptr(), self);
        out
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        vld1q_u8(ptr)
    }

    #[inline(always)]
    unsafe fn load_narrow(ptr: *const u16) -> Self {
        let a = vld1q_u16(ptr);
        let b = vld1q_u16(ptr.add(8));
        vcombine_u8(vqmovn_u16(a), vqmovn_u16(b))
    }

    #[inline(always)]
    unsafe fn load_split(ptr: *const u16) -> (Self, Self) {
        let a = vld1q_u16(ptr);
        let b = vld1q_u16(ptr.add(8));
        let lo = vcombine_u8(vmovn_u16(a), vmovn_u16(b));
        let hi = vcombine_u8(vshrn_n_u16::<8>(a), vshrn_n_u16::<8>(b));
        (lo, hi)
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        vandq_u8(self, other)
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        vorrq_u8(self, other)
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        veorq_u8(self, other)
    }

    #[inline(always)]
    unsafe fn eq(self, other: Self) -> Self {
        vceqq_u8(self, other)
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        vshrq_n_u8::<4>(self)
    }

    #[inline(always)]
    unsafe fn shuffle(self, indices: Self) -> Self {
        // Out-of-range indices (>= 16) yield 0, matching pshufb for bit 7.
        vqtbl1q_u8(self, indices)
    }

    #[inline(always)]
    unsafe fn movemask(self) -> u32 {
        let bits = vandq_u8(self, vld1q_u8(LANE_BITS.as_ptr()));
        let lo = vaddv_u8(vget_low_u8(bits)) as u32;
        let hi = vaddv_u8(vget_high_u8(bits)) as u32;
        lo | (hi << 8)
    }

    #[inline(always)]
    unsafe fn shift_in_one(self, prev: Self) -> Self {
        vextq_u8::<15>(prev, self)
    }

    #[inline(always)]
    unsafe fn shift_in_two(self, prev: Self) -> Self {
        vextq_u8::<14>(prev, self)
    }
}
