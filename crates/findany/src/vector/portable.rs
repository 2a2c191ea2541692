//! Scalar emulation of [`Vector`], used on targets without a vector
//! implementation and when [`FORCE_PORTABLE_ENV`](super::FORCE_PORTABLE_ENV)
//! is set.

use super::{Vector, LANES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Portable([u8; LANES]);

impl Portable {
    #[inline(always)]
    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        let mut out = [0u8; LANES];
        for (o, &b) in out.iter_mut().zip(self.0.iter()) {
            *o = f(b);
        }
        Portable(out)
    }

    #[inline(always)]
    fn zip(self, other: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = f(self.0[i], other.0[i]);
        }
        Portable(out)
    }
}

impl Vector for Portable {
    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        Portable([byte; LANES])
    }

    #[inline(always)]
    unsafe fn from_array(bytes: [u8; LANES]) -> Self {
        Portable(bytes)
    }

    #[inline(always)]
    unsafe fn to_array(self) -> [u8; LANES] {
        self.0
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Portable((ptr as *const [u8; LANES]).read_unaligned())
    }

    #[inline(always)]
    unsafe fn load_narrow(ptr: *const u16) -> Self {
        let units = (ptr as *const [u16; LANES]).read_unaligned();
        let mut out = [0u8; LANES];
        for (o, &u) in out.iter_mut().zip(units.iter()) {
            *o = u.min(0xFF) as u8;
        }
        Portable(out)
    }

    #[inline(always)]
    unsafe fn load_split(ptr: *const u16) -> (Self, Self) {
        let units = (ptr as *const [u16; LANES]).read_unaligned();
        let mut lo = [0u8; LANES];
        let mut hi = [0u8; LANES];
        for (i, &u) in units.iter().enumerate() {
            lo[i] = u as u8;
            hi[i] = (u >> 8) as u8;
        }
        (Portable(lo), Portable(hi))
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        self.zip(other, |a, b| a & b)
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        self.zip(other, |a, b| a | b)
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        self.zip(other, |a, b| a ^ b)
    }

    #[inline(always)]
    unsafe fn eq(self, other: Self) -> Self {
        self.zip(other, |a, b| if a == b { 0xFF } else { 0 })
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        self.map(|b| b >> 4)
    }

    #[inline(always)]
    unsafe fn shuffle(self, indices: Self) -> Self {
        let table = self.0;
        indices.map(|i| if i & 0x80 != 0 { 0 } else { table[(i & 0x0F) as usize] })
    }

    #[inline(always)]
    unsafe fn movemask(self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |mask, (i, &b)| mask | (u32::from(b >> 7) << i))
    }

    #[inline(always)]
    unsafe fn shift_in_one(self, prev: Self) -> Self {
        let mut out = [0u8; LANES];
        out[0] = prev.0[LANES - 1];
        out[1..].copy_from_slice(&self.0[..LANES - 1]);
        Portable(out)
    }

    #[inline(always)]
    unsafe fn shift_in_two(self, prev: Self) -> Self {
        let mut out = [0u8; LANES];
        out[..2].copy_from_slice(&prev.0[LANES - 2..]);
        out[2..].copy_from_slice(&self.0[..LANES - 2]);
        Portable(out)
    }
}
