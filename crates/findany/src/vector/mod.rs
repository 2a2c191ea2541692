//! 128-bit vector abstraction shared by every vectorized kernel
//!
//! Kernels are written once, generic over [`Vector`], and instantiated for:
//! - x86_64: SSSE3 (`__m128i`, needs `pshufb` and `palignr`)
//! - aarch64: NEON (`uint8x16_t`, always available)
//! - everything else, or when forced: [`Portable`], a `[u8; 16]` emulation
//!
//! The instruction set is detected once when a matcher is built and stored
//! in it as an [`Isa`]; queries never re-detect.

use std::ffi::OsStr;
use std::fmt;

#[cfg(target_arch = "aarch64")]
mod neon;
mod portable;
#[cfg(target_arch = "x86_64")]
mod x86;

pub(crate) use portable::Portable;

/// Environment variable that forces the portable implementation when set to `1`.
pub const FORCE_PORTABLE_ENV: &str = "FINDANY_FORCE_PORTABLE";

/// Lanes per vector.
pub(crate) const LANES: usize = 16;

/// Vector instruction set a matcher runs its kernels with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Isa {
    /// Scalar emulation of the vector operations
    Portable,
    /// x86_64 SSSE3
    Ssse3,
    /// aarch64 NEON
    Neon,
}

impl Isa {
    /// Best instruction set of the running CPU.
    ///
    /// Honors [`FORCE_PORTABLE_ENV`].
    pub fn detect() -> Isa {
        if force_portable() {
            return Isa::Portable;
        }
        if Isa::Ssse3.is_supported() {
            Isa::Ssse3
        } else if Isa::Neon.is_supported() {
            Isa::Neon
        } else {
            Isa::Portable
        }
    }

    /// Whether the running CPU can execute this instruction set.
    pub fn is_supported(self) -> bool {
        match self {
            Isa::Portable => true,
            #[cfg(target_arch = "x86_64")]
            Isa::Ssse3 => is_x86_feature_detected!("ssse3"),
            #[cfg(target_arch = "aarch64")]
            Isa::Neon => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Lowercase name, as printed in logs.
    pub fn name(self) -> &'static str {
        match self {
            Isa::Portable => "portable",
            Isa::Ssse3 => "ssse3",
            Isa::Neon => "neon",
        }
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn force_portable() -> bool {
    forces_portable(std::env::var_os(FORCE_PORTABLE_ENV).as_deref())
}

fn forces_portable(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| v == "1")
}

/// Operations over 16 byte lanes.
///
/// # Safety
///
/// Every method is `unsafe`: implementations may only be called on a CPU
/// supporting their instruction set, and the load methods read 16 bytes
/// (`load`) or 16 code units (`load_narrow`, `load_split`) from `ptr`.
pub(crate) trait Vector: Copy + fmt::Debug {
    unsafe fn splat(byte: u8) -> Self;

    unsafe fn from_array(bytes: [u8; LANES]) -> Self;

    unsafe fn to_array(self) -> [u8; LANES];

    unsafe fn load(ptr: *const u8) -> Self;

    /// Load 16 code units, saturating each to `0xFF`.
    unsafe fn load_narrow(ptr: *const u16) -> Self;

    /// Load 16 code units as (low bytes, high bytes).
    unsafe fn load_split(ptr: *const u16) -> (Self, Self);

    unsafe fn and(self, other: Self) -> Self;

    unsafe fn or(self, other: Self) -> Self;

    unsafe fn xor(self, other: Self) -> Self;

    /// Lane-wise equality, `0xFF` where equal.
    unsafe fn eq(self, other: Self) -> Self;

    /// Lane-wise `byte >> 4`.
    unsafe fn shr4(self) -> Self;

    /// Table lookup: lane `i` becomes `self[indices[i]]`.
    ///
    /// Indices must be below 16 or have bit 7 set (yielding 0).
    unsafe fn shuffle(self, indices: Self) -> Self;

    /// One bit per lane; lanes must be `0x00` or `0xFF`.
    unsafe fn movemask(self) -> u32;

    /// `[prev[15], self[0..15]]`
    unsafe fn shift_in_one(self, prev: Self) -> Self;

    /// `[prev[14], prev[15], self[0..14]]`
    unsafe fn shift_in_two(self, prev: Self) -> Self;

    /// One bit per non-zero lane.
    #[inline(always)]
    unsafe fn nonzero_mask(self) -> u32 {
        !self.eq(Self::splat(0)).movemask() & 0xFFFF
    }
}

/// Define a public entry point for a kernel generic over [`Vector`].
///
/// The entry takes an [`Isa`] first and calls the kernel instantiated for
/// that instruction set; the SSSE3 instance is compiled inside a
/// `#[target_feature]` wrapper so the intrinsics inline.
macro_rules! vector_kernel {
    ($(
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($($arg:ident : $ty:ty),* $(,)?) -> $ret:ty => $kernel:ident;
    )*) => {$(
        $(#[$meta])*
        $vis fn $name(isa: $crate::vector::Isa, $($arg: $ty),*) -> $ret {
            match isa {
                #[cfg(target_arch = "x86_64")]
                $crate::vector::Isa::Ssse3 => {
                    #[target_feature(enable = "ssse3")]
                    unsafe fn ssse3($($arg: $ty),*) -> $ret {
                        $kernel::<core::arch::x86_64::__m128i>($($arg),*)
                    }
                    // SAFETY: Isa::Ssse3 is only selected after runtime detection.
                    unsafe { ssse3($($arg),*) }
                }
                #[cfg(target_arch = "aarch64")]
                $crate::vector::Isa::Neon => {
                    // SAFETY: NEON is part of the aarch64 baseline.
                    unsafe { $kernel::<core::arch::aarch64::uint8x16_t>($($arg),*) }
                }
                _ => {
                    // SAFETY: the portable implementation has no CPU requirement.
                    unsafe { $kernel::<$crate::vector::Portable>($($arg),*) }
                }
            }
        }
    )*};
}

/// Index of the first set lane over a slice scanned in 16-unit blocks.
///
/// `$mask` computes the lane mask of the block starting at `$at`. The last
/// partial block is re-read overlapping the previous one, with the lanes
/// already examined masked off. Requires a length of at least 16.
macro_rules! first_in_blocks {
    ($len:expr, |$at:ident| $mask:expr) => {{
        let len: usize = $len;
        debug_assert!(len >= $crate::vector::LANES);
        let mut found = None;
        let mut $at = 0usize;
        while $at + $crate::vector::LANES <= len {
            let m: u32 = ($mask) & 0xFFFF;
            if m != 0 {
                found = Some($at + m.trailing_zeros() as usize);
                break;
            }
            $at += $crate::vector::LANES;
        }
        if found.is_none() && $at < len {
            let done = $at;
            let $at = len - $crate::vector::LANES;
            let m: u32 = ($mask) & (0xFFFF << (done - $at)) & 0xFFFF;
            if m != 0 {
                found = Some($at + m.trailing_zeros() as usize);
            }
        }
        found
    }};
}

/// Index of the last set lane, scanning 16-unit blocks from the end.
///
/// Mirror image of [`first_in_blocks`]; the leading partial block is re-read
/// at offset 0 with the lanes past it masked off.
macro_rules! last_in_blocks {
    ($len:expr, |$at:ident| $mask:expr) => {{
        let len: usize = $len;
        debug_assert!(len >= $crate::vector::LANES);
        let mut found = None;
        let mut end = len;
        while end >= $crate::vector::LANES {
            let $at = end - $crate::vector::LANES;
            let m: u32 = ($mask) & 0xFFFF;
            if m != 0 {
                found = Some($at + (31 - m.leading_zeros()) as usize);
                break;
            }
            end = $at;
        }
        if found.is_none() && end > 0 {
            let $at = 0usize;
            let m: u32 = ($mask) & ((1u32 << end) - 1);
            if m != 0 {
                found = Some($at + (31 - m.leading_zeros()) as usize);
            }
        }
        found
    }};
}

pub(crate) use {first_in_blocks, last_in_blocks, vector_kernel};

/// Every ISA the running CPU supports, portable first.
#[cfg(test)]
pub(crate) fn supported_isas() -> Vec<Isa> {
    [Isa::Portable, Isa::Ssse3, Isa::Neon]
        .into_iter()
        .filter(|isa| isa.is_supported())
        .collect()
}
