//! Ordinal case folding over UTF-16 code units.
//!
//! Folding maps every unit to its ordinal uppercase equivalent using simple
//! (one-to-one) case mappings only. Two rules keep the folded text aligned
//! with the input and keep ASCII separate from the rest of Unicode:
//!
//! - a mapping is only applied when it preserves the UTF-16 length
//!   (BMP stays BMP, supplementary stays supplementary);
//! - ASCII units fold to ASCII, and non-ASCII units never fold to ASCII
//!   (`'ı'` and `'ſ'` do not match `'I'` and `'S'`).
//!
//! Unpaired surrogates fold to themselves.

const SURROGATE_HIGH_START: u16 = 0xD800;
const SURROGATE_LOW_START: u16 = 0xDC00;
const SURROGATE_END: u16 = 0xDFFF;

#[inline(always)]
pub fn is_high_surrogate(unit: u16) -> bool {
    (SURROGATE_HIGH_START..SURROGATE_LOW_START).contains(&unit)
}

#[inline(always)]
pub fn is_low_surrogate(unit: u16) -> bool {
    (SURROGATE_LOW_START..=SURROGATE_END).contains(&unit)
}

/// ASCII-only uppercase; every other unit passes through.
#[inline(always)]
pub fn fold_ascii(unit: u16) -> u16 {
    if unit.wrapping_sub(b'a' as u16) < 26 {
        unit - 0x20
    } else {
        unit
    }
}

/// Simple uppercase of a non-ASCII scalar, restricted to mappings that stay
/// outside ASCII and keep the UTF-16 length.
fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if !u.is_ascii() && u.len_utf16() == c.len_utf16() => u,
        _ => c,
    }
}

/// Whether a scalar takes part in case folding at all.
pub fn has_case_mapping(c: char) -> bool {
    c.to_uppercase().ne(std::iter::once(c)) || c.to_lowercase().ne(std::iter::once(c))
}

/// Fold a single BMP code unit.
///
/// Surrogates are returned unchanged; use [`fold_pair`] for a complete pair.
#[inline]
pub fn fold_unit(unit: u16) -> u16 {
    if unit < 0x80 {
        return fold_ascii(unit);
    }
    if (SURROGATE_HIGH_START..=SURROGATE_END).contains(&unit) {
        return unit;
    }
    match char::from_u32(unit as u32) {
        Some(c) => {
            let upper = simple_upper(c);
            // len_utf16 was checked to be 1, so this never truncates.
            upper as u32 as u16
        }
        None => unit,
    }
}

/// Fold a surrogate pair, returning the folded pair.
///
/// Inputs that are not a well-formed pair are returned unchanged.
pub fn fold_pair(high: u16, low: u16) -> (u16, u16) {
    if !is_high_surrogate(high) || !is_low_surrogate(low) {
        return (high, low);
    }
    let scalar = 0x10000 + (((high - SURROGATE_HIGH_START) as u32) << 10)
        + (low - SURROGATE_LOW_START) as u32;
    let Some(c) = char::from_u32(scalar) else {
        return (high, low);
    };
    let upper = simple_upper(c);
    let mut buf = [0u16; 2];
    match upper.encode_utf16(&mut buf) {
        [h, l] => (*h, *l),
        _ => (high, low),
    }
}

/// Fold `src` into `dst`, surrogate-pair aware.
///
/// Pairs are only folded when both halves lie inside `src`; callers that
/// chunk a larger buffer must not split a pair across chunks. `dst` must be
/// at least as long as `src`.
pub fn fold_into(src: &[u16], dst: &mut [u16]) {
    debug_assert!(dst.len() >= src.len());
    let mut i = 0;
    while i < src.len() {
        let unit = src[i];
        if unit < 0x80 {
            dst[i] = fold_ascii(unit);
            i += 1;
        } else if is_high_surrogate(unit) && i + 1 < src.len() && is_low_surrogate(src[i + 1]) {
            let (h, l) = fold_pair(unit, src[i + 1]);
            dst[i] = h;
            dst[i + 1] = l;
            i += 2;
        } else {
            dst[i] = fold_unit(unit);
            i += 1;
        }
    }
}

/// Fold a whole UTF-16 buffer into a new vector.
pub fn fold_utf16(src: &[u16]) -> Vec<u16> {
    let mut out = vec![0u16; src.len()];
    fold_into(src, &mut out);
    out
}

/// Whether every unit is ASCII.
#[inline]
pub fn is_ascii(units: &[u16]) -> bool {
    units.iter().all(|&u| u < 0x80)
}

/// Every BMP code unit whose ordinal fold equals the fold of `unit`.
///
/// ASCII letters yield both cases; non-ASCII units scan the BMP, which is
/// only done during construction of case-insensitive character sets.
pub fn ordinal_case_class(unit: u16) -> Vec<u16> {
    if unit < 0x80 {
        let upper = fold_ascii(unit);
        if (b'A' as u16..=b'Z' as u16).contains(&upper) {
            return vec![upper, upper | 0x20];
        }
        return vec![unit];
    }
    if (SURROGATE_HIGH_START..=SURROGATE_END).contains(&unit) {
        return vec![unit];
    }
    let target = fold_unit(unit);
    (0x80u16..=0xFFFF)
        .filter(|u| !(SURROGATE_HIGH_START..=SURROGATE_END).contains(u))
        .filter(|&u| fold_unit(u) == target)
        .collect()
}
