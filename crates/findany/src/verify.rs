//! Candidate verification shared by the string matchers.

use findany_match_mode::{
    fold_ascii, fold_pair, fold_unit, fold_utf16, is_high_surrogate, is_low_surrogate, CaseMode,
};

/// Fold a needle the way every matcher stores it for `mode`.
pub(crate) fn fold_needle(needle: &[u16], mode: CaseMode) -> Vec<u16> {
    match mode {
        CaseMode::CaseSensitive => needle.to_vec(),
        CaseMode::CaseInsensitiveUnicode => fold_utf16(needle),
        _ => needle.iter().map(|&u| fold_ascii(u)).collect(),
    }
}

/// Ordinal fold of `haystack[pos]` as if the whole haystack had been folded:
/// a surrogate half is folded together with its partner.
#[inline]
pub(crate) fn fold_at(haystack: &[u16], pos: usize) -> u16 {
    let unit = haystack[pos];
    if is_high_surrogate(unit) {
        if let Some(&low) = haystack.get(pos + 1) {
            if is_low_surrogate(low) {
                return fold_pair(unit, low).0;
            }
        }
        unit
    } else if is_low_surrogate(unit) {
        if pos > 0 && is_high_surrogate(haystack[pos - 1]) {
            return fold_pair(haystack[pos - 1], unit).1;
        }
        unit
    } else {
        fold_unit(unit)
    }
}

/// Whether `needle`, folded for `mode`, occurs in `haystack` at `start`.
#[inline]
pub(crate) fn starts_with(haystack: &[u16], start: usize, needle: &[u16], mode: CaseMode) -> bool {
    let Some(window) = haystack.get(start..start + needle.len()) else {
        return false;
    };
    match mode {
        CaseMode::CaseSensitive => window == needle,
        CaseMode::CaseInsensitiveUnicode => needle
            .iter()
            .enumerate()
            .all(|(k, &n)| fold_at(haystack, start + k) == n),
        _ => window.iter().zip(needle).all(|(&h, &n)| mode.unit_eq(h, n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_starts_with_modes() {
        let hay = utf16("xHeLLo");
        let needle = fold_needle(&utf16("hello"), CaseMode::CaseInsensitiveAsciiLettersOnly);
        assert!(starts_with(&hay, 1, &needle, CaseMode::CaseInsensitiveAsciiLettersOnly));
        assert!(!starts_with(&hay, 1, &utf16("hello"), CaseMode::CaseSensitive));
        assert!(!starts_with(&hay, 2, &needle, CaseMode::CaseInsensitiveAsciiLettersOnly));
    }

    #[test]
    fn test_starts_with_out_of_bounds() {
        let hay = utf16("abc");
        assert!(!starts_with(&hay, 2, &utf16("cd"), CaseMode::CaseSensitive));
        assert!(!starts_with(&hay, 5, &utf16("c"), CaseMode::CaseSensitive));
        assert!(starts_with(&hay, 3, &[], CaseMode::CaseSensitive));
    }

    #[test]
    fn test_unicode_pairs() {
        let hay = utf16("a\u{10428}b");
        let needle = fold_needle(&utf16("\u{10400}B"), CaseMode::CaseInsensitiveUnicode);
        assert!(starts_with(&hay, 1, &needle, CaseMode::CaseInsensitiveUnicode));
        // Low half alone folds as part of its pair.
        assert_eq!(fold_at(&hay, 2), utf16("\u{10400}")[1]);
    }

    #[test]
    fn test_punctuation_not_folded() {
        let mode = CaseMode::CaseInsensitiveAscii;
        let needle = fold_needle(&utf16("a-b"), mode);
        assert!(starts_with(&utf16("A-B"), 0, &needle, mode));
        assert!(!starts_with(&utf16("A\rB"), 0, &needle, mode));
    }
}
