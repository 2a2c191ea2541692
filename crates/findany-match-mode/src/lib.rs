//! Match mode configuration for text matching operations.
//!
//! This crate provides the `MatchMode` enum which controls case-sensitivity
//! requested by callers, the `CaseMode` enum describing how the findany
//! matchers actually compare code units once the needle alphabet is known,
//! and the ordinal case folding primitives both of them rely on.

pub mod fold;

pub use fold::{
    fold_ascii, fold_into, fold_pair, fold_unit, fold_utf16, has_case_mapping, is_ascii,
    is_high_surrogate, is_low_surrogate, ordinal_case_class,
};

/// Match mode for text matching operations.
///
/// Controls whether text comparisons are case-sensitive or case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchMode {
    /// Case-sensitive matching - "abc" matches "abc" but not "ABC"
    #[default]
    CaseSensitive,
    /// Case-insensitive matching - "abc" matches "ABC", "Abc", etc.
    CaseInsensitive,
}

impl MatchMode {
    /// Build a mode from an `ignore_case` flag.
    pub fn from_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            MatchMode::CaseInsensitive
        } else {
            MatchMode::CaseSensitive
        }
    }

    /// Whether this mode ignores case.
    pub fn ignores_case(self) -> bool {
        self == MatchMode::CaseInsensitive
    }
}

/// Comparison mode selected once from the needle alphabet.
///
/// Narrower modes are cheaper and are preferred whenever they are correct:
///
/// - **CaseSensitive**: plain ordinal equality.
/// - **CaseInsensitiveAsciiLettersOnly**: every needle unit is an ASCII
///   letter, so a haystack unit matches when `unit & !0x20` equals the
///   uppercase needle unit.
/// - **CaseInsensitiveAscii**: needles mix ASCII letters with units that have
///   no case mapping; only ASCII letters are folded.
/// - **CaseInsensitiveUnicode**: some needle unit outside ASCII has a case
///   mapping; haystack units are folded with [`fold_unit`] / [`fold_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseMode {
    /// Ordinal comparison
    CaseSensitive,
    /// Needles only contain ASCII letters
    CaseInsensitiveAsciiLettersOnly,
    /// Needles contain no non-ASCII unit that takes part in case folding
    CaseInsensitiveAscii,
    /// Needles need full ordinal-ignore-case folding
    CaseInsensitiveUnicode,
}

impl CaseMode {
    /// Pick the narrowest correct mode for a set of needles.
    ///
    /// The needles may be given folded or unfolded; only their alphabet
    /// matters.
    pub fn analyze<'a, I>(needles: I, mode: MatchMode) -> CaseMode
    where
        I: IntoIterator<Item = &'a [u16]>,
    {
        if mode == MatchMode::CaseSensitive {
            return CaseMode::CaseSensitive;
        }

        let mut letters_only = true;
        for needle in needles {
            for ch in char::decode_utf16(needle.iter().copied()) {
                match ch {
                    Ok(c) if c.is_ascii() => {
                        if !c.is_ascii_alphabetic() {
                            letters_only = false;
                        }
                    }
                    Ok(c) => {
                        letters_only = false;
                        if has_case_mapping(c) {
                            return CaseMode::CaseInsensitiveUnicode;
                        }
                    }
                    // Lone surrogates never take part in folding.
                    Err(_) => letters_only = false,
                }
            }
        }

        if letters_only {
            CaseMode::CaseInsensitiveAsciiLettersOnly
        } else {
            CaseMode::CaseInsensitiveAscii
        }
    }

    /// Whether any folding happens at all.
    pub fn ignores_case(self) -> bool {
        self != CaseMode::CaseSensitive
    }

    /// Compare one haystack unit against one folded needle unit.
    ///
    /// Only valid for the non-Unicode modes; Unicode folding is pair-aware and
    /// has to go through [`fold_into`].
    #[inline(always)]
    pub fn unit_eq(self, haystack_unit: u16, folded_needle_unit: u16) -> bool {
        match self {
            CaseMode::CaseSensitive => haystack_unit == folded_needle_unit,
            CaseMode::CaseInsensitiveAsciiLettersOnly => {
                haystack_unit & !0x20 == folded_needle_unit
            }
            CaseMode::CaseInsensitiveAscii | CaseMode::CaseInsensitiveUnicode => {
                fold::fold_ascii(haystack_unit) == folded_needle_unit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_case_sensitive_short_circuits() {
        let needles = [utf16("Straße")];
        let mode = CaseMode::analyze(needles.iter().map(|n| n.as_slice()), MatchMode::CaseSensitive);
        assert_eq!(mode, CaseMode::CaseSensitive);
    }

    #[test]
    fn test_letters_only() {
        let needles = [utf16("Hello"), utf16("world")];
        let mode =
            CaseMode::analyze(needles.iter().map(|n| n.as_slice()), MatchMode::CaseInsensitive);
        assert_eq!(mode, CaseMode::CaseInsensitiveAsciiLettersOnly);
    }

    #[test]
    fn test_ascii_with_punctuation() {
        let needles = [utf16("foo.bar"), utf16("1234")];
        let mode =
            CaseMode::analyze(needles.iter().map(|n| n.as_slice()), MatchMode::CaseInsensitive);
        assert_eq!(mode, CaseMode::CaseInsensitiveAscii);
    }

    #[test]
    fn test_uncased_non_ascii_stays_ascii() {
        let needles = [utf16("price €"), utf16("日本")];
        let mode =
            CaseMode::analyze(needles.iter().map(|n| n.as_slice()), MatchMode::CaseInsensitive);
        assert_eq!(mode, CaseMode::CaseInsensitiveAscii);
    }

    #[test]
    fn test_cased_non_ascii_is_unicode() {
        let needles = [utf16("abc"), utf16("Émile")];
        let mode =
            CaseMode::analyze(needles.iter().map(|n| n.as_slice()), MatchMode::CaseInsensitive);
        assert_eq!(mode, CaseMode::CaseInsensitiveUnicode);
    }

    #[test]
    fn test_unit_eq_letters_only() {
        let mode = CaseMode::CaseInsensitiveAsciiLettersOnly;
        assert!(mode.unit_eq(b'a' as u16, b'A' as u16));
        assert!(mode.unit_eq(b'A' as u16, b'A' as u16));
        assert!(!mode.unit_eq(0x0161, b'A' as u16));
    }

    #[test]
    fn test_match_mode_flag() {
        assert!(MatchMode::from_ignore_case(true).ignores_case());
        assert!(!MatchMode::from_ignore_case(false).ignores_case());
    }
}
