//! Build options and the fluent builder
//!
//! ```
//! use findany::SearchValues;
//!
//! let needles = SearchValues::builder()
//!     .ignore_case(true)
//!     .build_strings(&["error", "warning"])?;
//!
//! let haystack: Vec<u16> = "No WARNINGS here".encode_utf16().collect();
//! assert_eq!(needles.index_of_any(&haystack), Some(3));
//! # Ok::<(), findany::SearchError>(())
//! ```

use findany_match_mode::MatchMode;

use crate::byte_set::ByteSearchValues;
use crate::char_set::{expand_case_classes, CharSearchValues};
use crate::error::{Result, SearchError};
use crate::string_set::StringSearchValues;
use crate::vector::Isa;

/// Options for building search values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Match needles ordinal-ignore-case
    pub ignore_case: bool,

    /// Force a vector instruction set (None = detect the best one)
    pub isa: Option<Isa>,

    /// Reject string needles containing an unpaired surrogate
    pub strict_utf16: bool,
}

impl SearchOptions {
    pub(crate) fn match_mode(&self) -> MatchMode {
        MatchMode::from_ignore_case(self.ignore_case)
    }

    /// The instruction set matchers built with these options run on.
    pub(crate) fn resolve_isa(&self) -> Result<Isa> {
        match self.isa {
            None => Ok(Isa::detect()),
            Some(isa) if isa.is_supported() => Ok(isa),
            Some(isa) => Err(SearchError::UnsupportedIsa(isa)),
        }
    }
}

/// Entry point for the fluent builder
///
/// See [`SearchValuesBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct SearchValues;

impl SearchValues {
    /// Start configuring a matcher
    pub fn builder() -> SearchValuesBuilder {
        SearchValuesBuilder::default()
    }
}

/// Builder for search values with custom configuration
///
/// Created via [`SearchValues::builder`]. Configure with the fluent methods,
/// then finish with one of the `build_*` methods.
///
/// # Examples
///
/// ```
/// use findany::{Isa, SearchValues};
///
/// let digits = SearchValues::builder()
///     .isa(Isa::Portable)
///     .build_bytes(b"0123456789")?;
/// assert_eq!(digits.index_of_any(b"abc 42"), Some(4));
/// # Ok::<(), findany::SearchError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchValuesBuilder {
    options: SearchOptions,
}

impl SearchValuesBuilder {
    /// Builder starting from existing options
    pub fn with_options(options: SearchOptions) -> Self {
        Self { options }
    }

    /// Match ordinal-ignore-case
    ///
    /// Default: false
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.options.ignore_case = ignore_case;
        self
    }

    /// Run the vector kernels with `isa` instead of the detected one
    ///
    /// Building fails with [`SearchError::UnsupportedIsa`] when the CPU
    /// lacks it. [`Isa::Portable`] is always available.
    pub fn isa(mut self, isa: Isa) -> Self {
        self.options.isa = Some(isa);
        self
    }

    /// Reject string needles with unpaired surrogates
    ///
    /// Default: false (lone surrogates match themselves)
    pub fn strict_utf16(mut self, strict: bool) -> Self {
        self.options.strict_utf16 = strict;
        self
    }

    /// The options configured so far
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Build a multi-string matcher from Rust strings
    pub fn build_strings<S: AsRef<str>>(self, needles: &[S]) -> Result<StringSearchValues> {
        let needles: Vec<Vec<u16>> = needles
            .iter()
            .map(|n| n.as_ref().encode_utf16().collect())
            .collect();
        StringSearchValues::with_options(&needles, &self.options)
    }

    /// Build a multi-string matcher from UTF-16 needles
    pub fn build_utf16<N: AsRef<[u16]>>(self, needles: &[N]) -> Result<StringSearchValues> {
        StringSearchValues::with_options(needles, &self.options)
    }

    /// Build a character set
    ///
    /// With `ignore_case`, every value is expanded to its ordinal case class.
    pub fn build_chars(self, values: &[u16]) -> Result<CharSearchValues> {
        let isa = self.options.resolve_isa()?;
        if self.options.ignore_case {
            Ok(CharSearchValues::with_isa(&expand_case_classes(values), isa))
        } else {
            Ok(CharSearchValues::with_isa(values, isa))
        }
    }

    /// Build a byte set
    ///
    /// With `ignore_case`, ASCII letters match in both cases.
    pub fn build_bytes(self, values: &[u8]) -> Result<ByteSearchValues> {
        let isa = self.options.resolve_isa()?;
        if self.options.ignore_case {
            let expanded: Vec<u8> = values
                .iter()
                .flat_map(|&b| [b.to_ascii_lowercase(), b.to_ascii_uppercase()])
                .collect();
            Ok(ByteSearchValues::with_isa(&expanded, isa))
        } else {
            Ok(ByteSearchValues::with_isa(values, isa))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SearchOptions::default();
        assert!(!options.ignore_case);
        assert!(!options.strict_utf16);
        assert_eq!(options.isa, None);
        assert_eq!(options.match_mode(), MatchMode::CaseSensitive);
        assert!(options.resolve_isa().unwrap().is_supported());
    }

    #[test]
    fn test_fluent_builder() {
        let builder = SearchValues::builder()
            .ignore_case(true)
            .strict_utf16(true)
            .isa(Isa::Portable);
        assert_eq!(
            builder.options(),
            &SearchOptions {
                ignore_case: true,
                isa: Some(Isa::Portable),
                strict_utf16: true,
            }
        );
    }

    #[test]
    fn test_unsupported_isa() {
        let unsupported = [Isa::Ssse3, Isa::Neon]
            .into_iter()
            .find(|isa| !isa.is_supported());
        if let Some(isa) = unsupported {
            let err = SearchValues::builder().isa(isa).build_bytes(b"ab").unwrap_err();
            assert!(matches!(err, SearchError::UnsupportedIsa(i) if i == isa));
        }
    }

    #[test]
    fn test_build_chars_ignore_case() {
        let set = SearchValues::builder()
            .ignore_case(true)
            .build_chars(&[b'q' as u16])
            .unwrap();
        assert_eq!(set.values(), &[b'Q' as u16, b'q' as u16]);
    }

    #[test]
    fn test_build_bytes_ignore_case() {
        let set = SearchValues::builder().ignore_case(true).build_bytes(b"x").unwrap();
        assert_eq!(set.index_of_any(b"abcX"), Some(3));
    }
}
