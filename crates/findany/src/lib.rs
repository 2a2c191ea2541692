//! findany - Compiled Multi-Pattern Search over UTF-16 and Bytes
//!
//! findany compiles a set of values once into an immutable matcher that
//! answers "where is the first (or last) occurrence of any of them". The
//! representation is picked at construction from the values themselves, so
//! queries never re-plan.
//!
//! # Quick Start
//!
//! ```rust
//! use findany::{ByteSearchValues, CharSearchValues, MatchMode, StringSearchValues};
//!
//! // Multi-string search, reporting which needle matched
//! let needles = StringSearchValues::new(&["fox", "dog", "the"], MatchMode::CaseSensitive)?;
//! let text: Vec<u16> = "The quick brown fox jumps over the lazy dog".encode_utf16().collect();
//! let m = needles.find(&text).unwrap();
//! assert_eq!((m.needle(), m.start()), (0, 16));
//! assert_eq!(needles.last_index_of_any(&text), Some(40));
//!
//! // Character sets over UTF-16 code units
//! let separators: Vec<u16> = ",;".encode_utf16().collect();
//! let set = CharSearchValues::new(&separators);
//! assert_eq!(set.index_of_any_except(&text), Some(0));
//!
//! // Byte sets
//! let ws = ByteSearchValues::new(b" \t\r\n");
//! assert_eq!(ws.index_of_any(b"key=value pair"), Some(9));
//! # Ok::<(), findany::SearchError>(())
//! ```
//!
//! # Strategies
//!
//! ```text
//! ┌───────────────────────────────┐
//! │  needles / values             │
//! └──────────────┬────────────────┘
//!                ↓ analyzed once
//! ┌───────────────────────────────┐
//! │  char set   bitmap, range,    │
//! │             probabilistic     │
//! │  single     rare anchors      │
//! │  teddy      nibble buckets    │
//! │  fallback   Aho-Corasick      │
//! │             + Rabin-Karp      │
//! └───────────────────────────────┘
//!                ↓ 16 lanes per step
//! ┌───────────────────────────────┐
//! │  SSSE3 / NEON / portable      │
//! └───────────────────────────────┘
//! ```
//!
//! Case-insensitive matching is ordinal: both sides are compared by their
//! simple uppercase mapping, one UTF-16 unit for one unit.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Vector kernels and the structures they scan with
mod bitmap;
mod probabilistic;
mod vector;

// Matchers
mod byte_set;
mod char_set;
mod rabin_karp;
mod single;
mod string_set;
mod teddy;
mod verify;

/// Error types for findany operations
pub mod error;
/// Build options and the fluent builder
pub mod options;

// Re-exports for Rust consumers

/// Byte-set search
pub use crate::byte_set::ByteSearchValues;
/// UTF-16 character-set search
pub use crate::char_set::CharSearchValues;
/// Multi-string search
pub use crate::string_set::{Match, StringSearchValues};

/// Main error type for findany operations
pub use crate::error::{Result, SearchError};
/// Options and builder
pub use crate::options::{SearchOptions, SearchValues, SearchValuesBuilder};

/// Vector instruction set selection
pub use crate::vector::{Isa, FORCE_PORTABLE_ENV};

/// Match mode for text operations (case sensitive/insensitive)
pub use findany_match_mode::{CaseMode, MatchMode};

// Version information
/// Library version string
pub const FINDANY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library major version
pub const FINDANY_VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");

/// Library minor version
pub const FINDANY_VERSION_MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");

/// Library patch version
pub const FINDANY_VERSION_PATCH: &str = env!("CARGO_PKG_VERSION_PATCH");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(FINDANY_VERSION_MAJOR.parse::<u32>().is_ok());
        assert!(FINDANY_VERSION_MINOR.parse::<u32>().is_ok());
        assert!(FINDANY_VERSION_PATCH.parse::<u32>().is_ok());

        let expected = format!(
            "{}.{}.{}",
            FINDANY_VERSION_MAJOR, FINDANY_VERSION_MINOR, FINDANY_VERSION_PATCH
        );
        assert_eq!(FINDANY_VERSION, expected);
    }
}
