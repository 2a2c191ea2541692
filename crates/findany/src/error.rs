//! Error types for findany
//!
//! Only construction can fail. Queries on a built matcher are infallible,
//! and a needle set that no specialized algorithm accepts still builds: the
//! dispatcher falls back to Aho-Corasick rather than reporting an error.

use thiserror::Error;

use crate::vector::Isa;

/// Main error type for building search values
#[derive(Error, Debug)]
pub enum SearchError {
    /// A needle was rejected under the active options
    #[error("invalid needle {index}: {reason}")]
    InvalidNeedle {
        /// Position of the needle in the input slice
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// A forced instruction set is not available on this CPU
    #[error("instruction set {0} is not supported by this CPU")]
    UnsupportedIsa(Isa),

    /// Error from the Aho-Corasick builder
    #[error(transparent)]
    Automaton(#[from] findany_ac::ACError),
}

/// Result type alias for findany operations
pub type Result<T> = std::result::Result<T, SearchError>;

// Re-export the automaton error for callers matching on it
pub use findany_ac::ACError;
