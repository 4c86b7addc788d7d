//! Error types for scope and name resolution
//!
//! Every failure here aborts the current compilation unit. They fall into two
//! categories:
//! - configuration errors: the caller asked for something the symbol table cannot
//!   provide (a local name for a module root, a scope nothing knows how to build)
//! - consistency failures: an internal bookkeeping invariant does not hold, which
//!   points at a defect upstream rather than in user code

use std::fmt;

use lodestar_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NamingError {
    #[error("Can't generate name for root declaration: {declaration}")]
    MissingNameSuggestion { declaration: String },

    #[error("No rule applicable to {key}")]
    NoApplicableRule { key: String },

    #[error("Inconsistent naming state: {0}")]
    Consistency(String),

    #[error("Closure of {declaration} read before it was recorded")]
    ClosureNotRecorded { declaration: String },

    #[error("Closure of {declaration} is already recorded")]
    ClosureAlreadyRecorded { declaration: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Which class of failure an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request cannot be satisfied by the resolved symbol table
    Configuration,
    /// An invariant of the naming state was violated
    Consistency,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
            ErrorCategory::Consistency => write!(f, "CONSISTENCY"),
        }
    }
}

impl NamingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NamingError::MissingNameSuggestion { .. }
            | NamingError::NoApplicableRule { .. }
            | NamingError::Core(_) => ErrorCategory::Configuration,
            NamingError::Consistency(_)
            | NamingError::ClosureNotRecorded { .. }
            | NamingError::ClosureAlreadyRecorded { .. } => ErrorCategory::Consistency,
        }
    }

    pub fn is_consistency_failure(&self) -> bool {
        self.category() == ErrorCategory::Consistency
    }
}
