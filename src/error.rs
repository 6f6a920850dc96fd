// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    /// Invalid bit width, rounding target, property value or literal.
    #[error("{0}")]
    InvalidValue(String),

    /// Unsupported operand or argument (e.g. a non-positive exponent).
    #[error("{0}")]
    InvalidType(String),

    /// Bit index or slice bound outside the word.
    #[error("{0}")]
    IndexOutOfRange(String),

    /// Named bit mask that does not exist for the current Q format.
    #[error("{0}")]
    InvalidKey(String),

    /// Overflow with `overflow_alert` set to `error`.
    #[error("{0}")]
    Overflow(String),

    /// Lossy implicit promotion with `implicit_cast_alert` set to `error`.
    #[error("{0}")]
    ImplicitCast(String),

    /// Property mismatch with `mismatch_alert` set to `error`.
    #[error("{0}")]
    Mismatch(String),

    /// Structural violation, e.g. negating an unsigned number.
    #[error("{0}")]
    Structural(String),

    #[error("{0}")]
    ReadOnly(String),

    #[error("{0}")]
    InvalidAttribute(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FixedPointError {
    /// True for the three data-dependent alert errors.
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            FixedPointError::Overflow(_)
                | FixedPointError::ImplicitCast(_)
                | FixedPointError::Mismatch(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
