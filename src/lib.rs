// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! fixedpoint: arbitrary-width two's-complement Q-format fixed-point numbers.
//!
//! A [`FixedPoint`] is a `Qm.n` (signed) or `UQm.n` (unsigned) word of any
//! width. Values carry their own rounding scheme, overflow scheme and alert
//! levels; binary operations merge the two operands' properties through a
//! [`Resolver`]. Alerts are reported through `tracing` (see [`telemetry`]) or
//! returned as errors, depending on the configured [`Alert`] level.

pub mod alert;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod functions;
pub mod fxp;
pub mod resolve;
pub mod telemetry;

pub use codec::Attributes;
pub use config::{Alert, Config, Options, Overflow, Rounding, StrBase};
pub use context::{Attr, Context, Scope};
pub use error::{FixedPointError, Result};
pub use fxp::{BitField, BitView, FixedPoint, Init, Operand, ResizeOptions};
pub use resolve::{PropertyResolver, Resolver};

#[cfg(test)]
pub mod tests;
