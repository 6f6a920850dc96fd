// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod capture;

pub mod alert_tests;
pub mod format_tests;
pub mod functions_tests;
pub mod init_tests;

use crate::{FixedPoint, Options};

/// Exactly representable `value` in a fixed format.
pub fn q(value: f64, signed: bool, m: u32, n: u32) -> FixedPoint {
    FixedPoint::new(value, Options::new().format(signed, m, n)).unwrap()
}

/// Raw bit literal in a fixed format.
pub fn lit(bits: &str, signed: bool, m: u32, n: u32) -> FixedPoint {
    FixedPoint::new(bits, Options::new().format(signed, m, n)).unwrap()
}
