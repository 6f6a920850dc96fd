// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Free-function forms of the sizing operations.
//!
//! Each one copies its argument (fresh serial), applies the in-place method
//! to the copy and returns it; the argument is never modified.

use crate::config::Alert;
use crate::error::Result;
use crate::fxp::{FixedPoint, ResizeOptions};

fn on_copy(x: &FixedPoint, f: impl FnOnce(&mut FixedPoint) -> Result<()>) -> Result<FixedPoint> {
    let mut ret = x.clone();
    f(&mut ret)?;
    Ok(ret)
}

pub fn resize(x: &FixedPoint, m: u32, n: u32, options: ResizeOptions) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.resize_with(m, n, options))
}

pub fn trim(x: &FixedPoint, ints: Option<bool>, fracs: Option<bool>) -> FixedPoint {
    let mut ret = x.clone();
    ret.trim(ints, fracs);
    ret
}

pub fn convergent(x: &FixedPoint, n: u32) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.convergent(n))
}

pub fn round_nearest(x: &FixedPoint, n: u32) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.round_nearest(n))
}

pub fn round_in(x: &FixedPoint, n: u32) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.round_in(n))
}

pub fn round_out(x: &FixedPoint, n: u32) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.round_out(n))
}

pub fn round_up(x: &FixedPoint, n: u32) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.round_up(n))
}

pub fn round_down(x: &FixedPoint, n: u32) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.round_down(n))
}

pub fn keep_msbs(x: &FixedPoint, m: u32, n: u32, options: ResizeOptions) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.keep_msbs(m, n, options))
}

pub fn clamp(x: &FixedPoint, m: u32, alert: Option<Alert>) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.clamp(m, alert))
}

pub fn wrap(x: &FixedPoint, m: u32, alert: Option<Alert>) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.wrap(m, alert))
}

pub fn keep_lsbs(x: &FixedPoint, m: u32, n: u32, options: ResizeOptions) -> Result<FixedPoint> {
    on_copy(x, |fp| fp.keep_lsbs(m, n, options))
}
