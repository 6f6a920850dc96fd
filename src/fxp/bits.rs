// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bit accessor.
//!
//! Single bits are addressed LSb-first. Slices with non-negative bounds and a
//! unit step follow hardware-vector conventions (`hi..lo` descending counts
//! from the LSb, `lo..hi` ascending counts from the MSb, both inclusive); any
//! other slice indexes the zero-padded binary string positionally.

use core::str::FromStr;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{FixedPointError, Result};

use super::mask;

/// Named bit fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitField {
    /// Integer bits (`m` or `int`).
    Int,
    /// Fractional bits (`n` or `frac`).
    Frac,
    /// Sign bit of a signed number (`s` or `sign`).
    Sign,
    Msb,
    Lsb,
}

impl FromStr for BitField {
    type Err = FixedPointError;

    fn from_str(key: &str) -> Result<Self> {
        match key.to_ascii_lowercase().as_str() {
            "m" | "int" => Ok(BitField::Int),
            "n" | "frac" => Ok(BitField::Frac),
            "s" | "sign" => Ok(BitField::Sign),
            "msb" => Ok(BitField::Msb),
            "lsb" => Ok(BitField::Lsb),
            _ => Err(FixedPointError::InvalidKey(format!("Invalid bit specification '{}'.", key))),
        }
    }
}

/// Read-only view over the raw bits of a value.
#[derive(Clone, Copy, Debug)]
pub struct BitView<'a> {
    bits: &'a BigInt,
    signed: bool,
    m: u32,
    n: u32,
}

impl<'a> BitView<'a> {
    pub fn new(bits: &'a BigInt, signed: bool, m: u32, n: u32) -> Self {
        Self { bits, signed, m, n }
    }

    pub fn value(&self) -> &BigInt {
        self.bits
    }

    pub fn width(&self) -> u32 {
        self.m + self.n
    }

    fn qformat(&self) -> String {
        format!("{}Q{}.{}", if self.signed { "" } else { "U" }, self.m, self.n)
    }

    /// Zero-padded binary digits, MSb first.
    pub fn to_binary_string(&self) -> String {
        format!("{:0width$b}", self.bits, width = self.width() as usize)
    }

    /// Single bit. `0` is the LSb; `-i` reads bit `i - 1`.
    pub fn bit(&self, index: i64) -> Result<bool> {
        let width = i64::from(self.width());
        if index < -width || index >= width {
            return Err(FixedPointError::IndexOutOfRange(format!(
                "Bit {} does not exist in {} format.",
                index,
                self.qformat()
            )));
        }
        let position = if index < 0 { -index - 1 } else { index };
        Ok(self.bits.bit(position as u64))
    }

    /// Bit slice as an integer. An empty selection is 0.
    pub fn slice(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<BigInt> {
        let digits = self.to_binary_string();
        let digits = digits.as_bytes();

        let hardware = matches!((start, stop), (Some(a), Some(b)) if a >= 0 && b >= 0)
            && matches!(step, None | Some(1) | Some(-1));

        let selected: Vec<u8> = match (start, stop) {
            (Some(start), Some(stop)) if hardware => {
                let (lo, hi) = (start.min(stop) as usize, start.max(stop) as usize);
                if start < stop || (start == stop && step == Some(1)) {
                    // Ascending: index 0 is the MSb
                    let end = (hi + 1).min(digits.len());
                    digits.get(lo.min(end)..end).unwrap_or_default().to_vec()
                } else if start > stop || (start == stop && step == Some(-1)) {
                    // Descending: index 0 is the LSb
                    let len = digits.len();
                    let lo_pos = len.saturating_sub(hi + 1);
                    let hi_pos = len.saturating_sub(lo);
                    digits.get(lo_pos..hi_pos).unwrap_or_default().to_vec()
                } else {
                    return Err(FixedPointError::IndexOutOfRange(format!(
                        "Step must be 1 or -1 for equivalent start and stop bound {}.",
                        start
                    )));
                }
            }
            _ => {
                let step = step.unwrap_or(1);
                if step == 0 {
                    return Err(FixedPointError::InvalidValue("Slice step cannot be zero.".into()));
                }
                slice_indices(digits.len() as i64, start, stop, step)
                    .into_iter()
                    .map(|i| digits[i])
                    .collect()
            }
        };

        if selected.is_empty() {
            return Ok(BigInt::zero());
        }
        BigInt::parse_bytes(&selected, 2)
            .ok_or_else(|| FixedPointError::InvalidValue("Malformed bit string.".into()))
    }

    /// Named field as binary digits.
    pub fn field_str(&self, key: &str) -> Result<String> {
        let digits = self.to_binary_string();
        let (m, n) = (self.m as usize, self.n as usize);
        let invalid = || {
            FixedPointError::InvalidKey(format!(
                "Invalid bit specification '{}' for {} format.",
                key,
                self.qformat()
            ))
        };

        let field = key.parse::<BitField>().map_err(|_| invalid())?;
        let ret = match field {
            BitField::Int if m > 0 => &digits[..m],
            BitField::Frac if n > 0 => &digits[digits.len() - n..],
            BitField::Sign if self.signed => &digits[..1],
            BitField::Msb => &digits[..1],
            BitField::Lsb => &digits[digits.len() - 1..],
            _ => return Err(invalid()),
        };
        Ok(ret.to_owned())
    }

    /// Named field as an integer.
    pub fn field(&self, key: &str) -> Result<BigInt> {
        let field = key.parse::<BitField>().ok();
        let (m, n) = (self.m, self.n);
        match field {
            Some(BitField::Int) if m > 0 => Ok((self.bits >> n as usize) & mask(m)),
            Some(BitField::Frac) if n > 0 => Ok(self.bits & mask(n)),
            _ => {
                let digits = self.field_str(key)?;
                BigInt::parse_bytes(digits.as_bytes(), 2)
                    .ok_or_else(|| FixedPointError::InvalidValue("Malformed bit string.".into()))
            }
        }
    }
}

/// Positions selected by a `[start:stop:step]` slice over `len` items.
fn slice_indices(len: i64, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<usize> {
    let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
    let clip = |bound: i64| {
        if bound < 0 {
            (bound + len).max(lower)
        } else {
            bound.min(upper)
        }
    };
    let start = start.map_or(if step > 0 { lower } else { upper }, clip);
    let stop = stop.map_or(if step > 0 { upper } else { lower }, clip);

    let mut ret = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        ret.push(i as usize);
        i += step;
    }
    ret
}
