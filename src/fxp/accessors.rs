// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Validated mutators for the Q format and the six properties.

use crate::config::{Alert, Overflow, Rounding, StrBase};
use crate::context::Attr;
use crate::error::{FixedPointError, Result};

use super::init::{extreme_bits, overflow_action};
use super::{mask, FixedPoint};

fn word_size_error() -> FixedPointError {
    FixedPointError::InvalidValue("Word size (integer and fractional) must be positive.".into())
}

impl FixedPoint {
    /// Change signedness, keeping the bit widths.
    ///
    /// A set MSb overflows: leaving signed saturates to the unsigned minimum,
    /// entering signed to the signed maximum (under `clamp`).
    pub fn set_signed(&mut self, signed: bool) -> Result<()> {
        if signed == self.signed {
            return Ok(());
        }
        if signed && self.m == 0 {
            return Err(FixedPointError::Structural(
                "Cannot change sign with 0 integer bits.".into(),
            ));
        }

        let width = self.width();
        if !self.bits.bit(u64::from(width - 1)) {
            self.signed = signed;
            return Ok(());
        }

        // Signed underflows, unsigned overflows
        let to_minimum = self.signed;
        let clamp = self.config.overflow == Overflow::Clamp;
        self.owarn(format!("Changing signedness on {} causes overflow.", self))?;
        self.owarn(overflow_action(clamp, to_minimum))?;

        self.signed = signed;
        if clamp {
            self.bits = extreme_bits(signed, width, to_minimum);
        }
        Ok(())
    }

    /// Set the integer bit width with sign extension or overflow handling.
    pub fn set_m(&mut self, m: u32) -> Result<()> {
        if m < u32::from(self.signed) {
            return Err(FixedPointError::InvalidValue(
                "Number of integer bits must be positive for signed numbers.".into(),
            ));
        }
        if m + self.n == 0 {
            return Err(word_size_error());
        }

        if m > self.m {
            if self.is_negative() {
                let grow = m - self.m;
                self.bits |= mask(grow) << self.width() as usize;
            }
        } else if m < self.m {
            match self.config.overflow {
                Overflow::Clamp => self.clamp(m, None)?,
                Overflow::Wrap => self.wrap(m, None)?,
            }
        }
        self.m = m;
        Ok(())
    }

    /// Set the fractional bit width. Shrinking rounds with the configured scheme.
    pub fn set_n(&mut self, n: u32) -> Result<()> {
        if self.m + n == 0 {
            return Err(word_size_error());
        }

        if n >= self.n {
            self.bits <<= (n - self.n) as usize;
            self.n = n;
            Ok(())
        } else {
            self.round(n)
        }
    }

    pub fn overflow(&self) -> Overflow {
        self.config.overflow
    }

    pub fn set_overflow(&mut self, overflow: Overflow) {
        self.config.overflow = overflow;
    }

    pub fn rounding(&self) -> Rounding {
        self.config.rounding
    }

    pub fn set_rounding(&mut self, rounding: Rounding) {
        self.config.rounding = rounding;
    }

    pub fn str_base(&self) -> StrBase {
        self.config.str_base
    }

    pub fn set_str_base(&mut self, str_base: StrBase) {
        self.config.str_base = str_base;
    }

    pub fn overflow_alert(&self) -> Alert {
        self.config.overflow_alert
    }

    pub fn set_overflow_alert(&mut self, alert: Alert) {
        self.config.overflow_alert = alert;
    }

    pub fn implicit_cast_alert(&self) -> Alert {
        self.config.implicit_cast_alert
    }

    pub fn set_implicit_cast_alert(&mut self, alert: Alert) {
        self.config.implicit_cast_alert = alert;
    }

    pub fn mismatch_alert(&self) -> Alert {
        self.config.mismatch_alert
    }

    pub fn set_mismatch_alert(&mut self, alert: Alert) {
        self.config.mismatch_alert = alert;
    }

    /// Set a property by name, e.g. `("rounding", "up")` or `("m", "4")`.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        Attr::parse(name, value)?.apply(self)
    }
}
