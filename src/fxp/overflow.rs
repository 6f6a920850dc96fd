// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Overflow and resizing: clamp, wrap, keep_lsbs, keep_msbs, resize, trim.

use num_traits::Signed;

use crate::config::{Alert, Overflow, Rounding};
use crate::error::{FixedPointError, Result};

use super::init::{extreme_bits, overflow_action};
use super::{mask, signed_view, wrap_to, FixedPoint};

/// Per-call overrides for the resizing methods. `None` keeps the value's own setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResizeOptions {
    pub rounding: Option<Rounding>,
    pub overflow: Option<Overflow>,
    /// Overrides `overflow_alert`.
    pub alert: Option<Alert>,
}

impl ResizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = Some(rounding);
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = Some(overflow);
        self
    }

    pub fn alert(mut self, alert: Alert) -> Self {
        self.alert = Some(alert);
        self
    }
}

impl FixedPoint {
    /// Remove integer bits, saturating if the value changes.
    ///
    /// `alert` overrides `overflow_alert` for this call only.
    pub fn clamp(&mut self, nint: u32, alert: Option<Alert>) -> Result<()> {
        self.drop_integer_bits(nint, alert, Overflow::Clamp)
    }

    /// Remove integer bits by masking them away.
    pub fn wrap(&mut self, nint: u32, alert: Option<Alert>) -> Result<()> {
        self.drop_integer_bits(nint, alert, Overflow::Wrap)
    }

    fn drop_integer_bits(
        &mut self,
        nint: u32,
        alert: Option<Alert>,
        policy: Overflow,
    ) -> Result<()> {
        let lo = u32::from(self.n == 0 || self.signed);
        if nint < lo || nint > self.m {
            return Err(FixedPointError::InvalidValue(format!(
                "{} can only {} between [{}, {}] integer bits.",
                self.qformat(),
                policy,
                lo,
                self.m
            )));
        }

        // Truncate and see if the value survives
        let width = nint + self.n;
        let current = self.signed_integer();
        if signed_view(&self.bits, self.signed, width) != current {
            let minimum = current.is_negative();
            let clamp = policy == Overflow::Clamp;
            let notifier = self.overflow_notifier(alert);
            notifier.notify(format!("Overflow in format {}.", self.qformat()))?;
            notifier.notify(overflow_action(clamp, minimum))?;
            self.bits = if clamp {
                extreme_bits(self.signed, width, minimum)
            } else {
                wrap_to(&self.bits, width)
            };
        } else {
            self.bits = wrap_to(&self.bits, width);
        }

        self.m = nint;
        Ok(())
    }

    fn check_keep_format(&self, m: u32, n: u32) -> Result<()> {
        if self.signed && m == 0 {
            return Err(FixedPointError::InvalidValue(
                "Signed number must have at least 1 integer bit.".into(),
            ));
        }
        let width = self.width();
        if m + n < 2 || m + n >= width {
            return Err(FixedPointError::InvalidValue(format!(
                "Total number of bits must be in the range [2, {}).",
                width
            )));
        }
        Ok(())
    }

    /// Remove MSbs and reformat to `Q{m}.{n}`, keeping the low `m + n` bits.
    ///
    /// The overflow alert (if any) is issued up front with the policy's wording,
    /// then the policy is applied silently.
    pub fn keep_lsbs(&mut self, m: u32, n: u32, options: ResizeOptions) -> Result<()> {
        self.check_keep_format(m, n)?;

        let current = self.signed_integer();
        if signed_view(&self.bits, self.signed, m + n) != current {
            let clamp = options.overflow.unwrap_or(self.config.overflow) == Overflow::Clamp;
            let notifier = self.overflow_notifier(options.alert);
            notifier.notify(format!("Overflow in format {}.", self.qformat()))?;
            notifier.notify(overflow_action(clamp, current.is_negative()))?;
        }

        // Move the binary point but keep the same bits
        self.m = self.width() - n;
        self.n = n;
        match options.overflow.unwrap_or(self.config.overflow) {
            Overflow::Clamp => self.clamp(m, Some(Alert::Ignore)),
            Overflow::Wrap => self.wrap(m, Some(Alert::Ignore)),
        }
    }

    /// Remove LSbs by rounding and reformat to `Q{m}.{n}`, keeping the high `m + n` bits.
    pub fn keep_msbs(&mut self, m: u32, n: u32, options: ResizeOptions) -> Result<()> {
        self.check_keep_format(m, n)?;

        let (overflow, alert) = (self.config.overflow, self.config.overflow_alert);
        let rounding = options.rounding.unwrap_or(self.config.rounding);
        self.configure()
            .safe_retain(true)
            .overflow(options.overflow.unwrap_or(overflow))
            .overflow_alert(options.alert.unwrap_or(alert))
            .run(|fp| {
                // Move the binary point but keep the same bits
                fp.n = fp.width() - m;
                fp.m = m;
                fp.round_with(rounding, n)
            })?;

        self.config.overflow = overflow;
        self.config.overflow_alert = alert;
        Ok(())
    }

    /// Resize to `Q{m}.{n}` with the configured rounding and overflow handling.
    pub fn resize(&mut self, m: u32, n: u32) -> Result<()> {
        self.resize_with(m, n, ResizeOptions::default())
    }

    /// Resize to `Q{m}.{n}` with sign extension, rounding and overflow handling.
    ///
    /// On error the value is left exactly as it was.
    pub fn resize_with(&mut self, m: u32, n: u32, options: ResizeOptions) -> Result<()> {
        let old = self.config;
        self.configure()
            .safe_retain(true)
            .overflow(options.overflow.unwrap_or(old.overflow))
            .rounding(options.rounding.unwrap_or(old.rounding))
            .overflow_alert(options.alert.unwrap_or(old.overflow_alert))
            .run(|fp| {
                fp.set_n(n)?;
                fp.set_m(m)
            })?;

        self.config.overflow = old.overflow;
        self.config.rounding = old.rounding;
        self.config.overflow_alert = old.overflow_alert;
        Ok(())
    }

    /// Strip insignificant bits: trailing fractional zeros, and leading zeros
    /// (or all but one leading one for negative values).
    ///
    /// With neither flag given both kinds are trimmed.
    pub fn trim(&mut self, ints: Option<bool>, fracs: Option<bool>) {
        let (ints, fracs) = match (ints, fracs) {
            (None, None) => (true, true),
            (ints, fracs) => (ints.unwrap_or(false), fracs.unwrap_or(false)),
        };

        let (signed, m, n) = (self.signed, self.m, self.n);
        let mut new_n = n;
        if fracs {
            let frac_bits = &self.bits & mask(n);
            new_n = frac_bits.trailing_zeros().map_or(0, |zeros| n - zeros as u32);
        }

        let mut new_m = m;
        if ints {
            let int_bits = (&self.bits >> n as usize) & mask(m);
            if self.is_negative() {
                // Keep a single leading one
                new_m = 1 + (mask(m) ^ int_bits).bits() as u32;
            } else if m > 0 {
                let floor = u32::from(signed || new_n == 0);
                new_m = floor.max(u32::from(signed) + int_bits.bits() as u32);
            }
        }

        self.log(format_args!(
            "INTS: {} FRACS: {} Trimming {} fractional bits Trimming {} integer bits",
            ints,
            fracs,
            n - new_n,
            i64::from(m) - i64::from(new_m)
        ));

        let bits = &self.bits >> (n - new_n) as usize;
        self.n = new_n;
        self.m = if new_m == 0 { u32::from(new_n == 0) } else { new_m };
        self.bits = wrap_to(&bits, self.width());
    }
}
