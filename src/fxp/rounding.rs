// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Rounding engine.
//!
//! Every mode drops the low `n - nfrac` fractional bits and decides whether to
//! add one LSb to what remains. A retained value already at the new maximum
//! overflows instead of rolling over (clamp) or rolls over with an alert (wrap).

use num_traits::Zero;

use crate::config::{Overflow, Rounding};
use crate::error::{FixedPointError, Result};

use super::init::overflow_action;
use super::{mask, maximum_for, pow2, wrap_to, FixedPoint};

impl Rounding {
    /// Leading words of the overflow alert.
    fn overflow_text(self) -> &'static str {
        match self {
            Rounding::Convergent => "Convergent round to",
            Rounding::Nearest => "Rounding to nearest",
            Rounding::Down => "Rounding down to",
            Rounding::In => "Rounding in to",
            Rounding::Out => "Rounding out to",
            Rounding::Up => "Rounding up to",
        }
    }
}

impl FixedPoint {
    /// Shared precondition of every rounding mode.
    fn check_round_target(&self, nfrac: u32) -> Result<()> {
        let lo = u32::from(self.m == 0);
        if self.m + nfrac == 0 || self.n == lo {
            return Err(FixedPointError::InvalidValue(
                "Word size (integer and fractional) must be positive.".into(),
            ));
        }
        if nfrac < lo || nfrac >= self.n {
            return Err(FixedPointError::InvalidValue(format!(
                "Number of fractional bits remaining after round must be in the range [{}, {}).",
                lo, self.n
            )));
        }
        Ok(())
    }

    /// Round to `nfrac` fractional bits with the configured scheme.
    pub fn round(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(self.config.rounding, nfrac)
    }

    /// Round to `nfrac` fractional bits with an explicit scheme.
    pub fn round_with(&mut self, mode: Rounding, nfrac: u32) -> Result<()> {
        self.check_round_target(nfrac)?;

        let dropped = self.n - nfrac;
        let truncated = &self.bits & mask(dropped);
        let half = pow2(dropped - 1);

        let must_round = match mode {
            Rounding::Down => false,
            Rounding::Up => !truncated.is_zero(),
            Rounding::In => self.is_negative() && !truncated.is_zero(),
            Rounding::Out => {
                if truncated == half {
                    self.sign() > 0
                } else {
                    truncated > half
                }
            }
            Rounding::Nearest => truncated >= half,
            Rounding::Convergent => {
                let lsb_int = self.bits.bit(u64::from(dropped));
                truncated.bit(u64::from(dropped - 1)) && (truncated != half || lsb_int)
            }
        };

        let mut bits = &self.bits >> (dropped as usize);
        if must_round {
            // Check for overflow before rounding
            let maximum = maximum_for(self.signed, self.m + nfrac);
            if bits == maximum {
                let qformat = self.qformat();
                let prefix = qformat.split('.').next().unwrap_or_default();
                self.owarn(format!(
                    "{} {}.{} causes overflow.",
                    mode.overflow_text(),
                    prefix,
                    nfrac
                ))?;
                let clamp = self.config.overflow == Overflow::Clamp;
                self.owarn(overflow_action(clamp, false))?;
                if clamp {
                    bits = maximum - 1u8;
                }
            }
            bits += 1u8;
        }

        self.n = nfrac;
        self.bits = wrap_to(&bits, self.width());
        Ok(())
    }

    /// Round half to even.
    pub fn convergent(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(Rounding::Convergent, nfrac)
    }

    /// Round half up.
    pub fn round_nearest(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(Rounding::Nearest, nfrac)
    }

    /// Round toward zero.
    pub fn round_in(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(Rounding::In, nfrac)
    }

    /// Round half away from zero.
    pub fn round_out(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(Rounding::Out, nfrac)
    }

    /// Round toward positive infinity.
    pub fn round_up(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(Rounding::Up, nfrac)
    }

    /// Round toward negative infinity (truncate).
    pub fn round_down(&mut self, nfrac: u32) -> Result<()> {
        self.round_with(Rounding::Down, nfrac)
    }

    /// Rounded copy using the configured scheme.
    pub fn rounded(&self, nfrac: u32) -> Result<FixedPoint> {
        let mut ret = self.duplicate();
        ret.round(nfrac)?;
        Ok(ret)
    }

    /// Copy rounded toward negative infinity, keeping the fractional width.
    pub fn floor(&self) -> FixedPoint {
        let mut ret = self.duplicate();
        if ret.n > 0 {
            ret.bits = &ret.bits & !mask(ret.n) & ret.bitmask();
        }
        ret
    }

    /// Copy rounded toward positive infinity to zero fractional bits.
    pub fn ceil(&self) -> Result<FixedPoint> {
        let mut ret = self.duplicate();
        if ret.n > 0 {
            ret.round_up(0)?;
        }
        Ok(ret)
    }

    /// Copy with every fractional bit dropped. Adds an integer bit if needed.
    pub fn trunc(&self) -> FixedPoint {
        let mut ret = self.duplicate();
        ret.bits = &ret.bits >> (ret.n as usize);
        ret.n = 0;
        ret.m = ret.m.max(1);
        ret
    }

    /// New value with the same bits, format and properties.
    pub(crate) fn duplicate(&self) -> FixedPoint {
        FixedPoint::from_parts(self.bits.clone(), self.signed, self.m, self.n, self.config)
    }
}
