// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Construction and width deduction.

use num_bigint::{BigInt, Sign};
use num_traits::{Float, FromPrimitive, Signed, Zero};

use crate::config::{Options, Overflow, MAX_EXPONENT};
use crate::error::{FixedPointError, Result};

use super::{mask, maximum_for, minimum_for, pow2, wrap_to, FixedPoint};

/// Initial value of a [`FixedPoint`].
#[derive(Clone, Debug)]
pub enum Init<'a> {
    /// Integer literal (`0b`, `0o`, `0x` or decimal). Needs a fully constrained format.
    Str(String),
    Int(BigInt),
    Float(f64),
    /// Copy of another value; options are ignored.
    Copy(&'a FixedPoint),
}

impl From<&str> for Init<'_> {
    fn from(s: &str) -> Self {
        Init::Str(s.to_owned())
    }
}

impl From<String> for Init<'_> {
    fn from(s: String) -> Self {
        Init::Str(s)
    }
}

impl From<BigInt> for Init<'_> {
    fn from(v: BigInt) -> Self {
        Init::Int(v)
    }
}

impl From<f64> for Init<'_> {
    fn from(v: f64) -> Self {
        Init::Float(v)
    }
}

impl From<f32> for Init<'_> {
    fn from(v: f32) -> Self {
        Init::Float(f64::from(v))
    }
}

impl<'a> From<&'a FixedPoint> for Init<'a> {
    fn from(fp: &'a FixedPoint) -> Self {
        Init::Copy(fp)
    }
}

macro_rules! int_init {
    ($($t:ty),+) => {
        $(impl From<$t> for Init<'_> {
            fn from(v: $t) -> Self {
                Init::Int(BigInt::from(v))
            }
        })+
    };
}

int_init!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Exact `|val| * 2^n` split into the integer part and the discarded remainder.
struct Scaled {
    negative: bool,
    /// `trunc(val * 2^n)`, signed.
    truncated: BigInt,
    /// Remainder relative to one half: `None` when exact.
    remainder: Option<core::cmp::Ordering>,
}

impl Scaled {
    fn new(val: f64, n: u32) -> Self {
        let (mantissa, exponent, _) = val.integer_decode();
        let negative = val < 0.0;
        let mantissa = BigInt::from(mantissa);
        let shift = i64::from(exponent) + i64::from(n);

        let (magnitude, remainder) = if shift >= 0 {
            (mantissa << (shift as usize), None)
        } else {
            let k = (-shift) as usize;
            let magnitude = &mantissa >> k;
            let rest = mantissa - (&magnitude << k);
            if rest.is_zero() {
                (magnitude, None)
            } else {
                let half = BigInt::from(1u8) << (k - 1);
                (magnitude, Some(rest.cmp(&half)))
            }
        };

        Self {
            negative,
            truncated: if negative { -magnitude } else { magnitude },
            remainder,
        }
    }
}

impl FixedPoint {
    /// Build a value from `init`, deducing any format part `options` leaves open.
    pub fn new<'a>(init: impl Into<Init<'a>>, options: Options) -> Result<Self> {
        match init.into() {
            Init::Copy(fp) => Ok(fp.clone()),
            init => Self::build(init, options, false),
        }
    }

    /// Shorthand for a fully constrained Q format with default properties.
    pub fn with_format<'a>(
        init: impl Into<Init<'a>>,
        signed: bool,
        m: u32,
        n: u32,
    ) -> Result<Self> {
        Self::new(init, Options::new().format(signed, m, n))
    }

    /// Construction shared by [`FixedPoint::new`] and operand promotion.
    ///
    /// `trim_fracs` forces fractional trimming even when `n` was given.
    pub(crate) fn build(init: Init<'_>, options: Options, trim_fracs: bool) -> Result<Self> {
        // 1. Type validation
        let negative = match &init {
            Init::Str(_) => {
                if options.signed.is_none() || options.m.is_none() || options.n.is_none() {
                    return Err(FixedPointError::InvalidValue(
                        "String literal initialization Q format must be fully constrained.".into(),
                    ));
                }
                false
            }
            Init::Int(v) => v.is_negative(),
            Init::Float(v) => {
                if !v.is_finite() {
                    return Err(FixedPointError::InvalidValue(format!(
                        "Cannot initialize from non-finite value {}.",
                        v
                    )));
                }
                *v < 0.0
            }
            Init::Copy(fp) => return Ok((*fp).clone()),
        };

        // 2. Qualify the Q format
        let signed = options.signed.unwrap_or(negative);
        let serial = super::next_serial();

        let trim_n = options.n.is_none();
        let n = match options.n {
            Some(n) => n,
            None => {
                let n = match &init {
                    Init::Float(v) => Self::min_n(*v),
                    _ => 0,
                };
                crate::alert::log(serial, format_args!("Deduced fractional length: {}", n));
                n
            }
        };

        let trim_m = options.m.is_none();
        let m = match options.m {
            Some(m) => {
                if m < u32::from(signed) {
                    return Err(FixedPointError::InvalidValue(
                        "Number of integer bits must be at least 1 for signed numbers.".into(),
                    ));
                }
                m
            }
            None => {
                let m = match &init {
                    Init::Float(v) => Self::min_m(*v, signed),
                    Init::Int(v) => Self::min_m_int(v, signed),
                    _ => 0,
                };
                let m = m + u32::from(m + n == 0);
                crate::alert::log(serial, format_args!("Deduced integer length: {}", m));
                m
            }
        };

        if m + n == 0 {
            return Err(FixedPointError::InvalidValue(
                "Word size (integer and fractional) must be positive.".into(),
            ));
        }

        let config = options.resolve_config(signed);
        let mut fp = FixedPoint {
            bits: BigInt::zero(),
            signed,
            m,
            n,
            config,
            serial,
            context: Vec::new(),
        };
        fp.log(format_args!(
            "intended: {:?} Q format: {} overflow: {} rounding: {} overflow_alert: {} \
             mismatch_alert: {} implicit_cast_alert: {} str_base: {}",
            init,
            fp.qformat(),
            config.overflow,
            config.rounding,
            config.overflow_alert,
            config.mismatch_alert,
            config.implicit_cast_alert,
            config.str_base
        ));

        // 3. Initialize the bits
        match &init {
            Init::Str(s) => fp.from_literal(s)?,
            Init::Int(v) => fp.from_integer(v)?,
            Init::Float(v) => fp.from_float(*v)?,
            Init::Copy(_) => {}
        }

        // 4. Deduced widths carry no excess bits
        fp.trim(Some(trim_m), Some(trim_n || trim_fracs));
        Ok(fp)
    }

    /// No rounding or overflow handling: every set bit must fit the word.
    fn from_literal(&mut self, literal: &str) -> Result<()> {
        let value = parse_literal(literal)?;
        if value.is_negative() || value > self.bitmask() {
            return Err(FixedPointError::InvalidValue(format!(
                "Superfluous bits detected in string literal {:?} for {} format.",
                literal,
                self.qformat()
            )));
        }
        self.bits = value;
        Ok(())
    }

    /// Overflow handling but no rounding.
    fn from_integer(&mut self, integer: &BigInt) -> Result<()> {
        let mut bits = integer << (self.n as usize);
        let (minimum, maximum) = (self.minimum(), self.maximum());
        self.log(format_args!("MIN: {} INT: {} MAX: {}", minimum, bits, maximum));

        if bits < minimum || bits > maximum {
            self.owarn(format!("Integer {} overflows in {} format.", integer, self.qformat()))?;
            let clamp = self.config.overflow == Overflow::Clamp;
            let low = integer.is_negative();
            self.owarn(overflow_action(clamp, low))?;
            if clamp {
                bits = if low { minimum } else { maximum };
            }
        }

        self.bits = wrap_to(&bits, self.width());
        Ok(())
    }

    /// Rounding and overflow handling.
    fn from_float(&mut self, val: f64) -> Result<()> {
        let scaled = Scaled::new(val, self.n);
        let (minimum, maximum) = (self.minimum(), self.maximum());
        let exact = scaled.remainder.is_none();
        let t = &scaled.truncated;

        let in_range = if scaled.negative {
            *t > minimum || (*t == minimum && exact)
        } else {
            *t < maximum || (*t == maximum && exact)
        };

        if !in_range {
            self.owarn(format!("{:e} overflows in {} format.", val, self.qformat()))?;
            let clamp = self.config.overflow == Overflow::Clamp;
            self.owarn(overflow_action(clamp, scaled.negative))?;
            let bits = match (clamp, scaled.negative) {
                (true, true) => minimum,
                (true, false) => maximum,
                (false, _) => t.clone(),
            };
            self.bits = wrap_to(&bits, self.width());
            return Ok(());
        }

        let Some(remainder) = scaled.remainder else {
            self.bits = wrap_to(t, self.width());
            return Ok(());
        };

        // Two guard bits below the LSb encode where the remainder sits
        // relative to one half, then the configured mode rounds them off.
        use core::cmp::Ordering::*;
        let n = self.n;
        let width = self.width();
        let base = wrap_to(t, width) << 2usize;
        let bits = if scaled.negative {
            let guard = match remainder {
                Less => 0b11,
                Equal => 0b10,
                Greater => 0b01,
            };
            base - 4 + guard
        } else {
            let guard = match remainder {
                Less => 0b01,
                Equal => 0b10,
                Greater => 0b11,
            };
            base + guard
        };

        self.n = n + 2;
        self.bits = wrap_to(&bits, width + 2);
        let mode = self.config.rounding;
        self.round_with(mode, n)
    }

    /// Minimum integer bit width for a float, accounting for worst-case rounding.
    pub fn min_m(val: f64, signed: bool) -> u32 {
        // Round away from zero
        let wcround = BigInt::from_f64(val.abs().ceil()).unwrap_or_default();
        let wcround = if val < 0.0 { -wcround } else { wcround };
        min_m_for(&wcround, signed || val < 0.0)
    }

    /// Minimum integer bit width for an integer.
    pub fn min_m_int(val: &BigInt, signed: bool) -> u32 {
        min_m_for(val, signed || val.is_negative())
    }

    /// Minimum fractional bit width such that `val * 2^n` is integral.
    ///
    /// A binary search over `[0, MAX_EXPONENT]` with float scaling answers
    /// most values; anything it cannot confirm is decided exactly from the
    /// mantissa and exponent, so subnormals get their full width.
    pub fn min_n(val: f64) -> u32 {
        fn integral(val: f64, n: u32) -> Option<bool> {
            let scaled = val * 2f64.powi(n as i32);
            scaled.is_finite().then(|| scaled.fract() == 0.0)
        }

        let (mut lo, mut hi) = (0u32, MAX_EXPONENT);
        while lo + 1 < hi {
            let mid = (lo + hi).div_ceil(2);
            match integral(val, mid) {
                Some(true) => hi = mid,
                Some(false) => lo = mid,
                None => return min_n_exact(val),
            }
        }
        match (integral(val, lo), integral(val, hi)) {
            (Some(true), _) => lo,
            (_, Some(true)) => hi,
            _ => min_n_exact(val),
        }
    }
}

/// `max(0, -(exponent + trailing zeros of the mantissa))`.
fn min_n_exact(val: f64) -> u32 {
    if val == 0.0 || !val.is_finite() {
        return 0;
    }
    let (mantissa, exponent, _) = Float::integer_decode(val);
    let shift = i64::from(exponent) + i64::from(mantissa.trailing_zeros());
    u32::try_from(-shift).unwrap_or(0)
}

fn min_m_for(wcround: &BigInt, signed: bool) -> u32 {
    let magnitude = wcround.abs();
    // ceil(log2(|x|)), with 1 for zero
    let mut ret = if magnitude.is_zero() {
        1
    } else {
        (magnitude - 1u8).bits() as u32
    };

    if signed {
        // [-2^(m-1), 2^(m-1))
        loop {
            let fits = if ret == 0 {
                wcround.is_zero()
            } else {
                let boundary = pow2(ret - 1);
                -&boundary <= *wcround && *wcround < boundary
            };
            if fits {
                break;
            }
            ret += 1;
        }
    } else if *wcround >= pow2(ret) {
        ret += 1;
    }
    ret
}

/// Second half of every overflow alert pair.
pub(crate) fn overflow_action(clamp: bool, minimum: bool) -> String {
    format!(
        "{} {}.",
        if clamp { "Clamped to" } else { "Wrapped" },
        if minimum { "minimum" } else { "maximum" }
    )
}

/// Integer literal with an optional sign, radix prefix and `_` separators.
pub(crate) fn parse_literal(literal: &str) -> Result<BigInt> {
    let invalid =
        || FixedPointError::InvalidValue(format!("Invalid integer literal {:?}.", literal));

    let s = literal.trim();
    let (sign, s) = match s.as_bytes().first() {
        Some(b'-') => (Sign::Minus, &s[1..]),
        Some(b'+') => (Sign::Plus, &s[1..]),
        _ => (Sign::Plus, s),
    };

    let lower = s.to_ascii_lowercase();
    let (radix, digits) = match lower.get(..2) {
        Some("0b") => (2, &lower[2..]),
        Some("0o") => (8, &lower[2..]),
        Some("0x") => (16, &lower[2..]),
        _ => (10, lower.as_str()),
    };

    // Separators go between digits, or right after a radix prefix
    let digits = if radix != 10 {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }
    let digits: String = digits.chars().filter(|&c| c != '_').collect();

    // No leading zeros on non-zero decimals
    if radix == 10
        && digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().any(|b| b != b'0')
    {
        return Err(invalid());
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
    if magnitude.is_negative() {
        return Err(invalid());
    }
    Ok(if sign == Sign::Minus { -magnitude } else { magnitude })
}

/// Saturating extremes of an arbitrary format, as raw bits.
pub(crate) fn extreme_bits(signed: bool, width: u32, minimum: bool) -> BigInt {
    if minimum {
        wrap_to(&minimum_for(signed, width), width)
    } else {
        maximum_for(signed, width) & mask(width)
    }
}
