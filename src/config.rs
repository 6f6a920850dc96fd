// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration: per-value properties and construction options.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};

/// Upper bound of the fractional-width search, `max(|f64::MAX_EXP|, |f64::MIN_EXP|)`.
pub const MAX_EXPONENT: u32 = 1024;

/// Overflow handling scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Clamp,
    Wrap,
}

/// Rounding scheme.
///
/// Declaration order is the resolution priority for signed operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    Convergent,
    Nearest,
    Down,
    In,
    Out,
    Up,
}

impl Rounding {
    pub const ALL: [Rounding; 6] = [
        Rounding::Convergent,
        Rounding::Nearest,
        Rounding::Down,
        Rounding::In,
        Rounding::Out,
        Rounding::Up,
    ];

    /// Default rounding for a signedness.
    pub fn auto(signed: bool) -> Self {
        if signed {
            Rounding::Convergent
        } else {
            Rounding::Nearest
        }
    }
}

/// Alert severity of a notification channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alert {
    Error,
    Warning,
    Ignore,
}

impl Alert {
    /// Rank used when picking the more severe of two alerts.
    pub fn severity(self) -> u8 {
        match self {
            Alert::Error => 2,
            Alert::Warning => 1,
            Alert::Ignore => 0,
        }
    }
}

/// Radix used by `Display`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum StrBase {
    Bin,
    Oct,
    Dec,
    Hex,
}

impl StrBase {
    pub fn radix(self) -> u32 {
        match self {
            StrBase::Bin => 2,
            StrBase::Oct => 8,
            StrBase::Dec => 10,
            StrBase::Hex => 16,
        }
    }

    /// Literal prefix for the radix (empty for decimal).
    pub fn prefix(self) -> &'static str {
        match self {
            StrBase::Bin => "0b",
            StrBase::Oct => "0o",
            StrBase::Dec => "",
            StrBase::Hex => "0x",
        }
    }

    /// Bits per digit for the power-of-two radices.
    pub fn bits_per_digit(self) -> Option<u32> {
        match self {
            StrBase::Bin => Some(1),
            StrBase::Oct => Some(3),
            StrBase::Dec => None,
            StrBase::Hex => Some(4),
        }
    }
}

impl From<StrBase> for u32 {
    fn from(base: StrBase) -> u32 {
        base.radix()
    }
}

impl TryFrom<u32> for StrBase {
    type Error = FixedPointError;

    fn try_from(radix: u32) -> Result<Self> {
        match radix {
            2 => Ok(StrBase::Bin),
            8 => Ok(StrBase::Oct),
            10 => Ok(StrBase::Dec),
            16 => Ok(StrBase::Hex),
            _ => Err(FixedPointError::InvalidValue(format!(
                "Invalid str_base setting: '{}'.",
                radix
            ))),
        }
    }
}

macro_rules! named_enum {
    ($ty:ident, $prop:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = FixedPointError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(FixedPointError::InvalidValue(format!(
                        concat!("Invalid ", $prop, " setting: '{}'."),
                        s
                    ))),
                }
            }
        }
    };
}

named_enum!(Overflow, "overflow", { Clamp => "clamp", Wrap => "wrap" });
named_enum!(Rounding, "rounding", {
    Convergent => "convergent",
    Nearest => "nearest",
    Down => "down",
    In => "in",
    Out => "out",
    Up => "up",
});
named_enum!(Alert, "alert", { Error => "error", Warning => "warning", Ignore => "ignore" });

impl fmt::Display for StrBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.radix())
    }
}

impl FromStr for StrBase {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self> {
        let radix: u32 = s
            .trim()
            .parse()
            .map_err(|_| {
                FixedPointError::InvalidValue(format!("Invalid str_base setting: '{}'.", s))
            })?;
        StrBase::try_from(radix)
    }
}

/// The six per-value properties.
///
/// Field order is the serialized order of the attribute triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config {
    pub str_base: StrBase,
    pub mismatch_alert: Alert,
    pub overflow_alert: Alert,
    pub implicit_cast_alert: Alert,
    pub overflow: Overflow,
    pub rounding: Rounding,
}

impl Config {
    /// Defaults with the rounding scheme picked for `signed`.
    pub fn for_signed(signed: bool) -> Self {
        Self {
            rounding: Rounding::auto(signed),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            str_base: StrBase::Hex,
            mismatch_alert: Alert::Warning,
            overflow_alert: Alert::Error,
            implicit_cast_alert: Alert::Warning,
            overflow: Overflow::Clamp,
            rounding: Rounding::Convergent,
        }
    }
}

/// Construction options for [`crate::FixedPoint::new`].
///
/// Absent `signed`, `m` or `n` are deduced from the initial value; an absent
/// rounding scheme resolves to convergent for signed and nearest for unsigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub signed: Option<bool>,
    pub m: Option<u32>,
    pub n: Option<u32>,
    pub overflow: Overflow,
    pub rounding: Option<Rounding>,
    pub str_base: StrBase,
    pub overflow_alert: Alert,
    pub implicit_cast_alert: Alert,
    pub mismatch_alert: Alert,
}

impl Default for Options {
    fn default() -> Self {
        let config = Config::default();
        Self {
            signed: None,
            m: None,
            n: None,
            overflow: config.overflow,
            rounding: None,
            str_base: config.str_base,
            overflow_alert: config.overflow_alert,
            implicit_cast_alert: config.implicit_cast_alert,
            mismatch_alert: config.mismatch_alert,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = Some(signed);
        self
    }

    pub fn unsigned(self) -> Self {
        self.signed(false)
    }

    pub fn m(mut self, m: u32) -> Self {
        self.m = Some(m);
        self
    }

    pub fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    /// Fully constrained Q format.
    pub fn format(self, signed: bool, m: u32, n: u32) -> Self {
        self.signed(signed).m(m).n(n)
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = Some(rounding);
        self
    }

    pub fn str_base(mut self, str_base: StrBase) -> Self {
        self.str_base = str_base;
        self
    }

    pub fn overflow_alert(mut self, alert: Alert) -> Self {
        self.overflow_alert = alert;
        self
    }

    pub fn implicit_cast_alert(mut self, alert: Alert) -> Self {
        self.implicit_cast_alert = alert;
        self
    }

    pub fn mismatch_alert(mut self, alert: Alert) -> Self {
        self.mismatch_alert = alert;
        self
    }

    /// Copies every property from `config`, including its rounding scheme.
    pub fn config(mut self, config: Config) -> Self {
        self.overflow = config.overflow;
        self.rounding = Some(config.rounding);
        self.str_base = config.str_base;
        self.overflow_alert = config.overflow_alert;
        self.implicit_cast_alert = config.implicit_cast_alert;
        self.mismatch_alert = config.mismatch_alert;
        self
    }

    /// Resolved properties once signedness is known.
    pub fn resolve_config(&self, signed: bool) -> Config {
        Config {
            str_base: self.str_base,
            mismatch_alert: self.mismatch_alert,
            overflow_alert: self.overflow_alert,
            implicit_cast_alert: self.implicit_cast_alert,
            overflow: self.overflow,
            rounding: self.rounding.unwrap_or_else(|| Rounding::auto(signed)),
        }
    }
}
