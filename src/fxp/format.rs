// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Text rendering and numeric conversion.

use core::fmt;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::config::StrBase;
use crate::error::{FixedPointError, Result};

use super::{mask, shr_floor, FixedPoint};

/// `x * 2^exp`, scaling in steps so intermediates stay finite.
fn ldexp(mut x: f64, mut exp: i64) -> f64 {
    const STEP: i32 = 1000;
    while exp > i64::from(STEP) && x.is_finite() && x != 0.0 {
        x *= 2f64.powi(STEP);
        exp -= i64::from(STEP);
    }
    while exp < -i64::from(STEP) && x != 0.0 {
        x *= 2f64.powi(-STEP);
        exp += i64::from(STEP);
    }
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    x * 2f64.powi(exp as i32)
}

/// `[#][0][width][.precision][code]`
#[derive(Debug, Default)]
struct FieldSpec {
    alternate: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    code: Option<char>,
}

impl FieldSpec {
    fn parse(spec: &str) -> Result<Self> {
        let mut rest = spec;
        let mut field = FieldSpec::default();
        if let Some(tail) = rest.strip_prefix('#') {
            field.alternate = true;
            rest = tail;
        }
        if let Some(tail) = rest.strip_prefix('0') {
            field.zero = true;
            rest = tail;
        }
        let (width, tail) = leading_number(rest);
        field.width = width.unwrap_or(0);
        rest = tail;
        if let Some(tail) = rest.strip_prefix('.') {
            let (precision, tail) = leading_number(tail);
            field.precision = Some(precision.ok_or_else(|| invalid_spec(spec))?);
            rest = tail;
        }
        let mut chars = rest.chars();
        field.code = chars.next();
        if chars.next().is_some() {
            return Err(invalid_spec(spec));
        }
        Ok(field)
    }
}

fn invalid_spec(spec: &str) -> FixedPointError {
    FixedPointError::InvalidValue(format!("Invalid format specifier '{}'.", spec))
}

fn leading_number(s: &str) -> (Option<usize>, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (s[..end].parse().ok(), &s[end..])
}

/// Right-aligned, or zero-filled after the sign and prefix.
fn pad_number(sign: &str, prefix: &str, body: &str, field: &FieldSpec) -> String {
    let fill = field.width.saturating_sub(sign.len() + prefix.len() + body.len());
    if field.zero {
        format!("{}{}{}{}", sign, prefix, "0".repeat(fill), body)
    } else {
        format!("{}{}{}{}", " ".repeat(fill), sign, prefix, body)
    }
}

fn int_field(value: &BigInt, spec: &str) -> Result<String> {
    let field = FieldSpec::parse(spec)?;
    if field.precision.is_some() {
        return Err(invalid_spec(spec));
    }
    let (prefix, digits) = match field.code {
        None | Some('d') => ("", value.to_string()),
        Some('b') => ("0b", value.to_str_radix(2)),
        Some('o') => ("0o", value.to_str_radix(8)),
        Some('x') => ("0x", value.to_str_radix(16)),
        Some('X') => ("0X", value.to_str_radix(16).to_uppercase()),
        Some(_) => return Err(invalid_spec(spec)),
    };
    let prefix = if field.alternate { prefix } else { "" };
    Ok(pad_number("", prefix, &digits, &field))
}

/// Left-aligned, truncated to the precision.
fn text_field(text: &str, spec: &str) -> Result<String> {
    let field = FieldSpec::parse(spec)?;
    if field.alternate || field.zero || field.code.is_some() {
        return Err(invalid_spec(spec));
    }
    let text: String = match field.precision {
        Some(p) => text.chars().take(p).collect(),
        None => text.to_owned(),
    };
    Ok(format!("{:<width$}", text, width = field.width))
}

fn float_field(x: f64, spec: &str) -> Result<String> {
    let field = FieldSpec::parse(spec)?;
    let precision = field.precision.unwrap_or(6);
    let (sign, magnitude) = if x < 0.0 { ("-", -x) } else { ("", x) };
    let code = field.code.unwrap_or('g');
    let body = if magnitude.is_infinite() {
        "inf".to_owned()
    } else {
        match code.to_ascii_lowercase() {
            'f' => format!("{:.*}", precision, magnitude),
            'e' => exponent_form(magnitude, precision),
            'g' => general_form(magnitude, precision, field.alternate),
            '%' => format!("{:.*}%", precision, magnitude * 100.0),
            _ => return Err(invalid_spec(spec)),
        }
    };
    let body = if code.is_ascii_uppercase() { body.to_uppercase() } else { body };
    Ok(pad_number(sign, "", &body, &field))
}

/// Scientific notation with a signed exponent of at least two digits.
fn exponent_form(x: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, x);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => text,
    }
}

/// Fixed or scientific depending on the decimal exponent, trailing zeros dropped.
fn general_form(x: f64, precision: usize, alternate: bool) -> String {
    let precision = precision.max(1);
    let exp = format!("{:.*e}", precision - 1, x)
        .split_once('e')
        .and_then(|(_, exp)| exp.parse::<i64>().ok())
        .unwrap_or(0);
    let body = if (-4..precision as i64).contains(&exp) {
        format!("{:.*}", (precision as i64 - 1 - exp) as usize, x)
    } else {
        exponent_form(x, precision - 1)
    };
    if alternate {
        return body;
    }
    let (number, exponent) = body.split_at(body.find('e').unwrap_or(body.len()));
    let number = if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    };
    format!("{}{}", number, exponent)
}

impl FixedPoint {
    /// Render one field by format code.
    ///
    /// The last character picks what is shown: `b d o x X` (or nothing) the raw
    /// bits, `m` the integer bits, `n` the fractional bits, `s` the `Display`
    /// string, `q` the Q format, and `e E f F g G %` the `f64` value. The rest
    /// of the spec is `[#][0][width][.precision]`; for `m` and `n` it may end in
    /// a radix code, so `"#xm"` is the integer bits in prefixed hex.
    pub fn format_field(&self, spec: &str) -> Result<String> {
        let head = spec.get(..spec.len().saturating_sub(1)).unwrap_or_default();
        match spec.chars().last() {
            None | Some('b' | 'd' | 'o' | 'x' | 'X') => int_field(&self.bits, spec),
            Some('m') => int_field(&(&shr_floor(&self.bits, self.n) & &mask(self.m)), head),
            Some('n') => int_field(&(&self.bits & &mask(self.n)), head),
            Some('s') => text_field(&self.to_string(), head),
            Some('q') => text_field(&self.qformat(), head),
            Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') => float_field(self.to_f64(), spec),
            Some(_) => Err(FixedPointError::InvalidValue(format!(
                "Unknown format code '{}'.",
                spec
            ))),
        }
    }

    /// Nearest `f64`, saturating to infinity.
    pub fn to_f64(&self) -> f64 {
        let value = self.signed_integer();
        let length = value.bits();
        // Keep the conversion argument well inside the f64 exponent range
        let (mantissa, shift) = if length > 1000 {
            let shift = length - 128;
            let mut mantissa = &value >> shift as usize;
            if !(&value - (&mantissa << shift as usize)).is_zero() {
                mantissa |= BigInt::from(1u8);
            }
            (mantissa, shift as i64)
        } else {
            (value, 0)
        };
        let x = mantissa.to_f64().unwrap_or(0.0);
        ldexp(x, shift - i64::from(self.n))
    }

    /// Floor of the value, as an integer.
    pub fn to_int(&self) -> BigInt {
        shr_floor(&self.signed_integer(), self.n)
    }

    pub fn is_zero(&self) -> bool {
        self.bits.is_zero()
    }

    /// Radix literal of the raw bits, as used by `Debug`.
    fn literal(&self) -> String {
        match self.config.str_base {
            StrBase::Dec => self.bits.to_string(),
            base => format!("{}{}", base.prefix(), self.bits.to_str_radix(base.radix())),
        }
    }
}

impl fmt::Display for FixedPoint {
    /// Unsigned raw bits in `str_base`, zero-padded to the word for power-of-two bases.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.config.str_base;
        let digits = self.bits.to_str_radix(base.radix());
        match base.bits_per_digit() {
            Some(per_digit) => {
                let width = self.width().div_ceil(per_digit) as usize;
                write!(f, "{:0>width$}", digits, width = width)
            }
            None => f.write_str(&digits),
        }
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = &self.config;
        write!(
            f,
            "FixedPoint('{}', signed={}, m={}, n={}, overflow='{}', rounding='{}', \
             overflow_alert='{}', mismatch_alert='{}', implicit_cast_alert='{}', str_base={})",
            self.literal(),
            u8::from(self.signed),
            self.m,
            self.n,
            config.overflow,
            config.rounding,
            config.overflow_alert,
            config.mismatch_alert,
            config.implicit_cast_alert,
            config.str_base
        )
    }
}

impl fmt::Binary for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.bits, f)
    }
}

impl fmt::Octal for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Octal::fmt(&self.bits, f)
    }
}

impl fmt::LowerHex for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.bits, f)
    }
}

impl fmt::UpperHex for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.bits, f)
    }
}

impl From<&FixedPoint> for f64 {
    fn from(fp: &FixedPoint) -> f64 {
        fp.to_f64()
    }
}
