// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-point operations.
//!
//! Every operator grows the result format so no precision is lost, except
//! for unsigned subtraction going negative. Operands are never mutated: they
//! are aligned on their signed integer views.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::ops::{
    Add, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Mul, Neg, Not, Shl,
    ShlAssign, Shr, ShrAssign, Sub,
};

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::alert::{Channel, Notifier};
use crate::config::{Config, Options, Overflow};
use crate::error::{FixedPointError, Result};
use crate::resolve::{PropertyResolver, Resolver};

use super::init::{overflow_action, Init};
use super::{shr_floor, wrap_to, FixedPoint};

/// Right-hand side of a binary operation.
#[derive(Clone, Debug)]
pub enum Operand<'a> {
    Fixed(&'a FixedPoint),
    Int(BigInt),
    /// A float, promoted with deduced widths unless `n` is given.
    Float { value: f64, n: Option<u32> },
}

impl Operand<'_> {
    /// Float promoted with exactly `n` fractional bits (rounded if needed).
    pub fn float_with_frac_bits(value: f64, n: u32) -> Self {
        Operand::Float { value, n: Some(n) }
    }
}

impl<'a> From<&'a FixedPoint> for Operand<'a> {
    fn from(fp: &'a FixedPoint) -> Self {
        Operand::Fixed(fp)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Float { value, n: None }
    }
}

impl From<f32> for Operand<'_> {
    fn from(value: f32) -> Self {
        Operand::Float { value: f64::from(value), n: None }
    }
}

impl From<BigInt> for Operand<'_> {
    fn from(value: BigInt) -> Self {
        Operand::Int(value)
    }
}

macro_rules! int_operand {
    ($($t:ty),+) => {
        $(impl From<$t> for Operand<'_> {
            fn from(v: $t) -> Self {
                Operand::Int(BigInt::from(v))
            }
        })+
    };
}

int_operand!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Raw result of an arithmetic kernel: bits, signed, m, n.
type Parts = (BigInt, bool, u32, u32);

impl FixedPoint {
    /// Signed integer view with the binary point moved to `n` fractional bits (`n >= self.n`).
    fn aligned(&self, n: u32) -> BigInt {
        self.signed_integer() << (n - self.n) as usize
    }

    /// FixedPoint version of `operand`. Lossy float promotion alerts through `self`.
    fn promote<'b>(
        &self,
        operand: Operand<'b>,
        signed: Option<bool>,
    ) -> Result<Cow<'b, FixedPoint>> {
        let mut options = Options::new();
        options.signed = signed;
        match operand {
            Operand::Fixed(fp) => Ok(Cow::Borrowed(fp)),
            Operand::Int(value) => {
                Ok(Cow::Owned(FixedPoint::build(Init::Int(value), options, false)?))
            }
            Operand::Float { value, n } => {
                options.n = n;
                let ret = FixedPoint::build(Init::Float(value), options, n.is_some())?;
                let error = (value - ret.to_f64()).abs();
                if error != 0.0 {
                    self.iwarn(format!(
                        "Casting {} to {} introduces an error of {:e}",
                        value,
                        ret.qformat(),
                        error
                    ))?;
                }
                Ok(Cow::Owned(ret))
            }
        }
    }

    fn sum(augend: &FixedPoint, addend: &FixedPoint) -> Parts {
        let n = augend.n.max(addend.n);
        let m = augend.m.max(addend.m) + 1;
        let signed = augend.signed || addend.signed;
        (augend.aligned(n) + addend.aligned(n), signed, m, n)
    }

    fn difference(
        minuend: &FixedPoint,
        subtrahend: &FixedPoint,
        overflow: Overflow,
        notifier: Notifier,
    ) -> Result<Parts> {
        let signed = minuend.signed || subtrahend.signed;
        let m = 1 + minuend.m.max(subtrahend.m) + u32::from(minuend.signed ^ subtrahend.signed);
        let n = minuend.n.max(subtrahend.n);
        let mut bits = minuend.aligned(n) - subtrahend.aligned(n);

        if !signed && bits.is_negative() {
            notifier.notify("Unsigned subtraction causes overflow.")?;
            let clamp = overflow == Overflow::Clamp;
            if clamp {
                bits = BigInt::zero();
            }
            notifier.notify(overflow_action(clamp, true))?;
        }
        Ok((bits, signed, m, n))
    }

    fn product(multiplicand: &FixedPoint, multiplier: &FixedPoint) -> Parts {
        (
            multiplicand.signed_integer() * multiplier.signed_integer(),
            multiplicand.signed || multiplier.signed,
            multiplicand.m + multiplier.m,
            multiplicand.n + multiplier.n,
        )
    }

    /// Merged config for a result: resolved against another FixedPoint, own otherwise.
    fn result_config(&self, operand: &Operand<'_>, resolver: &dyn Resolver) -> Result<Config> {
        match operand {
            Operand::Fixed(other) => resolver.resolve(self, other),
            _ => Ok(self.config),
        }
    }

    fn assemble(&mut self, (bits, signed, m, n): Parts) {
        self.signed = signed;
        self.m = m;
        self.n = n;
        self.bits = wrap_to(&bits, m + n);
    }

    // --- Addition ---

    /// Full precision addition: `Q{max(m)+1}.{max(n)}`.
    pub fn try_add<'b>(&self, addend: impl Into<Operand<'b>>) -> Result<FixedPoint> {
        self.add_with(addend, &PropertyResolver)
    }

    pub fn add_with<'b>(
        &self,
        addend: impl Into<Operand<'b>>,
        resolver: &dyn Resolver,
    ) -> Result<FixedPoint> {
        let addend = addend.into();
        let config = self.result_config(&addend, resolver)?;
        let addend = self.promote(addend, None)?;
        let (bits, signed, m, n) = Self::sum(self, &addend);
        Ok(FixedPoint::from_parts(bits, signed, m, n, config))
    }

    /// In-place addition; keeps this value's properties.
    pub fn add_in_place<'b>(&mut self, addend: impl Into<Operand<'b>>) -> Result<()> {
        let addend = self.promote(addend.into(), None)?;
        let parts = Self::sum(self, &addend);
        self.assemble(parts);
        Ok(())
    }

    // --- Subtraction ---

    /// Full precision subtraction: `Q{max(m)+1+(s1^s2)}.{max(n)}`.
    pub fn try_sub<'b>(&self, subtrahend: impl Into<Operand<'b>>) -> Result<FixedPoint> {
        self.sub_with(subtrahend, &PropertyResolver)
    }

    pub fn sub_with<'b>(
        &self,
        subtrahend: impl Into<Operand<'b>>,
        resolver: &dyn Resolver,
    ) -> Result<FixedPoint> {
        let subtrahend = subtrahend.into();
        let config = self.result_config(&subtrahend, resolver)?;
        let subtrahend = self.promote(subtrahend, Some(self.signed))?;
        let notifier = Notifier::new(Channel::Overflow, config.overflow_alert, self.serial);
        let (bits, signed, m, n) = Self::difference(self, &subtrahend, config.overflow, notifier)?;
        Ok(FixedPoint::from_parts(bits, signed, m, n, config))
    }

    /// `minuend - self` for a numeric minuend; keeps this value's properties.
    pub fn rsub<'b>(&self, minuend: impl Into<Operand<'b>>) -> Result<FixedPoint> {
        let minuend = self.promote(minuend.into(), Some(self.signed))?;
        let (bits, signed, m, n) =
            Self::difference(&minuend, self, self.config.overflow, self.overflow_notifier(None))?;
        Ok(FixedPoint::from_parts(bits, signed, m, n, self.config))
    }

    pub fn sub_in_place<'b>(&mut self, subtrahend: impl Into<Operand<'b>>) -> Result<()> {
        let subtrahend = self.promote(subtrahend.into(), Some(self.signed))?;
        let notifier = self.overflow_notifier(None);
        let parts = Self::difference(self, &subtrahend, self.config.overflow, notifier)?;
        self.assemble(parts);
        Ok(())
    }

    // --- Multiplication ---

    /// Full precision multiplication: `Q{m1+m2}.{n1+n2}`.
    pub fn try_mul<'b>(&self, multiplier: impl Into<Operand<'b>>) -> Result<FixedPoint> {
        self.mul_with(multiplier, &PropertyResolver)
    }

    pub fn mul_with<'b>(
        &self,
        multiplier: impl Into<Operand<'b>>,
        resolver: &dyn Resolver,
    ) -> Result<FixedPoint> {
        let multiplier = multiplier.into();
        let config = self.result_config(&multiplier, resolver)?;
        let multiplier = self.promote(multiplier, None)?;
        let (bits, signed, m, n) = Self::product(self, &multiplier);
        Ok(FixedPoint::from_parts(bits, signed, m, n, config))
    }

    pub fn mul_in_place<'b>(&mut self, multiplier: impl Into<Operand<'b>>) -> Result<()> {
        let multiplier = self.promote(multiplier.into(), None)?;
        let parts = Self::product(self, &multiplier);
        self.assemble(parts);
        Ok(())
    }

    // --- Exponentiation ---

    fn power(&self, exponent: i64) -> Result<Parts> {
        let e = u32::try_from(exponent).ok().filter(|&e| e > 0).ok_or_else(|| {
            FixedPointError::InvalidType(
                "Only positive integers are supported for exponentiation.".into(),
            )
        })?;
        let (m, n) = match (self.m.checked_mul(e), self.n.checked_mul(e)) {
            (Some(m), Some(n)) if m.checked_add(n).is_some() => (m, n),
            _ => {
                return Err(FixedPointError::InvalidValue(format!(
                    "Exponent {} is too large for {}.",
                    exponent,
                    self.qformat()
                )))
            }
        };
        Ok((num_traits::pow(self.signed_integer(), e as usize), self.signed, m, n))
    }

    /// Full precision exponentiation: `Q{m*e}.{n*e}`.
    pub fn pow(&self, exponent: i64) -> Result<FixedPoint> {
        let (bits, signed, m, n) = self.power(exponent)?;
        Ok(FixedPoint::from_parts(bits, signed, m, n, self.config))
    }

    pub fn pow_in_place(&mut self, exponent: i64) -> Result<()> {
        let parts = self.power(exponent)?;
        self.assemble(parts);
        Ok(())
    }

    // --- Unary ---

    /// Negation. The most negative value grows one integer bit.
    pub fn negate(&self) -> Result<FixedPoint> {
        if !self.signed {
            return Err(FixedPointError::Structural("Unsigned numbers cannot be negated.".into()));
        }

        // Overflow only occurs at the most negative value
        let value = self.signed_integer();
        let overflow = value == self.minimum();
        if overflow {
            self.owarn(format!(
                "Negating {}{} ({}) causes overflow.",
                self.config.str_base.prefix(),
                self,
                self.qformat()
            ))?;
            self.owarn(format!(
                "Adjusting Q format to Q{}.{} to allow negation.",
                self.m + 1,
                self.n
            ))?;
        }

        let m = self.m + u32::from(overflow);
        Ok(FixedPoint::from_parts(-value, true, m, self.n, self.config))
    }

    /// Negated copy of negative values, plain copy otherwise.
    pub fn abs(&self) -> Result<FixedPoint> {
        if self.is_negative() {
            self.negate()
        } else {
            Ok(self.duplicate())
        }
    }

    /// Unary plus: a copy.
    pub fn pos(&self) -> FixedPoint {
        self.duplicate()
    }

    // --- Shifts and bitwise ---

    /// Positive amounts shift right (arithmetically), negative amounts left.
    ///
    /// Amounts of at least the word width shift everything out: left gives 0,
    /// right gives the sign fill.
    fn shifted(&self, right: i64) -> BigInt {
        let value = self.signed_integer();
        let width = self.width();
        let amount = u32::try_from(right.unsigned_abs()).unwrap_or(u32::MAX).min(width);
        let bits = if right < 0 {
            value << amount as usize
        } else {
            shr_floor(&value, amount)
        };
        wrap_to(&bits, width)
    }

    fn with_bits(&self, bits: BigInt) -> FixedPoint {
        FixedPoint::from_parts(bits, self.signed, self.m, self.n, self.config)
    }

    // --- Comparison ---

    fn cmp_exact(&self, other: &FixedPoint) -> Ordering {
        let n = self.n.max(other.n);
        self.aligned(n).cmp(&other.aligned(n))
    }

    /// Exact comparison against any operand. Lossy float promotion alerts.
    pub fn compare<'b>(&self, operand: impl Into<Operand<'b>>) -> Result<Ordering> {
        let other = self.promote(operand.into(), None)?;
        Ok(self.cmp_exact(&other))
    }

    fn cmp_f64(&self, value: f64) -> Option<Ordering> {
        if value.is_nan() {
            return None;
        }
        if value.is_infinite() {
            return Some(if value > 0.0 { Ordering::Less } else { Ordering::Greater });
        }
        let other = FixedPoint::build(Init::Float(value), Options::new(), false).ok()?;
        Some(self.cmp_exact(&other))
    }

    fn cmp_int(&self, value: i64) -> Ordering {
        let n = self.n;
        self.signed_integer().cmp(&(BigInt::from(value) << n as usize))
    }
}

// --- Operator traits ---

macro_rules! binary_op {
    ($trait:ident, $method:ident, $named:ident) => {
        impl<'b> $trait<&'b FixedPoint> for &FixedPoint {
            type Output = Result<FixedPoint>;

            fn $method(self, rhs: &'b FixedPoint) -> Result<FixedPoint> {
                self.$named(rhs)
            }
        }

        impl $trait<f64> for &FixedPoint {
            type Output = Result<FixedPoint>;

            fn $method(self, rhs: f64) -> Result<FixedPoint> {
                self.$named(rhs)
            }
        }

        impl $trait<i64> for &FixedPoint {
            type Output = Result<FixedPoint>;

            fn $method(self, rhs: i64) -> Result<FixedPoint> {
                self.$named(rhs)
            }
        }
    };
}

binary_op!(Add, add, try_add);
binary_op!(Sub, sub, try_sub);
binary_op!(Mul, mul, try_mul);

macro_rules! reflected_op {
    ($lhs:ty) => {
        impl Add<&FixedPoint> for $lhs {
            type Output = Result<FixedPoint>;

            fn add(self, rhs: &FixedPoint) -> Result<FixedPoint> {
                rhs.try_add(self)
            }
        }

        impl Sub<&FixedPoint> for $lhs {
            type Output = Result<FixedPoint>;

            fn sub(self, rhs: &FixedPoint) -> Result<FixedPoint> {
                rhs.rsub(self)
            }
        }

        impl Mul<&FixedPoint> for $lhs {
            type Output = Result<FixedPoint>;

            fn mul(self, rhs: &FixedPoint) -> Result<FixedPoint> {
                rhs.try_mul(self)
            }
        }
    };
}

reflected_op!(f64);
reflected_op!(i64);

impl Neg for &FixedPoint {
    type Output = Result<FixedPoint>;

    fn neg(self) -> Result<FixedPoint> {
        self.negate()
    }
}

impl Not for &FixedPoint {
    type Output = FixedPoint;

    fn not(self) -> FixedPoint {
        self.with_bits(self.bitmask() ^ &self.bits)
    }
}

impl Shl<i64> for &FixedPoint {
    type Output = FixedPoint;

    fn shl(self, nbits: i64) -> FixedPoint {
        self.with_bits(self.shifted(nbits.saturating_neg()))
    }
}

impl Shr<i64> for &FixedPoint {
    type Output = FixedPoint;

    fn shr(self, nbits: i64) -> FixedPoint {
        self.with_bits(self.shifted(nbits))
    }
}

impl ShlAssign<i64> for FixedPoint {
    fn shl_assign(&mut self, nbits: i64) {
        self.bits = self.shifted(nbits.saturating_neg());
    }
}

impl ShrAssign<i64> for FixedPoint {
    fn shr_assign(&mut self, nbits: i64) {
        self.bits = self.shifted(nbits);
    }
}

macro_rules! bitwise_op {
    ($trait:ident, $method:ident, $assign:ident, $assign_method:ident, $op:tt) => {
        impl $trait<&FixedPoint> for &FixedPoint {
            type Output = FixedPoint;

            fn $method(self, rhs: &FixedPoint) -> FixedPoint {
                self.with_bits((&self.bits $op &rhs.bits) & self.bitmask())
            }
        }

        impl $trait<&BigInt> for &FixedPoint {
            type Output = FixedPoint;

            fn $method(self, rhs: &BigInt) -> FixedPoint {
                self.with_bits((&self.bits $op rhs) & self.bitmask())
            }
        }

        impl $trait<u64> for &FixedPoint {
            type Output = FixedPoint;

            fn $method(self, rhs: u64) -> FixedPoint {
                $trait::$method(self, &BigInt::from(rhs))
            }
        }

        impl $trait<i64> for &FixedPoint {
            type Output = FixedPoint;

            fn $method(self, rhs: i64) -> FixedPoint {
                $trait::$method(self, &BigInt::from(rhs))
            }
        }

        impl $assign<&FixedPoint> for FixedPoint {
            fn $assign_method(&mut self, rhs: &FixedPoint) {
                self.bits = (&self.bits $op &rhs.bits) & self.bitmask();
            }
        }

        impl $assign<&BigInt> for FixedPoint {
            fn $assign_method(&mut self, rhs: &BigInt) {
                self.bits = (&self.bits $op rhs) & self.bitmask();
            }
        }

        impl $assign<u64> for FixedPoint {
            fn $assign_method(&mut self, rhs: u64) {
                $assign::$assign_method(self, &BigInt::from(rhs));
            }
        }

        impl $assign<i64> for FixedPoint {
            fn $assign_method(&mut self, rhs: i64) {
                $assign::$assign_method(self, &BigInt::from(rhs));
            }
        }
    };
}

bitwise_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bitwise_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bitwise_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

// --- Numeric comparison ---

impl PartialEq for FixedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_exact(other) == Ordering::Equal
    }
}

impl Eq for FixedPoint {}

impl PartialOrd for FixedPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_exact(other)
    }
}

impl PartialEq<f64> for FixedPoint {
    fn eq(&self, other: &f64) -> bool {
        self.cmp_f64(*other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<f64> for FixedPoint {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.cmp_f64(*other)
    }
}

impl PartialEq<i64> for FixedPoint {
    fn eq(&self, other: &i64) -> bool {
        self.cmp_int(*other) == Ordering::Equal
    }
}

impl PartialOrd<i64> for FixedPoint {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.cmp_int(*other))
    }
}
