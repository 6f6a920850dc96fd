// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Arbitrary-width Q format fixed-point numbers.

pub mod accessors;
pub mod bits;
pub mod format;
pub mod init;
pub mod ops;
pub mod overflow;
pub mod rounding;

use core::sync::atomic::{AtomicU64, Ordering};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::alert::{self, Channel, Notifier};
use crate::config::{Alert, Config};
use crate::context::Snapshot;

pub use bits::{BitField, BitView};
pub use init::Init;
pub use ops::Operand;
pub use overflow::ResizeOptions;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Next diagnostic serial number.
pub(crate) fn next_serial() -> u64 {
    NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// `2^k`.
pub(crate) fn pow2(k: u32) -> BigInt {
    BigInt::one() << (k as usize)
}

/// `2^width - 1`.
pub(crate) fn mask(width: u32) -> BigInt {
    pow2(width) - 1
}

/// Reduce `value` modulo `2^width` (two's-complement truncation).
pub(crate) fn wrap_to(value: &BigInt, width: u32) -> BigInt {
    value.mod_floor(&pow2(width))
}

/// Arithmetic right shift, rounding toward negative infinity.
pub(crate) fn shr_floor(value: &BigInt, k: u32) -> BigInt {
    value.div_floor(&pow2(k))
}

/// Two's-complement interpretation of the low `width` bits.
pub(crate) fn signed_view(bits: &BigInt, signed: bool, width: u32) -> BigInt {
    let low = wrap_to(bits, width);
    if signed && width > 0 && low.bit(u64::from(width - 1)) {
        low - pow2(width)
    } else {
        low
    }
}

/// Smallest raw value representable in a format, as a signed integer.
pub(crate) fn minimum_for(signed: bool, width: u32) -> BigInt {
    if signed {
        -pow2(width - 1)
    } else {
        BigInt::zero()
    }
}

/// Largest raw value representable in a format.
pub(crate) fn maximum_for(signed: bool, width: u32) -> BigInt {
    mask(width - u32::from(signed))
}

/// A two's-complement fixed-point number with `m` integer and `n` fractional bits.
///
/// `bits` always holds the raw pattern in `[0, 2^(m+n))`. The format and the
/// six properties only change through validating methods.
pub struct FixedPoint {
    pub(crate) bits: BigInt,
    pub(crate) signed: bool,
    pub(crate) m: u32,
    pub(crate) n: u32,
    pub(crate) config: Config,
    pub(crate) serial: u64,
    pub(crate) context: Vec<Snapshot>,
}

impl Clone for FixedPoint {
    /// Copy construction: same bits, format and properties, new serial number.
    fn clone(&self) -> Self {
        let copy = Self::from_parts(self.bits.clone(), self.signed, self.m, self.n, self.config);
        copy.log(format_args!("Copied from SN {}", self.serial));
        copy
    }
}

impl FixedPoint {
    /// Quick construction for internal results. The caller guarantees the invariants.
    pub(crate) fn from_parts(bits: BigInt, signed: bool, m: u32, n: u32, config: Config) -> Self {
        debug_assert!(m + n >= 1);
        debug_assert!(!signed || m >= 1);
        let width = m + n;
        Self {
            bits: wrap_to(&bits, width),
            signed,
            m,
            n,
            config,
            serial: next_serial(),
            context: Vec::new(),
        }
    }

    // --- Format ---

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Integer bit width.
    pub fn m(&self) -> u32 {
        self.m
    }

    /// Fractional bit width.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Total bit width, `m + n`.
    pub fn width(&self) -> u32 {
        self.m + self.n
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Diagnostic serial number.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// `Q{m}.{n}` for signed, `UQ{m}.{n}` for unsigned.
    pub fn qformat(&self) -> String {
        format!("{}Q{}.{}", if self.signed { "" } else { "U" }, self.m, self.n)
    }

    pub fn bitmask(&self) -> BigInt {
        mask(self.width())
    }

    /// Raw bits, always non-negative.
    pub fn raw_bits(&self) -> &BigInt {
        &self.bits
    }

    /// Bit accessor over the raw bits.
    pub fn bits(&self) -> BitView<'_> {
        BitView::new(&self.bits, self.signed, self.m, self.n)
    }

    /// Number of context scopes currently entered on this value.
    pub fn context_depth(&self) -> usize {
        self.context.len()
    }

    // --- Derived values ---

    pub(crate) fn minimum(&self) -> BigInt {
        minimum_for(self.signed, self.width())
    }

    pub(crate) fn maximum(&self) -> BigInt {
        maximum_for(self.signed, self.width())
    }

    /// Two's-complement interpretation of the raw bits.
    pub fn signed_integer(&self) -> BigInt {
        signed_view(&self.bits, self.signed, self.width())
    }

    /// True when the represented value is below zero.
    pub fn is_negative(&self) -> bool {
        self.signed && self.bits.bit(u64::from(self.width() - 1))
    }

    /// -1, 0 or 1.
    pub fn sign(&self) -> i32 {
        let value = self.signed_integer();
        if value.is_positive() {
            1
        } else if value.is_negative() {
            -1
        } else {
            0
        }
    }

    /// Saturated to the minimum or maximum of the format.
    pub fn clamped(&self) -> bool {
        self.bits == self.minimum().abs() || self.bits == self.maximum()
    }

    // --- Alerts ---

    pub(crate) fn overflow_notifier(&self, level: Option<Alert>) -> Notifier {
        Notifier::new(Channel::Overflow, level.unwrap_or(self.config.overflow_alert), self.serial)
    }

    pub(crate) fn owarn(&self, msg: impl core::fmt::Display) -> crate::error::Result<()> {
        self.overflow_notifier(None).notify(msg)
    }

    pub(crate) fn iwarn(&self, msg: impl core::fmt::Display) -> crate::error::Result<()> {
        Notifier::new(Channel::ImplicitCast, self.config.implicit_cast_alert, self.serial)
            .notify(msg)
    }

    pub(crate) fn mismatch_notifier(&self) -> Notifier {
        Notifier::new(Channel::Mismatch, self.config.mismatch_alert, self.serial)
    }

    pub(crate) fn log(&self, msg: core::fmt::Arguments<'_>) {
        alert::log(self.serial, msg);
    }
}
