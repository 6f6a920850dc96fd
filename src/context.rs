// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Scoped context manager.
//!
//! `fp.configure()` stages property overrides; `enter()` saves the current
//! state on the value's own stack, applies the overrides through the
//! validating setters and hands back a [`Scope`] guard. Leaving the scope
//! restores the saved state unless `safe_retain` was set and the scope was
//! exited normally.

use core::ops::{Deref, DerefMut};

use num_bigint::BigInt;

use crate::config::{Alert, Config, Overflow, Rounding, StrBase};
use crate::error::{FixedPointError, Result};
use crate::fxp::FixedPoint;

/// Saved state of a value.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    bits: BigInt,
    signed: bool,
    m: u32,
    n: u32,
    config: Config,
    safe_retain: bool,
}

/// One property assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attr {
    Signed(bool),
    M(u32),
    N(u32),
    Overflow(Overflow),
    Rounding(Rounding),
    StrBase(StrBase),
    OverflowAlert(Alert),
    ImplicitCastAlert(Alert),
    MismatchAlert(Alert),
}

fn invalid_setting(name: &str, value: &str) -> FixedPointError {
    FixedPointError::InvalidValue(format!("Invalid {} setting: '{}'.", name, value))
}

impl Attr {
    /// Parse a named assignment.
    pub fn parse(name: &str, value: &str) -> Result<Attr> {
        if name.starts_with('_') {
            return Err(FixedPointError::ReadOnly(format!("Access to '{}' is prohibited.", name)));
        }

        let invalid = || invalid_setting(name, value);
        let width = || value.trim().parse::<u32>().map_err(|_| invalid());
        let alert = || value.parse::<Alert>().map_err(|_| invalid());

        Ok(match name {
            "signed" => Attr::Signed(match value.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(invalid()),
            }),
            "m" => Attr::M(width()?),
            "n" => Attr::N(width()?),
            "overflow" => Attr::Overflow(value.parse().map_err(|_| invalid())?),
            "rounding" => Attr::Rounding(value.parse().map_err(|_| invalid())?),
            "str_base" => Attr::StrBase(value.parse().map_err(|_| invalid())?),
            "overflow_alert" => Attr::OverflowAlert(alert()?),
            "implicit_cast_alert" => Attr::ImplicitCastAlert(alert()?),
            "mismatch_alert" => Attr::MismatchAlert(alert()?),
            "bits" => return Err(FixedPointError::ReadOnly("'bits' is read-only.".into())),
            _ => {
                return Err(FixedPointError::InvalidAttribute(format!(
                    "Invalid FixedPoint attribute '{}'.",
                    name
                )))
            }
        })
    }

    /// Assign through the validating setter.
    pub fn apply(self, fp: &mut FixedPoint) -> Result<()> {
        match self {
            Attr::Signed(signed) => fp.set_signed(signed)?,
            Attr::M(m) => fp.set_m(m)?,
            Attr::N(n) => fp.set_n(n)?,
            Attr::Overflow(overflow) => fp.set_overflow(overflow),
            Attr::Rounding(rounding) => fp.set_rounding(rounding),
            Attr::StrBase(str_base) => fp.set_str_base(str_base),
            Attr::OverflowAlert(alert) => fp.set_overflow_alert(alert),
            Attr::ImplicitCastAlert(alert) => fp.set_implicit_cast_alert(alert),
            Attr::MismatchAlert(alert) => fp.set_mismatch_alert(alert),
        }
        Ok(())
    }
}

impl FixedPoint {
    /// Stage temporary property overrides.
    pub fn configure(&mut self) -> Context<'_> {
        Context {
            fp: self,
            staged: Vec::new(),
            safe_retain: false,
        }
    }

    fn snapshot(&self, safe_retain: bool) -> Snapshot {
        Snapshot {
            bits: self.bits.clone(),
            signed: self.signed,
            m: self.m,
            n: self.n,
            config: self.config,
            safe_retain,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.bits = snapshot.bits;
        self.signed = snapshot.signed;
        self.m = snapshot.m;
        self.n = snapshot.n;
        self.config = snapshot.config;
    }

    /// Pop the innermost snapshot; restore it unless `retain`.
    fn leave(&mut self, retain: bool) {
        if let Some(snapshot) = self.context.pop() {
            if !(retain && snapshot.safe_retain) {
                self.restore(snapshot);
            }
        }
    }
}

/// Staged overrides, applied in call order on [`Context::enter`].
#[must_use]
pub struct Context<'a> {
    fp: &'a mut FixedPoint,
    staged: Vec<Attr>,
    safe_retain: bool,
}

impl<'a> Context<'a> {
    /// Keep the changes made inside the scope if it exits normally.
    pub fn safe_retain(mut self, retain: bool) -> Self {
        self.safe_retain = retain;
        self
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.staged.push(attr);
        self
    }

    /// Stage a property by name.
    pub fn set(self, name: &str, value: &str) -> Result<Self> {
        let attr = Attr::parse(name, value)?;
        Ok(self.attr(attr))
    }

    pub fn signed(self, signed: bool) -> Self {
        self.attr(Attr::Signed(signed))
    }

    pub fn m(self, m: u32) -> Self {
        self.attr(Attr::M(m))
    }

    pub fn n(self, n: u32) -> Self {
        self.attr(Attr::N(n))
    }

    pub fn overflow(self, overflow: Overflow) -> Self {
        self.attr(Attr::Overflow(overflow))
    }

    pub fn rounding(self, rounding: Rounding) -> Self {
        self.attr(Attr::Rounding(rounding))
    }

    pub fn str_base(self, str_base: StrBase) -> Self {
        self.attr(Attr::StrBase(str_base))
    }

    pub fn overflow_alert(self, alert: Alert) -> Self {
        self.attr(Attr::OverflowAlert(alert))
    }

    pub fn implicit_cast_alert(self, alert: Alert) -> Self {
        self.attr(Attr::ImplicitCastAlert(alert))
    }

    pub fn mismatch_alert(self, alert: Alert) -> Self {
        self.attr(Attr::MismatchAlert(alert))
    }

    /// Save the current state and apply the staged overrides.
    ///
    /// If an override fails the saved state is restored and the error returned.
    pub fn enter(self) -> Result<Scope<'a>> {
        let Context { fp, staged, safe_retain } = self;
        let snapshot = fp.snapshot(safe_retain);
        fp.context.push(snapshot);

        for attr in staged {
            if let Err(e) = attr.apply(fp) {
                fp.leave(false);
                return Err(e);
            }
        }
        Ok(Scope { fp, exited: false })
    }

    /// Run `f` inside the scope: exit normally on `Ok`, restore on `Err`.
    pub fn run<T>(self, f: impl FnOnce(&mut FixedPoint) -> Result<T>) -> Result<T> {
        let mut scope = self.enter()?;
        let ret = f(&mut *scope)?;
        scope.exit();
        Ok(ret)
    }
}

/// Guard of an entered context. Dropping it without [`Scope::exit`] restores the saved state.
pub struct Scope<'a> {
    fp: &'a mut FixedPoint,
    exited: bool,
}

impl Scope<'_> {
    /// Normal exit: keeps the changes with `safe_retain`, restores otherwise.
    pub fn exit(mut self) {
        self.exited = true;
        self.fp.leave(true);
    }
}

impl Deref for Scope<'_> {
    type Target = FixedPoint;

    fn deref(&self) -> &FixedPoint {
        self.fp
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut FixedPoint {
        self.fp
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if !self.exited {
            self.fp.leave(false);
        }
    }
}
