// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Property resolution between the two operands of a binary operation.

use core::fmt::Display;

use crate::alert::Notifier;
use crate::config::{Alert, Config, Overflow, Rounding, StrBase};
use crate::error::Result;
use crate::fxp::FixedPoint;

/// Merges the configurations of two operands into the result's configuration.
pub trait Resolver {
    fn resolve(&self, x: &FixedPoint, y: &FixedPoint) -> Result<Config>;
}

/// Default, stateless resolution protocol.
///
/// `mismatch_alert` is settled first (the more severe wins, announced once);
/// every later difference is announced at that resolved severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyResolver;

/// Unsigned pairs prefer `nearest` over `convergent`.
const UNSIGNED_ROUNDING: [Rounding; 6] = [
    Rounding::Nearest,
    Rounding::Convergent,
    Rounding::Down,
    Rounding::In,
    Rounding::Out,
    Rounding::Up,
];

fn announce<T: Display>(notifier: &Notifier, field: &str, a: T, b: T, chosen: T) -> Result<()> {
    notifier.notify(format!("Non-matching {} behaviors [{}, {}].", field, a, b))?;
    notifier.notify(format!("Using '{}'.", chosen))
}

/// First of `priority` that is either `a` or `b`.
fn pick<T: Copy + PartialEq>(priority: &[T], a: T, b: T) -> T {
    priority.iter().copied().find(|&p| p == a || p == b).unwrap_or(a)
}

impl PropertyResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolved `mismatch_alert` and the notifier later differences go through.
    fn mismatch_alert(&self, x: &FixedPoint, y: &FixedPoint) -> Result<(Alert, Notifier)> {
        let (a, b) = (x.config.mismatch_alert, y.config.mismatch_alert);
        if a == b {
            return Ok((a, x.mismatch_notifier()));
        }

        let severe = if a.severity() >= b.severity() { x } else { y };
        let alert = severe.config.mismatch_alert;
        announce(&severe.mismatch_notifier(), "mismatch_alert", a, b, alert)?;
        Ok((alert, severe.mismatch_notifier()))
    }
}

impl Resolver for PropertyResolver {
    fn resolve(&self, x: &FixedPoint, y: &FixedPoint) -> Result<Config> {
        let (cx, cy) = (&x.config, &y.config);

        // 1. mismatch_alert
        let (mismatch_alert, notifier) = self.mismatch_alert(x, y)?;

        // 2. overflow
        let overflow = if cx.overflow == cy.overflow {
            cx.overflow
        } else {
            announce(&notifier, "overflow", cx.overflow, cy.overflow, Overflow::Clamp)?;
            Overflow::Clamp
        };

        // 3. rounding
        let rounding = if cx.rounding == cy.rounding {
            cx.rounding
        } else {
            let priority: &[Rounding] = if x.signed || y.signed {
                &Rounding::ALL
            } else {
                &UNSIGNED_ROUNDING
            };
            let ret = pick(priority, cx.rounding, cy.rounding);
            announce(&notifier, "rounding", cx.rounding, cy.rounding, ret)?;
            ret
        };

        // 4. overflow_alert
        let overflow_alert = if cx.overflow_alert == cy.overflow_alert {
            cx.overflow_alert
        } else {
            let ret = pick(
                &[Alert::Error, Alert::Warning, Alert::Ignore],
                cx.overflow_alert,
                cy.overflow_alert,
            );
            announce(&notifier, "overflow_alert", cx.overflow_alert, cy.overflow_alert, ret)?;
            ret
        };

        // 5. implicit_cast_alert
        let implicit_cast_alert = if cx.implicit_cast_alert == cy.implicit_cast_alert {
            cx.implicit_cast_alert
        } else {
            let ret = pick(
                &[Alert::Warning, Alert::Error, Alert::Ignore],
                cx.implicit_cast_alert,
                cy.implicit_cast_alert,
            );
            announce(
                &notifier,
                "implicit_cast_alert",
                cx.implicit_cast_alert,
                cy.implicit_cast_alert,
                ret,
            )?;
            ret
        };

        // 6. str_base, silently
        let str_base = if cx.str_base == cy.str_base { cx.str_base } else { StrBase::Hex };

        Ok(Config {
            str_base,
            mismatch_alert,
            overflow_alert,
            implicit_cast_alert,
            overflow,
            rounding,
        })
    }
}
