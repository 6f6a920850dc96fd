// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use num_bigint::BigInt;
use tracing::Level;

use crate::alert::{Channel, Notifier, ALERT_TARGET, LOG_TARGET};
use crate::tests::capture::{capture, warnings};
use crate::{Alert, FixedPoint, FixedPointError, Options, Overflow};

#[test]
fn test_warning_is_emitted_with_serial_and_channel() {
    let notifier = Notifier::new(Channel::Overflow, Alert::Warning, 42);
    let (ret, events) = capture(|| notifier.notify("something overflowed"));
    assert!(ret.is_ok());

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, Level::WARN);
    assert_eq!(event.target, ALERT_TARGET);
    assert_eq!(event.message, "something overflowed");
    assert_eq!(event.sn, Some(42));
    assert_eq!(event.channel.as_deref(), Some("overflow"));
}

#[test]
fn test_error_is_logged_then_returned() {
    let notifier = Notifier::new(Channel::ImplicitCast, Alert::Error, 7);
    let (ret, events) = capture(|| notifier.notify("lossy cast"));

    assert_eq!(ret, Err(FixedPointError::ImplicitCast("[SN7] lossy cast".into())));
    assert!(ret.unwrap_err().is_alert());

    let logged: Vec<_> = events.iter().filter(|e| e.level == Level::ERROR).collect();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].target, LOG_TARGET);
    assert_eq!(logged[0].message, "lossy cast");
    assert!(warnings(&events).is_empty());
}

#[test]
fn test_ignore_is_silent() {
    let notifier = Notifier::new(Channel::Mismatch, Alert::Ignore, 1);
    let (ret, events) = capture(|| notifier.notify("never seen"));
    assert!(ret.is_ok());
    assert!(events.iter().all(|e| e.level != Level::WARN && e.level != Level::ERROR));
}

#[test]
fn test_channel_errors() {
    for (channel, name) in [(Channel::Overflow, "overflow"), (Channel::Mismatch, "mismatch")] {
        assert_eq!(channel.to_string(), name);
        let err = Notifier::new(channel, Alert::Error, 3).notify("x").unwrap_err();
        assert!(err.is_alert());
        assert_eq!(err.to_string(), "[SN3] x");
    }
    assert!(!FixedPointError::Structural("s".into()).is_alert());
}

#[test]
fn test_float_overflow_warning_order() {
    // 1. Clamp with warnings
    let options = Options::new().format(false, 1, 5).overflow_alert(Alert::Warning);
    let (x, events) = capture(|| FixedPoint::new(2.23, options).unwrap());
    assert_eq!(x.raw_bits(), &BigInt::from(0b111111));

    let warned = warnings(&events);
    assert_eq!(warned.len(), 2);
    assert!(warned[0].contains("overflows in UQ1.5 format."));
    assert_eq!(warned[1], "Clamped to maximum.");

    // 2. Every warning carries the value's serial number
    let alerts: Vec<_> = events.iter().filter(|e| e.target == ALERT_TARGET).collect();
    assert!(alerts.iter().all(|e| e.sn == Some(x.serial())));

    // 3. Wrap
    let options = options.overflow(Overflow::Wrap);
    let (x, events) = capture(|| FixedPoint::new(2.23, options).unwrap());
    assert_eq!(x.raw_bits(), &BigInt::from(0b000111));
    assert_eq!(warnings(&events)[1], "Wrapped maximum.");
}

#[test]
fn test_ignored_alert_still_handles_overflow() {
    let options = Options::new().format(false, 8, 0).overflow_alert(Alert::Ignore);
    let (x, events) = capture(|| FixedPoint::new(300, options).unwrap());
    assert_eq!(x.to_f64(), 255.0);
    assert!(warnings(&events).is_empty());
}

#[test]
fn test_debug_log_carries_serial() {
    let (x, events) = capture(|| FixedPoint::new(1.5, Options::new()).unwrap());
    let debug: Vec<_> = events
        .iter()
        .filter(|e| e.target == LOG_TARGET && e.level == Level::DEBUG)
        .collect();
    assert!(!debug.is_empty());
    assert!(debug.iter().all(|e| e.sn == Some(x.serial())));
}
