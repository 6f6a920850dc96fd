// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Alert channels.
//!
//! Each value carries three independent severities. A notification either
//! raises the channel's error (after logging it), emits a warning on the
//! [`ALERT_TARGET`] tracing target, or is dropped. Every message is tagged with
//! the serial number of the value that produced it.

use core::fmt;

use crate::config::Alert;
use crate::error::FixedPointError;

/// Tracing target for user-facing warnings.
pub const ALERT_TARGET: &str = "fixedpoint::alert";

/// Tracing target for the debug log.
pub const LOG_TARGET: &str = "fixedpoint::log";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Overflow,
    ImplicitCast,
    Mismatch,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Overflow => "overflow",
            Channel::ImplicitCast => "implicit_cast",
            Channel::Mismatch => "mismatch",
        }
    }

    fn error(self, msg: String) -> FixedPointError {
        match self {
            Channel::Overflow => FixedPointError::Overflow(msg),
            Channel::ImplicitCast => FixedPointError::ImplicitCast(msg),
            Channel::Mismatch => FixedPointError::Mismatch(msg),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A channel bound to a severity and the serial number of its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notifier {
    pub channel: Channel,
    pub level: Alert,
    pub serial: u64,
}

impl Notifier {
    pub fn new(channel: Channel, level: Alert, serial: u64) -> Self {
        Self { channel, level, serial }
    }

    /// Deliver `msg` according to the severity.
    pub fn notify(&self, msg: impl fmt::Display) -> Result<(), FixedPointError> {
        match self.level {
            Alert::Error => {
                let msg = msg.to_string();
                tracing::error!(
                    target: LOG_TARGET,
                    sn = self.serial,
                    channel = %self.channel,
                    "{}",
                    msg
                );
                Err(self.channel.error(format!("[SN{}] {}", self.serial, msg)))
            }
            Alert::Warning => {
                tracing::warn!(
                    target: ALERT_TARGET,
                    sn = self.serial,
                    channel = %self.channel,
                    "{}",
                    msg
                );
                Ok(())
            }
            Alert::Ignore => Ok(()),
        }
    }
}

/// Debug log line tagged with a serial number.
pub(crate) fn log(serial: u64, msg: fmt::Arguments<'_>) {
    tracing::debug!(target: LOG_TARGET, sn = serial, "{}", msg);
}
