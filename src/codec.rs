// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Attribute-triple serialization.
//!
//! A value is captured as `(properties, (signed, m, n), hex bits)`. Decoding
//! goes back through the string-literal constructor so it is validated like
//! any other literal. JSON input may also carry the bits as a plain integer,
//! as long as it fits in a `u64`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Config, Options};
use crate::error::{FixedPointError, Result};
use crate::fxp::FixedPoint;

/// Serializable state of a [`FixedPoint`]: properties, Q format, `0x` bits.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Attributes(pub Config, pub (bool, u32, u32), pub String);

impl FixedPoint {
    pub fn attributes(&self) -> Attributes {
        Attributes(
            self.config,
            (self.signed, self.m, self.n),
            format!("0x{}", self.bits.to_str_radix(16)),
        )
    }

    /// Rebuild a value; it gets a fresh serial number.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self> {
        let Attributes(config, (signed, m, n), bits) = attributes;
        FixedPoint::new(bits.as_str(), Options::new().format(*signed, *m, *n).config(*config))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.attributes()).map_err(serialization)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(json).map_err(serialization)?;
        if let Some(bits) = value.get_mut(2) {
            if let Some(int) = bits.as_u64() {
                *bits = Value::String(format!("0x{:x}", int));
            }
        }
        let attributes: Attributes = serde_json::from_value(value).map_err(serialization)?;
        Self::from_attributes(&attributes)
    }

    /// Compact binary encoding of [`FixedPoint::attributes`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self.attributes(), bincode::config::standard())
            .map_err(|e| FixedPointError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (attributes, _): (Attributes, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| FixedPointError::Serialization(e.to_string()))?;
        Self::from_attributes(&attributes)
    }
}

fn serialization(e: serde_json::Error) -> FixedPointError {
    FixedPointError::Serialization(e.to_string())
}
