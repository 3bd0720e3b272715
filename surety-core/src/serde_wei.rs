//! Serde helper for `Wei` amounts.
//!
//! Amounts exceed the 64-bit integers TOML and many JSON consumers
//! support, so they are written as decimal strings. Plain integers are
//! still accepted on input.
//!
//! ```ignore
//! #[serde(with = "surety_core::serde_wei")]
//! pub minimum_funding: Wei,
//! ```

use crate::types::Wei;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize<S: Serializer>(value: &Wei, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wei, D::Error> {
    deserializer.deserialize_any(WeiVisitor)
}

struct WeiVisitor;

impl<'de> Visitor<'de> for WeiVisitor {
    type Value = Wei;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative amount as integer or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wei, E> {
        Ok(v as Wei)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Wei, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Wei, E> {
        Wei::try_from(v).map_err(|_| E::custom(format!("amount must not be negative: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Wei, E> {
        v.trim()
            .replace('_', "")
            .parse::<Wei>()
            .map_err(|e| E::custom(format!("invalid amount {v:?}: {e}")))
    }
}
