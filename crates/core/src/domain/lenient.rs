//! Serde helpers for provider payloads.
//!
//! The provider follows the proto3 JSON mapping, where an explicit `null`
//! means "default value". Plain `#[serde(default)]` only covers missing
//! fields, so known fields that may arrive as `null` go through
//! [`null_as_default`].

use serde::{Deserialize, Deserializer};

pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
