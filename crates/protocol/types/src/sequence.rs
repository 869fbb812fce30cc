//! Serde helpers for coordinating-ledger sequence numbers.
//!
//! The coordinating ledger encodes sequence numbers and most other integers as base-10
//! strings (e.g. `"1024"`). Some nodes return plain JSON numbers for the same fields, and a
//! few return `0x`-prefixed quantities. All three are accepted on input; output is always
//! the base-10 string form.

use serde::{Deserialize, Deserializer, Serializer, de};

/// Serializes a `u64` as a base-10 string.
pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Deserializes a `u64` from a base-10 string, a `0x` quantity string, or a JSON number.
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => parse(&s).map_err(de::Error::custom),
    }
}

/// Parses a sequence number from its string form.
///
/// Base-10 unless the string carries a `0x` prefix.
pub fn parse(s: &str) -> Result<u64, core::num::ParseIntError> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}
