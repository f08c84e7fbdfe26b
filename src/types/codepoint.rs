//! Codepoint type and parsing.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{IconError, Result};

/// A glyph codepoint, rendered as uppercase hex without a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodePoint(u32);

impl CodePoint {
    /// Highest valid Unicode codepoint.
    pub const MAX: Self = Self(0x10FFFF);

    /// Default first glyph: the start of the Private Use Area plus one.
    pub const DEFAULT_FIRST: Self = Self(0xE001);

    /// Create a codepoint from its numeric value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The codepoint after this one, if still in range.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self).filter(|c| *c <= Self::MAX)
    }

    /// Parse a hex codepoint string.
    ///
    /// Accepts `E001`, `e001`, `0xE001` and `U+E001`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .or_else(|| s.strip_prefix("U+"))
            .or_else(|| s.strip_prefix("u+"))
            .unwrap_or(s);

        let value = u32::from_str_radix(hex, 16).map_err(|_| IconError::Parse {
            message: format!("Invalid codepoint: \"{}\"", s),
            help: Some("Codepoints are hexadecimal, e.g. E001 or 0xE001".to_string()),
        })?;

        Self::checked(value).ok_or_else(|| IconError::Parse {
            message: format!("Codepoint out of range: {}", s),
            help: Some("Codepoints must not exceed 10FFFF".to_string()),
        })
    }

    fn checked(value: u32) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }
}

impl Default for CodePoint {
    fn default() -> Self {
        Self::DEFAULT_FIRST
    }
}

impl FromStr for CodePoint {
    type Err = IconError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl Serialize for CodePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CodePoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(CodePointVisitor)
    }
}

/// Accepts hex strings (glyph maps, YAML) and plain integers (inline config).
struct CodePointVisitor;

impl<'de> Visitor<'de> for CodePointVisitor {
    type Value = CodePoint;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a hex codepoint string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<CodePoint, E> {
        CodePoint::from_hex(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<CodePoint, E> {
        u32::try_from(v)
            .ok()
            .and_then(CodePoint::checked)
            .ok_or_else(|| E::custom(format!("codepoint out of range: {:#X}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<CodePoint, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("codepoint must not be negative: {}", v)))
            .and_then(|v| self.visit_u64(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_plain() {
        assert_eq!(CodePoint::from_hex("E001").unwrap(), CodePoint::new(0xE001));
        assert_eq!(CodePoint::from_hex("f000").unwrap(), CodePoint::new(0xF000));
    }

    #[test]
    fn test_from_hex_prefixed() {
        assert_eq!(CodePoint::from_hex("0xE001").unwrap(), CodePoint::new(0xE001));
        assert_eq!(CodePoint::from_hex("U+E001").unwrap(), CodePoint::new(0xE001));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(CodePoint::from_hex("").is_err());
        assert!(CodePoint::from_hex("XYZ").is_err());
        assert!(CodePoint::from_hex("110000").is_err());
    }

    #[test]
    fn test_display_uppercase_no_prefix() {
        assert_eq!(CodePoint::new(0xe001).to_string(), "E001");
        assert_eq!(CodePoint::new(0x1F600).to_string(), "1F600");
    }

    #[test]
    fn test_next() {
        assert_eq!(CodePoint::new(0xE001).next(), Some(CodePoint::new(0xE002)));
        assert_eq!(CodePoint::MAX.next(), None);
    }

    #[test]
    fn test_deserialize_string_and_integer() {
        let from_str: CodePoint = serde_json::from_str("\"E00A\"").unwrap();
        let from_int: CodePoint = serde_json::from_str("61450").unwrap();
        assert_eq!(from_str, CodePoint::new(0xE00A));
        assert_eq!(from_int, CodePoint::new(0xF00A));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<CodePoint>("-1").is_err());
    }

    #[test]
    fn test_serialize_as_hex_string() {
        let json = serde_json::to_string(&CodePoint::new(0xE001)).unwrap();
        assert_eq!(json, "\"E001\"");
    }
}
