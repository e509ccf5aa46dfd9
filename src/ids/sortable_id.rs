//! 64-bit sortable identifier with a sort-stable string encoding.

use once_cell::sync::Lazy;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ids::IdGenerator;

static GENERATOR: Lazy<IdGenerator> = Lazy::new(IdGenerator::default);

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the fixed-width string encoding. 36^13 > 2^64, so every
/// identifier fits, and the fixed width makes lexicographic order equal to
/// numeric order.
const ENCODED_LEN: usize = 13;

/// A 64-bit identifier whose numeric order is chronological.
///
/// The zero value is the "empty" sentinel: a field holding it is treated as
/// unassigned and gets a freshly generated identifier at write time. The
/// string form is fixed-width base-36, so the zero sentinel renders as a run
/// of `'0'` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortableId(i64);

impl SortableId {
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Generate a fresh identifier from the process-wide generator.
    pub fn generate() -> Self {
        GENERATOR.next_id()
    }

    pub fn number(&self) -> i64 {
        self.0
    }

    /// True for the zero sentinel meaning "not yet assigned".
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Fixed-width base-36 encoding. Lexicographic order of the result
    /// matches numeric order of the identifiers.
    pub fn as_string(&self) -> String {
        let mut buf = [b'0'; ENCODED_LEN];
        let mut n = self.0 as u64;
        let mut i = ENCODED_LEN;
        while n > 0 {
            i -= 1;
            buf[i] = ALPHABET[(n % 36) as usize];
            n /= 36;
        }
        // buf is ASCII by construction
        String::from_utf8(buf.to_vec()).unwrap_or_default()
    }

    /// Decode a base-36 string, fixed-width or not. Uppercase digits are
    /// accepted for robustness against hand-edited data.
    pub fn decode(input: &str) -> Result<Self, ParseSortableIdError> {
        if input.is_empty() {
            return Err(ParseSortableIdError::Empty);
        }

        let mut acc: u64 = 0;
        for c in input.chars() {
            let digit = match c {
                '0'..='9' => c as u64 - '0' as u64,
                'a'..='z' => c as u64 - 'a' as u64 + 10,
                'A'..='Z' => c as u64 - 'A' as u64 + 10,
                _ => return Err(ParseSortableIdError::InvalidCharacter(c)),
            };
            acc = acc
                .checked_mul(36)
                .and_then(|v| v.checked_add(digit))
                .ok_or(ParseSortableIdError::Overflow)?;
        }

        Ok(Self(acc as i64))
    }
}

/// Failure decoding a [`SortableId`] from its string form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSortableIdError {
    #[error("Empty identifier string")]
    Empty,

    #[error("Invalid identifier character '{0}'")]
    InvalidCharacter(char),

    #[error("Identifier string does not fit in 64 bits")]
    Overflow,
}

impl fmt::Display for SortableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromStr for SortableId {
    type Err = ParseSortableIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for SortableId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for SortableId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = SortableId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a base-36 identifier string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                SortableId::decode(v).map_err(de::Error::custom)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(SortableId::new(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_renders_as_zero_run() {
        let id = SortableId::new(0);
        assert_eq!(id.as_string(), "0".repeat(ENCODED_LEN));
        assert!(id.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        for n in [1i64, 36, 1234567890123, i64::MAX] {
            let id = SortableId::new(n);
            assert_eq!(SortableId::decode(&id.as_string()).unwrap(), id);
        }
    }

    #[test]
    fn test_decode_unpadded() {
        assert_eq!(SortableId::decode("z").unwrap().number(), 35);
        assert_eq!(SortableId::decode("10").unwrap().number(), 36);
        assert_eq!(SortableId::decode("Z").unwrap().number(), 35);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(
            SortableId::decode("abc!"),
            Err(ParseSortableIdError::InvalidCharacter('!'))
        );
        assert_eq!(SortableId::decode(""), Err(ParseSortableIdError::Empty));
    }

    #[test]
    fn test_string_order_matches_numeric_order() {
        let mut numbers = vec![0i64, 1, 35, 36, 1000, 46656, 1234567890123];
        numbers.sort_unstable();

        let mut strings: Vec<String> =
            numbers.iter().map(|n| SortableId::new(*n).as_string()).collect();
        let sorted = strings.clone();
        strings.sort();
        assert_eq!(strings, sorted);
    }

    #[test]
    fn test_generate_is_fresh_and_ordered() {
        let a = SortableId::generate();
        let b = SortableId::generate();
        assert!(!a.is_empty());
        assert!(b > a);
        assert!(b.as_string() > a.as_string());
    }

    #[test]
    fn test_serde_string_form() {
        let id = SortableId::new(36);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0000000000010\"");
        let back: SortableId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
