//! IPv6 address value type and parsing utilities.
//!
//! Provides [`Address128`], an immutable 128-bit address value with
//! overflow-checked arithmetic, along with [`normalize_input`] which every
//! component uses to clean raw address text before parsing.

use crate::error::{PlannerError, PlannerResult};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv6Addr;
use std::str::FromStr;

/// Maximum IPv6 prefix length (128 bits).
pub const MAX_PREFIX: u8 = 128;

lazy_static! {
    // Matches the address inside a bracketed form like [2026:db8::1].
    static ref BRACKETED: Regex =
        Regex::new(r"\[([0-9a-fA-F:%]+)\]").expect("Invalid Regex?");
}

/// Strip surrounding whitespace, brackets and any trailing `/prefix` from
/// raw address text.
///
/// # Examples
/// ```
/// use ipv6_subnet_planner::models::normalize_input;
/// assert_eq!(normalize_input("[2026:db8::1]/64"), "2026:db8::1");
/// assert_eq!(normalize_input(" 2026:db8:: "), "2026:db8::");
/// ```
pub fn normalize_input(input: &str) -> String {
    let mut cleaned = input.trim().to_string();

    if let Some(caps) = BRACKETED.captures(&cleaned) {
        cleaned = caps[1].to_string();
    }

    match cleaned.split_once('/') {
        Some((addr, _prefix)) => addr.to_string(),
        None => cleaned,
    }
}

/// Convert a prefix length to a 128-bit network mask.
///
/// # Examples
/// ```
/// use ipv6_subnet_planner::models::prefix_mask;
/// assert_eq!(prefix_mask(0).unwrap(), 0);
/// assert_eq!(prefix_mask(128).unwrap(), u128::MAX);
/// assert_eq!(prefix_mask(64).unwrap(), 0xffff_ffff_ffff_ffff_0000_0000_0000_0000);
/// ```
pub fn prefix_mask(len: u8) -> PlannerResult<u128> {
    if len > MAX_PREFIX {
        Err(PlannerError::PrefixRange(len as u16))
    } else if len == 0 {
        Ok(0)
    } else {
        Ok(u128::MAX << (MAX_PREFIX - len))
    }
}

/// An immutable 128-bit IPv6 address value.
///
/// Arithmetic returns new values and fails with
/// [`PlannerError::OutOfRange`] instead of wrapping.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Address128(u128);

impl Address128 {
    /// Parse address text into an [`Address128`].
    ///
    /// The text is passed through [`normalize_input`] first, so bracketed
    /// forms and `/prefix` suffixes are accepted.
    pub fn parse(text: &str) -> PlannerResult<Address128> {
        let cleaned = normalize_input(text);
        let addr = Ipv6Addr::from_str(&cleaned)
            .map_err(|_| PlannerError::AddressFormat(text.trim().to_string()))?;
        Ok(Address128(u128::from(addr)))
    }

    /// The raw 128-bit value.
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Add an offset, failing with `OutOfRange` on overflow.
    pub fn checked_add(&self, offset: u128) -> PlannerResult<Address128> {
        self.0
            .checked_add(offset)
            .map(Address128)
            .ok_or_else(|| PlannerError::OutOfRange(format!("{} + {offset}", self.exploded())))
    }

    /// Subtract an offset, failing with `OutOfRange` on underflow.
    pub fn checked_sub(&self, offset: u128) -> PlannerResult<Address128> {
        self.0
            .checked_sub(offset)
            .map(Address128)
            .ok_or_else(|| PlannerError::OutOfRange(format!("{} - {offset}", self.exploded())))
    }

    /// Canonical exploded notation: eight zero-padded lowercase hex groups.
    ///
    /// # Examples
    /// ```
    /// use ipv6_subnet_planner::models::Address128;
    /// let a = Address128::parse("2026:db8::1").unwrap();
    /// assert_eq!(a.exploded(), "2026:0db8:0000:0000:0000:0000:0000:0001");
    /// ```
    pub fn exploded(&self) -> String {
        (0..8)
            .rev()
            .map(|group| format!("{:04x}", (self.0 >> (group * 16)) & 0xffff))
            .join(":")
    }

    /// Compressed notation with `::` shortening, as rendered by the
    /// standard library.
    pub fn compressed(&self) -> String {
        Ipv6Addr::from(self.0).to_string()
    }
}

impl From<u128> for Address128 {
    fn from(value: u128) -> Self {
        Address128(value)
    }
}

impl From<Ipv6Addr> for Address128 {
    fn from(addr: Ipv6Addr) -> Self {
        Address128(u128::from(addr))
    }
}

impl std::fmt::Display for Address128 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.compressed())
    }
}

impl Serialize for Address128 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.exploded())
    }
}

impl<'de> Deserialize<'de> for Address128 {
    fn deserialize<D>(deserializer: D) -> Result<Address128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address128::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_input() {
        assert_eq!(normalize_input("2026:db8::1"), "2026:db8::1");
        assert_eq!(normalize_input("  2026:db8::1  "), "2026:db8::1");
        assert_eq!(normalize_input("[2026:db8::1]"), "2026:db8::1");
        assert_eq!(normalize_input("[2026:db8::1]/64"), "2026:db8::1");
        assert_eq!(normalize_input("2026:db8::/48"), "2026:db8::");
    }

    #[test]
    fn test_prefix_mask() {
        assert_eq!(prefix_mask(0).unwrap(), 0);
        assert_eq!(prefix_mask(1).unwrap(), 1 << 127);
        assert_eq!(
            prefix_mask(64).unwrap(),
            0xffff_ffff_ffff_ffff_0000_0000_0000_0000
        );
        assert_eq!(prefix_mask(127).unwrap(), u128::MAX - 1);
        assert_eq!(prefix_mask(128).unwrap(), u128::MAX);
        assert!(prefix_mask(129).is_err());
    }

    #[test]
    fn test_parse_and_exploded() {
        let a = Address128::parse("2026:db8::1").expect("parse failed");
        assert_eq!(a.exploded(), "2026:0db8:0000:0000:0000:0000:0000:0001");
        assert_eq!(a.compressed(), "2026:db8::1");

        let zero = Address128::parse("::").expect("parse failed");
        assert_eq!(zero.value(), 0);
        assert_eq!(zero.exploded(), "0000:0000:0000:0000:0000:0000:0000:0000");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Address128::parse("not-an-address").is_err());
        assert!(Address128::parse("2026:db8::1::2").is_err());
        assert!(Address128::parse("192.168.1.1").is_err());
        assert!(Address128::parse("").is_err());
    }

    #[test]
    fn test_exploded_round_trip() {
        for text in ["::", "::1", "2026:db8::", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"] {
            let a = Address128::parse(text).expect("parse failed");
            let back = Address128::parse(&a.exploded()).expect("re-parse failed");
            assert_eq!(a, back, "round-trip failed for {text}");
        }
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Address128::parse("2026:db8::").unwrap();
        assert_eq!(a.checked_add(5).unwrap().compressed(), "2026:db8::5");
        assert_eq!(a.checked_add(5).unwrap().checked_sub(5).unwrap(), a);

        let max = Address128::from(u128::MAX);
        assert!(max.checked_add(1).is_err());
        let zero = Address128::from(0u128);
        assert!(zero.checked_sub(1).is_err());
    }

    #[test]
    fn test_ordering() {
        let a = Address128::parse("2026:db8::1").unwrap();
        let b = Address128::parse("2026:db8::2").unwrap();
        assert!(a < b);
        assert!(b > a);
        assert_eq!(a, Address128::parse("2026:0db8:0:0:0:0:0:0001").unwrap());
    }
}
