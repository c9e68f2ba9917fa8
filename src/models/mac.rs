//! MAC address and EUI-64 interface identifier models.

use crate::error::{PlannerError, PlannerResult};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // Six 2-hex-digit groups, colon or hyphen delimited.
    static ref MAC_PATTERN: Regex =
        Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("Invalid Regex?");
}

/// A 48-bit MAC address.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Parse colon- or hyphen-delimited MAC text.
    ///
    /// # Examples
    /// ```
    /// use ipv6_subnet_planner::models::MacAddress;
    /// assert!(MacAddress::parse("00:11:22:33:44:55").is_ok());
    /// assert!(MacAddress::parse("00-11-22-33-44-55").is_ok());
    /// assert!(MacAddress::parse("00:11:22:33:44").is_err());
    /// ```
    pub fn parse(text: &str) -> PlannerResult<MacAddress> {
        let trimmed = text.trim();
        if !MAC_PATTERN.is_match(trimmed) {
            return Err(PlannerError::MacFormat(trimmed.to_string()));
        }

        let hex: String = trimmed.chars().filter(|c| c.is_ascii_hexdigit()).collect();
        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            // the regex guarantees 12 hex digits
            *octet = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| PlannerError::MacFormat(trimmed.to_string()))?;
        }
        Ok(MacAddress(octets))
    }

    /// The six raw octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl std::fmt::Display for MacAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:02x}", self.0.iter().format(":"))
    }
}

/// A 64-bit EUI-64 interface identifier derived from a MAC address.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct InterfaceIdentifier([u8; 8]);

impl InterfaceIdentifier {
    /// Wrap eight raw bytes as an interface identifier.
    pub fn from_bytes(bytes: [u8; 8]) -> InterfaceIdentifier {
        InterfaceIdentifier(bytes)
    }

    /// The eight raw bytes.
    pub fn bytes(&self) -> [u8; 8] {
        self.0
    }

    /// Low 64 bits of the synthesized address.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// Four colon-separated 16-bit hex groups, e.g. `0211:22ff:fe33:4455`.
    pub fn grouped(&self) -> String {
        self.0
            .chunks(2)
            .map(|pair| format!("{:02x}{:02x}", pair[0], pair[1]))
            .join(":")
    }
}

impl std::fmt::Display for InterfaceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.grouped())
    }
}

impl Serialize for InterfaceIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.grouped())
    }
}
