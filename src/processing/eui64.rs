//! MAC to EUI-64 conversion and address synthesis.

use crate::error::{PlannerError, PlannerResult};
use crate::models::{Address128, InterfaceIdentifier, MacAddress};

/// Derive the EUI-64 interface identifier from a MAC address.
///
/// Inserts `FF FE` between the third and fourth octet and flips the
/// universal/local bit (0x02) of the first octet, per RFC 4291 §2.5.1.
///
/// # Examples
/// ```
/// use ipv6_subnet_planner::models::MacAddress;
/// use ipv6_subnet_planner::processing::mac_to_interface_identifier;
/// let mac = MacAddress::parse("00:11:22:33:44:55").unwrap();
/// let iid = mac_to_interface_identifier(&mac);
/// assert_eq!(iid.grouped(), "0211:22ff:fe33:4455");
/// ```
pub fn mac_to_interface_identifier(mac: &MacAddress) -> InterfaceIdentifier {
    let m = mac.octets();
    InterfaceIdentifier::from_bytes([
        m[0] ^ 0x02,
        m[1],
        m[2],
        0xff,
        0xfe,
        m[3],
        m[4],
        m[5],
    ])
}

/// Append an interface identifier to a /64 prefix, producing the full
/// address.
///
/// `prefix_text` must carry a literal `/64` suffix. If its address portion
/// already ends in `::` the identifier is appended directly, otherwise a
/// `::` marker is inserted first; either way the identifier lands in the
/// low 64 bits.
pub fn synthesize_address(
    prefix_text: &str,
    iid: &InterfaceIdentifier,
) -> PlannerResult<Address128> {
    let trimmed = prefix_text.trim();
    if !trimmed.ends_with("/64") {
        return Err(PlannerError::PrefixMustBeSlash64(trimmed.to_string()));
    }

    let prefix_part = match trimmed.split_once('/') {
        Some((addr, _)) => addr,
        None => trimmed,
    };

    let candidate = if prefix_part.ends_with("::") {
        format!("{prefix_part}{}", iid.grouped())
    } else {
        format!("{prefix_part}::{}", iid.grouped())
    };

    Address128::parse(&candidate)
}
