//! IPv6 network model with derived boundary queries.

use super::ipv6::{normalize_input, prefix_mask, Address128, MAX_PREFIX};
use crate::error::{PlannerError, PlannerResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Decimal rendering of 2^128, the address count of a /0 network. The
/// count accessors return `None` for this one value since it does not fit
/// in `u128`.
pub const FULL_SPACE_COUNT: &str = "340282366920938463463374607431768211456";

/// An IPv6 network as a (base address, prefix length) pair.
///
/// Construction is non-strict: host bits in the supplied address are
/// silently masked when deriving the network address, so `2026:db8::5/64`
/// is accepted and yields network `2026:db8::/64`.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Network {
    base: Address128,
    prefix: u8,
}

impl Network {
    /// Build a [`Network`] from address text and a prefix length.
    ///
    /// # Arguments
    /// * `address_text` - raw address text; bracketed forms and `/prefix`
    ///   suffixes are stripped before parsing
    /// * `prefix` - prefix length, 0..=128
    pub fn new(address_text: &str, prefix: u16) -> PlannerResult<Network> {
        if prefix > MAX_PREFIX as u16 {
            return Err(PlannerError::PrefixRange(prefix));
        }
        let base = Address128::parse(address_text)?;
        let network = Network {
            base,
            prefix: prefix as u8,
        };
        log::debug!(
            "Network::new({}/{prefix}) -> {network}",
            normalize_input(address_text)
        );
        Ok(network)
    }

    /// Build a [`Network`] directly from an already-parsed address.
    pub fn from_address(base: Address128, prefix: u8) -> PlannerResult<Network> {
        if prefix > MAX_PREFIX {
            return Err(PlannerError::PrefixRange(prefix as u16));
        }
        Ok(Network { base, prefix })
    }

    /// The address the network was constructed from, host bits intact.
    pub fn base_address(&self) -> Address128 {
        self.base
    }

    /// Prefix length in bits.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of host bits (128 - prefix).
    pub fn host_bits(&self) -> u8 {
        MAX_PREFIX - self.prefix
    }

    /// Network address: the base address with host bits cleared.
    pub fn network_address(&self) -> Address128 {
        // prefix is validated at construction, the mask cannot fail
        let mask = prefix_mask(self.prefix).unwrap_or(u128::MAX);
        Address128::from(self.base.value() & mask)
    }

    /// Highest address in the network (network + 2^(128-prefix) - 1).
    pub fn broadcast_address(&self) -> Address128 {
        Address128::from(self.network_address().value() | self.host_mask())
    }

    /// Total address count, `None` meaning exactly 2^128 (a /0 network).
    pub fn address_count(&self) -> Option<u128> {
        if self.prefix == 0 {
            None
        } else {
            Some(1u128 << self.host_bits())
        }
    }

    /// Usable host count per the /127 and /128 policy:
    /// /128 has one host, /127 has two (RFC 6164), everything else
    /// excludes the network and broadcast addresses.
    pub fn usable_host_count(&self) -> u128 {
        match self.prefix {
            128 => 1,
            127 => 2,
            // 2^(128-p) - 2 fits u128 for every p <= 126, including /0
            0 => u128::MAX - 1,
            _ => (1u128 << self.host_bits()) - 2,
        }
    }

    /// Whether `addr` falls inside this network's address range.
    pub fn contains(&self, addr: Address128) -> bool {
        self.network_address() <= addr && addr <= self.broadcast_address()
    }

    /// Offset of `addr` from the network address.
    ///
    /// # Returns
    /// * `Ok(offset)` - 0-based distance from the network address
    /// * `Err(AddressNotInNetwork)` - if `addr` is outside the range
    pub fn offset_of(&self, addr: Address128) -> PlannerResult<u128> {
        if !self.contains(addr) {
            return Err(PlannerError::AddressNotInNetwork {
                address: addr.compressed(),
                network: self.to_string(),
            });
        }
        Ok(addr.value() - self.network_address().value())
    }

    /// Exploded `address/prefix` form.
    pub fn exploded(&self) -> String {
        format!("{}/{}", self.network_address().exploded(), self.prefix)
    }

    fn host_mask(&self) -> u128 {
        if self.prefix == 0 {
            u128::MAX
        } else {
            !(prefix_mask(self.prefix).unwrap_or(u128::MAX))
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.network_address().compressed(), self.prefix)
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&format!("{}/{}", self.network_address().exploded(), self.prefix))
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Network, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let (addr, prefix) = s
            .rsplit_once('/')
            .ok_or_else(|| serde::de::Error::custom(format!("invalid CIDR format: {s}")))?;
        let prefix: u16 = prefix
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid prefix length: {prefix}")))?;
        Network::new(addr, prefix).map_err(serde::de::Error::custom)
    }
}
