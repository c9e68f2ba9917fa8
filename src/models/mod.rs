//! Domain models for IPv6 subnet planning.
//!
//! This module contains the core data structures used throughout the engine:
//! - [`Address128`] - immutable 128-bit IPv6 address value
//! - [`Network`] - (base address, prefix length) pair with derived boundaries
//! - [`MacAddress`] and [`InterfaceIdentifier`] - EUI-64 inputs and outputs

mod ipv6;
mod mac;
mod network;

// Re-export public types
pub use ipv6::{normalize_input, prefix_mask, Address128, MAX_PREFIX};
pub use mac::{InterfaceIdentifier, MacAddress};
pub use network::{Network, FULL_SPACE_COUNT};
