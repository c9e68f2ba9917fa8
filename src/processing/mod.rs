//! Planning computations over the domain models.
//!
//! This module contains the enumeration and arithmetic engines:
//! - [`hosts`] - lazy usable-host enumeration with slicing
//! - [`divide`] - subnet division planning and enumeration
//! - [`eui64`] - MAC to EUI-64 conversion and address synthesis

mod divide;
mod eui64;
mod hosts;

// Re-export public functions and types
pub use divide::{plan_division, SubnetIter, SubnetPlan};
pub use eui64::{mac_to_interface_identifier, synthesize_address};
pub use hosts::HostRange;
