//! Error taxonomy for the planning engine.
//!
//! Every failure path in the library maps to exactly one [`PlannerError`]
//! variant so callers can distinguish bad input from arithmetic overflow or
//! sink failures. Cancellation is not an error: a cancelled export returns
//! `ExportStatus::CancelledPartial` from the export module.

use thiserror::Error;

/// Errors that can occur during address planning operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Address text could not be parsed as an IPv6 address.
    #[error("invalid IPv6 address: {0}")]
    AddressFormat(String),

    /// Prefix length outside the valid 0..=128 range.
    #[error("prefix length /{0} outside 0-128")]
    PrefixRange(u16),

    /// Address lies outside the network's address range.
    #[error("address {address} not in network {network}")]
    AddressNotInNetwork { address: String, network: String },

    /// Requested subnet count must be at least 1.
    #[error("subnet count must be greater than 0")]
    SubnetCountInvalid,

    /// Requested subnet count cannot be reached before /128.
    #[error("cannot divide into {requested} subnets, maximum prefix /128 reached")]
    SubnetCountUnreachable { requested: u128 },

    /// MAC address text is not six colon- or hyphen-delimited hex pairs.
    #[error("invalid MAC address: {0}, expected XX:XX:XX:XX:XX:XX or XX-XX-XX-XX-XX-XX")]
    MacFormat(String),

    /// EUI-64 synthesis requires a /64 prefix.
    #[error("prefix must end in /64, got: {0}")]
    PrefixMustBeSlash64(String),

    /// 128-bit arithmetic overflowed or underflowed.
    #[error("128-bit address arithmetic out of range: {0}")]
    OutOfRange(String),

    /// Export range bounds are invalid for the source enumeration.
    #[error("invalid export range: {0}")]
    ExportRange(String),

    /// Another export is already running on this session.
    #[error("an export is already in progress")]
    ExportBusy,

    /// Writing to the export sink failed.
    #[error("export I/O error on {path}: {source}")]
    ExportIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for planning operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
