//! IPv6 address-planning arithmetic engine.
//!
//! Computes network boundaries, enumerates usable hosts lazily, divides
//! networks into equal subnets, answers membership/offset queries, and
//! converts MAC addresses to EUI-64 interface identifiers. All arithmetic
//! is exact over the full 128-bit range; enumerations over astronomically
//! large spaces (a /64 has 2^64 hosts) are lazy, sliceable by direct
//! offset, and cancellable mid-range.
//!
//! The engine is stateless: every call takes values in and returns values
//! out. The only effect is the export sink, which is opened, flushed and
//! closed by the export functions themselves.

pub mod cancel;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

use serde::Serialize;
use std::path::Path;

pub use cancel::{CancelToken, Cancellable, SingleFlight};
pub use error::{PlannerError, PlannerResult};
pub use models::{Address128, InterfaceIdentifier, MacAddress, Network};
pub use output::{ExportFormat, ExportProgress, ExportRange, ExportStatus, ProgressFn};
pub use processing::{HostRange, SubnetIter, SubnetPlan};

/// Basic subnet facts for an (address, prefix) input.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkInfo {
    /// Exploded form of the address as entered.
    pub input_exploded: String,
    /// Network address (host bits cleared).
    pub network_address: Address128,
    /// Highest address in the network.
    pub broadcast_address: Address128,
    /// Prefix length.
    pub prefix: u8,
    /// Total address count as a decimal string (2^128 exceeds u128).
    pub address_count: String,
}

/// Membership facts for an address within its containing network.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    /// Exploded form of the queried address.
    pub address: String,
    /// Containing network.
    pub network: Network,
    /// Network address.
    pub network_address: Address128,
    /// Highest address in the network.
    pub broadcast_address: Address128,
    /// Usable host count under the /127 and /128 policy.
    pub usable_host_count: String,
    /// Number of host bits.
    pub host_bits: u8,
    /// 0-based distance from the network address.
    pub offset: u128,
    /// 1-based position rendered for display, e.g. `第 6 个地址`.
    pub position_display: String,
}

/// Result of an EUI-64 conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Eui64Result {
    /// MAC address as entered.
    pub mac: String,
    /// Derived interface identifier, four hex groups.
    pub interface_identifier: InterfaceIdentifier,
    /// Prefix portion of the input, without the /64 suffix.
    pub network_prefix: String,
    /// Synthesized full address.
    pub address: Address128,
}

/// Compute network boundaries and counts for an (address, prefix) pair.
pub fn compute_network_info(address: &str, prefix: u16) -> PlannerResult<NetworkInfo> {
    let network = Network::new(address, prefix)?;
    let input = Address128::parse(address)?;
    log::info!("compute_network_info({address}, /{prefix}) -> {network}");
    Ok(NetworkInfo {
        input_exploded: input.exploded(),
        network_address: network.network_address(),
        broadcast_address: network.broadcast_address(),
        prefix: network.prefix(),
        address_count: output::count_decimal(network.address_count()),
    })
}

/// Lazy usable-host sequence for an (address, prefix) pair. Bound it with
/// `take` or wrap it with [`HostRange::cancellable`].
pub fn generate_hosts(address: &str, prefix: u16) -> PlannerResult<HostRange> {
    let network = Network::new(address, prefix)?;
    Ok(HostRange::of(&network))
}

/// Direct-offset window over the usable hosts, 1-based inclusive.
pub fn slice_hosts(address: &str, prefix: u16, start: u128, end: u128) -> PlannerResult<HostRange> {
    let network = Network::new(address, prefix)?;
    HostRange::slice(&network, start, end)
}

/// Plan an equal-size division of a network into at least `count` subnets.
pub fn divide_subnet(address: &str, prefix: u16, count: u128) -> PlannerResult<SubnetPlan> {
    let network = Network::new(address, prefix)?;
    processing::plan_division(&network, count)
}

/// Locate an address inside its (non-strict) containing network.
pub fn subnet_membership(address: &str, prefix: u16) -> PlannerResult<Membership> {
    let network = Network::new(address, prefix)?;
    let addr = Address128::parse(address)?;
    let offset = network.offset_of(addr)?;
    Ok(Membership {
        address: addr.exploded(),
        network,
        network_address: network.network_address(),
        broadcast_address: network.broadcast_address(),
        usable_host_count: output::count_decimal(Some(network.usable_host_count())),
        host_bits: network.host_bits(),
        offset,
        // offset + 1 can reach 2^128 at the top of a /0, which
        // grouped_count renders from its None case
        position_display: format!("第 {} 个地址", output::grouped_count(offset.checked_add(1))),
    })
}

/// Convert a MAC address to its EUI-64 identifier and synthesize the full
/// address under a /64 prefix.
pub fn convert_eui64(mac_text: &str, prefix_text: &str) -> PlannerResult<Eui64Result> {
    let mac = MacAddress::parse(mac_text)?;
    let iid = processing::mac_to_interface_identifier(&mac);
    let address = processing::synthesize_address(prefix_text, &iid)?;
    let network_prefix = prefix_text
        .trim()
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string();
    log::info!("convert_eui64({mac}) -> {}", address.compressed());
    Ok(Eui64Result {
        mac: mac.to_string(),
        interface_identifier: iid,
        network_prefix,
        address,
    })
}

/// Per-session export coordination.
///
/// Exports run synchronously on the calling thread; a session rejects a
/// second overlapping export with [`PlannerError::ExportBusy`] while one
/// is live, mirroring a single "currently exporting" slot. Independent
/// sessions never share state.
#[derive(Debug, Default)]
pub struct PlannerSession {
    export_slot: SingleFlight,
}

impl PlannerSession {
    pub fn new() -> PlannerSession {
        PlannerSession::default()
    }

    /// Export a host range as text; see [`output::export_hosts`].
    pub fn export_hosts(
        &self,
        network: &Network,
        range: &ExportRange,
        path: &Path,
        progress: ProgressFn,
        token: &CancelToken,
    ) -> PlannerResult<ExportStatus> {
        let _guard = self
            .export_slot
            .try_acquire()
            .ok_or(PlannerError::ExportBusy)?;
        output::export_hosts(network, range, path, progress, token)
    }

    /// Export a subnet range as text or CSV; see [`output::export_subnets`].
    pub fn export_subnets(
        &self,
        plan: &SubnetPlan,
        range: &ExportRange,
        path: &Path,
        format: ExportFormat,
        progress: ProgressFn,
        token: &CancelToken,
    ) -> PlannerResult<ExportStatus> {
        let _guard = self
            .export_slot
            .try_acquire()
            .ok_or(PlannerError::ExportBusy)?;
        output::export_subnets(plan, range, path, format, progress, token)
    }
}
