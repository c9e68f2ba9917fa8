//! Output formatting and file export.
//!
//! This module handles rendering and exporting enumeration results:
//! - [`export`] - ranged text/CSV export with progress and cancellation
//! - [`terminal`] - digit grouping and count display helpers

mod export;
mod terminal;

pub use export::{
    describe_subnet_total, export_hosts, export_subnets, ExportFormat, ExportProgress,
    ExportRange, ExportStatus, ProgressFn, PROGRESS_INTERVAL,
};
pub use terminal::{count_decimal, group_digits, grouped, grouped_count};
