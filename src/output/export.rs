//! Ranged file export with progress reporting and cooperative cancellation.
//!
//! Host and subnet enumerations can span billions of entries, so the
//! exporter writes through a buffered sink one item at a time, locates the
//! range start by direct offset arithmetic, polls the cancellation token
//! before every item, and reports progress every
//! [`PROGRESS_INTERVAL`] items. The sink is flushed on every exit path;
//! a cancelled export keeps everything written so far and returns
//! [`ExportStatus::CancelledPartial`].

use crate::cancel::CancelToken;
use crate::error::{PlannerError, PlannerResult};
use crate::models::Network;
use crate::output::terminal::{grouped, grouped_count};
use crate::processing::{HostRange, SubnetPlan};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Items between progress callbacks and cancellation-independent flushes.
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// UTF-8 byte-order marker written ahead of CSV output so spreadsheet
/// tools pick the right encoding.
const UTF8_BOM: &str = "\u{feff}";

/// CSV header: index, network address, prefix length, subnet end address,
/// full representation.
const CSV_HEADER: &str = "序号,网络地址,前缀长度,子网结束地址,完整表示";

/// Export sink format.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum ExportFormat {
    Text,
    Csv,
}

impl ExportFormat {
    /// Pick a format from a file extension, defaulting to text.
    pub fn from_path(path: &Path) -> ExportFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Text,
        }
    }
}

/// A validated 1-based inclusive index range into an enumeration.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub struct ExportRange {
    start: u128,
    end: u128,
}

impl ExportRange {
    /// Validate `start..=end` against the total available item count
    /// (`None` meaning 2^128 items).
    pub fn new(start: u128, end: u128, total: Option<u128>) -> PlannerResult<ExportRange> {
        if start == 0 {
            return Err(PlannerError::ExportRange(
                "start index must be >= 1".to_string(),
            ));
        }
        if start > end {
            return Err(PlannerError::ExportRange(format!(
                "start {start} greater than end {end}"
            )));
        }
        if let Some(total) = total {
            if end > total {
                return Err(PlannerError::ExportRange(format!(
                    "end {end} exceeds available count {total}"
                )));
            }
        }
        Ok(ExportRange { start, end })
    }

    pub fn start(&self) -> u128 {
        self.start
    }

    pub fn end(&self) -> u128 {
        self.end
    }

    /// Number of items the range covers.
    pub fn count(&self) -> u128 {
        self.end - self.start + 1
    }
}

/// Progress snapshot handed to the caller at bounded cadence.
#[derive(Debug, Copy, Clone)]
pub struct ExportProgress {
    /// Items written so far.
    pub items_written: u64,
    /// Items the range asked for.
    pub total_requested: u128,
    /// Time since the export started.
    pub elapsed: Duration,
}

/// Terminal state of an export. Cancellation is a successful-but-partial
/// outcome, not a failure.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum ExportStatus {
    /// The full requested range was written.
    Completed { items_written: u64 },
    /// The caller cancelled; everything written so far is on disk.
    CancelledPartial { items_written: u64 },
}

impl ExportStatus {
    pub fn items_written(&self) -> u64 {
        match self {
            ExportStatus::Completed { items_written }
            | ExportStatus::CancelledPartial { items_written } => *items_written,
        }
    }
}

/// Progress callback type; invoked every [`PROGRESS_INTERVAL`] items and
/// once on completion.
pub type ProgressFn<'a> = &'a mut dyn FnMut(ExportProgress);

fn io_err(path: &Path, source: std::io::Error) -> PlannerError {
    PlannerError::ExportIo {
        path: path.display().to_string(),
        source,
    }
}

/// Export a range of usable host addresses as text.
///
/// The file carries a metadata header (network, total hosts, exported
/// range, count) followed by `index. exploded-address` lines; a /128
/// network writes its single address bare.
pub fn export_hosts(
    network: &Network,
    range: &ExportRange,
    path: &Path,
    progress: ProgressFn,
    token: &CancelToken,
) -> PlannerResult<ExportStatus> {
    let total_hosts = network.usable_host_count();
    // re-validate against this source, the range may have been built elsewhere
    let range = ExportRange::new(range.start(), range.end(), Some(total_hosts))?;

    log::info!(
        "export_hosts {network} range {}..={} to {}",
        range.start(),
        range.end(),
        path.display()
    );

    let file = File::create(path).map_err(|e| io_err(path, e))?;
    let mut writer = BufWriter::new(file);

    let header = format!(
        "网络: {}\n可用主机总数: {}\n导出范围: 第 {} 个到第 {} 个\n导出数量: {}\n{}\n\n",
        network.exploded(),
        grouped(total_hosts),
        grouped(range.start()),
        grouped(range.end()),
        grouped(range.count()),
        "=".repeat(60),
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| io_err(path, e))?;

    let started = Instant::now();
    let mut written: u64 = 0;
    let mut index = range.start();
    let result = loop {
        if index > range.end() {
            break ExportStatus::Completed {
                items_written: written,
            };
        }
        if token.is_cancelled() {
            break ExportStatus::CancelledPartial {
                items_written: written,
            };
        }

        let host = HostRange::host_at(network, index)?;
        let line = if network.prefix() == 128 {
            format!("{}\n", host.exploded())
        } else {
            format!("{index}. {}\n", host.exploded())
        };
        writer
            .write_all(line.as_bytes())
            .map_err(|e| io_err(path, e))?;
        written += 1;

        if written % PROGRESS_INTERVAL == 0 {
            progress(ExportProgress {
                items_written: written,
                total_requested: range.count(),
                elapsed: started.elapsed(),
            });
        }
        index += 1;
    };

    finish(writer, path, progress, written, range.count(), started)?;
    log_outcome(&result, path);
    Ok(result)
}

/// Export a range of a subnet division as text or CSV.
///
/// CSV output is UTF-8 with a byte-order marker, one data row per subnet;
/// text output is `index. exploded-network/prefix` lines.
pub fn export_subnets(
    plan: &SubnetPlan,
    range: &ExportRange,
    path: &Path,
    format: ExportFormat,
    progress: ProgressFn,
    token: &CancelToken,
) -> PlannerResult<ExportStatus> {
    let range = ExportRange::new(range.start(), range.end(), plan.subnet_count())?;

    log::info!(
        "export_subnets {}/{} range {}..={} as {format:?} to {}",
        plan.original(),
        plan.new_prefix(),
        range.start(),
        range.end(),
        path.display()
    );

    let file = File::create(path).map_err(|e| io_err(path, e))?;
    let mut writer = BufWriter::new(file);

    if format == ExportFormat::Csv {
        writer
            .write_all(format!("{UTF8_BOM}{CSV_HEADER}\r\n").as_bytes())
            .map_err(|e| io_err(path, e))?;
    }

    let started = Instant::now();
    let mut written: u64 = 0;
    let mut index = range.start();
    let result = loop {
        if index > range.end() {
            break ExportStatus::Completed {
                items_written: written,
            };
        }
        if token.is_cancelled() {
            break ExportStatus::CancelledPartial {
                items_written: written,
            };
        }

        let subnet = plan.subnet_at(index)?;
        let line = match format {
            ExportFormat::Csv => format!(
                "{index},{},{},{},{subnet}\r\n",
                subnet.network_address().compressed(),
                subnet.prefix(),
                subnet.broadcast_address().compressed(),
            ),
            ExportFormat::Text => format!("{index}. {}\n", subnet.exploded()),
        };
        writer
            .write_all(line.as_bytes())
            .map_err(|e| io_err(path, e))?;
        written += 1;

        if written % PROGRESS_INTERVAL == 0 {
            progress(ExportProgress {
                items_written: written,
                total_requested: range.count(),
                elapsed: started.elapsed(),
            });
        }
        index += 1;
    };

    finish(writer, path, progress, written, range.count(), started)?;
    log_outcome(&result, path);
    Ok(result)
}

// Flush on every exit path and emit the final progress snapshot.
fn finish(
    mut writer: BufWriter<File>,
    path: &Path,
    progress: ProgressFn,
    written: u64,
    total: u128,
    started: Instant,
) -> PlannerResult<()> {
    writer.flush().map_err(|e| io_err(path, e))?;
    progress(ExportProgress {
        items_written: written,
        total_requested: total,
        elapsed: started.elapsed(),
    });
    Ok(())
}

fn log_outcome(status: &ExportStatus, path: &Path) {
    match status {
        ExportStatus::Completed { items_written } => {
            log::info!(
                "export completed, {} items written to {}",
                grouped(*items_written as u128),
                path.display()
            );
        }
        ExportStatus::CancelledPartial { items_written } => {
            log::info!(
                "export cancelled, {} partial items kept in {}",
                grouped(*items_written as u128),
                path.display()
            );
        }
    }
}

/// Summarize a subnet count for log and prompt lines.
pub fn describe_subnet_total(plan: &SubnetPlan) -> String {
    grouped_count(plan.subnet_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::plan_division;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ipv6_planner_{name}_{}", std::process::id()))
    }

    #[test]
    fn test_export_range_validation() {
        assert!(ExportRange::new(0, 5, Some(10)).is_err());
        assert!(ExportRange::new(6, 5, Some(10)).is_err());
        assert!(ExportRange::new(1, 11, Some(10)).is_err());
        // a 2^128 total accepts any representable end
        assert!(ExportRange::new(1, u128::MAX, None).is_ok());

        let range = ExportRange::new(3, 7, Some(10)).unwrap();
        assert_eq!(range.count(), 5);
    }

    #[test]
    fn test_export_hosts_text_layout() {
        let net = Network::new("2026:db8::", 64).unwrap();
        let range = ExportRange::new(1, 3, None).unwrap();
        let path = temp_path("hosts.txt");

        let status = export_hosts(&net, &range, &path, &mut |_| {}, &CancelToken::new())
            .expect("export failed");
        assert_eq!(status, ExportStatus::Completed { items_written: 3 });

        let content = fs::read_to_string(&path).expect("read back failed");
        assert!(content.starts_with("网络: 2026:0db8:0000:0000:0000:0000:0000:0000/64\n"));
        assert!(content.contains("可用主机总数: 18,446,744,073,709,551,614\n"));
        assert!(content.contains("导出范围: 第 1 个到第 3 个\n"));
        assert!(content.contains("导出数量: 3\n"));
        assert!(content.contains("\n1. 2026:0db8:0000:0000:0000:0000:0000:0001\n"));
        assert!(content.ends_with("3. 2026:0db8:0000:0000:0000:0000:0000:0003\n"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_single_host_slash_128() {
        let net = Network::new("2026:db8::5", 128).unwrap();
        let range = ExportRange::new(1, 1, Some(1)).unwrap();
        let path = temp_path("host128.txt");

        export_hosts(&net, &range, &path, &mut |_| {}, &CancelToken::new())
            .expect("export failed");
        let content = fs::read_to_string(&path).unwrap();
        // /128 writes the bare address, no index
        assert!(content.ends_with("\n2026:0db8:0000:0000:0000:0000:0000:0005\n"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_subnets_csv() {
        let net = Network::new("2026:db8::", 64).unwrap();
        let plan = plan_division(&net, 4).unwrap();
        let range = ExportRange::new(1, 4, plan.subnet_count()).unwrap();
        let path = temp_path("subnets.csv");

        let status = export_subnets(
            &plan,
            &range,
            &path,
            ExportFormat::Csv,
            &mut |_| {},
            &CancelToken::new(),
        )
        .expect("export failed");
        assert_eq!(status.items_written(), 4);

        let content = fs::read_to_string(&path).unwrap();
        assert!(
            content.starts_with("\u{feff}序号,网络地址,前缀长度,子网结束地址,完整表示\r\n"),
            "missing BOM or header"
        );
        assert!(content.contains(
            "1,2026:db8::,66,2026:db8::3fff:ffff:ffff:ffff,2026:db8::/66\r\n"
        ));
        assert!(content.contains("2,2026:db8:0:0:4000::,66,"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_subnets_text() {
        let net = Network::new("2026:db8::", 64).unwrap();
        let plan = plan_division(&net, 2).unwrap();
        let range = ExportRange::new(1, 2, plan.subnet_count()).unwrap();
        let path = temp_path("subnets.txt");

        export_subnets(
            &plan,
            &range,
            &path,
            ExportFormat::Text,
            &mut |_| {},
            &CancelToken::new(),
        )
        .expect("export failed");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "1. 2026:0db8:0000:0000:0000:0000:0000:0000/65\n\
             2. 2026:0db8:0000:0000:8000:0000:0000:0000/65\n"
        );

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_cancellation_keeps_partial_output() {
        let net = Network::new("2026:db8::", 64).unwrap();
        let range = ExportRange::new(1, 10_000_000, None).unwrap();
        let path = temp_path("cancelled.txt");
        let token = CancelToken::new();

        // cancel from inside the first progress callback, so exactly
        // PROGRESS_INTERVAL items are on disk
        let cancel_from = token.clone();
        let status = export_hosts(
            &net,
            &range,
            &path,
            &mut |p| {
                if p.items_written >= PROGRESS_INTERVAL {
                    cancel_from.cancel();
                }
            },
            &token,
        )
        .expect("export failed");

        assert_eq!(
            status,
            ExportStatus::CancelledPartial {
                items_written: PROGRESS_INTERVAL
            }
        );

        let content = fs::read_to_string(&path).unwrap();
        let data_lines = content
            .lines()
            .filter(|l| l.contains(". 2026:0db8"))
            .count() as u64;
        assert_eq!(data_lines, PROGRESS_INTERVAL, "partial file line count");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_progress_cadence() {
        let net = Network::new("2026:db8::", 64).unwrap();
        let range = ExportRange::new(1, 250_000, None).unwrap();
        let path = temp_path("progress.txt");

        let mut snapshots = Vec::new();
        export_hosts(
            &net,
            &range,
            &path,
            &mut |p| snapshots.push(p.items_written),
            &CancelToken::new(),
        )
        .expect("export failed");

        // every 100k plus the final snapshot
        assert_eq!(snapshots, vec![100_000, 200_000, 250_000]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("x.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("x.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("x.txt")), ExportFormat::Text);
        assert_eq!(ExportFormat::from_path(Path::new("x")), ExportFormat::Text);
    }
}
