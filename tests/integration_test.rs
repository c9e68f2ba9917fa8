//! Integration tests for ipv6-subnet-planner
//!
//! These tests verify the complete workflows: network info, host
//! enumeration and slicing, subnet division, EUI-64 conversion, and
//! ranged export with progress and cancellation.

use ipv6_subnet_planner::output::{export_subnets, PROGRESS_INTERVAL};
use ipv6_subnet_planner::{
    compute_network_info, convert_eui64, divide_subnet, generate_hosts, slice_hosts,
    subnet_membership, CancelToken, ExportFormat, ExportRange, ExportStatus, Network,
    PlannerError, PlannerSession,
};
use std::fs;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ipv6_planner_it_{name}_{}", std::process::id()))
}

#[test]
fn test_network_info_workflow() {
    let info = compute_network_info("[2026:db8::5]/64", 64).expect("Failed to compute info");

    assert_eq!(info.input_exploded, "2026:0db8:0000:0000:0000:0000:0000:0005");
    assert_eq!(info.network_address.exploded(), "2026:0db8:0000:0000:0000:0000:0000:0000");
    assert_eq!(info.broadcast_address.exploded(), "2026:0db8:0000:0000:ffff:ffff:ffff:ffff");
    assert_eq!(info.address_count, "18446744073709551616", "a /64 holds 2^64 addresses");

    // the /0 count must not truncate
    let info = compute_network_info("::", 0).expect("Failed to compute /0 info");
    assert_eq!(info.address_count, "340282366920938463463374607431768211456");
}

#[test]
fn test_host_policies() {
    let p127: Vec<String> = generate_hosts("2026:db8::", 127)
        .expect("Failed to enumerate /127")
        .map(|a| a.compressed())
        .collect();
    assert_eq!(p127, vec!["2026:db8::1", "2026:db8::2"], "RFC 6164 pair");

    let p128: Vec<String> = generate_hosts("2026:db8::5", 128)
        .expect("Failed to enumerate /128")
        .map(|a| a.compressed())
        .collect();
    assert_eq!(p128, vec!["2026:db8::5"], "RFC 4291 single host");
}

#[test]
fn test_slice_hosts_is_direct() {
    // slicing a /64 must cost O(window), not O(offset): position the
    // window a billion addresses in and count iterator steps
    let window = slice_hosts("2026:db8::", 64, 1_000_000_000, 1_000_000_002)
        .expect("Failed to slice");
    assert_eq!(window.remaining(), 3, "slice is bounded before iteration");

    let mut steps = 0u32;
    let hosts: Vec<String> = window
        .map(|a| {
            steps += 1;
            a.compressed()
        })
        .collect();
    assert_eq!(steps, 3, "no skipped-element traversal");
    assert_eq!(hosts[0], "2026:db8::3b9a:ca00");
}

#[test]
fn test_divide_and_enumerate_workflow() {
    let plan = divide_subnet("2026:db8::", 64, 8).expect("Failed to plan");
    assert_eq!(plan.new_prefix(), 67);
    assert_eq!(plan.subnet_count(), Some(8));

    let subnets: Vec<String> = plan.subnets().map(|s| s.to_string()).collect();
    assert_eq!(subnets.len(), 8);
    assert_eq!(subnets[0], "2026:db8::/67");
    assert_eq!(subnets[1], "2026:db8:0:0:2000::/67");
    assert_eq!(subnets[7], "2026:db8:0:0:e000::/67");

    // requesting more than the capacity below /128 fails
    let err = divide_subnet("2026:db8::", 126, 5).unwrap_err();
    assert!(matches!(err, PlannerError::SubnetCountUnreachable { .. }));
}

#[test]
fn test_membership_workflow() {
    let membership = subnet_membership("2026:db8::5", 64).expect("Failed to query membership");
    assert_eq!(membership.offset, 5);
    assert_eq!(membership.position_display, "第 6 个地址");
    assert_eq!(membership.network.to_string(), "2026:db8::/64");

    let outside = Network::new("2026:db8::", 64).unwrap();
    let err = outside
        .offset_of(ipv6_subnet_planner::Address128::parse("2026:db9::").unwrap())
        .unwrap_err();
    assert!(matches!(err, PlannerError::AddressNotInNetwork { .. }));
}

#[test]
fn test_eui64_workflow() {
    let result = convert_eui64("00:11:22:33:44:55", "2026:db8::/64").expect("Failed to convert");
    assert_eq!(result.interface_identifier.grouped(), "0211:22ff:fe33:4455");
    assert_eq!(result.address.compressed(), "2026:db8::211:22ff:fe33:4455");

    assert!(matches!(
        convert_eui64("00:11:22:33:44:55", "2026:db8::/48"),
        Err(PlannerError::PrefixMustBeSlash64(_))
    ));
    assert!(matches!(
        convert_eui64("00:11:22", "2026:db8::/64"),
        Err(PlannerError::MacFormat(_))
    ));
}

#[test]
fn test_export_cancellation_yields_partial_file() {
    let network = Network::new("2026:db8::", 64).unwrap();
    let range = ExportRange::new(1, 10_000_000, Some(network.usable_host_count())).unwrap();
    let path = temp_path("cancel.txt");
    let session = PlannerSession::new();
    let token = CancelToken::new();

    let cancel_handle = token.clone();
    let status = session
        .export_hosts(
            &network,
            &range,
            &path,
            &mut |p| {
                if p.items_written >= PROGRESS_INTERVAL {
                    cancel_handle.cancel();
                }
            },
            &token,
        )
        .expect("Export should not fail on cancellation");

    assert_eq!(
        status,
        ExportStatus::CancelledPartial {
            items_written: PROGRESS_INTERVAL
        },
        "cancellation is a distinguished partial outcome"
    );

    let content = fs::read_to_string(&path).expect("Partial file must exist");
    let last_line = content.lines().last().unwrap();
    assert!(
        last_line.starts_with("100000. "),
        "exactly the produced items are on disk, got: {last_line}"
    );

    fs::remove_file(&path).ok();
}

#[test]
fn test_export_subnets_csv_end_to_end() {
    let plan = divide_subnet("2026:db8::", 62, 4).expect("Failed to plan");
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
    .expect("Failed to export");
    assert_eq!(status, ExportStatus::Completed { items_written: 4 });

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "\u{feff}序号,网络地址,前缀长度,子网结束地址,完整表示"
    );
    assert_eq!(
        lines.next().unwrap(),
        "1,2026:db8::,64,2026:db8::ffff:ffff:ffff:ffff,2026:db8::/64"
    );
    assert_eq!(content.lines().count(), 5, "header plus four data rows");

    fs::remove_file(&path).ok();
}

#[test]
fn test_session_rejects_overlapping_export() {
    // second acquisition is refused while the first export is live:
    // simulate by cancelling inside the progress callback and attempting
    // a nested export from there
    let network = Network::new("2026:db8::", 64).unwrap();
    let range = ExportRange::new(1, 200_000, Some(network.usable_host_count())).unwrap();
    let path = temp_path("overlap_a.txt");
    let nested_path = temp_path("overlap_b.txt");
    let session = PlannerSession::new();
    let token = CancelToken::new();

    let mut nested_result = None;
    {
        let session_ref = &session;
        let nested_net = network;
        let nested_range = ExportRange::new(1, 1, Some(network.usable_host_count())).unwrap();
        session
            .export_hosts(
                &network,
                &range,
                &path,
                &mut |_| {
                    if nested_result.is_none() {
                        nested_result = Some(session_ref.export_hosts(
                            &nested_net,
                            &nested_range,
                            &nested_path,
                            &mut |_| {},
                            &CancelToken::new(),
                        ));
                    }
                },
                &token,
            )
            .expect("Outer export failed");
    }

    assert!(
        matches!(nested_result, Some(Err(PlannerError::ExportBusy))),
        "overlapping export on one session must be rejected"
    );

    fs::remove_file(&path).ok();
    fs::remove_file(&nested_path).ok();
}

#[test]
fn test_exploded_round_trip_property() {
    for text in [
        "::",
        "::1",
        "fe80::1",
        "2026:db8::5",
        "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff",
    ] {
        let a = ipv6_subnet_planner::Address128::parse(text).unwrap();
        let back = ipv6_subnet_planner::Address128::parse(&a.exploded()).unwrap();
        assert_eq!(a, back, "exploded round-trip failed for {text}");
    }
}
