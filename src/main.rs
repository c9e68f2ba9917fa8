use colored::Colorize;
use ipv6_subnet_planner::output::{grouped, grouped_count};
use ipv6_subnet_planner::{
    compute_network_info, convert_eui64, divide_subnet, generate_hosts, slice_hosts,
    subnet_membership, CancelToken, ExportFormat, ExportRange, PlannerSession,
};
use std::error::Error;
use std::path::Path;

const USAGE: &str = "usage: ipv6-subnet-planner <command> [args]
  info           <address> <prefix> [--json]
  hosts          <address> <prefix> [limit]
  slice          <address> <prefix> <start> <end>
  divide         <address> <prefix> <count> [--json]
  member         <address> <prefix> [--json]
  eui64          <mac> <prefix/64> [--json]
  export-hosts   <address> <prefix> <start> <end> <file>
  export-subnets <address> <prefix> <count> <file> [csv|text]";

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default()).expect("Error initializing log4rs");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let args: Vec<&str> = args.iter().map(|a| a.as_str()).filter(|a| *a != "--json").collect();

    match args.as_slice() {
        ["info", address, prefix] => {
            let info = compute_network_info(address, prefix.parse()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("input:     {}", info.input_exploded);
                println!("network:   {}", info.network_address.exploded().cyan());
                println!("range:     {} - {}", info.network_address.exploded(), info.broadcast_address.exploded());
                println!("prefix:    /{}", info.prefix);
                println!("addresses: {}", grouped_count_str(&info.address_count));
            }
        }
        ["hosts", address, prefix] | ["hosts", address, prefix, _] => {
            let limit: usize = args.get(3).map(|l| l.parse()).transpose()?.unwrap_or(100);
            let hosts = generate_hosts(address, prefix.parse()?)?;
            let total = hosts.remaining();
            for (i, host) in hosts.take(limit).enumerate() {
                println!("{}. {}", i + 1, host.exploded().green());
            }
            println!("total usable hosts: {}", grouped(total));
        }
        ["slice", address, prefix, start, end] => {
            let start: u128 = start.parse()?;
            let sliced = slice_hosts(address, prefix.parse()?, start, end.parse()?)?;
            for (i, host) in sliced.enumerate() {
                println!("{}. {}", grouped(start + i as u128), host.exploded().green());
            }
        }
        ["divide", address, prefix, count] => {
            let plan = divide_subnet(address, prefix.parse()?, count.parse()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!("original:   {}", plan.original());
                println!("new prefix: {}", format!("/{}", plan.new_prefix()).cyan());
                println!("subnets:    {}", grouped_count(plan.subnet_count()));
                for (i, subnet) in plan.subnets().take(10).enumerate() {
                    println!("  {}. {}", i + 1, subnet.exploded().green());
                }
            }
        }
        ["member", address, prefix] => {
            let membership = subnet_membership(address, prefix.parse()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&membership)?);
            } else {
                println!("address:  {}", membership.address);
                println!("network:  {}", membership.network);
                println!("range:    {} - {}", membership.network_address.exploded(), membership.broadcast_address.exploded());
                println!("hosts:    {}", grouped_count_str(&membership.usable_host_count));
                println!("offset:   {} ({})", membership.offset, membership.position_display.cyan());
            }
        }
        ["eui64", mac, prefix] => {
            let result = convert_eui64(mac, prefix)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("mac:        {}", result.mac);
                println!("identifier: {}", result.interface_identifier.grouped().cyan());
                println!("prefix:     {}", result.network_prefix);
                println!("address:    {}", result.address.exploded().green());
            }
        }
        ["export-hosts", address, prefix, start, end, file] => {
            let network = ipv6_subnet_planner::Network::new(address, prefix.parse()?)?;
            let range = ExportRange::new(start.parse()?, end.parse()?, Some(network.usable_host_count()))?;
            let session = PlannerSession::new();
            let status = session.export_hosts(
                &network,
                &range,
                Path::new(file),
                &mut print_progress,
                &CancelToken::new(),
            )?;
            println!("{status:?}");
        }
        ["export-subnets", address, prefix, count, file]
        | ["export-subnets", address, prefix, count, file, _] => {
            let plan = divide_subnet(address, prefix.parse()?, count.parse()?)?;
            let format = match args.get(5) {
                Some(&"csv") => ExportFormat::Csv,
                Some(&"text") => ExportFormat::Text,
                Some(other) => return Err(format!("unknown format: {other}").into()),
                None => ExportFormat::from_path(Path::new(file)),
            };
            let end = plan.subnet_count().unwrap_or(u128::MAX);
            let range = ExportRange::new(1, end, plan.subnet_count())?;
            let session = PlannerSession::new();
            let status = session.export_subnets(
                &plan,
                &range,
                Path::new(file),
                format,
                &mut print_progress,
                &CancelToken::new(),
            )?;
            println!("{status:?}");
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn print_progress(progress: ipv6_subnet_planner::ExportProgress) {
    let rate = progress.items_written as f64 / progress.elapsed.as_secs_f64().max(1e-9);
    log::info!(
        "exported {} / {} ({rate:.0}/s)",
        grouped(progress.items_written as u128),
        grouped(progress.total_requested)
    );
}

// counts arrive as decimal strings since 2^128 exceeds u128
fn grouped_count_str(decimal: &str) -> String {
    ipv6_subnet_planner::output::group_digits(decimal)
}
