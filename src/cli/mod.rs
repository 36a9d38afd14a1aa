use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::{read_inventory, Inventory, NetworkDetails};

mod check;
mod export;
mod report;
mod verify;

/// Environment variable holding a tracing filter directive, e.g. `ipamkit=debug`.
pub const LOG_ENV: &str = "IPAMKIT_LOG";

pub(crate) struct CheckArgs {
    pub(crate) r#in: PathBuf,
}

pub(crate) struct ReportArgs {
    pub(crate) r#in: PathBuf,
    pub(crate) network: Vec<String>,
    pub(crate) verbose: bool,
}

pub(crate) struct ExportArgs {
    pub(crate) r#in: PathBuf,
    pub(crate) out: PathBuf,
    pub(crate) force: bool,
    pub(crate) no_derived: bool,
}

pub(crate) struct VerifyArgs {
    pub(crate) r#in: PathBuf,
    pub(crate) quiet: bool,
}

#[derive(Parser)]
#[command(
    name = "ipamkit",
    about = "Validate and report on an IPv4 address management inventory",
    long_about = "Reads an XML inventory of organizations, VLANs, networks, addresses and NAT mappings, checks containment rules and reports address usage per network subtree.",
    after_help = "Examples:\n  ipamkit check --in ./ipam.xml\n  ipamkit report --in ./ipam.xml --network lan\n  ipamkit export --in ./ipam.xml --out ./ipam.full.xml\n\nSet IPAMKIT_LOG (e.g. IPAMKIT_LOG=debug) to control log output."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every record and list all problems found (read-only)
    Check {
        /// Input inventory file path
        #[arg(short, long, default_value = "ipam.xml")]
        r#in: PathBuf,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print derived details and address usage per network
    Report {
        /// Input inventory file path
        #[arg(short, long, default_value = "ipam.xml")]
        r#in: PathBuf,

        /// Only report these networks (by uuid); may be repeated
        #[arg(short, long)]
        network: Vec<String>,

        /// Show debug logging and list the addresses of each network
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write the canonical inventory, including computed fields, to a file
    Export {
        /// Input inventory file path
        #[arg(short, long, default_value = "ipam.xml")]
        r#in: PathBuf,

        /// Output file path
        #[arg(short, long)]
        out: PathBuf,

        /// Overwrite output file if it exists
        #[arg(long)]
        force: bool,

        /// Leave out computed fields
        #[arg(long)]
        no_derived: bool,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the diff between the input and its canonical export (no files written)
    Verify {
        /// Input inventory file path
        #[arg(short, long, default_value = "ipam.xml")]
        r#in: PathBuf,

        /// Suppress diff output (exit code still indicates changes)
        #[arg(long)]
        quiet: bool,

        /// Show debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

pub fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Check { r#in, verbose } => {
            init_logging(verbose);
            check::run_check(CheckArgs { r#in })
        }
        Commands::Report {
            r#in,
            network,
            verbose,
        } => {
            init_logging(verbose);
            report::run_report(ReportArgs {
                r#in,
                network,
                verbose,
            })
        }
        Commands::Export {
            r#in,
            out,
            force,
            no_derived,
            verbose,
        } => {
            init_logging(verbose);
            export::run_export(ExportArgs {
                r#in,
                out,
                force,
                no_derived,
            })
        }
        Commands::Verify {
            r#in,
            quiet,
            verbose,
        } => {
            init_logging(verbose);
            verify::run_verify(VerifyArgs { r#in, quiet })
        }
    }
}

/// Install the stderr subscriber. `IPAMKIT_LOG` wins over `--verbose`.
/// A subscriber that is already installed is left in place.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(crate) fn load_inventory(path: &Path) -> Result<Inventory> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    read_inventory(file)
        .with_context(|| format!("Failed to read inventory: {}", path.display()))
}

/// Load an inventory and refuse to continue if it does not audit clean.
pub(crate) fn load_checked_inventory(path: &Path) -> Result<Inventory> {
    let inventory = load_inventory(path)?;
    let findings = inventory.audit();
    if let Some(first) = findings.first() {
        bail!(
            "Inventory has {} problem(s); run 'ipamkit check' for the full list. First: {}",
            findings.len(),
            first
        );
    }
    Ok(inventory)
}

pub(crate) fn print_inventory_stats(inventory: &Inventory) {
    println!("Organizations: {}", inventory.organizations().count());
    println!("VLANs: {}", inventory.vlans().count());
    println!("Networks: {}", inventory.networks().count());
    println!("Addresses: {}", inventory.addresses().count());
    println!("NAT mappings: {}", inventory.nat_mappings().count());
}

pub(crate) fn print_network_details(details: &NetworkDetails) {
    match &details.cidr {
        Some(cidr) => println!("{} [{}]", details.complete_name, cidr),
        None => println!("{} [no CIDR]", details.complete_name),
    }
    if let Some(netmask) = details.netmask {
        println!("  Netmask: {}", netmask);
    }
    if let Some(range) = &details.host_range {
        match (range.min_usable, range.max_usable) {
            (Some(min), Some(max)) => println!(
                "  Usable range: {} - {} ({} addresses)",
                min, max, range.usable_count
            ),
            _ => println!("  Usable range: none ({} addresses)", range.usable_count),
        }
    }
    match &details.usage {
        Some(usage) => {
            let percentage = usage
                .used_percentage()
                .map(|p| format!("{:.2}%", p))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "  Available: {}  Free: {}  Used: {} ({})",
                usage.available, usage.free, usage.used, percentage
            );
            println!(
                "  Reserved for child subnets: {}",
                usage.reserved_for_child_subnets
            );
        }
        None => println!("  Usage: n/a (no CIDR configured)"),
    }
    println!(
        "  Addresses: {} (attached: {})",
        details.nic_count, details.attached_nic_count
    );
}
