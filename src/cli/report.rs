use anyhow::{bail, Result};

use crate::RecordId;

use super::{load_checked_inventory, print_network_details, ReportArgs};

pub(crate) fn run_report(args: ReportArgs) -> Result<()> {
    let inventory = load_checked_inventory(&args.r#in)?;

    let details = if args.network.is_empty() {
        inventory.all_network_details()?
    } else {
        let ids: Vec<RecordId> = args
            .network
            .iter()
            .map(|id| RecordId::from(id.as_str()))
            .collect();
        for id in &ids {
            if inventory.network(id).is_none() {
                bail!("Unknown network: {}", id);
            }
        }
        inventory.details_for(&ids)?
    };

    if details.is_empty() {
        println!("No networks found.");
        return Ok(());
    }

    for (index, network) in details.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print_network_details(network);

        if args.verbose {
            for address in inventory.addresses_in(&network.id) {
                println!(
                    "    {} {} [{}]",
                    address.ip.as_deref().unwrap_or("<no ip>"),
                    address.name,
                    address.fqdn.as_deref().unwrap_or("<no fqdn>")
                );
            }
        }
    }

    Ok(())
}
