use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use crate::accounting::{network_usage, subtree_total, AddressCountQuery};
use crate::cidr::{cidr_string, host_range, netmask, network_of, HostRange};
use crate::types::RecordKind;
use crate::{IpamError, NetworkUsage, RecordId};

use super::{unknown, Inventory};

/// Derived, read-only view of a network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkDetails {
    pub id: RecordId,
    pub complete_name: String,
    pub cidr: Option<String>,
    pub netmask: Option<Ipv4Addr>,
    pub host_range: Option<HostRange>,
    pub usage: Option<NetworkUsage>,
    pub nic_count: u64,
    pub attached_nic_count: u64,
}

impl<S> Inventory<S> {
    pub fn network_details(&self, id: &RecordId) -> Result<NetworkDetails, IpamError> {
        let mut details = self.details_for(std::slice::from_ref(id))?;
        details
            .pop()
            .ok_or_else(|| unknown(RecordKind::Network, id))
    }

    /// Details for several networks, grouping address counts once.
    pub fn details_for(&self, ids: &[RecordId]) -> Result<Vec<NetworkDetails>, IpamError> {
        let mut scope = BTreeSet::new();
        for id in ids {
            scope.extend(self.networks.descendants_of(id));
        }
        let counts = self.address_counts(&scope);

        ids.iter()
            .map(|id| {
                let network = self
                    .networks
                    .get(id)
                    .ok_or_else(|| unknown(RecordKind::Network, id))?;
                let net = network_of(network)?;

                Ok(NetworkDetails {
                    id: id.clone(),
                    complete_name: self.networks.complete_name(id)?,
                    cidr: net.as_ref().map(cidr_string),
                    netmask: net.as_ref().map(netmask),
                    host_range: net.as_ref().map(host_range),
                    usage: network_usage(&self.networks, &counts, id)?,
                    nic_count: subtree_total(&self.networks, &counts, id),
                    attached_nic_count: counts.get(id).copied().unwrap_or(0),
                })
            })
            .collect()
    }

    /// Details for every network, in complete-name order.
    pub fn all_network_details(&self) -> Result<Vec<NetworkDetails>, IpamError> {
        let ids: Vec<RecordId> = self.networks.iter().map(|n| n.id.clone()).collect();
        let mut details = self.details_for(&ids)?;
        details.sort_by(|a, b| a.complete_name.cmp(&b.complete_name));
        Ok(details)
    }
}
