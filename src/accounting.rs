use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cidr::{network_of, total_addresses};
use crate::tree::{Forest, TreeRecord};
use crate::types::{NetworkType, RecordKind};
use crate::{IpamError, Network, NetworkUsage, RecordId};

/// Addresses reserved in a parent for every subnet carved out below it.
pub const SUBNET_OVERHEAD: u64 = 2;

/// Grouped count of address records per bound network.
///
/// Called once per accounting run with every network id of interest.
pub trait AddressCountQuery {
    fn address_counts(&self, networks: &BTreeSet<RecordId>) -> HashMap<RecordId, u64>;
}

/// Count references per target id in a single pass.
pub fn group_counts<'a, I>(references: I) -> HashMap<RecordId, u64>
where
    I: IntoIterator<Item = &'a RecordId>,
{
    let mut counts = HashMap::new();
    for reference in references {
        *counts.entry(reference.clone()).or_insert(0) += 1;
    }
    counts
}

/// Fold per-node counts over the subtree rooted at `id`.
pub fn subtree_total<T: TreeRecord>(
    forest: &Forest<T>,
    counts: &HashMap<RecordId, u64>,
    id: &RecordId,
) -> u64 {
    forest
        .descendants_of(id)
        .iter()
        .map(|member| counts.get(member).copied().unwrap_or(0))
        .sum()
}

/// Usage of one network given pre-grouped address counts.
///
/// `None` when the network has no CIDR.
pub fn network_usage(
    networks: &Forest<Network>,
    counts: &HashMap<RecordId, u64>,
    id: &RecordId,
) -> Result<Option<NetworkUsage>, IpamError> {
    let network = networks.get(id).ok_or_else(|| IpamError::UnknownRecord {
        kind: RecordKind::Network,
        id: id.to_string(),
    })?;
    let Some(net) = network_of(network)? else {
        return Ok(None);
    };

    let available = total_addresses(&net);
    let subtree = networks.descendants_of(id);

    let child_subnets = subtree
        .iter()
        .filter(|member| *member != id)
        .filter_map(|member| networks.get(member))
        .filter(|member| member.network_type == NetworkType::Subnet)
        .count() as u64;
    let reserved_for_child_subnets = child_subnets * SUBNET_OVERHEAD;

    let assigned_addresses: u64 = subtree
        .iter()
        .map(|member| counts.get(member).copied().unwrap_or(0))
        .sum();

    let free = available as i64 - reserved_for_child_subnets as i64 - assigned_addresses as i64;
    Ok(Some(NetworkUsage {
        available,
        reserved_for_child_subnets,
        assigned_addresses,
        free,
        used: available as i64 - free,
    }))
}

/// Usage for several networks with a single grouped count query.
pub fn usage_report<Q: AddressCountQuery>(
    networks: &Forest<Network>,
    query: &Q,
    roots: &[RecordId],
) -> Result<BTreeMap<RecordId, Option<NetworkUsage>>, IpamError> {
    let mut scope = BTreeSet::new();
    for root in roots {
        scope.extend(networks.descendants_of(root));
    }
    let counts = query.address_counts(&scope);
    tracing::debug!(
        roots = roots.len(),
        networks = scope.len(),
        "computing network usage"
    );

    roots
        .iter()
        .map(|root| Ok((root.clone(), network_usage(networks, &counts, root)?)))
        .collect()
}
