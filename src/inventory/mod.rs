use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::accounting::{self, group_counts, subtree_total, AddressCountQuery};
use crate::sequence::SequentialNames;
use crate::tree::Forest;
use crate::types::RecordKind;
use crate::{
    Address, IpamError, NatMapping, Network, NetworkUsage, Organization, RecordId, Vlan,
};

mod audit;
mod details;
mod mutate;

pub use audit::Finding;
pub use details::NetworkDetails;

/// Records handed over wholesale by a persistence layer.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    pub organizations: Vec<Organization>,
    pub vlans: Vec<Vlan>,
    pub networks: Vec<Network>,
    pub addresses: Vec<Address>,
    pub nat_mappings: Vec<NatMapping>,
}

/// In-memory entity store over a consistent snapshot.
///
/// Every `add_*`/`update_*` runs the validators before anything is written;
/// a rejected mutation leaves the store untouched.
#[derive(Debug, Clone, Default)]
pub struct Inventory<S = SequentialNames> {
    organizations: Forest<Organization>,
    vlans: BTreeMap<RecordId, Vlan>,
    networks: Forest<Network>,
    addresses: BTreeMap<RecordId, Address>,
    nat_mappings: BTreeMap<RecordId, NatMapping>,
    names: S,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot without validating it; see [`Inventory::audit`].
    /// Only duplicate ids are rejected.
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Result<Self, IpamError> {
        Self::from_snapshot_with_names(snapshot, SequentialNames::new())
    }
}

impl<S> Inventory<S> {
    pub fn with_names(names: S) -> Self {
        Inventory {
            organizations: Forest::new(),
            vlans: BTreeMap::new(),
            networks: Forest::new(),
            addresses: BTreeMap::new(),
            nat_mappings: BTreeMap::new(),
            names,
        }
    }

    pub fn from_snapshot_with_names(
        snapshot: InventorySnapshot,
        names: S,
    ) -> Result<Self, IpamError> {
        let mut inventory = Self::with_names(names);

        for organization in snapshot.organizations {
            if inventory.organizations.contains(&organization.id) {
                return Err(duplicate(RecordKind::Organization, &organization.id));
            }
            inventory.organizations.insert(organization);
        }
        for vlan in snapshot.vlans {
            if inventory.vlans.contains_key(&vlan.id) {
                return Err(duplicate(RecordKind::Vlan, &vlan.id));
            }
            inventory.vlans.insert(vlan.id.clone(), vlan);
        }
        for network in snapshot.networks {
            if inventory.networks.contains(&network.id) {
                return Err(duplicate(RecordKind::Network, &network.id));
            }
            inventory.networks.insert(network);
        }
        for address in snapshot.addresses {
            if inventory.addresses.contains_key(&address.id) {
                return Err(duplicate(RecordKind::Address, &address.id));
            }
            inventory.addresses.insert(address.id.clone(), address);
        }
        for mapping in snapshot.nat_mappings {
            if inventory.nat_mappings.contains_key(&mapping.id) {
                return Err(duplicate(RecordKind::NatMapping, &mapping.id));
            }
            inventory.nat_mappings.insert(mapping.id.clone(), mapping);
        }

        Ok(inventory)
    }

    pub fn organization(&self, id: &RecordId) -> Option<&Organization> {
        self.organizations.get(id)
    }

    pub fn organizations(&self) -> impl Iterator<Item = &Organization> {
        self.organizations.iter()
    }

    pub fn organization_forest(&self) -> &Forest<Organization> {
        &self.organizations
    }

    pub fn vlan(&self, id: &RecordId) -> Option<&Vlan> {
        self.vlans.get(id)
    }

    pub fn vlans(&self) -> impl Iterator<Item = &Vlan> {
        self.vlans.values()
    }

    pub fn network(&self, id: &RecordId) -> Option<&Network> {
        self.networks.get(id)
    }

    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter()
    }

    pub fn network_forest(&self) -> &Forest<Network> {
        &self.networks
    }

    pub fn address(&self, id: &RecordId) -> Option<&Address> {
        self.addresses.get(id)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.values()
    }

    /// Addresses bound directly to a network
    pub fn addresses_in<'a>(&'a self, network: &'a RecordId) -> impl Iterator<Item = &'a Address> {
        self.addresses
            .values()
            .filter(move |address| &address.network == network)
    }

    pub fn nat_mapping(&self, id: &RecordId) -> Option<&NatMapping> {
        self.nat_mappings.get(id)
    }

    pub fn nat_mappings(&self) -> impl Iterator<Item = &NatMapping> {
        self.nat_mappings.values()
    }

    pub fn network_complete_name(&self, id: &RecordId) -> Result<String, IpamError> {
        self.networks.complete_name(id)
    }

    pub fn organization_complete_name(&self, id: &RecordId) -> Result<String, IpamError> {
        self.organizations.complete_name(id)
    }

    /// Free/used accounting over the subtree of one network
    pub fn network_usage(&self, id: &RecordId) -> Result<Option<NetworkUsage>, IpamError> {
        let mut report = accounting::usage_report(&self.networks, self, std::slice::from_ref(id))?;
        Ok(report.remove(id).flatten())
    }

    pub fn usage_report(
        &self,
        roots: &[RecordId],
    ) -> Result<BTreeMap<RecordId, Option<NetworkUsage>>, IpamError> {
        accounting::usage_report(&self.networks, self, roots)
    }

    /// Addresses bound to the network or any network below it
    pub fn nic_count(&self, id: &RecordId) -> u64 {
        let counts = self.address_counts(&self.networks.descendants_of(id));
        subtree_total(&self.networks, &counts, id)
    }

    /// Addresses bound directly to the network
    pub fn attached_nic_count(&self, id: &RecordId) -> u64 {
        self.addresses_in(id).count() as u64
    }

    /// Networks owned by the organization or any organization below it
    pub fn organization_subnet_count(&self, id: &RecordId) -> u64 {
        subtree_total(&self.organizations, &self.networks_per_organization(), id)
    }

    /// `organization_subnet_count` for every organization, grouping once.
    pub fn organization_subnet_counts(&self) -> BTreeMap<RecordId, u64> {
        let counts = self.networks_per_organization();
        self.organizations
            .iter()
            .map(|org| (org.id.clone(), subtree_total(&self.organizations, &counts, &org.id)))
            .collect()
    }

    fn networks_per_organization(&self) -> HashMap<RecordId, u64> {
        group_counts(
            self.networks
                .iter()
                .filter_map(|network| network.organization.as_ref()),
        )
    }
}

impl<S> AddressCountQuery for Inventory<S> {
    fn address_counts(&self, networks: &BTreeSet<RecordId>) -> HashMap<RecordId, u64> {
        group_counts(
            self.addresses
                .values()
                .map(|address| &address.network)
                .filter(|network| networks.contains(*network)),
        )
    }
}

fn duplicate(kind: RecordKind, id: &RecordId) -> IpamError {
    IpamError::DuplicateRecord {
        kind,
        id: id.to_string(),
    }
}

fn unknown(kind: RecordKind, id: &RecordId) -> IpamError {
    IpamError::UnknownRecord {
        kind,
        id: id.to_string(),
    }
}
