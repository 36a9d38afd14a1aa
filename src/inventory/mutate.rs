use crate::sequence::{NameSequence, Sequence};
use crate::tree::validate_containment;
use crate::types::{AddressKind, RecordKind, NEW_NAME};
use crate::validate::{validate_address, validate_nat_endpoint, validate_network_fields, validate_vlan};
use crate::{Address, IpamError, NatMapping, Network, Organization, RecordId, Vlan};

use super::{duplicate, unknown, Inventory};

fn is_placeholder(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == NEW_NAME
}

impl<S> Inventory<S> {
    pub(super) fn check_organization(&self, organization: &Organization) -> Result<(), IpamError> {
        if organization.name.trim().is_empty() {
            return Err(IpamError::MissingName {
                kind: RecordKind::Organization,
                id: organization.id.to_string(),
            });
        }
        if let Some(parent) = &organization.parent {
            if !self.organizations.contains(parent) {
                return Err(unknown(RecordKind::Organization, parent));
            }
        }
        self.organizations
            .check_acyclic(&organization.id, organization.parent.as_ref())
    }

    /// Checks owned by the network record itself: fields, references, parent.
    pub(super) fn check_network(&self, network: &Network) -> Result<(), IpamError> {
        validate_network_fields(network)?;
        if let Some(organization) = &network.organization {
            if !self.organizations.contains(organization) {
                return Err(unknown(RecordKind::Organization, organization));
            }
        }
        if let Some(vlan) = &network.vlan {
            if !self.vlans.contains_key(vlan) {
                return Err(unknown(RecordKind::Vlan, vlan));
            }
        }
        self.networks.validate_parent(network, network.parent.as_ref())
    }

    /// Records whose validity hangs on this network's CIDR.
    fn check_network_dependents(&self, network: &Network) -> Result<(), IpamError> {
        for child in self.networks.children_of(&network.id) {
            validate_containment(child, network)?;
        }
        for address in self.addresses_in(&network.id) {
            if let Some(ip) = address.ip.as_deref() {
                validate_address(ip, network)?;
            }
        }
        for mapping in self.nat_mappings.values() {
            if mapping.nat_network == network.id {
                validate_nat_endpoint(&mapping.nat_ip, network)?;
            }
            if mapping.dst_network == network.id {
                validate_nat_endpoint(&mapping.dst_ip, network)?;
            }
        }
        Ok(())
    }

    pub(super) fn check_address(&self, address: &Address) -> Result<(), IpamError> {
        let network = self
            .networks
            .get(&address.network)
            .ok_or_else(|| unknown(RecordKind::Network, &address.network))?;
        if let Some(ip) = address.ip.as_deref() {
            validate_address(ip, network)?;
        }
        Ok(())
    }

    pub(super) fn check_nat_mapping(&self, mapping: &NatMapping) -> Result<(), IpamError> {
        let nat_network = self
            .networks
            .get(&mapping.nat_network)
            .ok_or_else(|| unknown(RecordKind::Network, &mapping.nat_network))?;
        let dst_network = self
            .networks
            .get(&mapping.dst_network)
            .ok_or_else(|| unknown(RecordKind::Network, &mapping.dst_network))?;

        validate_nat_endpoint(&mapping.nat_ip, nat_network)?;
        validate_nat_endpoint(&mapping.dst_ip, dst_network)
    }

    /// Remove an organization. Its networks lose their organization and its
    /// child organizations become roots.
    pub fn remove_organization(&mut self, id: &RecordId) -> Option<Organization> {
        let removed = self.organizations.remove(id)?;

        let orphans: Vec<Organization> = self
            .organizations
            .iter()
            .filter(|org| org.parent.as_ref() == Some(id))
            .cloned()
            .collect();
        for mut orphan in orphans {
            orphan.parent = None;
            tracing::debug!(organization = %orphan.id, "detached from removed parent");
            self.organizations.insert(orphan);
        }

        let owned: Vec<Network> = self
            .networks
            .iter()
            .filter(|network| network.organization.as_ref() == Some(id))
            .cloned()
            .collect();
        for mut network in owned {
            network.organization = None;
            self.networks.insert(network);
        }

        tracing::debug!(organization = %id, "removed organization");
        Some(removed)
    }

    /// Remove a VLAN and clear it from the networks that referenced it.
    pub fn remove_vlan(&mut self, id: &RecordId) -> Option<Vlan> {
        let removed = self.vlans.remove(id)?;
        let tagged: Vec<Network> = self
            .networks
            .iter()
            .filter(|network| network.vlan.as_ref() == Some(id))
            .cloned()
            .collect();
        for mut network in tagged {
            network.vlan = None;
            self.networks.insert(network);
        }
        tracing::debug!(vlan = %id, "removed VLAN");
        Some(removed)
    }

    /// Remove a network together with its addresses and the NAT mappings
    /// pointing at it. Child networks are detached, not removed.
    pub fn remove_network(&mut self, id: &RecordId) -> Option<Network> {
        let removed = self.networks.remove(id)?;

        let orphans: Vec<Network> = self
            .networks
            .iter()
            .filter(|network| network.parent.as_ref() == Some(id))
            .cloned()
            .collect();
        for mut orphan in orphans {
            orphan.parent = None;
            tracing::debug!(network = %orphan.id, "detached from removed parent");
            self.networks.insert(orphan);
        }

        let before = self.addresses.len();
        self.addresses.retain(|_, address| &address.network != id);
        let addresses_removed = before - self.addresses.len();

        let before = self.nat_mappings.len();
        self.nat_mappings
            .retain(|_, mapping| &mapping.nat_network != id && &mapping.dst_network != id);
        let mappings_removed = before - self.nat_mappings.len();

        tracing::debug!(
            network = %id,
            addresses_removed,
            mappings_removed,
            "removed network"
        );
        Some(removed)
    }

    pub fn remove_address(&mut self, id: &RecordId) -> Option<Address> {
        let removed = self.addresses.remove(id);
        if removed.is_some() {
            tracing::debug!(address = %id, "removed address");
        }
        removed
    }

    pub fn remove_nat_mapping(&mut self, id: &RecordId) -> Option<NatMapping> {
        let removed = self.nat_mappings.remove(id);
        if removed.is_some() {
            tracing::debug!(mapping = %id, "removed NAT mapping");
        }
        removed
    }
}

impl<S: NameSequence> Inventory<S> {
    pub fn add_organization(&mut self, mut organization: Organization) -> Result<RecordId, IpamError> {
        if self.organizations.contains(&organization.id) {
            return Err(duplicate(RecordKind::Organization, &organization.id));
        }
        self.check_organization(&organization)?;

        if is_placeholder(&organization.code) {
            organization.code = self.names.next_name(Sequence::Organization);
        }
        let id = organization.id.clone();
        tracing::debug!(organization = %id, name = %organization.name, "added organization");
        self.organizations.insert(organization);
        Ok(id)
    }

    pub fn update_organization<F>(&mut self, id: &RecordId, edit: F) -> Result<(), IpamError>
    where
        F: FnOnce(&mut Organization),
    {
        let mut candidate = self
            .organizations
            .get(id)
            .cloned()
            .ok_or_else(|| unknown(RecordKind::Organization, id))?;
        let previous_code = candidate.code.clone();
        edit(&mut candidate);
        candidate.id = id.clone();
        self.check_organization(&candidate)?;

        keep_previous(&mut candidate.code, previous_code);
        tracing::debug!(organization = %id, "updated organization");
        self.organizations.insert(candidate);
        Ok(())
    }

    pub fn add_vlan(&mut self, mut vlan: Vlan) -> Result<RecordId, IpamError> {
        if self.vlans.contains_key(&vlan.id) {
            return Err(duplicate(RecordKind::Vlan, &vlan.id));
        }
        validate_vlan(&vlan)?;

        if is_placeholder(&vlan.name) {
            vlan.name = self.names.next_name(Sequence::Vlan);
        }
        let id = vlan.id.clone();
        tracing::debug!(vlan = %id, vlan_id = vlan.vlan_id, "added VLAN");
        self.vlans.insert(id.clone(), vlan);
        Ok(id)
    }

    pub fn update_vlan<F>(&mut self, id: &RecordId, edit: F) -> Result<(), IpamError>
    where
        F: FnOnce(&mut Vlan),
    {
        let mut candidate = self
            .vlans
            .get(id)
            .cloned()
            .ok_or_else(|| unknown(RecordKind::Vlan, id))?;
        let previous_name = candidate.name.clone();
        edit(&mut candidate);
        candidate.id = id.clone();
        validate_vlan(&candidate)?;

        keep_previous(&mut candidate.name, previous_name);
        tracing::debug!(vlan = %id, "updated VLAN");
        self.vlans.insert(id.clone(), candidate);
        Ok(())
    }

    pub fn add_network(&mut self, mut network: Network) -> Result<RecordId, IpamError> {
        if self.networks.contains(&network.id) {
            return Err(duplicate(RecordKind::Network, &network.id));
        }
        self.check_network(&network)?;
        self.check_network_dependents(&network)?;

        if is_placeholder(&network.name) {
            network.name = self.names.next_name(Sequence::Network);
        }
        let id = network.id.clone();
        tracing::debug!(network = %id, name = %network.name, "added network");
        self.networks.insert(network);
        Ok(id)
    }

    /// Edit a network in place. A changed CIDR is checked against the
    /// child networks, addresses and NAT endpoints that depend on it.
    pub fn update_network<F>(&mut self, id: &RecordId, edit: F) -> Result<(), IpamError>
    where
        F: FnOnce(&mut Network),
    {
        let mut candidate = self
            .networks
            .get(id)
            .cloned()
            .ok_or_else(|| unknown(RecordKind::Network, id))?;
        let previous_name = candidate.name.clone();
        edit(&mut candidate);
        candidate.id = id.clone();
        self.check_network(&candidate)?;
        self.check_network_dependents(&candidate)?;

        keep_previous(&mut candidate.name, previous_name);
        tracing::debug!(network = %id, "updated network");
        self.networks.insert(candidate);
        Ok(())
    }

    pub fn add_address(&mut self, mut address: Address) -> Result<RecordId, IpamError> {
        if self.addresses.contains_key(&address.id) {
            return Err(duplicate(RecordKind::Address, &address.id));
        }
        self.check_address(&address)?;

        if is_placeholder(&address.name) {
            address.name = self.names.next_name(address_sequence(address.kind));
        }
        let id = address.id.clone();
        tracing::debug!(address = %id, network = %address.network, "added address");
        self.addresses.insert(id.clone(), address);
        Ok(id)
    }

    pub fn update_address<F>(&mut self, id: &RecordId, edit: F) -> Result<(), IpamError>
    where
        F: FnOnce(&mut Address),
    {
        let mut candidate = self
            .addresses
            .get(id)
            .cloned()
            .ok_or_else(|| unknown(RecordKind::Address, id))?;
        let previous_name = candidate.name.clone();
        edit(&mut candidate);
        candidate.id = id.clone();
        self.check_address(&candidate)?;

        keep_previous(&mut candidate.name, previous_name);
        tracing::debug!(address = %id, "updated address");
        self.addresses.insert(id.clone(), candidate);
        Ok(())
    }

    pub fn add_nat_mapping(&mut self, mut mapping: NatMapping) -> Result<RecordId, IpamError> {
        if self.nat_mappings.contains_key(&mapping.id) {
            return Err(duplicate(RecordKind::NatMapping, &mapping.id));
        }
        self.check_nat_mapping(&mapping)?;

        if is_placeholder(&mapping.name) {
            mapping.name = self.names.next_name(Sequence::Nat);
        }
        let id = mapping.id.clone();
        tracing::debug!(mapping = %id, nat_ip = %mapping.nat_ip, dst_ip = %mapping.dst_ip, "added NAT mapping");
        self.nat_mappings.insert(id.clone(), mapping);
        Ok(id)
    }

    pub fn update_nat_mapping<F>(&mut self, id: &RecordId, edit: F) -> Result<(), IpamError>
    where
        F: FnOnce(&mut NatMapping),
    {
        let mut candidate = self
            .nat_mappings
            .get(id)
            .cloned()
            .ok_or_else(|| unknown(RecordKind::NatMapping, id))?;
        let previous_name = candidate.name.clone();
        edit(&mut candidate);
        candidate.id = id.clone();
        self.check_nat_mapping(&candidate)?;

        keep_previous(&mut candidate.name, previous_name);
        tracing::debug!(mapping = %id, "updated NAT mapping");
        self.nat_mappings.insert(id.clone(), candidate);
        Ok(())
    }
}

/// Edits cannot blank a name; names are only drawn from the sequence on add.
fn keep_previous(edited: &mut String, previous: String) {
    if is_placeholder(edited) {
        *edited = previous;
    }
}

fn address_sequence(kind: AddressKind) -> Sequence {
    match kind {
        AddressKind::Ip => Sequence::Ip,
        AddressKind::Nic => Sequence::Nic,
    }
}
