use anyhow::{anyhow, bail, Context, Result};
use std::io::Read;
use std::str::FromStr;
use xmltree::Element;

use super::{
    ADDRESS, ADDRESSES, MAPPING, NAT, NETWORK, NETWORKS, ORGANIZATION, ORGANIZATIONS, ROOT, VLAN,
    VLANS,
};
use crate::xml_helpers::{attribute_ci, child_text, children_ci, get_child_ci};
use crate::{
    Address, AddressKind, Inventory, InventorySnapshot, NatMapping, NatType, Network,
    NetworkType, Organization, RecordId, Vlan, NEW_NAME,
};

/// Read an XML snapshot into an unchecked inventory.
///
/// Only structural problems fail here (bad XML, unparseable numbers,
/// duplicate ids); record validity is left to [`Inventory::audit`].
pub fn read_inventory<R: Read>(reader: R) -> Result<Inventory> {
    let root = Element::parse(reader).context("Failed to parse XML")?;
    if !root.name.eq_ignore_ascii_case(ROOT) {
        bail!("Expected <{}> root element, found <{}>", ROOT, root.name);
    }

    let mut snapshot = InventorySnapshot::default();

    if let Some(section) = get_child_ci(&root, ORGANIZATIONS) {
        for el in children_ci(section, ORGANIZATION) {
            snapshot.organizations.push(read_organization(el)?);
        }
    }
    if let Some(section) = get_child_ci(&root, VLANS) {
        for el in children_ci(section, VLAN) {
            snapshot.vlans.push(read_vlan(el)?);
        }
    }
    if let Some(section) = get_child_ci(&root, NETWORKS) {
        for el in children_ci(section, NETWORK) {
            snapshot.networks.push(read_network(el)?);
        }
    }
    if let Some(section) = get_child_ci(&root, ADDRESSES) {
        for el in children_ci(section, ADDRESS) {
            snapshot.addresses.push(read_address(el)?);
        }
    }
    if let Some(section) = get_child_ci(&root, NAT) {
        for el in children_ci(section, MAPPING) {
            snapshot.nat_mappings.push(read_nat_mapping(el)?);
        }
    }

    tracing::debug!(
        organizations = snapshot.organizations.len(),
        vlans = snapshot.vlans.len(),
        networks = snapshot.networks.len(),
        addresses = snapshot.addresses.len(),
        nat_mappings = snapshot.nat_mappings.len(),
        "read inventory document"
    );

    Ok(Inventory::from_snapshot(snapshot)?)
}

fn record_id(el: &Element) -> RecordId {
    match attribute_ci(el, "uuid") {
        Some(id) => RecordId::new(id),
        None => {
            let id = RecordId::generate();
            tracing::warn!(element = %el.name, id = %id, "record without uuid, generated one");
            id
        }
    }
}

fn reference(el: &Element, name: &str) -> Option<RecordId> {
    child_text(el, name).map(RecordId::new)
}

fn parse_active(el: &Element, id: &RecordId) -> Result<bool> {
    match child_text(el, "active") {
        None => Ok(true),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => bail!("Invalid active flag '{}' on {} {}", value, el.name, id),
        },
    }
}

fn parse_enum<T: FromStr<Err = String>>(value: Option<String>, id: &RecordId) -> Result<T>
where
    T: Default,
{
    match value {
        None => Ok(T::default()),
        Some(value) => T::from_str(&value).map_err(|e| anyhow!("{} on record {}", e, id)),
    }
}

fn read_organization(el: &Element) -> Result<Organization> {
    let id = record_id(el);
    Ok(Organization {
        name: child_text(el, "name").unwrap_or_default(),
        code: child_text(el, "code").unwrap_or_else(|| NEW_NAME.to_string()),
        active: parse_active(el, &id)?,
        description: child_text(el, "description"),
        parent: reference(el, "parent"),
        id,
    })
}

fn read_vlan(el: &Element) -> Result<Vlan> {
    let id = record_id(el);
    let raw = child_text(el, "vlan_id").ok_or_else(|| anyhow!("VLAN {} has no vlan_id", id))?;
    let vlan_id: u16 = raw
        .parse()
        .with_context(|| format!("Invalid vlan_id '{}' on VLAN {}", raw, id))?;

    Ok(Vlan {
        name: child_text(el, "name").unwrap_or_else(|| NEW_NAME.to_string()),
        active: parse_active(el, &id)?,
        vlan_id,
        description: child_text(el, "description"),
        id,
    })
}

fn read_network(el: &Element) -> Result<Network> {
    let id = record_id(el);
    let mask_bits = match child_text(el, "mask_bits") {
        Some(raw) => Some(
            raw.parse::<u8>()
                .with_context(|| format!("Invalid mask_bits '{}' on network {}", raw, id))?,
        ),
        None => None,
    };
    let network_type: NetworkType = parse_enum(child_text(el, "type"), &id)?;

    Ok(Network {
        name: child_text(el, "name").unwrap_or_else(|| NEW_NAME.to_string()),
        active: parse_active(el, &id)?,
        network_type,
        network_address: child_text(el, "network_address"),
        mask_bits,
        gateway: child_text(el, "gateway"),
        organization: reference(el, "organization"),
        vlan: reference(el, "vlan"),
        parent: reference(el, "parent"),
        note: child_text(el, "note"),
        id,
    })
}

fn read_address(el: &Element) -> Result<Address> {
    let id = record_id(el);
    let network =
        reference(el, "network").ok_or_else(|| anyhow!("Address {} has no network", id))?;
    let kind: AddressKind = parse_enum(attribute_ci(el, "kind"), &id)?;

    Ok(Address {
        name: child_text(el, "name").unwrap_or_else(|| NEW_NAME.to_string()),
        active: parse_active(el, &id)?,
        kind,
        network,
        ip: child_text(el, "ip"),
        fqdn: child_text(el, "fqdn"),
        note: child_text(el, "note"),
        id,
    })
}

fn read_nat_mapping(el: &Element) -> Result<NatMapping> {
    let id = record_id(el);
    let required = |name: &str| {
        child_text(el, name).ok_or_else(|| anyhow!("NAT mapping {} has no {}", id, name))
    };
    let nat_type: NatType = parse_enum(child_text(el, "type"), &id)?;

    Ok(NatMapping {
        name: child_text(el, "name").unwrap_or_else(|| NEW_NAME.to_string()),
        active: parse_active(el, &id)?,
        nat_type,
        nat_network: RecordId::new(required("nat_network")?),
        nat_ip: required("nat_ip")?,
        dst_network: RecordId::new(required("dst_network")?),
        dst_ip: required("dst_ip")?,
        id,
    })
}
