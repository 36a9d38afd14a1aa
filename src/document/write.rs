use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use xmltree::{Element, EmitterConfig, XMLNode};

use super::{
    ExportOptions, ADDRESS, ADDRESSES, MAPPING, NAT, NETWORK, NETWORKS, ORGANIZATION,
    ORGANIZATIONS, ROOT, VLAN, VLANS,
};
use crate::xml_helpers::push_text;
use crate::{
    Address, Inventory, NatMapping, Network, NetworkDetails, Organization, RecordId, Vlan,
};

/// Write an inventory as a canonical XML document (records in id order).
///
/// Unless `skip_derived` is set, networks and organizations also carry
/// their computed fields; those elements are ignored when reading back.
pub fn write_inventory<S, W: Write>(
    inventory: &Inventory<S>,
    writer: W,
    options: &ExportOptions,
) -> Result<()> {
    let mut root = Element::new(ROOT);

    let network_details: HashMap<RecordId, NetworkDetails> = if options.skip_derived {
        HashMap::new()
    } else {
        inventory
            .all_network_details()
            .context("Failed to compute derived network fields")?
            .into_iter()
            .map(|details| (details.id.clone(), details))
            .collect()
    };

    let subnet_counts = if options.skip_derived {
        BTreeMap::new()
    } else {
        inventory.organization_subnet_counts()
    };

    let mut organizations = Element::new(ORGANIZATIONS);
    for organization in inventory.organizations() {
        let mut el = organization_element(organization);
        if !options.skip_derived {
            let complete_name = inventory
                .organization_complete_name(&organization.id)
                .context("Failed to compute organization names")?;
            push_text(&mut el, "complete_name", Some(&complete_name));
            let subnet_count = subnet_counts.get(&organization.id).copied().unwrap_or(0);
            push_text(&mut el, "subnet_count", Some(&subnet_count.to_string()));
        }
        organizations.children.push(XMLNode::Element(el));
    }
    root.children.push(XMLNode::Element(organizations));

    let mut vlans = Element::new(VLANS);
    for vlan in inventory.vlans() {
        vlans.children.push(XMLNode::Element(vlan_element(vlan)));
    }
    root.children.push(XMLNode::Element(vlans));

    let mut networks = Element::new(NETWORKS);
    for network in inventory.networks() {
        let mut el = network_element(network);
        if let Some(details) = network_details.get(&network.id) {
            push_derived(&mut el, details);
        }
        networks.children.push(XMLNode::Element(el));
    }
    root.children.push(XMLNode::Element(networks));

    let mut addresses = Element::new(ADDRESSES);
    for address in inventory.addresses() {
        addresses
            .children
            .push(XMLNode::Element(address_element(address)));
    }
    root.children.push(XMLNode::Element(addresses));

    let mut nat = Element::new(NAT);
    for mapping in inventory.nat_mappings() {
        nat.children
            .push(XMLNode::Element(nat_mapping_element(mapping)));
    }
    root.children.push(XMLNode::Element(nat));

    let emitter_config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ")
        .write_document_declaration(true);
    root.write_with_config(writer, emitter_config)
        .context("Failed to write XML")?;

    Ok(())
}

fn record_element(name: &str, id: &RecordId) -> Element {
    let mut el = Element::new(name);
    el.attributes.insert("uuid".to_string(), id.to_string());
    el
}

fn flag(active: bool) -> Option<&'static str> {
    Some(if active { "1" } else { "0" })
}

fn organization_element(organization: &Organization) -> Element {
    let mut el = record_element(ORGANIZATION, &organization.id);
    push_text(&mut el, "name", Some(&organization.name));
    push_text(&mut el, "code", Some(&organization.code));
    push_text(&mut el, "description", organization.description.as_deref());
    push_text(&mut el, "parent", organization.parent.as_ref().map(|p| p.as_str()));
    push_text(&mut el, "active", flag(organization.active));
    el
}

fn vlan_element(vlan: &Vlan) -> Element {
    let mut el = record_element(VLAN, &vlan.id);
    push_text(&mut el, "name", Some(&vlan.name));
    push_text(&mut el, "vlan_id", Some(&vlan.vlan_id.to_string()));
    push_text(&mut el, "description", vlan.description.as_deref());
    push_text(&mut el, "active", flag(vlan.active));
    el
}

fn network_element(network: &Network) -> Element {
    let mut el = record_element(NETWORK, &network.id);
    push_text(&mut el, "name", Some(&network.name));
    push_text(&mut el, "type", Some(network.network_type.as_str()));
    push_text(&mut el, "network_address", network.network_address.as_deref());
    push_text(
        &mut el,
        "mask_bits",
        network.mask_bits.map(|m| m.to_string()).as_deref(),
    );
    push_text(&mut el, "gateway", network.gateway.as_deref());
    push_text(&mut el, "organization", network.organization.as_ref().map(|o| o.as_str()));
    push_text(&mut el, "vlan", network.vlan.as_ref().map(|v| v.as_str()));
    push_text(&mut el, "parent", network.parent.as_ref().map(|p| p.as_str()));
    push_text(&mut el, "note", network.note.as_deref());
    push_text(&mut el, "active", flag(network.active));
    el
}

fn push_derived(el: &mut Element, details: &NetworkDetails) {
    push_text(el, "complete_name", Some(&details.complete_name));
    push_text(el, "cidr", details.cidr.as_deref());
    push_text(el, "netmask", details.netmask.map(|m| m.to_string()).as_deref());
    if let Some(range) = &details.host_range {
        push_text(el, "min_ip", range.min_usable.map(|ip| ip.to_string()).as_deref());
        push_text(el, "max_ip", range.max_usable.map(|ip| ip.to_string()).as_deref());
        push_text(el, "num_ip", Some(&range.usable_count.to_string()));
    }
    if let Some(usage) = &details.usage {
        push_text(el, "available_ip_count", Some(&usage.available.to_string()));
        push_text(el, "free_ip_count", Some(&usage.free.to_string()));
        push_text(el, "used_ip_count", Some(&usage.used.to_string()));
        push_text(
            el,
            "used_ip_percentage",
            usage.used_percentage().map(|p| format!("{:.2}", p)).as_deref(),
        );
    }
    push_text(el, "nic_count", Some(&details.nic_count.to_string()));
    push_text(
        el,
        "attached_nic_count",
        Some(&details.attached_nic_count.to_string()),
    );
}

fn address_element(address: &Address) -> Element {
    let mut el = record_element(ADDRESS, &address.id);
    el.attributes
        .insert("kind".to_string(), address.kind.as_str().to_string());
    push_text(&mut el, "name", Some(&address.name));
    push_text(&mut el, "network", Some(address.network.as_str()));
    push_text(&mut el, "ip", address.ip.as_deref());
    push_text(&mut el, "fqdn", address.fqdn.as_deref());
    push_text(&mut el, "note", address.note.as_deref());
    push_text(&mut el, "active", flag(address.active));
    el
}

fn nat_mapping_element(mapping: &NatMapping) -> Element {
    let mut el = record_element(MAPPING, &mapping.id);
    push_text(&mut el, "name", Some(&mapping.name));
    push_text(&mut el, "type", Some(mapping.nat_type.as_str()));
    push_text(&mut el, "nat_network", Some(mapping.nat_network.as_str()));
    push_text(&mut el, "nat_ip", Some(&mapping.nat_ip));
    push_text(&mut el, "dst_network", Some(mapping.dst_network.as_str()));
    push_text(&mut el, "dst_ip", Some(&mapping.dst_ip));
    push_text(&mut el, "active", flag(mapping.active));
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_inventory, Address};
    use std::io::Cursor;

    fn sample() -> Inventory {
        let mut inventory = Inventory::new();
        let org = inventory
            .add_organization(Organization::new("Acme").with_id("org"))
            .unwrap();
        let lan = inventory
            .add_network(
                Network::new("LAN")
                    .with_id("lan")
                    .with_cidr("192.168.1.0", 24)
                    .with_gateway("192.168.1.1")
                    .with_organization(&org),
            )
            .unwrap();
        inventory
            .add_network(
                Network::new("DMZ")
                    .with_id("dmz")
                    .with_cidr("192.168.1.128", 25)
                    .with_parent(&lan),
            )
            .unwrap();
        inventory
            .add_address(Address::new(&lan, "192.168.1.10").with_id("a1"))
            .unwrap();
        inventory
    }

    fn render(inventory: &Inventory, options: &ExportOptions) -> String {
        let mut out = Vec::new();
        write_inventory(inventory, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_includes_derived_fields() {
        let xml = render(&sample(), &ExportOptions::default());
        let root = Element::parse(Cursor::new(xml.as_bytes())).unwrap();

        let networks = root.get_child("networks").unwrap();
        let dmz = networks
            .children
            .iter()
            .filter_map(|c| c.as_element())
            .find(|e| e.attributes.get("uuid").map(|s| s.as_str()) == Some("dmz"))
            .unwrap();
        let text = |el: &Element, name: &str| {
            el.get_child(name)
                .and_then(|c| c.get_text())
                .map(|t| t.to_string())
        };
        assert_eq!(text(dmz, "complete_name").as_deref(), Some("LAN / DMZ"));
        assert_eq!(text(dmz, "netmask").as_deref(), Some("255.255.255.128"));
        assert_eq!(text(dmz, "min_ip").as_deref(), Some("192.168.1.130"));
        assert_eq!(text(dmz, "max_ip").as_deref(), Some("192.168.1.254"));
        assert_eq!(text(dmz, "num_ip").as_deref(), Some("126"));

        let lan = networks
            .children
            .iter()
            .filter_map(|c| c.as_element())
            .find(|e| e.attributes.get("uuid").map(|s| s.as_str()) == Some("lan"))
            .unwrap();
        assert_eq!(text(lan, "free_ip_count").as_deref(), Some("253"));
        assert_eq!(text(lan, "used_ip_percentage").as_deref(), Some("1.17"));

        let org = root
            .get_child("organizations")
            .and_then(|o| o.get_child("organization"))
            .unwrap();
        assert_eq!(text(org, "subnet_count").as_deref(), Some("1"));
    }

    #[test]
    fn test_write_then_read_preserves_records() {
        let original = sample();
        let xml = render(&original, &ExportOptions::default());
        let restored = read_inventory(Cursor::new(xml.as_bytes())).unwrap();

        assert_eq!(
            restored.networks().collect::<Vec<_>>(),
            original.networks().collect::<Vec<_>>()
        );
        assert_eq!(
            restored.addresses().collect::<Vec<_>>(),
            original.addresses().collect::<Vec<_>>()
        );
        assert_eq!(
            restored.organizations().collect::<Vec<_>>(),
            original.organizations().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_write_is_byte_stable() {
        let inventory = sample();
        let first = render(&inventory, &ExportOptions::default());
        assert!(first.contains(r#"<address uuid="a1" kind="ip">"#));
        for _ in 0..20 {
            assert_eq!(render(&inventory, &ExportOptions::default()), first);
        }
    }

    #[test]
    fn test_skip_derived() {
        let xml = render(&sample(), &ExportOptions { skip_derived: true });
        assert!(!xml.contains("complete_name"));
        assert!(!xml.contains("free_ip_count"));
        assert!(xml.contains("<mask_bits>24</mask_bits>"));
    }
}
