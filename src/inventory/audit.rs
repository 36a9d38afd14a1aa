use std::fmt;

use crate::types::RecordKind;
use crate::validate::validate_vlan;
use crate::{IpamError, RecordId};

use super::Inventory;

/// One violation found while auditing a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: RecordKind,
    pub id: RecordId,
    pub name: String,
    pub error: IpamError,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}): {}", self.kind, self.id, self.name, self.error)
    }
}

impl<S> Inventory<S> {
    /// Re-run every record-level check and collect all violations.
    ///
    /// An inventory built only through `add_*`/`update_*` always audits clean.
    pub fn audit(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut record = |kind, id: &RecordId, name: &str, result: Result<(), IpamError>| {
            if let Err(error) = result {
                findings.push(Finding {
                    kind,
                    id: id.clone(),
                    name: name.to_string(),
                    error,
                });
            }
        };

        for organization in self.organizations.iter() {
            record(
                RecordKind::Organization,
                &organization.id,
                &organization.name,
                self.check_organization(organization),
            );
        }
        for vlan in self.vlans.values() {
            record(RecordKind::Vlan, &vlan.id, &vlan.name, validate_vlan(vlan));
        }
        for network in self.networks.iter() {
            record(
                RecordKind::Network,
                &network.id,
                &network.name,
                self.check_network(network),
            );
        }
        for address in self.addresses.values() {
            record(
                RecordKind::Address,
                &address.id,
                &address.name,
                self.check_address(address),
            );
        }
        for mapping in self.nat_mappings.values() {
            record(
                RecordKind::NatMapping,
                &mapping.id,
                &mapping.name,
                self.check_nat_mapping(mapping),
            );
        }

        if !findings.is_empty() {
            tracing::debug!(findings = findings.len(), "audit found violations");
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventorySnapshot;
    use crate::{Address, Inventory, NatMapping, Network, Organization};

    #[test]
    fn test_audit_collects_every_violation() {
        let snapshot = InventorySnapshot {
            organizations: vec![
                Organization::new("A").with_id("a").with_parent(&"b".into()),
                Organization::new("B").with_id("b").with_parent(&"a".into()),
            ],
            networks: vec![
                Network::new("lan").with_id("lan").with_cidr("192.168.1.0", 24),
                Network::new("stray")
                    .with_id("stray")
                    .with_cidr("10.0.0.0", 24)
                    .with_parent(&"lan".into()),
            ],
            addresses: vec![
                Address::new(&"lan".into(), "192.168.1.10").with_id("ok"),
                Address::new(&"lan".into(), "10.1.1.1").with_id("bad"),
            ],
            nat_mappings: vec![NatMapping::new(
                &"lan".into(),
                "192.168.1.1",
                &"gone".into(),
                "10.0.0.1",
            )
            .with_id("nat")],
            ..Default::default()
        };
        let inventory = Inventory::from_snapshot(snapshot).unwrap();
        let findings = inventory.audit();

        let flagged: Vec<&str> = findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(flagged, vec!["a", "b", "stray", "bad", "nat"]);
        assert!(findings[0].error.is_cycle());
        assert!(matches!(findings[2].error, IpamError::Containment { .. }));
        assert!(matches!(findings[3].error, IpamError::OutOfRange { .. }));
        assert!(findings[3].to_string().starts_with("address bad (New): IP address 10.1.1.1"));
    }

    #[test]
    fn test_audit_clean_inventory() {
        let mut inventory = Inventory::new();
        let lan = inventory
            .add_network(Network::new("lan").with_cidr("192.168.1.0", 24))
            .unwrap();
        inventory
            .add_address(Address::new(&lan, "192.168.1.20"))
            .unwrap();
        assert!(inventory.audit().is_empty());
        assert!(inventory.audit().is_empty());
    }
}
