use std::fmt;
use std::str::FromStr;

/// Placeholder name that asks the store to draw a name from its sequence.
pub const NEW_NAME: &str = "New";

/// Opaque record identifier. New records get a random UUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn generate() -> Self {
        RecordId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Organization,
    Vlan,
    Network,
    Address,
    NatMapping,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Organization => write!(f, "organization"),
            RecordKind::Vlan => write!(f, "VLAN"),
            RecordKind::Network => write!(f, "network"),
            RecordKind::Address => write!(f, "address"),
            RecordKind::NatMapping => write!(f, "NAT mapping"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Range,
    #[default]
    Subnet,
    Pool,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Range => "range",
            NetworkType::Subnet => "subnet",
            NetworkType::Pool => "pool",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "range" => Ok(NetworkType::Range),
            "subnet" => Ok(NetworkType::Subnet),
            "pool" => Ok(NetworkType::Pool),
            other => Err(format!("unknown network type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AddressKind {
    #[default]
    Ip,
    Nic,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Ip => "ip",
            AddressKind::Nic => "nic",
        }
    }
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ip" => Ok(AddressKind::Ip),
            "nic" => Ok(AddressKind::Nic),
            other => Err(format!("unknown address kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NatType {
    Source,
    #[default]
    Destination,
}

impl NatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NatType::Source => "source",
            NatType::Destination => "destination",
        }
    }
}

impl FromStr for NatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(NatType::Source),
            "destination" => Ok(NatType::Destination),
            other => Err(format!("unknown NAT type '{other}'")),
        }
    }
}

/// A subnet, address range or pool.
///
/// `network_address` and `mask_bits` are both optional: a network without
/// them is "not configured yet" and every containment check against it is
/// skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub id: RecordId,
    pub name: String,
    pub active: bool,
    pub network_type: NetworkType,
    pub network_address: Option<String>,
    pub mask_bits: Option<u8>,
    pub gateway: Option<String>,
    pub organization: Option<RecordId>,
    pub vlan: Option<RecordId>,
    pub parent: Option<RecordId>,
    pub note: Option<String>,
}

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Network {
            id: RecordId::generate(),
            name: name.into(),
            active: true,
            network_type: NetworkType::default(),
            network_address: None,
            mask_bits: None,
            gateway: None,
            organization: None,
            vlan: None,
            parent: None,
            note: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_type(mut self, network_type: NetworkType) -> Self {
        self.network_type = network_type;
        self
    }

    pub fn with_cidr(mut self, network_address: &str, mask_bits: u8) -> Self {
        self.network_address = Some(network_address.to_string());
        self.mask_bits = Some(mask_bits);
        self
    }

    pub fn with_gateway(mut self, gateway: &str) -> Self {
        self.gateway = Some(gateway.to_string());
        self
    }

    pub fn with_parent(mut self, parent: &RecordId) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn with_organization(mut self, organization: &RecordId) -> Self {
        self.organization = Some(organization.clone());
        self
    }

    pub fn with_vlan(mut self, vlan: &RecordId) -> Self {
        self.vlan = Some(vlan.clone());
        self
    }
}

/// A single address assignment (IP or NIC) bound to one network.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: RecordId,
    pub name: String,
    pub active: bool,
    pub kind: AddressKind,
    pub network: RecordId,
    pub ip: Option<String>,
    pub fqdn: Option<String>,
    pub note: Option<String>,
}

impl Address {
    pub fn new(network: &RecordId, ip: &str) -> Self {
        Address {
            id: RecordId::generate(),
            name: NEW_NAME.to_string(),
            active: true,
            kind: AddressKind::default(),
            network: network.clone(),
            ip: Some(ip.to_string()),
            fqdn: None,
            note: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_kind(mut self, kind: AddressKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_fqdn(mut self, fqdn: &str) -> Self {
        self.fqdn = Some(fqdn.to_string());
        self
    }
}

/// Pairs an address in the NAT network with an address in the destination network.
#[derive(Debug, Clone, PartialEq)]
pub struct NatMapping {
    pub id: RecordId,
    pub name: String,
    pub active: bool,
    pub nat_type: NatType,
    pub nat_network: RecordId,
    pub nat_ip: String,
    pub dst_network: RecordId,
    pub dst_ip: String,
}

impl NatMapping {
    pub fn new(nat_network: &RecordId, nat_ip: &str, dst_network: &RecordId, dst_ip: &str) -> Self {
        NatMapping {
            id: RecordId::generate(),
            name: NEW_NAME.to_string(),
            active: true,
            nat_type: NatType::default(),
            nat_network: nat_network.clone(),
            nat_ip: nat_ip.to_string(),
            dst_network: dst_network.clone(),
            dst_ip: dst_ip.to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_type(mut self, nat_type: NatType) -> Self {
        self.nat_type = nat_type;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: RecordId,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub description: Option<String>,
    pub parent: Option<RecordId>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Organization {
            id: RecordId::generate(),
            name: name.into(),
            code: NEW_NAME.to_string(),
            active: true,
            description: None,
            parent: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parent(mut self, parent: &RecordId) -> Self {
        self.parent = Some(parent.clone());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vlan {
    pub id: RecordId,
    pub name: String,
    pub active: bool,
    pub vlan_id: u16,
    pub description: Option<String>,
}

impl Vlan {
    pub fn new(vlan_id: u16, name: impl Into<String>) -> Self {
        Vlan {
            id: RecordId::generate(),
            name: name.into(),
            active: true,
            vlan_id,
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }
}

/// Free/used address accounting for one network over its whole subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkUsage {
    pub available: u64,
    pub reserved_for_child_subnets: u64,
    pub assigned_addresses: u64,
    pub free: i64,
    pub used: i64,
}

impl NetworkUsage {
    /// `None` when there is no address space to divide by.
    pub fn used_percentage(&self) -> Option<f64> {
        if self.available == 0 {
            return None;
        }
        Some(self.used as f64 / self.available as f64 * 100.0)
    }
}
