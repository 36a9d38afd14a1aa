pub mod accounting;
pub mod cidr;
pub mod cli;
mod document;
mod errors;
mod inventory;
pub mod sequence;
pub mod tree;
mod types;
pub mod validate;
mod xml_helpers;

pub use accounting::{network_usage, usage_report, AddressCountQuery};
pub use cidr::{
    contains, host_range, is_subnet_of, parse_address, parse_cidr, parse_network, HostRange,
};
pub use document::{read_inventory, write_inventory, ExportOptions};
pub use errors::IpamError;
pub use inventory::{Finding, Inventory, InventorySnapshot, NetworkDetails};
pub use sequence::{NameSequence, Sequence, SequentialNames};
pub use tree::{Forest, TreeRecord};
pub use types::{
    Address, AddressKind, NatMapping, NatType, Network, NetworkType, NetworkUsage, Organization,
    RecordId, RecordKind, Vlan, NEW_NAME,
};
pub use validate::{validate_address, validate_gateway, validate_nat_endpoint};
