//! XML snapshot format exchanged by the command-line tool.
//!
//! ```xml
//! <ipam>
//!   <organizations><organization uuid="..">..</organization></organizations>
//!   <vlans><vlan uuid="..">..</vlan></vlans>
//!   <networks><network uuid="..">..</network></networks>
//!   <addresses><address uuid=".." kind="ip">..</address></addresses>
//!   <nat><mapping uuid="..">..</mapping></nat>
//! </ipam>
//! ```

mod read;
mod write;

pub use read::read_inventory;
pub use write::write_inventory;

pub(crate) const ROOT: &str = "ipam";
pub(crate) const ORGANIZATIONS: &str = "organizations";
pub(crate) const ORGANIZATION: &str = "organization";
pub(crate) const VLANS: &str = "vlans";
pub(crate) const VLAN: &str = "vlan";
pub(crate) const NETWORKS: &str = "networks";
pub(crate) const NETWORK: &str = "network";
pub(crate) const ADDRESSES: &str = "addresses";
pub(crate) const ADDRESS: &str = "address";
pub(crate) const NAT: &str = "nat";
pub(crate) const MAPPING: &str = "mapping";

/// Options for [`write_inventory`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Leave out computed elements (complete names, netmask, usage counters)
    pub skip_derived: bool,
}
