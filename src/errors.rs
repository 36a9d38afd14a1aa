use thiserror::Error;

use crate::types::RecordKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpamError {
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("IP address {ip} is not in network {cidr}")]
    OutOfRange { ip: String, cidr: String },

    #[error("Network {child} is not contained in parent network {parent}")]
    Containment { child: String, parent: String },

    #[error("{kind} {id} cannot be placed under {parent}: the parent chain would form a cycle")]
    Cycle {
        kind: RecordKind,
        id: String,
        parent: String,
    },

    #[error("{kind} {id} is part of a parent cycle")]
    CycleDetected { kind: RecordKind, id: String },

    #[error("Unknown {kind} reference: {id}")]
    UnknownRecord { kind: RecordKind, id: String },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateRecord { kind: RecordKind, id: String },

    #[error("{kind} {id} requires a name")]
    MissingName { kind: RecordKind, id: String },

    #[error("Invalid VLAN ID: {0} (expected 1-4094)")]
    InvalidVlanId(u16),
}

impl IpamError {
    /// True for either cycle flavour (rejected assignment or a cycle met while walking).
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            IpamError::Cycle { .. } | IpamError::CycleDetected { .. }
        )
    }
}
