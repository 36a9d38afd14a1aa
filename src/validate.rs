use crate::cidr::{cidr_string, contains, network_of, parse_address};
use crate::{IpamError, Network, Vlan};

/// Check an address literal against the network it is bound to.
///
/// A network without a CIDR cannot reject anything, so only the syntax is
/// checked in that case.
pub fn validate_address(address: &str, network: &Network) -> Result<(), IpamError> {
    let ip = parse_address(address)?;
    if let Some(net) = network_of(network)? {
        if !contains(&net, ip) {
            return Err(IpamError::OutOfRange {
                ip: address.to_string(),
                cidr: cidr_string(&net),
            });
        }
    }
    Ok(())
}

/// Check a gateway against the CIDR of its own network
pub fn validate_gateway(gateway: &str, network: &Network) -> Result<(), IpamError> {
    validate_address(gateway, network)
}

/// Check one side of a NAT mapping
pub fn validate_nat_endpoint(ip: &str, network: &Network) -> Result<(), IpamError> {
    validate_address(ip, network)
}

/// Field-level checks on a network record: address and mask form a valid
/// CIDR, and a gateway, if any, lies inside it.
pub fn validate_network_fields(network: &Network) -> Result<(), IpamError> {
    if let Some(address) = network.network_address.as_deref() {
        parse_address(address)?;
    }
    if let Some(mask_bits) = network.mask_bits {
        if mask_bits > 32 {
            return Err(IpamError::InvalidCidr(format!(
                "{}/{}",
                network.network_address.as_deref().unwrap_or(""),
                mask_bits
            )));
        }
    }
    network_of(network)?;

    if let Some(gateway) = network.gateway.as_deref() {
        validate_gateway(gateway, network)?;
    }
    Ok(())
}

pub fn validate_vlan(vlan: &Vlan) -> Result<(), IpamError> {
    if !(1..=4094).contains(&vlan.vlan_id) {
        return Err(IpamError::InvalidVlanId(vlan.vlan_id));
    }
    Ok(())
}
