use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::{IpamError, Network};

/// Usable host span of a network.
///
/// The first address after the network address is kept for the gateway, so
/// `min_usable` is `network + 2` while `usable_count` stays `total - 2`.
/// `min_usable`/`max_usable` are `None` when the span is empty (/31, /32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRange {
    pub min_usable: Option<Ipv4Addr>,
    pub max_usable: Option<Ipv4Addr>,
    pub usable_count: i64,
}

/// Parse a dotted-quad IPv4 address
pub fn parse_address(s: &str) -> Result<Ipv4Addr, IpamError> {
    Ipv4Addr::from_str(s).map_err(|_| IpamError::InvalidAddress(s.to_string()))
}

/// Build a canonical IPv4 network from an address and a prefix length.
///
/// The address must be the network address itself: host bits set is an error.
pub fn parse_network(address: &str, mask_bits: u8) -> Result<Ipv4Net, IpamError> {
    let invalid = || IpamError::InvalidCidr(format!("{address}/{mask_bits}"));

    let ip = Ipv4Addr::from_str(address).map_err(|_| invalid())?;
    let net = Ipv4Net::new(ip, mask_bits).map_err(|_| invalid())?;
    if net.network() != ip {
        return Err(invalid());
    }

    Ok(net)
}

/// Parse "address/prefix" notation with the same rules as [`parse_network`]
pub fn parse_cidr(cidr: &str) -> Result<Ipv4Net, IpamError> {
    let (address, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| IpamError::InvalidCidr(cidr.to_string()))?;
    let mask_bits: u8 = prefix
        .parse()
        .map_err(|_| IpamError::InvalidCidr(cidr.to_string()))?;
    parse_network(address, mask_bits)
}

/// The network described by a record, or `None` while it has no address/mask yet.
pub fn network_of(network: &Network) -> Result<Option<Ipv4Net>, IpamError> {
    match (network.network_address.as_deref(), network.mask_bits) {
        (Some(address), Some(mask_bits)) => parse_network(address, mask_bits).map(Some),
        _ => Ok(None),
    }
}

/// Check if an address falls within a network (network and broadcast included)
pub fn contains(network: &Ipv4Net, address: Ipv4Addr) -> bool {
    network.contains(&address)
}

/// Check if every address of `child` lies within `parent`
pub fn is_subnet_of(child: &Ipv4Net, parent: &Ipv4Net) -> bool {
    parent.prefix_len() <= child.prefix_len() && parent.contains(&child.network())
}

pub fn total_addresses(network: &Ipv4Net) -> u64 {
    1u64 << (32 - u32::from(network.prefix_len()))
}

pub fn host_range(network: &Ipv4Net) -> HostRange {
    let first = u32::from(network.network()).checked_add(2);
    let last = u32::from(network.broadcast()).checked_sub(1);

    let (min_usable, max_usable) = match (first, last) {
        (Some(first), Some(last)) if first <= last => {
            (Some(Ipv4Addr::from(first)), Some(Ipv4Addr::from(last)))
        }
        _ => (None, None),
    };

    HostRange {
        min_usable,
        max_usable,
        usable_count: total_addresses(network) as i64 - 2,
    }
}

pub fn netmask(network: &Ipv4Net) -> Ipv4Addr {
    network.netmask()
}

/// Canonical "address/prefix" string
pub fn cidr_string(network: &Ipv4Net) -> String {
    format!("{}/{}", network.network(), network.prefix_len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(cidr: &str) -> Ipv4Net {
        parse_cidr(cidr).unwrap()
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(
            parse_address("192.168.1.5").unwrap(),
            Ipv4Addr::new(192, 168, 1, 5)
        );
        assert_eq!(
            parse_address("999.1.1.1"),
            Err(IpamError::InvalidAddress("999.1.1.1".to_string()))
        );
        assert!(parse_address("192.168.1").is_err());
        assert!(parse_address("").is_err());
        assert!(parse_address("2001:db8::1").is_err());
    }

    #[test]
    fn test_parse_network() {
        let parsed = parse_network("10.20.0.0", 16).unwrap();
        assert_eq!(cidr_string(&parsed), "10.20.0.0/16");

        assert_eq!(
            parse_network("10.20.0.0", 33),
            Err(IpamError::InvalidCidr("10.20.0.0/33".to_string()))
        );
        assert!(parse_network("10.20.0", 16).is_err());
        // Host bits set
        assert!(parse_network("192.168.1.5", 24).is_err());

        assert_eq!(cidr_string(&parse_network("0.0.0.0", 0).unwrap()), "0.0.0.0/0");
        assert_eq!(
            cidr_string(&parse_network("192.168.1.100", 32).unwrap()),
            "192.168.1.100/32"
        );
    }

    #[test]
    fn test_parse_cidr_round_trip() {
        for cidr in ["192.168.1.0/24", "10.0.0.0/8", "172.16.4.0/22", "1.2.3.4/32"] {
            let parsed = net(cidr);
            let again = parse_network(&parsed.network().to_string(), parsed.prefix_len()).unwrap();
            assert_eq!(cidr_string(&again), cidr);
        }
        assert!(parse_cidr("192.168.1.0").is_err());
        assert!(parse_cidr("192.168.1.0/abc").is_err());
    }

    #[test]
    fn test_contains() {
        let lan = net("192.168.1.0/24");
        assert!(contains(&lan, Ipv4Addr::new(192, 168, 1, 0)));
        assert!(contains(&lan, Ipv4Addr::new(192, 168, 1, 5)));
        assert!(contains(&lan, Ipv4Addr::new(192, 168, 1, 255)));
        assert!(!contains(&lan, Ipv4Addr::new(192, 168, 2, 0)));
        assert!(!contains(&lan, Ipv4Addr::new(10, 0, 0, 5)));

        let host = net("192.168.1.100/32");
        assert!(contains(&host, Ipv4Addr::new(192, 168, 1, 100)));
        assert!(!contains(&host, Ipv4Addr::new(192, 168, 1, 101)));
    }

    #[test]
    fn test_is_subnet_of() {
        let parent = net("192.168.1.0/24");
        assert!(is_subnet_of(&net("192.168.1.128/25"), &parent));
        assert!(is_subnet_of(&net("192.168.1.7/32"), &parent));
        assert!(is_subnet_of(&parent, &parent));
        assert!(!is_subnet_of(&net("192.168.2.0/24"), &parent));
        assert!(!is_subnet_of(&net("192.168.0.0/16"), &parent));
        assert!(is_subnet_of(&parent, &net("0.0.0.0/0")));
    }

    #[test]
    fn test_host_range() {
        let range = host_range(&net("192.168.1.0/24"));
        assert_eq!(range.min_usable, Some(Ipv4Addr::new(192, 168, 1, 2)));
        assert_eq!(range.max_usable, Some(Ipv4Addr::new(192, 168, 1, 254)));
        assert_eq!(range.usable_count, 254);

        let small = host_range(&net("10.0.0.0/30"));
        assert_eq!(small.min_usable, Some(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(small.max_usable, Some(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(small.usable_count, 2);
    }

    #[test]
    fn test_host_range_point_to_point_and_host_routes() {
        let p2p = host_range(&net("10.0.0.0/31"));
        assert_eq!(p2p.usable_count, 0);
        assert_eq!(p2p.min_usable, None);
        assert_eq!(p2p.max_usable, None);

        let host = host_range(&net("10.0.0.1/32"));
        assert_eq!(host.usable_count, -1);
        assert_eq!(host.min_usable, None);

        // No wrap-around at either end of the address space
        assert_eq!(host_range(&net("0.0.0.0/32")).max_usable, None);
        assert_eq!(host_range(&net("255.255.255.255/32")).min_usable, None);
    }

    #[test]
    fn test_total_addresses_and_netmask() {
        assert_eq!(total_addresses(&net("192.168.1.0/24")), 256);
        assert_eq!(total_addresses(&net("0.0.0.0/0")), 1u64 << 32);
        assert_eq!(total_addresses(&net("10.1.1.1/32")), 1);

        for mask_bits in 0..=32u8 {
            let parsed = parse_network("0.0.0.0", mask_bits).unwrap();
            assert_eq!(host_range(&parsed).usable_count, (1i64 << (32 - mask_bits)) - 2);
        }

        assert_eq!(
            netmask(&net("192.168.1.0/24")),
            Ipv4Addr::new(255, 255, 255, 0)
        );
        assert_eq!(netmask(&net("10.0.0.0/8")), Ipv4Addr::new(255, 0, 0, 0));
        assert_eq!(netmask(&net("0.0.0.0/0")), Ipv4Addr::new(0, 0, 0, 0));
    }

    #[test]
    fn test_network_of_skips_unconfigured() {
        let mut record = Network::new("lan");
        assert_eq!(network_of(&record).unwrap(), None);

        record.network_address = Some("192.168.1.0".to_string());
        assert_eq!(network_of(&record).unwrap(), None);

        record.mask_bits = Some(24);
        assert_eq!(
            network_of(&record).unwrap().map(|n| cidr_string(&n)),
            Some("192.168.1.0/24".to_string())
        );

        record.mask_bits = Some(40);
        assert!(network_of(&record).is_err());
    }
}
