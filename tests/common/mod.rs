#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_path(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("ipamkit_{label}_{}_{}", std::process::id(), nanos));
    path
}

pub fn write_temp_file(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    fs::write(&path, contents).expect("write temp file");
    path
}

/// Campus pool with two subnets and one unconfigured network below it.
pub const TEST_INVENTORY: &str = r#"<?xml version="1.0"?>
<ipam>
  <organizations>
    <organization uuid="org-acme">
      <name>Acme</name>
      <code>ACME</code>
    </organization>
    <organization uuid="org-ops">
      <name>Operations</name>
      <code>OPS</code>
      <parent>org-acme</parent>
    </organization>
  </organizations>
  <vlans>
    <vlan uuid="vlan-10">
      <name>users</name>
      <vlan_id>10</vlan_id>
    </vlan>
  </vlans>
  <networks>
    <network uuid="net-campus">
      <name>Campus</name>
      <type>pool</type>
      <network_address>10.0.0.0</network_address>
      <mask_bits>16</mask_bits>
      <organization>org-acme</organization>
    </network>
    <network uuid="net-lan">
      <name>LAN</name>
      <type>subnet</type>
      <network_address>10.0.1.0</network_address>
      <mask_bits>24</mask_bits>
      <gateway>10.0.1.1</gateway>
      <organization>org-ops</organization>
      <vlan>vlan-10</vlan>
      <parent>net-campus</parent>
    </network>
    <network uuid="net-dmz">
      <name>DMZ</name>
      <network_address>10.0.2.0</network_address>
      <mask_bits>25</mask_bits>
      <parent>net-campus</parent>
    </network>
    <network uuid="net-todo">
      <name>Planned</name>
      <parent>net-campus</parent>
    </network>
  </networks>
  <addresses>
    <address uuid="a-1" kind="ip">
      <name>web</name>
      <network>net-lan</network>
      <ip>10.0.1.10</ip>
      <fqdn>web.example.com</fqdn>
    </address>
    <address uuid="a-2" kind="nic">
      <name>db</name>
      <network>net-lan</network>
      <ip>10.0.1.11</ip>
    </address>
    <address uuid="a-3" kind="ip">
      <name>proxy</name>
      <network>net-dmz</network>
      <ip>10.0.2.5</ip>
    </address>
  </addresses>
  <nat>
    <mapping uuid="m-1">
      <name>web-in</name>
      <type>destination</type>
      <nat_network>net-dmz</nat_network>
      <nat_ip>10.0.2.100</nat_ip>
      <dst_network>net-lan</dst_network>
      <dst_ip>10.0.1.10</dst_ip>
    </mapping>
  </nat>
</ipam>
"#;

/// One child outside its parent, one address outside its network and a
/// two-node organization cycle.
pub const TEST_INVALID_INVENTORY: &str = r#"<?xml version="1.0"?>
<ipam>
  <organizations>
    <organization uuid="org-a">
      <name>A</name>
      <parent>org-b</parent>
    </organization>
    <organization uuid="org-b">
      <name>B</name>
      <parent>org-a</parent>
    </organization>
  </organizations>
  <networks>
    <network uuid="net-parent">
      <name>Parent</name>
      <network_address>192.168.1.0</network_address>
      <mask_bits>24</mask_bits>
    </network>
    <network uuid="net-child">
      <name>Child</name>
      <network_address>192.168.2.0</network_address>
      <mask_bits>24</mask_bits>
      <parent>net-parent</parent>
    </network>
  </networks>
  <addresses>
    <address uuid="a-out">
      <network>net-parent</network>
      <ip>10.0.0.5</ip>
    </address>
  </addresses>
</ipam>
"#;
