//! Command strings sent to switches during a search.
//!
//! One Cisco-IOS-style dialect. Keeping the strings here lets tests script
//! a fleet with exactly what the search will ask for.

use crate::types::{MacAddress, VlanId};

/// MAC table filtered to one address.
pub fn mac_table_lookup(mac: &MacAddress) -> String {
    format!("show mac address-table address {}", mac)
}

/// Running configuration of one interface.
pub fn interface_running_config(interface: &str) -> String {
    format!("show running-config interface {}", interface)
}

/// Detail output for the SVI of a VLAN.
pub fn vlan_interface_detail(vlan: VlanId) -> String {
    interface_detail(&vlan.svi_name())
}

/// Detail output for any interface.
pub fn interface_detail(interface: &str) -> String {
    format!("show interface {}", interface)
}

/// Brief layer-3 interface table, filtered to SVIs.
pub fn svi_brief_table() -> String {
    "show ip interface brief | include Vlan".to_string()
}
