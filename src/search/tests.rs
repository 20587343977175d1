use super::*;
use crate::gateway::ScriptedGateway;
use rand::Rng;
use std::time::Duration;

const TARGET: &str = "0050.7966.6800";
const OTHER_MAC: &str = "0011.2233.4455";

fn target() -> MacAddress {
    TARGET.parse().unwrap()
}

fn fleet(names: &[&str]) -> Vec<DeviceHandle> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| DeviceHandle::new(*name, format!("10.0.0.{}", i + 1)).with_tag("switch"))
        .collect()
}

fn lookup() -> String {
    commands::mac_table_lookup(&target())
}

fn mac_table(vlan: u16, interface: &str) -> String {
    format!(
        "          Mac Address Table
-------------------------------------------

Vlan    Mac Address       Type        Ports
----    -----------       --------    -----
{:>4}    {}    DYNAMIC     {}
Total Mac Addresses for this criterion: 1
",
        vlan, TARGET, interface
    )
}

fn empty_mac_table() -> String {
    "          Mac Address Table
-------------------------------------------

Vlan    Mac Address       Type        Ports
----    -----------       --------    -----
Total Mac Addresses for this criterion: 0
"
    .to_string()
}

fn access_config(interface: &str, vlan: u16) -> String {
    format!(
        "Building configuration...\n\ninterface {}\n switchport access vlan {}\n switchport mode access\nend\n",
        interface, vlan
    )
}

fn trunk_config(interface: &str) -> String {
    format!(
        "Building configuration...\n\ninterface {}\n switchport trunk allowed vlan 10,20,30\n switchport mode trunk\nend\n",
        interface
    )
}

fn svi_detail(svi: &str, mac: &str) -> String {
    format!(
        "{} is up, line protocol is up\n  Hardware is EtherSVI, address is {} (bia {})\n  MTU 1500 bytes\n",
        svi, mac, mac
    )
}

fn svi_table(svis: &[&str]) -> String {
    svis.iter()
        .map(|svi| format!("{:<22} 10.0.0.1       YES NVRAM  up                    up\n", svi))
        .collect()
}

async fn run(gateway: ScriptedGateway, devices: Vec<DeviceHandle>) -> (Arc<ScriptedGateway>, SearchReport) {
    let gateway = Arc::new(gateway);
    let locator = MacLocator::new(Arc::clone(&gateway), devices);
    let report = locator.locate(target()).await;
    (gateway, report)
}

fn found(device: &str, interface: &str) -> SearchResult {
    SearchResult::Found {
        device: DeviceHandle::new(device, ""),
        interface: interface.to_string(),
    }
}

#[tokio::test]
async fn test_access_port_found_directly() {
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), empty_mac_table())
        .respond("d2", lookup(), mac_table(10, "Gi1/0/5"))
        .respond("d2", commands::interface_running_config("Gi1/0/5"), access_config("GigabitEthernet1/0/5", 10))
        .respond("d3", lookup(), empty_mac_table());

    let (gateway, report) = run(gateway, fleet(&["d1", "d2", "d3"])).await;

    assert_eq!(report.result, found("d2", "Gi1/0/5"));
    assert_eq!(report.stage, SearchStage::DirectPortCheck);
    assert_eq!(report.retained_vlan, VlanId::new(10));
    assert_eq!(report.queries_issued, 4);
    assert!(report.failures.is_empty());

    // Only the broadcast reached the other devices.
    assert_eq!(gateway.commands_for("d1"), vec![lookup()]);
    assert_eq!(gateway.commands_for("d3"), vec![lookup()]);
    assert_eq!(
        gateway.commands_for("d2"),
        vec![lookup(), commands::interface_running_config("Gi1/0/5")]
    );
}

#[tokio::test]
async fn test_trunk_falls_back_to_vlan_svi() {
    let vlan20 = VlanId::new(20).unwrap();
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), mac_table(20, "Te1/1/1"))
        .respond("d1", commands::interface_running_config("Te1/1/1"), trunk_config("TenGigabitEthernet1/1/1"))
        .respond("d1", commands::vlan_interface_detail(vlan20), svi_detail("Vlan20", OTHER_MAC))
        .respond("d2", lookup(), empty_mac_table())
        .respond("d3", lookup(), empty_mac_table())
        .respond("d3", commands::vlan_interface_detail(vlan20), svi_detail("Vlan20", "0050.7966.6800"));

    let (gateway, report) = run(gateway, fleet(&["d1", "d2", "d3"])).await;

    assert_eq!(report.result, found("d3", "Vlan20"));
    assert_eq!(report.stage, SearchStage::VlanSviFallback);
    assert_eq!(report.retained_vlan, Some(vlan20));
    assert_eq!(gateway.call_count("d2", &commands::vlan_interface_detail(vlan20)), 1);
    assert_eq!(gateway.call_count("d3", &commands::svi_brief_table()), 0);
}

#[tokio::test]
async fn test_vlan_svi_match_ignores_mac_grouping() {
    let vlan20 = VlanId::new(20).unwrap();
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), mac_table(20, "Te1/1/1"))
        .respond("d1", commands::interface_running_config("Te1/1/1"), trunk_config("Te1/1/1"))
        .respond("d1", commands::vlan_interface_detail(vlan20), svi_detail("Vlan20", "0050.7966.6800"));

    let devices = fleet(&["d1"]);
    let gateway = Arc::new(gateway);
    let locator = MacLocator::new(Arc::clone(&gateway), devices);
    assert_eq!(locator.fleet(), &[DeviceHandle::new("d1", "10.0.0.1")][..]);
    let report = locator.locate("00:50:79:66:68:00".parse().unwrap()).await;

    assert_eq!(report.result, found("d1", "Vlan20"));
}

#[tokio::test]
async fn test_not_found_checks_every_svi_once() {
    let devices = ["d1", "d2", "d3"];
    let mut gateway = ScriptedGateway::new();
    for device in devices {
        gateway = gateway
            .respond(device, lookup(), empty_mac_table())
            .respond(device, commands::svi_brief_table(), svi_table(&["Vlan1", "Vlan10", "Vlan10", "Vlan30"]));
        for svi in ["Vlan1", "Vlan10", "Vlan30"] {
            gateway = gateway.respond(device, commands::interface_detail(svi), svi_detail(svi, OTHER_MAC));
        }
    }

    let (gateway, report) = run(gateway, fleet(&devices)).await;

    assert_eq!(report.result, SearchResult::NotFound);
    assert_eq!(report.stage, SearchStage::ExhaustiveSviScan);
    assert_eq!(report.retained_vlan, None);

    for device in devices {
        assert_eq!(gateway.call_count(device, &lookup()), 1);
        assert_eq!(gateway.call_count(device, &commands::svi_brief_table()), 1);
        for svi in ["Vlan1", "Vlan10", "Vlan30"] {
            assert_eq!(gateway.call_count(device, &commands::interface_detail(svi)), 1, "{device} {svi}");
        }
        assert_eq!(gateway.commands_for(device).len(), 5);
    }
    assert_eq!(report.queries_issued, 15);
}

#[tokio::test]
async fn test_unreachable_device_does_not_block_result() {
    let gateway = ScriptedGateway::new()
        .unreachable("d1")
        .respond("d2", lookup(), mac_table(10, "Gi1/0/5"))
        .respond("d2", commands::interface_running_config("Gi1/0/5"), access_config("Gi1/0/5", 10));

    let (_, report) = run(gateway, fleet(&["d1", "d2"])).await;

    assert_eq!(report.result, found("d2", "Gi1/0/5"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].device, "d1");
    assert_eq!(report.failures[0].stage, SearchStage::Broadcast);
}

#[tokio::test]
async fn test_failing_device_skipped_in_exhaustive_scan() {
    let gateway = ScriptedGateway::new()
        .timing_out("d1")
        .respond("d2", commands::svi_brief_table(), svi_table(&["Vlan10", "Vlan30"]))
        .respond("d2", commands::interface_detail("Vlan10"), svi_detail("Vlan10", OTHER_MAC))
        .respond("d2", commands::interface_detail("Vlan30"), svi_detail("Vlan30", TARGET))
        .respond("d3", commands::svi_brief_table(), svi_table(&["Vlan40"]));

    let (gateway, report) = run(gateway, fleet(&["d1", "d2", "d3"])).await;

    assert_eq!(report.result, found("d2", "Vlan30"));
    assert_eq!(report.stage, SearchStage::ExhaustiveSviScan);
    // Both broadcasts to d1 failed and were recorded.
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.device == "d1"));
    // Nothing is queried after the match.
    assert_eq!(gateway.call_count("d3", &commands::interface_detail("Vlan40")), 0);
}

#[tokio::test]
async fn test_unknown_port_is_not_access() {
    let vlan10 = VlanId::new(10).unwrap();
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), mac_table(10, "Gi1/0/5"))
        .fail_command("d1", commands::interface_running_config("Gi1/0/5"), "Invalid input")
        .respond("d1", commands::vlan_interface_detail(vlan10), svi_detail("Vlan10", OTHER_MAC))
        .unreachable("d2");

    let (gateway, report) = run(gateway, fleet(&["d1", "d2"])).await;

    assert_eq!(report.result, SearchResult::NotFound);
    assert_eq!(report.stage, SearchStage::VlanSviFallback);
    // d2 never answered the broadcast, so it is not part of the SVI fallback.
    assert_eq!(gateway.commands_for("d2"), vec![lookup()]);
    // A VLAN fallback miss is terminal.
    assert_eq!(gateway.call_count("d1", &commands::svi_brief_table()), 0);
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn test_first_access_candidate_in_fleet_order() {
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), mac_table(10, "Gi1/0/48"))
        .respond("d1", commands::interface_running_config("Gi1/0/48"), trunk_config("Gi1/0/48"))
        .respond("d2", lookup(), mac_table(10, "Gi1/0/5"))
        .respond("d2", commands::interface_running_config("Gi1/0/5"), access_config("Gi1/0/5", 10))
        .respond("d3", lookup(), mac_table(10, "Gi1/0/7"))
        .respond("d3", commands::interface_running_config("Gi1/0/7"), access_config("Gi1/0/7", 10));

    let (gateway, report) = run(gateway, fleet(&["d1", "d2", "d3"])).await;

    assert_eq!(report.result, found("d2", "Gi1/0/5"));
    assert_eq!(gateway.call_count("d3", &commands::interface_running_config("Gi1/0/7")), 0);
}

#[tokio::test]
async fn test_result_independent_of_response_order() {
    let names = ["d1", "d2", "d3", "d4", "d5"];
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let mut gateway = ScriptedGateway::new()
            .respond("d1", lookup(), mac_table(10, "Te1/1/1"))
            .respond("d1", commands::interface_running_config("Te1/1/1"), trunk_config("Te1/1/1"))
            .respond("d3", lookup(), mac_table(10, "Gi1/0/5"))
            .respond("d3", commands::interface_running_config("Gi1/0/5"), access_config("Gi1/0/5", 10))
            .respond("d5", lookup(), mac_table(10, "Gi2/0/9"))
            .respond("d5", commands::interface_running_config("Gi2/0/9"), access_config("Gi2/0/9", 10))
            .unreachable("d4");
        for name in names {
            gateway = gateway.with_delay(name, Duration::from_millis(rng.gen_range(0..15)));
        }

        let (_, report) = run(gateway, fleet(&names)).await;

        assert_eq!(report.result, found("d3", "Gi1/0/5"));
        assert_eq!(report.retained_vlan, VlanId::new(10));
    }
}

#[tokio::test]
async fn test_first_arriving_vlan_is_retained() {
    let vlan20 = VlanId::new(20).unwrap();
    let vlan30 = VlanId::new(30).unwrap();
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), mac_table(20, "Te1/1/1"))
        .respond("d1", commands::interface_running_config("Te1/1/1"), trunk_config("Te1/1/1"))
        .respond("d1", commands::vlan_interface_detail(vlan30), svi_detail("Vlan30", TARGET))
        .with_delay("d1", Duration::from_millis(40))
        .respond("d2", lookup(), mac_table(30, "Te1/1/2"))
        .respond("d2", commands::interface_running_config("Te1/1/2"), trunk_config("Te1/1/2"))
        .respond("d2", commands::vlan_interface_detail(vlan30), svi_detail("Vlan30", OTHER_MAC));

    let (gateway, report) = run(gateway, fleet(&["d1", "d2"])).await;

    // d2 answered first, so its VLAN wins even though d1 comes first in the fleet.
    assert_eq!(report.retained_vlan, Some(vlan30));
    assert_eq!(report.stage, SearchStage::VlanSviFallback);
    assert_eq!(report.result, found("d1", "Vlan30"));
    assert_eq!(gateway.call_count("d1", &commands::vlan_interface_detail(vlan20)), 0);
    assert_eq!(gateway.call_count("d2", &commands::vlan_interface_detail(vlan20)), 0);
}

#[tokio::test]
async fn test_empty_fleet_is_not_found() {
    let (gateway, report) = run(ScriptedGateway::new(), Vec::new()).await;

    assert_eq!(report.result, SearchResult::NotFound);
    assert_eq!(report.queries_issued, 0);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_report_serializes() {
    let gateway = ScriptedGateway::new()
        .respond("d1", lookup(), mac_table(10, "Gi1/0/5"))
        .respond("d1", commands::interface_running_config("Gi1/0/5"), access_config("Gi1/0/5", 10));

    let (_, report) = run(gateway, fleet(&["d1"])).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["target"], TARGET);
    assert_eq!(json["result"]["status"], "found");
    assert_eq!(json["result"]["device"]["name"], "d1");
    assert_eq!(json["result"]["interface"], "Gi1/0/5");
    assert_eq!(json["stage"], "direct_port_check");
    assert_eq!(json["retained_vlan"], 10);
}

#[test]
fn test_result_display() {
    assert_eq!(found("sw1", "Gi1/0/5").to_string(), "sw1 interface Gi1/0/5");
    assert_eq!(SearchResult::NotFound.to_string(), "MAC was not found");
}
