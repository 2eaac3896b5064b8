//! End-to-end scans against scripted network behaviour.

use async_trait::async_trait;
use sentinel::scanner::{LinkSource, LocalLink, NoResolver, ProbeOutcome, Prober};
use sentinel::{DeviceCategory, NetworkScanner, ScanOptions, SubnetRange};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// A tiny fake LAN: per-host behaviour, everything else silent.
struct FakeLan {
    hosts: HashMap<Ipv4Addr, Host>,
}

enum Host {
    /// Accepts on these ports, refuses the rest.
    Open(Vec<u16>),
    /// Refuses every port.
    Refusing,
}

#[async_trait]
impl Prober for FakeLan {
    async fn probe(&self, address: Ipv4Addr, port: u16) -> ProbeOutcome {
        match self.hosts.get(&address) {
            Some(Host::Open(ports)) if ports.contains(&port) => ProbeOutcome::Open,
            Some(_) => ProbeOutcome::Refused,
            None => ProbeOutcome::Timeout,
        }
    }
}

fn lan() -> FakeLan {
    FakeLan {
        hosts: HashMap::from([
            (Ipv4Addr::new(192, 168, 1, 10), Host::Open(vec![554])),
            (Ipv4Addr::new(192, 168, 1, 20), Host::Refusing),
            (Ipv4Addr::new(192, 168, 1, 30), Host::Open(vec![135, 445])),
            (Ipv4Addr::new(192, 168, 1, 40), Host::Open(vec![445, 62078, 8080])),
        ]),
    }
}

fn scanner() -> NetworkScanner {
    NetworkScanner::with_parts(
        ScanOptions::default(),
        LinkSource::Fixed(LocalLink::parse("192.168.1.50/24").unwrap()),
        Arc::new(lan()),
        Arc::new(NoResolver),
    )
}

#[test]
fn subnet_of_local_address() {
    let range = SubnetRange::new(Ipv4Addr::new(192, 168, 1, 50), 24).unwrap();
    assert_eq!(range.network().to_string(), "192.168.1.0");
    assert_eq!(range.broadcast().to_string(), "192.168.1.255");
    assert_eq!(range.usable_count(), 254);
}

#[tokio::test]
async fn scan_fake_lan() {
    let scanner = scanner();
    let report = scanner.run().await.unwrap();

    let found: Vec<_> = report
        .devices
        .iter()
        .map(|d| (d.address.as_str(), d.category, d.is_threat))
        .collect();

    assert_eq!(
        found,
        vec![
            ("192.168.1.10", DeviceCategory::IpCameraDvr, true),
            ("192.168.1.20", DeviceCategory::GenericDevice, false),
            ("192.168.1.30", DeviceCategory::WindowsWorkstation, false),
            ("192.168.1.40", DeviceCategory::IpCameraDvr, true),
            ("192.168.1.50", DeviceCategory::SelfDevice, false),
        ]
    );
    assert_eq!(report.threats().count(), 2);
    assert_eq!(report.hosts_scanned, 253);
}

#[tokio::test]
async fn silent_hosts_are_absent() {
    let devices = scanner().scan().await.unwrap();
    assert!(devices.iter().all(|d| d.address != "192.168.1.99"));
}

#[tokio::test]
async fn observer_sees_final_snapshot() {
    let scanner = scanner();
    let rx = scanner.subscribe();

    let devices = scanner.scan().await.unwrap();
    assert_eq!(*rx.borrow(), devices);
    assert_eq!(scanner.snapshot(), devices);
}
