//! Port-signature fingerprinting.
//!
//! Each host is probed on a fixed list of ports, one at a time, in priority
//! order. The first open streaming port ends probing for that host.
//! Otherwise every port is tried and the last matching signature decides
//! the category.

use crate::scanner::prober::{ProbeOutcome, Prober};
use crate::scanner::resolver::NameResolver;
use crate::types::{DeviceCategory, ScannedDevice};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::debug;

/// A port whose being open implies a device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub port: u16,
    pub service: &'static str,
    pub category: DeviceCategory,
}

impl Signature {
    const fn new(port: u16, service: &'static str, category: DeviceCategory) -> Self {
        Self {
            port,
            service,
            category,
        }
    }

    /// Streaming signatures mark the host as a potential camera.
    pub fn is_threat(&self) -> bool {
        self.category == DeviceCategory::IpCameraDvr
    }
}

/// Probe order matters: see the module docs.
pub const SIGNATURES: [Signature; 6] = [
    Signature::new(135, "msrpc", DeviceCategory::WindowsWorkstation),
    Signature::new(445, "microsoft-ds", DeviceCategory::WindowsWorkstation),
    Signature::new(62078, "iphone-sync", DeviceCategory::AppleDevice),
    Signature::new(554, "rtsp", DeviceCategory::IpCameraDvr),
    Signature::new(1935, "rtmp", DeviceCategory::IpCameraDvr),
    Signature::new(8080, "http-alt", DeviceCategory::IpCameraDvr),
];

/// Look up the signature for a port.
pub fn signature_for(port: u16) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| s.port == port)
}

/// Runs the signature probes against one host and classifies it.
#[derive(Clone)]
pub struct Fingerprinter {
    prober: Arc<dyn Prober>,
    resolver: Arc<dyn NameResolver>,
}

impl Fingerprinter {
    pub fn new(prober: Arc<dyn Prober>, resolver: Arc<dyn NameResolver>) -> Self {
        Self { prober, resolver }
    }

    /// Classify `address`, or `None` when it never answered.
    pub async fn fingerprint(&self, address: Ipv4Addr) -> Option<ScannedDevice> {
        let mut category = DeviceCategory::GenericDevice;
        let mut is_threat = false;
        let mut active = false;
        let mut open_ports = Vec::new();

        for signature in &SIGNATURES {
            let outcome = self.prober.probe(address, signature.port).await;
            active |= outcome.is_alive();

            if outcome == ProbeOutcome::Open {
                open_ports.push(signature.port);
                category = signature.category;
                if signature.is_threat() {
                    is_threat = true;
                    debug!(%address, port = signature.port, service = signature.service, "streaming port open");
                    break;
                }
            }
        }

        if !active {
            return None;
        }

        let resolved_name = self.resolver.reverse(address).await;
        debug!(%address, %category, is_threat, name = ?resolved_name, "host fingerprinted");

        Some(
            ScannedDevice::new(address.to_string(), category, is_threat)
                .with_name(resolved_name)
                .with_open_ports(open_ports),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scanner::resolver::NoResolver;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Prober returning scripted outcomes and recording every call.
    #[derive(Default)]
    pub(crate) struct ScriptedProber {
        outcomes: HashMap<(Ipv4Addr, u16), ProbeOutcome>,
        default: Option<ProbeOutcome>,
        pub calls: Mutex<Vec<(Ipv4Addr, u16)>>,
    }

    impl ScriptedProber {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, address: Ipv4Addr, port: u16, outcome: ProbeOutcome) -> Self {
            self.outcomes.insert((address, port), outcome);
            self
        }

        /// Outcome for every probe that has no scripted entry.
        pub fn otherwise(mut self, outcome: ProbeOutcome) -> Self {
            self.default = Some(outcome);
            self
        }

        pub fn ports_probed(&self, address: Ipv4Addr) -> Vec<u16> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(a, _)| *a == address)
                .map(|(_, p)| *p)
                .collect()
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, address: Ipv4Addr, port: u16) -> ProbeOutcome {
            self.calls.lock().unwrap().push((address, port));
            self.outcomes
                .get(&(address, port))
                .copied()
                .or(self.default)
                .unwrap_or(ProbeOutcome::Timeout)
        }
    }

    /// Resolver answering from a fixed table.
    pub(crate) struct StaticResolver(pub HashMap<Ipv4Addr, String>);

    #[async_trait]
    impl NameResolver for StaticResolver {
        async fn reverse(&self, address: Ipv4Addr) -> Option<String> {
            self.0.get(&address).cloned()
        }
    }

    /// Resolver that records how many probes had run at each lookup.
    struct RecordingResolver {
        prober: Arc<ScriptedProber>,
        probes_seen: Mutex<Vec<usize>>,
    }

    impl RecordingResolver {
        fn new(prober: Arc<ScriptedProber>) -> Self {
            Self {
                prober,
                probes_seen: Mutex::new(Vec::new()),
            }
        }

        fn lookups(&self) -> Vec<usize> {
            self.probes_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NameResolver for RecordingResolver {
        async fn reverse(&self, _address: Ipv4Addr) -> Option<String> {
            let probes = self.prober.calls.lock().unwrap().len();
            self.probes_seen.lock().unwrap().push(probes);
            None
        }
    }

    const HOST: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

    fn fingerprinter(prober: Arc<ScriptedProber>) -> Fingerprinter {
        Fingerprinter::new(prober, Arc::new(NoResolver))
    }

    #[tokio::test]
    async fn test_camera_signature() {
        let prober = Arc::new(ScriptedProber::new().with(HOST, 554, ProbeOutcome::Open));
        let device = fingerprinter(prober).fingerprint(HOST).await.unwrap();

        assert_eq!(device.address, "192.168.1.10");
        assert_eq!(device.category, DeviceCategory::IpCameraDvr);
        assert!(device.is_threat);
        assert_eq!(device.open_ports, vec![554]);
    }

    #[tokio::test]
    async fn test_streaming_port_stops_probing() {
        let prober = Arc::new(
            ScriptedProber::new()
                .with(HOST, 554, ProbeOutcome::Open)
                .otherwise(ProbeOutcome::Refused),
        );
        fingerprinter(Arc::clone(&prober)).fingerprint(HOST).await.unwrap();

        assert_eq!(prober.ports_probed(HOST), vec![135, 445, 62078, 554]);
    }

    #[tokio::test]
    async fn test_all_ports_probed_without_streaming() {
        let prober = Arc::new(
            ScriptedProber::new()
                .with(HOST, 445, ProbeOutcome::Open)
                .otherwise(ProbeOutcome::Refused),
        );
        let device = fingerprinter(Arc::clone(&prober)).fingerprint(HOST).await.unwrap();

        assert_eq!(prober.ports_probed(HOST).len(), SIGNATURES.len());
        assert_eq!(device.category, DeviceCategory::WindowsWorkstation);
        assert!(!device.is_threat);
    }

    #[tokio::test]
    async fn test_last_signature_wins() {
        let prober = Arc::new(
            ScriptedProber::new()
                .with(HOST, 445, ProbeOutcome::Open)
                .with(HOST, 62078, ProbeOutcome::Open),
        );
        let device = fingerprinter(prober).fingerprint(HOST).await.unwrap();

        assert_eq!(device.category, DeviceCategory::AppleDevice);
        assert_eq!(device.open_ports, vec![445, 62078]);
    }

    #[tokio::test]
    async fn test_refusing_host_is_generic() {
        let prober = Arc::new(ScriptedProber::new().otherwise(ProbeOutcome::Refused));
        let device = fingerprinter(prober).fingerprint(HOST).await.unwrap();

        assert_eq!(device.category, DeviceCategory::GenericDevice);
        assert!(!device.is_threat);
        assert!(device.open_ports.is_empty());
    }

    #[tokio::test]
    async fn test_silent_host_is_absent() {
        let prober = Arc::new(ScriptedProber::new().otherwise(ProbeOutcome::Timeout));
        assert!(fingerprinter(prober).fingerprint(HOST).await.is_none());

        let prober = Arc::new(ScriptedProber::new().otherwise(ProbeOutcome::OtherError));
        assert!(fingerprinter(prober).fingerprint(HOST).await.is_none());
    }

    #[tokio::test]
    async fn test_classification_is_repeatable() {
        let prober = Arc::new(
            ScriptedProber::new()
                .with(HOST, 135, ProbeOutcome::Open)
                .with(HOST, 1935, ProbeOutcome::Open),
        );
        let fp = fingerprinter(prober);

        let first = fp.fingerprint(HOST).await.unwrap();
        let second = fp.fingerprint(HOST).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.category, DeviceCategory::IpCameraDvr);
    }

    #[tokio::test]
    async fn test_name_resolved_for_active_host() {
        let prober = Arc::new(ScriptedProber::new().with(HOST, 62078, ProbeOutcome::Open));
        let resolver = StaticResolver(HashMap::from([(HOST, "iphone.lan".to_string())]));
        let fp = Fingerprinter::new(prober, Arc::new(resolver));

        let device = fp.fingerprint(HOST).await.unwrap();
        assert_eq!(device.resolved_name.as_deref(), Some("iphone.lan"));
    }

    #[tokio::test]
    async fn test_silent_host_is_never_resolved() {
        let prober = Arc::new(ScriptedProber::new().otherwise(ProbeOutcome::Timeout));
        let resolver = Arc::new(RecordingResolver::new(Arc::clone(&prober)));
        let fp = Fingerprinter::new(prober, resolver.clone());

        assert!(fp.fingerprint(HOST).await.is_none());
        assert!(resolver.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_live_host_resolved_once_after_probing() {
        let prober = Arc::new(ScriptedProber::new().otherwise(ProbeOutcome::Refused));
        let resolver = Arc::new(RecordingResolver::new(Arc::clone(&prober)));
        let fp = Fingerprinter::new(prober, resolver.clone());

        assert!(fp.fingerprint(HOST).await.is_some());
        assert_eq!(resolver.lookups(), vec![SIGNATURES.len()]);
    }

    #[tokio::test]
    async fn test_threat_host_resolved_after_early_stop() {
        let prober = Arc::new(ScriptedProber::new().with(HOST, 554, ProbeOutcome::Open));
        let resolver = Arc::new(RecordingResolver::new(Arc::clone(&prober)));
        let fp = Fingerprinter::new(prober, resolver.clone());

        fp.fingerprint(HOST).await.unwrap();
        assert_eq!(resolver.lookups(), vec![4]);
    }

    #[test]
    fn test_signature_lookup() {
        assert_eq!(signature_for(554).unwrap().service, "rtsp");
        assert!(signature_for(22).is_none());
        assert!(SIGNATURES.iter().filter(|s| s.is_threat()).all(|s| s.port != 445));
    }
}
