//! Scanner module - sweeps the local subnet and fingerprints responders.
//!
//! `NetworkScanner` owns the live result set. A scan resolves the local
//! link, lists the usable hosts of its subnet (capped), lists the scanning
//! host itself, then fingerprints every other host on a bounded pool of
//! concurrent tasks. Results are published as they arrive.

pub mod fingerprint;
pub mod interface;
pub mod prober;
pub mod rate_limiter;
pub mod resolver;
pub mod results;

use crate::error::{ScanError, ScanResult};
use crate::types::{DeviceCategory, NetworkAddress, ScannedDevice, SubnetRange};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, info, warn};

pub use fingerprint::{Fingerprinter, Signature, SIGNATURES};
pub use interface::{LinkSource, LocalLink};
pub use prober::{ProbeOutcome, Prober, TcpProber, DEFAULT_PROBE_TIMEOUT};
pub use rate_limiter::RateLimiter;
pub use resolver::{Bounded, DnsResolver, NameResolver, NoResolver, DEFAULT_DNS_TIMEOUT};
pub use results::ResultSet;

/// Default cap on simultaneously fingerprinted hosts.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Default cap on hosts enumerated per scan.
pub const DEFAULT_HOST_LIMIT: usize = 254;

/// Host futures polled at once; the semaphore bounds actual probing.
const SWEEP_BUFFER: usize = 1024;

/// Name given to the scanning host's own entry.
pub const SELF_DEVICE_NAME: &str = "This device";

/// Tunables for a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Timeout per connect attempt.
    pub probe_timeout: Duration,
    /// Maximum host tasks in flight at once.
    pub concurrency: usize,
    /// Maximum hosts enumerated from the subnet.
    pub host_limit: usize,
    /// Bound on a reverse lookup; `None` waits indefinitely.
    pub dns_timeout: Option<Duration>,
    pub resolve_names: bool,
    /// Connect attempts per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Show a progress bar.
    pub progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            host_limit: DEFAULT_HOST_LIMIT,
            dns_timeout: Some(DEFAULT_DNS_TIMEOUT),
            resolve_names: true,
            rate_limit: 0,
            progress: false,
        }
    }
}

impl ScanOptions {
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_host_limit(mut self, limit: usize) -> Self {
        self.host_limit = limit;
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn with_name_resolution(mut self, enabled: bool) -> Self {
        self.resolve_names = enabled;
        self
    }

    pub fn with_rate_limit(mut self, rate: u32) -> Self {
        self.rate_limit = rate;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    fn validate(&self) -> ScanResult<()> {
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConfig("concurrency must be at least 1".to_string()));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(ScanError::InvalidConfig(format!(
                "concurrency must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.probe_timeout.is_zero() {
            return Err(ScanError::InvalidConfig("probe timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Everything known about a finished scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Local link the sweep was anchored on; `None` when none was found.
    pub link: Option<LocalLink>,
    /// Subnet in `network/prefix` form.
    pub subnet: Option<String>,
    /// Hosts handed to the fingerprinter (self excluded).
    pub hosts_scanned: usize,
    pub duration_ms: u64,
    pub devices: Vec<ScannedDevice>,
}

impl ScanReport {
    fn empty(duration: Duration) -> Self {
        Self {
            link: None,
            subnet: None,
            hosts_scanned: 0,
            duration_ms: duration.as_millis() as u64,
            devices: Vec::new(),
        }
    }

    pub fn threats(&self) -> impl Iterator<Item = &ScannedDevice> {
        self.devices.iter().filter(|d| d.is_threat)
    }
}

/// Subnet discovery and fingerprinting engine.
pub struct NetworkScanner {
    options: ScanOptions,
    link: LinkSource,
    fingerprinter: Fingerprinter,
    results: ResultSet,
    in_progress: AtomicBool,
}

impl NetworkScanner {
    /// Scanner using real sockets, the system resolver and OS link detection.
    pub fn new(options: ScanOptions) -> Self {
        let prober = TcpProber::new(options.probe_timeout)
            .with_rate_limiter(RateLimiter::new(options.rate_limit));
        let resolver: Arc<dyn NameResolver> = if options.resolve_names {
            Arc::new(Bounded::new(DnsResolver::new(), options.dns_timeout))
        } else {
            Arc::new(NoResolver)
        };

        Self::with_parts(options, LinkSource::default(), Arc::new(prober), resolver)
    }

    /// Scanner with explicit collaborators.
    pub fn with_parts(
        options: ScanOptions,
        link: LinkSource,
        prober: Arc<dyn Prober>,
        resolver: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            options,
            link,
            fingerprinter: Fingerprinter::new(prober, resolver),
            results: ResultSet::new(),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Replace the link source.
    pub fn with_link(mut self, link: LinkSource) -> Self {
        self.link = link;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Current contents of the live result set.
    pub fn snapshot(&self) -> Vec<ScannedDevice> {
        self.results.snapshot()
    }

    /// Receiver that is notified whenever the live result set changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ScannedDevice>> {
        self.results.subscribe()
    }

    pub fn is_scanning(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run a scan and return the discovered devices, sorted by address.
    pub async fn scan(&self) -> ScanResult<Vec<ScannedDevice>> {
        self.run().await.map(|report| report.devices)
    }

    /// Run a scan and return the full report.
    ///
    /// Fails only on invalid options or when another scan is already
    /// running on this scanner. A missing interface yields an empty report.
    pub async fn run(&self) -> ScanResult<ScanReport> {
        self.options.validate()?;
        let _guard = ScanGuard::acquire(&self.in_progress)?;
        let start = Instant::now();

        let link = match self.link.resolve() {
            Ok(link) => link,
            Err(e @ (ScanError::NoActiveInterface | ScanError::InterfaceNotFound(_))) => {
                warn!(error = %e, "nothing to scan");
                self.results.clear();
                return Ok(ScanReport::empty(start.elapsed()));
            }
            Err(e) => return Err(e),
        };
        let subnet = link.subnet()?;

        let local = NetworkAddress::from(link.address);
        let targets = capped_targets(&subnet, local, self.options.host_limit);

        info!(
            link = %link,
            subnet = %subnet,
            hosts = targets.len(),
            concurrency = self.options.concurrency,
            "starting scan"
        );

        self.results.clear();
        self.results.insert(
            ScannedDevice::new(link.address.to_string(), DeviceCategory::SelfDevice, false)
                .with_name(Some(SELF_DEVICE_NAME.to_string())),
        );

        let hosts_scanned = targets.len();
        self.sweep(targets).await;

        let devices = self.results.snapshot();
        let duration = start.elapsed();
        info!(
            devices = devices.len(),
            threats = devices.iter().filter(|d| d.is_threat).count(),
            elapsed_ms = duration.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanReport {
            subnet: Some(subnet.to_string()),
            link: Some(link),
            hosts_scanned,
            duration_ms: duration.as_millis() as u64,
            devices,
        })
    }

    /// Fingerprint every target with bounded concurrency.
    async fn sweep(&self, targets: Vec<Ipv4Addr>) {
        let progress = self.options.progress.then(|| progress_bar(targets.len()));
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency));

        stream::iter(targets)
            .map(|address| {
                let sem = Arc::clone(&semaphore);
                let progress = progress.clone();

                async move {
                    let found = match sem.acquire().await {
                        Ok(_permit) => self.fingerprinter.fingerprint(address).await,
                        Err(_) => None,
                    };

                    if let Some(device) = found {
                        if self.results.insert(device) {
                            debug!(%address, "device added");
                            if let Some(ref pb) = progress {
                                pb.set_message(format!("found {}", address));
                            }
                        }
                    }

                    if let Some(ref pb) = progress {
                        pb.inc(1);
                    }
                }
            })
            .buffer_unordered(SWEEP_BUFFER)
            .collect::<Vec<()>>()
            .await;

        if let Some(pb) = progress {
            pb.finish_with_message("sweep complete");
        }
    }
}

/// Usable hosts of `subnet` in ascending order, first `limit` only, with the
/// local address removed.
fn capped_targets(subnet: &SubnetRange, local: NetworkAddress, limit: usize) -> Vec<Ipv4Addr> {
    subnet
        .hosts()
        .take(limit)
        .filter(|addr| *addr != local)
        .map(NetworkAddress::to_ipv4)
        .collect()
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Marks a scanner busy for the lifetime of one scan.
struct ScanGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ScanGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> ScanResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ScanError::ScanInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
