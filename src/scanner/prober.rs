//! TCP connect prober.
//!
//! A probe is a single connect attempt with a hard timeout. The connection
//! is dropped as soon as it is established; only the outcome matters.
//! A refused or reset connection still proves the host is alive.

use crate::error::{ScanError, ScanResult};
use crate::scanner::rate_limiter::RateLimiter;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Default per-attempt connect timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(150);

/// Result of a single connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The handshake completed.
    Open,
    /// Actively rejected (RST). The port is closed but the host is up.
    Refused,
    /// No answer within the timeout.
    Timeout,
    /// Anything else: unreachable, routing failure, local socket error.
    OtherError,
}

impl ProbeOutcome {
    /// Whether this outcome proves the host is up.
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Open | Self::Refused)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Refused => write!(f, "refused"),
            Self::Timeout => write!(f, "timeout"),
            Self::OtherError => write!(f, "error"),
        }
    }
}

impl From<&ScanError> for ProbeOutcome {
    fn from(e: &ScanError) -> Self {
        match e {
            ScanError::ConnectionRefused | ScanError::ConnectionReset => Self::Refused,
            ScanError::Timeout => Self::Timeout,
            _ => Self::OtherError,
        }
    }
}

/// Something that can probe a single host port.
///
/// The orchestrator and fingerprinter only see this trait, so tests can
/// substitute scripted outcomes for real sockets.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: Ipv4Addr, port: u16) -> ProbeOutcome;
}

/// Prober backed by `tokio::net::TcpStream::connect`.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
    rate_limiter: Option<RateLimiter>,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            rate_limiter: None,
        }
    }

    /// Throttle connect attempts through a shared limiter.
    pub fn with_rate_limiter(mut self, limiter: Option<RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> ScanResult<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify_connect_error(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

/// Map a connect error onto the scan error taxonomy.
///
/// Error kinds are checked first; the message fallback catches platforms
/// that report resets or refusals as uncategorised errors.
fn classify_connect_error(e: io::Error) -> ScanError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => return ScanError::ConnectionRefused,
        io::ErrorKind::ConnectionReset => return ScanError::ConnectionReset,
        io::ErrorKind::TimedOut => return ScanError::Timeout,
        _ => {}
    }

    let message = e.to_string().to_lowercase();
    if message.contains("refused") {
        ScanError::ConnectionRefused
    } else if message.contains("reset") {
        ScanError::ConnectionReset
    } else if message.contains("unreachable") {
        if message.contains("host") {
            ScanError::HostUnreachable
        } else {
            ScanError::NetworkUnreachable(e.to_string())
        }
    } else {
        ScanError::ConnectionFailed(e.to_string())
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: Ipv4Addr, port: u16) -> ProbeOutcome {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let addr = SocketAddr::from((address, port));
        let outcome = match self.attempt_connect(addr).await {
            Ok(stream) => {
                drop(stream);
                ProbeOutcome::Open
            }
            Err(e) => ProbeOutcome::from(&e),
        };

        trace!(%addr, %outcome, "probe");
        outcome
    }
}
