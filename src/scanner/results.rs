//! Live result set shared by all host tasks of a scan.
//!
//! The set lives inside a `watch` channel: every mutation runs under the
//! channel's lock and observers always read a complete, sorted,
//! deduplicated snapshot.

use crate::types::ScannedDevice;
use std::sync::Arc;
use tokio::sync::watch;

/// Sorted, address-unique collection of discovered devices.
///
/// Ordering is by the textual address, so `192.168.1.10` sorts before
/// `192.168.1.9`. Cloning yields another handle to the same set.
#[derive(Debug, Clone)]
pub struct ResultSet {
    tx: Arc<watch::Sender<Vec<ScannedDevice>>>,
}

impl ResultSet {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx: Arc::new(tx) }
    }

    /// Insert `device` unless its address is already present.
    ///
    /// Returns `true` when the device was added. The first insert for an
    /// address wins; later ones are ignored.
    pub fn insert(&self, device: ScannedDevice) -> bool {
        self.tx.send_if_modified(|devices| {
            match devices.binary_search_by(|d| d.address.as_str().cmp(device.address.as_str())) {
                Ok(_) => false,
                Err(pos) => {
                    devices.insert(pos, device);
                    true
                }
            }
        })
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.tx.send_if_modified(|devices| {
            let changed = !devices.is_empty();
            devices.clear();
            changed
        });
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<ScannedDevice> {
        self.tx.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Receiver notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ScannedDevice>> {
        self.tx.subscribe()
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new()
    }
}
