//! Background Expiry Sweeper
//!
//! This module implements a background thread that periodically scans the
//! store for expired entries and removes them. This is "active expiry" as
//! opposed to "lazy expiry" (which happens at consumption points).
//!
//! ## Why Do We Need This?
//!
//! Lazy expiry alone has a problem: if a key expires and is never consulted
//! again, it stays in memory forever. The sweeper reclaims those entries.
//!
//! ## Design
//!
//! The sweeper runs on a dedicated OS thread and:
//! 1. Sleeps for a fixed interval (default: 1s)
//! 2. Wakes up and runs one sweep pass over the store
//! 3. Logs statistics about what was removed
//!
//! Each key checked during a pass is guarded by that key's own mutex, so the
//! sweeper follows exactly the same locking discipline as foreground writers
//! and cursors. It never takes a store-wide lock across the pass.

use crate::storage::Store;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Interval between sweep passes (default: 1s)
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper thread is signalled to stop and
/// joined.
#[derive(Debug)]
pub struct Sweeper {
    /// Sender to signal shutdown; dropping it also wakes the thread
    shutdown_tx: mpsc::Sender<()>,

    /// Join handle for the sweeper thread, taken on stop
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Starts the expiry sweeper on a background thread.
    ///
    /// # Arguments
    ///
    /// * `store` - The store to sweep
    /// * `config` - Configuration for the sweeper
    ///
    /// # Returns
    ///
    /// Returns a handle that stops the sweeper when dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use stashkv::storage::{Store, Sweeper, SweeperConfig};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(Store::new("backup.json"));
    /// let sweeper = Sweeper::start(Arc::clone(&store), SweeperConfig::default());
    ///
    /// // Sweeper runs in the background...
    ///
    /// // Dropping the handle stops it
    /// drop(sweeper);
    /// ```
    pub fn start(store: Arc<Store>, config: SweeperConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let handle = thread::spawn(move || sweeper_loop(store, config, shutdown_rx));

        info!("background expiry sweeper started");

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stops the expiry sweeper and waits for its thread to finish.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            info!("background expiry sweeper stopped");
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
fn sweeper_loop(store: Arc<Store>, config: SweeperConfig, shutdown_rx: mpsc::Receiver<()>) {
    loop {
        // Wait for the interval or a shutdown signal, whichever comes first
        match shutdown_rx.recv_timeout(config.interval) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => {
                debug!("expiry sweeper received shutdown signal");
                return;
            }
        }

        let swept = store.sweep_expired();
        if swept > 0 {
            debug!(
                swept = swept,
                keys_remaining = store.len(),
                "expired entries swept"
            );
        }
    }
}

/// Starts the expiry sweeper with default configuration.
///
/// This is a convenience function for simple use cases.
pub fn start_sweeper(store: Arc<Store>) -> Sweeper {
    Sweeper::start(store, SweeperConfig::default())
}
