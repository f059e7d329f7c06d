//! Storage Module
//!
//! This module provides the authoritative store for stashkv: a thread-safe
//! key-value mapping with per-key locking, TTL support, a background expiry
//! sweeper and whole-store snapshot persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │   key -> Entry (value, optional expiry)                     │
//! │   key -> Mutex (created lazily, never reclaimed)            │
//! └─────────────────────────────────────────────────────────────┘
//!        ▲                     ▲                      ▲
//!        │                     │                      │
//!  ┌─────┴──────┐       ┌──────┴───────┐       ┌──────┴───────┐
//!  │  Cursors   │       │   Sweeper    │       │   Snapshot   │
//!  │ (txn mod)  │       │ (OS thread)  │       │  (JSON file) │
//!  └────────────┘       └──────────────┘       └──────────────┘
//! ```
//!
//! ## Features
//!
//! - **Per-Key Locking**: One mutex per key, so distinct keys never contend
//! - **TTL Support**: Entries can carry a wall-clock expiry timestamp
//! - **Active Expiry**: A background sweeper removes expired entries
//! - **Snapshot Persistence**: The whole mapping dumps to and restores from
//!   a single JSON file
//!
//! ## Example
//!
//! ```
//! use stashkv::storage::{Entry, Store, start_sweeper};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new("backup.json"));
//! let _sweeper = start_sweeper(Arc::clone(&store));
//!
//! store.set("name", Entry::new(json!("stash")));
//! assert_eq!(store.get("name").map(|e| e.value), Some(json!("stash")));
//! ```

pub mod expiry;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use expiry::{start_sweeper, Sweeper, SweeperConfig};
pub use snapshot::SnapshotError;
pub use store::{unix_now, Entry, Store, StoreStats};
