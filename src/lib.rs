//! # stashkv - A Concurrent In-Memory Key-Value Store
//!
//! stashkv is an in-process key-value store that layers three orthogonal
//! capabilities onto a single mapping: per-key mutual exclusion, cursor
//! transactions, and TTL expiry. A snapshot side-channel persists the whole
//! mapping to a JSON file and restores it at startup.
//!
//! ## Features
//!
//! - **Per-Key Locking**: One mutex per key, created lazily; operations on
//!   different keys proceed concurrently, operations on the same key are
//!   totally ordered
//! - **Cursor Transactions**: A cursor buffers writes and deletes in a local
//!   overlay, invisible to other cursors until commit
//! - **TTL Support**: Entries carry optional wall-clock expiry, enforced by
//!   a background sweeper
//! - **Snapshot Persistence**: The whole mapping dumps to a flat JSON file
//!   on shutdown and restores on startup
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              stashkv                                │
//! │                                                                     │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐              │
//! │  │    REPL     │───>│   Command   │───>│   Session   │              │
//! │  │  (stdin)    │    │   Parser    │    │ (1 commit / │              │
//! │  └─────────────┘    └─────────────┘    │  operation) │              │
//! │                                        └──────┬──────┘              │
//! │                                               │                     │
//! │                                               ▼                     │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────┐    │
//! │  │  Snapshot   │    │                 Store                    │    │
//! │  │ (JSON file) │<──>│   key -> Entry (value, expiry)           │    │
//! │  │             │    │   key -> Mutex (lazy, never reclaimed)   │    │
//! │  └─────────────┘    └──────────────────────────────────────────┘    │
//! │                                               ▲                     │
//! │                                               │                     │
//! │                     ┌─────────────────────────┴───────────────┐     │
//! │                     │                Sweeper                  │     │
//! │                     │          (Background OS Thread)         │     │
//! │                     └─────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use stashkv::storage::{Store, start_sweeper};
//! use stashkv::txn::Cursor;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! // Create the store (restores backup.json at startup with Store::open)
//! let store = Arc::new(Store::new("backup.json"));
//!
//! // Start the background expiry sweeper
//! let _sweeper = start_sweeper(Arc::clone(&store));
//!
//! // Work through a transactional cursor
//! let mut cursor = Cursor::new(Arc::clone(&store));
//! cursor.set("name", json!("stash"));
//! cursor.set_expiry("name", 3600.0);
//! cursor.commit();
//!
//! assert_eq!(cursor.get("name"), Some(json!("stash")));
//! ```
//!
//! ## Consistency Model
//!
//! - Operations on the *same* key are serialized by that key's mutex.
//! - Operations on *different* keys have no ordering guarantee.
//! - Commit is atomic per key, **not** across a cursor's whole batch: a
//!   concurrent observer can see a partial commit.
//! - Expiry is lazy plus eager: an expired entry is logically absent at once
//!   but stays physically present (and observable through plain reads) until
//!   the next sweep pass removes it.
//!
//! ## Module Overview
//!
//! - [`storage`]: The store, per-key lock table, sweeper and snapshot I/O
//! - [`txn`]: The transactional cursor overlay
//! - [`repl`]: Command parser and session for the text front end

pub mod repl;
pub mod storage;
pub mod txn;

// Re-export commonly used types for convenience
pub use repl::{parse_command, Command, ParseError, Reply, Session};
pub use storage::{start_sweeper, Entry, SnapshotError, Store, Sweeper, SweeperConfig};
pub use txn::Cursor;

/// The default snapshot file, read at startup and overwritten at shutdown
pub const DEFAULT_SNAPSHOT_PATH: &str = "backup.json";

/// Version of stashkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
