//! Concurrent Key-Value Store with Per-Key Locking
//!
//! This module implements the authoritative store for stashkv.
//! It provides a thread-safe mapping from string keys to JSON-valued entries
//! with optional expiry timestamps, plus the per-key mutex table that
//! serializes all access to a single key.
//!
//! ## Design Decisions
//!
//! 1. **One mutex per key**: Instead of one big lock, each key gets its own
//!    mutex, created lazily on first access. Operations on different keys
//!    never contend.
//! 2. **Locks are never reclaimed**: A key's mutex stays in the table for the
//!    lifetime of the store, even after the key is unset. This rules out ever
//!    handing out a freed lock, at the cost of table growth proportional to
//!    the number of distinct keys ever touched.
//! 3. **No expiry filtering on `get`**: The store hands back whatever it
//!    physically holds. Expiry is enforced by the background sweeper and at
//!    the consumption points that choose to check it.
//! 4. **Wall-clock expiry**: Expiry timestamps are UNIX-epoch seconds so they
//!    survive the snapshot round trip across process restarts.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                         Store                             │
//! │                                                           │
//! │   data:  RwLock<HashMap<key, Entry>>                      │
//! │   locks: RwLock<HashMap<key, Arc<Mutex<()>>>>             │
//! │                                                           │
//! │   writer A ──lock("a")──┐        ┌──lock("b")── writer B  │
//! │                         ▼        ▼                        │
//! │                      ┌────┐   ┌────┐                      │
//! │                      │ a  │   │ b  │   (independent)      │
//! │                      └────┘   └────┘                      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Same-key operations are totally ordered by mutex acquisition; the order in
//! which writers and the sweeper win a given mutex is first-come-first-served
//! and must not be assumed deterministic by callers.

use crate::storage::snapshot::{self, SnapshotError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as UNIX-epoch seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// A stored value with an optional expiry timestamp.
///
/// Entries serialize as the two-element array `[value, expiry-or-null]`,
/// which is exactly the per-key layout of the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Value, Option<f64>)", into = "(Value, Option<f64>)")]
pub struct Entry {
    /// The actual value stored
    pub value: Value,
    /// When this entry expires, as UNIX-epoch seconds (None = never expires)
    pub expires_at: Option<f64>,
}

impl Entry {
    /// Creates a new entry without expiry.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates a new entry that expires at the given UNIX timestamp.
    pub fn with_expiry(value: Value, expires_at: f64) -> Self {
        Self {
            value,
            expires_at: Some(expires_at),
        }
    }

    /// Checks if this entry has expired.
    ///
    /// An entry whose expiry has passed is logically absent even while it is
    /// still physically present in the store.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    /// Checks if this entry has expired at the given timestamp.
    #[inline]
    pub fn is_expired_at(&self, now: f64) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

impl From<(Value, Option<f64>)> for Entry {
    fn from((value, expires_at): (Value, Option<f64>)) -> Self {
        Self { value, expires_at }
    }
}

impl From<Entry> for (Value, Option<f64>) {
    fn from(entry: Entry) -> Self {
        (entry.value, entry.expires_at)
    }
}

/// The authoritative key-value store for stashkv.
///
/// This is the single process-wide owner of the data: cursors only read it
/// and propose changes through `set`/`unset` at commit time, and the
/// background sweeper evicts physically-expired entries through the same
/// per-key locking discipline as every foreground writer.
///
/// # Thread Safety
///
/// Designed to be wrapped in an `Arc` and shared across cursors and the
/// sweeper thread. All operations take `&self`.
///
/// # Example
///
/// ```
/// use stashkv::storage::{Entry, Store};
/// use serde_json::json;
///
/// let store = Store::new("backup.json");
///
/// store.set("name", Entry::new(json!("stash")));
/// let entry = store.get("name");
/// assert_eq!(entry.map(|e| e.value), Some(json!("stash")));
///
/// store.unset("name");
/// assert!(store.get("name").is_none());
/// ```
pub struct Store {
    /// The authoritative mapping
    data: RwLock<HashMap<String, Entry>>,

    /// Per-key mutex table, grown lazily and never shrunk
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,

    /// Where `make_backup`/`restore_data` read and write the snapshot
    snapshot_path: PathBuf,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total UNSET operations
    unset_count: AtomicU64,

    /// Statistics: number of expired keys removed by sweep passes
    swept_count: AtomicU64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("keys", &self.len())
            .field("snapshot_path", &self.snapshot_path)
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Store {
    /// Creates an empty store bound to the given snapshot path.
    ///
    /// Nothing is read from disk; use [`Store::open`] to restore the last
    /// snapshot on construction.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            locks: RwLock::new(HashMap::new()),
            snapshot_path: snapshot_path.into(),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            unset_count: AtomicU64::new(0),
            swept_count: AtomicU64::new(0),
        }
    }

    /// Creates a store and restores the snapshot at the given path.
    ///
    /// A missing snapshot file is not an error: the store starts empty.
    /// An unreadable or malformed snapshot is surfaced to the caller.
    pub fn open(snapshot_path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let store = Self::new(snapshot_path);
        store.restore_data()?;
        Ok(store)
    }

    /// Returns the path the snapshot is read from and written to.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Returns the mutex guarding the given key, creating it on first access.
    ///
    /// This is the serialization point for everything that touches a key:
    /// cursors hold the handle across their read-then-decide sequences, and
    /// `set`/`unset`/the sweeper acquire it for each read-modify-write.
    /// Mutexes are never removed from the table, so a handle obtained here
    /// stays valid for the lifetime of the store.
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().unwrap().get(key) {
            return Arc::clone(lock);
        }

        let mut locks = self.locks.write().unwrap();
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Gets the entry for a key.
    ///
    /// This is a plain lookup: no expiry filtering is performed here, so a
    /// logically-expired entry that the sweeper has not yet removed is still
    /// returned. Callers that care apply the expiry check themselves.
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        self.data.read().unwrap().get(key).cloned()
    }

    /// Returns a snapshot view of the entire live mapping.
    pub fn get_all(&self) -> HashMap<String, Entry> {
        self.data.read().unwrap().clone()
    }

    /// Sets the entry for a key, overwriting any previous entry.
    ///
    /// Acquires the key's mutex for the duration of the write. Always
    /// succeeds.
    pub fn set(&self, key: &str, entry: Entry) {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let lock = self.lock_for(key);
        let _guard = lock.lock().unwrap();

        self.data.write().unwrap().insert(key.to_string(), entry);
    }

    /// Removes a key if present.
    ///
    /// Acquires the key's mutex for the duration of the removal. Always
    /// succeeds; removing an absent key is a no-op.
    pub fn unset(&self, key: &str) {
        self.unset_count.fetch_add(1, Ordering::Relaxed);

        let lock = self.lock_for(key);
        let _guard = lock.lock().unwrap();

        self.data.write().unwrap().remove(key);
    }

    /// Runs one sweep pass over the store, removing expired entries.
    ///
    /// Iterates a snapshot of the current keys and, for each, acquires that
    /// key's mutex before checking and removing it. Keys inserted after the
    /// snapshot was taken are picked up by the next pass.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub fn sweep_expired(&self) -> u64 {
        let keys: Vec<String> = self.data.read().unwrap().keys().cloned().collect();
        let mut swept = 0u64;

        for key in keys {
            let lock = self.lock_for(&key);
            let _guard = lock.lock().unwrap();

            let mut data = self.data.write().unwrap();
            let expired = data
                .get(&key)
                .map(|entry| entry.is_expired())
                .unwrap_or(false);
            if expired {
                data.remove(&key);
                swept += 1;
            }
        }

        if swept > 0 {
            self.swept_count.fetch_add(swept, Ordering::Relaxed);
        }

        swept
    }

    /// Serializes the entire mapping to the snapshot file.
    ///
    /// The file is overwritten, not appended to. A write failure is fatal to
    /// the calling shutdown path and is not retried here.
    pub fn make_backup(&self) -> Result<(), SnapshotError> {
        let data = self.data.read().unwrap();
        snapshot::save(&self.snapshot_path, &data)
    }

    /// Loads the snapshot file into the store, replacing the current mapping.
    ///
    /// A missing file leaves the store empty and is not an error. A malformed
    /// file is surfaced as [`SnapshotError::Corrupt`] with no partial
    /// recovery.
    pub fn restore_data(&self) -> Result<(), SnapshotError> {
        if let Some(restored) = snapshot::load(&self.snapshot_path)? {
            *self.data.write().unwrap() = restored;
        }
        Ok(())
    }

    /// Returns the number of keys physically present in the store.
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns operation statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            unset_ops: self.unset_count.load(Ordering::Relaxed),
            swept: self.swept_count.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total UNSET operations
    pub unset_ops: u64,
    /// Total expired entries removed by sweeps
    pub swept: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_store() -> Store {
        let dir = tempfile::tempdir().unwrap();
        Store::new(dir.path().join("backup.json"))
    }

    #[test]
    fn test_set_and_get() {
        let store = scratch_store();

        store.set("key", Entry::new(json!("value")));
        assert_eq!(store.get("key"), Some(Entry::new(json!("value"))));
    }

    #[test]
    fn test_get_nonexistent() {
        let store = scratch_store();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_unset() {
        let store = scratch_store();

        store.set("key", Entry::new(json!("value")));
        store.unset("key");
        assert_eq!(store.get("key"), None);

        // Unsetting an absent key is a no-op
        store.unset("key");
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn test_get_all() {
        let store = scratch_store();

        store.set("key1", Entry::new(json!("value1")));
        store.set("key2", Entry::new(json!(2)));

        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("key1"), Some(&Entry::new(json!("value1"))));
        assert_eq!(all.get("key2"), Some(&Entry::new(json!(2))));
    }

    #[test]
    fn test_get_does_not_filter_expired() {
        let store = scratch_store();

        // Already past expiry: logically absent but physically present
        store.set("stale", Entry::with_expiry(json!("value"), unix_now() - 1.0));

        let entry = store.get("stale").unwrap();
        assert!(entry.is_expired());
        assert_eq!(entry.value, json!("value"));
    }

    #[test]
    fn test_lock_for_returns_same_mutex() {
        let store = scratch_store();

        let first = store.lock_for("key");
        let second = store.lock_for("key");
        assert!(Arc::ptr_eq(&first, &second));

        let other = store.lock_for("other");
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = scratch_store();
        let now = unix_now();

        store.set("expired", Entry::with_expiry(json!(1), now - 1.0));
        store.set("future", Entry::with_expiry(json!(2), now + 100.0));
        store.set("persistent", Entry::new(json!(3)));

        let swept = store.sweep_expired();
        assert_eq!(swept, 1);
        assert_eq!(store.len(), 2);
        assert!(store.get("expired").is_none());
        assert!(store.get("future").is_some());
        assert!(store.get("persistent").is_some());
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let now = unix_now();

        assert!(Entry::with_expiry(json!(1), now - 0.001).is_expired_at(now));
        assert!(Entry::with_expiry(json!(1), now).is_expired_at(now));
        assert!(!Entry::with_expiry(json!(1), now + 10.0).is_expired_at(now));
        assert!(!Entry::new(json!(1)).is_expired_at(now));
    }

    #[test]
    fn test_entry_serializes_as_pair() {
        let entry = Entry::with_expiry(json!({"a": [1, 2]}), 42.5);
        let encoded = serde_json::to_string(&entry).unwrap();
        assert_eq!(encoded, r#"[{"a":[1,2]},42.5]"#);

        let entry = Entry::new(json!("plain"));
        let encoded = serde_json::to_string(&entry).unwrap();
        assert_eq!(encoded, r#"["plain",null]"#);

        let decoded: Entry = serde_json::from_str(r#"["plain",null]"#).unwrap();
        assert_eq!(decoded, Entry::new(json!("plain")));
    }

    #[test]
    fn test_backup_and_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");

        let store = Store::new(&path);
        store.set("key1", Entry::new(json!("value1")));
        store.set("key2", Entry::with_expiry(json!([1, 2, 3]), 9_999_999_999.0));
        store.make_backup().unwrap();

        let restored = Store::open(&path).unwrap();
        assert_eq!(restored.get_all(), store.get_all());
    }

    #[test]
    fn test_open_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("missing.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_stats_counters() {
        let store = scratch_store();

        store.set("key", Entry::new(json!(1)));
        store.get("key");
        store.get("missing");
        store.unset("key");

        let stats = store.stats();
        assert_eq!(stats.set_ops, 1);
        assert_eq!(stats.get_ops, 2);
        assert_eq!(stats.unset_ops, 1);
        assert_eq!(stats.keys, 0);
    }

    #[test]
    fn test_concurrent_writers_distinct_keys() {
        use std::thread;

        let store = Arc::new(scratch_store());
        let mut handles = vec![];

        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key-{}-{}", i, j);
                    store.set(&key, Entry::new(json!(j)));
                    store.get(&key);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1000);
    }
}
