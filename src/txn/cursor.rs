//! Transactional Cursor
//!
//! A [`Cursor`] wraps a shared [`Store`] and buffers writes, deletes and
//! expiry updates in a local overlay. The overlay shadows the store for the
//! owning cursor's reads and stays invisible to everything else until
//! `commit` pushes it into the store, one key at a time.
//!
//! ## Overlay Semantics
//!
//! - `set`/`delete`/`set_expiry` only touch the overlay.
//! - Reads consult the overlay first and fall through to the store.
//! - A delete is recorded as a [`Pending::Tombstone`] so "delete this key"
//!   is distinguishable from "no pending change".
//! - `commit` applies every pending key (tombstone ⇒ unset, put ⇒ set) and
//!   clears the overlay; `rollback` just clears it.
//!
//! ## Atomicity
//!
//! Commit is atomic per key, not across the batch: each key is applied under
//! its own store-level mutex, so a concurrent reader can observe some of a
//! commit's writes before the rest land. Callers that need multi-key
//! atomicity must build it on top.
//!
//! Every cursor operation acquires the target key's store-level mutex for
//! its duration, even the ones that only write the private overlay. That
//! establishes a total order with concurrent commits and sweeper evictions
//! touching the same key.

use crate::storage::{unix_now, Entry, Store};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An uncommitted write buffered in a cursor's overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// Set the key to this value on commit
    Put(Value),
    /// Remove the key on commit
    Tombstone,
}

/// A pending overlay entry: the buffered write plus its expiry, if any.
#[derive(Debug, Clone)]
struct PendingEntry {
    write: Pending,
    expires_at: Option<f64>,
}

/// A transactional cursor over a shared [`Store`].
///
/// Cursors are cheap to create, one per logical session or unit of work, and
/// reusable indefinitely: the overlay resets to empty after every commit or
/// rollback.
///
/// # Example
///
/// ```
/// use stashkv::storage::Store;
/// use stashkv::txn::Cursor;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let store = Arc::new(Store::new("backup.json"));
/// let mut cursor = Cursor::new(Arc::clone(&store));
///
/// cursor.set("name", json!("stash"));
/// assert!(store.get("name").is_none()); // not committed yet
///
/// cursor.commit();
/// assert_eq!(store.get("name").map(|e| e.value), Some(json!("stash")));
/// ```
#[derive(Debug)]
pub struct Cursor {
    /// The store this cursor proposes changes to
    store: Arc<Store>,

    /// Local uncommitted view: key -> pending write
    overlay: HashMap<String, PendingEntry>,
}

impl Cursor {
    /// Creates a cursor with an empty overlay over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            overlay: HashMap::new(),
        }
    }

    /// Buffers a write of `value` for `key`, clearing any pending expiry.
    ///
    /// Only the overlay changes; the store sees nothing until `commit`.
    pub fn set(&mut self, key: &str, value: Value) {
        let lock = self.store.lock_for(key);
        let _guard = lock.lock().unwrap();

        self.overlay.insert(
            key.to_string(),
            PendingEntry {
                write: Pending::Put(value),
                expires_at: None,
            },
        );
    }

    /// Reads the value for `key` as this cursor sees it.
    ///
    /// A pending `Put` in the overlay wins. A pending tombstone, or no
    /// pending entry at all, falls through to the store's current value.
    ///
    /// The fall-through does not apply the expiry check, so a
    /// logically-expired value the sweeper has not yet removed can still be
    /// observed here. The staleness window is bounded by the sweep interval.
    pub fn get(&self, key: &str) -> Option<Value> {
        let lock = self.store.lock_for(key);
        let _guard = lock.lock().unwrap();

        if let Some(pending) = self.overlay.get(key) {
            if let Pending::Put(value) = &pending.write {
                return Some(value.clone());
            }
        }

        self.store.get(key).map(|entry| entry.value)
    }

    /// Buffers a deletion of `key`.
    ///
    /// Always succeeds, whether or not the key exists anywhere.
    pub fn delete(&mut self, key: &str) {
        let lock = self.store.lock_for(key);
        let _guard = lock.lock().unwrap();

        self.overlay.insert(
            key.to_string(),
            PendingEntry {
                write: Pending::Tombstone,
                expires_at: None,
            },
        );
    }

    /// Buffers an expiry of `now + seconds` for `key`.
    ///
    /// The value part is sourced from the overlay if the key has a pending
    /// write, otherwise from the store. A tombstoned or entirely absent key
    /// gets a null value. Negative `seconds` produce an already-past expiry,
    /// which the next sweep pass will collect once committed.
    pub fn set_expiry(&mut self, key: &str, seconds: f64) {
        let lock = self.store.lock_for(key);
        let _guard = lock.lock().unwrap();

        let value = match self.overlay.get(key) {
            Some(PendingEntry {
                write: Pending::Put(value),
                ..
            }) => value.clone(),
            Some(_) => Value::Null,
            None => self
                .store
                .get(key)
                .map(|entry| entry.value)
                .unwrap_or(Value::Null),
        };

        self.overlay.insert(
            key.to_string(),
            PendingEntry {
                write: Pending::Put(value),
                expires_at: Some(unix_now() + seconds),
            },
        );
    }

    /// Reads the expiry timestamp for `key` as this cursor sees it.
    ///
    /// Sourced from the overlay if the key has a pending entry, otherwise
    /// from the store. Returns `None` for tombstones, keys without an expiry
    /// and absent keys.
    pub fn get_expiry(&self, key: &str) -> Option<f64> {
        let lock = self.store.lock_for(key);
        let _guard = lock.lock().unwrap();

        if let Some(pending) = self.overlay.get(key) {
            return pending.expires_at;
        }

        self.store.get(key).and_then(|entry| entry.expires_at)
    }

    /// Applies every pending overlay entry to the store and clears the
    /// overlay.
    ///
    /// Each key is applied under its own store-level mutex: tombstones call
    /// `unset`, puts call `set`. The batch is **not** atomic as a whole; a
    /// concurrent observer can see a partial set of this commit's writes.
    /// Committing an empty overlay is a no-op.
    pub fn commit(&mut self) {
        // Detach the overlay up front so the applied set is fixed
        let pending = std::mem::take(&mut self.overlay);

        for (key, entry) in pending {
            match entry.write {
                Pending::Tombstone => self.store.unset(&key),
                Pending::Put(value) => self.store.set(
                    &key,
                    Entry {
                        value,
                        expires_at: entry.expires_at,
                    },
                ),
            }
        }
    }

    /// Discards every pending overlay entry without touching the store.
    ///
    /// Idempotent: rolling back an empty overlay is a no-op.
    pub fn rollback(&mut self) {
        self.overlay.clear();
    }

    /// Returns true if the cursor has uncommitted changes.
    pub fn has_pending(&self) -> bool {
        !self.overlay.is_empty()
    }
}
