//! Transaction Module
//!
//! This module implements the cursor: a transactional overlay on top of the
//! store. A cursor buffers writes and deletes in a private, uncommitted view
//! and applies them to the store atomically per key on commit.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │   Cursor A   │     │   Cursor B   │
//! │  (overlay)   │     │  (overlay)   │
//! └──────┬───────┘     └──────┬───────┘
//!        │ commit             │ commit
//!        ▼                    ▼
//! ┌─────────────────────────────────────┐
//! │               Store                 │
//! │     (authoritative mapping)         │
//! └─────────────────────────────────────┘
//! ```
//!
//! Overlays are never shared: cursor A's uncommitted writes are invisible to
//! cursor B until A commits. Commit applies each pending key under that key's
//! store-level mutex, but the batch as a whole is not an atomic unit.

pub mod cursor;

// Re-export the main types
pub use cursor::{Cursor, Pending};
