//! Command Front End Module
//!
//! This module implements the text-protocol front end for stashkv: a parser
//! for typed commands and a session that translates them into calls on a
//! transactional cursor.
//!
//! ## Architecture
//!
//! ```text
//! Typed line
//!      │
//!      ▼
//! ┌─────────────────┐
//! │  parse_command  │  (parser)
//! └────────┬────────┘
//!          │ Command
//!          ▼
//! ┌─────────────────┐
//! │    Session      │  (session)
//! │                 │
//! │  - Dispatch     │
//! │  - Commit       │
//! │  - Format reply │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Cursor/Store   │  (txn + storage modules)
//! └─────────────────┘
//! ```
//!
//! ## Commands
//!
//! - `SET key value` — value is a JSON literal; bare text becomes a string
//! - `GET key`
//! - `DELETE key`
//! - `SET_EXPIRY key seconds`
//! - `GET_EXPIRY key`
//! - `EXIT`
//!
//! The session commits its cursor after every non-EXIT command, so the front
//! end never accumulates more than one logical operation per transaction.

pub mod parser;
pub mod session;

// Re-export the main types
pub use parser::{parse_command, Command, ParseError};
pub use session::{Reply, Session};
