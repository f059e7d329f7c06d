//! Command Session
//!
//! A [`Session`] owns one [`Cursor`] and executes parsed commands against
//! it. After every non-EXIT command the session commits the cursor, so each
//! typed operation is its own single-operation transaction. That is a policy
//! of this front end, not of the core: library users drive cursors directly
//! and batch as many operations per commit as they like.

use crate::repl::parser::Command;
use crate::storage::Store;
use crate::txn::Cursor;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The printable outcome of one executed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The command mutated state and committed
    Ok,
    /// A GET result; `None` prints as nil
    Value(Option<Value>),
    /// A GET_EXPIRY result; `None` prints as nil
    Expiry(Option<f64>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Value(Some(value)) => write!(f, "{}", value),
            Reply::Expiry(Some(expiry)) => write!(f, "{}", expiry),
            Reply::Value(None) | Reply::Expiry(None) => write!(f, "(nil)"),
        }
    }
}

/// A front-end session: one cursor, one commit per executed command.
pub struct Session {
    cursor: Cursor,
}

impl Session {
    /// Creates a session with a fresh cursor over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            cursor: Cursor::new(store),
        }
    }

    /// Executes one parsed command and returns its reply.
    ///
    /// Every command except `EXIT` commits the cursor before returning.
    /// `EXIT` is a no-op here; the caller leaves the loop and writes the
    /// shutdown snapshot.
    pub fn execute(&mut self, command: Command) -> Reply {
        let reply = match command {
            Command::Set { key, value } => {
                self.cursor.set(&key, value);
                Reply::Ok
            }
            Command::Get { key } => Reply::Value(self.cursor.get(&key)),
            Command::Delete { key } => {
                self.cursor.delete(&key);
                Reply::Ok
            }
            Command::SetExpiry { key, seconds } => {
                self.cursor.set_expiry(&key, seconds);
                Reply::Ok
            }
            Command::GetExpiry { key } => Reply::Expiry(self.cursor.get_expiry(&key)),
            Command::Exit => return Reply::Ok,
        };

        self.cursor.commit();
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::parse_command;
    use serde_json::json;

    fn scratch_session() -> (Arc<Store>, Session) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::new(dir.path().join("backup.json")));
        let session = Session::new(Arc::clone(&store));
        (store, session)
    }

    #[test]
    fn test_set_commits_immediately() {
        let (store, mut session) = scratch_session();

        let reply = session.execute(parse_command("SET name \"stash\"").unwrap());
        assert_eq!(reply, Reply::Ok);

        // Committed: visible through the store directly
        assert_eq!(store.get("name").map(|e| e.value), Some(json!("stash")));
    }

    #[test]
    fn test_get_round_trip() {
        let (_store, mut session) = scratch_session();

        session.execute(parse_command("SET nums [1, 2]").unwrap());
        let reply = session.execute(parse_command("GET nums").unwrap());
        assert_eq!(reply, Reply::Value(Some(json!([1, 2]))));

        let reply = session.execute(parse_command("GET missing").unwrap());
        assert_eq!(reply, Reply::Value(None));
    }

    #[test]
    fn test_delete_commits_immediately() {
        let (store, mut session) = scratch_session();

        session.execute(parse_command("SET name x").unwrap());
        session.execute(parse_command("DELETE name").unwrap());
        assert!(store.get("name").is_none());
    }

    #[test]
    fn test_expiry_commands() {
        let (store, mut session) = scratch_session();

        session.execute(parse_command("SET session token").unwrap());
        session.execute(parse_command("SET_EXPIRY session 100").unwrap());

        match session.execute(parse_command("GET_EXPIRY session").unwrap()) {
            Reply::Expiry(Some(expiry)) => {
                assert_eq!(store.get("session").unwrap().expires_at, Some(expiry));
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = session.execute(parse_command("GET_EXPIRY missing").unwrap());
        assert_eq!(reply, Reply::Expiry(None));
    }

    #[test]
    fn test_exit_does_not_commit() {
        let (store, mut session) = scratch_session();

        session.execute(Command::Exit);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reply_display() {
        assert_eq!(Reply::Ok.to_string(), "OK");
        assert_eq!(Reply::Value(Some(json!([1, 2]))).to_string(), "[1,2]");
        assert_eq!(Reply::Value(None).to_string(), "(nil)");
        assert_eq!(Reply::Expiry(Some(12.5)).to_string(), "12.5");
        assert_eq!(Reply::Expiry(None).to_string(), "(nil)");
    }
}
