//! Session identifiers and local session state.
//!
//! Every request to the remote side is addressed by an encoded target string
//! derived from the (session, database, optional object) tuple. The encoding
//! is pure and injective: distinct tuples never produce the same target for
//! the lifetime of a session.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Separator between target segments.
const SEGMENT_SEPARATOR: char = '/';

/// Encodes a (session, database, optional object) tuple into the opaque
/// target string used to address the remote session.
///
/// Segments are joined with `/`; any `/` or `%` inside a segment is
/// percent-escaped so that distinct tuples cannot collide. An empty
/// `session_id` is allowed and yields a session-relative form with a
/// leading separator.
pub fn encode_target(session_id: &str, database: &str, object: Option<&str>) -> String {
    let mut target = String::with_capacity(
        session_id.len() + database.len() + object.map_or(0, str::len) + 2,
    );
    push_segment(&mut target, session_id);
    target.push(SEGMENT_SEPARATOR);
    push_segment(&mut target, database);
    if let Some(object) = object {
        target.push(SEGMENT_SEPARATOR);
        push_segment(&mut target, object);
    }
    target
}

fn push_segment(out: &mut String, segment: &str) {
    for ch in segment.chars() {
        match ch {
            '%' => out.push_str("%25"),
            SEGMENT_SEPARATOR => out.push_str("%2F"),
            _ => out.push(ch),
        }
    }
}

/// A local handle to a remote, stateful database session.
///
/// The handle carries the session coordinates used for target encoding and
/// the local "destroyed" mark that the submitter consults to fail fast
/// without a network call. Handles are shared via [`Arc`]; the destroyed
/// mark is sticky (there is no way to revive a destroyed session).
#[derive(Debug)]
pub struct SessionHandle {
    session_id: String,
    database: String,
    destroyed: AtomicBool,
}

impl SessionHandle {
    /// Creates a live handle for the given session coordinates.
    pub fn new(session_id: impl Into<String>, database: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            session_id: session_id.into(),
            database: database.into(),
            destroyed: AtomicBool::new(false),
        })
    }

    /// The opaque session id assigned by the server.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The database this session is bound to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Encodes the request target for this session, optionally scoped to an
    /// object within the database.
    pub fn target(&self, object: Option<&str>) -> String {
        encode_target(&self.session_id, &self.database, object)
    }

    /// Marks the session destroyed locally. Idempotent.
    pub fn mark_destroyed(&self) {
        self.destroyed.store(true, Ordering::Release);
    }

    /// Returns true if the session has been marked destroyed locally.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target(None))
    }
}
