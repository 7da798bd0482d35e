//! In-memory sessions with expiry.
//!
//! A [`SessionRegistry`] is an explicit handle owned by whoever composes the
//! application and passed to the middleware or handlers that need it. Clones
//! share the same sessions.

mod registry;

pub use registry::{SessionRecord, SessionRegistry, DEFAULT_SESSION_TIMEOUT};
