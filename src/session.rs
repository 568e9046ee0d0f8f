//! Session persistence and the process-wide session context.
//!
//! The [`SessionContext`] holds the current user and drives the session
//! lifecycle. It writes through to a [`SessionStore`], the durable side of a
//! session: [`FileStore`] for sessions that survive the process,
//! [`MemoryStore`] for ones that should not.

mod context;
mod store;

pub use self::{
    context::{SessionContext, SessionSnapshot},
    store::{FileStore, MemoryStore, SessionStore},
};
