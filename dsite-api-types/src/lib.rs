//! Shared, dependency-light types for the datasite access-control and
//! subscription subsystems: identities, access kinds, rule effects and
//! principals, and the error taxonomy the rest of the workspace matches on.
//!
//! Kept deliberately free of any I/O or glob-matching dependency so that
//! `dsite-config` and a future facade crate can both depend on it without
//! dragging in file-system or pattern-matching machinery.

mod access;
mod error;
mod principal;
mod userid;

pub use access::AccessKind;
pub use error::{AclError, SubscriptionConfigError};
pub use principal::{Effect, Principal};
pub use userid::UserId;
