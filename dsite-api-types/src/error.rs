use thiserror::Error;

/// The error taxonomy callers of the ACL subsystem match on (distilled
/// spec §6 "Error surface to callers"). This is a typed contract boundary,
/// so it is a `thiserror` enum rather than an `anyhow::Error` — the same
/// split the teacher draws for e.g. `BlockReadError`.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum AclError {
    /// Malformed or out-of-range path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The ACL rejected the request. Carries a reason for logging only —
    /// callers must never surface it verbatim to an unauthenticated
    /// requester (distilled spec §7 "must not leak whether a denied path
    /// exists").
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// No applicable rule or object was found.
    #[error("not found")]
    NotFound,

    /// Tree corruption or I/O failure on the supporting configuration.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors surfaced by loading or saving a [subscription
/// config](crate) (distilled spec §4.4, §7).
#[derive(Error, Debug)]
pub enum SubscriptionConfigError {
    #[error("malformed subscription config: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
