//! Default paths, filenames and other constants shared across the workspace.
//!
//! Centralizing these (rather than scattering literals through the loader,
//! the facade and the binaries) mirrors how the teacher workspace keeps its
//! `/etc/proxmox-backup`-style paths in one small `buildcfg` crate.

/// Default root directory under which per-datasite namespaces live.
pub const DEFAULT_DATASTORE_ROOT: &str = "/var/lib/dsite-node/datasites";

/// Name of the per-directory ACL rule-set file consulted by the ACL tree loader.
pub const ACL_FILE_NAME: &str = "syft.pub.yaml";

/// Name of the per-client subscription policy file.
pub const SUBSCRIPTION_FILE_NAME: &str = "syft.sub.yaml";

/// Directory (relative to a client's home) holding [`SUBSCRIPTION_FILE_NAME`].
pub const SUBSCRIPTION_DIR_NAME: &str = ".dsite";

/// Maximum path depth (in segments) accepted anywhere paths are validated.
pub const MAX_PATH_DEPTH: usize = 255;

/// Segment-boundary-matched prefixes that write endpoints reject before any ACL check.
pub const RESERVED_PREFIXES: &[&str] = &["api", ".well-known", "_internal"];

/// Unix permission bits for the subscription config's containing directory.
pub const SUBSCRIPTION_DIR_MODE: u32 = 0o700;

/// Unix permission bits for the subscription config file itself.
pub const SUBSCRIPTION_FILE_MODE: u32 = 0o600;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_prefixes_are_lowercase() {
        for prefix in RESERVED_PREFIXES {
            assert_eq!(&prefix.to_lowercase(), prefix);
        }
    }
}
