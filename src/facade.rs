//! The integration facade: the single capability (`permit`) through which
//! every blob/explorer/sync handler reaches the ACL Service (distilled spec
//! §4.5). Handlers must never touch [`dsite_config::AclTree`] directly.

use std::collections::HashSet;

use dsite_api_types::{AccessKind, AclError, UserId};
use dsite_buildcfg::RESERVED_PREFIXES;
use dsite_config::AclService;
use lazy_static::lazy_static;
use log::warn;

lazy_static! {
    static ref RESERVED: HashSet<&'static str> = RESERVED_PREFIXES.iter().copied().collect();
}

/// Wraps an [`AclService`] and converts every internal failure reachable on
/// the permission path into an opaque denial (distilled spec §7 "the
/// facade must translate any internal error... into a denial").
#[derive(Clone)]
pub struct Facade {
    acl: AclService,
}

impl Facade {
    pub fn new(acl: AclService) -> Self {
        Facade { acl }
    }

    /// `permit(user_id, path, access) -> Ok | ErrForbidden` (distilled spec
    /// §4.5). The caller never learns *why* a denial happened — only that
    /// one did, so a denied path's existence is never leaked (distilled
    /// spec §7).
    pub fn permit(&self, user: &UserId, path: &str, access: AccessKind) -> Result<(), AclError> {
        match self.acl.can_access(user, path, access) {
            Ok(()) => Ok(()),
            Err(AclError::AccessDenied(reason)) => {
                Err(AclError::AccessDenied(reason))
            }
            Err(other) => {
                warn!("facade: internal error on permission path for {user}: {other}");
                Err(AclError::AccessDenied("forbidden".to_string()))
            }
        }
    }

    /// Whether `path` falls under a reserved prefix, matched on segment
    /// boundary (case-insensitive) anywhere past the datasite identity —
    /// not a substring match (distilled spec §6 "Path conventions on the
    /// wire"; `myapi/x` is not reserved, `data/api/x` is).
    pub fn is_reserved(path: &str) -> bool {
        let normalized = dsite_config::path::normalize(path);
        let (_datasite, rest) = dsite_config::path::split_datasite(&normalized);
        dsite_config::path::segments(rest)
            .iter()
            .any(|seg| RESERVED.contains(seg.to_lowercase().as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_prefix_matches_any_segment_not_substring() {
        assert!(Facade::is_reserved("user@example.com/api/x"));
        assert!(!Facade::is_reserved("user@example.com/myapi/x"));
        assert!(Facade::is_reserved("user@example.com/.well-known/y"));
        assert!(Facade::is_reserved("user@example.com/data/API/t"));
        assert!(Facade::is_reserved("user@example.com/data/api/x"));
    }

    #[test]
    fn permit_denies_without_revealing_reason() {
        let acl = AclService::new(dsite_config::AclTree::new());
        let facade = Facade::new(acl);
        let carol = UserId::new("carol@example.com").unwrap();
        let err = facade
            .permit(&carol, "bob@example.com/private/x", AccessKind::Read)
            .unwrap_err();
        assert!(matches!(err, AclError::AccessDenied(_)));
    }
}
