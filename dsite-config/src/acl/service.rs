//! Evaluates "may user U perform access A on file F?" against the
//! [`AclTree`] (distilled spec §4.3).

use dsite_api_types::{AccessKind, AclError, Effect, UserId};
use log::debug;

use super::tree::AclTree;
use crate::path;

/// The ACL decision capability. Cheap to clone: wraps an [`AclTree`], itself
/// an `Arc` to its root (mirrors the teacher's `CachedUserInfo`, a small
/// handle wrapping the shared tree rather than the tree itself).
#[derive(Clone)]
pub struct AclService {
    tree: AclTree,
}

impl AclService {
    pub fn new(tree: AclTree) -> Self {
        AclService { tree }
    }

    pub fn tree(&self) -> &AclTree {
        &self.tree
    }

    /// `can_access(user, file, access) -> Ok | Denied(reason)` (distilled
    /// spec §4.3). Every caller-visible error variant is `AclError::AccessDenied`;
    /// the denial reason is for logging, never for display to an
    /// unauthenticated requester (distilled spec §7).
    pub fn can_access(&self, user: &UserId, file_path: &str, access: AccessKind) -> Result<(), AclError> {
        let file_path = path::normalize(file_path);
        let (datasite, _rest) = path::split_datasite(&file_path);

        // Owner override: the datasite owner has implicit Admin on their
        // own subtree, bypassing rule lookup entirely (distilled spec §4.3
        // step 2, GLOSSARY "Owner override"). Admin grants every access kind.
        if datasite.eq_ignore_ascii_case(user.as_str()) && AccessKind::Admin.grants(access) {
            return Ok(());
        }

        let rule_set = match self.tree.find_nearest_with_rules(&file_path) {
            Ok(rs) => rs,
            Err(AclError::NotFound) => {
                debug!("acl: no rule set covers {file_path:?}, denying");
                return Err(AclError::AccessDenied("no rule".to_string()));
            }
            Err(other) => return Err(other),
        };

        let relative = file_path
            .strip_prefix(rule_set.anchor_path())
            .unwrap_or(&file_path)
            .trim_start_matches('/');

        let matching: Vec<_> = rule_set
            .rules()
            .iter()
            .filter(|rule| rule.applies_to(user) && rule.matches_path(relative))
            .collect();

        if matching.is_empty() {
            debug!("acl: no rule in {:?} matches {relative:?} for {user}", rule_set.anchor_path());
            return Err(AclError::AccessDenied("no matching rule".to_string()));
        }

        // Aggregate effects: Deny strictly wins over Allow regardless of
        // specificity. Among matches sharing the winning effect, the most
        // specific (by literal-prefix length, then fewest `**`) rule for
        // the highest-ranked applicable principal represents the decision
        // (distilled spec §4.3 step 5, GLOSSARY "Rule aggregate").
        let winning_effect = if matching.iter().any(|r| r.effect() == Effect::Deny) {
            Effect::Deny
        } else {
            Effect::Allow
        };

        let winner = matching
            .iter()
            .filter(|r| r.effect() == winning_effect)
            .max_by_key(|r| {
                let (literal_prefix_len, wildcard_count) = r.specificity();
                (literal_prefix_len, std::cmp::Reverse(wildcard_count), r.principal_rank(user))
            })
            .expect("winning_effect was derived from a non-empty matching set");

        if winning_effect == Effect::Deny {
            debug!(
                "acl: rule {:?} in {:?} denies {relative:?} for {user}",
                winner.pattern(),
                rule_set.anchor_path()
            );
            return Err(AclError::AccessDenied("denied by rule".to_string()));
        }

        // A winning Allow grants Read/Create/Write uniformly; it never
        // grants Admin (distilled spec §4.3, SPEC_FULL.md §4.3).
        let satisfied = [AccessKind::Read, AccessKind::Create, AccessKind::Write]
            .iter()
            .any(|granted| granted.grants(access));
        if !satisfied {
            debug!(
                "acl: rule {:?} in {:?} cannot grant {access:?} to {user}",
                winner.pattern(),
                rule_set.anchor_path()
            );
            return Err(AclError::AccessDenied("allow does not grant admin".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dsite_api_types::Principal;

    use crate::acl::rules::{Rule, RuleSet};

    fn service_with(rule_sets: Vec<RuleSet>) -> AclService {
        let tree = AclTree::new();
        for rs in rule_sets {
            tree.install(rs).unwrap();
        }
        AclService::new(tree)
    }

    fn rule(pattern: &str, effect: Effect, principals: Vec<Principal>) -> Rule {
        Rule::new(pattern, effect, principals).unwrap()
    }

    #[test]
    fn owner_always_has_admin() {
        let svc = service_with(vec![]);
        let bob = UserId::new("bob@example.com").unwrap();
        assert!(svc
            .can_access(&bob, "bob@example.com/private/x", AccessKind::Admin)
            .is_ok());
    }

    #[test]
    fn no_rule_set_denies_non_owner() {
        let svc = service_with(vec![]);
        let carol = UserId::new("carol@example.com").unwrap();
        assert!(svc
            .can_access(&carol, "bob@example.com/private/x", AccessKind::Read)
            .is_err());
    }

    #[test]
    fn allow_everyone_grants_read_but_not_admin() {
        let rs = RuleSet::new(
            "bob@example.com",
            vec![rule("public/**", Effect::Allow, vec![Principal::Everyone])],
            false,
        )
        .unwrap();
        let svc = service_with(vec![rs]);
        let carol = UserId::new("carol@example.com").unwrap();

        assert!(svc
            .can_access(&carol, "bob@example.com/public/a.txt", AccessKind::Read)
            .is_ok());
        assert!(svc
            .can_access(&carol, "bob@example.com/public/a.txt", AccessKind::Admin)
            .is_err());
        assert!(svc
            .can_access(&carol, "bob@example.com/private/a.txt", AccessKind::Read)
            .is_err());
    }

    #[test]
    fn deny_wins_over_allow_on_same_path() {
        let rs = RuleSet::new(
            "bob@example.com",
            vec![
                rule("shared/**", Effect::Allow, vec![Principal::Everyone]),
                rule(
                    "shared/secret/**",
                    Effect::Deny,
                    vec![Principal::Everyone],
                ),
            ],
            false,
        )
        .unwrap();
        let svc = service_with(vec![rs]);
        let carol = UserId::new("carol@example.com").unwrap();

        assert!(svc
            .can_access(&carol, "bob@example.com/shared/ok.txt", AccessKind::Read)
            .is_ok());
        assert!(svc
            .can_access(&carol, "bob@example.com/shared/secret/x", AccessKind::Read)
            .is_err());
    }

    #[test]
    fn principal_specific_rule_applies_only_to_named_user() {
        let rs = RuleSet::new(
            "bob@example.com",
            vec![rule(
                "docs/**",
                Effect::Allow,
                vec![Principal::User(UserId::new("carol@example.com").unwrap())],
            )],
            false,
        )
        .unwrap();
        let svc = service_with(vec![rs]);
        let carol = UserId::new("carol@example.com").unwrap();
        let dave = UserId::new("dave@example.com").unwrap();

        assert!(svc
            .can_access(&carol, "bob@example.com/docs/a.txt", AccessKind::Read)
            .is_ok());
        assert!(svc
            .can_access(&dave, "bob@example.com/docs/a.txt", AccessKind::Read)
            .is_err());
    }

    #[test]
    fn deny_wins_regardless_of_specificity_tie_break() {
        // Same pattern, opposite effects: Deny still wins even though
        // specificity and principal rank are tied between the two rules.
        let rs = RuleSet::new(
            "bob@example.com",
            vec![
                rule("shared/**", Effect::Allow, vec![Principal::Everyone]),
                rule("shared/**", Effect::Deny, vec![Principal::Everyone]),
            ],
            false,
        )
        .unwrap();
        let svc = service_with(vec![rs]);
        let carol = UserId::new("carol@example.com").unwrap();

        assert!(svc
            .can_access(&carol, "bob@example.com/shared/x", AccessKind::Read)
            .is_err());
    }

    #[test]
    fn terminal_rule_set_seals_subtree() {
        let outer = RuleSet::new(
            "bob@example.com",
            vec![rule("public/**", Effect::Allow, vec![Principal::Everyone])],
            false,
        )
        .unwrap();
        let inner = RuleSet::new(
            "bob@example.com/public",
            vec![rule("**", Effect::Deny, vec![Principal::Everyone])],
            true,
        )
        .unwrap();
        let svc = service_with(vec![outer, inner]);
        let carol = UserId::new("carol@example.com").unwrap();

        assert!(svc
            .can_access(&carol, "bob@example.com/public/x", AccessKind::Read)
            .is_err());
    }
}
