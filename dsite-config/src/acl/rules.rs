//! The `Rule` and `RuleSet` model (distilled spec §3).

use dsite_api_types::{AclError, Effect, Principal, UserId};

use crate::glob::{specificity, CompiledGlob};
use crate::path;

/// One `(pattern, effect, principals)` rule, relative to its containing
/// rule set's anchor (distilled spec §3). Carries no access-kind of its
/// own: `Allow` grants Read/Create/Write uniformly, never Admin — see
/// SPEC_FULL.md §4.3 for why.
pub struct Rule {
    pattern: String,
    compiled: CompiledGlob,
    effect: Effect,
    principals: Vec<Principal>,
}

impl Rule {
    /// Builds a rule, precompiling its glob pattern. Returns `None` on a
    /// malformed pattern — callers should log and drop the rule rather than
    /// fail the whole rule set (distilled spec §7).
    pub fn new(pattern: impl Into<String>, effect: Effect, principals: Vec<Principal>) -> Option<Self> {
        let pattern = pattern.into();
        let compiled = CompiledGlob::compile(&pattern)?;
        Some(Rule {
            pattern,
            compiled,
            effect,
            principals,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn matches_path(&self, relative: &str) -> bool {
        self.compiled.is_match(relative)
    }

    pub fn applies_to(&self, user: &UserId) -> bool {
        self.principals.iter().any(|p| p.matches(user))
    }

    /// `(literal_prefix_len, wildcard_count)` — see [`crate::glob::specificity`].
    pub fn specificity(&self) -> (usize, usize) {
        specificity(&self.pattern)
    }

    /// Highest principal-scope rank among this rule's principals that apply
    /// to `user` (distilled spec §4.3 step 5, "a rule naming a specific user
    /// outranks one naming everyone"). Only meaningful when [`Self::applies_to`]
    /// is true.
    pub fn principal_rank(&self, user: &UserId) -> u8 {
        self.principals
            .iter()
            .filter(|p| p.matches(user))
            .map(|p| p.specificity())
            .max()
            .unwrap_or(0)
    }
}

/// An immutable set of rules anchored at a subtree root (distilled spec §3).
pub struct RuleSet {
    anchor_path: String,
    rules: Vec<Rule>,
    terminal: bool,
}

impl RuleSet {
    /// Builds a rule set. Fails if `rules` is empty or `anchor_path` exceeds
    /// the maximum depth (distilled spec §3, §4.2 "install").
    pub fn new(anchor_path: impl Into<String>, rules: Vec<Rule>, terminal: bool) -> Result<Self, AclError> {
        let anchor_path = path::normalize(&anchor_path.into());
        if rules.is_empty() {
            return Err(AclError::Internal(
                "rule set has no rules after validation".to_string(),
            ));
        }
        path::check_depth(&anchor_path).map_err(AclError::InvalidPath)?;
        Ok(RuleSet {
            anchor_path,
            rules,
            terminal,
        })
    }

    pub fn anchor_path(&self) -> &str {
        &self.anchor_path
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn terminal(&self) -> bool {
        self.terminal
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn allow_everyone(pattern: &str) -> Rule {
        Rule::new(pattern, Effect::Allow, vec![Principal::Everyone]).unwrap()
    }

    #[test]
    fn rejects_malformed_glob() {
        assert!(Rule::new("a/[", Effect::Allow, vec![Principal::Everyone]).is_none());
    }

    #[test]
    fn rule_set_rejects_empty_rules() {
        assert!(RuleSet::new("a/b", Vec::new(), false).is_err());
    }

    #[test]
    fn rule_set_rejects_excessive_depth() {
        let deep = (0..300).map(|i| i.to_string()).collect::<Vec<_>>().join("/");
        let rules = vec![allow_everyone("**")];
        assert!(RuleSet::new(deep, rules, false).is_err());
    }

    #[test]
    fn rule_set_normalizes_anchor() {
        let rs = RuleSet::new("/a/./b/", vec![allow_everyone("**")], false).unwrap();
        assert_eq!(rs.anchor_path(), "a/b");
    }
}
