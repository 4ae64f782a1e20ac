use serde::{Deserialize, Deserializer, Serialize};

use crate::UserId;

/// The effect of a matching ACL rule (distilled spec §3). A closed,
/// two-variant tag — not worth a trait object.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

impl<'de> Deserialize<'de> for Effect {
    /// Accepts `allow`/`deny` case-insensitively, with surrounding
    /// whitespace trimmed (SPEC_FULL.md §4.2.1).
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            other => Err(serde::de::Error::custom(format!(
                "invalid effect {other:?}, expected \"allow\" or \"deny\""
            ))),
        }
    }
}

/// Who a rule applies to: a specific user, or everybody (distilled spec §3,
/// GLOSSARY "Everyone").
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Principal {
    User(UserId),
    Everyone,
}

impl Principal {
    /// Parses one entry of a rule's `principals` list. `"*"` and the literal
    /// (case-insensitive) word `"everyone"` both mean [`Principal::Everyone`];
    /// anything else is taken as a user id.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == "*" || raw.eq_ignore_ascii_case("everyone") {
            return Some(Principal::Everyone);
        }
        UserId::new(raw).map(Principal::User)
    }

    /// Whether this principal applies to `who`.
    pub fn matches(&self, who: &UserId) -> bool {
        match self {
            Principal::Everyone => true,
            Principal::User(id) => id == who,
        }
    }

    /// Used for the "a rule naming a specific user outranks one naming
    /// everyone" precedence tie-break (distilled spec §4.3 step 5).
    pub fn specificity(&self) -> u8 {
        match self {
            Principal::User(_) => 1,
            Principal::Everyone => 0,
        }
    }
}
