//! Per-client subscription policy: a default action plus ordered glob rules
//! deciding whether remote content is synchronized (distilled spec §4.4).
//!
//! Grounded on the closest prior art in the retrieval pack, a Rust port of
//! this same subscription engine; kept in the teacher's atomic-save idiom
//! (temp file + rename, explicit Unix permission bits) rather than that
//! port's bare `std::fs::write`+`rename`.

use std::fs;
use std::path::Path;

use dsite_buildcfg::{SUBSCRIPTION_DIR_MODE, SUBSCRIPTION_FILE_MODE};
use nix::sys::stat::{fchmod, Mode};
use nix::unistd::mkdir;
use serde::{Deserialize, Deserializer, Serialize};

use dsite_api_types::SubscriptionConfigError;

use crate::glob::glob_match;
use crate::path;

const CURRENT_VERSION: u32 = 1;

/// `(version, defaults, rules[])` (distilled spec §3 "Subscription Config").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscriptions {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub action: Action,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            action: Action::Block,
        }
    }
}

/// One subscription rule: `(action, datasite_pattern?, path_pattern)`
/// (distilled spec §3 "SubscriptionRule").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub datasite: Option<String>,
    pub path: String,
}

/// A closed, tagged variant (distilled spec §9 "Polymorphism") rather than
/// a class hierarchy. `Deny` is accepted on the wire as an alias of `Block`
/// (distilled spec §4.4).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Pause,
    Block,
    Deny,
}

impl Default for Action {
    fn default() -> Self {
        Action::Block
    }
}

impl<'de> Deserialize<'de> for Action {
    /// Accepts `allow|pause|block|deny` case-insensitively with whitespace
    /// trimmed; an empty string maps to `block` (distilled spec §4.4).
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Action::Block);
        }
        match trimmed.to_lowercase().as_str() {
            "allow" => Ok(Action::Allow),
            "pause" => Ok(Action::Pause),
            "block" => Ok(Action::Block),
            "deny" => Ok(Action::Deny),
            other => Err(serde::de::Error::custom(format!(
                "invalid action {other:?}, expected allow|pause|block|deny"
            ))),
        }
    }
}

impl Action {
    /// Folds the wire-level `deny` alias into `block` (distilled spec §4.4,
    /// §9). Call this on every value read off the wire before comparing or
    /// returning an `Action`.
    pub fn normalize(self) -> Action {
        match self {
            Action::Deny => Action::Block,
            other => other,
        }
    }
}

fn default_config() -> Subscriptions {
    Subscriptions {
        version: CURRENT_VERSION,
        defaults: Defaults::default(),
        rules: Vec::new(),
    }
}

/// Loads a config from `path`. A missing file yields [`default_config`]
/// (distilled spec §7 "Recovered locally"); malformed YAML is surfaced.
pub fn load(path: &Path) -> Result<Subscriptions, SubscriptionConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(default_config()),
        Err(err) => return Err(err.into()),
    };
    let mut cfg: Subscriptions = serde_yaml::from_str(&raw)?;
    if cfg.version == 0 {
        cfg.version = CURRENT_VERSION;
    }
    cfg.defaults.action = cfg.defaults.action.normalize();
    for rule in &mut cfg.rules {
        rule.action = rule.action.normalize();
    }
    Ok(cfg)
}

/// Atomically saves `cfg` to `path`: write to `path.tmp`, rename onto
/// `path`, with the containing directory at mode 0700 and the file at mode
/// 0600 (distilled spec §3 "Lifecycle", §4.4 "Config load").
pub fn save(path: &Path, cfg: &Subscriptions) -> Result<(), SubscriptionConfigError> {
    let cfg = normalized(cfg);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            mkdir(parent, Mode::from_bits_truncate(SUBSCRIPTION_DIR_MODE))
                .map_err(|err| std::io::Error::from_raw_os_error(err as i32))?;
        }
    }

    let raw = serde_yaml::to_string(&cfg)?;
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        fchmod(
            std::os::unix::io::AsRawFd::as_raw_fd(&file),
            Mode::from_bits_truncate(SUBSCRIPTION_FILE_MODE),
        )
        .map_err(|err| std::io::Error::from_raw_os_error(err as i32))?;
        std::io::Write::write_all(&mut file, raw.as_bytes())?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn normalized(cfg: &Subscriptions) -> Subscriptions {
    let mut out = cfg.clone();
    out.defaults.action = out.defaults.action.normalize();
    for rule in &mut out.rules {
        rule.action = rule.action.normalize();
    }
    if out.version == 0 {
        out.version = CURRENT_VERSION;
    }
    out
}

/// `action_for_path(owner, rel_path) -> {allow, pause, block}` (distilled
/// spec §4.4). Rules are evaluated in declaration order and later matches
/// override earlier ones — last-match-wins, preserved bug-for-bug per
/// distilled spec §9.
pub fn action_for_path(cfg: &Subscriptions, owner: &str, rel_path: &str) -> Action {
    let normalized = path::normalize(rel_path);
    if normalized.is_empty() {
        return cfg.defaults.action.normalize();
    }

    let (datasite, rest) = path::split_datasite(&normalized);
    if datasite.is_empty() {
        return cfg.defaults.action.normalize();
    }
    if datasite.eq_ignore_ascii_case(owner) {
        return Action::Allow;
    }

    let mut action = cfg.defaults.action.normalize();
    for rule in &cfg.rules {
        if rule.path.trim().is_empty() {
            continue;
        }
        let matched = match &rule.datasite {
            Some(pattern) => glob_match(pattern, datasite) && glob_match(&rule.path, rest),
            None => glob_match(&rule.path, &normalized),
        };
        if matched {
            action = rule.action.normalize();
        }
    }
    action
}
