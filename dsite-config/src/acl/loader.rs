//! Discovers and parses on-disk ACL files (`syft.pub.yaml`) into [`RuleSet`]s
//! and installs them into an [`AclTree`] (SPEC_FULL.md §4.2.1).

use std::path::Path;

use anyhow::{Context, Error};
use dsite_buildcfg::ACL_FILE_NAME;
use log::warn;
use serde::Deserialize;
use walkdir::WalkDir;

use dsite_api_types::{Effect, Principal};

use super::rules::{Rule, RuleSet};
use super::tree::AclTree;
use crate::path;

#[derive(Deserialize)]
struct FileSchema {
    #[serde(default)]
    terminal: bool,
    #[serde(default)]
    rules: Vec<FileRuleEntry>,
}

#[derive(Deserialize)]
struct FileRuleEntry {
    effect: Effect,
    #[serde(default)]
    principals: Vec<String>,
    pattern: String,
}

/// Parses one `syft.pub.yaml` document's bytes into a [`RuleSet`] anchored
/// at `anchor_path`. Rejects an empty `rules` list, matching the `RuleSet`
/// invariant (distilled spec §3). A rule with a malformed pattern or an
/// unparseable principal is dropped and logged, not fatal to the file.
pub fn parse_acl_file(anchor_path: &str, contents: &str) -> Result<RuleSet, Error> {
    let parsed: FileSchema =
        serde_yaml::from_str(contents).context("malformed syft.pub.yaml")?;

    let rules: Vec<Rule> = parsed
        .rules
        .into_iter()
        .filter_map(|entry| {
            let principals: Vec<Principal> = entry
                .principals
                .iter()
                .filter_map(|raw| {
                    let parsed = Principal::parse(raw);
                    if parsed.is_none() {
                        warn!("acl: dropping unparseable principal {raw:?} in {anchor_path}");
                    }
                    parsed
                })
                .collect();
            if principals.is_empty() {
                warn!("acl: dropping rule with no valid principals in {anchor_path}");
                return None;
            }
            let rule = Rule::new(&entry.pattern, entry.effect, principals);
            if rule.is_none() {
                warn!(
                    "acl: dropping rule with malformed pattern {:?} in {anchor_path}",
                    entry.pattern
                );
            }
            rule
        })
        .collect();

    RuleSet::new(anchor_path, rules, parsed.terminal)
        .context("rule set has no valid rules after validation")
}

/// Walks `root` (teacher's directory-walking idiom, `walkdir::WalkDir`)
/// looking for [`ACL_FILE_NAME`] files and installs each into `tree`.
///
/// A parse failure at one anchor is logged and skipped; it must never
/// prevent sibling or descendant anchors from being scanned (SPEC_FULL.md
/// §4.2.1).
pub fn install_from_root(tree: &AclTree, root: &Path) -> Result<usize, Error> {
    let mut installed = 0usize;

    for entry in WalkDir::new(root).into_iter() {
        let entry = entry.context("walking datastore root")?;
        if entry.file_name() != ACL_FILE_NAME {
            continue;
        }

        let file_path = entry.path();
        let anchor = match file_path.parent() {
            Some(parent) => relative_anchor(root, parent),
            None => continue,
        };

        let contents = match std::fs::read_to_string(file_path) {
            Ok(c) => c,
            Err(err) => {
                warn!("acl: failed to read {}: {err}", file_path.display());
                continue;
            }
        };

        match parse_acl_file(&anchor, &contents) {
            Ok(rule_set) => {
                tree.install(rule_set)
                    .context("installing parsed rule set")?;
                installed += 1;
            }
            Err(err) => {
                warn!("acl: skipping {}: {err:#}", file_path.display());
            }
        }
    }

    Ok(installed)
}

/// Re-installs (replaces) the rule set anchored at `dir`, or removes it if
/// `dir` no longer contains [`ACL_FILE_NAME`]. Models the "on a write event"
/// trigger a filesystem watcher (out of scope) would call.
pub fn reinstall_or_remove(tree: &AclTree, root: &Path, dir: &Path) -> Result<(), Error> {
    let anchor = relative_anchor(root, dir);
    let acl_file = dir.join(ACL_FILE_NAME);

    match std::fs::read_to_string(&acl_file) {
        Ok(contents) => match parse_acl_file(&anchor, &contents) {
            Ok(rule_set) => tree.install(rule_set).context("installing parsed rule set"),
            Err(err) => {
                warn!("acl: skipping {}: {err:#}", acl_file.display());
                Ok(())
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tree.remove(&anchor);
            Ok(())
        }
        Err(err) => Err(err).context("reading syft.pub.yaml"),
    }
}

fn relative_anchor(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    path::normalize(&relative.to_string_lossy())
}
