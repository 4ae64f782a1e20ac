//! The concurrent, path-segment-indexed ACL tree (distilled spec §4.2).

use std::sync::Arc;

use dsite_api_types::AclError;

use super::node::AclTreeNode;
use super::rules::RuleSet;
use crate::path;

/// Tree representing all installed rule sets. Clone-cheap (an `Arc` to the
/// root); every clone shares the same underlying tree.
#[derive(Clone)]
pub struct AclTree {
    root: Arc<AclTreeNode>,
}

impl Default for AclTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AclTree {
    pub fn new() -> Self {
        AclTree {
            root: AclTreeNode::root(),
        }
    }

    /// Inserts or replaces the rule set at `rule_set.anchor_path()`.
    /// Intermediate nodes are created as needed and carry no rules of
    /// their own (distilled spec §4.2).
    pub fn install(&self, rule_set: RuleSet) -> Result<(), AclError> {
        let anchor = rule_set.anchor_path().to_string();
        let terminal = rule_set.terminal();
        let segs = path::segments(&anchor);

        let mut cur = self.root.clone();
        for (i, &seg) in segs.iter().enumerate() {
            cur = cur.get_or_create_child(seg, i + 1);
        }
        cur.install_here(Arc::new(rule_set), terminal);
        Ok(())
    }

    /// Removes the rule set installed at exactly `anchor_path`. Returns
    /// `false` if no rule set is installed there (distilled spec §4.2).
    /// Intermediate nodes left empty by the removal are pruned bottom-up.
    pub fn remove(&self, anchor_path: &str) -> bool {
        let anchor_path = path::normalize(anchor_path);
        let segs = path::segments(&anchor_path);

        if segs.is_empty() {
            return self.root.remove_here();
        }

        let mut chain: Vec<(Arc<AclTreeNode>, String)> = Vec::with_capacity(segs.len());
        let mut cur = self.root.clone();
        for &seg in &segs {
            match cur.get_child(seg) {
                Some(child) => {
                    chain.push((cur, (*seg).to_string()));
                    cur = child;
                }
                None => return false,
            }
        }

        if !cur.remove_here() {
            return false;
        }
        drop(cur);

        for (parent, seg) in chain.into_iter().rev() {
            parent.prune_child_if_empty(&seg);
        }
        true
    }

    /// Walks from the root toward `path`, returning the nearest ancestor
    /// (including `path`'s own node) that carries a rule set, honoring
    /// terminal seals. `Err(AclError::NotFound)` if no ancestor has rules.
    ///
    /// This implements the corrected walk from distilled spec §4.2,
    /// including the final-node check the source's original walk omitted.
    pub fn find_nearest_with_rules(&self, path: &str) -> Result<Arc<RuleSet>, AclError> {
        let path = path::normalize(path);
        let segs = path::segments(&path);

        let mut cur = self.root.clone();
        let mut last_with_rules: Option<Arc<RuleSet>> = None;

        for &seg in &segs {
            let (rules, terminal, child) = cur.peek(Some(seg));
            if let Some(rs) = rules {
                last_with_rules = Some(rs);
            }
            if terminal {
                return last_with_rules.ok_or(AclError::NotFound);
            }
            match child {
                Some(next) => cur = next,
                None => break,
            }
        }

        // Final-node check: the loop above only inspects a node's rules
        // before descending past it, so the node we land on (whether by
        // exhausting all segments or by a missing child) is never checked
        // from inside the loop. Without this, an exact-match rule set at
        // the deepest installed node would never be found.
        let (final_rules, _terminal, _none) = cur.peek(None);
        if let Some(rs) = final_rules {
            last_with_rules = Some(rs);
        }

        last_with_rules.ok_or(AclError::NotFound)
    }

    /// Walks from the root toward `path`, returning the deepest node
    /// reachable regardless of whether it carries rules, stopping descent
    /// at a terminal node (distilled spec §4.2 "get_nearest_node").
    pub fn get_nearest_node(&self, path: &str) -> Arc<AclTreeNode> {
        let path = path::normalize(path);
        let segs = path::segments(&path);

        let mut cur = self.root.clone();
        for &seg in &segs {
            let (_rules, terminal, child) = cur.peek(Some(seg));
            if terminal {
                return cur;
            }
            match child {
                Some(next) => cur = next,
                None => break,
            }
        }
        cur
    }

    /// Test/inspection helper: the exact node at `path`, if any spine leads
    /// there (irrespective of rules or terminal seals).
    #[cfg(test)]
    pub(crate) fn find_node(&self, path: &str) -> Option<Arc<AclTreeNode>> {
        let path = path::normalize(path);
        let segs = path::segments(&path);
        let mut cur = self.root.clone();
        for &seg in &segs {
            cur = cur.get_child(seg)?;
        }
        Some(cur)
    }
}
