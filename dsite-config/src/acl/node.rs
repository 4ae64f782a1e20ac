//! A single node of the [`AclTree`](super::tree::AclTree) (distilled spec §4.2).
//!
//! Each node owns one reader-writer lock guarding both its `children` map
//! and its `rules`/`terminal` slot, matching the teacher's arena-of-nodes
//! ACL tree (`pbs-config::acl::AclTreeNode`) but with per-node locking in
//! place of the teacher's single whole-tree `RwLock<AclTree>` swap — the
//! concurrency contract here requires lock-free traversal of the spine with
//! only O(depth) lock acquisitions, which a coarse tree-wide lock can't give.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::rules::RuleSet;

struct NodeState {
    children: HashMap<String, Arc<AclTreeNode>>,
    rules: Option<Arc<RuleSet>>,
    terminal: bool,
}

/// A node in the ACL tree: a name, a depth, and a lock-guarded slot for
/// children/rules/terminal (distilled spec §3 "ACL Tree Node").
pub struct AclTreeNode {
    pub name: String,
    pub depth: usize,
    state: RwLock<NodeState>,
}

impl AclTreeNode {
    pub(crate) fn root() -> Arc<Self> {
        Arc::new(AclTreeNode {
            name: String::new(),
            depth: 0,
            state: RwLock::new(NodeState {
                children: HashMap::new(),
                rules: None,
                terminal: false,
            }),
        })
    }

    fn child(name: String, depth: usize) -> Arc<Self> {
        Arc::new(AclTreeNode {
            name,
            depth,
            state: RwLock::new(NodeState {
                children: HashMap::new(),
                rules: None,
                terminal: false,
            }),
        })
    }

    /// Takes one read lock and returns this node's rules, its terminal
    /// flag, and (if `next_seg` is given) the child keyed by that segment —
    /// all in a single lock acquisition, per the "take per-level read lock,
    /// snapshot the child pointer, release" discipline (distilled spec §4.2).
    pub(crate) fn peek(&self, next_seg: Option<&str>) -> (Option<Arc<RuleSet>>, bool, Option<Arc<AclTreeNode>>) {
        let state = self.state.read().unwrap();
        let child = next_seg.and_then(|seg| state.children.get(seg).cloned());
        (state.rules.clone(), state.terminal, child)
    }

    pub fn rules(&self) -> Option<Arc<RuleSet>> {
        self.state.read().unwrap().rules.clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.read().unwrap().terminal
    }

    pub(crate) fn get_child(&self, seg: &str) -> Option<Arc<AclTreeNode>> {
        self.state.read().unwrap().children.get(seg).cloned()
    }

    pub(crate) fn get_or_create_child(&self, seg: &str, depth: usize) -> Arc<AclTreeNode> {
        let mut state = self.state.write().unwrap();
        state
            .children
            .entry(seg.to_string())
            .or_insert_with(|| AclTreeNode::child(seg.to_string(), depth))
            .clone()
    }

    pub(crate) fn install_here(&self, rule_set: Arc<RuleSet>, terminal: bool) {
        let mut state = self.state.write().unwrap();
        state.rules = Some(rule_set);
        state.terminal = terminal;
    }

    /// Clears this node's rules/terminal slot. Returns `false` if it had
    /// none (distilled spec §4.2 "remove").
    pub(crate) fn remove_here(&self) -> bool {
        let mut state = self.state.write().unwrap();
        if state.rules.is_none() {
            return false;
        }
        state.rules = None;
        state.terminal = false;
        true
    }

    fn is_empty(&self) -> bool {
        let state = self.state.read().unwrap();
        state.rules.is_none() && state.children.is_empty()
    }

    /// Compacts the child named `seg` out of this node if it's now empty
    /// (no rules, no children of its own) — distilled spec §4.2 "Removal
    /// races" and §5 "pruning policy".
    pub(crate) fn prune_child_if_empty(&self, seg: &str) {
        let mut state = self.state.write().unwrap();
        let drop_it = matches!(state.children.get(seg), Some(child) if child.is_empty());
        if drop_it {
            state.children.remove(seg);
        }
    }
}
