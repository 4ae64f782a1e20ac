//! ACL tree, ACL service, and subscription engine: the hierarchical
//! path-scoped access-control subsystem (distilled spec §1).

pub mod acl;
pub mod glob;
pub mod path;
pub mod subscriptions;

pub use acl::{AclService, AclTree, AclTreeNode, Rule, RuleSet};
pub use subscriptions::{action_for_path, Action, Subscriptions};
