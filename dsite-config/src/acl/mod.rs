//! The hierarchical path-scoped access-control subsystem (distilled spec §4.2–4.3).

mod loader;
mod node;
mod rules;
mod service;
mod tree;

pub use loader::{install_from_root, parse_acl_file, reinstall_or_remove};
pub use node::AclTreeNode;
pub use rules::{Rule, RuleSet};
pub use service::AclService;
pub use tree::AclTree;
