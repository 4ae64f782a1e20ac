//! End-to-end scenarios across the ACL and subscription subsystems,
//! exercised through the public crate API rather than internal modules.

use dsite_api_types::{AccessKind, UserId};
use dsite_config::acl::{install_from_root, AclService, AclTree};
use dsite_config::subscriptions::{self, Action};
use dsite_node::facade::Facade;

fn user(raw: &str) -> UserId {
    UserId::new(raw).unwrap()
}

fn scratch_dir(label: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "dsite-node-e2e-{}-{}",
        std::process::id(),
        label
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn startup_scan_installs_rule_sets_and_facade_enforces_them() {
    let root = scratch_dir("scan");
    std::fs::create_dir_all(root.join("alice@example.com/public")).unwrap();
    std::fs::write(
        root.join("alice@example.com/syft.pub.yaml"),
        "rules:\n  - effect: allow\n    principals: [\"*\"]\n    pattern: \"public/**\"\n",
    )
    .unwrap();

    let tree = AclTree::new();
    let installed = install_from_root(&tree, &root).unwrap();
    assert_eq!(installed, 1);

    let facade = Facade::new(AclService::new(tree));
    let carol = user("carol@example.com");
    let alice = user("alice@example.com");

    assert!(facade
        .permit(&carol, "alice@example.com/public/a.txt", AccessKind::Read)
        .is_ok());
    assert!(facade
        .permit(&carol, "alice@example.com/private/a.txt", AccessKind::Read)
        .is_err());
    // Owner override applies regardless of any installed rule set.
    assert!(facade
        .permit(&alice, "alice@example.com/private/a.txt", AccessKind::Admin)
        .is_ok());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn reserved_prefix_rejected_before_any_acl_check() {
    assert!(Facade::is_reserved("alice@example.com/api/x"));
    assert!(!Facade::is_reserved("alice@example.com/myapi/x"));
    assert!(Facade::is_reserved("alice@example.com/data/API/t"));
}

#[test]
fn subscription_defaults_and_owner_scenario() {
    let yaml = "version: 1\n\
                defaults:\n  action: block\n\
                rules:\n\
                \x20 - action: allow\n\
                \x20   datasite: \"bob@example.com\"\n\
                \x20   path: \"public/**\"\n\
                \x20 - action: pause\n\
                \x20   path: \"carol@example.com/shared/**\"\n";
    let dir = scratch_dir("subscriptions");
    let path = dir.join("syft.sub.yaml");
    std::fs::write(&path, yaml).unwrap();

    let cfg = subscriptions::load(&path).unwrap();

    assert_eq!(
        subscriptions::action_for_path(&cfg, "alice@example.com", "alice@example.com/private/a.txt"),
        Action::Allow
    );
    assert_eq!(
        subscriptions::action_for_path(&cfg, "", "bob@example.com/public/a.txt"),
        Action::Allow
    );
    assert_eq!(
        subscriptions::action_for_path(&cfg, "", "carol@example.com/shared/a.txt"),
        Action::Pause
    );
    assert_eq!(
        subscriptions::action_for_path(&cfg, "", "bob@example.com/private/a.txt"),
        Action::Block
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn terminal_seal_scenario() {
    let root = scratch_dir("terminal");
    std::fs::create_dir_all(root.join("dave@example.com/public")).unwrap();
    std::fs::write(
        root.join("dave@example.com/syft.pub.yaml"),
        "rules:\n  - effect: allow\n    principals: [\"*\"]\n    pattern: \"public/**\"\n",
    )
    .unwrap();
    std::fs::write(
        root.join("dave@example.com/public/syft.pub.yaml"),
        "terminal: true\nrules:\n  - effect: deny\n    principals: [\"*\"]\n    pattern: \"**\"\n",
    )
    .unwrap();

    let tree = AclTree::new();
    install_from_root(&tree, &root).unwrap();
    let facade = Facade::new(AclService::new(tree));
    let eve = user("eve@example.com");

    assert!(facade
        .permit(&eve, "dave@example.com/public/x", AccessKind::Read)
        .is_err());
    // No rule set covers this path at all (the top-level rule only allows
    // "public/**", not "other/**"), so the default-deny applies.
    assert!(facade
        .permit(&eve, "dave@example.com/other/x", AccessKind::Read)
        .is_err());

    std::fs::remove_dir_all(&root).unwrap();
}
