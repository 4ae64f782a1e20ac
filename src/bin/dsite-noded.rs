///! Datasite control-plane node daemon: scans a datastore root for ACL and
///! subscription files, then serves the minimal blob/explorer HTTP surface.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Error};
use log::info;

use dsite_config::acl::{install_from_root, AclService, AclTree};
use dsite_node::blobstore::MemoryBlobStore;
use dsite_node::facade::Facade;
use dsite_node::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let datastore_root = std::env::var("DSITE_DATASTORE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(dsite_buildcfg::DEFAULT_DATASTORE_ROOT));

    let tree = AclTree::new();
    if datastore_root.exists() {
        let installed = install_from_root(&tree, &datastore_root)
            .context("scanning datastore root for ACL files")?;
        info!("installed {installed} rule set(s) from {}", datastore_root.display());
    } else {
        info!(
            "datastore root {} does not exist yet, starting with an empty ACL tree",
            datastore_root.display()
        );
    }

    let facade = Facade::new(AclService::new(tree));
    let store = Arc::new(MemoryBlobStore::new());
    let state = Arc::new(AppState { facade, store });

    let addr: SocketAddr = std::env::var("DSITE_LISTEN")
        .unwrap_or_else(|_| "127.0.0.1:8686".to_string())
        .parse()
        .context("parsing DSITE_LISTEN")?;

    server::serve(addr, state).await
}
