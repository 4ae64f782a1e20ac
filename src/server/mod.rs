//! A minimal async control-plane HTTP layer exercising the facade
//! end-to-end (SPEC_FULL.md §4.5). Exposes exactly three routes:
//! `GET /blob/{datasite}/{path}`, `PUT /blob/{datasite}/{path}`, and
//! `GET /explorer/{datasite}/{path}`. Compression, rate limiting, request
//! logging middleware and Swagger generation are not reproduced — this
//! exists only to prove the facade contract is exercised by real request
//! handlers, not to be a production-grade HTTP surface.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{error, info};
use tokio::net::TcpListener;

use dsite_api_types::{AccessKind, UserId};

use crate::blobstore::BlobStore;
use crate::facade::Facade;

/// Shared state handed to every connection (the teacher's `DISK_STATE`-style
/// shared handle, but passed explicitly rather than through a `lazy_static`,
/// per distilled spec §9 "prefer injecting it as an explicit capability").
pub struct AppState {
    pub facade: Facade,
    pub store: Arc<dyn BlobStore>,
}

/// Binds `addr` and serves connections until the process is killed. Each
/// connection is handled on its own task (teacher's one-task-per-connection
/// idiom), HTTP/1.1 only — this is a demonstration surface, not the real
/// proxy.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<(), Error> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("control-plane listening on {addr}");

    loop {
        let (stream, peer) = listener.accept().await.context("accepting connection")?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(route(req, state).await) }
            });
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("connection from {peer} failed: {err}");
            }
        });
    }
}

async fn route(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query_user = query_param(req.uri().query().unwrap_or(""), "as");

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let result = match (&method, segments.as_slice()) {
        (&Method::GET, ["blob", rest @ ..]) => handle_blob_get(&state, rest, query_user).await,
        (&Method::PUT, ["blob", rest @ ..]) => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes().to_vec(),
                Err(err) => return text_response(StatusCode::BAD_REQUEST, format!("bad body: {err}")),
            };
            handle_blob_put(&state, rest, query_user, body).await
        }
        (&Method::GET, ["explorer", rest @ ..]) => handle_explorer(&state, rest).await,
        _ => Err((StatusCode::NOT_FOUND, "no such route".to_string())),
    };

    match result {
        Ok(response) => response,
        Err((status, message)) => text_response(status, message),
    }
}

async fn handle_blob_get(
    state: &AppState,
    segments: &[&str],
    query_user: Option<String>,
) -> Result<Response<Full<Bytes>>, (StatusCode, String)> {
    let key = segments.join("/");
    let user = require_user(query_user)?;

    state
        .facade
        .permit(&user, &key, AccessKind::Read)
        .map_err(|_| (StatusCode::FORBIDDEN, "forbidden".to_string()))?;

    let bytes = state
        .store
        .get(&key)
        .await
        .map_err(|_| (StatusCode::NOT_FOUND, "not found".to_string()))?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .body(Full::new(Bytes::from(bytes)))
        .expect("building response"))
}

async fn handle_blob_put(
    state: &AppState,
    segments: &[&str],
    query_user: Option<String>,
    body: Vec<u8>,
) -> Result<Response<Full<Bytes>>, (StatusCode, String)> {
    let key = segments.join("/");

    // Reserved-prefix rejection happens before any ACL check (distilled
    // spec §6, SPEC_FULL.md §4.5).
    if Facade::is_reserved(&key) {
        return Err((StatusCode::FORBIDDEN, "reserved path".to_string()));
    }

    let user = require_user(query_user)?;

    state
        .facade
        .permit(&user, &key, AccessKind::Write)
        .map_err(|_| (StatusCode::FORBIDDEN, "forbidden".to_string()))?;

    state
        .store
        .put(&key, body)
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "storage error".to_string()))?;

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .body(Full::new(Bytes::new()))
        .expect("building response"))
}

async fn handle_explorer(
    state: &AppState,
    segments: &[&str],
) -> Result<Response<Full<Bytes>>, (StatusCode, String)> {
    let prefix = segments.join("/");
    let everyone = UserId::new("everyone").expect("literal is non-empty");

    let keys = state
        .store
        .list_prefix(&prefix)
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "storage error".to_string()))?;

    // Every listed key is evaluated with `everyone` as principal and
    // entries that are denied are silently skipped — the listing must
    // never reveal the existence of a path the caller cannot read
    // (distilled spec §4.5).
    let mut visible = Vec::new();
    for key in keys {
        if state.facade.permit(&everyone, &key, AccessKind::Read).is_ok() {
            visible.push(key);
        }
    }

    let body = serde_json::to_vec(&visible).expect("serializing string list never fails");
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .expect("building response"))
}

fn require_user(query_user: Option<String>) -> Result<UserId, (StatusCode, String)> {
    let raw = query_user.ok_or((StatusCode::UNAUTHORIZED, "missing ?as= caller identity".to_string()))?;
    UserId::new(&raw).ok_or((StatusCode::BAD_REQUEST, "invalid caller identity".to_string()))
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

fn text_response(status: StatusCode, message: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(message)))
        .expect("building response")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("as=alice@example.com&x=1", "as"), Some("alice@example.com".to_string()));
        assert_eq!(query_param("x=1", "as"), None);
        assert_eq!(query_param("", "as"), None);
    }
}
