// ABOUTME: HTTP request routing for the studio edge worker
// ABOUTME: Dispatches CORS preflight, the review proxy, and asset caching

use std::cell::Cell;

use worker::*;

use crate::assets::{request_path, AssetRequest, AssetWorker, Served};
use crate::manifest;
use crate::store::{self, EdgeAssetStore, OriginFetch};

const ASSET_ORIGIN_VAR: &str = "ASSET_ORIGIN";
const DEFAULT_ASSET_ORIGIN: &str = "https://apex-studio-site.pages.dev";
const KV_BINDING: &str = "STUDIO_EDGE_CACHE";

thread_local! {
    /// Install and activation run once per isolate; a failed install is
    /// logged and not retried until the next isolate or deploy.
    static LIFECYCLE_RAN: Cell<bool> = const { Cell::new(false) };
}

pub async fn handle_request(req: Request, env: Env) -> Result<Response> {
    if req.method() == Method::Options {
        return preflight_response();
    }

    let url = req.url()?;
    match (req.method(), url.path()) {
        (Method::Get, "/api/reviews") => crate::reviews::handle_reviews(&env).await,

        (Method::Get, "/health") => Response::ok("ok"),

        _ => handle_asset(req, env).await,
    }
}

async fn handle_asset(req: Request, env: Env) -> Result<Response> {
    let url = req.url()?;
    let origin = asset_origin(&env);
    let worker = AssetWorker::new(
        EdgeAssetStore::new(env.kv(KV_BINDING)?),
        OriginFetch::new(&origin),
        manifest::cache_name(),
        &url,
    );

    run_lifecycle_once(&worker).await;

    let asset_req = AssetRequest {
        method: req.method(),
        accept: req.headers().get("Accept")?,
        url,
    };

    match worker.handle(&asset_req).await? {
        Served::Bypass => pass_through(req, &origin).await,
        Served::Cache(stored) | Served::Network(stored) | Served::Fallback(stored) => {
            store::to_response(&stored)
        }
    }
}

/// Lazy install + activate, memoized per isolate. The serverless analogue of
/// skipping the waiting phase and claiming open pages immediately.
async fn run_lifecycle_once(worker: &AssetWorker<EdgeAssetStore, OriginFetch>) {
    if LIFECYCLE_RAN.with(|ran| ran.replace(true)) {
        return;
    }

    match worker.install().await {
        Ok(count) => console_log!("asset cache {}: precached {} paths", worker.cache_name(), count),
        Err(err) => console_error!("asset cache install failed: {}", err),
    }

    match worker.activate().await {
        Ok(0) => {}
        Ok(purged) => console_log!("purged {} stale asset cache(s)", purged),
        Err(err) => console_error!("asset cache activation failed: {}", err),
    }
}

/// Forward a request the cache does not answer for straight to the origin
async fn pass_through(mut req: Request, origin: &str) -> Result<Response> {
    let url = req.url()?;
    let target = format!("{}{}", origin.trim_end_matches('/'), request_path(&url));

    let mut headers = Headers::new();
    for (name, value) in req.headers().entries() {
        headers.set(&name, &value)?;
    }

    let mut init = RequestInit::new();
    init.with_method(req.method()).with_headers(headers);
    if !matches!(req.method(), Method::Get | Method::Head) {
        let body = req.bytes().await?;
        init.with_body(Some(js_sys::Uint8Array::from(body.as_slice()).into()));
    }

    Fetch::Request(Request::new_with_init(&target, &init)?).send().await
}

fn asset_origin(env: &Env) -> String {
    env.var(ASSET_ORIGIN_VAR)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| DEFAULT_ASSET_ORIGIN.to_string())
}

fn preflight_response() -> Result<Response> {
    let mut headers = Headers::new();
    headers.set("Access-Control-Allow-Origin", "*")?;
    headers.set("Access-Control-Allow-Headers", "Content-Type")?;
    Ok(Response::empty()?.with_status(204).with_headers(headers))
}

pub(crate) fn json_response<T: serde::Serialize>(data: &T, status: u16) -> Result<Response> {
    let body = serde_json::to_string(data)?;
    let mut headers = Headers::new();
    headers.set("Content-Type", "application/json")?;
    headers.set("Access-Control-Allow-Origin", "*")?;
    Ok(Response::from_body(ResponseBody::Body(body.into_bytes()))?
        .with_status(status)
        .with_headers(headers))
}

pub(crate) fn json_response_with_cache<T: serde::Serialize>(
    data: &T,
    status: u16,
    max_age: u64,
) -> Result<Response> {
    let body = serde_json::to_string(data)?;
    let mut headers = Headers::new();
    headers.set("Content-Type", "application/json")?;
    headers.set("Access-Control-Allow-Origin", "*")?;
    headers.set("Cache-Control", &format!("public, max-age={}", max_age))?;
    Ok(Response::from_body(ResponseBody::Body(body.into_bytes()))?
        .with_status(status)
        .with_headers(headers))
}
