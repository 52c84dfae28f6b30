// ABOUTME: Storage and network seams behind the asset cache worker
// ABOUTME: Cloudflare bindings over the edge Cache API, Workers KV, and Fetch

use std::collections::BTreeMap;

use worker::kv::KvStore;
use worker::*;

/// KV key holding the registry of created cache names and their stored keys.
/// The edge Cache API cannot enumerate caches, so the registry stands in for
/// the browser's `caches.keys()`.
const REGISTRY_KEY: &str = "assets:cache-names";

type Registry = BTreeMap<String, Vec<String>>;

/// A captured HTTP response: status, headers, body
#[derive(Debug, Clone)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Where a fetched response came from, relative to the site origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    Opaque,
}

/// A network result eligible for the caching decision
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub kind: ResponseKind,
    pub response: StoredResponse,
}

/// Named caches of captured responses
#[allow(async_fn_in_trait)]
pub trait AssetStore {
    async fn names(&self) -> Result<Vec<String>>;
    async fn get(&self, cache: &str, url: &str) -> Result<Option<StoredResponse>>;
    async fn put(&self, cache: &str, url: &str, response: &StoredResponse) -> Result<()>;
    async fn delete(&self, cache: &str) -> Result<()>;
}

/// Outbound fetch toward the asset origin
#[allow(async_fn_in_trait)]
pub trait AssetFetch {
    async fn fetch(&self, path: &str) -> Result<FetchedResponse>;
}

/// `AssetStore` over the edge Cache API, with a Workers KV name registry
pub struct EdgeAssetStore {
    kv: KvStore,
}

impl EdgeAssetStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    async fn registry(&self) -> Result<Registry> {
        Ok(self
            .kv
            .get(REGISTRY_KEY)
            .json::<Registry>()
            .await?
            .unwrap_or_default())
    }

    async fn write_registry(&self, registry: &Registry) -> Result<()> {
        self.kv
            .put(REGISTRY_KEY, serde_json::to_string(registry)?)?
            .execute()
            .await?;
        Ok(())
    }
}

impl AssetStore for EdgeAssetStore {
    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.registry().await?.into_keys().collect())
    }

    async fn get(&self, cache: &str, url: &str) -> Result<Option<StoredResponse>> {
        let edge = Cache::open(cache.to_string()).await;
        match edge.get(url, false).await? {
            Some(mut response) => Ok(Some(capture(&mut response).await?)),
            None => Ok(None),
        }
    }

    async fn put(&self, cache: &str, url: &str, response: &StoredResponse) -> Result<()> {
        let edge = Cache::open(cache.to_string()).await;
        edge.put(url, to_response(response)?).await?;

        let mut registry = self.registry().await?;
        let keys = registry.entry(cache.to_string()).or_default();
        if !keys.iter().any(|key| key == url) {
            keys.push(url.to_string());
        }
        self.write_registry(&registry).await
    }

    async fn delete(&self, cache: &str) -> Result<()> {
        let edge = Cache::open(cache.to_string()).await;
        let mut registry = self.registry().await?;
        if let Some(keys) = registry.remove(cache) {
            for key in keys {
                edge.delete(key.as_str(), false).await?;
            }
        }
        self.write_registry(&registry).await
    }
}

/// `AssetFetch` against the configured asset origin. Everything it fetches is
/// same-origin by construction, so responses classify as Basic.
pub struct OriginFetch {
    origin: String,
}

impl OriginFetch {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }
}

impl AssetFetch for OriginFetch {
    async fn fetch(&self, path: &str) -> Result<FetchedResponse> {
        let target = format!("{}{}", self.origin, path);
        let url = target.parse().map_err(|_| "invalid asset origin url")?;
        let mut response = Fetch::Url(url).send().await?;
        let stored = capture(&mut response).await?;
        Ok(FetchedResponse {
            kind: ResponseKind::Basic,
            response: stored,
        })
    }
}

/// Capture a response into an owned value. Reads the body, so the original
/// response is consumed here and rebuilt for whoever needs it next.
pub async fn capture(response: &mut Response) -> Result<StoredResponse> {
    let status = response.status_code();
    let headers = response.headers().entries().collect();
    let body = response.bytes().await?;
    Ok(StoredResponse {
        status,
        headers,
        body,
    })
}

/// Rebuild a transport response from a captured one
pub fn to_response(stored: &StoredResponse) -> Result<Response> {
    let mut headers = Headers::new();
    for (name, value) in &stored.headers {
        headers.set(name, value)?;
    }
    Ok(Response::from_body(ResponseBody::Body(stored.body.clone()))?
        .with_status(stored.status)
        .with_headers(headers))
}
