// ABOUTME: Asset cache worker: install, activate, and fetch handling
// ABOUTME: Cache-first with opportunistic population and offline fallback

use futures_util::future::join_all;
use worker::*;

use crate::manifest::PRECACHE_MANIFEST;
use crate::store::{AssetFetch, AssetStore, FetchedResponse, ResponseKind, StoredResponse};

/// The parts of an inbound request the caching decisions look at
#[derive(Debug)]
pub struct AssetRequest {
    pub method: Method,
    pub url: Url,
    pub accept: Option<String>,
}

/// What the fetch handler decided for one request
#[derive(Debug)]
pub enum Served {
    /// Not ours; forward untouched
    Bypass,
    /// Straight from cache, no network
    Cache(StoredResponse),
    /// From the network, stored opportunistically when eligible
    Network(StoredResponse),
    /// Network down; the cached root document stood in for a navigation
    Fallback(StoredResponse),
}

/// Service-worker-style lifecycle over a cache store and a network seam
pub struct AssetWorker<S, F> {
    store: S,
    network: F,
    cache_name: String,
    origin: String,
}

impl<S: AssetStore, F: AssetFetch> AssetWorker<S, F> {
    pub fn new(store: S, network: F, cache_name: String, site_url: &Url) -> Self {
        Self {
            store,
            network,
            cache_name,
            origin: site_url.origin().ascii_serialization(),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn network(&self) -> &F {
        &self.network
    }

    /// Fetch and store every manifest path. Population is all-or-nothing:
    /// nothing is written unless every fetch came back 200.
    pub async fn install(&self) -> Result<usize> {
        let results = join_all(PRECACHE_MANIFEST.iter().map(|path| self.network.fetch(path))).await;

        let mut fetched = Vec::with_capacity(results.len());
        for (path, result) in PRECACHE_MANIFEST.iter().zip(results) {
            match result {
                Ok(resp) if resp.response.status == 200 => fetched.push((*path, resp.response)),
                Ok(resp) => {
                    return Err(Error::RustError(format!(
                        "precache fetch for {} returned {}",
                        path, resp.response.status
                    )))
                }
                Err(err) => {
                    return Err(Error::RustError(format!(
                        "precache fetch for {} failed: {}",
                        path, err
                    )))
                }
            }
        }

        let count = fetched.len();
        for (path, response) in fetched {
            self.store
                .put(&self.cache_name, &self.key(path), &response)
                .await?;
        }
        Ok(count)
    }

    /// Drop every cache left behind by a previous deploy
    pub async fn activate(&self) -> Result<usize> {
        let mut purged = 0;
        for name in self.store.names().await? {
            if name != self.cache_name {
                self.store.delete(&name).await?;
                purged += 1;
            }
        }
        Ok(purged)
    }

    pub async fn handle(&self, req: &AssetRequest) -> Result<Served> {
        if req.method != Method::Get || !self.is_same_origin(&req.url) {
            return Ok(Served::Bypass);
        }

        let path = request_path(&req.url);
        let key = self.key(&path);
        if let Some(cached) = self.store.get(&self.cache_name, &key).await? {
            return Ok(Served::Cache(cached));
        }

        match self.network.fetch(&path).await {
            Ok(fetched) => {
                if should_store(&fetched) {
                    // best-effort; the response is already on its way back
                    let _ = self
                        .store
                        .put(&self.cache_name, &key, &fetched.response)
                        .await;
                }
                Ok(Served::Network(fetched.response))
            }
            Err(err) => {
                if is_navigation(req.accept.as_deref()) {
                    if let Some(root) = self.store.get(&self.cache_name, &self.key("/")).await? {
                        return Ok(Served::Fallback(root));
                    }
                }
                Err(err)
            }
        }
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin().ascii_serialization() == self.origin
    }

    fn key(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

/// Path plus query string, the cacheable identity of a request
pub(crate) fn request_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// HTML navigations advertise text/html in Accept
fn is_navigation(accept: Option<&str>) -> bool {
    accept.is_some_and(|value| value.contains("text/html"))
}

/// Only successful same-origin responses are worth keeping
fn should_store(fetched: &FetchedResponse) -> bool {
    fetched.response.status == 200 && fetched.kind == ResponseKind::Basic
}
