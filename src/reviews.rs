// ABOUTME: Review proxy handler and upstream client
// ABOUTME: Serves memoized reviews, refreshing from upstream after expiry

use std::cell::RefCell;

use worker::*;

use crate::cache::{now_ms, ReviewCache, FRESHNESS_WINDOW_SECS};
use crate::router::{json_response, json_response_with_cache};
use crate::types::{Review, ReviewsError, ReviewsResponse, UpstreamReviews};

/// Upstream business whose reviews the site shows
const BUSINESS_ID: &str = "apex-performance-training-sacramento";

const UPSTREAM_BASE: &str = "https://api.yelp.com/v3/businesses";

const API_KEY_VAR: &str = "YELP_API_KEY";

thread_local! {
    /// One slot per isolate; empty at start, discarded at teardown.
    /// Overlapping stale requests may both refresh it; last writer wins.
    static REVIEW_CACHE: RefCell<ReviewCache> = RefCell::new(ReviewCache::new());
}

pub async fn handle_reviews(env: &Env) -> Result<Response> {
    let now = now_ms();

    let hit = REVIEW_CACHE.with(|slot| {
        let slot = slot.borrow();
        slot.fresh(now)
            .map(|cached| (cached.reviews.clone(), cached.remaining_seconds(now)))
    });
    if let Some((reviews, remaining)) = hit {
        return json_response_with_cache(&ReviewsResponse { reviews }, 200, remaining);
    }

    let api_key = env
        .secret(API_KEY_VAR)
        .map(|secret| secret.to_string())
        .unwrap_or_default();
    if api_key.is_empty() {
        return json_response(&ReviewsError::new("not configured"), 500);
    }

    match fetch_upstream(&api_key).await {
        Ok(reviews) => {
            REVIEW_CACHE.with(|slot| slot.borrow_mut().store(reviews.clone(), now));
            json_response_with_cache(&ReviewsResponse { reviews }, 200, FRESHNESS_WINDOW_SECS)
        }
        Err(err) => {
            let status = match &err {
                UpstreamError::Status(code) => *code,
                _ => 500,
            };
            json_response(&ReviewsError::new(&err.to_string()), status)
        }
    }
}

/// Authenticated GET against the upstream reviews endpoint
async fn fetch_upstream(api_key: &str) -> std::result::Result<Vec<Review>, UpstreamError> {
    let url = format!("{}/{}/reviews", UPSTREAM_BASE, BUSINESS_ID);

    let mut headers = Headers::new();
    headers
        .set("Authorization", &format!("Bearer {}", api_key))
        .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    let request = Request::new_with_init(
        &url,
        RequestInit::new()
            .with_method(Method::Get)
            .with_headers(headers),
    )
    .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    let mut response = Fetch::Request(request)
        .send()
        .await
        .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    let status = response.status_code();
    if !(200..300).contains(&status) {
        return Err(UpstreamError::Status(status));
    }

    let payload: UpstreamReviews = response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))?;

    Ok(payload
        .reviews
        .into_iter()
        .map(Review::from_upstream)
        .collect())
}

#[derive(Debug)]
enum UpstreamError {
    Status(u16),
    Transport(String),
    Decode(String),
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "upstream returned status {}", code),
            Self::Transport(msg) => write!(f, "upstream request failed: {}", msg),
            Self::Decode(msg) => write!(f, "upstream payload invalid: {}", msg),
        }
    }
}
