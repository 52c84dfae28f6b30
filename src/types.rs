// ABOUTME: API response types for the review proxy
// ABOUTME: Defines the normalized review JSON and upstream payload shapes

use serde::{Deserialize, Serialize};

/// Author name used when the upstream review carries none
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Author location used when the upstream review carries none
pub const DEFAULT_LOCATION: &str = "California";

/// A single review as served to the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub rating: f64,
    pub text: String,
    #[serde(rename = "time_created")]
    pub created_at: String,
    pub user: ReviewUser,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUser {
    pub name: String,
    pub location: String,
}

/// Response body for the review endpoint
#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

/// Error body for the review endpoint. `reviews` stays present (and empty)
/// so clients read one shape on every path.
#[derive(Debug, Serialize)]
pub struct ReviewsError {
    pub error: String,
    pub reviews: Vec<Review>,
}

impl ReviewsError {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            reviews: Vec::new(),
        }
    }
}

/// Upstream reviews payload; unknown fields are ignored
#[derive(Debug, Deserialize)]
pub struct UpstreamReviews {
    #[serde(default)]
    pub reviews: Vec<UpstreamReview>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamReview {
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub time_created: String,
    #[serde(default)]
    pub user: Option<UpstreamUser>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Review {
    /// Normalize an upstream review, filling in the author defaults
    pub fn from_upstream(upstream: UpstreamReview) -> Self {
        let user = upstream.user.unwrap_or_default();
        Self {
            rating: upstream.rating,
            text: upstream.text,
            created_at: upstream.time_created,
            user: ReviewUser {
                name: user
                    .name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
                location: user
                    .location
                    .filter(|location| !location.is_empty())
                    .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            },
            url: upstream.url,
        }
    }
}
