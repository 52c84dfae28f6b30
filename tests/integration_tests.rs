// ABOUTME: Integration tests against the deployed studio edge worker
// ABOUTME: Exercises CORS, response shapes, and cache headers end to end

use reqwest::blocking::Client;
use serde_json::Value;

const WORKER_URL: &str = "https://edge.apexperformance.example";

fn client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
}

// ============================================================================
// Health endpoint
// ============================================================================

#[test]
#[ignore = "requires a deployed worker"]
fn test_health_endpoint() {
    let resp = client()
        .get(format!("{}/health", WORKER_URL))
        .send()
        .expect("Failed to reach worker");

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().unwrap(), "ok");
}

// ============================================================================
// Review proxy
// ============================================================================

#[test]
#[ignore = "requires a deployed worker"]
fn test_reviews_returns_json_shape() {
    let resp = client()
        .get(format!("{}/api/reviews", WORKER_URL))
        .send()
        .expect("Failed to reach worker");

    assert_eq!(resp.status(), 200);

    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));

    let body: Value = resp.json().expect("Invalid JSON response");
    let reviews = body["reviews"].as_array().expect("reviews must be an array");

    for review in reviews {
        assert!(review["rating"].is_number(), "Review missing 'rating'");
        assert!(review["text"].is_string(), "Review missing 'text'");
        assert!(review["time_created"].is_string(), "Review missing 'time_created'");
        assert!(review["user"]["name"].is_string(), "Review missing 'user.name'");
        assert!(review["user"]["location"].is_string(), "Review missing 'user.location'");
        assert!(review["url"].is_string(), "Review missing 'url'");
    }
}

#[test]
#[ignore = "requires a deployed worker"]
fn test_reviews_has_cors_header() {
    let resp = client()
        .get(format!("{}/api/reviews", WORKER_URL))
        .send()
        .expect("Failed to reach worker");

    let allow_origin = resp.headers().get("access-control-allow-origin");
    assert_eq!(allow_origin.unwrap().to_str().unwrap(), "*");
}

#[test]
#[ignore = "requires a deployed worker"]
fn test_reviews_has_cache_headers() {
    let resp = client()
        .get(format!("{}/api/reviews", WORKER_URL))
        .send()
        .expect("Failed to reach worker");

    if resp.status() == 200 {
        let cache_control = resp.headers().get("cache-control");
        assert!(cache_control.is_some(), "Missing Cache-Control header");
    }
}

#[test]
#[ignore = "requires a deployed worker"]
fn test_preflight_request() {
    let resp = client()
        .request(reqwest::Method::OPTIONS, format!("{}/api/reviews", WORKER_URL))
        .send()
        .expect("Failed to reach worker");

    assert_eq!(resp.status(), 204);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .unwrap()
            .to_str()
            .unwrap(),
        "*"
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-headers")
            .unwrap()
            .to_str()
            .unwrap(),
        "Content-Type"
    );
    assert!(resp.text().unwrap().is_empty());
}

// ============================================================================
// Asset serving
// ============================================================================

#[test]
#[ignore = "requires a deployed worker"]
fn test_root_serves_html() {
    let resp = client()
        .get(WORKER_URL)
        .send()
        .expect("Failed to reach worker");

    assert_eq!(resp.status(), 200);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("text/html"));
}

#[test]
#[ignore = "requires a deployed worker"]
fn test_stylesheet_served() {
    let resp = client()
        .get(format!("{}/css/styles.css", WORKER_URL))
        .send()
        .expect("Failed to reach worker");

    assert_eq!(resp.status(), 200);
}
