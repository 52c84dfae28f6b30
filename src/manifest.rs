// ABOUTME: Precache manifest and versioned cache naming for the asset worker
// ABOUTME: Cache name combines a manual version with a manifest fingerprint

use sha2::{Digest, Sha256};

/// Bumped on deploys whose asset content changes without touching the manifest
pub const CACHE_VERSION: &str = "v3";

const CACHE_PREFIX: &str = "studio-static";

/// Paths fetched and stored at install time
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/about.html",
    "/services.html",
    "/pricing.html",
    "/contact.html",
    "/css/styles.css",
    "/js/main.js",
    "/favicon.ico",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    "/images/hero.jpg",
    "/images/studio-floor.jpg",
    "/images/trainer-marcus.jpg",
    "/images/trainer-elena.jpg",
    "/images/small-group.jpg",
];

/// Cache name for the current deploy. The fingerprint makes a manifest edit
/// invalidate the cache even without a version bump.
pub fn cache_name() -> String {
    format!(
        "{}-{}-{}",
        CACHE_PREFIX,
        CACHE_VERSION,
        fingerprint(PRECACHE_MANIFEST)
    )
}

/// First 8 hex chars of SHA-256 over the manifest paths
fn fingerprint(paths: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for path in paths {
        hasher.update(path.as_bytes());
        hasher.update(b"\n");
    }
    let hash = hasher.finalize();
    hex::encode(&hash[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_name_deterministic() {
        assert_eq!(cache_name(), cache_name());
        assert!(cache_name().starts_with("studio-static-v3-"));
    }

    #[test]
    fn test_fingerprint_length() {
        assert_eq!(fingerprint(PRECACHE_MANIFEST).len(), 8);
    }

    #[test]
    fn test_fingerprint_tracks_manifest_content() {
        assert_ne!(fingerprint(&["/", "/index.html"]), fingerprint(&["/", "/about.html"]));
        assert_eq!(fingerprint(&["/", "/index.html"]), fingerprint(&["/", "/index.html"]));
    }

    #[test]
    fn test_manifest_includes_root_document() {
        // the offline navigation fallback depends on "/" being precached
        assert!(PRECACHE_MANIFEST.contains(&"/"));
    }
}
