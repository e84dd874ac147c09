//! Rewrites media URLs returned by the API into publicly reachable ones.
//!
//! The server stores images in an object store and hands out URLs with the
//! store's internal host name (`http://minio...`). Clients on another network
//! need that prefix swapped for the configured public media host.

const INTERNAL_MEDIA_PREFIX: &str = "http://minio";

#[derive(Debug, Clone, Default)]
pub struct MediaResolver {
    public_base: Option<String>,
}

impl MediaResolver {
    pub fn new(public_base: Option<String>) -> Self {
        let public_base = public_base
            .map(|base| base.trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty());
        Self { public_base }
    }

    /// Resolve a possibly-missing media URL. Absent or empty values become "".
    pub fn resolve(&self, url: Option<&str>) -> String {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return String::new();
        };
        match (&self.public_base, url.strip_prefix(INTERNAL_MEDIA_PREFIX)) {
            // Drop the internal host and port, keep the path
            (Some(base), Some(rest)) => {
                let path = rest.find('/').map_or("", |idx| &rest[idx..]);
                format!("{base}{path}")
            }
            _ => url.to_string(),
        }
    }
}
