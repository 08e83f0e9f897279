// src/infrastructure/favicon.rs
use crate::domain::bookmark::Bookmark;
use url::Url;

pub const DEFAULT_FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";
pub const DEFAULT_FAVICON_SIZE: u32 = 32;

/// Builds image URLs of an external favicon service, addressed by domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconService {
    service_url: String,
    size: u32,
}

impl Default for FaviconService {
    fn default() -> Self {
        Self::new(DEFAULT_FAVICON_SERVICE, DEFAULT_FAVICON_SIZE)
    }
}

impl FaviconService {
    pub fn new(service_url: impl Into<String>, size: u32) -> Self {
        Self {
            service_url: service_url.into(),
            size,
        }
    }

    /// `None` when the URL has no host or the service URL is unusable
    pub fn url_for(&self, page_url: &str) -> Option<String> {
        let host = Url::parse(page_url).ok()?.host_str()?.to_string();
        let mut icon = Url::parse(&self.service_url).ok()?;
        icon.query_pairs_mut()
            .append_pair("domain", &host)
            .append_pair("sz", &self.size.to_string());
        Some(icon.into())
    }

    pub fn for_bookmark(&self, bookmark: &Bookmark) -> Option<String> {
        self.url_for(&bookmark.url)
    }
}
