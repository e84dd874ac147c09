use reqwest::Url;
use serde::{Deserialize, Serialize};

/// The paginated envelope every list endpoint returns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Page number encoded in the `next` link.
    pub fn next_page(&self) -> Option<u32> {
        self.next.as_deref().map(page_number)
    }

    /// Page number encoded in the `previous` link. The server drops the
    /// `page` parameter when pointing back at the first page.
    pub fn previous_page(&self) -> Option<u32> {
        self.previous.as_deref().map(page_number)
    }
}

fn page_number(link: &str) -> u32 {
    Url::parse(link)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
        .unwrap_or(1)
}
