//! Async client for the Zotero Web API v3 and the local Zotero API.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::warn;
use url::Url;

use crate::error::Result;
use crate::error::ZoteroError;
use crate::models::Collection;
use crate::models::Item;
use crate::models::LibraryType;
use crate::retry::RetryDecision;
use crate::retry::RetryState;

pub const WEB_API_BASE_URL: &str = "https://api.zotero.org";
pub const LOCAL_API_BASE_URL: &str = "http://localhost:23119/api";

/// Largest page size the Zotero API accepts.
pub const PAGE_LIMIT: usize = 100;

const API_VERSION: &str = "3";
const LOCAL_USER_ID: &str = "0";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoteroConfig {
    pub library_id: String,
    pub library_type: LibraryType,
    /// Empty when talking to the local API.
    pub api_key: String,
    pub local: bool,
    /// Overrides the web/local default endpoint.
    pub base_url: Option<String>,
    pub user_agent: String,
}

impl ZoteroConfig {
    pub fn endpoint_base(&self) -> &str {
        match (&self.base_url, self.local) {
            (Some(url), _) => url,
            (None, true) => LOCAL_API_BASE_URL,
            (None, false) => WEB_API_BASE_URL,
        }
    }

    /// `users/<id>` or `groups/<id>`. The local API addresses the signed-in user as `0`.
    pub fn library_path(&self) -> String {
        let id = match self.library_type {
            LibraryType::User if self.local => LOCAL_USER_ID,
            _ => self.library_id.as_str(),
        };
        format!("{}/{id}", self.library_type.path_prefix())
    }
}

#[derive(Debug, Clone)]
pub struct ZoteroClient {
    http: reqwest::Client,
    library_url: Url,
    api_key: Option<String>,
}

impl ZoteroClient {
    pub fn new(config: &ZoteroConfig) -> Result<Self> {
        let raw = format!(
            "{}/{}/",
            config.endpoint_base().trim_end_matches('/'),
            config.library_path()
        );
        let library_url = Url::parse(&raw).map_err(|source| ZoteroError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| ZoteroError::Transport { url: raw, source })?;

        let api_key = Some(config.api_key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(Self {
            http,
            library_url,
            api_key,
        })
    }

    pub fn library_url(&self) -> &Url {
        &self.library_url
    }

    /// Every collection in the library, at any nesting depth.
    pub async fn collections(&self) -> Result<Vec<Collection>> {
        self.get_all("collections").await
    }

    /// Every item filed in the collection, including child notes and attachments.
    pub async fn collection_items(&self, collection_key: &str) -> Result<Vec<Item>> {
        self.get_all(&format!("collections/{collection_key}/items"))
            .await
    }

    pub async fn item(&self, key: &str) -> Result<Item> {
        let url = self.endpoint(&format!("items/{key}"))?;
        match self.send(&url).await {
            Ok(response) => decode(&url, response).await,
            Err(ZoteroError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(ZoteroError::ItemNotFound {
                    key: key.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.library_url
            .join(path)
            .map_err(|source| ZoteroError::InvalidUrl {
                url: format!("{}{path}", self.library_url),
                source,
            })
    }

    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut start = 0usize;

        loop {
            let mut url = self.endpoint(path)?;
            url.query_pairs_mut()
                .append_pair("limit", &PAGE_LIMIT.to_string())
                .append_pair("start", &start.to_string());

            let response = self.send(&url).await?;
            let total = total_results(response.headers());
            let page: Vec<T> = decode(&url, response).await?;
            let fetched = page.len();
            all.extend(page);
            start += fetched;

            debug!(%url, fetched, ?total, "fetched page");

            let done = match total {
                Some(total) => start >= total,
                None => fetched < PAGE_LIMIT,
            };
            if fetched == 0 || done {
                return Ok(all);
            }
        }
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        let mut retry = RetryState::new();

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .header("Zotero-API-Version", API_VERSION);
            if let Some(key) = &self.api_key {
                request = request.header("Zotero-API-Key", key);
            }

            let response = request
                .send()
                .await
                .map_err(|source| ZoteroError::Transport {
                    url: url.to_string(),
                    source,
                })?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match retry.plan_retry(status, response.headers()) {
                Some(RetryDecision::Retry(plan)) => {
                    warn!(
                        %url,
                        %status,
                        attempt = plan.attempt,
                        max_attempts = plan.max_attempts,
                        backoff_secs = plan.backoff.as_secs(),
                        "Zotero API asked us to slow down; retrying"
                    );
                    tokio::time::sleep(plan.backoff).await;
                    continue;
                }
                Some(RetryDecision::GiveUp { attempts }) => {
                    return Err(ZoteroError::RetriesExhausted {
                        status,
                        url: url.to_string(),
                        attempts,
                    });
                }
                None => {}
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ZoteroError::Status {
                status,
                url: url.to_string(),
                body: truncate_body(&body),
            });
        }
    }
}

async fn decode<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ZoteroError::Transport {
            url: url.to_string(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|source| ZoteroError::Decode {
        url: url.to_string(),
        source,
    })
}

fn total_results(headers: &HeaderMap) -> Option<usize> {
    headers
        .get("Total-Results")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(local: bool, library_type: LibraryType) -> ZoteroConfig {
        ZoteroConfig {
            library_id: "475425".to_string(),
            library_type,
            api_key: String::new(),
            local,
            base_url: None,
            user_agent: "zog/test".to_string(),
        }
    }

    #[test]
    fn web_user_library_url() {
        let client = ZoteroClient::new(&config(false, LibraryType::User)).expect("client");
        assert_eq!(
            client.library_url().as_str(),
            "https://api.zotero.org/users/475425/"
        );
    }

    #[test]
    fn local_user_library_uses_signed_in_user() {
        let client = ZoteroClient::new(&config(true, LibraryType::User)).expect("client");
        assert_eq!(
            client.library_url().as_str(),
            "http://localhost:23119/api/users/0/"
        );
    }

    #[test]
    fn local_group_library_keeps_group_id() {
        let client = ZoteroClient::new(&config(true, LibraryType::Group)).expect("client");
        assert_eq!(
            client.library_url().as_str(),
            "http://localhost:23119/api/groups/475425/"
        );
    }

    #[test]
    fn base_url_override_keeps_path_prefix() {
        let mut cfg = config(false, LibraryType::Group);
        cfg.base_url = Some("http://127.0.0.1:9999/zotero/".to_string());
        let client = ZoteroClient::new(&cfg).expect("client");
        assert_eq!(
            client
                .endpoint("collections/ABC/items")
                .expect("endpoint")
                .as_str(),
            "http://127.0.0.1:9999/zotero/groups/475425/collections/ABC/items"
        );
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }
}
