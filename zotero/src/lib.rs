//! Read-only access to Zotero libraries for `zog`.
//!
//! Talks to either the Zotero Web API (`api.zotero.org`) or the local API served by the Zotero
//! desktop app, and resolves collection paths to collection keys.

mod client;
pub mod collections;
mod error;
pub mod models;
pub mod retry;

pub use client::LOCAL_API_BASE_URL;
pub use client::PAGE_LIMIT;
pub use client::WEB_API_BASE_URL;
pub use client::ZoteroClient;
pub use client::ZoteroConfig;
pub use error::ResolveError;
pub use error::Result;
pub use error::ZoteroError;
pub use models::Collection;
pub use models::Item;
pub use models::LibraryType;
pub use reqwest::StatusCode;
