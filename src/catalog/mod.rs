//! Client for the external book catalog (a Google-Books-style volume API).
//!
//! The catalog is an unreliable collaborator: callers decide whether a failed
//! lookup is fatal or degrades to a locally-cached view, so errors stay
//! fine-grained here instead of being folded into a generic 500.

use std::time::Duration;

use serde::Deserialize;

use crate::config::Catalog;

#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

/// A single catalog entry, as returned by `GET /volumes/{id}`.
#[derive(Debug, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

/// Envelope for `GET /volumes?q=...`. `items` is absent entirely when the
/// query matches nothing.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog entry not found")]
    NotFound,

    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned status {status}")]
    Status { status: u16 },
}

impl CatalogClient {
    pub fn new(config: &Catalog) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_milliseconds))
            .build()?;

        Ok(CatalogClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[tracing::instrument(name = "catalog fetch by id", skip(self))]
    pub async fn fetch_by_id(&self, external_id: &str) -> Result<Volume, CatalogError> {
        let response = self
            .client
            .get(format!("{}/volumes/{}", self.base_url, external_id))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<Volume>().await?),
            reqwest::StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
            status => Err(CatalogError::Status {
                status: status.as_u16(),
            }),
        }
    }

    #[tracing::instrument(name = "catalog search", skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Volume>, CatalogError> {
        let response = self
            .client
            .get(format!("{}/volumes", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<SearchPage>().await?.items),
            status => Err(CatalogError::Status {
                status: status.as_u16(),
            }),
        }
    }
}
