use chrono::{DateTime, Utc};

use crate::catalog::Volume;

/// Public identity. The password hash never leaves the db layer.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
}

/// Locally cached catalog entry. Seeded from the catalog on first sight and
/// never refreshed afterwards.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub external_id: String,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Live catalog metadata, normalized from the volume envelope. Also the
/// shape of a single search result.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub external_id: String,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub cover_url: Option<String>,
}

impl BookMetadata {
    pub fn from_volume(volume: Volume) -> Self {
        let info = volume.volume_info;

        let author = info
            .authors
            .filter(|authors| !authors.is_empty())
            .map(|authors| authors.join(", "));
        let cover_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail));

        BookMetadata {
            external_id: volume.id,
            title: info.title.unwrap_or_else(|| "Untitled".to_string()),
            author,
            description: info.description.map(|d| crate::sanitize::clean_html(&d)),
            published_date: info.published_date,
            cover_url,
        }
    }
}

/// Statistics derived from active interaction rows. Never persisted.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub average_rating: f64,
    pub favorite_count: i64,
    pub review_count: i64,
}

/// The acting user's own interaction state for one book.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    pub rating: Option<i16>,
    pub is_favorite: bool,
}

/// Unified book view: live catalog metadata (absent when the catalog is
/// unreachable), the cached record, derived statistics, and the viewer's own
/// state when a session is present.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub metadata: Option<BookMetadata>,
    pub book: Book,
    pub aggregate: Aggregate,
    pub viewer: Option<ViewerState>,
}

/// A stored review row, as returned by write operations.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review with its author's display name, for the public per-book list.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<String>,
}

/// A rating with its rater's display name, for the public per-book list.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub id: i64,
    pub score: i16,
    pub created_at: DateTime<Utc>,
    pub rater: Option<String>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedBook {
    #[sqlx(flatten)]
    pub book: Book,
    pub body: String,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RatedBook {
    #[sqlx(flatten)]
    pub book: Book,
    pub score: i16,
    pub rated_at: DateTime<Utc>,
}
