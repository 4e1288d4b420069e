//! Blog articles authored through the admin editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,

    /// URL-safe identifier, unique across articles.
    pub slug: String,

    pub featured_image: Option<String>,

    // SEO
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub alt_text: Option<String>,

    /// Stored as a JSON array in a TEXT column.
    pub tags: Option<Json<Vec<String>>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editor form payload, used for both create and update.
///
/// On create a missing `slug` is derived from the title. On update a missing
/// `slug` keeps the stored one.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub slug: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub alt_text: Option<String>,
    pub tags: Option<Vec<String>>,
}
