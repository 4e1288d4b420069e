//! Optional presentation metadata for a gallery folder.

use super::country::Country;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Display details for a folder key within one country.
///
/// Folder identity comes from the images themselves; a row here only
/// decorates the group whose key equals `name`. Unique per `(name, country)`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct GalleryFolder {
    pub id: Uuid,

    /// Machine name, equal to the folder key it decorates.
    pub name: String,

    pub display_name: String,

    pub description: Option<String>,

    pub cover_image_url: Option<String>,

    pub country: Country,

    pub created_at: DateTime<Utc>,
}

/// Body of `PUT /api/gallery/{country}/folder-meta`.
#[derive(Deserialize, Debug, Clone)]
pub struct FolderMetadataInput {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}
