//! Represents one uploaded gallery image (a row in the `gallery` table).

use super::country::Country;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Label value that hides an image from public listings.
pub const PRIVATE_LABEL: &str = "private";

/// Metadata for a single image stored in a country bucket.
///
/// The row holds the public URL and the storage key; the bytes live in the
/// object store under `gallery-<country>/<storage_path>`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct GalleryImage {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Public URL the object store handed back after upload.
    pub image_url: String,

    /// Object key within the country bucket, e.g. `events/1700000000000-ab12.jpg`.
    pub storage_path: String,

    /// Folder name chosen at upload time, already normalized.
    pub folder: Option<String>,

    /// Free-text tag. [`PRIVATE_LABEL`] hides the image from public listings.
    pub label: Option<String>,

    pub country: Country,

    pub created_at: DateTime<Utc>,
}

impl GalleryImage {
    pub fn is_private(&self) -> bool {
        self.label.as_deref() == Some(PRIVATE_LABEL)
    }
}

/// Partial update applied by the admin metadata editor.
///
/// Fields left as `None` are not touched. `label: Some(None)` clears the label.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ImageMetadataUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub label: Option<Option<String>>,
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_null_clears_label() {
        let update: ImageMetadataUpdate =
            serde_json::from_str(r#"{ "label": null }"#).unwrap();
        assert_eq!(update.label, Some(None));
        assert_eq!(update.description, None);
        assert_eq!(update.title, None);
    }

    #[test]
    fn private_label_is_detected() {
        let image = GalleryImage {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            image_url: "http://x/a.jpg".into(),
            storage_path: "a.jpg".into(),
            folder: None,
            label: Some(PRIVATE_LABEL.into()),
            country: Country::Kenya,
            created_at: Utc::now(),
        };
        assert!(image.is_private());
    }
}
