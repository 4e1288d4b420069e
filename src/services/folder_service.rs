//! Folder metadata (display name, description, cover) per country.

use super::{ServiceError, ServiceResult};
use crate::models::{
    country::Country,
    folder::{FolderMetadataInput, GalleryFolder},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

const FOLDER_COLUMNS: &str =
    "id, name, display_name, description, cover_image_url, country, created_at";

#[derive(Clone)]
pub struct FolderService {
    db: Arc<SqlitePool>,
}

impl FolderService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn list(&self, country: Country) -> ServiceResult<Vec<GalleryFolder>> {
        let rows = sqlx::query_as::<_, GalleryFolder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM gallery_folders WHERE country = ? ORDER BY name ASC"
        ))
        .bind(country)
        .fetch_all(&*self.db)
        .await?;
        Ok(rows)
    }

    /// Insert or replace the metadata for `(name, country)`.
    pub async fn upsert(
        &self,
        country: Country,
        input: FolderMetadataInput,
    ) -> ServiceResult<GalleryFolder> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("folder name is required".into()));
        }
        let display_name = input
            .display_name
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| name.clone());

        let folder = sqlx::query_as::<_, GalleryFolder>(&format!(
            "INSERT INTO gallery_folders (
                id, name, display_name, description, cover_image_url, country, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name, country) DO UPDATE SET
                display_name = excluded.display_name,
                description = excluded.description,
                cover_image_url = excluded.cover_image_url
            RETURNING {FOLDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&display_name)
        .bind(input.description)
        .bind(input.cover_image_url)
        .bind(country)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        tracing::debug!("upserted folder metadata {}/{}", country, name);
        Ok(folder)
    }

    pub async fn delete(&self, country: Country, name: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM gallery_folders WHERE name = ? AND country = ?")
            .bind(name)
            .bind(country)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("folder `{name}`")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::memory_pool;

    fn input(name: &str, display: Option<&str>) -> FolderMetadataInput {
        FolderMetadataInput {
            name: name.into(),
            display_name: display.map(str::to_string),
            description: None,
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn upsert_is_unique_per_name_and_country() {
        let service = FolderService::new(memory_pool().await);

        let first = service
            .upsert(Country::Ghana, input("events", Some("Events")))
            .await
            .unwrap();
        let second = service
            .upsert(Country::Ghana, input("events", Some("Events 2024")))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "Events 2024");

        service
            .upsert(Country::Kenya, input("events", None))
            .await
            .unwrap();

        let ghana = service.list(Country::Ghana).await.unwrap();
        assert_eq!(ghana.len(), 1);
        let kenya = service.list(Country::Kenya).await.unwrap();
        assert_eq!(kenya[0].display_name, "events");
    }

    #[tokio::test]
    async fn blank_names_and_missing_rows_are_errors() {
        let service = FolderService::new(memory_pool().await);
        assert!(matches!(
            service.upsert(Country::Ghana, input("  ", None)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.delete(Country::Ghana, "nope").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
