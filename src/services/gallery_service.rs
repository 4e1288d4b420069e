//! GalleryService: country-scoped image listing, upload and lifecycle.
//!
//! Metadata lives in the `gallery` table; payloads live in the object store
//! under one bucket per country. There is no transaction spanning the two:
//! a delete removes the payload first and drops the row even if that fails.

use super::{ServiceError, ServiceResult, UploadStage};
use crate::{
    gallery::{
        folders::{FolderGroups, group_by_folder},
        upload::{UploadFile, UploadPlan, UploadRequest, generate_file_name},
    },
    models::{
        country::Country,
        gallery_image::{GalleryImage, ImageMetadataUpdate, PRIVATE_LABEL},
    },
    query::{IMAGE_COLUMNS, ImageQuery, Visibility},
    storage::ObjectStore,
};
use chrono::Utc;
use futures::future::join_all;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct GalleryService {
    db: Arc<SqlitePool>,
    store: Arc<dyn ObjectStore>,
}

/// Why one file of a batch did not make it.
struct FileFailure {
    file: String,
    stage: UploadStage,
    message: String,
}

impl GalleryService {
    pub fn new(db: Arc<SqlitePool>, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    /// Make sure every country has its bucket.
    pub async fn ensure_buckets(&self) -> ServiceResult<()> {
        for country in Country::ALL {
            self.store.ensure_bucket(&country.bucket()).await?;
        }
        Ok(())
    }

    /// All images for `country`, newest first.
    pub async fn list_images(
        &self,
        country: Country,
        visibility: Visibility,
    ) -> ServiceResult<Vec<GalleryImage>> {
        let images = ImageQuery::new()
            .country(country)
            .visibility(visibility)
            .fetch_all(&self.db)
            .await?;
        debug!("fetched {} images for {}", images.len(), country);
        Ok(images)
    }

    pub async fn folder_groups(
        &self,
        country: Country,
        visibility: Visibility,
    ) -> ServiceResult<FolderGroups> {
        Ok(group_by_folder(self.list_images(country, visibility).await?))
    }

    pub async fn get_image(&self, id: Uuid) -> ServiceResult<GalleryImage> {
        sqlx::query_as::<_, GalleryImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM gallery WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("image `{id}`")))
    }

    /// Validate a batch, then upload and record every file concurrently.
    ///
    /// Files that succeed keep their object and row even when a sibling fails;
    /// the error names the first failed file and its stage.
    pub async fn upload_batch(&self, request: UploadRequest) -> ServiceResult<Vec<GalleryImage>> {
        let plan = request.validate()?;
        let total = plan.files.len();
        info!(
            "uploading {} file(s) to {} (folder: {})",
            total,
            plan.country.bucket(),
            plan.folder.as_deref().unwrap_or("-")
        );

        let results = join_all(
            plan.files
                .iter()
                .enumerate()
                .map(|(index, file)| self.store_one(&plan, index, file)),
        )
        .await;

        let mut stored = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(image) => stored.push(image),
                Err(failure) => {
                    error!(
                        "upload of {} failed at {} stage: {}",
                        failure.file, failure.stage, failure.message
                    );
                    failures.push(failure);
                }
            }
        }

        match failures.into_iter().next() {
            None => Ok(stored),
            Some(first) => Err(ServiceError::UploadFailed {
                file: first.file,
                stage: first.stage,
                message: first.message,
                succeeded: stored.len(),
                total,
            }),
        }
    }

    async fn store_one(
        &self,
        plan: &UploadPlan,
        index: usize,
        file: &UploadFile,
    ) -> Result<GalleryImage, FileFailure> {
        let fail = |stage: UploadStage, message: String| FileFailure {
            file: file.file_name.clone(),
            stage,
            message,
        };

        let bucket = plan.country.bucket();
        let key = plan.storage_key(&generate_file_name(&file.file_name));

        self.store
            .upload(&bucket, &key, file.content_type.as_deref(), file.data.clone())
            .await
            .map_err(|e| fail(UploadStage::Upload, e.to_string()))?;

        let image_url = self
            .store
            .public_url(&bucket, &key)
            .map_err(|e| fail(UploadStage::PublicUrl, e.to_string()))?;

        sqlx::query_as::<_, GalleryImage>(&format!(
            "INSERT INTO gallery (
                id, title, description, image_url, storage_path,
                folder, label, country, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(plan.title_for(index))
        .bind(plan.description.clone())
        .bind(image_url)
        .bind(&key)
        .bind(plan.folder.clone())
        .bind(plan.label.clone())
        .bind(plan.country)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await
        .map_err(|e| fail(UploadStage::Insert, e.to_string()))
    }

    /// Edit title, description and label in place. Last write wins.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        update: ImageMetadataUpdate,
    ) -> ServiceResult<GalleryImage> {
        let current = self.get_image(id).await?;

        let title = match update.title {
            Some(title) if title.trim().is_empty() => {
                return Err(ServiceError::Validation("title is required".into()));
            }
            Some(title) => title.trim().to_string(),
            None => current.title,
        };
        let description = update.description.unwrap_or(current.description);
        let label = update
            .label
            .unwrap_or(current.label)
            .filter(|l| !l.trim().is_empty());

        self.write_metadata(id, &title, description, label).await
    }

    /// Flip the label between private and absent.
    pub async fn toggle_visibility(&self, id: Uuid) -> ServiceResult<GalleryImage> {
        let current = self.get_image(id).await?;
        let label = if current.is_private() {
            None
        } else {
            Some(PRIVATE_LABEL.to_string())
        };
        debug!(
            "toggling visibility of {} to {}",
            id,
            if label.is_some() { "private" } else { "public" }
        );
        self.write_metadata(id, &current.title, current.description, label)
            .await
    }

    async fn write_metadata(
        &self,
        id: Uuid,
        title: &str,
        description: Option<String>,
        label: Option<String>,
    ) -> ServiceResult<GalleryImage> {
        sqlx::query_as::<_, GalleryImage>(&format!(
            "UPDATE gallery SET title = ?, description = ?, label = ?
             WHERE id = ?
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(label)
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("image `{id}`")))
    }

    /// Remove the payload, then the row. A storage failure is logged and the
    /// row is deleted anyway.
    pub async fn delete_image(&self, id: Uuid) -> ServiceResult<GalleryImage> {
        let image = self.get_image(id).await?;

        if let Err(err) = self
            .store
            .remove(&image.country.bucket(), &image.storage_path)
            .await
        {
            warn!(
                "failed to remove {}/{} for image {}: {}",
                image.country.bucket(),
                image.storage_path,
                id,
                err
            );
        }

        let result = sqlx::query("DELETE FROM gallery WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("image `{id}`")));
        }

        info!("deleted image {} ({})", id, image.storage_path);
        Ok(image)
    }
}
