//! Typed queries over the `gallery` table.
//!
//! Callers describe what they want with [`ImageQuery`]; the SQL and its binds
//! are assembled here with `sqlx::QueryBuilder`, so no filter or column name
//! is ever passed around as a string.

use crate::models::{
    country::Country,
    gallery_image::{GalleryImage, PRIVATE_LABEL},
};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};

pub(crate) const IMAGE_COLUMNS: &str = "id, title, description, image_url, storage_path, \
     folder, label, country, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Skip rows labelled private.
    #[default]
    PublicOnly,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct ImageQuery {
    country: Option<Country>,
    visibility: Visibility,
}

impl ImageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn builder(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(IMAGE_COLUMNS);
        builder.push(" FROM gallery WHERE 1 = 1");

        if let Some(country) = self.country {
            builder.push(" AND country = ");
            builder.push_bind(country);
        }

        if self.visibility == Visibility::PublicOnly {
            builder.push(" AND (label IS NULL OR label <> ");
            builder.push_bind(PRIVATE_LABEL);
            builder.push(")");
        }

        // newest first; rowid breaks ties within one timestamp
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        builder
    }

    pub async fn fetch_all(&self, db: &SqlitePool) -> sqlx::Result<Vec<GalleryImage>> {
        let mut builder = self.builder();
        builder.build_query_as::<GalleryImage>().fetch_all(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_country_query_filters_private_labels() {
        let query = ImageQuery::new().country(Country::Kenya);
        let builder = query.builder();
        let sql = builder.sql();
        assert!(sql.contains("country = ?"));
        assert!(sql.contains("(label IS NULL OR label <> ?)"));
        assert!(sql.ends_with("ORDER BY created_at DESC, rowid DESC"));
    }

    #[test]
    fn admin_query_includes_everything() {
        let query = ImageQuery::new().visibility(Visibility::All);
        let builder = query.builder();
        let sql = builder.sql();
        assert!(!sql.contains("label IS NULL"));
        assert!(!sql.contains("label <>"));
        assert!(!sql.contains("country ="));
        assert!(sql.ends_with("ORDER BY created_at DESC, rowid DESC"));
    }
}
