//! Core data models for the gallery site.
//!
//! These entities map to the `gallery`, `gallery_folders` and `articles`
//! tables via `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod article;
pub mod country;
pub mod folder;
pub mod gallery_image;
