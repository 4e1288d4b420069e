//! HTTP handlers, grouped by resource.

pub mod article_handlers;
pub mod auth_handlers;
pub mod extractors;
pub mod gallery_handlers;
pub mod health_handlers;
pub mod storage_handlers;
