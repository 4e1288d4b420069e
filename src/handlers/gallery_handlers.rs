//! HTTP handlers for the gallery: address resolution, folder cards, image
//! listing, uploads and admin lifecycle operations.

use super::extractors::{AdminSession, MaybeSession};
use crate::{
    errors::AppError,
    gallery::{
        folders::FolderSummary,
        navigation::{GalleryNavigator, GalleryRoute, GalleryView},
        upload::{UploadFile, UploadRequest},
    },
    models::{
        country::{Country, CountryInfo},
        folder::{FolderMetadataInput, GalleryFolder},
        gallery_image::{GalleryImage, ImageMetadataUpdate},
    },
    query::Visibility,
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    /// Include private images. Honoured for admin sessions only.
    #[serde(default)]
    pub all: bool,
}

/// What the gallery page renders for one address.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    /// Canonical form of the requested address.
    pub address: String,
    pub country: CountryInfo,
    pub view: GalleryView,
    /// Address of the "back to folders" action.
    pub folders_address: String,
    pub folders: Vec<FolderSummary>,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploaded: Vec<GalleryImage>,
}

/// `GET /api/countries`
pub async fn list_countries() -> Json<Vec<CountryInfo>> {
    Json(Country::ALL.into_iter().map(CountryInfo::from).collect())
}

/// `GET /api/gallery/view?path=/gallery/{country}/f/{folder}`
///
/// Folder-list addresses return the folder cards; folder-detail addresses
/// return that folder's images (empty if the folder does not exist).
pub async fn resolve_view(
    State(state): State<AppState>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<ViewResponse>, AppError> {
    let address = q.path.unwrap_or_else(|| "/gallery".into());
    let nav = GalleryNavigator::new(&address)?;
    let country = nav.country();

    let groups = state
        .gallery
        .folder_groups(country, Visibility::PublicOnly)
        .await?;

    let (folders, images) = match nav.view() {
        GalleryView::FolderList => {
            let metadata = state.folders.list(country).await?;
            (groups.summaries(&metadata), Vec::new())
        }
        GalleryView::FolderDetail(_) => (Vec::new(), nav.visible_images(&groups).to_vec()),
    };

    Ok(Json(ViewResponse {
        address: nav.route().to_path(),
        country: country.into(),
        view: nav.view(),
        folders_address: GalleryRoute::folder_list(country).to_path(),
        folders,
        images,
    }))
}

/// `GET /api/gallery/{country}/folders`
pub async fn list_folders(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<Vec<FolderSummary>>, AppError> {
    let country = country.parse::<Country>()?;
    let groups = state
        .gallery
        .folder_groups(country, Visibility::PublicOnly)
        .await?;
    let metadata = state.folders.list(country).await?;
    Ok(Json(groups.summaries(&metadata)))
}

/// `GET /api/gallery/{country}/images[?all=true]`
pub async fn list_images(
    State(state): State<AppState>,
    Path(country): Path<String>,
    Query(q): Query<ImagesQuery>,
    MaybeSession(session): MaybeSession,
) -> Result<Json<Vec<GalleryImage>>, AppError> {
    let country = country.parse::<Country>()?;
    let visibility = if q.all && session.is_some() {
        Visibility::All
    } else {
        Visibility::PublicOnly
    };
    Ok(Json(state.gallery.list_images(country, visibility).await?))
}

/// `POST /api/gallery/upload` (multipart)
///
/// Fields: `title`, `description`, `country`, `label`, `folder`, and one or
/// more `files` (or `file`) parts.
pub async fn upload_images(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let request = read_upload_form(multipart).await?;
    debug!(
        "{} uploading {} file(s) to {}",
        session.email,
        request.files.len(),
        request.country
    );
    let uploaded = state.gallery.upload_batch(request).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { uploaded })))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
                request.files.push(UploadFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "title" | "description" | "country" | "label" | "folder" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
                match name.as_str() {
                    "title" => request.title = value,
                    "description" => request.description = Some(value),
                    "country" => {
                        request.country = value
                            .parse::<Country>()
                            .map_err(|e| AppError::bad_request(e.to_string()))?
                    }
                    "label" => request.label = Some(value),
                    _ => request.folder = Some(value),
                }
            }
            other => debug!("ignoring multipart field {}", other),
        }
    }

    Ok(request)
}

/// `PATCH /api/gallery/images/{id}`
pub async fn update_image(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(update): Json<ImageMetadataUpdate>,
) -> Result<Json<GalleryImage>, AppError> {
    Ok(Json(state.gallery.update_metadata(id, update).await?))
}

/// `POST /api/gallery/images/{id}/visibility`
pub async fn toggle_visibility(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<GalleryImage>, AppError> {
    Ok(Json(state.gallery.toggle_visibility(id).await?))
}

/// `DELETE /api/gallery/images/{id}`
pub async fn delete_image(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.gallery.delete_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/gallery/{country}/folder-meta`
pub async fn list_folder_metadata(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<Vec<GalleryFolder>>, AppError> {
    let country = country.parse::<Country>()?;
    Ok(Json(state.folders.list(country).await?))
}

/// `PUT /api/gallery/{country}/folder-meta`
pub async fn upsert_folder_metadata(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(country): Path<String>,
    Json(input): Json<FolderMetadataInput>,
) -> Result<Json<GalleryFolder>, AppError> {
    let country = country.parse::<Country>()?;
    Ok(Json(state.folders.upsert(country, input).await?))
}

/// `DELETE /api/gallery/{country}/folder-meta/{name}`
pub async fn delete_folder_metadata(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path((country, name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let country = country.parse::<Country>()?;
    state.folders.delete(country, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
