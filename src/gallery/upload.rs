//! Upload batch validation and storage key planning.
//!
//! Nothing here touches the network: a batch that fails validation never
//! reaches the object store or the database.

use crate::models::country::Country;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("at least one file is required")]
    NoFiles,
    #[error("file `{0}` is empty")]
    EmptyFile(String),
    #[error("a folder name is required when uploading multiple files")]
    FolderRequired,
    #[error("folder name `{0}` contains no usable characters")]
    InvalidFolder(String),
}

/// One file picked by the uploader.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A batch as submitted by the upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub country: Country,
    pub label: Option<String>,
    pub folder: Option<String>,
    pub files: Vec<UploadFile>,
}

/// A validated batch with its folder normalized.
#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub title: String,
    pub description: Option<String>,
    pub country: Country,
    pub label: Option<String>,
    pub folder: Option<String>,
    pub files: Vec<UploadFile>,
}

impl UploadRequest {
    /// Check required fields and normalize the folder name.
    pub fn validate(self) -> Result<UploadPlan, UploadValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(UploadValidationError::MissingTitle);
        }
        if self.files.is_empty() {
            return Err(UploadValidationError::NoFiles);
        }
        if let Some(empty) = self.files.iter().find(|f| f.data.is_empty()) {
            return Err(UploadValidationError::EmptyFile(empty.file_name.clone()));
        }

        let raw_folder = self
            .folder
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        let folder = match raw_folder {
            Some(raw) => {
                let normalized = normalize_folder_name(raw);
                if normalized.is_empty() {
                    return Err(UploadValidationError::InvalidFolder(raw.to_string()));
                }
                Some(normalized)
            }
            None if self.files.len() > 1 => return Err(UploadValidationError::FolderRequired),
            None => None,
        };

        Ok(UploadPlan {
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            country: self.country,
            label: self.label.filter(|l| !l.trim().is_empty()),
            folder,
            files: self.files,
        })
    }
}

impl UploadPlan {
    /// Row title for the `index`-th file. Multi-file batches get a ` (n)` suffix.
    pub fn title_for(&self, index: usize) -> String {
        if self.files.len() > 1 {
            format!("{} ({})", self.title, index + 1)
        } else {
            self.title.clone()
        }
    }

    /// Storage key for a generated file name, prefixed by the folder if any.
    pub fn storage_key(&self, generated_name: &str) -> String {
        match &self.folder {
            Some(folder) => format!("{}/{}", folder, generated_name),
            None => generated_name.to_string(),
        }
    }
}

/// Make a folder name safe for use as a storage key prefix.
///
/// `"Events/CSR Visit!"` becomes `"events/csr-visit"`.
pub fn normalize_folder_name(input: &str) -> String {
    input
        .trim()
        .trim_matches('/')
        .split('/')
        .map(normalize_segment)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.trim().chars().flat_map(char::to_lowercase) {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c
        } else {
            '-'
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }
    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Collision-resistant object name: `<unix-millis>-<uuid>.<ext>`.
pub fn generate_file_name(original: &str) -> String {
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        file_extension(original)
    )
}

fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
