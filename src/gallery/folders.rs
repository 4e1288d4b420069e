//! Folder resolution and grouping for a country's image set.
//!
//! Every image resolves to exactly one folder key:
//! 1. its `folder` field, when not blank
//! 2. otherwise the first segment of its `storage_path`, when the path has a `/`
//! 3. otherwise [`UNCATEGORIZED`]

use crate::models::{folder::GalleryFolder, gallery_image::GalleryImage};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Fallback key for images with neither a folder nor a nested storage path.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Resolve the folder key for one image.
pub fn folder_key(image: &GalleryImage) -> String {
    if let Some(folder) = image.folder.as_deref() {
        if !folder.trim().is_empty() {
            return folder.to_string();
        }
    }
    if let Some((first, _)) = image.storage_path.split_once('/') {
        if !first.is_empty() {
            return first.to_string();
        }
    }
    UNCATEGORIZED.to_string()
}

/// Images partitioned by folder key.
///
/// Within a group, images keep the order they were fetched in (newest first).
#[derive(Debug, Default, Clone)]
pub struct FolderGroups {
    groups: BTreeMap<String, Vec<GalleryImage>>,
}

impl FolderGroups {
    /// Images under `key`. Unknown keys yield an empty slice.
    pub fn get(&self, key: &str) -> &[GalleryImage] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GalleryImage])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Build one card per group, decorated with any matching folder metadata.
    pub fn summaries(&self, metadata: &[GalleryFolder]) -> Vec<FolderSummary> {
        let by_name: HashMap<&str, &GalleryFolder> =
            metadata.iter().map(|m| (m.name.as_str(), m)).collect();

        self.iter()
            .map(|(key, images)| {
                let meta = by_name.get(key);
                FolderSummary {
                    key: key.to_string(),
                    display_name: meta
                        .map(|m| m.display_name.clone())
                        .unwrap_or_else(|| key.to_string()),
                    description: meta.and_then(|m| m.description.clone()),
                    cover_image_url: meta
                        .and_then(|m| m.cover_image_url.clone())
                        .or_else(|| images.first().map(|i| i.image_url.clone())),
                    image_count: images.len(),
                }
            })
            .collect()
    }
}

/// A folder card in the folder-list view.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FolderSummary {
    pub key: String,
    pub display_name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub image_count: usize,
}

/// Partition `images` by [`folder_key`], preserving input order per group.
pub fn group_by_folder(images: impl IntoIterator<Item = GalleryImage>) -> FolderGroups {
    let mut groups: BTreeMap<String, Vec<GalleryImage>> = BTreeMap::new();
    for image in images {
        groups.entry(folder_key(&image)).or_default().push(image);
    }
    FolderGroups { groups }
}
