//! Address-driven navigation between the folder list and a folder's images.
//!
//! Addresses:
//! - `/gallery`                         - folder list of the default country
//! - `/gallery/{country}`               - folder list of `country`
//! - `/gallery/{country}/f/{folder}`    - images of one folder (URL-escaped key)
//!
//! The history is authoritative: every transition pushes an address and the
//! view is then re-derived from that address, never the other way round.

use super::folders::FolderGroups;
use crate::models::{
    country::{Country, UnknownCountry},
    gallery_image::GalleryImage,
};
use serde::Serialize;
use thiserror::Error;

const GALLERY_ROOT: &str = "gallery";
const FOLDER_MARKER: &str = "f";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("`{0}` is not a gallery address")]
    NotGalleryPath(String),
    #[error(transparent)]
    UnknownCountry(#[from] UnknownCountry),
    #[error("folder segment `{0}` is not valid UTF-8 once decoded")]
    InvalidFolder(String),
}

/// A parsed gallery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryRoute {
    pub country: Country,
    pub folder: Option<String>,
}

impl GalleryRoute {
    pub fn folder_list(country: Country) -> Self {
        Self {
            country,
            folder: None,
        }
    }

    pub fn folder_detail(country: Country, folder: impl Into<String>) -> Self {
        Self {
            country,
            folder: Some(folder.into()),
        }
    }

    /// Parse an address. Query strings, fragments and trailing slashes are ignored.
    pub fn parse(address: &str) -> Result<Self, NavigationError> {
        let path = address
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [root] if *root == GALLERY_ROOT => Ok(Self::folder_list(Country::default())),
            [root, country] if *root == GALLERY_ROOT => {
                Ok(Self::folder_list(country.parse::<Country>()?))
            }
            [root, country, marker] if *root == GALLERY_ROOT && *marker == FOLDER_MARKER => {
                Ok(Self::folder_list(country.parse::<Country>()?))
            }
            [root, country, marker, rest @ ..]
                if *root == GALLERY_ROOT && *marker == FOLDER_MARKER =>
            {
                let country = country.parse::<Country>()?;
                let raw = rest.join("/");
                let folder = urlencoding::decode(&raw)
                    .map_err(|_| NavigationError::InvalidFolder(raw.clone()))?
                    .into_owned();
                Ok(Self::folder_detail(country, folder))
            }
            _ => Err(NavigationError::NotGalleryPath(address.to_string())),
        }
    }

    /// Canonical address for this route.
    pub fn to_path(&self) -> String {
        match &self.folder {
            None => format!("/{}/{}", GALLERY_ROOT, self.country.code()),
            Some(folder) => format!(
                "/{}/{}/{}/{}",
                GALLERY_ROOT,
                self.country.code(),
                FOLDER_MARKER,
                urlencoding::encode(folder)
            ),
        }
    }

    pub fn view(&self) -> GalleryView {
        match &self.folder {
            None => GalleryView::FolderList,
            Some(key) => GalleryView::FolderDetail(key.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "folder", rename_all = "kebab-case")]
pub enum GalleryView {
    FolderList,
    FolderDetail(String),
}

/// A browser-style history stack: pushing drops any forward entries.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn push(&mut self, address: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(address.into());
        self.cursor = self.entries.len() - 1;
    }

    /// Step back. Returns false when already at the first entry.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keeps the open folder in step with the address history.
#[derive(Debug, Clone)]
pub struct GalleryNavigator {
    history: History,
    route: GalleryRoute,
}

impl GalleryNavigator {
    /// Start at `address`, which must be a valid gallery address.
    pub fn new(address: &str) -> Result<Self, NavigationError> {
        let route = GalleryRoute::parse(address)?;
        Ok(Self {
            history: History::new(address),
            route,
        })
    }

    pub fn address(&self) -> &str {
        self.history.current()
    }

    pub fn country(&self) -> Country {
        self.route.country
    }

    pub fn route(&self) -> &GalleryRoute {
        &self.route
    }

    pub fn view(&self) -> GalleryView {
        self.route.view()
    }

    /// Open a folder card.
    pub fn select_folder(&mut self, key: &str) -> Result<(), NavigationError> {
        let target = GalleryRoute::folder_detail(self.route.country, key).to_path();
        self.history.push(target);
        self.sync()
    }

    /// Explicit "back to folders" action; pushes the country root.
    pub fn back_to_folders(&mut self) -> Result<(), NavigationError> {
        let target = GalleryRoute::folder_list(self.route.country).to_path();
        self.history.push(target);
        self.sync()
    }

    /// Browser back button. No-op at the start of history.
    pub fn history_back(&mut self) -> Result<(), NavigationError> {
        if self.history.back() {
            self.sync()?;
        }
        Ok(())
    }

    pub fn history_forward(&mut self) -> Result<(), NavigationError> {
        if self.history.forward() {
            self.sync()?;
        }
        Ok(())
    }

    /// An address arrived from outside (typed in, or a link was followed).
    /// Invalid addresses are rejected before they reach the history.
    pub fn navigate_to(&mut self, address: &str) -> Result<(), NavigationError> {
        self.sync_from_path(address)?;
        self.history.push(address);
        Ok(())
    }

    /// Re-derive country and open folder from `path`, resetting the view.
    pub fn sync_from_path(&mut self, path: &str) -> Result<(), NavigationError> {
        self.route = GalleryRoute::parse(path)?;
        Ok(())
    }

    /// Images to render for the current view. An open folder that is not in
    /// `groups` renders as empty.
    pub fn visible_images<'a>(&self, groups: &'a FolderGroups) -> &'a [GalleryImage] {
        match &self.route.folder {
            Some(key) => groups.get(key),
            None => &[],
        }
    }

    fn sync(&mut self) -> Result<(), NavigationError> {
        let current = self.history.current().to_string();
        self.sync_from_path(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::folders::group_by_folder;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn parses_all_address_shapes() {
        assert_eq!(
            GalleryRoute::parse("/gallery").unwrap(),
            GalleryRoute::folder_list(Country::Ghana)
        );
        assert_eq!(
            GalleryRoute::parse("/gallery/ke/").unwrap(),
            GalleryRoute::folder_list(Country::Kenya)
        );
        assert_eq!(
            GalleryRoute::parse("/gallery/uk/f/CSR%20Visit").unwrap(),
            GalleryRoute::folder_detail(Country::UnitedKingdom, "CSR Visit")
        );
        assert_eq!(
            GalleryRoute::parse("/gallery/gh/f/events%2F2024?x=1").unwrap(),
            GalleryRoute::folder_detail(Country::Ghana, "events/2024")
        );
    }

    #[test]
    fn rejects_foreign_and_unknown_addresses() {
        assert!(matches!(
            GalleryRoute::parse("/blog/hello"),
            Err(NavigationError::NotGalleryPath(_))
        ));
        assert!(matches!(
            GalleryRoute::parse("/gallery/fr"),
            Err(NavigationError::UnknownCountry(_))
        ));
    }

    #[test]
    fn folder_keys_are_escaped_in_addresses() {
        let route = GalleryRoute::folder_detail(Country::Nigeria, "events/csr visit");
        assert_eq!(route.to_path(), "/gallery/ng/f/events%2Fcsr%20visit");
        assert_eq!(GalleryRoute::parse(&route.to_path()).unwrap(), route);
    }

    #[test]
    fn select_then_back_returns_to_country_root() {
        let mut nav = GalleryNavigator::new("/gallery/gh").unwrap();
        assert_eq!(nav.view(), GalleryView::FolderList);

        nav.select_folder("Events").unwrap();
        assert_eq!(nav.address(), "/gallery/gh/f/Events");
        assert_eq!(nav.view(), GalleryView::FolderDetail("Events".into()));

        nav.back_to_folders().unwrap();
        assert_eq!(nav.address(), "/gallery/gh");
        assert_eq!(nav.view(), GalleryView::FolderList);
    }

    #[test]
    fn browser_history_drives_the_view() {
        let mut nav = GalleryNavigator::new("/gallery").unwrap();
        nav.select_folder("Events").unwrap();
        nav.history_back().unwrap();
        assert_eq!(nav.view(), GalleryView::FolderList);
        assert_eq!(nav.address(), "/gallery");

        nav.history_forward().unwrap();
        assert_eq!(nav.view(), GalleryView::FolderDetail("Events".into()));

        nav.navigate_to("/gallery/us/f/Team").unwrap();
        assert_eq!(nav.country(), Country::UnitedStates);
        assert_eq!(nav.view(), GalleryView::FolderDetail("Team".into()));
        assert!(!nav.history.forward());
    }

    #[test]
    fn history_back_at_start_is_a_no_op() {
        let mut nav = GalleryNavigator::new("/gallery/ke").unwrap();
        nav.history_back().unwrap();
        assert_eq!(nav.address(), "/gallery/ke");
    }

    #[test]
    fn unknown_folder_renders_empty() {
        let groups = group_by_folder(vec![GalleryImage {
            id: Uuid::new_v4(),
            title: "a".into(),
            description: None,
            image_url: "http://x/a.jpg".into(),
            storage_path: "events/a.jpg".into(),
            folder: Some("events".into()),
            label: None,
            country: Country::Ghana,
            created_at: Utc::now(),
        }]);

        let mut nav = GalleryNavigator::new("/gallery/gh/f/events").unwrap();
        assert_eq!(nav.visible_images(&groups).len(), 1);

        nav.navigate_to("/gallery/gh/f/nope").unwrap();
        assert!(nav.visible_images(&groups).is_empty());
    }

    #[test]
    fn invalid_address_leaves_history_untouched() {
        let mut nav = GalleryNavigator::new("/gallery/ng").unwrap();
        assert!(nav.navigate_to("/gallery/zz").is_err());
        assert_eq!(nav.address(), "/gallery/ng");
        assert_eq!(nav.country(), Country::Nigeria);
        assert_eq!(nav.history.len(), 1);
    }

    #[test]
    fn pushing_drops_forward_entries() {
        let mut history = History::new("/gallery");
        history.push("/gallery/gh/f/a");
        history.push("/gallery/gh/f/b");
        assert!(history.back());
        history.push("/gallery/gh/f/c");
        assert_eq!(history.len(), 3);
        assert!(!history.forward());
        assert_eq!(history.current(), "/gallery/gh/f/c");
    }
}
