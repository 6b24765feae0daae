//! Shared UI state for the map and sidebar.

use crate::geo_utils::LatLng;

/// State shared between the map and the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// Photo under the pointer in the sidebar gallery
    pub hovered_photo_url: Option<String>,
    /// Last fly-to request
    pub map_target: Option<LatLng>,
    pub sidebar_open: bool,
    /// At most one activity is expanded at a time
    pub expanded_activity_id: Option<u64>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            hovered_photo_url: None,
            map_target: None,
            sidebar_open: true,
            expanded_activity_id: None,
        }
    }
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hovered_photo(&mut self, url: Option<&str>) {
        self.hovered_photo_url = url.map(str::to_string);
    }

    pub fn fly_to(&mut self, location: LatLng) {
        self.map_target = Some(location);
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    /// Expand `id`, or collapse it if it is already expanded.
    pub fn toggle_activity_expansion(&mut self, id: u64) {
        self.expanded_activity_id = match self.expanded_activity_id {
            Some(current) if current == id => None,
            _ => Some(id),
        };
    }

    pub fn is_expanded(&self, id: u64) -> bool {
        self.expanded_activity_id == Some(id)
    }
}

/// Position within a photo popup carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoCarousel {
    index: usize,
    len: usize,
}

impl PhotoCarousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Prev/next controls only show with more than one photo.
    pub fn has_controls(&self) -> bool {
        self.len > 1
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// "2 / 5"
    pub fn counter_label(&self) -> String {
        format!("{} / {}", self.index + 1, self.len)
    }
}
