//! Map view model: route layers, daily milestones, photo clusters, viewport.
//!
//! Routes are drawn oldest day first so later days sit on top. Photos that
//! share a location (to ~11 m) collapse into one marker with a carousel.

use serde::Serialize;

use crate::geo_utils::{coordinate_key, Bounds, LatLng};
use crate::strava::Activity;
use crate::timeline::group_by_date;
use crate::ui_state::UiState;

pub const INITIAL_CENTER: LatLng = [-27.0, 133.0];
pub const MIN_ZOOM: u8 = 5;
pub const MAX_ZOOM: u8 = 12;
pub const FLY_TO_ZOOM: u8 = 11;
/// Photo markers show above this zoom (or while hovered in the sidebar)
pub const PHOTO_ZOOM_THRESHOLD: u8 = 9;
pub const LOCK_BOUNDS: Bounds = Bounds::AUSTRALIA;

pub const ROUTE_COLOR: &str = "#FFC72C";
pub const ROUTE_HOVER_COLOR: &str = "#FFE082";
pub const MILESTONE_RADIUS: u8 = 5;

pub const TILE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/Ocean/World_Ocean_Base/MapServer/tile/{z}/{y}/{x}";
pub const TILE_ATTRIBUTION: &str = "Tiles &copy; Esri";
pub const TILE_MAX_NATIVE_ZOOM: u8 = 10;

// ============================================================================
// Routes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteStyle {
    pub color: &'static str,
    pub weight: u8,
    pub opacity: f64,
}

impl RouteStyle {
    pub const NORMAL: RouteStyle = RouteStyle {
        color: ROUTE_COLOR,
        weight: 4,
        opacity: 0.9,
    };

    pub const HOVERED: RouteStyle = RouteStyle {
        color: ROUTE_HOVER_COLOR,
        weight: 6,
        opacity: 1.0,
    };

    pub fn for_hover(hovered: bool) -> Self {
        if hovered {
            Self::HOVERED
        } else {
            Self::NORMAL
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteLayer<'a> {
    pub activity_id: u64,
    pub date: &'a str,
    pub coordinates: &'a [LatLng],
}

/// Start of the day's first route and end of its last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMilestones<'a> {
    pub date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<LatLng>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<LatLng>,
}

/// Route polylines in date order. Activities without coordinates are skipped.
pub fn route_layers(activities: &[Activity]) -> Vec<RouteLayer<'_>> {
    group_by_date(activities)
        .into_iter()
        .flat_map(|day| {
            day.activities
                .into_iter()
                .filter(|a| !a.coordinates().is_empty())
                .map(move |a| RouteLayer {
                    activity_id: a.id,
                    date: day.date,
                    coordinates: a.coordinates(),
                })
        })
        .collect()
}

pub fn day_milestones(activities: &[Activity]) -> Vec<DayMilestones<'_>> {
    group_by_date(activities)
        .into_iter()
        .map(|day| DayMilestones {
            date: day.date,
            start: day.first().and_then(|a| a.first_coordinate().copied()),
            end: day.last().and_then(|a| a.last_coordinate().copied()),
        })
        .collect()
}

// ============================================================================
// Photo clusters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPhoto<'a> {
    pub url: &'a str,
    pub location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'a str>,
    pub activity_id: u64,
}

/// Photos sharing a rounded location, shown as one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoCluster<'a> {
    pub key: String,
    pub photos: Vec<ClusterPhoto<'a>>,
}

impl<'a> PhotoCluster<'a> {
    /// Marker position: the first photo's location.
    pub fn position(&self) -> Option<LatLng> {
        self.photos.first().map(|p| p.location)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.photos.iter().any(|p| p.url == url)
    }

    pub fn is_visible(&self, zoom: u8, hovered_photo_url: Option<&str>) -> bool {
        zoom > PHOTO_ZOOM_THRESHOLD || hovered_photo_url.is_some_and(|url| self.contains_url(url))
    }
}

/// Group located photos by rounded coordinates, in first-seen order.
pub fn photo_clusters(activities: &[Activity]) -> Vec<PhotoCluster<'_>> {
    let mut clusters: Vec<PhotoCluster<'_>> = Vec::new();

    for activity in activities {
        for photo in activity.photos() {
            let Some(location) = photo.location else {
                continue;
            };
            let key = coordinate_key(&location);
            let entry = ClusterPhoto {
                url: &photo.url,
                location,
                timestamp: photo.timestamp.as_deref(),
                caption: photo.caption.as_deref(),
                activity_id: activity.id,
            };
            match clusters.iter_mut().find(|c| c.key == key) {
                Some(cluster) => cluster.photos.push(entry),
                None => clusters.push(PhotoCluster {
                    key,
                    photos: vec![entry],
                }),
            }
        }
    }

    clusters
}

// ============================================================================
// Viewport
// ============================================================================

/// Zoom-dependent map behavior.
///
/// Zoomed all the way out the map is locked onto the continent: dragging is
/// off and the view snaps back to the initial center.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewport {
    pub center: LatLng,
    pub zoom: u8,
    pub dragging_enabled: bool,
    pub max_bounds: Option<Bounds>,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: INITIAL_CENTER,
            zoom: MIN_ZOOM,
            dragging_enabled: false,
            max_bounds: Some(LOCK_BOUNDS),
        }
    }
}

impl MapViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a zoom change (the map's `zoomend`).
    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.zoom <= MIN_ZOOM {
            self.dragging_enabled = false;
            self.max_bounds = Some(LOCK_BOUNDS);
            self.center = INITIAL_CENTER;
        } else {
            self.dragging_enabled = true;
            self.max_bounds = None;
        }
    }

    pub fn fly_to(&mut self, target: LatLng) {
        self.center = target;
        self.set_zoom(FLY_TO_ZOOM);
    }

    /// Follow the shared fly-to target, if one is set.
    pub fn follow(&mut self, state: &UiState) {
        if let Some(target) = state.map_target {
            if self.center != target || self.zoom != FLY_TO_ZOOM {
                self.fly_to(target);
            }
        }
    }
}

/// Clicking a route expands it in the sidebar and opens the sidebar.
pub fn on_route_click(state: &mut UiState, activity_id: u64) {
    state.toggle_activity_expansion(activity_id);
    state.set_sidebar_open(true);
}
