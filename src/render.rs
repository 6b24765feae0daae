//! Static page generation.
//!
//! The map document bundles everything the browser needs: timeline, routes,
//! milestones, photo clusters, and view constants. It is embedded as JSON in a
//! single HTML page that draws it with Leaflet.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{ActivityMapError, Result};
use crate::geo_utils::{route_bounds, LatLng};
use crate::map_view::{
    day_milestones, photo_clusters, route_layers, DayMilestones, PhotoCluster, RouteLayer,
    RouteStyle, FLY_TO_ZOOM, INITIAL_CENTER, LOCK_BOUNDS, MAX_ZOOM, MILESTONE_RADIUS, MIN_ZOOM,
    PHOTO_ZOOM_THRESHOLD, TILE_ATTRIBUTION, TILE_MAX_NATIVE_ZOOM, TILE_URL,
};
use crate::strava::Activity;
use crate::timeline::{current_location, sidebar_timeline, summarize, Summary, TimelineDay};

pub const DEFAULT_TITLE: &str = "All Around Australia";

const PAGE_TEMPLATE: &str = include_str!("../assets/index.html");
const TITLE_PLACEHOLDER: &str = "__TITLE__";
const DOCUMENT_PLACEHOLDER: &str = "__DOCUMENT__";

/// Map settings consumed by the page script.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSettings {
    pub center: LatLng,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub fly_to_zoom: u8,
    pub photo_zoom_threshold: u8,
    /// `[south_west, north_east]`
    pub lock_bounds: [LatLng; 2],
    /// `[south_west, north_east]` of all routes, when any exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_bounds: Option<[LatLng; 2]>,
    pub tile_url: &'static str,
    pub tile_attribution: &'static str,
    pub tile_max_native_zoom: u8,
    pub route_style: RouteStyle,
    pub route_hover_style: RouteStyle,
    pub milestone_radius: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapDocument<'a> {
    pub title: &'a str,
    pub current_location: &'a str,
    pub summary: Summary,
    pub timeline: Vec<TimelineDay<'a>>,
    pub routes: Vec<RouteLayer<'a>>,
    pub milestones: Vec<DayMilestones<'a>>,
    pub photo_clusters: Vec<PhotoCluster<'a>>,
    pub view: ViewSettings,
}

pub fn build_document<'a>(activities: &'a [Activity], title: &'a str) -> MapDocument<'a> {
    let all_points: Vec<LatLng> = activities
        .iter()
        .flat_map(|a| a.coordinates().iter().copied())
        .collect();

    MapDocument {
        title,
        current_location: current_location(activities),
        summary: summarize(activities),
        timeline: sidebar_timeline(activities),
        routes: route_layers(activities),
        milestones: day_milestones(activities),
        photo_clusters: photo_clusters(activities),
        view: ViewSettings {
            center: INITIAL_CENTER,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            fly_to_zoom: FLY_TO_ZOOM,
            photo_zoom_threshold: PHOTO_ZOOM_THRESHOLD,
            lock_bounds: [LOCK_BOUNDS.south_west(), LOCK_BOUNDS.north_east()],
            data_bounds: route_bounds(&all_points).map(|b| [b.south_west(), b.north_east()]),
            tile_url: TILE_URL,
            tile_attribution: TILE_ATTRIBUTION,
            tile_max_native_zoom: TILE_MAX_NATIVE_ZOOM,
            route_style: RouteStyle::NORMAL,
            route_hover_style: RouteStyle::HOVERED,
            milestone_radius: MILESTONE_RADIUS,
        },
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON safe to embed in a `<script>` element.
///
/// `<` only ever appears inside JSON strings, where `<` is equivalent.
fn script_safe_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

pub fn render_page(document: &MapDocument<'_>) -> Result<String> {
    let json = script_safe_json(document)?;
    let title = escape_html(document.title);
    Ok(fill_template(
        PAGE_TEMPLATE,
        &[(TITLE_PLACEHOLDER, &title), (DOCUMENT_PLACEHOLDER, &json)],
    ))
}

/// Substitute placeholders in one left-to-right pass. Inserted values are
/// never scanned again.
fn fill_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = substitutions
            .iter()
            .filter_map(|(placeholder, value)| {
                rest.find(placeholder).map(|pos| (pos, *placeholder, *value))
            })
            .min_by_key(|(pos, _, _)| *pos);
        match next {
            Some((pos, placeholder, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + placeholder.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Render and write the page, creating parent directories.
pub fn write_page(path: impl AsRef<Path>, document: &MapDocument<'_>) -> Result<()> {
    let path = path.as_ref();
    let html = render_page(document)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ActivityMapError::io(parent, e))?;
    }
    fs::write(path, html).map_err(|e| ActivityMapError::io(path, e))
}
