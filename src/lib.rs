//! # Activity Map
//!
//! Strava activity sync and static route/photo map generation.
//!
//! This library provides:
//! - OAuth token handling and a paced, sequential Strava API client
//! - A sync pipeline that keeps activities starting inside a bounding box and
//!   enriches them with detail records and photos
//! - View models for the map (routes, daily milestones, photo clusters) and the
//!   sidebar timeline, plus a standalone HTML page generator
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_map::{group_by_date, Activity, Bounds};
//!
//! let activities: Vec<Activity> = serde_json::from_str(r#"[
//!     {"id": 2, "name": "Bondi to Coogee", "type": "Walk",
//!      "start_date_local": "2024-03-02T08:00:00Z", "coordinates": [[-33.89, 151.27]]},
//!     {"id": 1, "name": "Harbour Bridge", "type": "Ride",
//!      "start_date_local": "2024-03-01T07:00:00Z", "coordinates": [[-33.85, 151.21]]}
//! ]"#).unwrap();
//!
//! let start = activities[0].first_coordinate().unwrap();
//! assert!(Bounds::AUSTRALIA.contains_point(start));
//!
//! let days = group_by_date(&activities);
//! assert_eq!(days[0].date, "2024-03-01");
//! ```

// Unified error handling
pub mod error;
pub use error::{ActivityMapError, Result};

// Geographic utilities (bounds, polyline decoding, coordinate keys)
pub mod geo_utils;
pub use geo_utils::{decode_polyline, Bounds, LatLng};

// Credentials, env file, sync settings
pub mod config;
pub use config::{Credentials, EnvFile, SyncConfig};

// Strava API access
pub mod strava;
pub use strava::{Activity, ActivitySource, Photo, StravaClient};

// Activities JSON file
pub mod store;
pub use store::{load_activities, save_activities};

// Sync pipeline
pub mod sync;
pub use sync::{run_sync, SyncReport};

// Sidebar timeline model
pub mod timeline;
pub use timeline::{group_by_date, sidebar_timeline, summarize, ActivityKind, DayGroup};

// Map view model
pub mod map_view;
pub use map_view::{photo_clusters, route_layers, MapViewport, PhotoCluster};

// Shared UI state
pub mod ui_state;
pub use ui_state::{PhotoCarousel, UiState};

// Static page generation
pub mod render;
pub use render::{build_document, render_page, MapDocument};

// Command-line interface
pub mod cli;
