//! Shared helpers for integration tests: fixtures and a fake Strava source.

#![allow(dead_code)]

use activity_map::strava::types::ApiPhoto;
use activity_map::{Activity, ActivityMapError, ActivitySource, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

pub const SYDNEY: [f64; 2] = [-33.8688, 151.2093];
pub const MELBOURNE: [f64; 2] = [-37.8136, 144.9631];
pub const LONDON: [f64; 2] = [51.5074, -0.1278];

/// Encode `[lat, lng]` points as a precision-5 polyline.
pub fn encode(points: &[[f64; 2]]) -> String {
    let line: geo::LineString<f64> = points
        .iter()
        .map(|p| geo::coord! { x: p[1], y: p[0] })
        .collect::<Vec<_>>()
        .into();
    polyline::encode_coordinates(line, 5).unwrap()
}

pub fn summary_json(id: u64, date: &str, route: Option<&[[f64; 2]]>, photos: u32) -> Value {
    let mut raw = json!({
        "id": id,
        "name": format!("Activity {}", id),
        "type": "Ride",
        "distance": 10_000.0 * id as f64,
        "start_date_local": date,
        "total_photo_count": photos,
        "kudos_count": id,
    });
    if let Some(points) = route {
        raw["map"] = json!({ "id": format!("a{}", id), "summary_polyline": encode(points) });
    }
    raw
}

pub fn summary(id: u64, date: &str, route: Option<&[[f64; 2]]>, photos: u32) -> Activity {
    serde_json::from_value(summary_json(id, date, route, photos)).unwrap()
}

/// In-memory activity source with injectable failures.
#[derive(Default)]
pub struct FakeSource {
    pub pages: Vec<Vec<Activity>>,
    pub details: HashMap<u64, Activity>,
    pub photos: HashMap<u64, Vec<ApiPhoto>>,
    pub failing_details: Vec<u64>,
    pub failing_photos: Vec<u64>,
    pub fail_listing: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn not_found(what: String) -> ActivityMapError {
    ActivityMapError::Http {
        message: format!("Not Found: {}", what),
        status_code: Some(404),
    }
}

impl ActivitySource for FakeSource {
    async fn list_activities(&self, page: u32, per_page: u32) -> Result<Vec<Activity>> {
        self.record(format!("list page={} per_page={}", page, per_page));
        if self.fail_listing {
            return Err(ActivityMapError::Http {
                message: "Unauthorized".to_string(),
                status_code: Some(401),
            });
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_activity(&self, id: u64) -> Result<Activity> {
        self.record(format!("detail {}", id));
        if self.failing_details.contains(&id) {
            return Err(not_found(format!("activity {}", id)));
        }
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(format!("activity {}", id)))
    }

    async fn get_photos(&self, id: u64, size: u32) -> Result<Vec<ApiPhoto>> {
        self.record(format!("photos {} size={}", id, size));
        if self.failing_photos.contains(&id) {
            return Err(not_found(format!("photos {}", id)));
        }
        Ok(self.photos.get(&id).cloned().unwrap_or_default())
    }
}
