//! Strava API record types.
//!
//! Activity records keep the full API shape, so the synced JSON is the API
//! record plus the added `coordinates` and `photos`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geo_utils::LatLng;

/// Preferred photo size key in the API `urls` map.
pub const PREFERRED_PHOTO_SIZE: &str = "1000";

// ============================================================================
// Activities
// ============================================================================

/// A Strava activity, summary or detailed.
///
/// Only the fields the sync adds are typed. API fields stay in `api` exactly as
/// received, explicit `null`s included, and are read through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    #[serde(flatten)]
    pub api: Map<String, Value>,
    /// Decoded route, added by sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<LatLng>>,
    /// Photos, added by sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Photo>>,
}

impl Activity {
    fn api_str(&self, key: &str) -> Option<&str> {
        self.api.get(key).and_then(Value::as_str)
    }

    fn map_str(&self, key: &str) -> Option<&str> {
        self.api
            .get("map")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
    }

    pub fn name(&self) -> &str {
        self.api_str("name").unwrap_or("")
    }

    /// API `type` (e.g., "Ride", "Run")
    pub fn activity_type(&self) -> &str {
        self.api_str("type").unwrap_or("")
    }

    /// Only present on detailed records.
    pub fn description(&self) -> Option<&str> {
        self.api_str("description")
    }

    /// Distance in meters, 0 when unknown.
    pub fn distance_m(&self) -> f64 {
        self.api.get("distance").and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Local start time, ISO-8601 without offset (e.g. "2024-03-01T07:12:00Z")
    pub fn start_date_local(&self) -> Option<&str> {
        self.api_str("start_date_local")
    }

    /// Calendar date part of `start_date_local` (before the `T`).
    pub fn local_date(&self) -> Option<&str> {
        self.start_date_local()
            .and_then(|s| s.split('T').next())
            .filter(|d| !d.is_empty())
    }

    pub fn summary_polyline(&self) -> Option<&str> {
        self.map_str("summary_polyline")
    }

    /// Full-resolution polyline, only present on detailed records.
    pub fn detailed_polyline(&self) -> Option<&str> {
        self.map_str("polyline")
    }

    pub fn coordinates(&self) -> &[LatLng] {
        self.coordinates.as_deref().unwrap_or(&[])
    }

    pub fn first_coordinate(&self) -> Option<&LatLng> {
        self.coordinates().first()
    }

    pub fn last_coordinate(&self) -> Option<&LatLng> {
        self.coordinates().last()
    }

    pub fn photos(&self) -> &[Photo] {
        self.photos.as_deref().unwrap_or(&[])
    }

    pub fn photo_count(&self) -> u32 {
        self.api
            .get("total_photo_count")
            .and_then(Value::as_u64)
            .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
    }
}

// ============================================================================
// Photos
// ============================================================================

/// Photo as stored in the synced JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    /// API `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Photo as returned by `/activities/{id}/photos`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPhoto {
    #[serde(default)]
    pub urls: Option<Map<String, Value>>,
    #[serde(default)]
    pub location: Option<Vec<f64>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl ApiPhoto {
    /// The preferred-size url, else the last url listed.
    pub fn best_url(&self) -> Option<String> {
        let urls = self.urls.as_ref()?;
        urls.get(PREFERRED_PHOTO_SIZE)
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .or_else(|| urls.values().last().and_then(Value::as_str))
            .filter(|u| !u.is_empty())
            .map(str::to_string)
    }

    /// Convert to the stored shape. Photos without a url are dropped.
    pub fn into_photo(self) -> Option<Photo> {
        let url = self.best_url()?;
        let location = match self.location.as_deref() {
            Some([lat, lng]) => Some([*lat, *lng]),
            _ => None,
        };
        Some(Photo {
            url,
            location,
            timestamp: self.created_at,
            caption: self.caption,
        })
    }
}

// ============================================================================
// OAuth
// ============================================================================

/// Response of the `/oauth/token` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_keeps_unknown_fields() {
        let raw = json!({
            "id": 42,
            "name": "Morning Ride",
            "type": "Ride",
            "distance": 12345.6,
            "start_date_local": "2024-03-01T07:12:00Z",
            "kudos_count": 3,
            "map": { "id": "a42", "summary_polyline": "abc" }
        });
        let activity: Activity = serde_json::from_value(raw).unwrap();
        assert_eq!(activity.activity_type(), "Ride");
        assert_eq!(activity.name(), "Morning Ride");
        assert_eq!(activity.summary_polyline(), Some("abc"));
        assert_eq!(activity.local_date(), Some("2024-03-01"));

        let back = serde_json::to_value(&activity).unwrap();
        assert_eq!(back["kudos_count"], 3);
        assert_eq!(back["map"]["id"], "a42");
        assert_eq!(back["type"], "Ride");
        assert!(back.get("coordinates").is_none());
    }

    #[test]
    fn test_null_fields_default() {
        let activity: Activity = serde_json::from_value(json!({
            "id": 1,
            "distance": null,
            "description": null,
            "map": { "summary_polyline": null }
        }))
        .unwrap();
        assert_eq!(activity.distance_m(), 0.0);
        assert!(activity.description().is_none());
        assert!(activity.summary_polyline().is_none());
        assert!(activity.local_date().is_none());
        assert!(activity.coordinates().is_empty());
        assert_eq!(activity.name(), "");
        assert_eq!(activity.photo_count(), 0);
    }

    #[test]
    fn test_round_trip_keeps_nulls_and_absent_keys() {
        let raw = json!({
            "id": 1,
            "description": null,
            "distance": null,
            "total_photo_count": 0
        });
        let activity: Activity = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&activity).unwrap(), raw);

        let text = serde_json::to_string(&activity).unwrap();
        assert_eq!(
            text,
            r#"{"id":1,"description":null,"distance":null,"total_photo_count":0}"#
        );
    }

    #[test]
    fn test_photo_prefers_1000_url() {
        let photo: ApiPhoto = serde_json::from_value(json!({
            "urls": { "100": "https://x/100.jpg", "1000": "https://x/1000.jpg" },
            "location": [-33.8, 151.2],
            "created_at": "2024-03-01T08:00:00Z",
            "caption": "Harbour"
        }))
        .unwrap();
        let photo = photo.into_photo().unwrap();
        assert_eq!(photo.url, "https://x/1000.jpg");
        assert_eq!(photo.location, Some([-33.8, 151.2]));
        assert_eq!(photo.timestamp.as_deref(), Some("2024-03-01T08:00:00Z"));
        assert_eq!(photo.caption.as_deref(), Some("Harbour"));
    }

    #[test]
    fn test_photo_falls_back_to_last_url() {
        let photo: ApiPhoto = serde_json::from_value(json!({
            "urls": { "100": "https://x/100.jpg", "600": "https://x/600.jpg" }
        }))
        .unwrap();
        let photo = photo.into_photo().unwrap();
        assert_eq!(photo.url, "https://x/600.jpg");
        assert!(photo.location.is_none());
    }

    #[test]
    fn test_photo_without_url_is_dropped() {
        let photo: ApiPhoto = serde_json::from_value(json!({ "urls": null })).unwrap();
        assert!(photo.into_photo().is_none());
        let photo: ApiPhoto = serde_json::from_value(json!({ "urls": {} })).unwrap();
        assert!(photo.into_photo().is_none());
    }
}
