//! HTTP client for the Strava v3 REST API.
//!
//! All requests are sequential and paced by a [`DispatchPacer`]. Nothing is
//! retried: the sync pipeline decides what a failure means for each call.

use log::{debug, info};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::pacer::DispatchPacer;
use super::types::{Activity, ApiPhoto};
use crate::error::{ActivityMapError, Result};

pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Read access to a Strava account's activities.
///
/// [`StravaClient`] talks to the real API; tests substitute an in-memory source.
#[allow(async_fn_in_trait)]
pub trait ActivitySource {
    /// One page of summary activities, newest first.
    async fn list_activities(&self, page: u32, per_page: u32) -> Result<Vec<Activity>>;

    /// The detailed record of a single activity.
    async fn get_activity(&self, id: u64) -> Result<Activity>;

    /// Photos attached to an activity, requested at `size` pixels.
    async fn get_photos(&self, id: u64, size: u32) -> Result<Vec<ApiPhoto>>;
}

/// Strava API client authenticated with a Bearer access token.
pub struct StravaClient {
    client: Client,
    api_base: String,
    auth_header: String,
    pacer: DispatchPacer,
}

impl StravaClient {
    pub fn new(access_token: &str, api_base: &str, pause: Duration) -> Result<Self> {
        let client = build_http_client()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {}", access_token),
            pacer: DispatchPacer::new(pause),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let dispatch_num = self.pacer.wait_for_slot().await;
        let url = format!("{}{}", self.api_base, path);
        debug!("[StravaClient #{}] GET {}", dispatch_num, url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .send()
            .await?;

        let response = error_for_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl ActivitySource for StravaClient {
    async fn list_activities(&self, page: u32, per_page: u32) -> Result<Vec<Activity>> {
        let body: Value = self
            .get_json(&format!(
                "/athlete/activities?per_page={}&page={}",
                per_page, page
            ))
            .await?;

        if !body.is_array() {
            return Err(ActivityMapError::parse(format!(
                "Strava API returned an object instead of an array. Response: {}",
                body
            )));
        }

        let activities: Vec<Activity> = serde_json::from_value(body)?;
        info!(
            "[StravaClient] Page {}: {} activities",
            page,
            activities.len()
        );
        Ok(activities)
    }

    async fn get_activity(&self, id: u64) -> Result<Activity> {
        self.get_json(&format!("/activities/{}", id)).await
    }

    async fn get_photos(&self, id: u64, size: u32) -> Result<Vec<ApiPhoto>> {
        let body: Value = self
            .get_json(&format!(
                "/activities/{}/photos?size={}&photo_sources=true",
                id, size
            ))
            .await?;

        // Anything other than an array means no usable photos
        if !body.is_array() {
            debug!("[StravaClient] Photos for {} was not an array: {}", id, body);
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(body)?)
    }
}

pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ActivityMapError::Http {
            message: format!("Failed to create HTTP client: {}", e),
            status_code: None,
        })
}

/// Turn a non-2xx response into an error carrying the status and body text.
pub(crate) async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let reason = status.canonical_reason().unwrap_or("Unknown");
    Err(ActivityMapError::Http {
        message: if text.is_empty() {
            reason.to_string()
        } else {
            format!("{}: {}", reason, text)
        },
        status_code: Some(status.as_u16()),
    })
}
