//! Strava API access: OAuth, paced REST client, and record types.

pub mod auth;
pub mod client;
pub mod pacer;
pub mod types;

pub use auth::{authorize_url, extract_code, OAuthClient};
pub use client::{ActivitySource, StravaClient};
pub use types::{Activity, ApiPhoto, Photo};
