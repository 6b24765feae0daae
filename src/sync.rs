//! The sync pipeline: list, filter by bounds, enrich, write.
//!
//! Everything runs sequentially. Request spacing is handled by the client's
//! pacer. Only listing and writing are fatal; each activity's detail and photo
//! fetches degrade gracefully.

use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{Credentials, EnvFile, SyncConfig};
use crate::error::Result;
use crate::geo_utils::{decode_polyline, Bounds};
use crate::store::save_activities;
use crate::strava::auth::{interactive_setup, OAuthClient};
use crate::strava::{Activity, ActivitySource, StravaClient};

/// Outcome of a sync run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Summary records returned by the API
    pub fetched: usize,
    /// Summaries whose route starts inside the bounds
    pub in_bounds: usize,
    /// Activities written with their detailed record
    pub enriched: usize,
    /// Activities written as the summary record after a failed detail fetch
    pub degraded: usize,
    pub photos: usize,
    pub output: PathBuf,
}

/// Fetch summary pages until a short page or `max_pages`.
pub async fn fetch_summaries<S: ActivitySource>(
    source: &S,
    per_page: u32,
    max_pages: u32,
) -> Result<Vec<Activity>> {
    let mut all = Vec::new();
    for page in 1..=max_pages {
        let batch = source.list_activities(page, per_page).await?;
        let short_page = (batch.len() as u32) < per_page;
        all.extend(batch);
        if short_page {
            break;
        }
    }
    Ok(all)
}

/// Decode summary polylines and keep activities starting inside `bounds`.
///
/// Only the first coordinate is tested. Activities without a route are dropped.
pub fn filter_by_bounds(activities: Vec<Activity>, bounds: &Bounds) -> Vec<Activity> {
    activities
        .into_iter()
        .map(|mut activity| {
            if let Some(encoded) = activity.summary_polyline() {
                match decode_polyline(activity.id, encoded) {
                    Ok(coords) => activity.coordinates = Some(coords),
                    Err(e) => warn!("  {}", e),
                }
            }
            activity
        })
        .filter(|activity| {
            activity
                .first_coordinate()
                .is_some_and(|p| bounds.contains_point(p))
        })
        .collect()
}

/// Result of enriching one activity.
#[derive(Debug, Clone)]
pub enum Enriched {
    Detailed(Activity),
    /// The detail fetch failed; the summary is kept as-is
    Summary(Activity),
}

impl Enriched {
    pub fn into_activity(self) -> Activity {
        match self {
            Enriched::Detailed(a) | Enriched::Summary(a) => a,
        }
    }
}

/// Replace a summary with its detailed record, plus photos when it has any.
pub async fn enrich_activity<S: ActivitySource>(
    source: &S,
    summary: Activity,
    photo_size: u32,
) -> Enriched {
    let mut activity = match source.get_activity(summary.id).await {
        Ok(detail) => detail,
        Err(e) => {
            warn!("    Failed to fetch details for {}: {}", summary.id, e);
            return Enriched::Summary(summary);
        }
    };

    // The detailed polyline has more points; fall back to the summary route
    let detailed = activity
        .detailed_polyline()
        .map(|encoded| decode_polyline(activity.id, encoded));
    activity.coordinates = match detailed {
        Some(Ok(coords)) => Some(coords),
        Some(Err(e)) => {
            warn!("    {}", e);
            summary.coordinates.clone()
        }
        None => summary.coordinates.clone(),
    };

    if activity.photo_count() > 0 {
        info!("    Fetching photos...");
        match source.get_photos(activity.id, photo_size).await {
            Ok(api_photos) => {
                let photos: Vec<_> = api_photos
                    .into_iter()
                    .filter_map(|p| p.into_photo())
                    .collect();
                info!("    Found {} photos.", photos.len());
                activity.photos = Some(photos);
            }
            Err(e) => warn!("    Failed to fetch photos for {}: {}", activity.id, e),
        }
    }

    Enriched::Detailed(activity)
}

/// Run the pipeline against an authenticated source and write the output.
pub async fn run_sync<S: ActivitySource>(source: &S, config: &SyncConfig) -> Result<SyncReport> {
    config.validate()?;
    let start = Instant::now();

    info!("Fetching activities...");
    let summaries = fetch_summaries(source, config.per_page, config.max_pages).await?;
    let fetched = summaries.len();

    info!("Processing {} activities...", fetched);
    let kept = filter_by_bounds(summaries, &config.bounds);
    let in_bounds = kept.len();
    info!(
        "Found {} activities in bounds. Fetching details and photos...",
        in_bounds
    );

    let mut report = SyncReport {
        fetched,
        in_bounds,
        output: config.output.clone(),
        ..SyncReport::default()
    };

    let mut activities = Vec::with_capacity(in_bounds);
    for (i, summary) in kept.into_iter().enumerate() {
        info!(
            "  [{}/{}] Fetching details for: {}",
            i + 1,
            in_bounds,
            summary.name()
        );
        match enrich_activity(source, summary, config.photo_size).await {
            Enriched::Detailed(a) => {
                report.enriched += 1;
                report.photos += a.photos().len();
                activities.push(a);
            }
            Enriched::Summary(a) => {
                report.degraded += 1;
                activities.push(a);
            }
        }
    }

    save_activities(&config.output, &activities)?;
    info!(
        "Successfully synced {} activities to {} ({:.1}s)",
        activities.len(),
        config.output.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Get a refresh token, running interactive setup when none is configured.
pub async fn ensure_refresh_token<R: BufRead, W: Write>(
    oauth: &OAuthClient,
    credentials: &Credentials,
    env_file: &mut EnvFile,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    match &credentials.refresh_token {
        Some(token) => Ok(token.clone()),
        None => interactive_setup(oauth, env_file, input, output).await,
    }
}

/// Full sync: credentials, token refresh, then [`run_sync`] against Strava.
pub async fn sync<R: BufRead, W: Write>(
    config: &SyncConfig,
    env_file: &mut EnvFile,
    input: &mut R,
    output: &mut W,
) -> Result<SyncReport> {
    let credentials = Credentials::resolve(env_file)?;
    let oauth = OAuthClient::new(&config.oauth_base, &credentials)?;
    let refresh_token = ensure_refresh_token(&oauth, &credentials, env_file, input, output).await?;

    info!("Refreshing Strava access token...");
    let access_token = oauth.refresh(&refresh_token).await?;

    let client = StravaClient::new(&access_token, &config.api_base, config.pause)?;
    run_sync(&client, config).await
}
