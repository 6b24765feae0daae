//! Command-line interface and command dispatch.

use clap::{Parser, Subcommand};
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    Credentials, EnvFile, SyncConfig, DEFAULT_ENV_FILE, DEFAULT_MAX_PAGES, DEFAULT_OUTPUT,
    DEFAULT_PAGE_SIZE, DEFAULT_PAUSE_MS,
};
use crate::error::{ActivityMapError, Result};
use crate::geo_utils::Bounds;
use crate::render::{build_document, write_page, DEFAULT_TITLE};
use crate::store::load_activities;
use crate::strava::auth::{interactive_setup, OAuthClient};
use crate::strava::Activity;
use crate::sync::sync;
use crate::timeline::{current_location, sidebar_timeline, summarize};

pub const DEFAULT_PAGE_OUTPUT: &str = "dist/index.html";

#[derive(Debug, Parser)]
#[command(
    name = "activity-map",
    version,
    about = "Sync Strava activities and build a route/photo map"
)]
pub struct Cli {
    /// Env file holding Strava credentials
    #[arg(long = "env-file", value_name = "PATH", default_value = DEFAULT_ENV_FILE, global = true)]
    pub env_file: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch activities and photos and write the activities JSON
    Sync {
        #[arg(long, short, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Activities per page (max 200)
        #[arg(long = "per-page", default_value_t = DEFAULT_PAGE_SIZE)]
        per_page: u32,

        /// Maximum number of pages to fetch
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        pages: u32,

        /// Minimum milliseconds between API requests
        #[arg(long = "pause-ms", default_value_t = DEFAULT_PAUSE_MS)]
        pause_ms: u64,

        /// Keep activities starting inside south,west,north,east
        #[arg(long, value_name = "S,W,N,E", allow_hyphen_values = true)]
        bounds: Option<Bounds>,
    },

    /// Authorize with Strava and store a new refresh token
    Auth,

    /// Build a standalone HTML map from the activities JSON
    Render {
        #[arg(long, short, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
        input: PathBuf,

        #[arg(long, short, value_name = "PATH", default_value = DEFAULT_PAGE_OUTPUT)]
        output: PathBuf,

        #[arg(long, default_value = DEFAULT_TITLE)]
        title: String,
    },

    /// Print the journey timeline
    Summary {
        #[arg(long, short, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
        input: PathBuf,
    },
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Sync { .. } => "sync",
            Commands::Auth => "auth",
            Commands::Render { .. } => "render",
            Commands::Summary { .. } => "summary",
        }
    }
}

/// Run the parsed command.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let mut env_file = EnvFile::load(&cli.env_file);

    match cli.command {
        Commands::Sync {
            output,
            per_page,
            pages,
            pause_ms,
            bounds,
        } => {
            let config = SyncConfig {
                output,
                per_page,
                max_pages: pages,
                pause: Duration::from_millis(pause_ms),
                bounds: bounds.unwrap_or(Bounds::AUSTRALIA),
                ..SyncConfig::default()
            };
            let stdin = io::stdin();
            let report = sync(&config, &mut env_file, &mut stdin.lock(), &mut io::stdout()).await?;
            info!(
                "Fetched {}, kept {} in bounds ({} detailed, {} summary only, {} photos)",
                report.fetched, report.in_bounds, report.enriched, report.degraded, report.photos
            );
            Ok(())
        }
        Commands::Auth => {
            let credentials = Credentials::resolve(&env_file)?;
            let oauth = OAuthClient::new(&SyncConfig::default().oauth_base, &credentials)?;
            let stdin = io::stdin();
            interactive_setup(&oauth, &mut env_file, &mut stdin.lock(), &mut io::stdout()).await?;
            Ok(())
        }
        Commands::Render {
            input,
            output,
            title,
        } => {
            let activities = load_activities(&input)?;
            write_page(&output, &build_document(&activities, &title))?;
            info!(
                "Wrote map of {} activities to {}",
                activities.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Summary { input } => {
            let activities = load_activities(&input)?;
            let stdout = io::stdout();
            print_summary(&activities, &mut stdout.lock())
        }
    }
}

/// Write the timeline as plain text.
pub fn print_summary<W: Write>(activities: &[Activity], out: &mut W) -> Result<()> {
    let io_err = |e: io::Error| ActivityMapError::io("<stdout>", e);
    let summary = summarize(activities);

    writeln!(out, "Current location: {}", current_location(activities)).map_err(io_err)?;
    writeln!(
        out,
        "{:.0} km across {} activities\n",
        summary.total_km, summary.activity_count
    )
    .map_err(io_err)?;

    for day in sidebar_timeline(activities) {
        writeln!(out, "{:<14} {:>8.1} km", day.label, day.distance_km).map_err(io_err)?;
        for entry in &day.activities {
            let photos = match entry.photos.len() {
                0 => String::new(),
                1 => " (1 photo)".to_string(),
                n => format!(" ({} photos)", n),
            };
            writeln!(out, "  - {}{}", entry.name, photos).map_err(io_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::try_parse_from([
            "activity-map",
            "--verbose",
            "sync",
            "--pages",
            "3",
            "--bounds",
            "-44,112,-10,154",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
        match cli.command {
            Commands::Sync {
                pages,
                per_page,
                bounds,
                ..
            } => {
                assert_eq!(pages, 3);
                assert_eq!(per_page, DEFAULT_PAGE_SIZE);
                assert_eq!(bounds, Some(Bounds::AUSTRALIA));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_print_summary() {
        let activities: Vec<Activity> = serde_json::from_value(json!([
            {
                "id": 1,
                "name": "Harbour loop",
                "distance": 10500.0,
                "start_date_local": "2024-03-04T06:00:00Z",
                "photos": [{ "url": "https://x/1.jpg" }]
            },
            {
                "id": 2,
                "name": "Ferry day",
                "start_date_local": "2024-03-04T09:00:00Z",
                "photos": [{ "url": "https://x/2.jpg" }, { "url": "https://x/3.jpg" }]
            },
            {
                "id": 3,
                "name": "Rest day",
                "start_date_local": "2024-03-04T18:00:00Z"
            }
        ]))
        .unwrap();
        let mut out = Vec::new();
        print_summary(&activities, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Current location: Harbour loop"));
        assert!(text.contains("Mon, 4 Mar"));
        assert!(text.contains("10.5 km"));
        assert!(text.contains("  - Harbour loop (1 photo)\n"));
        assert!(text.contains("  - Ferry day (2 photos)\n"));
        assert!(text.contains("  - Rest day\n"));
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["activity-map", "render"]).unwrap();
        assert_eq!(cli.command.name(), "render");
        let cli = Cli::try_parse_from(["activity-map", "summary"]).unwrap();
        assert_eq!(cli.command.name(), "summary");
    }
}
