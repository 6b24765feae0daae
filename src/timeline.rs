//! Sidebar timeline model: activities grouped by local date.
//!
//! Grouping keys on the date part of `start_date_local`. ISO dates sort
//! lexically, so a `BTreeMap` gives chronological order for free.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::strava::{Activity, Photo};

/// Icon family shown next to a day or activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Cycling,
    OnFoot,
    Swim,
    Other,
}

impl ActivityKind {
    pub fn from_type(activity_type: &str) -> Self {
        match activity_type {
            "Ride" => ActivityKind::Cycling,
            "Run" | "Walk" | "Hike" => ActivityKind::OnFoot,
            "Swim" => ActivityKind::Swim,
            _ => ActivityKind::Other,
        }
    }
}

/// Headline numbers for the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total_km: f64,
    pub activity_count: usize,
}

pub fn summarize(activities: &[Activity]) -> Summary {
    Summary {
        total_km: activities.iter().map(Activity::distance_m).sum::<f64>() / 1000.0,
        activity_count: activities.len(),
    }
}

/// Name of the most recent activity, shown as the current location.
pub fn current_location(activities: &[Activity]) -> &str {
    activities.first().map_or("Unknown", Activity::name)
}

/// Activities sharing a local date, in array order.
#[derive(Debug, Clone)]
pub struct DayGroup<'a> {
    pub date: &'a str,
    pub activities: Vec<&'a Activity>,
}

impl<'a> DayGroup<'a> {
    pub fn distance_km(&self) -> f64 {
        self.activities.iter().map(|a| a.distance_m()).sum::<f64>() / 1000.0
    }

    /// Kind of the day's first activity.
    pub fn kind(&self) -> ActivityKind {
        self.activities
            .first()
            .map_or(ActivityKind::Other, |a| ActivityKind::from_type(a.activity_type()))
    }

    pub fn first(&self) -> Option<&'a Activity> {
        self.activities.first().copied()
    }

    pub fn last(&self) -> Option<&'a Activity> {
        self.activities.last().copied()
    }
}

/// Group activities by local date, oldest day first. Undated records are skipped.
pub fn group_by_date(activities: &[Activity]) -> Vec<DayGroup<'_>> {
    let mut groups: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
    for activity in activities {
        if let Some(date) = activity.local_date() {
            groups.entry(date).or_default().push(activity);
        }
    }
    groups
        .into_iter()
        .map(|(date, activities)| DayGroup { date, activities })
        .collect()
}

/// "2024-03-04" -> "Mon, 4 Mar". Unparseable dates are returned unchanged.
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a, %-d %b").to_string())
        .unwrap_or_else(|_| date.to_string())
}

// ============================================================================
// Serializable sidebar view
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry<'a> {
    pub id: u64,
    pub name: &'a str,
    pub kind: ActivityKind,
    pub distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub photos: &'a [Photo],
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineDay<'a> {
    pub date: &'a str,
    pub label: String,
    pub kind: ActivityKind,
    pub distance_km: f64,
    pub activities: Vec<TimelineEntry<'a>>,
}

/// Sidebar timeline, newest day first.
pub fn sidebar_timeline(activities: &[Activity]) -> Vec<TimelineDay<'_>> {
    group_by_date(activities)
        .into_iter()
        .rev()
        .map(|day| TimelineDay {
            date: day.date,
            label: format_date(day.date),
            kind: day.kind(),
            distance_km: day.distance_km(),
            activities: day
                .activities
                .into_iter()
                .map(|a| TimelineEntry {
                    id: a.id,
                    name: a.name(),
                    kind: ActivityKind::from_type(a.activity_type()),
                    distance_km: a.distance_m() / 1000.0,
                    description: a.description().filter(|d| !d.is_empty()),
                    photos: a.photos(),
                })
                .collect(),
        })
        .collect()
}
