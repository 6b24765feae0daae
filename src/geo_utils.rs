//! Geographic utilities: bounds filtering, polyline decoding, coordinate keys.
//!
//! Coordinates are `[lat, lng]` pairs throughout the crate, matching what the
//! map layer consumes. `geo` types use `(x, y) = (lng, lat)`, so conversions
//! happen only inside this module.

use geo::{coord, BoundingRect, Coord, Intersects, LineString, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{ActivityMapError, Result};

/// Polyline precision used by Strava encoded polylines.
const POLYLINE_PRECISION: u32 = 5;

/// A `[lat, lng]` coordinate pair.
pub type LatLng = [f64; 2];

/// Axis-aligned geographic bounding box. All edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Rough bounds of mainland Australia and Tasmania.
    pub const AUSTRALIA: Bounds = Bounds {
        south: -44.0,
        west: 112.0,
        north: -10.0,
        east: 154.0,
    };

    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    fn to_rect(self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    /// Whether the point lies inside the box or on its edge.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        if !lat.is_finite() || !lng.is_finite() {
            return false;
        }
        self.to_rect().intersects(&coord! { x: lng, y: lat })
    }

    /// Whether the point lies inside the box or on its edge.
    pub fn contains_point(&self, point: &LatLng) -> bool {
        self.contains(point[0], point[1])
    }

    /// South-west corner as `[lat, lng]`.
    pub fn south_west(&self) -> LatLng {
        [self.south, self.west]
    }

    /// North-east corner as `[lat, lng]`.
    pub fn north_east(&self) -> LatLng {
        [self.north, self.east]
    }
}

impl std::str::FromStr for Bounds {
    type Err = ActivityMapError;

    /// Parse `south,west,north,east`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ActivityMapError::config(format!("Invalid bounds '{}': {}", s, e)))?;

        match parts.as_slice() {
            [south, west, north, east] if south <= north && west <= east => {
                Ok(Bounds::new(*south, *west, *north, *east))
            }
            [_, _, _, _] => Err(ActivityMapError::config(format!(
                "Invalid bounds '{}': expected south <= north and west <= east",
                s
            ))),
            _ => Err(ActivityMapError::config(format!(
                "Invalid bounds '{}': expected south,west,north,east",
                s
            ))),
        }
    }
}

/// Decode an encoded polyline (precision 5) into `[lat, lng]` pairs.
pub fn decode_polyline(activity_id: u64, encoded: &str) -> Result<Vec<LatLng>> {
    let line: LineString<f64> = polyline::decode_polyline(encoded, POLYLINE_PRECISION).map_err(
        |e| ActivityMapError::Polyline {
            activity_id,
            message: e.to_string(),
        },
    )?;

    Ok(line.coords().map(|c: &Coord<f64>| [c.y, c.x]).collect())
}

/// Smallest bounds containing every coordinate, or `None` if empty.
pub fn route_bounds(coords: &[LatLng]) -> Option<Bounds> {
    let line: LineString<f64> = coords
        .iter()
        .map(|p| coord! { x: p[1], y: p[0] })
        .collect::<Vec<_>>()
        .into();

    line.bounding_rect().map(|rect| {
        Bounds::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x)
    })
}

/// Key for grouping nearby points, rounded to 4 decimals (~11 m).
pub fn coordinate_key(point: &LatLng) -> String {
    format!("{:.4},{:.4}", point[0], point[1])
}
