//! Geodesic math on a spherical Earth
//!
//! All distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_M`]. Point pairs, path segments and region edges go through
//! the same [`distance`] function so every measurement is consistent.

use crate::error::{AnnotationError, AnnotationResult};
use std::fmt;
use std::str::FromStr;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distances below this are rendered in meters, at or above in kilometers
const KILOMETER_THRESHOLD_M: f64 = 1000.0;

/// Geographic coordinate in degrees
///
/// Latitude is in [-90, 90], longitude in [-180, 180]. Construct through
/// [`GeoCoordinate::new`] or [`str::parse`] to get range checking; values
/// built directly or deserialized are checked again when they enter the store.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    /// Create a validated coordinate
    pub fn new(lat: f64, lon: f64) -> AnnotationResult<Self> {
        let coordinate = Self { lat, lon };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that both components are finite and within range
    pub fn validate(&self) -> AnnotationResult<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(AnnotationError::invalid_coordinate(
                self.to_string(),
                "latitude and longitude must be finite numbers",
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(AnnotationError::invalid_coordinate(
                self.to_string(),
                format!("latitude {} is outside [-90, 90]", self.lat),
            ));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(AnnotationError::invalid_coordinate(
                self.to_string(),
                format!("longitude {} is outside [-180, 180]", self.lon),
            ));
        }
        Ok(())
    }

    /// Great-circle distance to another coordinate in meters
    pub fn distance_to(&self, other: &GeoCoordinate) -> f64 {
        distance(*self, *other)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Parses the `"lat,lon"` form typed into the landmark input
impl FromStr for GeoCoordinate {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [lat, lon] = parts.as_slice() else {
            return Err(AnnotationError::invalid_coordinate(
                s,
                format!("expected 'latitude,longitude', got {} component(s)", parts.len()),
            ));
        };

        let lat = lat
            .parse::<f64>()
            .map_err(|_| AnnotationError::invalid_coordinate(s, format!("'{lat}' is not a number")))?;
        let lon = lon
            .parse::<f64>()
            .map_err(|_| AnnotationError::invalid_coordinate(s, format!("'{lon}' is not a number")))?;

        GeoCoordinate::new(lat, lon)
    }
}

/// Great-circle distance between two coordinates in meters (haversine)
pub fn distance(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Render a distance for display
///
/// Below one kilometer: `"123.45 meters"`; otherwise `"1.23 km"`.
/// The unit is chosen before rounding, so 999.996 m renders as `"1000.00 meters"`.
pub fn format_distance(meters: f64) -> String {
    if meters < KILOMETER_THRESHOLD_M {
        format!("{meters:.2} meters")
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Total length of a polyline in meters
pub fn path_length(vertices: &[GeoCoordinate]) -> AnnotationResult<f64> {
    if vertices.len() < 2 {
        return Err(AnnotationError::InsufficientVertices {
            count: vertices.len(),
        });
    }
    Ok(sum_segments(vertices))
}

/// Sum of consecutive segment distances; callers guarantee at least 2 vertices
pub(crate) fn sum_segments(vertices: &[GeoCoordinate]) -> f64 {
    vertices.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Width and height of an axis-aligned box in meters
///
/// Width runs along the southern parallel, height along the western meridian.
pub fn bounding_box_dimensions(sw: GeoCoordinate, ne: GeoCoordinate) -> (f64, f64) {
    let southeast = GeoCoordinate {
        lat: sw.lat,
        lon: ne.lon,
    };
    let northwest = GeoCoordinate {
        lat: ne.lat,
        lon: sw.lon,
    };
    (distance(sw, southeast), distance(sw, northwest))
}
