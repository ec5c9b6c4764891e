//! Read-only snapshots handed to renderers
//!
//! Views are plain data: ids, coordinates, colors and formatted labels.
//! Measurements are computed when the view is built, so a view always
//! reflects the store at the moment it was taken.

use crate::annotation::{Color, Path, PathId, PathOrigin, Point, PointId, Region, RegionId};
use crate::geo::{format_distance, GeoCoordinate};
use serde::Serialize;

/// Display data for a point marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointView {
    pub id: PointId,
    pub seq: u64,
    pub name: String,
    pub color: Color,
    pub coordinate: GeoCoordinate,
}

impl From<&Point> for PointView {
    fn from(point: &Point) -> Self {
        Self {
            id: point.id(),
            seq: point.seq(),
            name: point.name().to_string(),
            color: point.color(),
            coordinate: point.coordinate(),
        }
    }
}

/// Display data for a path with its length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathView {
    pub id: PathId,
    pub seq: u64,
    pub name: String,
    pub color: Color,
    pub origin: PathOrigin,
    pub vertices: Vec<GeoCoordinate>,
    /// Length in meters
    pub length_m: f64,
    /// Length rendered by [`format_distance`]
    pub length_label: String,
}

impl From<&Path> for PathView {
    fn from(path: &Path) -> Self {
        let length_m = path.length();
        Self {
            id: path.id(),
            seq: path.seq(),
            name: path.name().to_string(),
            color: path.color(),
            origin: path.origin(),
            vertices: path.vertices().to_vec(),
            length_m,
            length_label: format_distance(length_m),
        }
    }
}

/// Display data for a region with its edge dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionView {
    pub id: RegionId,
    pub seq: u64,
    pub name: String,
    pub color: Color,
    pub sw: GeoCoordinate,
    pub ne: GeoCoordinate,
    /// Southern edge length in meters
    pub width_m: f64,
    /// Western edge length in meters
    pub height_m: f64,
    pub width_label: String,
    pub height_label: String,
}

impl From<&Region> for RegionView {
    fn from(region: &Region) -> Self {
        let (width_m, height_m) = region.dimensions();
        Self {
            id: region.id(),
            seq: region.seq(),
            name: region.name().to_string(),
            color: region.color(),
            sw: region.sw(),
            ne: region.ne(),
            width_m,
            height_m,
            width_label: format_distance(width_m),
            height_label: format_distance(height_m),
        }
    }
}

/// Implied line between two points in "connect every point" mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairDistance {
    pub from: PointId,
    pub to: PointId,
    pub meters: f64,
    pub label: String,
}

impl PairDistance {
    pub(crate) fn between(a: &Point, b: &Point) -> Self {
        let meters = a.coordinate().distance_to(&b.coordinate());
        Self {
            from: a.id(),
            to: b.id(),
            meters,
            label: format_distance(meters),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub points: Vec<PointView>,
    pub paths: Vec<PathView>,
    pub regions: Vec<RegionView>,
    pub pair_distances: Vec<PairDistance>,
}
