//! Annotation entity model
//!
//! Points, paths and regions placed on the map. Geometry is captured by value
//! when an entity is created and never changes afterwards; name and color are
//! the only editable attributes.

use crate::geo::{self, GeoCoordinate};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Unique identifier for an annotation
///
/// Assigned at creation, never reused within a session.
/// Generated using UUID v4 so ids from different kinds never collide.
pub type AnnotationId = uuid::Uuid;

/// Identifier of a [`Point`]
pub type PointId = AnnotationId;

/// Identifier of a [`Path`]
pub type PathId = AnnotationId;

/// Identifier of a [`Region`]
pub type RegionId = AnnotationId;

/// The three annotation kinds held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Point,
    Path,
    Region,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationKind::Point => "point",
            AnnotationKind::Path => "path",
            AnnotationKind::Region => "region",
        };
        f.write_str(name)
    }
}

/// RGBA color representation
///
/// Serialized as a `#RRGGBB` (or `#RRGGBBAA` when translucent) hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Hex form used by map polylines and CSV output
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Common annotation colors
impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
}

/// Error parsing a hex color string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}': expected #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };

        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A named marker at a single coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: PointId,
    /// 1-based creation order among points
    seq: u64,
    coordinate: GeoCoordinate,
    name: String,
    color: Color,
}

impl Point {
    pub(crate) fn new(
        id: PointId,
        seq: u64,
        coordinate: GeoCoordinate,
        name: String,
        color: Color,
    ) -> Self {
        Self {
            id,
            seq,
            coordinate,
            name,
            color,
        }
    }

    /// Get the point ID
    pub fn id(&self) -> PointId {
        self.id
    }

    /// Creation order among points (1-based)
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Get the coordinate
    pub fn coordinate(&self) -> GeoCoordinate {
        self.coordinate
    }

    /// Get the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the display color
    pub fn color(&self) -> Color {
        self.color
    }
}

/// Where a path's vertices came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathOrigin {
    /// Created by connecting two points; the ids are kept for display only
    Connected { from: PointId, to: PointId },
    /// Drawn free-hand with the line tool
    Drawn,
}

/// A named polyline (the "pipe") with a derived length
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    id: PathId,
    /// 1-based creation order among paths
    seq: u64,
    /// Snapshot geometry, never shared with the source points
    vertices: Arc<[GeoCoordinate]>,
    origin: PathOrigin,
    name: String,
    color: Color,
}

impl Path {
    pub(crate) fn new(
        id: PathId,
        seq: u64,
        vertices: Vec<GeoCoordinate>,
        origin: PathOrigin,
        name: String,
        color: Color,
    ) -> Self {
        debug_assert!(vertices.len() >= 2);
        Self {
            id,
            seq,
            vertices: vertices.into(),
            origin,
            name,
            color,
        }
    }

    /// Get the path ID
    pub fn id(&self) -> PathId {
        self.id
    }

    /// Creation order among paths (1-based)
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Ordered vertices, at least two
    pub fn vertices(&self) -> &[GeoCoordinate] {
        &self.vertices
    }

    /// How the path was created
    pub fn origin(&self) -> PathOrigin {
        self.origin
    }

    /// Get the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the display color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Total length in meters, computed from the current vertices on every call
    pub fn length(&self) -> f64 {
        geo::sum_segments(&self.vertices)
    }
}

/// A named axis-aligned rectangle with derived width and height
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    /// 1-based creation order among regions
    seq: u64,
    sw: GeoCoordinate,
    ne: GeoCoordinate,
    name: String,
    color: Color,
}

impl Region {
    pub(crate) fn new(
        id: RegionId,
        seq: u64,
        sw: GeoCoordinate,
        ne: GeoCoordinate,
        name: String,
        color: Color,
    ) -> Self {
        Self {
            id,
            seq,
            sw,
            ne,
            name,
            color,
        }
    }

    /// Get the region ID
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Creation order among regions (1-based)
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Southwest corner
    pub fn sw(&self) -> GeoCoordinate {
        self.sw
    }

    /// Northeast corner
    pub fn ne(&self) -> GeoCoordinate {
        self.ne
    }

    /// Get the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the display color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Width and height in meters along the southern and western edges
    pub fn dimensions(&self) -> (f64, f64) {
        geo::bounding_box_dimensions(self.sw, self.ne)
    }
}

/// Shared access to the editable attributes of every kind
pub(crate) trait Attributes {
    fn set_name(&mut self, name: String);
    fn set_color(&mut self, color: Color);
}

macro_rules! impl_attributes {
    ($($ty:ty),*) => {
        $(
            impl Attributes for $ty {
                fn set_name(&mut self, name: String) {
                    self.name = name;
                }

                fn set_color(&mut self, color: Color) {
                    self.color = color;
                }
            }
        )*
    };
}

impl_attributes!(Point, Path, Region);
