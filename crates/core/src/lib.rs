//! Pipemap Core Library
//!
//! Geodesic measurement and the annotation store behind the pipeline map:
//! points, connecting paths and rectangular regions with names, colors and
//! live distance labels.

pub mod action;
pub mod annotation;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod geo;
pub mod shared;
pub mod store;
pub mod view;

pub use action::{
    apply_action, ActionOutcome, ActionScript, EntityRef, LineClick, LineClickTool, StoreAction,
};
pub use annotation::{
    AnnotationId, AnnotationKind, Color, ColorParseError, Path, PathId, PathOrigin, Point,
    PointId, Region, RegionId,
};
pub use config::{ConfigError, StoreConfig};
pub use csv_export::{CsvExportConfig, CsvExportError, CsvExportResult};
pub use error::{AnnotationError, AnnotationResult};
pub use geo::{
    bounding_box_dimensions, distance, format_distance, path_length, GeoCoordinate,
    EARTH_RADIUS_M,
};
pub use shared::SharedAnnotationStore;
pub use store::AnnotationStore;
pub use view::{PairDistance, PathView, PointView, RegionView, StoreSnapshot};
