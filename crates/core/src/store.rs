//! In-memory annotation store
//!
//! Owns every point, path and region of one session. Entities are addressed
//! by permanent id only; positions in the display order are never used as
//! keys, so removing one entity cannot make another id point somewhere else.
//!
//! Every mutation validates all of its inputs before touching state, so a
//! failed call leaves the store exactly as it was.

use crate::annotation::{
    AnnotationId, AnnotationKind, Attributes, Color, Path, PathId, PathOrigin, Point, PointId,
    Region, RegionId,
};
use crate::config::StoreConfig;
use crate::error::{AnnotationError, AnnotationResult};
use crate::geo::GeoCoordinate;
use crate::view::{PairDistance, PathView, PointView, RegionView, StoreSnapshot};
use std::collections::HashMap;

/// Insertion-ordered map for one annotation kind
#[derive(Debug)]
struct Registry<T> {
    items: HashMap<AnnotationId, T>,
    /// Display order (creation order)
    order: Vec<AnnotationId>,
    /// Sequence number for the next created entity, never rewound
    next_seq: u64,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            next_seq: 1,
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn insert(&mut self, id: AnnotationId, item: T) {
        self.items.insert(id, item);
        self.order.push(id);
    }

    fn remove(&mut self, id: AnnotationId) -> Option<T> {
        let item = self.items.remove(&id)?;
        self.order.retain(|&existing| existing != id);
        Some(item)
    }

    fn get(&self, id: AnnotationId) -> Option<&T> {
        self.items.get(&id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }
}

/// Registry of the points, paths and regions of one session
#[derive(Debug)]
pub struct AnnotationStore {
    config: StoreConfig,
    points: Registry<Point>,
    paths: Registry<Path>,
    regions: Registry<Region>,
}

impl AnnotationStore {
    /// Create an empty store with default colors and names
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given defaults
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            points: Registry::new(),
            paths: Registry::new(),
            regions: Registry::new(),
        }
    }

    /// Defaults applied to new annotations
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Place a point marker
    ///
    /// Without a name the point is called `"Point {n}"` (n = creation order).
    pub fn add_point(
        &mut self,
        coordinate: GeoCoordinate,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<PointId> {
        coordinate.validate()?;

        let id = PointId::new_v4();
        let seq = self.points.take_seq();
        let name = name.unwrap_or_else(|| format!("{} {seq}", self.config.point_prefix));
        let color = color.unwrap_or(self.config.point_color);

        log::debug!("add_point {id} '{name}' at {coordinate}");
        self.points.insert(id, Point::new(id, seq, coordinate, name, color));
        Ok(id)
    }

    /// Create a two-vertex path between existing points
    ///
    /// The path copies both coordinates; it does not follow the points
    /// afterwards and survives their removal.
    pub fn connect_points(
        &mut self,
        from: PointId,
        to: PointId,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<PathId> {
        const OPERATION: &str = "connect_points";

        let start = self
            .points
            .get(from)
            .ok_or(AnnotationError::UnknownPoint {
                id: from,
                operation: OPERATION,
            })?
            .coordinate();
        let end = self
            .points
            .get(to)
            .ok_or(AnnotationError::UnknownPoint {
                id: to,
                operation: OPERATION,
            })?
            .coordinate();
        if from == to {
            return Err(AnnotationError::SelfConnection { id: from });
        }

        Ok(self.insert_path(vec![start, end], PathOrigin::Connected { from, to }, name, color))
    }

    /// Create a path from a drawn polyline
    pub fn add_drawn_path(
        &mut self,
        vertices: Vec<GeoCoordinate>,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<PathId> {
        if vertices.len() < 2 {
            return Err(AnnotationError::InsufficientVertices {
                count: vertices.len(),
            });
        }
        for vertex in &vertices {
            vertex.validate()?;
        }

        Ok(self.insert_path(vertices, PathOrigin::Drawn, name, color))
    }

    fn insert_path(
        &mut self,
        vertices: Vec<GeoCoordinate>,
        origin: PathOrigin,
        name: Option<String>,
        color: Option<Color>,
    ) -> PathId {
        let id = PathId::new_v4();
        let seq = self.paths.take_seq();
        let name = name.unwrap_or_else(|| format!("{} {seq}", self.config.path_prefix));
        let color = color.unwrap_or(self.config.path_color);

        log::debug!("add path {id} '{name}' with {} vertices ({origin:?})", vertices.len());
        self.paths.insert(id, Path::new(id, seq, vertices, origin, name, color));
        id
    }

    /// Create a rectangular region from its southwest and northeast corners
    pub fn add_region(
        &mut self,
        sw: GeoCoordinate,
        ne: GeoCoordinate,
        name: Option<String>,
        color: Option<Color>,
    ) -> AnnotationResult<RegionId> {
        sw.validate()?;
        ne.validate()?;
        if sw.lat >= ne.lat || sw.lon >= ne.lon {
            return Err(AnnotationError::DegenerateRegion { sw, ne });
        }

        let id = RegionId::new_v4();
        let seq = self.regions.take_seq();
        let name = name.unwrap_or_else(|| format!("{} {seq}", self.config.region_prefix));
        let color = color.unwrap_or(self.config.region_color);

        log::debug!("add_region {id} '{name}' {sw}..{ne}");
        self.regions.insert(id, Region::new(id, seq, sw, ne, name, color));
        Ok(id)
    }

    /// Remove a point; paths connected through it are kept unchanged
    pub fn remove_point(&mut self, id: PointId) -> AnnotationResult<()> {
        self.points
            .remove(id)
            .ok_or(AnnotationError::UnknownEntity {
                id,
                operation: "remove_point",
            })?;
        log::debug!("remove_point {id}");
        Ok(())
    }

    /// Remove a path
    pub fn remove_path(&mut self, id: PathId) -> AnnotationResult<()> {
        self.paths
            .remove(id)
            .ok_or(AnnotationError::UnknownEntity {
                id,
                operation: "remove_path",
            })?;
        log::debug!("remove_path {id}");
        Ok(())
    }

    /// Remove a region
    pub fn remove_region(&mut self, id: RegionId) -> AnnotationResult<()> {
        self.regions
            .remove(id)
            .ok_or(AnnotationError::UnknownEntity {
                id,
                operation: "remove_region",
            })?;
        log::debug!("remove_region {id}");
        Ok(())
    }

    /// Change the display name of any annotation
    pub fn rename(&mut self, id: AnnotationId, name: impl Into<String>) -> AnnotationResult<()> {
        let name = name.into();
        self.attributes_mut(id, "rename")?.set_name(name.clone());
        log::debug!("rename {id} to '{name}'");
        Ok(())
    }

    /// Change the display color of any annotation
    pub fn recolor(&mut self, id: AnnotationId, color: Color) -> AnnotationResult<()> {
        self.attributes_mut(id, "recolor")?.set_color(color);
        log::debug!("recolor {id} to {color}");
        Ok(())
    }

    fn attributes_mut(
        &mut self,
        id: AnnotationId,
        operation: &'static str,
    ) -> AnnotationResult<&mut dyn Attributes> {
        if let Some(point) = self.points.get_mut(id) {
            return Ok(point);
        }
        if let Some(path) = self.paths.get_mut(id) {
            return Ok(path);
        }
        if let Some(region) = self.regions.get_mut(id) {
            return Ok(region);
        }
        Err(AnnotationError::UnknownEntity { id, operation })
    }

    /// Remove every annotation
    ///
    /// Sequence counters keep running, so default names are not reused.
    pub fn clear_all(&mut self) {
        log::debug!(
            "clear_all: dropping {} points, {} paths, {} regions",
            self.points.len(),
            self.paths.len(),
            self.regions.len()
        );
        self.points.clear();
        self.paths.clear();
        self.regions.clear();
    }

    /// Get a point by ID
    pub fn get_point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id)
    }

    /// Get a path by ID
    pub fn get_path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id)
    }

    /// Get a region by ID
    pub fn get_region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Which kind of annotation an id refers to, if it is present
    pub fn kind_of(&self, id: AnnotationId) -> Option<AnnotationKind> {
        if self.points.get(id).is_some() {
            Some(AnnotationKind::Point)
        } else if self.paths.get(id).is_some() {
            Some(AnnotationKind::Path)
        } else if self.regions.get(id).is_some() {
            Some(AnnotationKind::Region)
        } else {
            None
        }
    }

    /// Check whether an id is present
    pub fn contains(&self, id: AnnotationId) -> bool {
        self.kind_of(id).is_some()
    }

    /// Number of points
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of paths
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Total number of annotations
    pub fn len(&self) -> usize {
        self.points.len() + self.paths.len() + self.regions.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points in creation order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Paths in creation order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    /// Regions in creation order
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Point views in creation order
    pub fn list_points(&self) -> Vec<PointView> {
        self.points.iter().map(PointView::from).collect()
    }

    /// Path views in creation order, lengths computed now
    pub fn list_paths(&self) -> Vec<PathView> {
        self.paths.iter().map(PathView::from).collect()
    }

    /// Region views in creation order, dimensions computed now
    pub fn list_regions(&self) -> Vec<RegionView> {
        self.regions.iter().map(RegionView::from).collect()
    }

    /// Distance between every unordered pair of current points
    ///
    /// Ordered by the creation order of the first point, then the second.
    /// Returns exactly `n * (n - 1) / 2` entries for `n` points.
    pub fn all_pairs_distances(&self) -> Vec<PairDistance> {
        let points: Vec<&Point> = self.points.iter().collect();
        let mut pairs = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                pairs.push(PairDistance::between(a, b));
            }
        }
        pairs
    }

    /// Complete view of the store for one render pass
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            points: self.list_points(),
            paths: self.list_paths(),
            regions: self.list_regions(),
            pair_distances: self.all_pairs_distances(),
        }
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}
