//! Inbound events from the map layer
//!
//! [`StoreAction`] mirrors every store mutation as plain data so a UI (or a
//! script file) can drive the store without calling it directly.
//! [`ActionScript`] applies a sequence of actions and lets later actions
//! refer to entities created earlier in the same sequence by `#n`.

use crate::annotation::{AnnotationId, Color, PathId};
use crate::error::{AnnotationError, AnnotationResult};
use crate::geo::GeoCoordinate;
use crate::store::AnnotationStore;
use std::fmt;
use std::str::FromStr;

/// Reference to an existing entity inside an action
///
/// Either a literal id, or `#n`: the entity created by the n-th successful
/// creating action of the current script (1-based). A `#n` reference is bound
/// once at creation and does not shift when earlier entities are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityRef {
    Id(AnnotationId),
    Created(usize),
}

impl FromStr for EntityRef {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unresolved = || AnnotationError::UnresolvedReference {
            reference: s.to_string(),
        };

        if let Some(index) = s.strip_prefix('#') {
            let n = index.parse::<usize>().map_err(|_| unresolved())?;
            if n == 0 {
                return Err(unresolved());
            }
            return Ok(EntityRef::Created(n));
        }

        AnnotationId::parse_str(s)
            .map(EntityRef::Id)
            .map_err(|_| unresolved())
    }
}

impl TryFrom<String> for EntityRef {
    type Error = AnnotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityRef> for String {
    fn from(reference: EntityRef) -> Self {
        reference.to_string()
    }
}

impl From<AnnotationId> for EntityRef {
    fn from(id: AnnotationId) -> Self {
        EntityRef::Id(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Id(id) => write!(f, "{id}"),
            EntityRef::Created(n) => write!(f, "#{n}"),
        }
    }
}

/// A single store mutation expressed as data
///
/// JSON form: `{"action": "add_point", "lat": 52.37, "lon": 4.90}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StoreAction {
    AddPoint {
        lat: f64,
        lon: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    ConnectPoints {
        from: EntityRef,
        to: EntityRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    AddDrawnPath {
        vertices: Vec<GeoCoordinate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    AddRegion {
        sw: GeoCoordinate,
        ne: GeoCoordinate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    RemovePoint {
        id: EntityRef,
    },
    RemovePath {
        id: EntityRef,
    },
    RemoveRegion {
        id: EntityRef,
    },
    Rename {
        id: EntityRef,
        name: String,
    },
    Recolor {
        id: EntityRef,
        color: Color,
    },
    ClearAll,
}

impl StoreAction {
    /// Short name used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            StoreAction::AddPoint { .. } => "add_point",
            StoreAction::ConnectPoints { .. } => "connect_points",
            StoreAction::AddDrawnPath { .. } => "add_drawn_path",
            StoreAction::AddRegion { .. } => "add_region",
            StoreAction::RemovePoint { .. } => "remove_point",
            StoreAction::RemovePath { .. } => "remove_path",
            StoreAction::RemoveRegion { .. } => "remove_region",
            StoreAction::Rename { .. } => "rename",
            StoreAction::Recolor { .. } => "recolor",
            StoreAction::ClearAll => "clear_all",
        }
    }
}

/// What applying an action did
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum ActionOutcome {
    Created(AnnotationId),
    Updated(AnnotationId),
    Removed(AnnotationId),
    Cleared,
}

/// Applies actions in order, tracking created ids for `#n` references
#[derive(Debug, Default)]
pub struct ActionScript {
    created: Vec<AnnotationId>,
}

impl ActionScript {
    /// Start a script with no created entities
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids created so far, in creation order
    pub fn created(&self) -> &[AnnotationId] {
        &self.created
    }

    /// Resolve a reference against this script
    pub fn resolve(&self, reference: EntityRef) -> AnnotationResult<AnnotationId> {
        match reference {
            EntityRef::Id(id) => Ok(id),
            EntityRef::Created(n) => n
                .checked_sub(1)
                .and_then(|index| self.created.get(index))
                .copied()
                .ok_or_else(|| AnnotationError::UnresolvedReference {
                    reference: reference.to_string(),
                }),
        }
    }

    /// Apply one action; on error the store is unchanged
    pub fn apply(
        &mut self,
        store: &mut AnnotationStore,
        action: StoreAction,
    ) -> AnnotationResult<ActionOutcome> {
        let name = action.name();
        let outcome = self.dispatch(store, action).inspect_err(|error| {
            log::warn!("{name} rejected: {error}");
        })?;

        if let ActionOutcome::Created(id) = outcome {
            self.created.push(id);
        }
        Ok(outcome)
    }

    fn dispatch(
        &self,
        store: &mut AnnotationStore,
        action: StoreAction,
    ) -> AnnotationResult<ActionOutcome> {
        let outcome = match action {
            StoreAction::AddPoint {
                lat,
                lon,
                name,
                color,
            } => {
                let coordinate = GeoCoordinate { lat, lon };
                ActionOutcome::Created(store.add_point(coordinate, name, color)?)
            }
            StoreAction::ConnectPoints {
                from,
                to,
                name,
                color,
            } => {
                let from = self.resolve(from)?;
                let to = self.resolve(to)?;
                ActionOutcome::Created(store.connect_points(from, to, name, color)?)
            }
            StoreAction::AddDrawnPath {
                vertices,
                name,
                color,
            } => ActionOutcome::Created(store.add_drawn_path(vertices, name, color)?),
            StoreAction::AddRegion { sw, ne, name, color } => {
                ActionOutcome::Created(store.add_region(sw, ne, name, color)?)
            }
            StoreAction::RemovePoint { id } => {
                let id = self.resolve(id)?;
                store.remove_point(id)?;
                ActionOutcome::Removed(id)
            }
            StoreAction::RemovePath { id } => {
                let id = self.resolve(id)?;
                store.remove_path(id)?;
                ActionOutcome::Removed(id)
            }
            StoreAction::RemoveRegion { id } => {
                let id = self.resolve(id)?;
                store.remove_region(id)?;
                ActionOutcome::Removed(id)
            }
            StoreAction::Rename { id, name } => {
                let id = self.resolve(id)?;
                store.rename(id, name)?;
                ActionOutcome::Updated(id)
            }
            StoreAction::Recolor { id, color } => {
                let id = self.resolve(id)?;
                store.recolor(id, color)?;
                ActionOutcome::Updated(id)
            }
            StoreAction::ClearAll => {
                store.clear_all();
                ActionOutcome::Cleared
            }
        };
        Ok(outcome)
    }
}

/// Apply a single action that uses literal ids only
///
/// `#n` references fail with [`AnnotationError::UnresolvedReference`]; use an
/// [`ActionScript`] to apply sequences that refer to their own creations.
pub fn apply_action(
    store: &mut AnnotationStore,
    action: StoreAction,
) -> AnnotationResult<ActionOutcome> {
    ActionScript::new().apply(store, action)
}

/// Result of a click with the line tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineClick {
    /// First click of a pair; waiting for the end point
    StartPlaced(GeoCoordinate),
    /// Second click; a drawn path now joins the two clicks
    PathCreated(PathId),
}

/// Click-pairing line tool
///
/// Alternating clicks on the map become the start and end of a line.
#[derive(Debug, Default)]
pub struct LineClickTool {
    pending_start: Option<GeoCoordinate>,
}

impl LineClickTool {
    /// Create a tool with no pending start point
    pub fn new() -> Self {
        Self::default()
    }

    /// Start coordinate waiting for its end click
    pub fn pending_start(&self) -> Option<GeoCoordinate> {
        self.pending_start
    }

    /// Handle a map click
    ///
    /// An invalid coordinate is rejected without changing the pending state.
    pub fn click(
        &mut self,
        store: &mut AnnotationStore,
        coordinate: GeoCoordinate,
    ) -> AnnotationResult<LineClick> {
        coordinate.validate()?;

        match self.pending_start {
            None => {
                self.pending_start = Some(coordinate);
                Ok(LineClick::StartPlaced(coordinate))
            }
            Some(start) => {
                let id = store.add_drawn_path(vec![start, coordinate], None, None)?;
                self.pending_start = None;
                Ok(LineClick::PathCreated(id))
            }
        }
    }

    /// Drop a pending start point
    pub fn cancel(&mut self) {
        self.pending_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, PathOrigin};

    fn coord(lat: f64, lon: f64) -> GeoCoordinate {
        GeoCoordinate::new(lat, lon).unwrap()
    }

    fn parse_script(json: &str) -> Vec<StoreAction> {
        serde_json::from_str(json).expect("script should parse")
    }

    #[test]
    fn test_entity_ref_parse() {
        assert_eq!("#3".parse::<EntityRef>().unwrap(), EntityRef::Created(3));
        let id = AnnotationId::new_v4();
        assert_eq!(id.to_string().parse::<EntityRef>().unwrap(), EntityRef::Id(id));
        for bad in ["#0", "#", "#x", "3", "not-a-uuid"] {
            assert!(bad.parse::<EntityRef>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_action_json_form() {
        let actions = parse_script(
            r##"[
                {"action": "add_point", "lat": 52.3676, "lon": 4.9041},
                {"action": "add_point", "lat": 52.37, "lon": 4.91, "name": "Pump", "color": "#000000"},
                {"action": "connect_points", "from": "#1", "to": "#2"},
                {"action": "add_region", "sw": {"lat": 0, "lon": 0}, "ne": {"lat": 1, "lon": 1}},
                {"action": "recolor", "id": "#3", "color": "#FFFF00"},
                {"action": "clear_all"}
            ]"##,
        );
        assert_eq!(actions.len(), 6);
        assert_eq!(
            actions[1],
            StoreAction::AddPoint {
                lat: 52.37,
                lon: 4.91,
                name: Some("Pump".to_string()),
                color: Some(Color::BLACK),
            }
        );
        assert_eq!(actions[5], StoreAction::ClearAll);

        let json = serde_json::to_value(&actions[2]).unwrap();
        assert_eq!(json["action"], "connect_points");
        assert_eq!(json["from"], "#1");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_script_resolves_created_references() {
        let mut store = AnnotationStore::new();
        let mut script = ActionScript::new();
        let actions = parse_script(
            r##"[
                {"action": "add_point", "lat": 0, "lon": 0},
                {"action": "add_point", "lat": 0, "lon": 1},
                {"action": "add_point", "lat": 0, "lon": 2},
                {"action": "remove_point", "id": "#1"},
                {"action": "connect_points", "from": "#2", "to": "#3"},
                {"action": "rename", "id": "#4", "name": "Main"}
            ]"##,
        );

        let outcomes: Vec<ActionOutcome> = actions
            .into_iter()
            .map(|action| script.apply(&mut store, action).unwrap())
            .collect();

        let created = script.created().to_vec();
        assert_eq!(created.len(), 4);
        assert_eq!(outcomes[3], ActionOutcome::Removed(created[0]));
        assert_eq!(outcomes[5], ActionOutcome::Updated(created[3]));

        // "#2" still means the second point after "#1" was removed
        let path = store.get_path(created[3]).unwrap();
        assert_eq!(
            path.origin(),
            PathOrigin::Connected {
                from: created[1],
                to: created[2]
            }
        );
        assert_eq!(path.name(), "Main");
        assert_eq!(store.point_count(), 2);
    }

    #[test]
    fn test_failed_action_leaves_store_and_numbering_unchanged() {
        let mut store = AnnotationStore::new();
        let mut script = ActionScript::new();

        script
            .apply(
                &mut store,
                StoreAction::AddPoint {
                    lat: 1.0,
                    lon: 1.0,
                    name: None,
                    color: None,
                },
            )
            .unwrap();
        let err = script
            .apply(
                &mut store,
                StoreAction::AddPoint {
                    lat: 100.0,
                    lon: 1.0,
                    name: None,
                    color: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidCoordinate { .. }));

        let err = script
            .apply(
                &mut store,
                StoreAction::RemovePoint {
                    id: EntityRef::Created(2),
                },
            )
            .unwrap_err();
        assert_eq!(
            err,
            AnnotationError::UnresolvedReference {
                reference: "#2".to_string()
            }
        );
        assert_eq!(store.point_count(), 1);
        assert_eq!(script.created().len(), 1);
    }

    #[test]
    fn test_apply_action_with_literal_ids() {
        let mut store = AnnotationStore::new();
        let a = store.add_point(coord(0.0, 0.0), None, None).unwrap();
        let b = store.add_point(coord(1.0, 1.0), None, None).unwrap();

        let outcome = apply_action(
            &mut store,
            StoreAction::ConnectPoints {
                from: a.into(),
                to: b.into(),
                name: None,
                color: None,
            },
        )
        .unwrap();
        let ActionOutcome::Created(path) = outcome else {
            panic!("expected a created path, got {outcome:?}");
        };
        assert_eq!(store.kind_of(path), Some(AnnotationKind::Path));

        assert!(matches!(
            apply_action(
                &mut store,
                StoreAction::RemovePoint {
                    id: EntityRef::Created(1)
                }
            ),
            Err(AnnotationError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_line_click_tool_pairs_clicks() {
        let mut store = AnnotationStore::new();
        let mut tool = LineClickTool::new();

        let first = tool.click(&mut store, coord(37.7749, -122.4194)).unwrap();
        assert_eq!(first, LineClick::StartPlaced(coord(37.7749, -122.4194)));
        assert_eq!(store.path_count(), 0);

        let second = tool.click(&mut store, coord(37.7750, -122.4190)).unwrap();
        let LineClick::PathCreated(id) = second else {
            panic!("second click should create a path");
        };
        assert!(tool.pending_start().is_none());

        let path = store.get_path(id).unwrap();
        assert_eq!(path.origin(), PathOrigin::Drawn);
        assert!((path.length() - 36.87).abs() < 0.01);

        // Third click starts a new pair
        tool.click(&mut store, coord(0.0, 0.0)).unwrap();
        assert!(tool.pending_start().is_some());
        tool.cancel();
        assert!(tool.pending_start().is_none());
        assert_eq!(store.path_count(), 1);
    }

    #[test]
    fn test_line_click_tool_rejects_invalid_click() {
        let mut store = AnnotationStore::new();
        let mut tool = LineClickTool::new();
        tool.click(&mut store, coord(1.0, 1.0)).unwrap();

        let bad = GeoCoordinate { lat: -91.0, lon: 0.0 };
        assert!(tool.click(&mut store, bad).is_err());
        assert_eq!(tool.pending_start(), Some(coord(1.0, 1.0)));
        assert_eq!(store.path_count(), 0);
    }
}
