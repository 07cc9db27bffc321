//! Movement rules and the move model

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::coord::{Coord, Shape, DIMS};
use crate::pieces::{PieceId, PlayerId};

// ============================================================================
// MOVEMENT RULES
// ============================================================================

/// Per-player pawn configuration, fixed at game setup
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementProfile {
    /// Forward axis
    pub axis: usize,
    /// +1 or -1 along the forward axis
    pub direction: i32,
    /// Coordinate along `axis` from which the double step is allowed
    pub home: i32,
}

impl MovementProfile {
    pub fn forward(&self) -> Coord {
        Coord::axis_unit(self.axis, self.direction)
    }

    pub fn is_home(&self, position: Coord) -> bool {
        position[self.axis] == self.home
    }

    /// Default profile for a seat: seats alternate direction, two seats per axis.
    ///
    /// The home rank sits one step in from the starting edge, or on the last
    /// slice when the axis is too short for that.
    pub fn for_seat(seat: PlayerId, shape: Shape) -> Self {
        let axis = (seat / 2) % DIMS;
        let direction = if seat % 2 == 0 { 1 } else { -1 };
        let extent = shape.extent(axis) as i32;
        let home = if extent <= 2 {
            (extent - 1).max(0)
        } else if direction > 0 {
            1
        } else {
            extent - 2
        };
        Self { axis, direction, home }
    }
}

/// Snapshot of board shape and pawn profiles, rebuilt whenever the shape changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementRules {
    pub board_shape: Shape,
    pub pawn_profiles: BTreeMap<PlayerId, MovementProfile>,
}

impl MovementRules {
    pub fn new(board_shape: Shape, pawn_profiles: BTreeMap<PlayerId, MovementProfile>) -> Self {
        Self {
            board_shape,
            pawn_profiles,
        }
    }

    pub fn profile(&self, player: PlayerId) -> Option<&MovementProfile> {
        self.pawn_profiles.get(&player)
    }
}

// ============================================================================
// LAYOUT OPERATIONS
// ============================================================================

/// A board-geometry transformation performed by an Alien
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum LayoutOp {
    /// Full axis permutation; output axis k is input axis `axes[k]`
    Transpose { axes: [usize; DIMS] },
    SwapAxis { axes: [usize; 2] },
    MoveAxis { source: usize, destination: usize },
    /// Re-factor the extents of two axes, keeping the cell count
    ReshapeAxis {
        axis_pair: [usize; 2],
        new_shape: [usize; DIMS],
    },
}

impl LayoutOp {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutOp::Transpose { .. } => "transpose",
            LayoutOp::SwapAxis { .. } => "swap_axis",
            LayoutOp::MoveAxis { .. } => "move_axis",
            LayoutOp::ReshapeAxis { .. } => "reshape_axis",
        }
    }

    pub fn same_kind(&self, other: &LayoutOp) -> bool {
        self.name() == other.name()
    }

    /// Parameters that leave a board of `shape` exactly as it is
    pub fn is_identity(&self, shape: Shape) -> bool {
        match *self {
            LayoutOp::Transpose { axes } => axes == [0, 1, 2, 3],
            LayoutOp::SwapAxis { axes } => axes[0] == axes[1],
            LayoutOp::MoveAxis { source, destination } => source == destination,
            LayoutOp::ReshapeAxis { new_shape, .. } => new_shape == shape.extents(),
        }
    }

    pub fn to_metadata(&self) -> Metadata {
        let mut map = Map::new();
        map.insert("operation".to_string(), Value::from(self.name()));
        match *self {
            LayoutOp::Transpose { axes } => {
                map.insert("axes".to_string(), json!(axes));
            }
            LayoutOp::SwapAxis { axes } => {
                map.insert("axes".to_string(), json!(axes));
            }
            LayoutOp::MoveAxis { source, destination } => {
                map.insert("source".to_string(), json!(source));
                map.insert("destination".to_string(), json!(destination));
            }
            LayoutOp::ReshapeAxis { axis_pair, new_shape } => {
                map.insert("axis_pair".to_string(), json!(axis_pair));
                map.insert("new_shape".to_string(), json!(new_shape));
            }
        }
        Metadata(map)
    }
}

impl fmt::Display for LayoutOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutOp::Transpose { axes } => write!(f, "transpose {:?}", axes),
            LayoutOp::SwapAxis { axes } => write!(f, "swap_axis {} {}", axes[0], axes[1]),
            LayoutOp::MoveAxis { source, destination } => {
                write!(f, "move_axis {} -> {}", source, destination)
            }
            LayoutOp::ReshapeAxis { axis_pair, new_shape } => write!(
                f,
                "reshape_axis ({}, {}) -> {:?}",
                axis_pair[0], axis_pair[1], new_shape
            ),
        }
    }
}

// ============================================================================
// MOVES
// ============================================================================

/// Move category, each with its own execution path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    Move,
    Capture,
    Scratch,
    Layout,
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveType::Move => "move",
            MoveType::Capture => "capture",
            MoveType::Scratch => "scratch",
            MoveType::Layout => "layout",
        })
    }
}

/// Free-form move annotations (capture flag, scratch target, layout parameters)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(pub Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(flag: bool) -> Self {
        Self::new().with("capture", flag)
    }

    pub fn scratch_target(target: Coord) -> Self {
        Self::new().with("target", json!(target))
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_capture(&self) -> bool {
        self.get("capture").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn operation(&self) -> Option<&str> {
        self.get("operation").and_then(Value::as_str)
    }

    /// Decode layout parameters, if these annotations describe one
    pub fn layout(&self) -> Option<LayoutOp> {
        serde_json::from_value(Value::Object(self.0.clone())).ok()
    }

    /// Whether a requested annotation set selects this one.
    ///
    /// Accepts exact equality or `requested` being a subset of `self`.
    pub fn matches(&self, requested: &Metadata) -> bool {
        self == requested
            || requested
                .0
                .iter()
                .all(|(key, value)| self.0.get(key) == Some(value))
    }
}

/// A candidate transition produced by move generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub piece: PieceId,
    pub start: Coord,
    pub end: Coord,
    pub move_type: MoveType,
    pub metadata: Metadata,
}

impl Move {
    pub fn step(piece: PieceId, start: Coord, end: Coord) -> Self {
        Self {
            piece,
            start,
            end,
            move_type: MoveType::Move,
            metadata: Metadata::new(),
        }
    }

    pub fn capture(piece: PieceId, start: Coord, end: Coord) -> Self {
        Self {
            piece,
            start,
            end,
            move_type: MoveType::Capture,
            metadata: Metadata::capture(true),
        }
    }

    pub fn scratch(piece: PieceId, start: Coord, target: Coord) -> Self {
        Self {
            piece,
            start,
            end: target,
            move_type: MoveType::Scratch,
            metadata: Metadata::scratch_target(target),
        }
    }

    pub fn layout(piece: PieceId, op: LayoutOp) -> Self {
        Self {
            piece,
            start: Coord::SENTINEL,
            end: Coord::SENTINEL,
            move_type: MoveType::Layout,
            metadata: op.to_metadata(),
        }
    }

    pub fn is_capture(&self) -> bool {
        self.metadata.is_capture()
    }

    pub fn layout_op(&self) -> Option<LayoutOp> {
        match self.move_type {
            MoveType::Layout => self.metadata.layout(),
            _ => None,
        }
    }

    /// Human-readable line, e.g. `Rook (0, 0, 0, 0) -> (0, 2, 0, 0)`
    pub fn describe(&self, piece_name: &str) -> String {
        let suffix = match self.move_type {
            MoveType::Layout => format!(" via {}", self.metadata.operation().unwrap_or("?")),
            MoveType::Scratch => " (scratch)".to_string(),
            _ => String::new(),
        };
        format!("{} {} -> {}{}", piece_name, self.start, self.end, suffix)
    }
}
