//! Per-tick snapshots handed over by the game loop.
//!
//! Field names serialize in camelCase, so snapshots
//! produced by a JavaScript game loop deserialize as-is.

use serde::{Deserialize, Serialize};

/// A point in screen coordinates, with y growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Position {
        Position { x, y }
    }
}

/// The controlled actor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub position: Position,
    /// The game score, when the game loop reports it.
    #[serde(default)]
    pub score: Option<u32>,
}

/// A single obstacle. Obstacles come in pairs: a top one
/// hanging from the ceiling and a bottom one rising from
/// the floor, leaving a gap between them.
///
/// `position` is the obstacle's center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub position: Position,
    pub is_top: bool,
    pub height: f32,
    pub width: f32,
}

impl Obstacle {
    /// Y coordinate of the obstacle's lower edge.
    pub fn lower_edge(&self) -> f32 {
        self.position.y + self.height / 2.0
    }

    /// Y coordinate of the obstacle's upper edge.
    pub fn upper_edge(&self) -> f32 {
        self.position.y - self.height / 2.0
    }

    /// Whether every field holds a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.height.is_finite()
            && self.width.is_finite()
    }
}

/// Everything the controller sees on a tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub actor: Actor,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl GameState {
    /// Creates a snapshot with no reported score.
    pub fn new(actor_position: Position, obstacles: Vec<Obstacle>) -> GameState {
        GameState {
            actor: Actor {
                position: actor_position,
                score: None,
            },
            obstacles,
        }
    }

    /// Sets the reported game score.
    pub fn with_score(mut self, score: u32) -> GameState {
        self.actor.score = Some(score);
        self
    }
}
