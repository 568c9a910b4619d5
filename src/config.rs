use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    reference_ghost_spawns, reference_player_spawn, FAST_GHOST_STEP_MS, INVINCIBLE_DURATION_MS,
    MAX_FRAME_DELTA_MS, PATROL_CHASE_DISTANCE, PATROL_LOSE_DISTANCE, PLAYER_STEP_MS,
    POWER_DURATION_MS, REFERENCE_COLS, REFERENCE_ROWS, SLOW_GHOST_STEP_MS, STARTING_LIVES,
};
use crate::maze::MazeGrid;
use crate::types::{GhostKind, Position};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("layout is {rows}x{cols}; both sides must be at least 3")]
    LayoutTooSmall { rows: i32, cols: i32 },

    #[error(
        "layout is {rows}x{cols}; neither side may exceed {max}",
        max = crate::constants::MAX_LAYOUT_SIDE
    )]
    LayoutTooLarge { rows: usize, cols: usize },

    #[error("layout row {row} has {found} tiles, expected {expected}")]
    RaggedLayout { row: i32, expected: i32, found: i32 },

    #[error("unknown tile {tile:?} at ({row},{col})")]
    UnknownTile { tile: char, row: i32, col: i32 },

    #[error("boundary cell ({},{}) is not a wall", .pos.row, .pos.col)]
    MissingBoundaryWall { pos: Position },

    #[error("{what} spawn ({},{}) is not a passable cell", .pos.row, .pos.col)]
    SpawnNotPassable { what: String, pos: Position },

    #[error("ghost {ghost}: loseDistance {lose} must exceed chaseDistance {chase}")]
    InvalidHysteresis { ghost: String, chase: i32, lose: i32 },

    #[error("step interval `{name}` must be greater than zero")]
    ZeroInterval { name: &'static str },

    #[error("maxFrameDeltaMs must be greater than zero")]
    InvalidFrameClamp,

    #[error("startingLives must be greater than zero")]
    NoLives,

    #[error("ghost roster is empty")]
    EmptyRoster,

    #[error("pellet at ({},{}) cannot be reached from the player spawn", .pos.row, .pos.col)]
    UnreachablePellet { pos: Position },

    #[error("failed to read config: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse config: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostSpec {
    pub name: String,
    pub color: String,
    pub kind: GhostKind,
    pub spawn: Position,
    #[serde(default = "default_chase_distance")]
    pub chase_distance: i32,
    #[serde(default = "default_lose_distance")]
    pub lose_distance: i32,
}

fn default_chase_distance() -> i32 {
    PATROL_CHASE_DISTANCE
}

fn default_lose_distance() -> i32 {
    PATROL_LOSE_DISTANCE
}

impl GhostSpec {
    pub fn new(name: &str, color: &str, kind: GhostKind, spawn: Position) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            kind,
            spawn,
            chase_distance: PATROL_CHASE_DISTANCE,
            lose_distance: PATROL_LOSE_DISTANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub layout: Option<Vec<String>>,
    pub rows: i32,
    pub cols: i32,
    pub player_spawn: Position,
    pub ghosts: Vec<GhostSpec>,
    pub player_step_ms: u64,
    pub fast_ghost_step_ms: u64,
    pub slow_ghost_step_ms: u64,
    pub max_frame_delta_ms: u64,
    pub power_duration_ms: u64,
    pub invincible_duration_ms: u64,
    pub starting_lives: u32,
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::reference(REFERENCE_ROWS, REFERENCE_COLS)
    }
}

impl SessionConfig {
    pub fn reference(rows: i32, cols: i32) -> Self {
        let [john, kevin, doug] = reference_ghost_spawns(rows, cols);
        Self {
            layout: None,
            rows,
            cols,
            player_spawn: Position::from(reference_player_spawn(rows, cols)),
            ghosts: vec![
                GhostSpec::new("John", "#ef4444", GhostKind::Aggressive, john.into()),
                GhostSpec::new("Kevin", "#22d3ee", GhostKind::Patrol, kevin.into()),
                GhostSpec::new("Doug", "#8b5cf6", GhostKind::PathFollower, doug.into()),
            ],
            player_step_ms: PLAYER_STEP_MS,
            fast_ghost_step_ms: FAST_GHOST_STEP_MS,
            slow_ghost_step_ms: SLOW_GHOST_STEP_MS,
            max_frame_delta_ms: MAX_FRAME_DELTA_MS,
            power_duration_ms: POWER_DURATION_MS,
            invincible_duration_ms: INVINCIBLE_DURATION_MS,
            starting_lives: STARTING_LIVES,
            seed: 1,
        }
    }

    pub fn with_layout<S: AsRef<str>>(tiles: &[S], player_spawn: Position) -> Self {
        let layout: Vec<String> = tiles.iter().map(|row| row.as_ref().to_string()).collect();
        Self {
            rows: layout.len() as i32,
            cols: layout
                .first()
                .map(|row| row.chars().count() as i32)
                .unwrap_or(0),
            layout: Some(layout),
            player_spawn,
            ghosts: Vec::new(),
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn build_grid(&self) -> Result<MazeGrid, SetupError> {
        match &self.layout {
            Some(tiles) => MazeGrid::from_tiles(tiles),
            None => {
                MazeGrid::check_dimensions(self.rows, self.cols)?;
                Ok(MazeGrid::reference(self.rows, self.cols))
            }
        }
    }

    pub fn validate(&self) -> Result<MazeGrid, SetupError> {
        for (name, value) in [
            ("playerStepMs", self.player_step_ms),
            ("fastGhostStepMs", self.fast_ghost_step_ms),
            ("slowGhostStepMs", self.slow_ghost_step_ms),
        ] {
            if value == 0 {
                return Err(SetupError::ZeroInterval { name });
            }
        }
        if self.max_frame_delta_ms == 0 {
            return Err(SetupError::InvalidFrameClamp);
        }
        if self.starting_lives == 0 {
            return Err(SetupError::NoLives);
        }
        if self.ghosts.is_empty() {
            return Err(SetupError::EmptyRoster);
        }

        let grid = self.build_grid()?;
        if let Some(pos) = grid.missing_boundary_wall() {
            return Err(SetupError::MissingBoundaryWall { pos });
        }
        if !grid.is_passable(self.player_spawn) {
            return Err(SetupError::SpawnNotPassable {
                what: "player".to_string(),
                pos: self.player_spawn,
            });
        }
        for ghost in &self.ghosts {
            if !grid.is_passable(ghost.spawn) {
                return Err(SetupError::SpawnNotPassable {
                    what: format!("ghost {}", ghost.name),
                    pos: ghost.spawn,
                });
            }
            if ghost.kind == GhostKind::Patrol && ghost.lose_distance <= ghost.chase_distance {
                return Err(SetupError::InvalidHysteresis {
                    ghost: ghost.name.clone(),
                    chase: ghost.chase_distance,
                    lose: ghost.lose_distance,
                });
            }
        }
        if let Some(pos) = grid.first_unreachable_pellet(self.player_spawn) {
            return Err(SetupError::UnreachablePellet { pos });
        }
        Ok(grid)
    }
}
