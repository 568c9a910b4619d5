use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn offset(self, dir: Direction) -> Position {
        let (dr, dc) = dir.delta();
        Position::new(self.row + dr, self.col + dc)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    pub const MOVES: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::None => (0, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn between(from: Position, to: Position) -> Self {
        match (to.row - from.row, to.col - from.col) {
            (-1, 0) => Self::Up,
            (1, 0) => Self::Down,
            (0, -1) => Self::Left,
            (0, 1) => Self::Right,
            _ => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Wall,
    Pellet,
    PowerPellet,
}

impl Cell {
    pub fn from_tile(tile: char) -> Option<Self> {
        match tile {
            '#' => Some(Self::Wall),
            '.' => Some(Self::Pellet),
            'o' => Some(Self::PowerPellet),
            ' ' => Some(Self::Empty),
            _ => None,
        }
    }

    pub fn tile(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Pellet => '.',
            Self::PowerPellet => 'o',
            Self::Empty => ' ',
        }
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Self::Pellet | Self::PowerPellet)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Aggressive,
    Patrol,
    PathFollower,
}

impl GhostKind {
    pub fn is_slow(self) -> bool {
        self == Self::PathFollower
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chasing,
    Wandering,
    Frightened,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Playing,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Self::Playing
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    pub pending: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub name: String,
    pub color: String,
    pub kind: GhostKind,
    pub mode: GhostMode,
    pub row: i32,
    pub col: i32,
    #[serde(rename = "pathLen")]
    pub path_len: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        row: i32,
        col: i32,
        power: bool,
    },
    PowerActivated {
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    GhostEaten {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        bonus: u32,
    },
    PlayerDied {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    PathRecomputed {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        len: usize,
        expansions: usize,
    },
    OutcomeChanged {
        outcome: Outcome,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub tiles: Vec<String>,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub score: u32,
    pub lives: u32,
    pub outcome: Outcome,
    #[serde(rename = "powerRemainingMs")]
    pub power_remaining_ms: u64,
    #[serde(rename = "invincibleRemainingMs")]
    pub invincible_remaining_ms: u64,
    #[serde(rename = "pelletsLeft")]
    pub pellets_left: usize,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub outcome: Outcome,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub ticks: u64,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "pelletsLeft")]
    pub pellets_left: usize,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: u32,
    pub deaths: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_between_adjacent_cells_matches_offset() {
        let origin = Position::new(5, 5);
        for dir in Direction::MOVES {
            assert_eq!(Direction::between(origin, origin.offset(dir)), dir);
            assert_eq!(origin.offset(dir).offset(dir.reverse()), origin);
        }
        assert_eq!(
            Direction::between(origin, Position::new(7, 5)),
            Direction::None
        );
    }

    #[test]
    fn tile_encoding_is_symmetric() {
        for cell in [Cell::Empty, Cell::Wall, Cell::Pellet, Cell::PowerPellet] {
            assert_eq!(Cell::from_tile(cell.tile()), Some(cell));
        }
        assert_eq!(Cell::from_tile('x'), None);
    }

    #[test]
    fn runtime_event_serializes_with_type_tag() {
        let value = serde_json::to_value(RuntimeEvent::GhostEaten {
            ghost_id: 2,
            bonus: 200,
        })
        .expect("event should serialize");
        assert_eq!(value["type"], "ghost_eaten");
        assert_eq!(value["ghostId"], 2);
    }
}
