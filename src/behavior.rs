use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::constants::PATH_FOLLOWER_CLOSE_RANGE;
use crate::maze::MazeGrid;
use crate::pathfinding::{find_path_with_stats, SearchStats};
use crate::rng::Rng;
use crate::types::{Direction, GhostKind, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatrolMode {
    Wandering,
    Chasing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GhostBehavior {
    Aggressive,
    Patrol {
        chase_distance: i32,
        lose_distance: i32,
        mode: PatrolMode,
    },
    PathFollower {
        path: VecDeque<Position>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub next: Position,
    pub records_direction: bool,
    pub search: Option<SearchStats>,
}

impl Decision {
    fn step(next: Position) -> Self {
        Self {
            next,
            records_direction: false,
            search: None,
        }
    }
}

pub fn pursue_step(from: Position, target: Position, grid: &MazeGrid) -> Position {
    let mut best = from;
    let mut best_distance = i32::MAX;
    for (_, next) in grid.passable_neighbors(from) {
        let distance = next.manhattan(target);
        if distance < best_distance {
            best = next;
            best_distance = distance;
        }
    }
    best
}

pub fn retreat_step(from: Position, threat: Position, grid: &MazeGrid) -> Position {
    let mut worst = from;
    let mut worst_distance = -1;
    for (_, next) in grid.passable_neighbors(from) {
        let distance = next.manhattan(threat);
        if distance > worst_distance {
            worst = next;
            worst_distance = distance;
        }
    }
    worst
}

impl GhostBehavior {
    pub fn for_kind(kind: GhostKind, chase_distance: i32, lose_distance: i32) -> Self {
        match kind {
            GhostKind::Aggressive => Self::Aggressive,
            GhostKind::Patrol => Self::Patrol {
                chase_distance,
                lose_distance,
                mode: PatrolMode::Wandering,
            },
            GhostKind::PathFollower => Self::PathFollower {
                path: VecDeque::new(),
            },
        }
    }

    pub fn kind(&self) -> GhostKind {
        match self {
            Self::Aggressive => GhostKind::Aggressive,
            Self::Patrol { .. } => GhostKind::Patrol,
            Self::PathFollower { .. } => GhostKind::PathFollower,
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Aggressive => {}
            Self::Patrol { mode, .. } => *mode = PatrolMode::Wandering,
            Self::PathFollower { path } => path.clear(),
        }
    }

    pub fn clear_path(&mut self) {
        if let Self::PathFollower { path } = self {
            path.clear();
        }
    }

    pub fn path_len(&self) -> usize {
        match self {
            Self::PathFollower { path } => path.len(),
            _ => 0,
        }
    }

    pub fn decide_next_move(
        &mut self,
        position: Position,
        last_direction: Direction,
        player: Position,
        grid: &MazeGrid,
        rng: &mut Rng,
    ) -> Decision {
        match self {
            Self::Aggressive => Decision::step(pursue_step(position, player, grid)),
            Self::Patrol {
                chase_distance,
                lose_distance,
                mode,
            } => {
                let distance = position.manhattan(player);
                match *mode {
                    PatrolMode::Wandering if distance <= *chase_distance => {
                        trace!(distance, "patrol ghost starts chasing");
                        *mode = PatrolMode::Chasing;
                    }
                    PatrolMode::Chasing if distance > *lose_distance => {
                        trace!(distance, "patrol ghost loses the player");
                        *mode = PatrolMode::Wandering;
                    }
                    _ => {}
                }
                match *mode {
                    PatrolMode::Chasing => Decision::step(pursue_step(position, player, grid)),
                    PatrolMode::Wandering => wander(position, last_direction, grid, rng),
                }
            }
            Self::PathFollower { path } => follow_path(path, position, player, grid),
        }
    }
}

fn wander(
    position: Position,
    last_direction: Direction,
    grid: &MazeGrid,
    rng: &mut Rng,
) -> Decision {
    let available = grid.passable_neighbors(position);
    if available.is_empty() {
        return Decision::step(position);
    }
    let reverse = last_direction.reverse();
    let forward: Vec<(Direction, Position)> = available
        .iter()
        .copied()
        .filter(|(dir, _)| last_direction == Direction::None || *dir != reverse)
        .collect();
    let choices = if forward.is_empty() {
        &available
    } else {
        &forward
    };
    let next = rng
        .pick(choices)
        .map(|&(_, next)| next)
        .unwrap_or(position);
    Decision {
        next,
        records_direction: true,
        search: None,
    }
}

fn follow_path(
    path: &mut VecDeque<Position>,
    position: Position,
    player: Position,
    grid: &MazeGrid,
) -> Decision {
    // A route that no longer starts under the ghost (it was teleported) is useless.
    if path.front().is_some_and(|head| *head != position) {
        path.clear();
    }

    let can_move = !grid.passable_neighbors(position).is_empty();
    let close = position.manhattan(player) <= PATH_FOLLOWER_CLOSE_RANGE
        && grid.has_clear_line_of_sight(position, player);
    let mut search = None;

    if can_move && (close || path.len() <= 1) {
        let (route, stats) = find_path_with_stats(position, player, grid);
        debug!(
            len = route.len(),
            expansions = stats.expansions,
            capped = stats.capped,
            close,
            "path follower recomputed route"
        );
        *path = route.into();
        search = Some(stats);
    }

    if path.len() > 1 {
        path.pop_front();
        if let Some(next) = path.front().copied() {
            return Decision {
                next,
                records_direction: false,
                search,
            };
        }
    }

    trace!(row = position.row, col = position.col, "path follower stalls");
    Decision {
        next: position,
        records_direction: false,
        search,
    }
}
