use std::collections::{HashMap, VecDeque};

use crate::maze::MazeGrid;
use crate::session::Session;
use crate::types::{Direction, Position};

pub fn choose_direction(session: &Session) -> Direction {
    let grid = session.grid();
    let start = session.player_position();
    let threats: Vec<Position> = if session.is_powered() || session.invincible_remaining_ms() > 0 {
        Vec::new()
    } else {
        session.ghosts().iter().map(|ghost| ghost.position).collect()
    };

    if let Some(dir) = first_step_to_nearest_pellet(grid, start, &threats) {
        return dir;
    }
    escape_direction(grid, start, &threats)
}

fn is_dangerous(pos: Position, threats: &[Position]) -> bool {
    threats.iter().any(|ghost| ghost.manhattan(pos) <= 1)
}

fn first_step_to_nearest_pellet(
    grid: &MazeGrid,
    start: Position,
    threats: &[Position],
) -> Option<Direction> {
    let mut first_move = HashMap::<Position, Direction>::new();
    let mut queue = VecDeque::new();
    first_move.insert(start, Direction::None);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        let opening = first_move.get(&pos).copied().unwrap_or(Direction::None);
        if pos != start && grid.cell_at(pos).is_collectible() {
            return Some(opening);
        }
        for (dir, next) in grid.passable_neighbors(pos) {
            if first_move.contains_key(&next) || is_dangerous(next, threats) {
                continue;
            }
            let opening = if pos == start { dir } else { opening };
            first_move.insert(next, opening);
            queue.push_back(next);
        }
    }
    None
}

fn escape_direction(grid: &MazeGrid, start: Position, threats: &[Position]) -> Direction {
    let nearest_threat = |pos: Position| {
        threats
            .iter()
            .map(|ghost| ghost.manhattan(pos))
            .min()
            .unwrap_or(i32::MAX)
    };
    grid.passable_neighbors(start)
        .into_iter()
        .max_by_key(|(_, next)| nearest_threat(*next))
        .map(|(dir, _)| dir)
        .unwrap_or(Direction::None)
}
