use crate::maze::MazeGrid;
use crate::types::{Direction, PlayerView, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub spawn: Position,
    pub position: Position,
    pub direction: Direction,
    pub pending: Direction,
}

impl Player {
    pub fn new(spawn: Position) -> Self {
        Self {
            spawn,
            position: spawn,
            direction: Direction::None,
            pending: Direction::None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.spawn);
    }

    // Pending heading wins whenever it is open.
    pub fn step(&mut self, grid: &MazeGrid) -> bool {
        if grid.is_passable(self.position.offset(self.pending)) {
            self.direction = self.pending;
        }
        if self.direction == Direction::None {
            return false;
        }
        let target = self.position.offset(self.direction);
        if !grid.is_passable(target) {
            return false;
        }
        self.position = target;
        true
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            row: self.position.row,
            col: self.position.col,
            dir: self.direction,
            pending: self.pending,
        }
    }
}
