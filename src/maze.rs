use std::collections::{HashSet, VecDeque};

use crate::config::SetupError;
use crate::constants::{MAX_LAYOUT_SIDE, MIN_LAYOUT_SIDE, PELLET_SCORE, POWER_PELLET_SCORE};
use crate::types::{Cell, Direction, Position};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collection {
    pub score_delta: u32,
    pub power_up: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeGrid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
    pellets_left: usize,
}

impl MazeGrid {
    fn filled(rows: i32, cols: i32, fill: Cell) -> Self {
        let mut grid = Self {
            rows,
            cols,
            cells: vec![fill; rows.max(0) as usize * cols.max(0) as usize],
            pellets_left: 0,
        };
        for row in 0..rows {
            for col in 0..cols {
                if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
                    grid.set(Position::new(row, col), Cell::Wall);
                }
            }
        }
        grid.recount();
        grid
    }

    pub fn reference(rows: i32, cols: i32) -> Self {
        let mut grid = Self::filled(rows, cols, Cell::Pellet);
        let mid_row = rows / 2;
        let mid_col = cols / 2;

        for row in 3..(rows - 3) {
            if (mid_row - 1..=mid_row + 1).contains(&row) {
                continue;
            }
            grid.set(Position::new(row, mid_col), Cell::Wall);
            grid.set(Position::new(row, mid_col - 1), Cell::Wall);
        }
        for col in 3..(cols - 3) {
            if (mid_col - 1..=mid_col + 1).contains(&col) {
                continue;
            }
            grid.set(Position::new(mid_row, col), Cell::Wall);
            grid.set(Position::new(mid_row - 1, col), Cell::Wall);
        }

        // Corner rooms: (row range, col range, wall row, wall col, entrance).
        let rooms = [
            (2..6, 2..6, 2, 2, Position::new(3, 2)),
            (2..6, (cols - 6)..(cols - 2), 2, cols - 3, Position::new(3, cols - 3)),
            ((rows - 6)..(rows - 2), 2..6, rows - 3, 2, Position::new(rows - 4, 2)),
            (
                (rows - 6)..(rows - 2),
                (cols - 6)..(cols - 2),
                rows - 3,
                cols - 3,
                Position::new(rows - 4, cols - 3),
            ),
        ];
        for (row_range, col_range, wall_row, wall_col, entrance) in rooms {
            for row in row_range {
                for col in col_range.clone() {
                    if row == wall_row || col == wall_col {
                        grid.set(Position::new(row, col), Cell::Wall);
                    }
                }
            }
            grid.set(entrance, Cell::Pellet);
        }

        for row in 8..(rows - 8) {
            if row % 3 != 0 {
                grid.set(Position::new(row, 8), Cell::Wall);
                grid.set(Position::new(row, cols - 9), Cell::Wall);
            }
        }
        for col in 8..(cols - 8) {
            if col % 4 != 0 {
                grid.set(Position::new(8, col), Cell::Wall);
                grid.set(Position::new(rows - 9, col), Cell::Wall);
            }
        }

        for pos in [
            Position::new(2, 2),
            Position::new(2, cols - 3),
            Position::new(rows - 3, 2),
            Position::new(rows - 3, cols - 3),
            Position::new(mid_row, mid_col),
        ] {
            grid.set(pos, Cell::PowerPellet);
        }

        grid.recount();
        grid
    }

    pub fn from_tiles<S: AsRef<str>>(tiles: &[S]) -> Result<Self, SetupError> {
        let width = tiles.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        let limit = MAX_LAYOUT_SIDE as usize;
        if tiles.len() > limit || width > limit {
            return Err(SetupError::LayoutTooLarge {
                rows: tiles.len(),
                cols: width,
            });
        }
        let (rows, cols) = (tiles.len() as i32, width as i32);
        Self::check_dimensions(rows, cols)?;

        let mut cells = Vec::with_capacity(tiles.len() * width);
        for (row, line) in tiles.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(SetupError::RaggedLayout {
                    row: row as i32,
                    expected: cols,
                    found: i32::try_from(found).unwrap_or(i32::MAX),
                });
            }
            for (col, tile) in line.chars().enumerate() {
                let cell = Cell::from_tile(tile).ok_or(SetupError::UnknownTile {
                    tile,
                    row: row as i32,
                    col: col as i32,
                })?;
                cells.push(cell);
            }
        }

        let mut grid = Self {
            rows,
            cols,
            cells,
            pellets_left: 0,
        };
        grid.recount();
        Ok(grid)
    }

    // Keeps `rows * cols` and every cell index well inside i32.
    pub fn check_dimensions(rows: i32, cols: i32) -> Result<(), SetupError> {
        if rows > MAX_LAYOUT_SIDE || cols > MAX_LAYOUT_SIDE {
            return Err(SetupError::LayoutTooLarge {
                rows: rows as usize,
                cols: cols as usize,
            });
        }
        if rows < MIN_LAYOUT_SIDE || cols < MIN_LAYOUT_SIDE {
            return Err(SetupError::LayoutTooSmall { rows, cols });
        }
        Ok(())
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    // Out of bounds reads as Wall.
    pub fn cell_at(&self, pos: Position) -> Cell {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx).copied())
            .unwrap_or(Cell::Wall)
    }

    fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = cell;
        }
    }

    fn recount(&mut self) {
        self.pellets_left = self.cells.iter().filter(|cell| cell.is_collectible()).count();
    }

    pub fn is_passable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cell_at(pos) != Cell::Wall
    }

    pub fn passable_neighbors(&self, pos: Position) -> Vec<(Direction, Position)> {
        Direction::MOVES
            .iter()
            .map(|&dir| (dir, pos.offset(dir)))
            .filter(|&(_, next)| self.is_passable(next))
            .collect()
    }

    pub fn collect(&mut self, pos: Position) -> Collection {
        let collection = match self.cell_at(pos) {
            Cell::Pellet => Collection {
                score_delta: PELLET_SCORE,
                power_up: false,
            },
            Cell::PowerPellet => Collection {
                score_delta: POWER_PELLET_SCORE,
                power_up: true,
            },
            Cell::Empty | Cell::Wall => return Collection::default(),
        };
        self.set(pos, Cell::Empty);
        self.pellets_left = self.pellets_left.saturating_sub(1);
        collection
    }

    pub fn has_clear_line_of_sight(&self, a: Position, b: Position) -> bool {
        let dr = (b.row - a.row).abs();
        let dc = (b.col - a.col).abs();
        let sr = if a.row < b.row { 1 } else { -1 };
        let sc = if a.col < b.col { 1 } else { -1 };
        let mut err = dr - dc;
        let mut cursor = a;

        loop {
            if self.cell_at(cursor) == Cell::Wall {
                return false;
            }
            if cursor == b {
                return true;
            }
            let e2 = 2 * err;
            if e2 > -dc {
                err -= dc;
                cursor.row += sr;
            }
            if e2 < dr {
                err += dr;
                cursor.col += sc;
            }
        }
    }

    pub fn pellets_left(&self) -> usize {
        self.pellets_left
    }

    pub fn all_pellets_collected(&self) -> bool {
        self.pellets_left == 0
    }

    pub fn tiles(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols.max(1) as usize)
            .map(|row| row.iter().map(|cell| cell.tile()).collect())
            .collect()
    }

    pub fn missing_boundary_wall(&self) -> Option<Position> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let on_edge =
                    row == 0 || col == 0 || row == self.rows - 1 || col == self.cols - 1;
                let pos = Position::new(row, col);
                if on_edge && self.cell_at(pos) != Cell::Wall {
                    return Some(pos);
                }
            }
        }
        None
    }

    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        let mut out = HashSet::new();
        if !self.is_passable(start) {
            return out;
        }
        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for (_, next) in self.passable_neighbors(pos) {
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    pub fn first_unreachable_pellet(&self, start: Position) -> Option<Position> {
        let reachable = self.reachable_from(start);
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Position::new(row, col)))
            .find(|pos| self.cell_at(*pos).is_collectible() && !reachable.contains(pos))
    }
}
