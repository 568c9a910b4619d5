use crate::behavior::{retreat_step, Decision, GhostBehavior, PatrolMode};
use crate::config::GhostSpec;
use crate::maze::MazeGrid;
use crate::rng::Rng;
use crate::types::{Direction, GhostKind, GhostMode, GhostView, Position};

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub name: String,
    pub color: String,
    pub spawn: Position,
    pub position: Position,
    pub last_direction: Direction,
    pub behavior: GhostBehavior,
}

impl Ghost {
    pub fn from_spec(id: usize, spec: &GhostSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            color: spec.color.clone(),
            spawn: spec.spawn,
            position: spec.spawn,
            last_direction: Direction::None,
            behavior: GhostBehavior::for_kind(spec.kind, spec.chase_distance, spec.lose_distance),
        }
    }

    pub fn kind(&self) -> GhostKind {
        self.behavior.kind()
    }

    pub fn mode(&self, frightened: bool) -> GhostMode {
        if frightened {
            return GhostMode::Frightened;
        }
        match self.behavior {
            GhostBehavior::Patrol {
                mode: PatrolMode::Wandering,
                ..
            } => GhostMode::Wandering,
            _ => GhostMode::Chasing,
        }
    }

    pub fn send_to_spawn(&mut self) {
        self.position = self.spawn;
        self.behavior.clear_path();
    }

    pub fn reset(&mut self) {
        self.position = self.spawn;
        self.last_direction = Direction::None;
        self.behavior.reset();
    }

    pub fn flee(&mut self, player: Position, grid: &MazeGrid) {
        self.position = retreat_step(self.position, player, grid);
        self.behavior.clear_path();
    }

    pub fn advance(&mut self, player: Position, grid: &MazeGrid, rng: &mut Rng) -> Decision {
        let decision =
            self.behavior
                .decide_next_move(self.position, self.last_direction, player, grid, rng);
        if grid.is_passable(decision.next) {
            if decision.records_direction {
                self.last_direction = Direction::between(self.position, decision.next);
            }
            self.position = decision.next;
        }
        decision
    }

    pub fn view(&self, frightened: bool) -> GhostView {
        GhostView {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            kind: self.kind(),
            mode: self.mode(frightened),
            row: self.position.row,
            col: self.position.col,
            path_len: self.behavior.path_len(),
        }
    }
}
