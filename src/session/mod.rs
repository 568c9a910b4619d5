use tracing::{debug, info};

use crate::clock::SimulationClock;
use crate::config::{SessionConfig, SetupError};
use crate::ghost::Ghost;
use crate::maze::MazeGrid;
use crate::player::Player;
use crate::rng::Rng;
use crate::types::{Direction, Outcome, Position, RuntimeEvent, SessionSummary, Snapshot};

mod collision;

#[derive(Clone, Debug, Default)]
struct SessionStats {
    pellets_eaten: u32,
    ghosts_eaten: u32,
    deaths: u32,
}

#[derive(Clone, Debug)]
pub struct Session {
    config: SessionConfig,
    pristine: MazeGrid,
    grid: MazeGrid,
    player: Player,
    ghosts: Vec<Ghost>,
    clock: SimulationClock,
    rng: Rng,
    events: Vec<RuntimeEvent>,
    stats: SessionStats,

    score: u32,
    lives: u32,
    outcome: Outcome,
    power_remaining_ms: u64,
    invincible_remaining_ms: u64,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, SetupError> {
        let grid = config.validate()?;
        let ghosts = spawn_roster(&config);
        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            ghosts = ghosts.len(),
            pellets = grid.pellets_left(),
            seed = config.seed,
            "session created"
        );
        Ok(Self {
            pristine: grid.clone(),
            grid,
            player: Player::new(config.player_spawn),
            ghosts,
            clock: SimulationClock::new(
                config.player_step_ms,
                config.fast_ghost_step_ms,
                config.slow_ghost_step_ms,
                config.max_frame_delta_ms,
            ),
            rng: Rng::new(config.seed),
            events: Vec::new(),
            stats: SessionStats::default(),
            score: 0,
            lives: config.starting_lives,
            outcome: Outcome::Playing,
            power_remaining_ms: 0,
            invincible_remaining_ms: 0,
            elapsed_ms: 0,
            tick_counter: 0,
            config,
        })
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn player_position(&self) -> Position {
        self.player.position
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn power_remaining_ms(&self) -> u64 {
        self.power_remaining_ms
    }

    pub fn invincible_remaining_ms(&self) -> u64 {
        self.invincible_remaining_ms
    }

    pub fn is_powered(&self) -> bool {
        self.power_remaining_ms > 0
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn set_pending_direction(&mut self, dir: Direction) {
        if self.is_ended() {
            return;
        }
        self.player.pending = dir;
    }

    pub fn tick(&mut self, delta_ms: u64) -> Outcome {
        if self.is_ended() {
            return self.outcome;
        }
        self.tick_counter += 1;
        let batch = self.clock.advance(delta_ms);
        self.elapsed_ms = self.elapsed_ms.saturating_add(batch.delta_ms);
        self.power_remaining_ms = self.power_remaining_ms.saturating_sub(batch.delta_ms);
        self.invincible_remaining_ms = self.invincible_remaining_ms.saturating_sub(batch.delta_ms);

        for _ in 0..batch.player_steps {
            if self.lives == 0 {
                break;
            }
            self.step_player();
        }
        for _ in 0..batch.fast_ghost_steps {
            if self.lives == 0 {
                break;
            }
            self.step_ghosts(false);
        }
        for _ in 0..batch.slow_ghost_steps {
            if self.lives == 0 {
                break;
            }
            self.step_ghosts(true);
        }
        if self.lives > 0 {
            self.resolve_collisions();
        }
        self.update_outcome();
        self.outcome
    }

    pub fn tick_at(&mut self, timestamp_ms: u64) -> Outcome {
        let delta = self.clock.delta_since_last(timestamp_ms);
        self.tick(delta)
    }

    pub fn restart(&mut self) {
        self.grid = self.pristine.clone();
        self.player.reset();
        self.ghosts = spawn_roster(&self.config);
        self.clock.reset();
        self.rng = Rng::new(self.config.seed);
        self.events.clear();
        self.stats = SessionStats::default();
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.outcome = Outcome::Playing;
        self.power_remaining_ms = 0;
        self.invincible_remaining_ms = 0;
        self.elapsed_ms = 0;
        self.tick_counter = 0;
        info!(seed = self.config.seed, "session restarted");
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let frightened = self.is_powered();
        Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            tiles: self.grid.tiles(),
            player: self.player.view(),
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| ghost.view(frightened))
                .collect(),
            score: self.score,
            lives: self.lives,
            outcome: self.outcome,
            power_remaining_ms: self.power_remaining_ms,
            invincible_remaining_ms: self.invincible_remaining_ms,
            pellets_left: self.grid.pellets_left(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            outcome: self.outcome,
            duration_ms: self.elapsed_ms,
            ticks: self.tick_counter,
            score: self.score,
            lives: self.lives,
            pellets_eaten: self.stats.pellets_eaten,
            pellets_left: self.grid.pellets_left(),
            ghosts_eaten: self.stats.ghosts_eaten,
            deaths: self.stats.deaths,
        }
    }

    fn step_player(&mut self) {
        if !self.player.step(&self.grid) {
            return;
        }
        let pos = self.player.position;
        let collection = self.grid.collect(pos);
        if collection.score_delta > 0 {
            self.score = self.score.saturating_add(collection.score_delta);
            self.stats.pellets_eaten += 1;
            self.events.push(RuntimeEvent::PelletEaten {
                row: pos.row,
                col: pos.col,
                power: collection.power_up,
            });
        }
        if collection.power_up {
            self.power_remaining_ms = self.config.power_duration_ms;
            self.events.push(RuntimeEvent::PowerActivated {
                duration_ms: self.config.power_duration_ms,
            });
            debug!(row = pos.row, col = pos.col, "power activated");
        }
        self.resolve_collisions();
    }

    fn step_ghosts(&mut self, slow: bool) {
        for idx in 0..self.ghosts.len() {
            if self.lives == 0 {
                return;
            }
            if self.ghosts[idx].kind().is_slow() != slow {
                continue;
            }
            self.move_ghost(idx);
            self.resolve_collisions();
        }
    }

    fn move_ghost(&mut self, idx: usize) {
        let player = self.player.position;
        if self.is_powered() {
            self.ghosts[idx].flee(player, &self.grid);
            return;
        }
        let decision = self.ghosts[idx].advance(player, &self.grid, &mut self.rng);
        if let Some(search) = decision.search {
            self.events.push(RuntimeEvent::PathRecomputed {
                ghost_id: self.ghosts[idx].id,
                len: self.ghosts[idx].behavior.path_len(),
                expansions: search.expansions,
            });
        }
    }

    fn update_outcome(&mut self) {
        let next = if self.lives == 0 {
            Outcome::Lost
        } else if self.grid.all_pellets_collected() {
            Outcome::Won
        } else {
            Outcome::Playing
        };
        if next == self.outcome {
            return;
        }
        self.outcome = next;
        self.events.push(RuntimeEvent::OutcomeChanged { outcome: next });
        info!(
            outcome = ?next,
            score = self.score,
            lives = self.lives,
            ticks = self.tick_counter,
            elapsed_ms = self.elapsed_ms,
            "session ended"
        );
    }
}

fn spawn_roster(config: &SessionConfig) -> Vec<Ghost> {
    config
        .ghosts
        .iter()
        .enumerate()
        .map(|(id, spec)| Ghost::from_spec(id, spec))
        .collect()
}
