use tracing::{debug, info};

use super::Session;
use crate::constants::GHOST_EATEN_SCORE;
use crate::types::RuntimeEvent;

impl Session {
    pub(super) fn resolve_collisions(&mut self) {
        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].position != self.player.position {
                continue;
            }
            if self.is_powered() {
                self.eat_ghost(idx);
            } else if self.invincible_remaining_ms == 0 {
                self.kill_player(idx);
                return;
            }
        }
    }

    fn eat_ghost(&mut self, idx: usize) {
        let ghost = &mut self.ghosts[idx];
        ghost.send_to_spawn();
        self.score = self.score.saturating_add(GHOST_EATEN_SCORE);
        self.stats.ghosts_eaten += 1;
        self.events.push(RuntimeEvent::GhostEaten {
            ghost_id: ghost.id,
            bonus: GHOST_EATEN_SCORE,
        });
        debug!(ghost = %ghost.name, score = self.score, "ghost eaten");
    }

    fn kill_player(&mut self, idx: usize) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.deaths += 1;
        let ghost_id = self.ghosts[idx].id;
        self.events.push(RuntimeEvent::PlayerDied {
            ghost_id,
            lives_left: self.lives,
        });
        info!(
            ghost = %self.ghosts[idx].name,
            lives_left = self.lives,
            tick = self.tick_counter,
            "player caught"
        );
        self.reset_after_death();
    }

    // Grid, score and power timer survive a death.
    fn reset_after_death(&mut self) {
        self.player.reset();
        self.invincible_remaining_ms = self.config.invincible_duration_ms;
        for ghost in &mut self.ghosts {
            ghost.reset();
        }
    }
}
