pub const PLAYER_STEP_MS: u64 = 100;
pub const FAST_GHOST_STEP_MS: u64 = 133;
pub const SLOW_GHOST_STEP_MS: u64 = 166;
pub const MAX_FRAME_DELTA_MS: u64 = 50;

pub const POWER_DURATION_MS: u64 = 4_000;
pub const INVINCIBLE_DURATION_MS: u64 = 2_000;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const GHOST_EATEN_SCORE: u32 = 200;

pub const STARTING_LIVES: u32 = 3;

pub const MAX_PATH_EXPANSIONS: usize = 100;
pub const PATH_FOLLOWER_CLOSE_RANGE: i32 = 4;

pub const PATROL_CHASE_DISTANCE: i32 = 5;
pub const PATROL_LOSE_DISTANCE: i32 = 10;

pub const REFERENCE_ROWS: i32 = 31;
pub const REFERENCE_COLS: i32 = 28;

// Smallest layout with interior cells inside the wall ring.
pub const MIN_LAYOUT_SIDE: i32 = 3;
pub const MAX_LAYOUT_SIDE: i32 = 1024;

pub fn reference_player_spawn(rows: i32, _cols: i32) -> (i32, i32) {
    (rows - 2, 2)
}

pub fn reference_ghost_spawns(rows: i32, cols: i32) -> [(i32, i32); 3] {
    [(2, cols - 3), (2, 2), (rows - 3, cols - 3)]
}
