use maze_muncher::constants::{
    FAST_GHOST_STEP_MS, GHOST_EATEN_SCORE, PELLET_SCORE, POWER_DURATION_MS, POWER_PELLET_SCORE,
};
use maze_muncher::rng::Rng;
use maze_muncher::types::{GhostKind, RuntimeEvent};
use maze_muncher::{Direction, GhostSpec, Outcome, Position, Session, SessionConfig, SetupError};

fn aggressive(spawn: Position) -> GhostSpec {
    GhostSpec::new("John", "#ef4444", GhostKind::Aggressive, spawn)
}

fn corridor_config() -> SessionConfig {
    let mut tiles = vec!["##########".to_string(); 10];
    tiles[5] = "#........#".to_string();
    let mut config = SessionConfig::with_layout(&tiles, Position::new(5, 1));
    config.ghosts = vec![aggressive(Position::new(5, 6))];
    config
}

#[test]
fn aggressive_ghost_closes_a_corridor_one_cell_per_step() {
    let mut config = corridor_config();
    // One fast-ghost step per tick.
    config.max_frame_delta_ms = FAST_GHOST_STEP_MS;
    let mut session = Session::new(config).expect("corridor config should be valid");
    let player = session.player_position();

    for expected in (1..=4).rev() {
        session.tick(FAST_GHOST_STEP_MS);
        assert_eq!(session.ghosts()[0].position.manhattan(player), expected);
        assert_eq!(session.lives(), 3);
    }

    session.tick(FAST_GHOST_STEP_MS);
    assert_eq!(session.lives(), 2);
    assert_eq!(session.ghosts()[0].position, Position::new(5, 6));
    assert_eq!(session.player_position(), player);
    let events = session.build_snapshot(true).events;
    assert!(events
        .iter()
        .any(|event| matches!(event, RuntimeEvent::PlayerDied { ghost_id: 0, lives_left: 2 })));
}

#[test]
fn power_pellet_turns_the_next_contact_into_a_bonus() {
    let mut config = SessionConfig::with_layout(
        &["#####", "#o..#", "#.###", "#####"],
        Position::new(1, 2),
    );
    config.ghosts = vec![aggressive(Position::new(2, 1))];
    let mut session = Session::new(config).expect("config should be valid");
    session.set_pending_direction(Direction::Left);

    // Player steps at 100ms, the ghost first moves at 133ms.
    session.tick(50);
    session.tick(50);
    assert_eq!(session.player_position(), Position::new(1, 1));
    assert_eq!(session.power_remaining_ms(), POWER_DURATION_MS);
    assert_eq!(session.score(), POWER_PELLET_SCORE);

    // Cornered, the frightened ghost can only retreat onto the player.
    session.tick(50);
    assert_eq!(session.score(), POWER_PELLET_SCORE + GHOST_EATEN_SCORE);
    assert_eq!(session.lives(), 3);
    assert_eq!(session.ghosts()[0].position, Position::new(2, 1));
    assert_eq!(session.build_summary().ghosts_eaten, 1);
}

#[test]
fn losing_the_last_life_freezes_the_session() {
    let mut config = corridor_config();
    config.starting_lives = 2;
    config.ghosts = vec![aggressive(Position::new(5, 3))];
    let mut session = Session::new(config).expect("corridor config should be valid");

    let mut ticks = 0;
    while session.tick(50) == Outcome::Playing {
        ticks += 1;
        assert!(ticks < 2_000, "session never ended");
    }
    assert_eq!(session.outcome(), Outcome::Lost);
    assert_eq!(session.lives(), 0);
    assert_eq!(session.build_summary().deaths, 2);

    let before = session.build_snapshot(false);
    session.set_pending_direction(Direction::Right);
    for _ in 0..50 {
        assert_eq!(session.tick(50), Outcome::Lost);
    }
    let after = session.build_snapshot(false);
    assert_eq!(after.tick, before.tick);
    assert_eq!(after.score, before.score);
    assert_eq!(after.tiles, before.tiles);
    assert_eq!((after.player.row, after.player.col), (before.player.row, before.player.col));
    assert_eq!(after.player.pending, before.player.pending);
    assert_eq!(after.invincible_remaining_ms, before.invincible_remaining_ms);
    assert_eq!(after.power_remaining_ms, before.power_remaining_ms);
    let ghost_cells =
        |snapshot: &maze_muncher::types::Snapshot| -> Vec<(i32, i32)> {
            snapshot.ghosts.iter().map(|ghost| (ghost.row, ghost.col)).collect()
        };
    assert_eq!(ghost_cells(&after), ghost_cells(&before));
}

#[test]
fn collecting_everything_wins() {
    let mut config = SessionConfig::with_layout(
        &[
            "#########", //
            "# .o...##", //
            "####### #", //
            "#########",
        ],
        Position::new(1, 1),
    );
    // Sealed in its own pocket.
    config.ghosts = vec![aggressive(Position::new(2, 7))];
    let mut session = Session::new(config).expect("config should be valid");
    session.set_pending_direction(Direction::Right);

    let mut ticks = 0;
    while session.tick(16) == Outcome::Playing {
        ticks += 1;
        assert!(ticks < 1_000, "session never ended");
    }
    assert_eq!(session.outcome(), Outcome::Won);
    assert_eq!(session.score(), 4 * PELLET_SCORE + POWER_PELLET_SCORE);
    assert_eq!(session.lives(), 3);
    assert!(session.grid().all_pellets_collected());
}

#[test]
fn score_never_drops_and_lives_never_grow() {
    let turns = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
    for seed in 0..20u64 {
        let mut config = SessionConfig::default();
        config.seed = seed;
        let mut session = Session::new(config).expect("reference config");
        let mut input = Rng::new(seed);
        let mut last = (session.score(), session.lives());

        for tick in 0..3_000 {
            if tick % 25 == 0 {
                session.set_pending_direction(turns[input.pick_index(turns.len())]);
            }
            session.tick(1 + input.pick_index(60) as u64);
            let now = (session.score(), session.lives());
            assert!(now.0 >= last.0, "seed={seed} tick={tick}");
            assert!(now.1 <= last.1, "seed={seed} tick={tick}");
            assert!(session.grid().is_passable(session.player_position()));
            for ghost in session.ghosts() {
                assert!(session.grid().is_passable(ghost.position), "seed={seed}");
            }
            last = now;
        }
    }
}

#[test]
fn identical_inputs_replay_identically() {
    let replay = |seed: u64| {
        let mut config = SessionConfig::default();
        config.seed = seed;
        let mut session = Session::new(config).expect("reference config");
        let mut input = Rng::new(seed.wrapping_mul(31));
        let mut timestamp = 0u64;
        for tick in 0..2_000u64 {
            if tick % 30 == 0 {
                session.set_pending_direction(Direction::MOVES[input.pick_index(4)]);
            }
            timestamp += 1 + input.pick_index(40) as u64;
            session.tick_at(timestamp);
        }
        serde_json::to_value(session.build_snapshot(true)).expect("snapshot should serialize")
    };
    for seed in [3u64, 17, 99] {
        assert_eq!(replay(seed), replay(seed));
    }
}

#[test]
fn json_config_drives_a_custom_session() {
    let raw = serde_json::json!({
        "layout": ["#######", "#.....#", "#.###.#", "#.....#", "#######"],
        "playerSpawn": { "row": 1, "col": 1 },
        "ghosts": [
            { "name": "Kevin", "color": "#22d3ee", "kind": "patrol", "spawn": { "row": 3, "col": 5 } }
        ],
        "startingLives": 1,
        "seed": 5
    })
    .to_string();
    let config = SessionConfig::from_json_str(&raw).expect("config should parse");
    assert_eq!(config.ghosts[0].chase_distance, 5);
    let session = Session::new(config).expect("config should be valid");
    assert_eq!(session.lives(), 1);
    assert_eq!(session.grid().pellets_left(), 12);
}

#[test]
fn unwinnable_layouts_are_rejected() {
    let mut config = SessionConfig::with_layout(
        &["#######", "#..#..#", "#######"],
        Position::new(1, 1),
    );
    config.ghosts = vec![aggressive(Position::new(1, 2))];
    assert!(matches!(
        Session::new(config),
        Err(SetupError::UnreachablePellet { .. })
    ));
}
