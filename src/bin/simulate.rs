use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_muncher::autopilot::choose_direction;
use maze_muncher::config::{SessionConfig, SetupError};
use maze_muncher::constants::{REFERENCE_COLS, REFERENCE_ROWS};
use maze_muncher::rng::Rng;
use maze_muncher::session::Session;
use maze_muncher::types::{Outcome, Position, RuntimeEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_FRAME_MS: u64 = 16;
const DEFAULT_MAX_TICKS: u64 = 60_000;
const MAX_JITTER_FRAME_MS: usize = 80;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    frame_ms: Option<u64>,
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rows: Option<i32>,
    #[arg(long)]
    cols: Option<i32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum FramePacing {
    Fixed,
    Jittered,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u64,
    #[serde(rename = "frameMs")]
    frame_ms: u64,
    pacing: FramePacing,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u64,
    #[serde(rename = "frameMs")]
    frame_ms: u64,
    pacing: FramePacing,
    outcome: Outcome,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    ticks: u64,
    score: u32,
    lives: u32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "pelletsLeft")]
    pellets_left: usize,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    deaths: u32,
    #[serde(rename = "powerActivations")]
    power_activations: u32,
    #[serde(rename = "pathRecomputes")]
    path_recomputes: u32,
    #[serde(rename = "emptyRoutes")]
    empty_routes: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

#[derive(Clone, Debug)]
struct InvariantTracker {
    last_score: u32,
    last_lives: u32,
    last_pellets_left: usize,
}

impl InvariantTracker {
    fn new(snapshot: &Snapshot) -> Self {
        Self {
            last_score: snapshot.score,
            last_lives: snapshot.lives,
            last_pellets_left: snapshot.pellets_left,
        }
    }

    fn check(&mut self, snapshot: &Snapshot) -> Vec<String> {
        let mut anomalies = Vec::new();
        if snapshot.score < self.last_score {
            anomalies.push(format!(
                "score decreased: {} -> {}",
                self.last_score, snapshot.score
            ));
        }
        if snapshot.lives > self.last_lives {
            anomalies.push(format!(
                "lives increased: {} -> {}",
                self.last_lives, snapshot.lives
            ));
        }
        if snapshot.pellets_left > self.last_pellets_left {
            anomalies.push(format!(
                "pellets reappeared: {} -> {}",
                self.last_pellets_left, snapshot.pellets_left
            ));
        }
        if snapshot.outcome == Outcome::Lost && snapshot.lives > 0 {
            anomalies.push(format!("lost with {} lives left", snapshot.lives));
        }
        if snapshot.outcome == Outcome::Won && snapshot.pellets_left > 0 {
            anomalies.push(format!("won with {} pellets left", snapshot.pellets_left));
        }

        let player = Position::new(snapshot.player.row, snapshot.player.col);
        if is_wall(&snapshot.tiles, player) {
            anomalies.push(format!("player inside wall at ({}, {})", player.row, player.col));
        }
        for ghost in &snapshot.ghosts {
            if is_wall(&snapshot.tiles, Position::new(ghost.row, ghost.col)) {
                anomalies.push(format!(
                    "ghost {} inside wall at ({}, {})",
                    ghost.name, ghost.row, ghost.col
                ));
            }
        }

        self.last_score = snapshot.score;
        self.last_lives = snapshot.lives;
        self.last_pellets_left = snapshot.pellets_left;
        anomalies
    }
}

fn main() {
    let cli = Cli::parse();
    if cli.trace || std::env::var_os("RUST_LOG").is_some() {
        init_tracing();
    }

    let base_config = match load_base_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            emit_log(
                "error",
                "config_invalid",
                cli.match_id.as_deref().unwrap_or("sim"),
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let scenarios = resolve_scenarios(&cli);
    let started_at = timestamp();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "frameMs": scenario.frame_ms,
                "pacing": scenario.pacing,
                "maxTicks": scenario.max_ticks,
            }),
        );

        let scenario_run = match run_scenario(&scenario, &base_config) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_setup_failed",
                    &match_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.ticks),
            json!({
                "outcome": scenario_run.result.outcome,
                "score": scenario_run.result.score,
                "durationMs": scenario_run.result.duration_ms,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run);
    }

    let summary = build_run_summary(match_id.clone(), started_at, timestamp(), &scenario_results);

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maze_muncher=debug"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .with(filter)
        .init();
}

fn load_base_config(cli: &Cli) -> Result<SessionConfig, SetupError> {
    let config = match cli.config.as_deref() {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::reference(
            cli.rows.unwrap_or(REFERENCE_ROWS),
            cli.cols.unwrap_or(REFERENCE_COLS),
        ),
    };
    config.validate()?;
    Ok(config)
}

fn run_scenario(
    scenario: &Scenario,
    base_config: &SessionConfig,
) -> Result<ScenarioRunResult, SetupError> {
    let mut config = base_config.clone();
    config.seed = scenario.seed;
    let mut session = Session::new(config)?;
    let mut pacing_rng = Rng::new(scenario.seed ^ 0x5eed);
    let mut tracker = InvariantTracker::new(&session.build_snapshot(false));

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut power_activations = 0;
    let mut path_recomputes = 0;
    let mut empty_routes = 0;
    let mut timestamp_ms = 0u64;

    while !session.is_ended() && session.tick_count() < scenario.max_ticks {
        session.set_pending_direction(choose_direction(&session));
        match scenario.pacing {
            FramePacing::Fixed => {
                session.tick(scenario.frame_ms);
            }
            FramePacing::Jittered => {
                timestamp_ms += 1 + pacing_rng.pick_index(MAX_JITTER_FRAME_MS) as u64;
                session.tick_at(timestamp_ms);
            }
        }

        let snapshot = session.build_snapshot(true);
        for message in tracker.check(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        for event in &snapshot.events {
            match event {
                RuntimeEvent::PowerActivated { .. } => power_activations += 1,
                RuntimeEvent::PathRecomputed { len, .. } => {
                    path_recomputes += 1;
                    if *len == 0 {
                        empty_routes += 1;
                    }
                }
                _ => {}
            }
        }
    }

    let summary = session.build_summary();
    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            frame_ms: scenario.frame_ms,
            pacing: scenario.pacing,
            outcome: summary.outcome,
            duration_ms: summary.duration_ms,
            ticks: summary.ticks,
            score: summary.score,
            lives: summary.lives,
            pellets_eaten: summary.pellets_eaten,
            pellets_left: summary.pellets_left,
            ghosts_eaten: summary.ghosts_eaten,
            deaths: summary.deaths,
            power_activations,
            path_recomputes,
            empty_routes,
            anomalies,
        },
        anomaly_records,
    })
}

fn is_wall(tiles: &[String], pos: Position) -> bool {
    if pos.row < 0 || pos.col < 0 {
        return true;
    }
    tiles
        .get(pos.row as usize)
        .and_then(|row| row.chars().nth(pos.col as usize))
        .map(|tile| tile == '#')
        .unwrap_or(true)
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs());
    let max_ticks = cli.max_ticks.unwrap_or(DEFAULT_MAX_TICKS);

    if cli.single || cli.frame_ms.is_some() {
        let frame_ms = cli.frame_ms.unwrap_or(DEFAULT_FRAME_MS).max(1);
        return vec![Scenario {
            name: format!("custom-{frame_ms}ms"),
            seed,
            frame_ms,
            pacing: FramePacing::Fixed,
            max_ticks,
        }];
    }

    vec![
        Scenario {
            name: "steady-60fps".to_string(),
            seed,
            frame_ms: 16,
            pacing: FramePacing::Fixed,
            max_ticks,
        },
        Scenario {
            name: "steady-30fps".to_string(),
            seed: seed.wrapping_add(1),
            frame_ms: 33,
            pacing: FramePacing::Fixed,
            max_ticks,
        },
        Scenario {
            name: "jittered-frames".to_string(),
            seed: seed.wrapping_add(2),
            frame_ms: 0,
            pacing: FramePacing::Jittered,
            max_ticks,
        },
    ]
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u64, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    runs: &[ScenarioRunResult],
) -> RunSummary {
    let scenario_count = runs.len();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    for run in runs {
        *outcome_counts
            .entry(outcome_key(run.result.outcome).to_string())
            .or_insert(0) += 1;
    }
    let total_score: u64 = runs.iter().map(|run| run.result.score as u64).sum();
    let average_score = if scenario_count == 0 {
        0
    } else {
        (total_score / scenario_count as u64) as u32
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count: runs.iter().map(|run| run.anomaly_records.len()).sum(),
        average_score,
        outcome_counts,
        scenarios: runs.iter().map(|run| run.result.clone()).collect(),
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u64>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: timestamp(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn outcome_key(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Playing => "unfinished",
        Outcome::Won => "won",
        Outcome::Lost => "lost",
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
