pub mod autopilot;
pub mod behavior;
pub mod clock;
pub mod config;
pub mod constants;
pub mod ghost;
pub mod maze;
pub mod pathfinding;
pub mod player;
pub mod rng;
pub mod session;
pub mod types;

pub use config::{GhostSpec, SessionConfig, SetupError};
pub use session::Session;
pub use types::{Direction, Outcome, Position};
