pub mod config;
mod controller;
pub mod error;
mod game;
pub mod infra;
pub mod layout;
pub mod simulation;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{FormationLayout, RunConfig, SimulationConfig};
pub use error::{ConfigError, InvariantViolation, SimulationError};
pub use game::{Game, RunStatus, RunSummary};
pub use infra::{DefaultObserver, Position, SimulationObserver};
pub use layout::Layout;
pub use simulation::{Simulation, TickResult};
