use std::env;
use std::fmt;
use std::str::FromStr;

use crate::infra::{Bounds, Position, RobotId};

const ENV_PREFIX: &str = "STACKBOT_";

fn get_env_var<T: FromStr>(key: &str) -> Option<T> {
    let name = format!("{ENV_PREFIX}{key}");
    let raw = env::var(&name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value {:?} for {}", raw, name);
            None
        }
    }
}

/// Maps a robot id to the cell it lines up on once all items are stored.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FormationLayout {
    /// Fill the top row left to right, wrapping onto the next row.
    TopRow,
    /// Fill the left column top to bottom, wrapping onto the next column.
    LeftColumn,
    /// Caller-supplied mapping `(id, width, height) -> cell`.
    Custom(fn(RobotId, i32, i32) -> Position),
}

impl FormationLayout {
    /// Raw target for `id`, clamped to the grid.
    pub fn target(&self, id: RobotId, width: i32, height: i32) -> Position {
        let id = id as i32;
        let raw = match self {
            FormationLayout::TopRow => Position::new(id % width, id / width),
            FormationLayout::LeftColumn => Position::new(id / height, id % height),
            FormationLayout::Custom(mapping) => mapping(id as RobotId, width, height),
        };
        Bounds::from_size(width, height).clamp(raw)
    }
}

impl fmt::Debug for FormationLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationLayout::TopRow => f.write_str("TopRow"),
            FormationLayout::LeftColumn => f.write_str("LeftColumn"),
            FormationLayout::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl FromStr for FormationLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top-row" | "top_row" | "row" => Ok(FormationLayout::TopRow),
            "left-column" | "left_column" | "column" => Ok(FormationLayout::LeftColumn),
            other => Err(format!("unknown formation layout '{other}'")),
        }
    }
}

/// Tunables of the coordination core.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub pile_capacity: u32,
    /// Distance covered per tick while moving, in cells.
    pub move_step: f32,
    /// Distance at which a moving robot snaps onto its target cell.
    pub snap_threshold: f32,
    /// Ticks without changing cell before stuck recovery kicks in.
    pub stuck_threshold: u32,
    /// Upper bound (inclusive) of the random backoff after a failed plan.
    pub max_backoff: u32,
    /// Seed for the backoff RNG.
    pub seed: u64,
    pub formation: FormationLayout,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pile_capacity: 5,
            move_step: 3.0 / 32.0,
            snap_threshold: 1.0 / 32.0,
            stuck_threshold: 90,
            max_backoff: 3,
            seed: 0,
            formation: FormationLayout::TopRow,
        }
    }
}

impl SimulationConfig {
    /// Defaults overridden by `STACKBOT_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pile_capacity: get_env_var("PILE_CAPACITY").unwrap_or(defaults.pile_capacity),
            move_step: get_env_var("MOVE_STEP").unwrap_or(defaults.move_step),
            snap_threshold: get_env_var("SNAP_THRESHOLD").unwrap_or(defaults.snap_threshold),
            stuck_threshold: get_env_var("STUCK_TICKS").unwrap_or(defaults.stuck_threshold),
            max_backoff: get_env_var("MAX_BACKOFF").unwrap_or(defaults.max_backoff),
            seed: get_env_var("SEED").unwrap_or_else(rand::random),
            formation: get_env_var("FORMATION").unwrap_or(defaults.formation),
        }
    }
}

/// Settings of the headless runner and its random layout.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub width: i32,
    pub height: i32,
    pub boxes: usize,
    pub robots: usize,
    pub walls: usize,
    pub max_ticks: u64,
    /// Print the ASCII map every N ticks, 0 disables it.
    pub map_every: u64,
    pub layout_seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 15,
            boxes: 30,
            robots: 5,
            walls: 0,
            // 90 seconds at 30 ticks per second
            max_ticks: 2700,
            map_every: 0,
            layout_seed: 0,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            width: get_env_var("WIDTH").unwrap_or(defaults.width),
            height: get_env_var("HEIGHT").unwrap_or(defaults.height),
            boxes: get_env_var("BOXES").unwrap_or(defaults.boxes),
            robots: get_env_var("ROBOTS").unwrap_or(defaults.robots),
            walls: get_env_var("WALLS").unwrap_or(defaults.walls),
            max_ticks: get_env_var("MAX_TICKS").unwrap_or(defaults.max_ticks),
            map_every: get_env_var("MAP_EVERY").unwrap_or(defaults.map_every),
            layout_seed: get_env_var("LAYOUT_SEED").unwrap_or_else(rand::random),
        }
    }
}
