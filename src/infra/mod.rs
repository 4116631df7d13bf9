mod default_observer;
mod game_observer;
mod pathfinding;
mod types;

pub use default_observer::DefaultObserver;
pub use game_observer::SimulationObserver;
pub use pathfinding::Bfs;
pub use types::{Bounds, Point, Position, RobotId};
