//! Tick coordination across all robots.

mod arbitration;

pub use arbitration::ArbitrationMap;

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::SimulationConfig;
use crate::controller::{RobotController, TickContext};
use crate::error::{ConfigError, InvariantViolation};
use crate::infra::{Bfs, Position, RobotId};
use crate::layout::Layout;
use crate::state::{Robot, Warehouse};

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickResult {
    pub tick: u64,
    /// Discrete cell changes made this tick.
    pub moves: usize,
    /// Cells that more than one robot wanted to enter.
    pub contested_cells: usize,
    /// True only on the tick that first reaches completion.
    pub completed: bool,
}

pub struct Simulation {
    config: SimulationConfig,
    warehouse: Warehouse,
    robots: Vec<Robot>,
    rng: StdRng,
    tick: u64,
    total_moves: u64,
    completed: bool,
}

impl Simulation {
    /// Validate `layout` and build the initial state. Robots start in `Searching`.
    pub fn initialize(layout: &Layout, config: SimulationConfig) -> Result<Self, ConfigError> {
        let mut warehouse = Warehouse::new(
            layout.width,
            layout.height,
            &layout.walls,
            &layout.destinations,
            config.pile_capacity,
        )?;
        for &(pos, count) in &layout.items {
            warehouse.stock(pos, count)?;
        }

        let mut occupied = HashSet::new();
        for &pos in &layout.robots {
            if !warehouse.in_bounds(&pos) {
                return Err(ConfigError::OutOfBounds {
                    what: "robot",
                    pos,
                    width: layout.width,
                    height: layout.height,
                });
            }
            if warehouse.is_wall(&pos) {
                return Err(ConfigError::RobotOnWall(pos));
            }
            if warehouse.has_items(&pos) {
                return Err(ConfigError::RobotOnItem(pos));
            }
            if !occupied.insert(pos) {
                return Err(ConfigError::DuplicateRobotCell(pos));
            }
        }

        let mut taken = HashSet::new();
        let robots = layout
            .robots
            .iter()
            .enumerate()
            .map(|(id, &pos)| {
                let raw = config.formation.target(id, layout.width, layout.height);
                let target = resolve_formation_target(&warehouse, pos, raw, &taken);
                taken.insert(target);
                tracing::debug!("Robot {} starts at {}, forms at {}", id, pos, target);
                Robot::new(id, pos, target)
            })
            .collect();

        tracing::info!(
            "Warehouse {}x{}: {} walls, {} piles, {} items, {} robots",
            layout.width,
            layout.height,
            warehouse.walls().len(),
            warehouse.piles().len(),
            warehouse.total_items(),
            layout.robots.len()
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            warehouse,
            robots,
            tick: 0,
            total_moves: 0,
            completed: false,
        })
    }

    /// Advance every robot by one step.
    ///
    /// Intentions are arbitrated first (lowest id wins), then robots update in
    /// id order against the occupancy as of the start of the tick. Once
    /// completion has been signaled further calls are no-ops.
    pub fn tick(&mut self) -> Result<TickResult, InvariantViolation> {
        if self.completed {
            return Ok(TickResult {
                tick: self.tick,
                ..TickResult::default()
            });
        }
        self.tick += 1;

        let arbitration = ArbitrationMap::build(
            self.robots
                .iter()
                .filter_map(|r| r.intended_cell().map(|cell| (r.id, cell))),
        );
        let occupancy: HashMap<Position, RobotId> =
            self.robots.iter().map(|r| (r.position, r.id)).collect();
        let ctx = TickContext {
            arbitration: &arbitration,
            occupancy: &occupancy,
            config: &self.config,
        };

        let mut moves = 0;
        for robot in self.robots.iter_mut() {
            let before = robot.moves;
            RobotController::new(robot, &mut self.warehouse, &ctx, &mut self.rng).update()?;
            moves += (robot.moves - before) as usize;
        }
        self.total_moves += moves as u64;

        let completed = self.check_completion();
        if completed {
            self.completed = true;
            tracing::info!(
                "All items stored and robots formed after {} ticks ({} moves)",
                self.tick,
                self.total_moves
            );
        }

        Ok(TickResult {
            tick: self.tick,
            moves,
            contested_cells: arbitration.contested_cells(),
            completed,
        })
    }

    fn check_completion(&self) -> bool {
        self.warehouse.items_outside_piles() == 0
            && self.robots.iter().all(|r| !r.is_carrying() && r.is_formed())
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(id)
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn total_moves(&self) -> u64 {
        self.total_moves
    }

    /// Items on the grid plus items being carried.
    pub fn total_items(&self) -> u32 {
        let carried = self.robots.iter().filter(|r| r.is_carrying()).count() as u32;
        self.warehouse.total_items() + carried
    }

    pub fn draw_ascii_map(&self) -> String {
        const RESET: &str = "\x1b[0m";
        const ROBOT: &str = "\x1b[1;33m"; // Bright yellow
        const CARRYING: &str = "\x1b[1;36m"; // Bright cyan
        const WALL: &str = "\x1b[90m"; // Dark gray
        const PILE: &str = "\x1b[1;32m"; // Bright green
        const ITEM: &str = "\x1b[33m"; // Yellow
        const EMPTY: &str = "\x1b[90m"; // Dark gray

        let positions: HashMap<Position, &Robot> =
            self.robots.iter().map(|r| (r.position, r)).collect();
        let digit = |count: u32| char::from_digit(count, 10).unwrap_or('+');

        let mut output = String::new();
        for y in 0..self.warehouse.height {
            for x in 0..self.warehouse.width {
                let pos = Position::new(x, y);
                let count = self.warehouse.item_count(&pos);
                let _ = if let Some(robot) = positions.get(&pos) {
                    let color = if robot.is_carrying() { CARRYING } else { ROBOT };
                    write!(output, "{}{}{}", color, robot.id % 10, RESET)
                } else if self.warehouse.is_wall(&pos) {
                    write!(output, "{}█{}", WALL, RESET)
                } else if self.warehouse.is_destination(&pos) {
                    write!(output, "{}{}{}", PILE, digit(count), RESET)
                } else if count > 0 {
                    write!(output, "{}{}{}", ITEM, digit(count), RESET)
                } else {
                    write!(output, "{}·{}", EMPTY, RESET)
                };
            }
            output.push('\n');
        }
        output
    }
}

/// Nearest cell to `raw` that `start` can reach past the walls, is not a pile
/// and is not yet assigned. Falls back to `start`.
fn resolve_formation_target(
    warehouse: &Warehouse,
    start: Position,
    raw: Position,
    taken: &HashSet<Position>,
) -> Position {
    Bfs::reachable(warehouse.bounds(), start, warehouse.walls())
        .into_iter()
        .filter(|cell| !warehouse.is_destination(cell) && !taken.contains(cell))
        .min_by_key(|cell| (cell.distance(&raw), cell.y, cell.x))
        .unwrap_or(start)
}
