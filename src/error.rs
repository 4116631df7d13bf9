//! Error types for the warehouse simulation.

use thiserror::Error;

use crate::infra::Position;

/// Invalid simulation input. Raised once, at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Grid with no cells.
    #[error("grid must have at least one cell, got {width}x{height}")]
    ZeroSizeGrid { width: i32, height: i32 },

    /// A placement lies outside the grid.
    #[error("{what} at {pos} is outside the {width}x{height} grid")]
    OutOfBounds {
        what: &'static str,
        pos: Position,
        width: i32,
        height: i32,
    },

    #[error("cell {0} is both a wall and a destination")]
    WallDestinationOverlap(Position),

    #[error("item placed on wall cell {0}")]
    ItemOnWall(Position),

    #[error("robot placed on wall cell {0}")]
    RobotOnWall(Position),

    #[error("robot placed on item cell {0}")]
    RobotOnItem(Position),

    #[error("more than one robot placed on cell {0}")]
    DuplicateRobotCell(Position),

    #[error("pile at {pos} starts with {count} items, capacity is {capacity}")]
    PileOverCapacity {
        pos: Position,
        count: u32,
        capacity: u32,
    },

    #[error("pile capacity must be at least 1")]
    ZeroPileCapacity,

    /// The layout generator ran out of free cells.
    #[error("could only place {placed} of {requested} {what}")]
    InsufficientSpace {
        what: &'static str,
        requested: usize,
        placed: usize,
    },
}

/// Broken core invariant. These indicate a logic bug, never a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("cannot take an item from empty cell {0}")]
    EmptyCell(Position),

    #[error("pile at {pos} is already at capacity {capacity}")]
    CapacityExceeded { pos: Position, capacity: u32 },

    #[error("cell {0} is a wall and cannot hold items")]
    ItemOnWall(Position),

    #[error("cell {0} is outside the grid")]
    OutOfGrid(Position),

    #[error("robot {robot} at {from} cannot step to non-adjacent cell {to}")]
    NonAdjacentStep {
        robot: usize,
        from: Position,
        to: Position,
    },
}

/// Any failure the simulation can report to its caller.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialize(fail: bool) -> Result<(), ConfigError> {
        if fail {
            return Err(ConfigError::ZeroPileCapacity);
        }
        Ok(())
    }

    fn step() -> Result<(), InvariantViolation> {
        Err(InvariantViolation::EmptyCell(Position::new(1, 2)))
    }

    fn initialize_then_step(fail_on_init: bool) -> Result<(), SimulationError> {
        initialize(fail_on_init)?;
        step()?;
        Ok(())
    }

    #[test]
    fn test_simulation_error_wraps_both_kinds() {
        let err = initialize_then_step(true).unwrap_err();
        assert!(matches!(err, SimulationError::Config(ConfigError::ZeroPileCapacity)));
        assert_eq!(
            err.to_string(),
            "configuration error: pile capacity must be at least 1"
        );

        let err = initialize_then_step(false).unwrap_err();
        assert!(matches!(err, SimulationError::Invariant(InvariantViolation::EmptyCell(_))));
        assert_eq!(
            err.to_string(),
            "invariant violation: cannot take an item from empty cell (1, 2)"
        );
    }
}
