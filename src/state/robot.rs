use std::collections::VecDeque;
use std::fmt;

use crate::infra::{Point, Position, RobotId};

/// Planned cells to visit, current cell excluded.
pub type Path = VecDeque<Position>;

/// Task state machine. Per-state data lives on the variant, so a robot can
/// only carry a path or a target pile in states where they mean something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Looking for a reachable cell next to a loose item.
    Searching,
    /// Walking to a cell next to an item; picks it up when the path runs out.
    GoingToBox { path: Path },
    /// Holding an item, choosing a pile.
    PlanningDrop,
    /// Holding an item, walking to a cell next to `pile`.
    GoingToDrop { pile: Position, path: Path },
    /// All work done, walking to the robot's formation cell.
    Forming { path: Path },
}

impl Task {
    pub fn going_to_box(path: impl Into<Path>) -> Self {
        Task::GoingToBox { path: path.into() }
    }

    pub fn going_to_drop(pile: Position, path: impl Into<Path>) -> Self {
        Task::GoingToDrop {
            pile,
            path: path.into(),
        }
    }

    pub fn forming(path: impl Into<Path>) -> Self {
        Task::Forming { path: path.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::Searching => "searching",
            Task::GoingToBox { .. } => "going-to-box",
            Task::PlanningDrop => "planning-drop",
            Task::GoingToDrop { .. } => "going-to-drop",
            Task::Forming { .. } => "forming",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Task::GoingToBox { path } | Task::GoingToDrop { path, .. } | Task::Forming { path } => {
                Some(path)
            }
            Task::Searching | Task::PlanningDrop => None,
        }
    }

    pub fn path_mut(&mut self) -> Option<&mut Path> {
        match self {
            Task::GoingToBox { path } | Task::GoingToDrop { path, .. } | Task::Forming { path } => {
                Some(path)
            }
            Task::Searching | Task::PlanningDrop => None,
        }
    }

    pub fn has_path(&self) -> bool {
        self.path().is_some_and(|p| !p.is_empty())
    }

    pub fn is_carrying(&self) -> bool {
        matches!(self, Task::PlanningDrop | Task::GoingToDrop { .. })
    }

    pub fn target_pile(&self) -> Option<Position> {
        match self {
            Task::GoingToDrop { pile, .. } => Some(*pile),
            _ => None,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One robot's record in the simulation arena. Only its own controller writes it.
#[derive(Debug, Clone)]
pub struct Robot {
    pub id: RobotId,
    pub position: Position,
    /// Interpolated position for display, in cell units.
    pub location: Point,
    pub task: Task,
    pub formation_target: Position,
    pub moves: u64,
    /// Ticks left to sit out before acting again.
    pub backoff: u32,
    /// Consecutive ticks spent on `last_position` while having work to do.
    pub stuck_ticks: u32,
    pub last_position: Position,
    pub recoveries: u32,
}

impl Robot {
    pub fn new(id: RobotId, position: Position, formation_target: Position) -> Self {
        Self {
            id,
            position,
            location: Point::from(position),
            task: Task::Searching,
            formation_target,
            moves: 0,
            backoff: 0,
            stuck_ticks: 0,
            last_position: position,
            recoveries: 0,
        }
    }

    pub fn is_carrying(&self) -> bool {
        self.task.is_carrying()
    }

    /// Cell this robot wants to enter this tick, if any.
    pub fn intended_cell(&self) -> Option<Position> {
        if self.backoff > 0 {
            return None;
        }
        self.task.path().and_then(|p| p.front().copied())
    }

    /// Standing on its formation cell with nothing left to walk.
    pub fn is_formed(&self) -> bool {
        matches!(&self.task, Task::Forming { path } if path.is_empty())
            && self.position == self.formation_target
    }

    pub fn clear_path(&mut self) {
        if let Some(path) = self.task.path_mut() {
            path.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrying_follows_task() {
        assert!(!Task::Searching.is_carrying());
        assert!(!Task::going_to_box(vec![]).is_carrying());
        assert!(Task::PlanningDrop.is_carrying());
        assert!(Task::going_to_drop(Position::new(0, 4), vec![]).is_carrying());
        assert!(!Task::forming(vec![]).is_carrying());
    }

    #[test]
    fn test_intended_cell_is_path_head() {
        let mut robot = Robot::new(3, Position::new(1, 1), Position::new(3, 0));
        assert_eq!(robot.intended_cell(), None);

        robot.task = Task::going_to_box(vec![Position::new(1, 2), Position::new(1, 3)]);
        assert_eq!(robot.intended_cell(), Some(Position::new(1, 2)));

        robot.backoff = 2;
        assert_eq!(robot.intended_cell(), None);
    }

    #[test]
    fn test_formed_requires_target_and_empty_path() {
        let target = Position::new(0, 0);
        let mut robot = Robot::new(0, Position::new(0, 1), target);
        robot.task = Task::forming(vec![target]);
        assert!(!robot.is_formed());

        robot.position = target;
        robot.clear_path();
        assert!(robot.is_formed());
    }
}
