use std::collections::HashSet;

use crate::error::InvariantViolation;
use crate::infra::{Point, Position, RobotId};

use super::RobotController;
use super::goals::Robots;
use crate::state::Task;

/// Why a step into the path head was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blockage {
    Wall,
    Claimed,
    Occupied(RobotId),
    Item,
}

impl RobotController<'_> {
    /// Advance toward the path head, or replan if the head is blocked.
    pub(super) fn follow_path(&mut self) -> Result<(), InvariantViolation> {
        let Some(head) = self.robot.task.path().and_then(|p| p.front().copied()) else {
            return Ok(());
        };

        if !self.robot.position.is_adjacent(&head) {
            return Err(InvariantViolation::NonAdjacentStep {
                robot: self.robot.id,
                from: self.robot.position,
                to: head,
            });
        }

        if let Some(blockage) = self.blockage(head) {
            tracing::debug!(
                "Robot {} at {} blocked entering {}: {:?}",
                self.robot.id,
                self.robot.position,
                head,
                blockage
            );
            self.replan_after_block();
            return Ok(());
        }

        if self.glide_towards(head) {
            self.robot.position = head;
            if let Some(path) = self.robot.task.path_mut() {
                path.pop_front();
            }
            self.robot.moves += 1;
            tracing::trace!("Robot {} entered {}", self.robot.id, head);
        }
        Ok(())
    }

    fn blockage(&self, cell: Position) -> Option<Blockage> {
        if self.warehouse.is_wall(&cell) {
            return Some(Blockage::Wall);
        }
        if !self.ctx.arbitration.permits(&cell, self.robot.id) {
            return Some(Blockage::Claimed);
        }
        if let Some(&occupant) = self.ctx.occupancy.get(&cell)
            && occupant != self.robot.id
        {
            return Some(Blockage::Occupied(occupant));
        }
        if self.warehouse.has_items(&cell) {
            return Some(Blockage::Item);
        }
        None
    }

    /// Move the continuous location toward `cell`. Returns true once snapped onto it.
    fn glide_towards(&mut self, cell: Position) -> bool {
        let config = self.ctx.config;
        let target = Point::from(cell);
        let location = &mut self.robot.location;

        let dist = location.distance(&target);
        if config.move_step <= 0.0 {
            location.x += (target.x - location.x) * 0.2;
            location.y += (target.y - location.y) * 0.2;
        } else if dist <= config.move_step {
            *location = target;
        } else {
            location.x += (target.x - location.x) / dist * config.move_step;
            location.y += (target.y - location.y) / dist * config.move_step;
        }

        if (location.x - target.x).abs() <= config.snap_threshold
            && (location.y - target.y).abs() <= config.snap_threshold
        {
            *location = target;
            return true;
        }
        false
    }

    /// Drift back onto the current cell after an interrupted move.
    pub(super) fn settle(&mut self) {
        let home = self.robot.position;
        if self.robot.location != Point::from(home) {
            self.glide_towards(home);
        }
    }

    /// Recompute a route to the same final cell, or give up on it.
    fn replan_after_block(&mut self) {
        let Some(goal) = self.robot.task.path().and_then(|p| p.back().copied()) else {
            return;
        };

        let goals = HashSet::from([goal]);
        match self.route_to(&goals, Robots::Avoid) {
            Some(route) if !route.is_empty() => {
                tracing::debug!(
                    "Robot {} replanned to {} ({} steps)",
                    self.robot.id,
                    goal,
                    route.len()
                );
                if let Some(path) = self.robot.task.path_mut() {
                    *path = route.into();
                }
            }
            _ => {
                tracing::debug!("Robot {} has no route to {}, backing off", self.robot.id, goal);
                self.robot.clear_path();
                self.back_off();
                if self.robot.is_carrying() {
                    self.transition(Task::PlanningDrop);
                }
            }
        }
    }
}
