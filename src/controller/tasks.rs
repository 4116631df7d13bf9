use std::collections::HashSet;

use crate::error::InvariantViolation;
use crate::infra::Position;
use crate::state::{Path, Task};

use super::RobotController;
use super::goals::Robots;

impl RobotController<'_> {
    pub(super) fn search(&mut self) {
        let goals = self.pickup_cells(Robots::Avoid);
        if goals.is_empty() {
            tracing::debug!("Robot {} found no items to fetch", self.robot.id);
            self.transition(Task::forming(Path::new()));
            return;
        }

        match self.route_to(&goals, Robots::Avoid) {
            Some(route) => self.transition(Task::going_to_box(route)),
            None => {
                tracing::debug!(
                    "Robot {} cannot reach any of {} pickup cells",
                    self.robot.id,
                    goals.len()
                );
                self.back_off();
            }
        }
    }

    /// Path exhausted next to an item: take it, or go back to searching if it is gone.
    pub(super) fn pick_up(&mut self) -> Result<(), InvariantViolation> {
        let source = self
            .warehouse
            .neighbors4(self.robot.position)
            .find(|cell| !self.warehouse.is_destination(cell) && self.warehouse.has_items(cell));

        match source {
            Some(cell) => {
                self.warehouse.decrement_at(cell)?;
                tracing::info!(
                    "Robot {} picked up an item at {} ({} left there)",
                    self.robot.id,
                    cell,
                    self.warehouse.item_count(&cell)
                );
                self.transition(Task::PlanningDrop);
            }
            None => {
                tracing::debug!("Robot {} arrived but the item is gone", self.robot.id);
                self.transition(Task::Searching);
            }
        }
        Ok(())
    }

    /// Pick the first pile, in priority order, that has room and a reachable free neighbor.
    pub(super) fn plan_drop(&mut self) {
        let blocked = self.obstacles(Robots::Avoid);
        let piles = self.warehouse.piles().to_vec();
        for pile in piles {
            if let Some(route) = self.route_to_pile(pile, Robots::Avoid, &blocked) {
                self.transition(Task::going_to_drop(pile, route));
                return;
            }
        }

        tracing::debug!("Robot {} has nowhere to drop, waiting", self.robot.id);
        self.back_off();
    }

    /// Path exhausted next to `pile`: drop, or redirect if the pile filled up
    /// or another robot stands on it.
    pub(super) fn drop_item(&mut self, pile: Position) -> Result<(), InvariantViolation> {
        if self.pile_accepts(&pile) {
            if self.robot.position.is_adjacent(&pile) {
                self.warehouse.increment_at(pile)?;
                tracing::info!(
                    "Robot {} dropped an item on pile {} ({}/{})",
                    self.robot.id,
                    pile,
                    self.warehouse.item_count(&pile),
                    self.warehouse.pile_capacity()
                );
                self.transition(Task::Searching);
            } else {
                tracing::debug!("Robot {} is not next to pile {}", self.robot.id, pile);
                self.transition(Task::PlanningDrop);
            }
            return Ok(());
        }

        tracing::debug!("Pile {} no longer takes items from robot {}", pile, self.robot.id);
        match self.alternate_pile(pile) {
            Some((alternate, route)) => self.transition(Task::going_to_drop(alternate, route)),
            None => {
                self.transition(Task::PlanningDrop);
                self.back_off();
            }
        }
        Ok(())
    }

    /// Nearest reachable pile with room, scanning outward from `full`.
    fn alternate_pile(&self, full: Position) -> Option<(Position, Vec<Position>)> {
        let piles = self.warehouse.piles();
        let origin = piles.iter().position(|p| *p == full)?;
        let blocked = self.obstacles(Robots::Avoid);
        outward_order(origin, piles.len())
            .into_iter()
            .map(|i| piles[i])
            .find_map(|pile| {
                self.route_to_pile(pile, Robots::Avoid, &blocked)
                    .map(|route| (pile, route))
            })
    }

    pub(super) fn form(&mut self) {
        if !self.pickup_cells(Robots::Avoid).is_empty() {
            tracing::debug!("Robot {} sees items left, searching again", self.robot.id);
            self.transition(Task::Searching);
            return;
        }

        let target = self.robot.formation_target;
        if self.robot.position == target {
            return;
        }

        // Formation cells are per robot; contention is left to arbitration.
        let goals = HashSet::from([target]);
        match self.route_to(&goals, Robots::Ignore) {
            Some(route) => self.robot.task = Task::forming(route),
            None => {
                tracing::debug!("Robot {} cannot reach formation cell {}", self.robot.id, target);
                self.back_off();
            }
        }
    }
}

/// Indices at increasing distance from `origin`, right side first on ties.
fn outward_order(origin: usize, len: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len.saturating_sub(1));
    for distance in 1..len {
        if origin + distance < len {
            order.push(origin + distance);
        }
        if distance <= origin {
            order.push(origin - distance);
        }
    }
    order
}
