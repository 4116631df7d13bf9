use std::collections::HashSet;

use crate::infra::{Bfs, Position};

use super::RobotController;

/// Whether other robots count as obstacles and occupied goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Robots {
    Avoid,
    Ignore,
}

impl RobotController<'_> {
    fn is_other_robot(&self, pos: &Position) -> bool {
        self.ctx
            .occupancy
            .get(pos)
            .is_some_and(|id| *id != self.robot.id)
    }

    /// No wall, no items, and (when avoiding robots) nobody else standing there.
    fn is_free(&self, pos: &Position, robots: Robots) -> bool {
        !self.warehouse.is_wall(pos)
            && !self.warehouse.has_items(pos)
            && (robots == Robots::Ignore || !self.is_other_robot(pos))
    }

    /// Walls, item cells and optionally other robots. The robot's own cell is
    /// never part of it.
    pub(super) fn obstacles(&self, robots: Robots) -> HashSet<Position> {
        let mut blocked: HashSet<Position> = self.warehouse.walls().iter().copied().collect();
        blocked.extend(self.warehouse.item_cells());
        if robots == Robots::Avoid {
            blocked.extend(
                self.ctx
                    .occupancy
                    .iter()
                    .filter(|(_, id)| **id != self.robot.id)
                    .map(|(pos, _)| *pos),
            );
        }
        blocked.remove(&self.robot.position);
        blocked
    }

    /// Free cells next to any loose item (items already on piles excluded).
    pub(super) fn pickup_cells(&self, robots: Robots) -> HashSet<Position> {
        self.warehouse
            .item_cells()
            .filter(|cell| !self.warehouse.is_destination(cell))
            .flat_map(|cell| self.warehouse.neighbors4(cell))
            .filter(|cell| self.is_free(cell, robots))
            .collect()
    }

    /// Free non-pile cells from which `pile` can be reached.
    pub(super) fn pile_access_cells(&self, pile: Position, robots: Robots) -> HashSet<Position> {
        self.warehouse
            .neighbors4(pile)
            .filter(|cell| !self.warehouse.is_destination(cell) && self.is_free(cell, robots))
            .collect()
    }

    /// Room left on `pile` and no other robot standing on it.
    pub(super) fn pile_accepts(&self, pile: &Position) -> bool {
        self.warehouse.pile_has_capacity(pile) && !self.is_other_robot(pile)
    }

    pub(super) fn route_with(
        &self,
        goals: &HashSet<Position>,
        blocked: &HashSet<Position>,
    ) -> Option<Vec<Position>> {
        Bfs::find_path(self.warehouse.bounds(), self.robot.position, goals, blocked)
    }

    pub(super) fn route_to(&self, goals: &HashSet<Position>, robots: Robots) -> Option<Vec<Position>> {
        self.route_with(goals, &self.obstacles(robots))
    }

    /// Route to a free cell next to `pile`, if the pile still accepts items.
    pub(super) fn route_to_pile(
        &self,
        pile: Position,
        robots: Robots,
        blocked: &HashSet<Position>,
    ) -> Option<Vec<Position>> {
        if !self.pile_accepts(&pile) {
            return None;
        }
        let goals = self.pile_access_cells(pile, robots);
        if goals.is_empty() {
            return None;
        }
        self.route_with(&goals, blocked)
    }
}
