use std::collections::HashSet;

use rand::Rng;

use crate::state::Task;

use super::RobotController;
use super::goals::Robots;

impl RobotController<'_> {
    /// Sit out a random number of ticks so robots retrying together drift apart.
    pub(super) fn back_off(&mut self) {
        self.robot.backoff = self.rng.random_range(0..=self.ctx.config.max_backoff);
    }

    pub(super) fn track_progress(&mut self) {
        if self.robot.position != self.robot.last_position || self.robot.is_formed() {
            self.robot.last_position = self.robot.position;
            self.robot.stuck_ticks = 0;
        } else {
            self.robot.stuck_ticks = self.robot.stuck_ticks.saturating_add(1);
        }
    }

    pub(super) fn is_stuck(&self) -> bool {
        let threshold = self.ctx.config.stuck_threshold;
        threshold > 0 && self.robot.stuck_ticks >= threshold
    }

    /// Retry the current goal with other robots treated as passable, or start over.
    pub(super) fn recover(&mut self) {
        tracing::warn!(
            "Robot {} stuck at {} for {} ticks while {}",
            self.robot.id,
            self.robot.position,
            self.robot.stuck_ticks,
            self.robot.task
        );
        self.robot.stuck_ticks = 0;
        self.robot.recoveries += 1;

        if let Some(task) = self.relaxed_plan() {
            tracing::debug!("Robot {} resumes on a relaxed route", self.robot.id);
            self.transition(task);
            return;
        }

        let fallback = if self.robot.is_carrying() {
            Task::PlanningDrop
        } else {
            Task::Searching
        };
        tracing::warn!("Robot {} has no relaxed route, resetting to {}", self.robot.id, fallback);
        self.transition(fallback);
        self.back_off();
    }

    /// Plan for the current goal category ignoring other robots. Walls and
    /// items stay impassable.
    fn relaxed_plan(&self) -> Option<Task> {
        let blocked = self.obstacles(Robots::Ignore);
        match &self.robot.task {
            Task::Searching | Task::GoingToBox { .. } => {
                let goals = self.pickup_cells(Robots::Ignore);
                self.route_with(&goals, &blocked).map(Task::going_to_box)
            }
            Task::PlanningDrop | Task::GoingToDrop { .. } => self
                .robot
                .task
                .target_pile()
                .into_iter()
                .chain(self.warehouse.piles().iter().copied())
                .find_map(|pile| {
                    self.route_to_pile(pile, Robots::Ignore, &blocked)
                        .map(|route| Task::going_to_drop(pile, route))
                }),
            Task::Forming { .. } => {
                let goals = HashSet::from([self.robot.formation_target]);
                self.route_with(&goals, &blocked).map(Task::forming)
            }
        }
    }
}
