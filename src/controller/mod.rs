//! Per-robot task logic.
//!
//! A `RobotController` is a short-lived view over one robot's record, the
//! shared warehouse and the tick context. The simulation creates one per robot
//! per tick, in id order.

mod goals;
mod movement;
mod recovery;
mod tasks;

use std::collections::HashMap;

use rand::rngs::StdRng;

use crate::config::SimulationConfig;
use crate::error::InvariantViolation;
use crate::infra::{Position, RobotId};
use crate::simulation::ArbitrationMap;
use crate::state::{Robot, Task, Warehouse};

/// Read-only state shared by every controller during one tick.
pub struct TickContext<'a> {
    pub arbitration: &'a ArbitrationMap,
    /// Robot cells as of the start of the tick.
    pub occupancy: &'a HashMap<Position, RobotId>,
    pub config: &'a SimulationConfig,
}

pub struct RobotController<'a> {
    robot: &'a mut Robot,
    warehouse: &'a mut Warehouse,
    ctx: &'a TickContext<'a>,
    rng: &'a mut StdRng,
}

impl<'a> RobotController<'a> {
    pub fn new(
        robot: &'a mut Robot,
        warehouse: &'a mut Warehouse,
        ctx: &'a TickContext<'a>,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            robot,
            warehouse,
            ctx,
            rng,
        }
    }

    /// Run one tick of this robot: back off, recover, move, or act on its task.
    #[tracing::instrument(level = "trace", skip(self), fields(robot = self.robot.id, task = %self.robot.task))]
    pub fn update(&mut self) -> Result<(), InvariantViolation> {
        let result = self.step();
        self.track_progress();
        result
    }

    fn step(&mut self) -> Result<(), InvariantViolation> {
        if self.robot.backoff > 0 {
            self.robot.backoff -= 1;
            self.settle();
            return Ok(());
        }

        if self.is_stuck() {
            self.recover();
            return Ok(());
        }

        if self.robot.task.has_path() {
            return self.follow_path();
        }

        self.settle();
        match self.robot.task {
            Task::Searching => self.search(),
            Task::GoingToBox { .. } => self.pick_up()?,
            Task::PlanningDrop => self.plan_drop(),
            Task::GoingToDrop { pile, .. } => self.drop_item(pile)?,
            Task::Forming { .. } => self.form(),
        }
        Ok(())
    }

    fn transition(&mut self, next: Task) {
        if self.robot.task.name() != next.name() {
            tracing::debug!(
                "Robot {} at {}: {} -> {}",
                self.robot.id,
                self.robot.position,
                self.robot.task,
                next
            );
        }
        self.robot.task = next;
    }
}
