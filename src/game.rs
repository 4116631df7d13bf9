use std::time::{Duration, Instant};

use crate::error::InvariantViolation;
use crate::infra::SimulationObserver;
use crate::simulation::Simulation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub ticks: u64,
    pub total_moves: u64,
    pub elapsed: Duration,
}

/// Drives a simulation tick by tick until completion or the tick limit.
pub struct Game {
    simulation: Simulation,
    observer: Box<dyn SimulationObserver>,
    max_ticks: u64,
}

impl Game {
    pub fn new(
        simulation: Simulation,
        observer: impl SimulationObserver + 'static,
        max_ticks: u64,
    ) -> Self {
        Self {
            simulation,
            observer: Box::new(observer),
            max_ticks,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn run(&mut self) -> Result<RunSummary, InvariantViolation> {
        let run_start = Instant::now();
        self.observer.on_simulation_start(&self.simulation);

        let status = loop {
            if self.simulation.is_completed() {
                break RunStatus::Completed;
            }
            if self.simulation.tick_count() >= self.max_ticks {
                tracing::warn!("Tick limit {} reached before completion", self.max_ticks);
                break RunStatus::TimedOut;
            }

            let tick_start = Instant::now();
            let result = self.simulation.tick()?;

            // Log slow ticks
            let tick_duration = tick_start.elapsed();
            if tick_duration.as_millis() > 10 {
                tracing::debug!(
                    "Tick {} took {:.2}ms ({} moves)",
                    result.tick,
                    tick_duration.as_secs_f64() * 1000.0,
                    result.moves
                );
            }

            self.observer.on_tick(&self.simulation, &result);
        };

        let summary = RunSummary {
            status,
            ticks: self.simulation.tick_count(),
            total_moves: self.simulation.total_moves(),
            elapsed: run_start.elapsed(),
        };
        self.observer
            .on_simulation_finished(&summary, &self.simulation);
        Ok(summary)
    }
}
