use crate::game::RunSummary;
use crate::simulation::{Simulation, TickResult};

/// Trait for observing simulation events during a run
pub trait SimulationObserver {
    /// Called once before the first tick
    fn on_simulation_start(&mut self, simulation: &Simulation);

    /// Called after every tick
    fn on_tick(&mut self, simulation: &Simulation, result: &TickResult);

    /// Called when the run ends, by completion or tick limit
    fn on_simulation_finished(&mut self, summary: &RunSummary, simulation: &Simulation);
}
