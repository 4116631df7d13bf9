use std::io::{self, Write};

use tracing::info;

use crate::game::RunSummary;
use crate::infra::SimulationObserver;
use crate::simulation::{Simulation, TickResult};

/// Logs progress and prints the ASCII map every `map_every` ticks (0 never).
pub struct DefaultObserver {
    map_every: u64,
}

impl DefaultObserver {
    pub fn new(map_every: u64) -> Self {
        Self { map_every }
    }

    fn print_map(&self, simulation: &Simulation) {
        let _ = writeln!(io::stdout(), "{}", simulation.draw_ascii_map());
    }
}

impl SimulationObserver for DefaultObserver {
    fn on_simulation_start(&mut self, simulation: &Simulation) {
        let warehouse = simulation.warehouse();
        info!("Simulation started");
        info!("- grid: {}x{}", warehouse.width, warehouse.height);
        info!(
            "- piles: {} (capacity {})",
            warehouse.piles().len(),
            warehouse.pile_capacity()
        );
        info!("- items: {}", simulation.total_items());
        info!("- robots: {}", simulation.robots().len());
        if self.map_every > 0 {
            self.print_map(simulation);
        }
    }

    fn on_tick(&mut self, simulation: &Simulation, result: &TickResult) {
        if self.map_every == 0 || result.tick % self.map_every != 0 {
            return;
        }
        let warehouse = simulation.warehouse();
        info!(
            "tick: {}, moves: {}, contested: {}, loose items: {}",
            result.tick,
            simulation.total_moves(),
            result.contested_cells,
            warehouse.items_outside_piles()
        );
        self.print_map(simulation);
        for robot in simulation.robots() {
            let _ = writeln!(
                io::stdout(),
                "Robot {} at {}: {} | moves: {} | recoveries: {}",
                robot.id,
                robot.position,
                robot.task,
                robot.moves,
                robot.recoveries
            );
        }
    }

    fn on_simulation_finished(&mut self, summary: &RunSummary, simulation: &Simulation) {
        info!("Simulation finished with status: {:?}", summary.status);
        info!("Ticks: {}", summary.ticks);
        info!("Total moves: {}", summary.total_moves);
        info!(
            "Items on piles: {}/{}",
            simulation.warehouse().total_items() - simulation.warehouse().items_outside_piles(),
            simulation.total_items()
        );
        if self.map_every > 0 {
            self.print_map(simulation);
        }
    }
}
