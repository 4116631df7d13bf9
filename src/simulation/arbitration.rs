use std::collections::HashMap;

use crate::infra::{Position, RobotId};

/// Per-tick resolution of which robot may enter each intended cell.
///
/// Built fresh every tick; the lowest robot id wins a contested cell.
#[derive(Debug, Clone, Default)]
pub struct ArbitrationMap {
    winners: HashMap<Position, RobotId>,
    contenders: HashMap<Position, usize>,
}

impl ArbitrationMap {
    pub fn build<I>(intentions: I) -> Self
    where
        I: IntoIterator<Item = (RobotId, Position)>,
    {
        let mut map = Self::default();
        for (robot, cell) in intentions {
            map.winners
                .entry(cell)
                .and_modify(|winner| *winner = (*winner).min(robot))
                .or_insert(robot);
            *map.contenders.entry(cell).or_insert(0) += 1;
        }

        for (cell, count) in &map.contenders {
            if *count > 1 {
                tracing::debug!(
                    "Cell {} contested by {} robots, robot {} wins",
                    cell,
                    count,
                    map.winners[cell]
                );
            }
        }
        map
    }

    pub fn winner(&self, cell: &Position) -> Option<RobotId> {
        self.winners.get(cell).copied()
    }

    /// True unless another robot was granted `cell` this tick.
    pub fn permits(&self, cell: &Position, robot: RobotId) -> bool {
        self.winner(cell).is_none_or(|winner| winner == robot)
    }

    pub fn contested_cells(&self) -> usize {
        self.contenders.values().filter(|count| **count > 1).count()
    }
}
