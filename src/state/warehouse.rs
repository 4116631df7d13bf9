use std::collections::HashSet;

use crate::error::{ConfigError, InvariantViolation};
use crate::infra::{Bounds, Position};

/// Item counts per cell plus the fixed wall and destination layout.
///
/// Destination cells double as piles with a shared capacity. Source cells
/// hold any number of items.
#[derive(Clone, Debug)]
pub struct Warehouse {
    pub width: i32,
    pub height: i32,
    cells: Vec<u32>,
    walls: HashSet<Position>,
    piles: Vec<Position>,
    pile_set: HashSet<Position>,
    pile_capacity: u32,
}

impl Warehouse {
    pub fn new(
        width: i32,
        height: i32,
        walls: &[Position],
        destinations: &[Position],
        pile_capacity: u32,
    ) -> Result<Self, ConfigError> {
        if width <= 0 || height <= 0 {
            return Err(ConfigError::ZeroSizeGrid { width, height });
        }
        if pile_capacity == 0 {
            return Err(ConfigError::ZeroPileCapacity);
        }

        let bounds = Bounds::from_size(width, height);
        let out_of_bounds = |what, pos| ConfigError::OutOfBounds {
            what,
            pos,
            width,
            height,
        };

        let mut wall_set = HashSet::new();
        for &wall in walls {
            if !bounds.contains(&wall) {
                return Err(out_of_bounds("wall", wall));
            }
            wall_set.insert(wall);
        }

        let mut pile_set = HashSet::new();
        for &pile in destinations {
            if !bounds.contains(&pile) {
                return Err(out_of_bounds("destination", pile));
            }
            if wall_set.contains(&pile) {
                return Err(ConfigError::WallDestinationOverlap(pile));
            }
            pile_set.insert(pile);
        }

        // Left-to-right priority, top-to-bottom within a column.
        let mut piles: Vec<Position> = pile_set.iter().copied().collect();
        piles.sort_by_key(|p| (p.x, p.y));

        Ok(Self {
            width,
            height,
            cells: vec![0; (width * height) as usize],
            walls: wall_set,
            piles,
            pile_set,
            pile_capacity,
        })
    }

    /// Place the initial items of a cell. Only used while building the layout.
    pub fn stock(&mut self, pos: Position, count: u32) -> Result<(), ConfigError> {
        let Some(index) = self.index(&pos) else {
            return Err(ConfigError::OutOfBounds {
                what: "item",
                pos,
                width: self.width,
                height: self.height,
            });
        };
        if self.is_wall(&pos) {
            return Err(ConfigError::ItemOnWall(pos));
        }
        let total = self.cells[index] + count;
        if self.is_destination(&pos) && total > self.pile_capacity {
            return Err(ConfigError::PileOverCapacity {
                pos,
                count: total,
                capacity: self.pile_capacity,
            });
        }
        self.cells[index] = total;
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        self.bounds().contains(pos)
    }

    fn index(&self, pos: &Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Items stacked on `pos`. Out-of-bounds cells hold nothing.
    pub fn item_count(&self, pos: &Position) -> u32 {
        self.index(pos).map(|i| self.cells[i]).unwrap_or(0)
    }

    pub fn has_items(&self, pos: &Position) -> bool {
        self.item_count(pos) > 0
    }

    pub fn is_wall(&self, pos: &Position) -> bool {
        self.walls.contains(pos)
    }

    pub fn is_destination(&self, pos: &Position) -> bool {
        self.pile_set.contains(pos)
    }

    pub fn walls(&self) -> &HashSet<Position> {
        &self.walls
    }

    /// Piles in drop priority order.
    pub fn piles(&self) -> &[Position] {
        &self.piles
    }

    pub fn pile_capacity(&self) -> u32 {
        self.pile_capacity
    }

    pub fn pile_has_capacity(&self, pile: &Position) -> bool {
        self.is_destination(pile) && self.item_count(pile) < self.pile_capacity
    }

    pub fn increment_at(&mut self, pos: Position) -> Result<(), InvariantViolation> {
        if self.is_wall(&pos) {
            return Err(InvariantViolation::ItemOnWall(pos));
        }
        let is_pile = self.is_destination(&pos);
        let capacity = self.pile_capacity;
        let Some(index) = self.index(&pos) else {
            return Err(InvariantViolation::OutOfGrid(pos));
        };
        if is_pile && self.cells[index] >= capacity {
            return Err(InvariantViolation::CapacityExceeded { pos, capacity });
        }
        self.cells[index] += 1;
        Ok(())
    }

    pub fn decrement_at(&mut self, pos: Position) -> Result<(), InvariantViolation> {
        match self.index(&pos) {
            Some(index) if self.cells[index] > 0 => {
                self.cells[index] -= 1;
                Ok(())
            }
            _ => Err(InvariantViolation::EmptyCell(pos)),
        }
    }

    /// In-bounds 4-neighbors of `pos`, in `Position::neighbors` order.
    pub fn neighbors4(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().into_iter().filter(|n| self.in_bounds(n))
    }

    /// Every cell currently holding at least one item.
    pub fn item_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, _)| Position::new(i as i32 % self.width, i as i32 / self.width))
    }

    /// Items still waiting outside the piles.
    pub fn items_outside_piles(&self) -> u32 {
        self.item_cells()
            .filter(|pos| !self.is_destination(pos))
            .map(|pos| self.item_count(&pos))
            .sum()
    }

    pub fn total_items(&self) -> u32 {
        self.cells.iter().sum()
    }
}
