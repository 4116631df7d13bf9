//! Initial warehouse description and the random generator used by the binary.

use std::collections::HashSet;

use rand::Rng;

use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::infra::Position;

/// Everything `Simulation::initialize` needs to build a warehouse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub walls: Vec<Position>,
    pub destinations: Vec<Position>,
    pub items: Vec<(Position, u32)>,
    /// Start cells, indexed by robot id.
    pub robots: Vec<Position>,
}

impl Layout {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Make every cell of the bottom row a pile.
    pub fn with_bottom_row_piles(mut self) -> Self {
        let row = self.height - 1;
        self.destinations = (0..self.width).map(|x| Position::new(x, row)).collect();
        self
    }

    pub fn with_walls(mut self, walls: &[Position]) -> Self {
        self.walls.extend_from_slice(walls);
        self
    }

    pub fn with_item(mut self, pos: Position, count: u32) -> Self {
        self.items.push((pos, count));
        self
    }

    pub fn with_robot(mut self, pos: Position) -> Self {
        self.robots.push(pos);
        self
    }
}

/// Random warehouse: piles along the bottom row, single items scattered over
/// the upper rows, optional walls, robots on free cells above the piles.
pub fn generate(config: &RunConfig, rng: &mut impl Rng) -> Result<Layout, ConfigError> {
    let (width, height) = (config.width, config.height);
    if width <= 0 || height <= 0 {
        return Err(ConfigError::ZeroSizeGrid { width, height });
    }

    let pile_row = height - 1;
    let mut layout = Layout::new(width, height).with_bottom_row_piles();
    let mut used: HashSet<Position> = HashSet::new();

    // Items stay at least three rows clear of the piles.
    let item_rows = (height - 4).max(1);
    let mut attempts = 0;
    while layout.items.len() < config.boxes && attempts < config.boxes * 50 {
        attempts += 1;
        let pos = Position::new(rng.random_range(0..width), rng.random_range(0..item_rows));
        if pos.y != pile_row && used.insert(pos) {
            layout.items.push((pos, 1));
        }
    }
    if layout.items.len() < config.boxes {
        return Err(ConfigError::InsufficientSpace {
            what: "boxes",
            requested: config.boxes,
            placed: layout.items.len(),
        });
    }

    // Walls never touch the pile row or the row in front of it.
    let wall_rows = height - 2;
    let mut attempts = 0;
    while layout.walls.len() < config.walls && wall_rows > 0 && attempts < config.walls * 50 {
        attempts += 1;
        let pos = Position::new(rng.random_range(0..width), rng.random_range(0..wall_rows));
        if used.insert(pos) {
            layout.walls.push(pos);
        }
    }
    if layout.walls.len() < config.walls {
        return Err(ConfigError::InsufficientSpace {
            what: "walls",
            requested: config.walls,
            placed: layout.walls.len(),
        });
    }

    for _ in 0..config.robots {
        match spawn_cell(width, pile_row, &used, rng) {
            Some(pos) => {
                used.insert(pos);
                layout.robots.push(pos);
            }
            None => {
                return Err(ConfigError::InsufficientSpace {
                    what: "robots",
                    requested: config.robots,
                    placed: layout.robots.len(),
                });
            }
        }
    }

    tracing::debug!(
        "Generated {}x{} layout with {} items, {} walls, {} robots",
        width,
        height,
        layout.items.len(),
        layout.walls.len(),
        layout.robots.len()
    );
    Ok(layout)
}

/// A few hundred random tries, then the first free cell in row-major order.
fn spawn_cell(
    width: i32,
    rows: i32,
    used: &HashSet<Position>,
    rng: &mut impl Rng,
) -> Option<Position> {
    if rows <= 0 {
        return None;
    }
    for _ in 0..500 {
        let pos = Position::new(rng.random_range(0..width), rng.random_range(0..rows));
        if !used.contains(&pos) {
            return Some(pos);
        }
    }
    (0..rows)
        .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
        .find(|pos| !used.contains(pos))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generate_default_layout() {
        let config = RunConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let layout = generate(&config, &mut rng).unwrap();

        assert_eq!(layout.destinations.len(), config.width as usize);
        assert!(layout.destinations.iter().all(|p| p.y == config.height - 1));
        assert_eq!(layout.items.len(), config.boxes);
        assert!(layout.items.iter().all(|(p, n)| *n == 1 && p.y <= config.height - 5));
        assert_eq!(layout.robots.len(), config.robots);

        let items: HashSet<Position> = layout.items.iter().map(|(p, _)| *p).collect();
        let robots: HashSet<Position> = layout.robots.iter().copied().collect();
        assert_eq!(items.len(), config.boxes);
        assert_eq!(robots.len(), config.robots);
        assert!(items.is_disjoint(&robots));
        assert!(layout.robots.iter().all(|p| p.y < config.height - 1));
    }

    #[test]
    fn test_generate_keeps_walls_off_pile_rows() {
        let config = RunConfig {
            walls: 12,
            ..RunConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let layout = generate(&config, &mut rng).unwrap();

        assert_eq!(layout.walls.len(), 12);
        assert!(layout.walls.iter().all(|w| w.y < config.height - 2));
        let walls: HashSet<Position> = layout.walls.iter().copied().collect();
        assert!(layout.items.iter().all(|(p, _)| !walls.contains(p)));
        assert!(layout.robots.iter().all(|p| !walls.contains(p)));
    }

    #[test]
    fn test_generate_is_deterministic_for_a_seed() {
        let config = RunConfig::default();
        let a = generate(&config, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate(&config, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_reports_insufficient_space() {
        let config = RunConfig {
            width: 3,
            height: 6,
            boxes: 10,
            ..RunConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate(&config, &mut rng),
            Err(ConfigError::InsufficientSpace {
                what: "boxes",
                requested: 10,
                placed: 6,
            })
        );
    }

    #[test]
    fn test_robots_take_remaining_free_cell() {
        // One item leaves a single free cell above the piles.
        let config = RunConfig {
            width: 2,
            height: 2,
            boxes: 1,
            robots: 1,
            ..RunConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let layout = generate(&config, &mut rng).unwrap();
        assert_eq!(layout.robots.len(), 1);
        assert_eq!(layout.robots[0].y, 0);
        assert_ne!(layout.robots[0], layout.items[0].0);
    }
}
