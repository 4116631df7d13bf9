use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use stackbot::state::Task;
use stackbot::{Layout, Position, RunConfig, Simulation, SimulationConfig, layout};

fn fast_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        move_step: 1.0,
        max_backoff: 0,
        seed,
        ..SimulationConfig::default()
    }
}

/// Tick until completion, returning the tick it was signaled on.
fn run_to_completion(sim: &mut Simulation, limit: u64) -> Option<u64> {
    for _ in 0..limit {
        let result = sim.tick().expect("tick failed");
        if result.completed {
            return Some(result.tick);
        }
    }
    None
}

fn assert_invariants(sim: &Simulation, expected_items: u32) {
    let warehouse = sim.warehouse();
    let capacity = warehouse.pile_capacity();
    for pile in warehouse.piles() {
        assert!(warehouse.item_count(pile) <= capacity, "pile {pile} over capacity");
    }
    assert_eq!(sim.total_items(), expected_items, "items not conserved");

    let mut cells = HashSet::new();
    for robot in sim.robots() {
        assert!(cells.insert(robot.position), "two robots on {}", robot.position);
        assert!(!warehouse.is_wall(&robot.position), "robot {} in a wall", robot.id);

        if let Some(path) = robot.task.path() {
            let mut previous = robot.position;
            for &cell in path {
                assert!(
                    previous.is_adjacent(&cell),
                    "robot {} path jumps from {} to {}",
                    robot.id,
                    previous,
                    cell
                );
                previous = cell;
            }
        }
    }
}

#[test]
fn test_single_item_runs_through_every_state() {
    let layout = Layout::new(5, 5)
        .with_bottom_row_piles()
        .with_item(Position::new(2, 2), 1)
        .with_robot(Position::new(2, 3));
    let mut sim = Simulation::initialize(&layout, fast_config(1)).unwrap();

    let mut states = vec![sim.robots()[0].task.name()];
    let mut completed_at = None;
    for _ in 0..60 {
        let result = sim.tick().unwrap();
        let name = sim.robots()[0].task.name();
        if states.last() != Some(&name) {
            states.push(name);
        }
        if result.completed {
            completed_at = Some(result.tick);
            break;
        }
    }

    assert_eq!(
        states,
        vec![
            "searching",
            "going-to-box",
            "planning-drop",
            "going-to-drop",
            "searching",
            "forming"
        ]
    );
    assert!(completed_at.is_some());
    let stored: u32 = sim
        .warehouse()
        .piles()
        .iter()
        .map(|p| sim.warehouse().item_count(p))
        .sum();
    assert_eq!(stored, 1);
    assert_eq!(sim.warehouse().items_outside_piles(), 0);
}

#[test]
fn test_completion_is_signaled_once() {
    let layout = Layout::new(5, 5)
        .with_bottom_row_piles()
        .with_item(Position::new(3, 1), 1)
        .with_robot(Position::new(1, 2));
    let mut sim = Simulation::initialize(&layout, fast_config(2)).unwrap();
    let done = run_to_completion(&mut sim, 100).expect("never completed");

    let positions: Vec<Position> = sim.robots().iter().map(|r| r.position).collect();
    let tasks: Vec<Task> = sim.robots().iter().map(|r| r.task.clone()).collect();
    let items = sim.total_items();

    for _ in 0..5 {
        let result = sim.tick().unwrap();
        assert!(!result.completed);
        assert_eq!(result.moves, 0);
        assert_eq!(result.tick, done);
    }
    assert!(sim.is_completed());
    assert_eq!(sim.tick_count(), done);
    assert_eq!(sim.robots().iter().map(|r| r.position).collect::<Vec<_>>(), positions);
    assert_eq!(sim.robots().iter().map(|r| r.task.clone()).collect::<Vec<_>>(), tasks);
    assert_eq!(sim.total_items(), items);
}

#[test]
fn test_unreachable_item_never_errors() {
    // (1, 1) holds the item; its only free neighbor (2, 1) is sealed in.
    let walls = [
        Position::new(0, 0),
        Position::new(1, 0),
        Position::new(2, 0),
        Position::new(3, 0),
        Position::new(0, 1),
        Position::new(3, 1),
        Position::new(0, 2),
        Position::new(1, 2),
        Position::new(2, 2),
        Position::new(3, 2),
    ];
    let layout = Layout::new(7, 7)
        .with_bottom_row_piles()
        .with_walls(&walls)
        .with_item(Position::new(1, 1), 1)
        .with_robot(Position::new(5, 4));
    let config = SimulationConfig {
        stuck_threshold: 5,
        ..fast_config(3)
    };
    let mut sim = Simulation::initialize(&layout, config).unwrap();

    for _ in 0..30 {
        let result = sim.tick().unwrap();
        assert!(!result.completed);
    }

    let robot = &sim.robots()[0];
    assert_eq!(robot.task, Task::Searching);
    assert_eq!(robot.position, Position::new(5, 4));
    assert!(robot.recoveries >= 1);
    assert!(!sim.is_completed());
    assert_eq!(sim.total_items(), 1);
}

#[test]
fn test_two_robots_store_everything() {
    let layout = Layout::new(8, 8)
        .with_bottom_row_piles()
        .with_item(Position::new(2, 1), 1)
        .with_item(Position::new(5, 2), 1)
        .with_item(Position::new(4, 3), 1)
        .with_robot(Position::new(1, 5))
        .with_robot(Position::new(6, 5));
    let config = SimulationConfig {
        move_step: 0.5,
        seed: 4,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::initialize(&layout, config).unwrap();

    let mut completed = false;
    for _ in 0..2000 {
        let result = sim.tick().unwrap();
        assert_invariants(&sim, 3);
        if result.completed {
            completed = true;
            break;
        }
    }

    assert!(completed, "not completed after {} ticks", sim.tick_count());
    assert_eq!(sim.warehouse().items_outside_piles(), 0);
    for robot in sim.robots() {
        assert!(robot.is_formed());
        assert_eq!(robot.position, robot.formation_target);
    }
}

#[test]
fn test_invariants_hold_on_random_layouts() {
    for seed in 0..6 {
        let run = RunConfig {
            width: 12,
            height: 10,
            boxes: 10,
            robots: 4,
            walls: 6,
            ..RunConfig::default()
        };
        let layout = layout::generate(&run, &mut StdRng::seed_from_u64(seed)).unwrap();
        let config = SimulationConfig {
            seed,
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::initialize(&layout, config).unwrap();
        let items = sim.total_items();
        assert_eq!(items, 10);

        for _ in 0..600 {
            sim.tick().unwrap();
            assert_invariants(&sim, items);
            if sim.is_completed() {
                break;
            }
        }
    }
}
