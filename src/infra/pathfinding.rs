use std::collections::{HashMap, HashSet, VecDeque};

use crate::infra::{Bounds, Position};

/// Breadth-first shortest-hop search over 4-connected cells.
pub struct Bfs;

impl Bfs {
    /// Find the shortest path from `start` to any cell in `goals`.
    ///
    /// The returned path excludes `start` and ends at the reached goal. An
    /// empty path means `start` is already a goal. `start` is never treated as
    /// blocked, even when it appears in `blocked`, so a robot can always leave
    /// its own cell. Among equally distant goals the first one dequeued wins,
    /// which follows `Position::neighbors` enumeration order.
    #[tracing::instrument(level = "trace", skip(goals, blocked), fields(goals = goals.len(), blocked = blocked.len()))]
    pub fn find_path(
        bounds: Bounds,
        start: Position,
        goals: &HashSet<Position>,
        blocked: &HashSet<Position>,
    ) -> Option<Vec<Position>> {
        if goals.is_empty() {
            return None;
        }

        let mut queue = VecDeque::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut visited: HashSet<Position> = HashSet::new();

        queue.push_back(start);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            if goals.contains(&current) {
                return Some(reconstruct_path(&came_from, start, current));
            }

            for neighbor in current.neighbors() {
                if !bounds.contains(&neighbor)
                    || visited.contains(&neighbor)
                    || blocked.contains(&neighbor)
                {
                    continue;
                }
                visited.insert(neighbor);
                came_from.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }

        None
    }

    /// Every cell reachable from `start` without entering `blocked`, `start` included.
    pub fn reachable(
        bounds: Bounds,
        start: Position,
        blocked: &HashSet<Position>,
    ) -> HashSet<Position> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in current.neighbors() {
                if bounds.contains(&neighbor)
                    && !blocked.contains(&neighbor)
                    && visited.insert(neighbor)
                {
                    queue.push_back(neighbor);
                }
            }
        }
        visited
    }
}

fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    mut current: Position,
) -> Vec<Position> {
    let mut path = Vec::new();
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals(cells: &[(i32, i32)]) -> HashSet<Position> {
        cells.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    fn assert_contiguous(start: Position, path: &[Position]) {
        let mut prev = start;
        for step in path {
            assert!(prev.is_adjacent(step), "{:?} -> {:?} is not a unit step", prev, step);
            prev = *step;
        }
    }

    #[test]
    fn test_start_in_goals_returns_empty_path() {
        let start = Position::new(1, 1);
        let path = Bfs::find_path(Bounds::from_size(3, 3), start, &goals(&[(1, 1)]), &HashSet::new());
        assert_eq!(path, Some(vec![]));
    }

    #[test]
    fn test_empty_goal_set_has_no_path() {
        let path = Bfs::find_path(
            Bounds::from_size(3, 3),
            Position::new(0, 0),
            &HashSet::new(),
            &HashSet::new(),
        );
        assert!(path.is_none());
    }

    #[test]
    fn test_straight_line_excludes_start() {
        let start = Position::new(0, 0);
        let path = Bfs::find_path(Bounds::from_size(4, 1), start, &goals(&[(3, 0)]), &HashSet::new())
            .unwrap();
        assert_eq!(
            path,
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]
        );
    }

    #[test]
    fn test_routes_around_blocked_cells() {
        // . # .
        // . # .
        // . . .
        let blocked = goals(&[(1, 0), (1, 1)]);
        let start = Position::new(0, 0);
        let path = Bfs::find_path(Bounds::from_size(3, 3), start, &goals(&[(2, 0)]), &blocked)
            .unwrap();
        assert_eq!(path.len(), 6);
        assert!(path.iter().all(|p| !blocked.contains(p)));
        assert_contiguous(start, &path);
    }

    #[test]
    fn test_start_is_implicitly_unblocked() {
        let start = Position::new(0, 0);
        let blocked = goals(&[(0, 0)]);
        let path = Bfs::find_path(Bounds::from_size(2, 1), start, &goals(&[(1, 0)]), &blocked);
        assert_eq!(path, Some(vec![Position::new(1, 0)]));
    }

    #[test]
    fn test_unreachable_goal() {
        let blocked = goals(&[(1, 0), (1, 1), (1, 2)]);
        let path = Bfs::find_path(
            Bounds::from_size(3, 3),
            Position::new(0, 1),
            &goals(&[(2, 1)]),
            &blocked,
        );
        assert!(path.is_none());
    }

    #[test]
    fn test_blocked_goal_is_never_reached() {
        let target = goals(&[(1, 0)]);
        let path = Bfs::find_path(Bounds::from_size(2, 1), Position::new(0, 0), &target, &target);
        assert!(path.is_none());
    }

    #[test]
    fn test_nearest_of_several_goals() {
        let start = Position::new(0, 0);
        let path = Bfs::find_path(
            Bounds::from_size(5, 5),
            start,
            &goals(&[(4, 4), (0, 2), (3, 0)]),
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(*path.last().unwrap(), Position::new(0, 2));
    }

    #[test]
    fn test_reachable_stops_at_blocked_cells() {
        // . # .
        // # . .
        let blocked = goals(&[(1, 0), (0, 1)]);
        let cells = Bfs::reachable(Bounds::from_size(3, 2), Position::new(2, 1), &blocked);
        assert_eq!(cells, goals(&[(2, 1), (2, 0), (1, 1)]));

        let sealed = Bfs::reachable(Bounds::from_size(3, 2), Position::new(0, 0), &blocked);
        assert_eq!(sealed, goals(&[(0, 0)]));
    }

    #[test]
    fn test_out_of_bounds_goal_is_unreachable() {
        let path = Bfs::find_path(
            Bounds::from_size(2, 2),
            Position::new(0, 0),
            &goals(&[(5, 5)]),
            &HashSet::new(),
        );
        assert!(path.is_none());
    }
}
