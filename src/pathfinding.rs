use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::constants::MAX_PATH_EXPANSIONS;
use crate::maze::MazeGrid;
use crate::types::Position;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expansions: usize,
    pub capped: bool,
}

pub fn find_path(start: Position, goal: Position, grid: &MazeGrid) -> Vec<Position> {
    find_path_with_stats(start, goal, grid).0
}

// Open set ordered by (f, insertion sequence).
pub fn find_path_with_stats(
    start: Position,
    goal: Position,
    grid: &MazeGrid,
) -> (Vec<Position>, SearchStats) {
    find_path_bounded(start, goal, grid, MAX_PATH_EXPANSIONS)
}

pub fn find_path_bounded(
    start: Position,
    goal: Position,
    grid: &MazeGrid,
    max_expansions: usize,
) -> (Vec<Position>, SearchStats) {
    let mut stats = SearchStats::default();
    if start == goal {
        return (vec![start], stats);
    }

    let mut open = BinaryHeap::<(Reverse<i32>, Reverse<u64>, Position)>::new();
    let mut closed = HashSet::<Position>::new();
    let mut came_from = HashMap::<Position, Position>::new();
    let mut g_score = HashMap::<Position, i32>::new();
    let mut sequence = 0u64;

    g_score.insert(start, 0);
    open.push((Reverse(start.manhattan(goal)), Reverse(sequence), start));

    while let Some((_, _, current)) = open.pop() {
        if !closed.insert(current) {
            // Stale entry superseded by a cheaper push.
            continue;
        }
        if stats.expansions >= max_expansions {
            stats.capped = true;
            return (Vec::new(), stats);
        }
        stats.expansions += 1;

        if current == goal {
            return (reconstruct(&came_from, current), stats);
        }

        let current_g = g_score.get(&current).copied().unwrap_or(0);
        for (_, neighbor) in grid.passable_neighbors(current) {
            if closed.contains(&neighbor) {
                continue;
            }
            let tentative = current_g + 1;
            let known = g_score.get(&neighbor).copied().unwrap_or(i32::MAX);
            if tentative < known {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                sequence += 1;
                open.push((
                    Reverse(tentative + neighbor.manhattan(goal)),
                    Reverse(sequence),
                    neighbor,
                ));
            }
        }
    }

    (Vec::new(), stats)
}

fn reconstruct(came_from: &HashMap<Position, Position>, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut node = end;
    while let Some(prev) = came_from.get(&node) {
        path.push(*prev);
        node = *prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use super::*;
    use crate::rng::Rng;

    fn grid(rows: &[&str]) -> MazeGrid {
        MazeGrid::from_tiles(rows).expect("layout should parse")
    }

    fn bfs_distance(grid: &MazeGrid, start: Position, goal: Position) -> Option<usize> {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(start, 0usize);
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            if pos == goal {
                return dist.get(&pos).copied();
            }
            let base = dist[&pos];
            for (_, next) in grid.passable_neighbors(pos) {
                if !dist.contains_key(&next) {
                    dist.insert(next, base + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn random_grid(rng: &mut Rng, rows: i32, cols: i32) -> MazeGrid {
        let tiles: Vec<String> = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        let edge = row == 0 || col == 0 || row == rows - 1 || col == cols - 1;
                        if edge || rng.bool(0.25) {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect();
        MazeGrid::from_tiles(&tiles).expect("generated layout should parse")
    }

    fn assert_valid_path(grid: &MazeGrid, path: &[Position], start: Position, goal: Position) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
            assert!(grid.is_passable(pair[1]));
        }
    }

    #[test]
    fn start_equal_to_goal_returns_single_cell() {
        let maze = grid(&["#####", "#...#", "#####"]);
        let start = Position::new(1, 2);
        assert_eq!(find_path(start, start, &maze), vec![start]);
    }

    #[test]
    fn detours_around_walls() {
        let maze = grid(&[
            "#######", //
            "#.....#", //
            "#.###.#", //
            "#.#...#", //
            "#######",
        ]);
        let start = Position::new(3, 1);
        let goal = Position::new(3, 3);
        let path = find_path(start, goal, &maze);
        assert_valid_path(&maze, &path, start, goal);
        assert_eq!(path.len() - 1, 10);
    }

    #[test]
    fn unreachable_goal_returns_empty() {
        let maze = grid(&["#######", "#..#..#", "#######"]);
        let (path, stats) =
            find_path_with_stats(Position::new(1, 1), Position::new(1, 5), &maze);
        assert!(path.is_empty());
        assert!(!stats.capped);
        assert_eq!(stats.expansions, 2);
    }

    #[test]
    fn expansion_budget_yields_empty_path() {
        let tiles: Vec<String> = std::iter::once("#".repeat(150))
            .chain(std::iter::once(format!("#{}#", ".".repeat(148))))
            .chain(std::iter::once("#".repeat(150)))
            .collect();
        let maze = MazeGrid::from_tiles(&tiles).expect("corridor should parse");
        let start = Position::new(1, 1);

        let (path, stats) = find_path_with_stats(start, Position::new(1, 148), &maze);
        assert!(path.is_empty());
        assert!(stats.capped);
        assert_eq!(stats.expansions, MAX_PATH_EXPANSIONS);

        // The 100th expansion may still pop the goal.
        let reachable = Position::new(1, 1 + MAX_PATH_EXPANSIONS as i32 - 1);
        let (path, stats) = find_path_with_stats(start, reachable, &maze);
        assert_eq!(path.len(), MAX_PATH_EXPANSIONS);
        assert!(!stats.capped);
    }

    #[test]
    fn path_length_matches_bfs_distance_on_random_grids() {
        let mut checked = 0;
        for seed in 0..200u64 {
            let mut rng = Rng::new(seed);
            let maze = random_grid(&mut rng, 9, 11);
            let open: Vec<Position> = (0..maze.rows())
                .flat_map(|row| (0..maze.cols()).map(move |col| Position::new(row, col)))
                .filter(|pos| maze.is_passable(*pos))
                .collect();
            if open.len() < 2 {
                continue;
            }
            let start = open[rng.pick_index(open.len())];
            let goal = open[rng.pick_index(open.len())];

            let (path, stats) = find_path_with_stats(start, goal, &maze);
            match bfs_distance(&maze, start, goal) {
                Some(distance) if !stats.capped => {
                    assert_valid_path(&maze, &path, start, goal);
                    assert_eq!(path.len() - 1, distance, "seed={seed}");
                    checked += 1;
                }
                Some(_) => assert!(path.is_empty()),
                None => assert!(path.is_empty(), "seed={seed}"),
            }
        }
        assert!(checked > 50);
    }

    #[test]
    fn equal_cost_ties_prefer_first_enumerated_neighbor() {
        let maze = grid(&["#####", "#...#", "#...#", "#...#", "#####"]);
        let path = find_path(Position::new(1, 1), Position::new(3, 3), &maze);
        assert_eq!(
            path,
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(3, 1),
                Position::new(3, 2),
                Position::new(3, 3),
            ]
        );
    }
}
