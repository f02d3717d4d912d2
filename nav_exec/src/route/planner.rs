//! Plans minimum length routes through a [`Grid`], using an A* algorithm.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cmp::Ordering, collections::BinaryHeap};

use log::{info, warn};
use ndarray::Array2;
use serde::Serialize;

use crate::grid::{Grid, GridCoord};

use super::{extract_turns, Route, RouteError, RouteParams, TurnPoint};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RoutePlanner {
    params: RouteParams,

    cell_size: f64,
}

/// Summary of a planning run, saved into the session directory.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub start: GridCoord,

    pub end: GridCoord,

    /// Number of cells taken off the open set and expanded
    pub num_expanded: usize,

    /// Number of edges in the path
    pub path_length: usize,

    pub turn_points: Vec<TurnPoint>,
}

/// An A* node
#[derive(Debug, Clone, Copy)]
struct Node {
    /// Estimated total cost, `g + h`
    f: usize,

    /// Discovery order, used to break ties between equal `f`
    seq: usize,

    coord: GridCoord,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl RoutePlanner {
    pub fn new(params: RouteParams, cell_size: f64) -> Self {
        Self { params, cell_size }
    }

    /// Plan the shortest route from the grid's start to its end, and find the turns along it.
    ///
    /// All moves between adjacent cells cost 1, and the Manhattan distance to the end is used as
    /// the heuristic. Ties are broken by the order in which cells were discovered so that the
    /// same grid always produces the same route.
    pub fn plan(&self, grid: &Grid) -> Result<Route, RouteError> {
        let (start, end) = (grid.start(), grid.end());
        let shape = (grid.height(), grid.width());

        let mut g_score: Array2<usize> = Array2::from_elem(shape, usize::MAX);
        let mut came_from: Array2<Option<GridCoord>> = Array2::from_elem(shape, None);
        let mut closed = Array2::from_elem(shape, false);

        // Create the priority queue (binary heap) for tracking nodes
        let mut heap = BinaryHeap::new();
        let mut num_nodes = 0;
        let mut num_expanded = 0;
        let mut end_reached = false;

        g_score[[start.row, start.col]] = 0;
        heap.push(Node {
            f: manhattan(start, end),
            seq: num_nodes,
            coord: start,
        });
        num_nodes += 1;

        while let Some(min_node) = heap.pop() {
            let idx = [min_node.coord.row, min_node.coord.col];

            // Stale entry for a cell which was already expanded with a lower cost
            if closed[idx] {
                continue;
            }
            closed[idx] = true;
            num_expanded += 1;

            if min_node.coord == end {
                end_reached = true;
                break;
            }

            let g = g_score[idx];

            for n in grid.open_neighbours(min_node.coord) {
                let n_idx = [n.row, n.col];

                if closed[n_idx] {
                    continue;
                }

                if g + 1 < g_score[n_idx] {
                    g_score[n_idx] = g + 1;
                    came_from[n_idx] = Some(min_node.coord);

                    heap.push(Node {
                        f: g + 1 + manhattan(n, end),
                        seq: num_nodes,
                        coord: n,
                    });
                    num_nodes += 1;
                }
            }
        }

        if !end_reached {
            warn!(
                "No route from {:?} to {:?} after expanding {} cells",
                start, end, num_expanded
            );
            return Err(RouteError::NoRoute(start, end));
        }

        // Work backwards from the end to get the path
        let mut path = vec![end];
        let mut current = end;
        while let Some(prev) = came_from[[current.row, current.col]] {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        let turn_points = extract_turns(&path, self.cell_size, self.params.turn_angle_threshold_deg);

        let report = PlanReport {
            start,
            end,
            num_expanded,
            path_length: path.len() - 1,
            turn_points: turn_points.clone(),
        };

        info!(
            "Route planned: {} cells, {} turns, {} cells expanded",
            path.len(),
            turn_points.len(),
            num_expanded
        );
        for t in turn_points.iter() {
            info!(
                "    Turn {} at {:?} ({:.1} deg)",
                t.direction, t.coord, t.angle_deg
            );
        }

        util::session::save_with_timestamp("route_planner/report.json", report);

        Ok(Route { path, turn_points })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Note that we flip the order here so that the heap will be a min-heap, not a max-heap
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn manhattan(a: GridCoord, b: GridCoord) -> usize {
    let dr = if a.row > b.row { a.row - b.row } else { b.row - a.row };
    let dc = if a.col > b.col { a.col - b.col } else { b.col - a.col };
    dr + dc
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{generate, GeneratorKind, GridParams};
    use comms_if::eqpt::haptic::TurnDirection;
    use rand::{rngs::StdRng, SeedableRng};

    fn planner() -> RoutePlanner {
        RoutePlanner::new(RouteParams::default(), 40.0)
    }

    #[test]
    fn test_heap_order() {
        let mut heap = BinaryHeap::new();
        let c = GridCoord::new(0, 0);
        heap.push(Node { f: 5, seq: 0, coord: c });
        heap.push(Node { f: 3, seq: 2, coord: c });
        heap.push(Node { f: 3, seq: 1, coord: c });
        heap.push(Node { f: 7, seq: 3, coord: c });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|n| n.seq)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_plan_corridor() {
        let cells = vec![
            GridCoord::new(0, 0),
            GridCoord::new(0, 1),
            GridCoord::new(0, 2),
            GridCoord::new(1, 2),
            GridCoord::new(2, 2),
        ];
        let grid = generate::carve_route(3, 3, &cells).unwrap();

        let route = planner().plan(&grid).unwrap();

        assert_eq!(route.path, cells);
        assert_eq!(route.turn_points.len(), 1);
        assert_eq!(route.turn_points[0].coord, GridCoord::new(0, 2));
        assert_eq!(route.turn_points[0].direction, TurnDirection::Right);
    }

    #[test]
    fn test_plan_is_optimal() {
        let params = GridParams::default();

        for seed in 0..20 {
            let grid = generate::random(&params, &mut StdRng::seed_from_u64(seed)).unwrap();
            let route = planner().plan(&grid).unwrap();

            assert_eq!(route.path.first(), Some(&grid.start()));
            assert_eq!(route.path.last(), Some(&grid.end()));
            assert_eq!(
                Some(route.path.len() - 1),
                grid.bfs_distance(grid.start(), grid.end())
            );

            // Consecutive cells are joined by an open wall
            for pair in route.path.windows(2) {
                let side = pair[0].side_towards(&pair[1]).unwrap();
                assert!(grid.is_open(pair[0], side));
            }

            // Turn points are interior cells in path order
            for w in route.turn_points.windows(2) {
                assert!(w[0].path_index < w[1].path_index);
            }
            for t in route.turn_points.iter() {
                assert!(t.path_index > 0 && t.path_index < route.path.len() - 1);
                assert_eq!(route.path[t.path_index], t.coord);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        // An open 4x4 room has many shortest routes
        let edge: Vec<GridCoord> = (0..4)
            .map(|r| GridCoord::new(r, 0))
            .chain((1..4).map(|c| GridCoord::new(3, c)))
            .collect();
        let mut grid = generate::carve_route(4, 4, &edge).unwrap();
        for r in 0..4 {
            for c in 0..4 {
                if c + 1 < 4 {
                    grid.open_between(GridCoord::new(r, c), GridCoord::new(r, c + 1))
                        .unwrap();
                }
                if r + 1 < 4 {
                    grid.open_between(GridCoord::new(r, c), GridCoord::new(r + 1, c))
                        .unwrap();
                }
            }
        }

        let a = planner().plan(&grid).unwrap();
        let b = planner().plan(&grid).unwrap();

        assert_eq!(a.path, b.path);
        assert_eq!(a.path.len(), 7);
    }

    #[test]
    fn test_simple_route_turns() {
        let params = GridParams {
            generator: GeneratorKind::SimpleRoute,
            ..Default::default()
        };
        let grid = generate::simple_route(&params).unwrap();

        let route = planner().plan(&grid).unwrap();

        assert_eq!(route.path.len(), 24);
        assert_eq!(route.turn_points.len(), 2);
        assert_eq!(route.turn_points[0].coord, GridCoord::new(0, 7));
        assert_eq!(route.turn_points[0].direction, TurnDirection::Right);
        assert_eq!(route.turn_points[1].coord, GridCoord::new(9, 7));
        assert_eq!(route.turn_points[1].direction, TurnDirection::Left);
    }

    #[test]
    fn test_no_route() {
        let mut grid = Grid::closed(3, 3, GridCoord::new(0, 0), GridCoord::new(2, 2)).unwrap();
        grid.open_between(GridCoord::new(0, 0), GridCoord::new(0, 1))
            .unwrap();

        assert!(matches!(
            planner().plan(&grid),
            Err(RouteError::NoRoute(_, _))
        ));
    }

    #[test]
    fn test_start_is_end() {
        let grid = generate::carve_route(2, 2, &[GridCoord::new(1, 1)]).unwrap();

        let route = planner().plan(&grid).unwrap();
        assert_eq!(route.path, vec![GridCoord::new(1, 1)]);
        assert!(route.turn_points.is_empty());
    }
}
