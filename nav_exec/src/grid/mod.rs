//! # Grid Model
//!
//! The routable grid the traveler moves through. A grid is a fixed `width x height` array of
//! square cells separated by walls, plus a start and end cell.
//!
//! Walls are stored per edge rather than per cell, in two boolean tables:
//!
//! - `h_walls`, of shape `(height + 1, width)`, holds the horizontal edges. `h_walls[[r, c]]` is
//!   the top wall of cell `(r, c)` and the bottom wall of cell `(r - 1, c)`.
//! - `v_walls`, of shape `(height, width + 1)`, holds the vertical edges. `v_walls[[r, c]]` is the
//!   left wall of cell `(r, c)` and the right wall of cell `(r, c - 1)`.
//!
//! This means two neighbouring cells can never disagree about the wall between them. [`Cell`] is
//! a read-only view built from these tables.
//!
//! Once built (by [`generate`] or by loading a persisted grid) a [`Grid`] cannot be modified.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod generate;
mod params;
mod persist;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{collections::VecDeque, path::Path};

use log::{info, warn};
use nalgebra::Point2;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use params::{GeneratorKind, GridParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Index of a cell in the grid. Rows grow southwards, columns grow eastwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub row: usize,
    pub col: usize,
}

/// A view of a single cell and its four walls (`true` means the wall is closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub coord: GridCoord,
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

/// A rectangular grid of cells with a start and end cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,

    /// Horizontal edges, shape `(height + 1, width)`, `true` if closed
    h_walls: Array2<bool>,

    /// Vertical edges, shape `(height, width + 1)`, `true` if closed
    v_walls: Array2<bool>,

    start: GridCoord,
    end: GridCoord,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One of the four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Invalid grid dimensions {0} x {1}, both must be at least 1")]
    InvalidDimensions(usize, usize),

    #[error("Cell {0:?} is outside the grid")]
    CoordOutOfBounds(GridCoord),

    #[error("Cells {0:?} and {1:?} are not adjacent")]
    NotAdjacent(GridCoord, GridCoord),

    #[error("Cannot carve a route through an empty cell sequence")]
    EmptyRoute,

    #[error("Could not generate a grid with a route from start to end in {0} attempts")]
    GenerationFailed(usize),

    #[error("There is no route between the start and end of the grid")]
    NoRoute,

    #[error("Could not access the grid file: {0}")]
    FileError(std::io::Error),

    #[error("Could not deserialise the grid file: {0}")]
    DeserialiseError(serde_json::Error),

    #[error("The grid file is corrupt: {0}")]
    CorruptData(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the side of `self` which faces `other`, or `None` if the two aren't 4-adjacent.
    pub fn side_towards(&self, other: &GridCoord) -> Option<Side> {
        if self.row == other.row {
            if other.col == self.col + 1 {
                return Some(Side::Right);
            }
            if other.col + 1 == self.col {
                return Some(Side::Left);
            }
        } else if self.col == other.col {
            if other.row == self.row + 1 {
                return Some(Side::Bottom);
            }
            if other.row + 1 == self.row {
                return Some(Side::Top);
            }
        }

        None
    }
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn opposite(&self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Cell {
    /// Returns whether the wall on the given side is closed.
    pub fn wall(&self, side: Side) -> bool {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

impl Grid {
    /// Create a grid with every wall closed.
    pub(crate) fn closed(
        width: usize,
        height: usize,
        start: GridCoord,
        end: GridCoord,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions(width, height));
        }

        let grid = Self {
            width,
            height,
            h_walls: Array2::from_elem((height + 1, width), true),
            v_walls: Array2::from_elem((height, width + 1), true),
            start,
            end,
        };

        for coord in [start, end].iter() {
            if !grid.contains(*coord) {
                return Err(GridError::CoordOutOfBounds(*coord));
            }
        }

        Ok(grid)
    }

    /// Load the grid from `path`, or if that fails for any reason build a new one using the
    /// configured generator and save it to `path`.
    pub fn load_or_generate<P: AsRef<Path>, R: Rng>(
        params: &GridParams,
        path: P,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        match Self::load(&path, params.width, params.height) {
            Ok(g) => {
                info!("Grid loaded from {:?}", path.as_ref());
                return Ok(g);
            }
            Err(e) => warn!(
                "Could not load grid from {:?} ({}), a new one will be generated",
                path.as_ref(),
                e
            ),
        }

        let grid = generate::from_params(params, rng)?;

        match grid.save(&path) {
            Ok(_) => info!("New grid saved to {:?}", path.as_ref()),
            Err(e) => warn!("Could not save the new grid: {}", e),
        }

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> GridCoord {
        self.start
    }

    pub fn end(&self) -> GridCoord {
        self.end
    }

    /// Returns true if the coordinate is inside the grid.
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Get a view of the cell at the given coordinate.
    pub fn cell(&self, coord: GridCoord) -> Option<Cell> {
        if !self.contains(coord) {
            return None;
        }

        Some(Cell {
            coord,
            top: self.wall(coord, Side::Top),
            bottom: self.wall(coord, Side::Bottom),
            left: self.wall(coord, Side::Left),
            right: self.wall(coord, Side::Right),
        })
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).filter_map(move |col| self.cell(GridCoord::new(row, col)))
        })
    }

    /// Returns true if the wall on the given side of the cell is open.
    ///
    /// Coordinates outside the grid are never open.
    pub fn is_open(&self, coord: GridCoord, side: Side) -> bool {
        self.contains(coord) && !self.wall(coord, side)
    }

    /// Get the in-bounds neighbour of `coord` on the given side, ignoring walls.
    pub fn neighbour(&self, coord: GridCoord, side: Side) -> Option<GridCoord> {
        if !self.contains(coord) {
            return None;
        }

        let n = match side {
            Side::Top => GridCoord::new(coord.row.checked_sub(1)?, coord.col),
            Side::Bottom => GridCoord::new(coord.row + 1, coord.col),
            Side::Left => GridCoord::new(coord.row, coord.col.checked_sub(1)?),
            Side::Right => GridCoord::new(coord.row, coord.col + 1),
        };

        if self.contains(n) {
            Some(n)
        } else {
            None
        }
    }

    /// Get all neighbours of `coord` which can be reached through an open wall.
    pub fn open_neighbours(&self, coord: GridCoord) -> Vec<GridCoord> {
        Side::ALL
            .iter()
            .filter(|s| self.is_open(coord, **s))
            .filter_map(|s| self.neighbour(coord, *s))
            .collect()
    }

    /// Returns true if the end cell can be reached from the start cell.
    pub fn route_exists(&self) -> bool {
        self.bfs_distance(self.start, self.end).is_some()
    }

    /// Number of edges on the shortest route between the two cells, or `None` if there is no
    /// route.
    pub fn bfs_distance(&self, from: GridCoord, to: GridCoord) -> Option<usize> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }

        let mut dist: Array2<Option<usize>> = Array2::from_elem((self.height, self.width), None);
        let mut queue = VecDeque::new();

        dist[[from.row, from.col]] = Some(0);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let d = dist[[current.row, current.col]]?;

            if current == to {
                return Some(d);
            }

            for n in self.open_neighbours(current) {
                if dist[[n.row, n.col]].is_none() {
                    dist[[n.row, n.col]] = Some(d + 1);
                    queue.push_back(n);
                }
            }
        }

        None
    }

    /// Open the walls between two adjacent cells.
    pub(crate) fn open_between(&mut self, a: GridCoord, b: GridCoord) -> Result<(), GridError> {
        for coord in [a, b].iter() {
            if !self.contains(*coord) {
                return Err(GridError::CoordOutOfBounds(*coord));
            }
        }

        let side = a.side_towards(&b).ok_or(GridError::NotAdjacent(a, b))?;
        *self.wall_mut(a, side) = false;

        Ok(())
    }

    fn wall(&self, coord: GridCoord, side: Side) -> bool {
        let (r, c) = (coord.row, coord.col);
        match side {
            Side::Top => self.h_walls[[r, c]],
            Side::Bottom => self.h_walls[[r + 1, c]],
            Side::Left => self.v_walls[[r, c]],
            Side::Right => self.v_walls[[r, c + 1]],
        }
    }

    fn wall_mut(&mut self, coord: GridCoord, side: Side) -> &mut bool {
        let (r, c) = (coord.row, coord.col);
        match side {
            Side::Top => &mut self.h_walls[[r, c]],
            Side::Bottom => &mut self.h_walls[[r + 1, c]],
            Side::Left => &mut self.v_walls[[r, c]],
            Side::Right => &mut self.v_walls[[r, c + 1]],
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Position of the centre of a cell in continuous space.
pub fn cell_centre(coord: GridCoord, cell_size: f64) -> Point2<f64> {
    grid_to_continuous(coord.col as f64, coord.row as f64, cell_size)
}

/// Map a (possibly fractional) column index `x` and row index `y` into continuous space.
pub fn grid_to_continuous(x: f64, y: f64, cell_size: f64) -> Point2<f64> {
    Point2::new((x + 0.5) * cell_size, (y + 0.5) * cell_size)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    /// Both sides of every shared edge agree, and the outer boundary is closed.
    fn assert_wall_pairs(grid: &Grid) {
        for cell in grid.cells() {
            for side in Side::ALL.iter() {
                match grid.neighbour(cell.coord, *side) {
                    Some(n) => {
                        let other = grid.cell(n).unwrap();
                        assert_eq!(
                            cell.wall(*side),
                            other.wall(side.opposite()),
                            "{:?} side of {:?} disagrees with {:?}",
                            side,
                            cell.coord,
                            n
                        );
                    }
                    None => assert!(cell.wall(*side)),
                }
            }
        }
    }

    fn corridor() -> Grid {
        // (0,0) -> (0,1) -> (0,2) -> (1,2) -> (2,2)
        generate::carve_route(
            3,
            3,
            &[
                GridCoord::new(0, 0),
                GridCoord::new(0, 1),
                GridCoord::new(0, 2),
                GridCoord::new(1, 2),
                GridCoord::new(2, 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_closed_grid() {
        let grid = Grid::closed(4, 3, GridCoord::new(0, 0), GridCoord::new(2, 3)).unwrap();

        assert!(grid.cells().all(|c| c.top && c.bottom && c.left && c.right));
        assert_eq!(grid.cells().count(), 12);
        assert!(!grid.route_exists());

        assert!(matches!(
            Grid::closed(0, 3, GridCoord::new(0, 0), GridCoord::new(0, 0)),
            Err(GridError::InvalidDimensions(0, 3))
        ));
        assert!(matches!(
            Grid::closed(2, 2, GridCoord::new(0, 0), GridCoord::new(2, 0)),
            Err(GridError::CoordOutOfBounds(_))
        ));
    }

    #[test]
    fn test_wall_pairs() {
        let grid = corridor();
        assert_wall_pairs(&grid);

        for seed in 0..10 {
            let grid =
                generate::random(&GridParams::default(), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_wall_pairs(&grid);
        }

        // Right of (0,0) is the left of (0,1)
        assert!(grid.is_open(GridCoord::new(0, 0), Side::Right));
        assert!(grid.is_open(GridCoord::new(0, 1), Side::Left));
        assert!(!grid.is_open(GridCoord::new(0, 0), Side::Bottom));
    }

    #[test]
    fn test_neighbours() {
        let grid = corridor();

        assert_eq!(grid.neighbour(GridCoord::new(0, 0), Side::Top), None);
        assert_eq!(grid.neighbour(GridCoord::new(0, 0), Side::Left), None);
        assert_eq!(
            grid.neighbour(GridCoord::new(0, 0), Side::Bottom),
            Some(GridCoord::new(1, 0))
        );
        assert_eq!(grid.neighbour(GridCoord::new(2, 2), Side::Right), None);

        let mut n = grid.open_neighbours(GridCoord::new(0, 2));
        n.sort();
        assert_eq!(n, vec![GridCoord::new(0, 1), GridCoord::new(1, 2)]);

        assert!(grid.open_neighbours(GridCoord::new(1, 0)).is_empty());
    }

    #[test]
    fn test_bfs_distance() {
        let grid = corridor();

        assert!(grid.route_exists());
        assert_eq!(grid.bfs_distance(grid.start(), grid.end()), Some(4));
        assert_eq!(
            grid.bfs_distance(GridCoord::new(0, 1), GridCoord::new(1, 2)),
            Some(2)
        );
        assert_eq!(
            grid.bfs_distance(GridCoord::new(0, 0), GridCoord::new(1, 1)),
            None
        );
        assert_eq!(
            grid.bfs_distance(GridCoord::new(0, 0), GridCoord::new(5, 5)),
            None
        );
    }

    #[test]
    fn test_side_towards() {
        let c = GridCoord::new(1, 1);
        assert_eq!(c.side_towards(&GridCoord::new(0, 1)), Some(Side::Top));
        assert_eq!(c.side_towards(&GridCoord::new(2, 1)), Some(Side::Bottom));
        assert_eq!(c.side_towards(&GridCoord::new(1, 0)), Some(Side::Left));
        assert_eq!(c.side_towards(&GridCoord::new(1, 2)), Some(Side::Right));
        assert_eq!(c.side_towards(&GridCoord::new(2, 2)), None);
        assert_eq!(c.side_towards(&c), None);
    }

    #[test]
    fn test_continuous_mapping() {
        let p = cell_centre(GridCoord::new(2, 3), 40.0);
        assert_eq!(p, Point2::new(140.0, 100.0));

        let q = grid_to_continuous(0.25, -0.5, 40.0);
        assert_eq!(q, Point2::new(30.0, 0.0));
    }
}
