//! Grid generators
//!
//! All generators place the start cell at the top-left corner `(0, 0)` and the end cell at the
//! bottom-right corner `(height - 1, width - 1)`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use ndarray::Array2;
use rand::Rng;

use super::{GeneratorKind, Grid, GridCoord, GridError, GridParams, Side};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Generate a grid using the generator selected in the parameters.
pub fn from_params<R: Rng>(params: &GridParams, rng: &mut R) -> Result<Grid, GridError> {
    match params.generator {
        GeneratorKind::Random => random(params, rng),
        GeneratorKind::SimpleRoute => simple_route(params),
    }
}

/// Generate a random grid with randomised Prim's algorithm.
///
/// The result is a spanning tree over every cell, so there is exactly one route between any two
/// cells. The reachability check is still run on every attempt, and generation fails only if no
/// attempt out of `max_generation_attempts` produces a route from start to end.
pub fn random<R: Rng>(params: &GridParams, rng: &mut R) -> Result<Grid, GridError> {
    let (start, end) = corners(params.width, params.height)?;

    for attempt in 0..params.max_generation_attempts {
        let grid = prim(params.width, params.height, start, end, rng)?;

        if grid.route_exists() {
            debug!("Random grid generated after {} attempt(s)", attempt + 1);
            return Ok(grid);
        }

        warn!("Generated grid has no route (attempt {})", attempt + 1);
    }

    Err(GridError::GenerationFailed(params.max_generation_attempts))
}

/// Generate the simple route: a single corridor running east along the top row to the middle
/// column, south to the bottom row, and then east to the end cell. All other walls are closed.
///
/// On grids at least 3 wide and 2 high this corridor has exactly two turns.
pub fn simple_route(params: &GridParams) -> Result<Grid, GridError> {
    let (_, end) = corners(params.width, params.height)?;
    let mid = params.width / 2;

    let route: Vec<GridCoord> = (0..=mid)
        .map(|col| GridCoord::new(0, col))
        .chain((1..params.height).map(|row| GridCoord::new(row, mid)))
        .chain((mid + 1..params.width).map(|col| GridCoord::new(end.row, col)))
        .collect();

    carve_route(params.width, params.height, &route)
}

/// Build a grid with every wall closed except those along the given sequence of cells.
///
/// The first cell becomes the start and the last the end. Consecutive cells must be adjacent.
pub fn carve_route(width: usize, height: usize, cells: &[GridCoord]) -> Result<Grid, GridError> {
    let (first, last) = match (cells.first(), cells.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(GridError::EmptyRoute),
    };

    let mut grid = Grid::closed(width, height, first, last)?;

    for pair in cells.windows(2) {
        grid.open_between(pair[0], pair[1])?;
    }

    Ok(grid)
}

fn corners(width: usize, height: usize) -> Result<(GridCoord, GridCoord), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions(width, height));
    }

    Ok((GridCoord::new(0, 0), GridCoord::new(height - 1, width - 1)))
}

fn prim<R: Rng>(
    width: usize,
    height: usize,
    start: GridCoord,
    end: GridCoord,
    rng: &mut R,
) -> Result<Grid, GridError> {
    let mut grid = Grid::closed(width, height, start, end)?;
    let mut visited = Array2::from_elem((height, width), false);
    let mut frontier: Vec<(GridCoord, Side)> = Vec::new();

    visited[[start.row, start.col]] = true;
    push_walls(&grid, start, &mut frontier);

    while !frontier.is_empty() {
        let (coord, side) = frontier.swap_remove(rng.gen_range(0..frontier.len()));

        let far = match grid.neighbour(coord, side) {
            Some(n) => n,
            None => continue,
        };

        if visited[[far.row, far.col]] {
            continue;
        }

        grid.open_between(coord, far)?;
        visited[[far.row, far.col]] = true;
        push_walls(&grid, far, &mut frontier);
    }

    Ok(grid)
}

/// Push every wall of `coord` that has a cell on the far side.
fn push_walls(grid: &Grid, coord: GridCoord, frontier: &mut Vec<(GridCoord, Side)>) {
    for side in Side::ALL.iter() {
        if grid.neighbour(coord, *side).is_some() {
            frontier.push((coord, *side));
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
