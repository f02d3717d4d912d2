//! Grid persistence
//!
//! Grids are stored as JSON:
//!
//! ```json
//! {
//!   "width": 15,
//!   "height": 10,
//!   "cells": [[{ "top": true, "bottom": false, "left": true, "right": false }, ...], ...],
//!   "start": [0, 0],
//!   "end": [9, 14]
//! }
//! ```
//!
//! with `cells` in row-major order. Loading validates the record against the configured grid
//! dimensions and checks that neighbouring cells agree on the wall between them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::{Grid, GridCoord, GridError, Side};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct GridRecord {
    width: usize,
    height: usize,
    cells: Vec<Vec<CellRecord>>,
    start: [usize; 2],
    end: [usize; 2],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CellRecord {
    top: bool,
    bottom: bool,
    left: bool,
    right: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Grid {
    /// Serialise the grid into its persisted JSON form.
    pub fn to_json(&self) -> String {
        let cells = (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| {
                        let coord = GridCoord::new(row, col);
                        CellRecord {
                            top: self.wall(coord, Side::Top),
                            bottom: self.wall(coord, Side::Bottom),
                            left: self.wall(coord, Side::Left),
                            right: self.wall(coord, Side::Right),
                        }
                    })
                    .collect()
            })
            .collect();

        let record = GridRecord {
            width: self.width,
            height: self.height,
            cells,
            start: [self.start.row, self.start.col],
            end: [self.end.row, self.end.col],
        };

        format!("{:#}", serde_json::json!(record))
    }

    /// Parse a persisted grid, which must have the given dimensions.
    pub fn from_json(json: &str, width: usize, height: usize) -> Result<Self, GridError> {
        let record: GridRecord = serde_json::from_str(json).map_err(GridError::DeserialiseError)?;

        if record.width != width || record.height != height {
            return Err(GridError::CorruptData(format!(
                "expected a {} x {} grid, found {} x {}",
                width, height, record.width, record.height
            )));
        }

        if record.cells.len() != height || record.cells.iter().any(|r| r.len() != width) {
            return Err(GridError::CorruptData(format!(
                "cell table doesn't match the {} x {} grid",
                width, height
            )));
        }

        let start = GridCoord::new(record.start[0], record.start[1]);
        let end = GridCoord::new(record.end[0], record.end[1]);

        let mut grid = Grid::closed(width, height, start, end).map_err(|e| match e {
            GridError::CoordOutOfBounds(c) => {
                GridError::CorruptData(format!("start or end {:?} is outside the grid", c))
            }
            e => e,
        })?;

        for (row, cells) in record.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let coord = GridCoord::new(row, col);

                if (row == 0 && !cell.top)
                    || (row == height - 1 && !cell.bottom)
                    || (col == 0 && !cell.left)
                    || (col == width - 1 && !cell.right)
                {
                    return Err(GridError::CorruptData(format!(
                        "outer wall of {:?} is open",
                        coord
                    )));
                }

                if row > 0 && record.cells[row - 1][col].bottom != cell.top {
                    return Err(GridError::CorruptData(format!(
                        "top wall of {:?} disagrees with the cell above",
                        coord
                    )));
                }

                if col > 0 && record.cells[row][col - 1].right != cell.left {
                    return Err(GridError::CorruptData(format!(
                        "left wall of {:?} disagrees with the cell to the left",
                        coord
                    )));
                }

                grid.h_walls[[row, col]] = cell.top;
                grid.v_walls[[row, col]] = cell.left;
            }
        }

        if !grid.route_exists() {
            return Err(GridError::NoRoute);
        }

        Ok(grid)
    }

    /// Save the grid to the given path, creating parent directories if needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GridError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(GridError::FileError)?;
        }

        fs::write(path, self.to_json()).map_err(GridError::FileError)
    }

    /// Load a grid of the given dimensions from the given path.
    pub fn load<P: AsRef<Path>>(path: P, width: usize, height: usize) -> Result<Self, GridError> {
        let json = fs::read_to_string(path).map_err(GridError::FileError)?;

        Self::from_json(&json, width, height)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
