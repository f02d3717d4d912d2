//! Turn extraction
//!
//! Turn angles are measured in the north-up map frame, where moving one column east is `(+1, 0)`
//! and moving one row south is `(0, -1)`. A positive (counter-clockwise) change of heading is a
//! [`TurnDirection::Left`] turn, a negative one is [`TurnDirection::Right`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::haptic::TurnDirection;
use nalgebra::Vector2;
use util::maths::wrap_180;

use crate::grid::{cell_centre, GridCoord};

use super::TurnPoint;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find the turns along a path.
///
/// Each interior cell is compared against its neighbours in the path. Cells where the path runs
/// straight through are skipped, otherwise the cell is a turn if the heading changes by more than
/// `threshold_deg`.
pub fn extract_turns(path: &[GridCoord], cell_size: f64, threshold_deg: f64) -> Vec<TurnPoint> {
    let mut turns = Vec::new();

    if path.len() < 3 {
        return turns;
    }

    for i in 1..path.len() - 1 {
        let incoming = map_vector(path[i - 1], path[i]);
        let outgoing = map_vector(path[i], path[i + 1]);

        // Collinear
        if incoming.perp(&outgoing) == 0.0 {
            continue;
        }

        let diff_deg = wrap_180(heading_deg(&outgoing) - heading_deg(&incoming));

        if diff_deg.abs() > threshold_deg {
            turns.push(TurnPoint {
                path_index: i,
                coord: path[i],
                position: cell_centre(path[i], cell_size),
                direction: if diff_deg > 0.0 {
                    TurnDirection::Left
                } else {
                    TurnDirection::Right
                },
                angle_deg: diff_deg.abs(),
            });
        }
    }

    turns
}

/// Vector between two cells in the north-up map frame.
fn map_vector(from: GridCoord, to: GridCoord) -> Vector2<f64> {
    Vector2::new(
        to.col as f64 - from.col as f64,
        from.row as f64 - to.row as f64,
    )
}

fn heading_deg(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Point2;

    fn coords(cells: &[(usize, usize)]) -> Vec<GridCoord> {
        cells.iter().map(|(r, c)| GridCoord::new(*r, *c)).collect()
    }

    #[test]
    fn test_single_right_turn() {
        let path = coords(&[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]);

        let turns = extract_turns(&path, 40.0, 10.0);

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].path_index, 2);
        assert_eq!(turns[0].coord, GridCoord::new(0, 2));
        assert_eq!(turns[0].direction, TurnDirection::Right);
        assert!((turns[0].angle_deg - 90.0).abs() < 1e-9);
        assert_eq!(turns[0].position, Point2::new(100.0, 20.0));
    }

    #[test]
    fn test_directions() {
        // North then west is a left turn
        let path = coords(&[(2, 1), (1, 1), (1, 0)]);
        let turns = extract_turns(&path, 1.0, 10.0);
        assert_eq!(turns[0].direction, TurnDirection::Left);

        // West then south is a left turn
        let path = coords(&[(0, 2), (0, 1), (1, 1)]);
        let turns = extract_turns(&path, 1.0, 10.0);
        assert_eq!(turns[0].direction, TurnDirection::Left);

        // South then west is a right turn
        let path = coords(&[(0, 1), (1, 1), (1, 0)]);
        let turns = extract_turns(&path, 1.0, 10.0);
        assert_eq!(turns[0].direction, TurnDirection::Right);
    }

    #[test]
    fn test_staircase() {
        // Every interior cell alternates right and left
        let path = coords(&[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]);

        let dirs: Vec<TurnDirection> = extract_turns(&path, 1.0, 10.0)
            .iter()
            .map(|t| t.direction)
            .collect();

        assert_eq!(
            dirs,
            vec![
                TurnDirection::Right,
                TurnDirection::Left,
                TurnDirection::Right
            ]
        );
    }

    #[test]
    fn test_straight_and_short() {
        assert!(extract_turns(&coords(&[(0, 0), (0, 1), (0, 2), (0, 3)]), 1.0, 10.0).is_empty());
        assert!(extract_turns(&coords(&[(0, 0), (0, 1)]), 1.0, 10.0).is_empty());
        assert!(extract_turns(&[], 1.0, 10.0).is_empty());
    }

    #[test]
    fn test_threshold() {
        let path = coords(&[(0, 0), (0, 1), (1, 1)]);

        assert!(extract_turns(&path, 1.0, 90.0).is_empty());
        assert_eq!(extract_turns(&path, 1.0, 89.0).len(), 1);
    }
}
