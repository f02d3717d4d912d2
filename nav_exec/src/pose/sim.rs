//! Simulated pose source

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use util::maths::wrap_pi;

use crate::grid::{cell_centre, GridCoord};

use super::{PoseSample, PoseSource, PoseSourceError, SimPoseParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Emits noisy samples along a path, one point per `sample_interval_s`.
pub struct SimPoseSource {
    params: SimPoseParams,

    /// Points to emit, in order
    points: Vec<Point2<f64>>,

    /// True heading at each point
    headings: Vec<f64>,

    /// Index of the next point to emit
    next_idx: usize,

    /// Time of the last emission
    last_emit_s: Option<f64>,

    rng: StdRng,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimPoseSource {
    /// Create a source which walks along the centres of the cells in `path`.
    pub fn new(
        path: &[GridCoord],
        cell_size: f64,
        params: SimPoseParams,
    ) -> Result<Self, PoseSourceError> {
        let centres: Vec<Point2<f64>> = path.iter().map(|c| cell_centre(*c, cell_size)).collect();

        Self::from_points(&centres, params)
    }

    /// Create a source which walks along the given continuous space waypoints.
    pub fn from_points(
        waypoints: &[Point2<f64>],
        params: SimPoseParams,
    ) -> Result<Self, PoseSourceError> {
        if waypoints.is_empty() {
            return Err(PoseSourceError::EmptyPath);
        }

        if !(params.sample_interval_s >= 0.0) {
            return Err(PoseSourceError::InvalidParams(format!(
                "sample_interval_s must be non-negative, found {}",
                params.sample_interval_s
            )));
        }
        if !(params.position_noise_sd >= 0.0) || !(params.heading_noise_sd >= 0.0) {
            return Err(PoseSourceError::InvalidParams(
                "noise standard deviations must be non-negative".into(),
            ));
        }

        let points = match params.interpolation_step {
            Some(step) if step > 0.0 => interpolate(waypoints, step),
            Some(step) => {
                return Err(PoseSourceError::InvalidParams(format!(
                    "interpolation_step must be positive, found {}",
                    step
                )))
            }
            None => waypoints.to_vec(),
        };

        let headings = headings(&points);

        let rng = match params.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        debug!(
            "Simulated pose source with {} points from {} waypoints",
            points.len(),
            waypoints.len()
        );

        Ok(Self {
            params,
            points,
            headings,
            next_idx: 0,
            last_emit_s: None,
            rng,
        })
    }

    /// Number of points the source walks through, before the `max_samples` limit.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Largest distance between two consecutive points of the stream, before noise.
    pub fn max_spacing(&self) -> f64 {
        self.points
            .windows(2)
            .map(|p| (p[1] - p[0]).norm())
            .fold(0.0, f64::max)
    }

    /// Number of samples emitted so far.
    pub fn num_emitted(&self) -> usize {
        self.next_idx
    }

    fn noise(&mut self, sd: f64) -> f64 {
        let n: f64 = self.rng.sample(StandardNormal);
        n * sd
    }
}

impl PoseSource for SimPoseSource {
    fn next_pose(&mut self, now_s: f64) -> Option<PoseSample> {
        if self.is_exhausted() {
            return None;
        }

        if let Some(last) = self.last_emit_s {
            if now_s - last < self.params.sample_interval_s {
                return None;
            }
        }

        let point = self.points[self.next_idx];
        let heading = self.headings[self.next_idx];

        let (pos_sd, head_sd) = (self.params.position_noise_sd, self.params.heading_noise_sd);
        let position = Point2::new(point.x + self.noise(pos_sd), point.y + self.noise(pos_sd));
        let heading_rad = wrap_pi(heading + self.noise(head_sd));

        self.next_idx += 1;
        self.last_emit_s = Some(now_s);

        Some(PoseSample {
            position,
            heading_rad,
            time_s: now_s,
        })
    }

    fn is_exhausted(&self) -> bool {
        self.next_idx >= self.points.len().min(self.params.max_samples)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Resample the waypoints so that consecutive points are at most `step` apart.
///
/// Each segment is split into equal parts, and every waypoint is kept.
fn interpolate(waypoints: &[Point2<f64>], step: f64) -> Vec<Point2<f64>> {
    let mut points = Vec::new();

    for pair in waypoints.windows(2) {
        let diff = pair[1] - pair[0];
        let num_steps = (diff.norm() / step).ceil().max(1.0) as usize;
        let delta = diff / (num_steps as f64);

        for i in 0..num_steps {
            points.push(pair[0] + delta * (i as f64));
        }
    }

    if let Some(last) = waypoints.last() {
        points.push(*last);
    }

    points
}

/// Heading at each point, from the previous point. The first point faces the second.
fn headings(points: &[Point2<f64>]) -> Vec<f64> {
    (0..points.len())
        .map(|i| {
            let diff = match i {
                0 if points.len() > 1 => points[1] - points[0],
                0 => return 0.0,
                _ => points[i] - points[i - 1],
            };
            diff.y.atan2(diff.x)
        })
        .collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn noiseless() -> SimPoseParams {
        SimPoseParams {
            position_noise_sd: 0.0,
            heading_noise_sd: 0.0,
            seed: Some(0),
            ..Default::default()
        }
    }

    fn drain(source: &mut SimPoseSource, dt: f64) -> Vec<PoseSample> {
        let mut samples = Vec::new();
        let mut t = 0.0;
        while !source.is_exhausted() {
            if let Some(s) = source.next_pose(t) {
                samples.push(s);
            }
            t += dt;
        }
        samples
    }

    #[test]
    fn test_interpolate() {
        let path = [GridCoord::new(0, 0), GridCoord::new(0, 1), GridCoord::new(1, 1)];
        let source = SimPoseSource::new(&path, 40.0, noiseless()).unwrap();

        // Two 40 long segments in steps of 10, plus the final point
        assert_eq!(source.num_points(), 9);
        assert_eq!(source.points[1], Point2::new(30.0, 20.0));
        assert_eq!(source.points[4], Point2::new(60.0, 20.0));
        assert_eq!(source.points[8], Point2::new(60.0, 60.0));

        let coarse = SimPoseSource::new(
            &path,
            40.0,
            SimPoseParams {
                interpolation_step: None,
                ..noiseless()
            },
        )
        .unwrap();
        assert_eq!(coarse.num_points(), 3);
    }

    #[test]
    fn test_max_spacing() {
        let path = [GridCoord::new(0, 0), GridCoord::new(0, 1), GridCoord::new(1, 1)];

        let fine = SimPoseSource::new(&path, 40.0, noiseless()).unwrap();
        assert!((fine.max_spacing() - 10.0).abs() < 1e-12);

        // Without interpolation the points are a whole cell apart
        let coarse = SimPoseSource::new(
            &path,
            40.0,
            SimPoseParams {
                interpolation_step: None,
                ..noiseless()
            },
        )
        .unwrap();
        assert!((coarse.max_spacing() - 40.0).abs() < 1e-12);

        let single = SimPoseSource::new(&[GridCoord::new(0, 0)], 40.0, noiseless()).unwrap();
        assert_eq!(single.max_spacing(), 0.0);
    }

    #[test]
    fn test_headings() {
        let path = [GridCoord::new(0, 0), GridCoord::new(0, 1), GridCoord::new(1, 1)];
        let mut source = SimPoseSource::new(&path, 40.0, noiseless()).unwrap();

        let samples = drain(&mut source, 0.5);
        assert_eq!(samples.len(), 9);

        // First point faces the second, then east until the corner, then south
        assert_eq!(samples[0].heading_rad, 0.0);
        assert_eq!(samples[4].heading_rad, 0.0);
        assert!((samples[5].heading_rad - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(samples[5].position, Point2::new(60.0, 30.0));

        let mut single =
            SimPoseSource::new(&[GridCoord::new(2, 2)], 40.0, noiseless()).unwrap();
        let s = single.next_pose(0.0).unwrap();
        assert_eq!(s.heading_rad, 0.0);
        assert_eq!(s.position, Point2::new(100.0, 100.0));
        assert!(single.is_exhausted());
        assert!(single.next_pose(10.0).is_none());
    }

    #[test]
    fn test_time_gating() {
        let path = [GridCoord::new(0, 0), GridCoord::new(0, 3)];
        let mut source = SimPoseSource::new(
            &path,
            40.0,
            SimPoseParams {
                interpolation_step: None,
                ..noiseless()
            },
        )
        .unwrap();

        let first = source.next_pose(1.0).unwrap();
        assert_eq!(first.time_s, 1.0);
        assert!(source.next_pose(1.2).is_none());
        assert!(source.next_pose(1.49).is_none());
        assert!(source.next_pose(1.5).is_some());
        assert!(source.is_exhausted());
        assert!(source.next_pose(5.0).is_none());
    }

    #[test]
    fn test_max_samples() {
        let path: Vec<GridCoord> = (0..10).map(|c| GridCoord::new(0, c)).collect();
        let mut source = SimPoseSource::new(
            &path,
            40.0,
            SimPoseParams {
                max_samples: 3,
                ..noiseless()
            },
        )
        .unwrap();

        let samples = drain(&mut source, 0.5);
        assert_eq!(samples.len(), 3);
        assert_eq!(source.num_emitted(), 3);
        assert!(source.next_pose(100.0).is_none());
    }

    #[test]
    fn test_noise() {
        let path: Vec<GridCoord> = (0..10).map(|c| GridCoord::new(0, c)).collect();
        let params = SimPoseParams {
            seed: Some(42),
            ..Default::default()
        };

        let a = drain(&mut SimPoseSource::new(&path, 40.0, params.clone()).unwrap(), 0.5);
        let b = drain(&mut SimPoseSource::new(&path, 40.0, params).unwrap(), 0.5);

        // Seeded noise is reproducible
        assert_eq!(a, b);

        // Noise is present but small compared to the step size
        assert!(a.iter().any(|s| (s.position.y - 20.0).abs() > 1e-6));
        assert!(a.iter().all(|s| (s.position.y - 20.0).abs() < 10.0));
        assert!(a.iter().all(|s| s.heading_rad.abs() < 0.2));
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            SimPoseSource::new(&[], 40.0, noiseless()),
            Err(PoseSourceError::EmptyPath)
        ));

        assert!(matches!(
            SimPoseSource::new(
                &[GridCoord::new(0, 0)],
                40.0,
                SimPoseParams {
                    interpolation_step: Some(0.0),
                    ..noiseless()
                }
            ),
            Err(PoseSourceError::InvalidParams(_))
        ));

        assert!(matches!(
            SimPoseSource::new(
                &[GridCoord::new(0, 0)],
                40.0,
                SimPoseParams {
                    position_noise_sd: -1.0,
                    ..noiseless()
                }
            ),
            Err(PoseSourceError::InvalidParams(_))
        ));
    }
}
