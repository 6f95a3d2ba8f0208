#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic path animator that places enemies along their routes.
//!
//! Every pair of consecutive waypoints forms one segment of fixed duration.
//! Positions are a pure function of the time elapsed since an enemy's birth,
//! so evaluating the same instant twice always yields the same point.

use skyweave_core::{Choreography, Command, EnemyView, Event, Path, Tuning, Vec3};

/// Result of evaluating a path at a given alive time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSample {
    /// Birth lies in the future; the enemy waits at the first anchor.
    Pending(Vec3),
    /// The enemy travels along the path at the given position.
    Moving(Vec3),
    /// Every segment has been travelled.
    Finished,
}

/// Evaluates the quadratic Bézier curve through `start`, `control` and `end`.
#[must_use]
pub fn quadratic_bezier(start: Vec3, control: Vec3, end: Vec3, t: f32) -> Vec3 {
    let inverse = 1.0 - t;
    start * (inverse * inverse) + control * (2.0 * t * inverse) + end * (t * t)
}

/// Evaluates `path` after `alive_time_s` seconds of travel.
#[must_use]
pub fn sample(path: &Path, alive_time_s: f32, segment_duration_s: f32) -> PathSample {
    if alive_time_s < 0.0 {
        return PathSample::Pending(path.start());
    }

    let segment = (alive_time_s / segment_duration_s).floor() as usize;
    if segment >= path.segment_count() {
        return PathSample::Finished;
    }

    let waypoints = path.waypoints();
    let (Some(from), Some(to)) = (waypoints.get(segment), waypoints.get(segment + 1)) else {
        return PathSample::Finished;
    };
    let t = alive_time_s.rem_euclid(segment_duration_s) / segment_duration_s;
    PathSample::Moving(quadratic_bezier(from.point, to.control, to.point, t))
}

/// Samples the whole path as a polyline, for debug drawing.
///
/// Produces `samples_per_segment` points per segment followed by the final
/// anchor.
#[must_use]
pub fn trace(path: &Path, samples_per_segment: usize) -> Vec<Vec3> {
    let samples_per_segment = samples_per_segment.max(1);
    let mut points = Vec::with_capacity(path.segment_count() * samples_per_segment + 1);
    for pair in path.waypoints().windows(2) {
        let [from, to] = pair else {
            continue;
        };
        for step in 0..samples_per_segment {
            let t = step as f32 / samples_per_segment as f32;
            points.push(quadratic_bezier(from.point, to.control, to.point, t));
        }
    }
    if let Some(last) = path.waypoints().last() {
        points.push(last.point);
    }
    points
}

/// Pure system that moves live enemies and retires those past their path's end.
#[derive(Debug, Default)]
pub struct PathAnimation {
    tuning: Tuning,
}

impl PathAnimation {
    /// Creates an animator using the provided timing constants.
    #[must_use]
    pub const fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Enemies whose path no longer exists are left untouched.
    pub fn handle(
        &mut self,
        events: &[Event],
        choreography: &Choreography,
        enemies: &EnemyView,
        now_s: f32,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let segment_duration_s = self.tuning.segment_duration_s();
        for enemy in enemies.iter() {
            let Some(path) = choreography.path(enemy.path) else {
                continue;
            };
            match sample(path, now_s - enemy.birth_time_s, segment_duration_s) {
                PathSample::Pending(position) | PathSample::Moving(position) => {
                    if position != enemy.position {
                        out.push(Command::MoveEnemy {
                            enemy: enemy.slot,
                            position,
                        });
                    }
                }
                PathSample::Finished => out.push(Command::RetireEnemy { enemy: enemy.slot }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyweave_core::Waypoint;

    fn swoop() -> Path {
        Path::new(
            "swoop",
            vec![
                Waypoint::at(Vec3::new(0.0, 0.0, 0.0)),
                Waypoint::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(5.0, 8.0, 0.0)),
                Waypoint::new(Vec3::new(10.0, 10.0, 0.0), Vec3::new(14.0, 5.0, 2.0)),
            ],
        )
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn bezier_starts_at_start_anchor() {
        let start = Vec3::new(1.0, 2.0, 3.0);
        let point = quadratic_bezier(start, Vec3::ONE, Vec3::ZERO, 0.0);
        assert_eq!(point, start);
    }

    #[test]
    fn bezier_approaches_end_anchor() {
        let end = Vec3::new(-4.0, 7.0, 0.5);
        let point = quadratic_bezier(Vec3::ZERO, Vec3::ONE, end, 0.999_999);
        assert!(close(point, end));
        assert!(close(quadratic_bezier(Vec3::ZERO, Vec3::ONE, end, 1.0), end));
    }

    #[test]
    fn bezier_stays_inside_control_hull_bounds() {
        let start = Vec3::new(-3.0, 0.0, 1.0);
        let control = Vec3::new(4.0, 9.0, -2.0);
        let end = Vec3::new(6.0, -1.0, 5.0);
        let lower = start.min(control).min(end);
        let upper = start.max(control).max(end);
        for step in 0..=64 {
            let t = step as f32 / 64.0;
            let point = quadratic_bezier(start, control, end, t);
            assert!(point.cmpge(lower - Vec3::splat(1e-5)).all(), "t={t}");
            assert!(point.cmple(upper + Vec3::splat(1e-5)).all(), "t={t}");
        }
    }

    #[test]
    fn pending_enemy_waits_at_first_anchor() {
        assert_eq!(sample(&swoop(), -0.5, 1.0), PathSample::Pending(Vec3::ZERO));
    }

    #[test]
    fn segment_boundaries_hit_anchors() {
        let path = swoop();
        assert_eq!(sample(&path, 0.0, 2.0), PathSample::Moving(Vec3::ZERO));
        assert_eq!(
            sample(&path, 2.0, 2.0),
            PathSample::Moving(Vec3::new(10.0, 0.0, 0.0))
        );
    }

    #[test]
    fn path_finishes_after_last_segment() {
        let path = swoop();
        assert!(matches!(sample(&path, 3.99, 2.0), PathSample::Moving(_)));
        assert_eq!(sample(&path, 4.0, 2.0), PathSample::Finished);
        assert_eq!(sample(&path, 40.0, 2.0), PathSample::Finished);
    }

    #[test]
    fn single_waypoint_path_finishes_immediately() {
        let path = Path::new("dot", vec![Waypoint::at(Vec3::ONE)]);
        assert_eq!(sample(&path, 0.0, 1.0), PathSample::Finished);
        assert_eq!(sample(&path, -1.0, 1.0), PathSample::Pending(Vec3::ONE));
    }

    #[test]
    fn sampling_is_repeatable() {
        let path = swoop();
        let first = sample(&path, 2.7, 1.5);
        let second = sample(&path, 2.7, 1.5);
        assert_eq!(first, second);
    }

    #[test]
    fn trace_covers_every_segment_and_ends_on_last_anchor() {
        let path = swoop();
        let points = trace(&path, 8);
        assert_eq!(points.len(), 17);
        assert_eq!(points[0], Vec3::ZERO);
        assert_eq!(points[8], Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(points[16], Vec3::new(10.0, 10.0, 0.0));
    }
}
