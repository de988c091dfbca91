//! Polyline paths that enemies traverse from spawn to exit.

use glam::Vec2;

/// Fixed curve sampled by distance travelled.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Path {
    waypoints: Vec<Vec2>,
    /// Cumulative distance at each waypoint; the first entry is zero.
    offsets: Vec<f32>,
}

impl Path {
    /// Builds a path, returning `None` unless it has a positive, finite length.
    pub(crate) fn new(waypoints: Vec<Vec2>) -> Option<Self> {
        if waypoints.len() < 2 || waypoints.iter().any(|point| !point.is_finite()) {
            return None;
        }

        let mut offsets = Vec::with_capacity(waypoints.len());
        let mut travelled = 0.0;
        offsets.push(travelled);
        for pair in waypoints.windows(2) {
            travelled += pair[0].distance(pair[1]);
            offsets.push(travelled);
        }

        if !(travelled > 0.0) || !travelled.is_finite() {
            return None;
        }

        Some(Self { waypoints, offsets })
    }

    /// Total length of the path in world units.
    pub(crate) fn length(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Position at `distance` along the path, clamped to the endpoints.
    pub(crate) fn sample(&self, distance: f32) -> Vec2 {
        let first = self.waypoints[0];
        let last = self.waypoints[self.waypoints.len() - 1];
        if !(distance > 0.0) {
            return first;
        }
        if distance >= self.length() {
            return last;
        }

        let segment = self.offsets.partition_point(|offset| *offset <= distance);
        let start_index = segment.saturating_sub(1);
        let start = self.waypoints[start_index];
        let end = self.waypoints[start_index + 1];
        let span = self.offsets[start_index + 1] - self.offsets[start_index];
        if span <= f32::EPSILON {
            return end;
        }

        let t = (distance - self.offsets[start_index]) / span;
        start.lerp(end, t)
    }
}

#[cfg(test)]
mod tests {
    use super::Path;
    use glam::Vec2;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            actual.distance(expected) < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn rejects_degenerate_paths() {
        assert!(Path::new(Vec::new()).is_none());
        assert!(Path::new(vec![Vec2::ZERO]).is_none());
        assert!(Path::new(vec![Vec2::ONE, Vec2::ONE]).is_none());
        assert!(Path::new(vec![Vec2::ZERO, Vec2::new(f32::NAN, 0.0)]).is_none());
    }

    #[test]
    fn length_sums_segments() {
        let path = Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 4.0),
        ])
        .expect("valid path");
        assert!((path.length() - 7.0).abs() < 1e-5);
    }

    #[test]
    fn sampling_interpolates_across_segments() {
        let path = Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        ])
        .expect("valid path");

        assert_close(path.sample(0.0), Vec2::new(0.0, 0.0));
        assert_close(path.sample(5.0), Vec2::new(5.0, 0.0));
        assert_close(path.sample(10.0), Vec2::new(10.0, 0.0));
        assert_close(path.sample(15.0), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn sampling_clamps_outside_the_path() {
        let path = Path::new(vec![Vec2::new(1.0, 1.0), Vec2::new(1.0, 9.0)]).expect("valid path");

        assert_close(path.sample(-3.0), Vec2::new(1.0, 1.0));
        assert_close(path.sample(100.0), Vec2::new(1.0, 9.0));
    }
}
