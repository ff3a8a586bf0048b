//! Path geometry for the ball track
//!
//! The track is an open polyline. Everything the chain needs per frame
//! (segment lengths, directions, cumulative distances) is computed once
//! when the path is built and only read afterwards.

use glam::Vec2;

use crate::error::TrackError;
use crate::{direction_degrees, unit_from_degrees};

/// One straight piece of the track, between two consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSegment {
    /// Euclidean length
    pub length: f32,
    /// Direction in degrees, [0, 360)
    pub angle: f32,
    pub cos: f32,
    pub sin: f32,
}

impl TrackSegment {
    fn between(start: Vec2, end: Vec2) -> Self {
        let delta = end - start;
        let angle = direction_degrees(delta);
        let dir = unit_from_degrees(angle);
        Self {
            length: delta.length(),
            angle,
            cos: dir.x,
            sin: dir.y,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.cos, self.sin)
    }
}

/// Precomputed track values
#[derive(Debug, Clone)]
pub struct PathCache {
    points: Vec<Vec2>,
    segments: Vec<TrackSegment>,
    /// cumulative[i] = sum of lengths of segments 0..=i
    cumulative: Vec<f32>,
    total_length: f32,
}

impl PathCache {
    /// Build the cache from waypoints; at least two are required
    pub fn build(waypoints: &[Vec2]) -> Result<Self, TrackError> {
        if waypoints.len() < 2 {
            return Err(TrackError::InsufficientPathPoints {
                found: waypoints.len(),
            });
        }

        let segments: Vec<TrackSegment> = waypoints
            .windows(2)
            .map(|pair| TrackSegment::between(pair[0], pair[1]))
            .collect();

        let mut cumulative = Vec::with_capacity(segments.len());
        let mut total_length = 0.0;
        for segment in &segments {
            total_length += segment.length;
            cumulative.push(total_length);
        }

        Ok(Self {
            points: waypoints.to_vec(),
            segments,
            cumulative,
            total_length,
        })
    }

    #[inline]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    /// Start and end point of a track segment
    pub fn segment_endpoints(&self, index: usize) -> (Vec2, Vec2) {
        (self.points[index], self.points[index + 1])
    }

    /// Index of the track segment containing a path distance.
    /// `None` before the start or at/after the end.
    pub fn segment_at(&self, position: f32) -> Option<usize> {
        if !(position >= 0.0) || position >= self.total_length {
            return None;
        }
        let index = self.cumulative.partition_point(|&sum| sum <= position);
        (index < self.segments.len()).then_some(index)
    }

    /// Track length up to and including a segment
    pub fn cumulative_length(&self, up_to_index: usize) -> f32 {
        if up_to_index + 1 >= self.segments.len() {
            return self.total_length;
        }
        self.cumulative[up_to_index]
    }

    /// Track length before a segment starts
    #[inline]
    fn start_of(&self, index: usize) -> f32 {
        if index == 0 { 0.0 } else { self.cumulative_length(index - 1) }
    }

    /// Segment used to place a distance; out-of-range distances clamp to
    /// the first or last segment so they extrapolate along it
    fn placement_segment(&self, distance: f32) -> usize {
        match self.segment_at(distance) {
            Some(index) => index,
            None if distance < 0.0 => 0,
            None => self.segments.len() - 1,
        }
    }

    /// World position of a path distance
    pub fn world_position(&self, distance: f32) -> Vec2 {
        let index = self.placement_segment(distance);
        let along = distance - self.start_of(index);
        self.points[index] + self.segments[index].direction() * along
    }

    /// Track direction (degrees) at a path distance
    pub fn direction_at(&self, distance: f32) -> f32 {
        self.segments[self.placement_segment(distance)].angle
    }

    /// Path distance of a point lying on a given track segment
    pub fn distance_on_segment(&self, index: usize, point: Vec2) -> f32 {
        self.start_of(index) + (point - self.points[index]).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn l_path() -> PathCache {
        PathCache::build(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 50.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_requires_two_points() {
        assert!(matches!(
            PathCache::build(&[]),
            Err(TrackError::InsufficientPathPoints { found: 0 })
        ));
        assert!(matches!(
            PathCache::build(&[Vec2::ZERO]),
            Err(TrackError::InsufficientPathPoints { found: 1 })
        ));
    }

    #[test]
    fn test_segment_lengths_and_angles() {
        let path = l_path();
        assert_eq!(path.segments().len(), 2);
        assert!((path.total_length() - 150.0).abs() < 1e-4);
        assert!((path.segments()[0].angle - 0.0).abs() < 1e-4);
        assert!((path.segments()[1].angle - 90.0).abs() < 1e-4);

        let back = PathCache::build(&[Vec2::new(10.0, 10.0), Vec2::new(0.0, 0.0)]).unwrap();
        assert!((back.segments()[0].angle - 225.0).abs() < 1e-3);
    }

    #[test]
    fn test_segment_at() {
        let path = l_path();
        assert_eq!(path.segment_at(0.0), Some(0));
        assert_eq!(path.segment_at(99.9), Some(0));
        assert_eq!(path.segment_at(100.0), Some(1));
        assert_eq!(path.segment_at(149.99), Some(1));
        assert_eq!(path.segment_at(150.0), None);
        assert_eq!(path.segment_at(150.01), None);
        assert_eq!(path.segment_at(-0.01), None);
    }

    #[test]
    fn test_cumulative_length() {
        let path = l_path();
        assert!((path.cumulative_length(0) - 100.0).abs() < 1e-4);
        assert!((path.cumulative_length(1) - 150.0).abs() < 1e-4);
        assert!((path.cumulative_length(7) - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_world_position() {
        let path = l_path();
        assert!(path.world_position(50.0).distance(Vec2::new(50.0, 0.0)) < 1e-4);
        assert!(path.world_position(125.0).distance(Vec2::new(100.0, 25.0)) < 1e-4);
        // Past the end extrapolates along the last segment
        assert!(path.world_position(160.0).distance(Vec2::new(100.0, 60.0)) < 1e-4);
        // Before the start extrapolates backwards along the first
        assert!(path.world_position(-10.0).distance(Vec2::new(-10.0, 0.0)) < 1e-4);
        assert!((path.direction_at(120.0) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_length_segment_is_skipped() {
        let path = PathCache::build(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        ])
        .unwrap();
        assert_eq!(path.segment_at(10.0), Some(2));
        assert!(path.world_position(15.0).distance(Vec2::new(10.0, 5.0)) < 1e-4);
    }

    fn waypoints_strategy() -> impl Strategy<Value = Vec<(f32, f32)>> {
        prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0), 2..12)
    }

    proptest! {
        #[test]
        fn prop_total_length_is_sum_of_distances(raw in waypoints_strategy()) {
            let points: Vec<Vec2> = raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let path = PathCache::build(&points).unwrap();
            let expected: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
            prop_assert!((path.total_length() - expected).abs() <= 1e-3 * expected.max(1.0));
        }

        #[test]
        fn prop_segment_at_end_boundaries(raw in waypoints_strategy()) {
            let points: Vec<Vec2> = raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let path = PathCache::build(&points).unwrap();
            prop_assume!(path.segments().last().unwrap().length > 1.0);
            let last = path.segments().len() - 1;
            prop_assert_eq!(path.segment_at(path.total_length() - 0.01), Some(last));
            prop_assert_eq!(path.segment_at(path.total_length() + 0.01), None);
        }

        #[test]
        fn prop_world_position_stays_on_segment(raw in waypoints_strategy(), t in 0.0f32..1.0) {
            let points: Vec<Vec2> = raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let path = PathCache::build(&points).unwrap();
            let distance = t * path.total_length();
            if let Some(index) = path.segment_at(distance) {
                let p = path.world_position(distance);
                let recovered = path.distance_on_segment(index, p);
                prop_assert!((recovered - distance).abs() < 0.05);
            }
        }
    }
}
