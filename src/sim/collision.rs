//! Collision primitives for circles against straight track segments
//!
//! Pure functions; the chain manager combines them with the path cache to
//! turn a projectile position into a hit on a ball segment.

use glam::Vec2;

/// Degenerate segments shorter than this (squared) are treated as points
const DEGENERATE_LEN_SQ: f32 = 1e-8;

/// Closest point to `point` on the segment `p1`-`p2`
///
/// Standard projection, clamped to the segment's [0, 1] parametric range.
pub fn closest_point_on_segment(p1: Vec2, p2: Vec2, point: Vec2) -> Vec2 {
    let line_vec = p2 - p1;
    let line_len_sq = line_vec.length_squared();
    if line_len_sq < DEGENERATE_LEN_SQ {
        return p1;
    }
    let t = ((point - p1).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    p1 + line_vec * t
}

/// Whether a circle touches the segment `p1`-`p2`
///
/// True when either endpoint lies within the radius, or the perpendicular
/// projection of the center falls inside the segment and within the radius.
pub fn circle_intersects_segment(p1: Vec2, p2: Vec2, center: Vec2, radius: f32) -> bool {
    let radius_sq = radius * radius;
    if center.distance_squared(p1) <= radius_sq || center.distance_squared(p2) <= radius_sq {
        return true;
    }

    let line_vec = p2 - p1;
    let line_len_sq = line_vec.length_squared();
    if line_len_sq < DEGENERATE_LEN_SQ {
        return false;
    }
    let t = (center - p1).dot(line_vec) / line_len_sq;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    let projected = p1 + line_vec * t;
    center.distance_squared(projected) <= radius_sq
}
