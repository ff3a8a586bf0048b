//! A contiguous run of balls moving together along the path

use super::state::{Ball, BallColor};

/// Gap-opening animation state of a segment
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ShiftState {
    #[default]
    Stable,
    /// Moving one extra ball width forward over `duration` seconds
    Opening { elapsed: f32, duration: f32 },
}

/// Balls anchored at a path distance
///
/// Index 0 is the back (trailing) ball sitting at `anchor`; ball `i` sits
/// at `anchor + i * ball_size`, so the last ball leads the segment.
#[derive(Debug, Clone)]
pub struct BallSegment {
    /// Stable identifier; indices shift as segments split and merge
    pub id: u32,
    pub balls: Vec<Ball>,
    /// Path distance of the back ball
    pub anchor: f32,
    /// Transient speed on top of the chain speed (catch-up, fail rush)
    pub extra_speed: f32,
    pub shift: ShiftState,
    ball_size: f32,
}

impl BallSegment {
    pub fn new(id: u32, anchor: f32, balls: Vec<Ball>, ball_size: f32) -> Self {
        Self {
            id,
            balls,
            anchor,
            extra_speed: 0.0,
            shift: ShiftState::Stable,
            ball_size,
        }
    }

    pub fn from_colors(id: u32, anchor: f32, colors: &[BallColor], ball_size: f32) -> Self {
        Self::new(id, anchor, colors.iter().copied().map(Ball::new).collect(), ball_size)
    }

    #[inline]
    pub fn ball_size(&self) -> f32 {
        self.ball_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Occupied path length
    #[inline]
    pub fn total_length(&self) -> f32 {
        self.ball_size * self.balls.len() as f32
    }

    /// Path distance just past the leading ball
    #[inline]
    pub fn leading_edge(&self) -> f32 {
        self.anchor + self.total_length()
    }

    /// Path distance of ball `index`
    #[inline]
    pub fn position_of(&self, index: usize) -> f32 {
        self.anchor + index as f32 * self.ball_size
    }

    pub fn colors(&self) -> impl Iterator<Item = BallColor> + '_ {
        self.balls.iter().map(|b| b.color)
    }

    pub fn back_color(&self) -> Option<BallColor> {
        self.balls.first().map(|b| b.color)
    }

    pub fn front_color(&self) -> Option<BallColor> {
        self.balls.last().map(|b| b.color)
    }

    #[inline]
    pub fn is_shifting(&self) -> bool {
        matches!(self.shift, ShiftState::Opening { .. })
    }

    /// (Re)start the gap-opening animation
    pub fn begin_shift(&mut self, duration: f32) {
        self.shift = ShiftState::Opening {
            elapsed: 0.0,
            duration,
        };
    }

    /// Advance the shift timer.
    /// Returns the overrun past the duration on the tick the shift finishes.
    pub fn tick_shift(&mut self, dt: f32) -> Option<f32> {
        let ShiftState::Opening { elapsed, duration } = &mut self.shift else {
            return None;
        };
        *elapsed += dt;
        if *elapsed < *duration {
            return None;
        }
        let overrun = *elapsed - *duration;
        self.shift = ShiftState::Stable;
        Some(overrun)
    }

    /// Split at `boundary`: balls `boundary..` leave in a new segment that
    /// keeps their path positions. The new segment starts stable.
    pub fn split_off(&mut self, boundary: usize, new_id: u32) -> BallSegment {
        let rest = self.balls.split_off(boundary);
        let anchor = self.leading_edge();
        BallSegment::new(new_id, anchor, rest, self.ball_size)
    }

    /// Append the balls of the segment ahead, snapping them behind ours
    pub fn absorb(&mut self, front: BallSegment) {
        self.balls.extend(front.balls);
    }
}
