//! Sound triggers emitted by the simulation
//!
//! The simulation never touches an audio device. It pushes these opaque
//! identifiers into the frame context and the host maps them to samples.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// A same-color run was eliminated
    BallBreak,
    /// Two chain segments touched and merged, or a projectile landed
    BallCollision,
    /// A segment catching up at speed slammed into the one ahead
    BallCollisionPitched,
}

impl SoundEffect {
    /// Stable identifier the host uses to look up the sample
    pub fn id(&self) -> &'static str {
        match self {
            SoundEffect::BallBreak => "ball_break",
            SoundEffect::BallCollision => "ball_collision",
            SoundEffect::BallCollisionPitched => "ball_collision_pitched",
        }
    }
}
