//! Ball Track - ball-chain path simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (path geometry, chains, projectiles)
//! - `tuning`: Data-driven game balance
//! - `level`: Already-parsed level data (waypoints, chain size, speed)
//! - `audio`: Abstract sound-trigger identifiers emitted by the simulation
//! - `error`: Construction and configuration errors

pub mod audio;
pub mod error;
pub mod level;
pub mod sim;
pub mod tuning;

pub use audio::SoundEffect;
pub use error::TrackError;
pub use level::LevelData;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo loop (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Number of distinct ball colors
    pub const BALL_COLOR_COUNT: usize = 6;

    /// Particle burst defaults (cosmetic only)
    pub const PARTICLE_MIN_COUNT: u32 = 10;
    pub const PARTICLE_MAX_COUNT: u32 = 20;
    pub const PARTICLE_MIN_VELOCITY: f32 = 10.0;
    pub const PARTICLE_MAX_VELOCITY: f32 = 200.0;
    pub const PARTICLE_GRAVITY: f32 = 100.0;
    pub const PARTICLE_SIZE: f32 = 10.0;
    /// Particle lifetime in seconds
    pub const PARTICLE_LIFE: f32 = 1.5;
    /// Hard cap on live particles
    pub const MAX_PARTICLES: usize = 2048;

    /// Balls over which a ball fades out before the end of the path
    pub const FADE_BALLS: f32 = 3.0;

    /// Seconds between two shots
    pub const SHOOTER_COOLDOWN: f32 = 0.3;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Direction of a vector in degrees, normalized to [0, 360)
#[inline]
pub fn direction_degrees(v: Vec2) -> f32 {
    normalize_degrees(v.y.atan2(v.x).to_degrees())
}

/// Unit vector for an angle in degrees
#[inline]
pub fn unit_from_degrees(angle: f32) -> Vec2 {
    let rad = angle.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}
