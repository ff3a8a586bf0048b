//! Data-driven game balance
//!
//! Every gameplay number the chain simulation reads lives here so levels can
//! ship their own balance table as JSON.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;

/// Balance values for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Physical ball diameter (path units)
    pub ball_size: f32,
    /// Base chain speed before the level multiplier (units/sec)
    pub base_speed: f32,
    /// Duration of the gap-opening shift and projectile insertion (sec)
    pub insertion_duration: f32,
    /// Slack allowed when deciding two segments touch
    pub segment_collision_error: f32,
    /// Catch-up acceleration when facing balls share a color (units/sec²)
    pub follow_acceleration: f32,
    /// Acceleration applied to in-bounds segments while failing (units/sec²)
    pub fail_acceleration: f32,
    /// Points per eliminated ball
    pub score_per_ball: u32,
    /// Shortest same-color run that gets eliminated
    pub min_run: usize,
    /// Projectile flight speed (units/sec)
    pub projectile_speed: f32,
    /// Play area; projectiles leaving it are removed
    pub play_area: Vec2,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_size: 50.0,
            base_speed: 40.0,
            insertion_duration: 0.25,
            segment_collision_error: 1.0,
            follow_acceleration: 400.0,
            fail_acceleration: 50.0,
            score_per_ball: 50,
            min_run: 3,
            projectile_speed: 600.0,
            play_area: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Tuning {
    /// Parse a tuning table; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read a tuning table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), TrackError> {
        if !(self.ball_size > 0.0) {
            return Err(TrackError::InvalidTuning(format!(
                "ball_size must be positive, got {}",
                self.ball_size
            )));
        }
        if !(self.insertion_duration > 0.0) {
            return Err(TrackError::InvalidTuning(format!(
                "insertion_duration must be positive, got {}",
                self.insertion_duration
            )));
        }
        let rates = [
            ("base_speed", self.base_speed),
            ("follow_acceleration", self.follow_acceleration),
            ("fail_acceleration", self.fail_acceleration),
        ];
        for (name, value) in rates {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TrackError::InvalidTuning(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.min_run < 2 {
            return Err(TrackError::InvalidTuning(format!(
                "min_run must be at least 2, got {}",
                self.min_run
            )));
        }
        if self.play_area.x <= 0.0 || self.play_area.y <= 0.0 {
            return Err(TrackError::InvalidTuning("play_area must be non-empty".into()));
        }
        Ok(())
    }

    /// Speed bonus of a segment while its shift animation runs.
    /// Covers exactly one ball width over the insertion duration.
    #[inline]
    pub fn shift_bonus(&self) -> f32 {
        self.ball_size / self.insertion_duration
    }

    /// Collision radius of a ball
    #[inline]
    pub fn ball_radius(&self) -> f32 {
        self.ball_size / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.min_run, 3);
        assert!((tuning.shift_bonus() - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "ball_size": 10.0, "score_per_ball": 100 }"#).unwrap();
        assert_eq!(tuning.ball_size, 10.0);
        assert_eq!(tuning.score_per_ball, 100);
        assert_eq!(tuning.base_speed, Tuning::default().base_speed);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Tuning::from_json(r#"{ "ball_size": 0.0 }"#),
            Err(TrackError::InvalidTuning(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "min_run": 1 }"#),
            Err(TrackError::InvalidTuning(_))
        ));
        assert!(matches!(Tuning::from_json("{"), Err(TrackError::Json(_))));
    }

    #[test]
    fn test_negative_or_nan_rates_rejected() {
        for tuning in [
            Tuning {
                base_speed: -1.0,
                ..Default::default()
            },
            Tuning {
                follow_acceleration: f32::NAN,
                ..Default::default()
            },
            Tuning {
                fail_acceleration: -50.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(tuning.validate(), Err(TrackError::InvalidTuning(_))));
        }
    }
}
