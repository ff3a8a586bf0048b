//! Level data handed to the simulation by the level loader
//!
//! The loader owns file formats; this is the already-parsed shape, with a
//! JSON helper for tools and the demo binary.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;

fn default_speed_multiplier() -> f32 {
    1.0
}

fn default_ball_count() -> usize {
    30
}

/// One playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Path the chain follows, start to death window
    pub waypoints: Vec<Vec2>,
    /// Balls in the chain at level start
    #[serde(default = "default_ball_count")]
    pub initial_ball_count: usize,
    /// Chain speed multiplier for this level
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
    /// Where the shooter stands
    #[serde(default)]
    pub player_position: Vec2,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let level: LevelData = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Read a level from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.waypoints.len() < 2 {
            return Err(TrackError::InsufficientPathPoints {
                found: self.waypoints.len(),
            });
        }
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier >= 0.0) {
            return Err(TrackError::InvalidLevel(format!(
                "speed_multiplier must be non-negative, got {}",
                self.speed_multiplier
            )));
        }
        Ok(())
    }

    /// Built-in zig-zag level used when no level file is given
    pub fn demo() -> Self {
        Self {
            waypoints: vec![
                Vec2::new(-100.0, 80.0),
                Vec2::new(1180.0, 80.0),
                Vec2::new(1180.0, 260.0),
                Vec2::new(100.0, 260.0),
                Vec2::new(100.0, 440.0),
                Vec2::new(1000.0, 440.0),
            ],
            initial_ball_count: 30,
            speed_multiplier: 1.0,
            player_position: Vec2::new(640.0, 620.0),
        }
    }
}
