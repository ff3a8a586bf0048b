//! The player's launcher
//!
//! Holds the loaded (primary) ball and the one queued behind it. Firing
//! launches the primary, promotes the secondary and draws a new secondary
//! from the colors still on the track.

use glam::Vec2;
use rand::Rng;

use super::projectile::Projectile;
use super::state::BallColor;
use super::track::ChainManager;
use crate::consts::SHOOTER_COOLDOWN;
use crate::direction_degrees;

#[derive(Debug, Clone)]
pub struct Shooter {
    pub pos: Vec2,
    /// Aim direction in degrees
    pub aim: f32,
    pub primary: BallColor,
    pub secondary: BallColor,
    /// Seconds until the next shot is allowed
    pub reload: f32,
}

impl Shooter {
    pub fn new<R: Rng>(pos: Vec2, rng: &mut R, track: &ChainManager) -> Self {
        Self {
            pos,
            // Straight up the screen
            aim: 270.0,
            primary: pick_color(rng, track),
            secondary: pick_color(rng, track),
            reload: 0.0,
        }
    }

    /// Turn toward a world point. Ignored when the point is the shooter itself.
    pub fn aim_at(&mut self, point: Vec2) {
        let delta = point - self.pos;
        if delta.length_squared() > f32::EPSILON {
            self.aim = direction_degrees(delta);
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.primary, &mut self.secondary);
    }

    pub fn update(&mut self, dt: f32) {
        self.reload = (self.reload - dt).max(0.0);
    }

    #[inline]
    pub fn can_fire(&self) -> bool {
        self.reload <= 0.0
    }

    /// Launch the primary ball along the current aim
    pub fn fire<R: Rng>(&mut self, rng: &mut R, track: &ChainManager) -> Option<Projectile> {
        if !self.can_fire() {
            return None;
        }
        let tuning = track.tuning();
        let projectile = Projectile::launch(
            self.primary,
            self.pos,
            self.aim,
            tuning.projectile_speed,
            tuning.ball_radius(),
        );
        self.primary = self.secondary;
        self.secondary = pick_color(rng, track);
        self.reload = SHOOTER_COOLDOWN;
        log::debug!("Fired {:?} at {:.1} deg", projectile.color(), self.aim);
        Some(projectile)
    }

    /// Replace loaded colors that no longer exist on the track
    pub fn refresh_colors<R: Rng>(&mut self, rng: &mut R, track: &ChainManager) {
        let in_play = track.colors_in_play();
        if in_play.is_empty() {
            return;
        }
        if !in_play.contains(&self.primary) {
            self.primary = in_play[rng.random_range(0..in_play.len())];
        }
        if !in_play.contains(&self.secondary) {
            self.secondary = in_play[rng.random_range(0..in_play.len())];
        }
    }
}

/// A color still on the track, or any color once the track is empty
fn pick_color<R: Rng>(rng: &mut R, track: &ChainManager) -> BallColor {
    let in_play = track.colors_in_play();
    if in_play.is_empty() {
        BallColor::random(rng)
    } else {
        in_play[rng.random_range(0..in_play.len())]
    }
}
