//! Shared simulation types
//!
//! Ball colors and balls, cosmetic particles, the events the simulation
//! reports outward and the per-frame context that carries them.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::projectile::Projectile;
use super::shooter::Shooter;
use super::track::ChainManager;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::TrackError;
use crate::level::LevelData;
use crate::normalize_degrees;
use crate::tuning::Tuning;

/// Ball colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallColor {
    Red,
    Green,
    Blue,
    Yellow,
    Gray,
    Purple,
}

impl BallColor {
    pub const ALL: [BallColor; BALL_COLOR_COUNT] = [
        BallColor::Red,
        BallColor::Green,
        BallColor::Blue,
        BallColor::Yellow,
        BallColor::Gray,
        BallColor::Purple,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Texture the renderer uses for this color
    pub fn texture_name(&self) -> &'static str {
        match self {
            BallColor::Red => "ball_red",
            BallColor::Green => "ball_green",
            BallColor::Blue => "ball_blue",
            BallColor::Yellow => "ball_yellow",
            BallColor::Gray => "ball_gray",
            BallColor::Purple => "ball_purple",
        }
    }

    /// Tint for particles
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            BallColor::Red => [255, 0, 0],
            BallColor::Green => [0, 255, 0],
            BallColor::Blue => [0, 0, 255],
            BallColor::Yellow => [255, 255, 0],
            BallColor::Gray => [255, 255, 255],
            BallColor::Purple => [255, 0, 255],
        }
    }
}

/// A ball on the track (or in flight)
///
/// `pos`, `rotation`, `visible` and `opacity` are recomputed by the chain
/// every frame; renderers only read them.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub color: BallColor,
    /// Roll around the ball's own axis, degrees [0, 360). Cosmetic.
    spin: f32,
    pub visible: bool,
    pub opacity: f32,
    /// World position
    pub pos: Vec2,
    /// Facing in degrees (track direction + 90)
    pub rotation: f32,
}

impl Ball {
    pub fn new(color: BallColor) -> Self {
        Self {
            color,
            spin: 0.0,
            visible: true,
            opacity: 1.0,
            pos: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    #[inline]
    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn set_spin(&mut self, angle: f32) {
        self.spin = normalize_degrees(angle);
    }
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: BallColor,
    /// Seconds left
    pub life: f32,
    pub size: f32,
}

/// Spawn a burst of particles around a broken ball
pub fn spawn_burst<R: Rng>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    origin: Vec2,
    color: BallColor,
    ball_size: f32,
) {
    let count = rng.random_range(PARTICLE_MIN_COUNT..PARTICLE_MAX_COUNT);
    for _ in 0..count {
        if particles.len() >= MAX_PARTICLES {
            return;
        }
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let radius = rng.random::<f32>() * ball_size / 2.0;
        let offset = Vec2::new(angle.cos(), angle.sin()) * radius;

        let mut speed = || {
            let magnitude =
                rng.random::<f32>() * (PARTICLE_MAX_VELOCITY - PARTICLE_MIN_VELOCITY) + PARTICLE_MIN_VELOCITY;
            if rng.random::<bool>() { -magnitude } else { magnitude }
        };
        let vel = Vec2::new(speed(), speed());

        particles.push(Particle {
            pos: origin + offset,
            vel,
            color,
            life: PARTICLE_LIFE,
            size: PARTICLE_SIZE,
        });
    }
}

/// Advance particles and drop the ones that expired or fell off screen
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32, play_area: Vec2) {
    for particle in particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel.y += PARTICLE_GRAVITY * dt;
        particle.life -= dt;
    }
    particles.retain(|p| {
        p.life > 0.0
            && p.pos.x > -p.size
            && p.pos.x < play_area.x + p.size
            && p.pos.y < play_area.y + p.size
    });
}

/// Something the simulation asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Play a sound effect
    Sound(SoundEffect),
    /// A run was eliminated; `points` were added to the score
    ScoreAwarded { balls: u32, points: u32 },
    /// Switch to the fail screen (fires once)
    RequestFail,
    /// Switch to the win screen (fires once)
    RequestWin,
}

/// Per-frame context owned by the game loop and passed into every update
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    /// Accumulated score
    pub score: u64,
    /// Events pushed since the host last drained them
    pub events: Vec<GameEvent>,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, effect: SoundEffect) {
        self.emit(GameEvent::Sound(effect));
    }

    pub fn award(&mut self, balls: u32, points_per_ball: u32) {
        let points = balls * points_per_ball;
        self.score += u64::from(points);
        self.emit(GameEvent::ScoreAwarded { balls, points });
    }

    /// Hand the queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, event: GameEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }
}

/// Chain manager lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainPhase {
    #[default]
    Running,
    /// A ball reached the death window; remaining balls rush in
    Failing,
    /// Every ball went through the death window
    Failed,
    /// Every ball was eliminated
    Won,
}

impl ChainPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainPhase::Failed | ChainPhase::Won)
    }
}

/// Complete state of one level being played
#[derive(Debug, Clone)]
pub struct GameState {
    /// Simulation tick counter
    pub time_ticks: u64,
    pub track: ChainManager,
    pub shooter: Shooter,
    /// Balls in flight or being inserted
    pub projectiles: Vec<Projectile>,
    /// Score and pending events
    pub ctx: FrameContext,
    pub shots_fired: u32,
    /// Shooter color draws; the track keeps its own stream
    pub rng: Pcg32,
}

impl GameState {
    pub fn new(level: &LevelData, tuning: Tuning, seed: u64) -> Result<Self, TrackError> {
        let track = ChainManager::new(level, tuning, seed)?;
        let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let shooter = Shooter::new(level.player_position, &mut rng, &track);
        Ok(Self {
            time_ticks: 0,
            track,
            shooter,
            projectiles: Vec::new(),
            ctx: FrameContext::new(),
            shots_fired: 0,
            rng,
        })
    }

    pub fn score(&self) -> u64 {
        self.ctx.score
    }
}
