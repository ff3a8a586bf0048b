//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Segments kept in path order, identified by stable ids
//! - No rendering, audio playback or platform dependencies

pub mod collision;
pub mod path;
pub mod projectile;
pub mod segment;
pub mod shooter;
pub mod state;
pub mod tick;
pub mod track;

pub use collision::{circle_intersects_segment, closest_point_on_segment};
pub use path::{PathCache, TrackSegment};
pub use projectile::{Insertion, Projectile, ProjectileState};
pub use segment::{BallSegment, ShiftState};
pub use shooter::Shooter;
pub use state::{Ball, BallColor, ChainPhase, FrameContext, GameEvent, GameState, Particle};
pub use tick::{TickInput, tick};
pub use track::{ChainHit, ChainManager, PathHit};
