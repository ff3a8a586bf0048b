//! Player-fired balls
//!
//! A projectile flies in a straight line until it touches a chain, then
//! animates into the slot the chain opened for it and becomes part of the
//! chain.
//!
//! `Flying -> Inserting -> Consumed`, or `Flying -> Removed` when it
//! leaves the play area. A target segment merged into the one behind it is
//! followed to that segment; one that was eliminated outright cancels the
//! insertion, which also ends in `Removed`.

use glam::Vec2;

use super::state::{Ball, BallColor, FrameContext};
use super::track::ChainManager;
use crate::audio::SoundEffect;
use crate::{normalize_degrees, unit_from_degrees};

/// Insertion animation toward a chain slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    pub elapsed: f32,
    pub duration: f32,
    /// Id of the segment the ball lands in
    pub target_segment: u32,
    /// Land at index 0 (nearer the path start) instead of the leading end
    pub at_front_end: bool,
    pub start_pos: Vec2,
    pub start_rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileState {
    Flying,
    Inserting(Insertion),
    /// Landed in a chain
    Consumed,
    /// Left the play area or lost its target
    Removed,
}

/// A ball in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Visual state; `ball.pos` is the projectile's position
    pub ball: Ball,
    pub vel: Vec2,
    /// Collision radius used for chain queries
    pub radius: f32,
    pub collision_enabled: bool,
    pub state: ProjectileState,
}

impl Projectile {
    /// Launch from `pos` toward `angle` (degrees)
    pub fn launch(color: BallColor, pos: Vec2, angle: f32, speed: f32, radius: f32) -> Self {
        let mut ball = Ball::new(color);
        ball.pos = pos;
        ball.rotation = normalize_degrees(angle + 90.0);
        Self {
            ball,
            vel: unit_from_degrees(angle) * speed,
            radius,
            collision_enabled: true,
            state: ProjectileState::Flying,
        }
    }

    #[inline]
    pub fn color(&self) -> BallColor {
        self.ball.color
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.ball.pos
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, ProjectileState::Consumed | ProjectileState::Removed)
    }

    pub fn update(&mut self, dt: f32, track: &mut ChainManager, ctx: &mut FrameContext) {
        match self.state {
            ProjectileState::Flying => self.fly(dt, track),
            ProjectileState::Inserting(insertion) => self.insert(dt, insertion, track, ctx),
            ProjectileState::Consumed | ProjectileState::Removed => {}
        }
    }

    fn fly(&mut self, dt: f32, track: &mut ChainManager) {
        let step = self.vel * dt;
        self.ball.pos += step;
        self.ball.set_spin(self.ball.spin() + step.length());

        let area = track.tuning().play_area;
        let pos = self.ball.pos;
        let margin = self.radius;
        if pos.x < -margin || pos.y < -margin || pos.x > area.x + margin || pos.y > area.y + margin {
            log::debug!("Projectile left the play area at {:?}", pos);
            self.state = ProjectileState::Removed;
            return;
        }

        if !self.collision_enabled {
            return;
        }
        let Some(hit) = track.collision_query(pos, self.radius) else {
            return;
        };

        let segment = &track.segments()[hit.segment_index];
        let target_segment = segment.id;
        let ball_count = segment.len();
        let boundary = (hit.offset / track.tuning().ball_size).ceil();

        let at_front_end = if boundary < 1.0 {
            true
        } else if boundary >= ball_count as f32 {
            false
        } else {
            // Interior hit: open a gap and land at the end of the back part.
            // If the gap can't open this frame, keep flying and retry.
            if !track.open_insertion_gap(hit.segment_index, hit.offset) {
                return;
            }
            false
        };

        log::debug!(
            "Projectile {:?} hit segment {} at offset {:.1}",
            self.ball.color,
            target_segment,
            hit.offset
        );
        self.collision_enabled = false;
        self.vel = Vec2::ZERO;
        self.state = ProjectileState::Inserting(Insertion {
            elapsed: 0.0,
            duration: track.tuning().insertion_duration,
            target_segment,
            at_front_end,
            start_pos: pos,
            start_rotation: self.ball.rotation,
        });
    }

    fn insert(&mut self, dt: f32, mut insertion: Insertion, track: &mut ChainManager, ctx: &mut FrameContext) {
        insertion.elapsed += dt;

        let target = track
            .segment_index_by_id(insertion.target_segment)
            .and_then(|index| Some((index, track.insertion_point(index, insertion.at_front_end)?)));
        let Some((index, (target_pos, target_rotation))) = target else {
            log::debug!("Insertion target {} vanished, dropping projectile", insertion.target_segment);
            self.state = ProjectileState::Removed;
            return;
        };

        let t = (insertion.elapsed / insertion.duration).min(1.0);
        self.ball.pos = insertion.start_pos.lerp(target_pos, t);
        self.ball.rotation = lerp_degrees(insertion.start_rotation, target_rotation, t);

        if t < 1.0 {
            self.state = ProjectileState::Inserting(insertion);
            return;
        }

        if track.materialize_ball(index, self.ball.color, insertion.at_front_end) {
            ctx.play(SoundEffect::BallCollision);
            self.state = ProjectileState::Consumed;
        } else {
            self.state = ProjectileState::Removed;
        }
    }
}

/// Interpolate between two angles (degrees) along the shorter arc
fn lerp_degrees(from: f32, to: f32, t: f32) -> f32 {
    let delta = (to - from + 540.0).rem_euclid(360.0) - 180.0;
    normalize_degrees(from + delta * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BallColor::*;
    use crate::tuning::Tuning;

    fn track_with_chain(colors: &[BallColor]) -> ChainManager {
        let tuning = Tuning::default();
        let mut track = ChainManager::empty(
            &[Vec2::new(0.0, 300.0), Vec2::new(1280.0, 300.0)],
            1.0,
            tuning,
            3,
        )
        .unwrap();
        track.push_segment(100.0, colors);
        track
    }

    #[test]
    fn test_lerp_degrees_short_arc() {
        assert!((lerp_degrees(350.0, 10.0, 0.5) - 0.0).abs() < 1e-3);
        assert!((lerp_degrees(10.0, 350.0, 0.5) - 0.0).abs() < 1e-3);
        assert!((lerp_degrees(0.0, 90.0, 0.5) - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_launch_velocity() {
        let p = Projectile::launch(Red, Vec2::ZERO, 90.0, 600.0, 25.0);
        assert!(p.vel.x.abs() < 1e-3);
        assert!((p.vel.y - 600.0).abs() < 1e-3);
        assert!(p.collision_enabled);
        assert_eq!(p.state, ProjectileState::Flying);
    }

    #[test]
    fn test_leaves_play_area() {
        let mut track = track_with_chain(&[Red, Blue]);
        let mut ctx = FrameContext::new();
        let mut p = Projectile::launch(Red, Vec2::new(640.0, 10.0), 270.0, 600.0, 25.0);
        for _ in 0..10 {
            p.update(0.05, &mut track, &mut ctx);
        }
        assert_eq!(p.state, ProjectileState::Removed);
        assert!(p.is_done());
        assert_eq!(track.ball_count(), 2);
    }

    #[test]
    fn test_collision_disabled_passes_through() {
        let mut track = track_with_chain(&[Red, Blue, Red, Blue]);
        let mut ctx = FrameContext::new();
        let mut p = Projectile::launch(Green, Vec2::new(175.0, 360.0), 270.0, 600.0, 25.0);
        p.collision_enabled = false;
        p.update(0.05, &mut track, &mut ctx);
        assert_eq!(p.state, ProjectileState::Flying);
        assert_eq!(track.segments().len(), 1);
    }

    #[test]
    fn test_interior_hit_opens_gap_then_lands() {
        // Balls at 100, 150, 200, 250
        let mut track = track_with_chain(&[Red, Blue, Red, Blue]);
        let mut ctx = FrameContext::new();
        // Lands 30 past the back ball's center -> boundary 1
        let mut p = Projectile::launch(Green, Vec2::new(130.0, 370.0), 270.0, 600.0, 25.0);

        p.update(0.05, &mut track, &mut ctx);
        assert!(matches!(p.state, ProjectileState::Inserting(_)));
        assert!(!p.collision_enabled);
        assert_eq!(track.segments().len(), 2);
        assert_eq!(track.segments()[0].len(), 1);
        assert!(track.segments()[1].is_shifting());

        for _ in 0..20 {
            track.update(0.02, &mut ctx);
            p.update(0.02, &mut track, &mut ctx);
            if p.is_done() {
                break;
            }
        }
        assert_eq!(p.state, ProjectileState::Consumed);
        assert_eq!(track.ball_count(), 5);
        assert_eq!(track.segments()[0].front_color(), Some(Green));
        assert_eq!(ctx.count(crate::sim::GameEvent::Sound(SoundEffect::BallCollision)), 1);
    }

    #[test]
    fn test_back_edge_hit_lands_at_front_end() {
        let mut track = track_with_chain(&[Red, Blue]);
        let mut ctx = FrameContext::new();
        let mut p = Projectile::launch(Green, Vec2::new(90.0, 370.0), 270.0, 600.0, 25.0);
        p.update(0.05, &mut track, &mut ctx);
        let ProjectileState::Inserting(insertion) = p.state else {
            panic!("expected insertion, got {:?}", p.state);
        };
        assert!(insertion.at_front_end);
        assert_eq!(track.segments().len(), 1);

        for _ in 0..10 {
            p.update(0.05, &mut track, &mut ctx);
        }
        assert_eq!(p.state, ProjectileState::Consumed);
        assert_eq!(track.segments()[0].back_color(), Some(Green));
        assert_eq!(track.segments()[0].anchor, 50.0);
    }

    #[test]
    fn test_target_merged_away_still_lands() {
        // Chain stopped so only catch-up moves the rear segment
        let mut track = ChainManager::empty(
            &[Vec2::new(0.0, 300.0), Vec2::new(1280.0, 300.0)],
            0.0,
            Tuning::default(),
            3,
        )
        .unwrap();
        track.push_segment(100.0, &[Red, Yellow]);
        let front = track.push_segment(205.0, &[Yellow, Blue, Red]);
        let mut ctx = FrameContext::new();

        // Past the front segment's last ball -> lands at its leading end
        let mut p = Projectile::launch(Green, Vec2::new(370.0, 370.0), 270.0, 600.0, 25.0);
        p.update(0.05, &mut track, &mut ctx);
        let ProjectileState::Inserting(insertion) = p.state else {
            panic!("expected insertion, got {:?}", p.state);
        };
        assert_eq!(insertion.target_segment, front);
        assert!(!insertion.at_front_end);

        for _ in 0..30 {
            track.update(0.02, &mut ctx);
            p.update(0.02, &mut track, &mut ctx);
            if p.is_done() {
                break;
            }
        }
        assert_eq!(ctx.count(crate::sim::GameEvent::Sound(SoundEffect::BallCollisionPitched)), 1);
        assert_eq!(p.state, ProjectileState::Consumed);
        assert_eq!(track.segments().len(), 1);
        assert_eq!(track.ball_count(), 6);
        assert_eq!(track.segments()[0].front_color(), Some(Green));
    }

    #[test]
    fn test_vanished_target_cancels_insertion() {
        let mut track = track_with_chain(&[Red, Blue]);
        let mut ctx = FrameContext::new();
        let mut p = Projectile::launch(Green, Vec2::new(160.0, 370.0), 270.0, 600.0, 25.0);
        p.update(0.05, &mut track, &mut ctx);
        assert!(matches!(p.state, ProjectileState::Inserting(_)));

        // Point the insertion at a segment id that no longer exists
        let ProjectileState::Inserting(mut insertion) = p.state else {
            unreachable!()
        };
        insertion.target_segment = 99;
        p.state = ProjectileState::Inserting(insertion);

        p.update(0.05, &mut track, &mut ctx);
        assert_eq!(p.state, ProjectileState::Removed);
        assert_eq!(track.ball_count(), 2);
    }
}
