//! The ball track: chains of balls sliding along the path
//!
//! `ChainManager` owns the path cache and the ordered list of ball
//! segments. Each `update` runs, in this order:
//!
//! 1. placement (world position, rotation, spin, fade, visibility)
//! 2. motion (base speed, catch-up speed, shift bonus)
//! 3. adjacency (catch-up acceleration, merging touching segments)
//! 4. match elimination (runs of `min_run` or more same colors)
//! 5. cleanup of empty segments; the lead segment drops any catch-up speed
//! 6. fail / win detection
//!
//! Later stages always see the result of earlier ones in the same frame.

use std::collections::HashMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{circle_intersects_segment, closest_point_on_segment};
use super::path::PathCache;
use super::segment::BallSegment;
use super::state::{
    Ball, BallColor, ChainPhase, FrameContext, GameEvent, Particle, spawn_burst, update_particles,
};
use crate::audio::SoundEffect;
use crate::consts::FADE_BALLS;
use crate::error::TrackError;
use crate::level::LevelData;
use crate::normalize_degrees;
use crate::tuning::Tuning;

/// Where a circle touched the path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathHit {
    /// Index of the track segment that was touched
    pub sub_segment: usize,
    /// Path distance of the closest point on that segment
    pub distance: f32,
}

/// Where a circle touched a ball segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainHit {
    pub segment_index: usize,
    /// Distance from the segment's anchor (may be slightly negative or past
    /// the segment's length at its edges)
    pub offset: f32,
    /// Absolute path distance of the hit
    pub distance: f32,
}

/// Owns the path and every ball segment on it
#[derive(Debug, Clone)]
pub struct ChainManager {
    path: PathCache,
    /// Sorted by anchor, ascending
    segments: Vec<BallSegment>,
    pub speed_multiplier: f32,
    tuning: Tuning,
    phase: ChainPhase,
    /// Visual particles (not gameplay-affecting)
    particles: Vec<Particle>,
    rng: Pcg32,
    next_id: u32,
    /// Absorbed segment id -> id of the segment that absorbed it
    merged_into: HashMap<u32, u32>,
}

impl ChainManager {
    /// Build a track with no balls on it
    pub fn empty(
        waypoints: &[Vec2],
        speed_multiplier: f32,
        tuning: Tuning,
        seed: u64,
    ) -> Result<Self, TrackError> {
        tuning.validate()?;
        if !(speed_multiplier.is_finite() && speed_multiplier >= 0.0) {
            return Err(TrackError::InvalidLevel(format!(
                "speed_multiplier must be non-negative, got {}",
                speed_multiplier
            )));
        }
        let path = PathCache::build(waypoints)?;
        Ok(Self {
            path,
            segments: Vec::new(),
            speed_multiplier,
            tuning,
            phase: ChainPhase::Running,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            merged_into: HashMap::new(),
        })
    }

    /// Build a track for a level with its full starting chain at distance 0
    pub fn new(level: &LevelData, tuning: Tuning, seed: u64) -> Result<Self, TrackError> {
        level.validate()?;
        let mut track = Self::empty(&level.waypoints, level.speed_multiplier, tuning, seed)?;
        let colors = track.initial_colors(level.initial_ball_count);
        if !colors.is_empty() {
            track.push_segment(0.0, &colors);
        }
        log::info!(
            "Track built: {} waypoints, length {:.1}, {} balls, speed x{}",
            level.waypoints.len(),
            track.path.total_length(),
            level.initial_ball_count,
            track.speed_multiplier
        );
        Ok(track)
    }

    /// Random colors without any eliminable run
    fn initial_colors(&mut self, count: usize) -> Vec<BallColor> {
        let min_run = self.tuning.min_run;
        let mut colors: Vec<BallColor> = Vec::with_capacity(count);
        while colors.len() < count {
            let color = BallColor::random(&mut self.rng);
            let n = colors.len();
            let completes_run = n + 1 >= min_run && colors[n + 1 - min_run..].iter().all(|&c| c == color);
            if !completes_run {
                colors.push(color);
            }
        }
        colors
    }

    fn next_segment_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place a new segment on the track, keeping anchor order.
    /// Returns its id.
    pub fn push_segment(&mut self, anchor: f32, colors: &[BallColor]) -> u32 {
        let id = self.next_segment_id();
        let segment = BallSegment::from_colors(id, anchor, colors, self.tuning.ball_size);
        let index = self.segments.partition_point(|s| s.anchor <= anchor);
        self.segments.insert(index, segment);
        id
    }

    pub fn path(&self) -> &PathCache {
        &self.path
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn segments(&self) -> &[BallSegment] {
        &self.segments
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn phase(&self) -> ChainPhase {
        self.phase
    }

    /// A ball reached the death window at some point
    pub fn is_failing(&self) -> bool {
        matches!(self.phase, ChainPhase::Failing | ChainPhase::Failed)
    }

    /// A win or fail transition was requested
    pub fn is_transitioning(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn ball_count(&self) -> usize {
        self.segments.iter().map(BallSegment::len).sum()
    }

    /// Current index of a segment. Ids of merged-away segments resolve to
    /// the segment that absorbed them.
    pub fn segment_index_by_id(&self, id: u32) -> Option<usize> {
        let mut id = id;
        loop {
            if let Some(index) = self.segments.iter().position(|s| s.id == id) {
                return Some(index);
            }
            id = *self.merged_into.get(&id)?;
        }
    }

    /// Balls a renderer should draw
    pub fn visible_balls(&self) -> impl Iterator<Item = &Ball> {
        self.segments
            .iter()
            .flat_map(|s| s.balls.iter())
            .filter(|b| b.visible)
    }

    /// Colors still present on the track, in palette order
    pub fn colors_in_play(&self) -> Vec<BallColor> {
        BallColor::ALL
            .into_iter()
            .filter(|&color| self.segments.iter().any(|s| s.colors().any(|c| c == color)))
            .collect()
    }

    /// Advance the track by `dt` seconds
    pub fn update(&mut self, dt: f32, ctx: &mut FrameContext) {
        update_particles(&mut self.particles, dt, self.tuning.play_area);

        if self.phase.is_terminal() {
            return;
        }

        self.place_balls();
        self.advance(dt);
        self.resolve_adjacency(dt, ctx);
        self.eliminate_matches(ctx);
        self.segments.retain(|s| !s.is_empty());
        // Nothing ahead of the lead segment to catch up with
        if self.phase == ChainPhase::Running {
            if let Some(lead) = self.segments.last_mut() {
                lead.extra_speed = 0.0;
            }
        }
        self.check_outcome(dt, ctx);
    }

    /// Step 1: world placement of every ball
    fn place_balls(&mut self) {
        let total = self.path.total_length();
        let size = self.tuning.ball_size;
        let fade_length = FADE_BALLS * size;

        for segment in &mut self.segments {
            let anchor = segment.anchor;
            for (i, ball) in segment.balls.iter_mut().enumerate() {
                let distance = anchor + i as f32 * size;
                let Some(index) = self.path.segment_at(distance) else {
                    ball.visible = false;
                    continue;
                };
                let track_segment = &self.path.segments()[index];

                ball.visible = true;
                ball.pos = self.path.world_position(distance);
                ball.rotation = normalize_degrees(track_segment.angle + 90.0);
                ball.set_spin(distance);
                ball.opacity = ((total - distance) / fade_length).clamp(0.0, 1.0);
            }
        }
    }

    /// Step 2: move every segment forward
    fn advance(&mut self, dt: f32) {
        let base = self.tuning.base_speed * self.speed_multiplier;
        let bonus = self.tuning.shift_bonus();

        for segment in &mut self.segments {
            let shift_bonus = if segment.is_shifting() { bonus } else { 0.0 };
            segment.anchor += dt * (base + segment.extra_speed + shift_bonus);
            if let Some(overrun) = segment.tick_shift(dt) {
                // The bonus only runs for the shift duration
                segment.anchor -= overrun * bonus;
            }
        }

        self.segments.sort_by(|a, b| a.anchor.total_cmp(&b.anchor));
    }

    /// Step 3: catch-up acceleration and merging of touching segments
    fn resolve_adjacency(&mut self, dt: f32, ctx: &mut FrameContext) {
        let follow = self.tuning.follow_acceleration;
        let tolerance = self.tuning.segment_collision_error;

        let mut i = 0;
        while i + 1 < self.segments.len() {
            let (head, tail) = self.segments.split_at_mut(i + 1);
            let rear = &mut head[i];
            let front = &tail[0];

            let catching_up = rear.front_color().is_some() && rear.front_color() == front.back_color();
            if catching_up {
                rear.extra_speed += follow * dt;
            } else if self.phase == ChainPhase::Running {
                rear.extra_speed = 0.0;
            }

            let touching = rear.leading_edge() + tolerance >= front.anchor;
            if touching && !rear.is_shifting() && !front.is_shifting() {
                let slammed = catching_up && rear.extra_speed > 0.0;
                self.merge_with_next(i, slammed);
                ctx.play(if slammed {
                    SoundEffect::BallCollisionPitched
                } else {
                    SoundEffect::BallCollision
                });
                // Re-check the merged segment against its new neighbour
                continue;
            }
            i += 1;
        }
    }

    /// Append the segment at `index + 1` to the one at `index`
    fn merge_with_next(&mut self, index: usize, inherit_speed: bool) {
        let front = self.segments.remove(index + 1);
        let rear = &mut self.segments[index];
        log::debug!(
            "Merging segment {} ({} balls) into {} ({} balls)",
            front.id,
            front.len(),
            rear.id,
            rear.len()
        );
        if inherit_speed {
            rear.extra_speed = front.extra_speed;
        }
        self.merged_into.insert(front.id, rear.id);
        rear.absorb(front);
    }

    /// Step 4: remove runs and split what's left around them
    fn eliminate_matches(&mut self, ctx: &mut FrameContext) {
        let min_run = self.tuning.min_run;
        let size = self.tuning.ball_size;
        let points_per_ball = self.tuning.score_per_ball;

        let segments = std::mem::take(&mut self.segments);
        let mut rebuilt = Vec::with_capacity(segments.len() + 1);

        for segment in segments {
            let runs = find_runs(&segment, min_run);
            if runs.is_empty() {
                rebuilt.push(segment);
                continue;
            }

            for &(start, end) in &runs {
                for i in start..end {
                    let origin = self.path.world_position(segment.position_of(i));
                    spawn_burst(&mut self.particles, &mut self.rng, origin, segment.balls[i].color, size);
                }
                let removed = (end - start) as u32;
                ctx.award(removed, points_per_ball);
                ctx.play(SoundEffect::BallBreak);
                log::debug!(
                    "Segment {}: eliminated {} x {:?} at {}..{}",
                    segment.id,
                    removed,
                    segment.balls[start].color,
                    start,
                    end
                );
            }

            self.split_around_runs(segment, &runs, &mut rebuilt);
        }

        self.segments = rebuilt;
    }

    /// Rebuild a segment without its runs.
    ///
    /// The first surviving piece keeps the segment's identity and motion; a
    /// run at the very back just moves that piece's anchor forward. Every
    /// later piece becomes a new segment at its original path position and
    /// starts shifting.
    fn split_around_runs(&mut self, segment: BallSegment, runs: &[(usize, usize)], out: &mut Vec<BallSegment>) {
        let mut pieces = Vec::with_capacity(runs.len() + 1);
        let mut piece_start = 0;
        for &(start, end) in runs {
            if start > piece_start {
                pieces.push((piece_start, start));
            }
            piece_start = end;
        }
        if piece_start < segment.len() {
            pieces.push((piece_start, segment.len()));
        }

        let duration = self.tuning.insertion_duration;
        for (n, &(start, end)) in pieces.iter().enumerate() {
            let balls = segment.balls[start..end].to_vec();
            let anchor = segment.position_of(start);
            if n == 0 {
                let mut first = BallSegment::new(segment.id, anchor, balls, segment.ball_size());
                first.extra_speed = segment.extra_speed;
                first.shift = segment.shift;
                out.push(first);
            } else {
                let id = self.next_segment_id();
                let mut piece = BallSegment::new(id, anchor, balls, segment.ball_size());
                piece.begin_shift(duration);
                log::debug!("Segment {} split off as {} ({} balls)", segment.id, id, piece.len());
                out.push(piece);
            }
        }
    }

    /// Step 6: fail and win transitions
    fn check_outcome(&mut self, dt: f32, ctx: &mut FrameContext) {
        let total = self.path.total_length();

        if self.phase == ChainPhase::Running && self.segments.iter().any(|s| s.leading_edge() > total) {
            log::info!("Chain reached the end of the track");
            self.phase = ChainPhase::Failing;
        }

        if self.phase == ChainPhase::Failing {
            let ramp = self.tuning.fail_acceleration * dt;
            let mut in_bounds = false;
            for segment in self.segments.iter_mut().filter(|s| s.anchor < total) {
                segment.extra_speed += ramp;
                in_bounds = true;
            }
            if !in_bounds {
                log::info!("All balls went through the death window");
                self.phase = ChainPhase::Failed;
                ctx.emit(GameEvent::RequestFail);
            }
            return;
        }

        if self.segments.is_empty() {
            log::info!("Track cleared");
            self.phase = ChainPhase::Won;
            ctx.emit(GameEvent::RequestWin);
        }
    }

    /// Path sub-segment touched by a circle.
    ///
    /// The ball's own radius is added to `radius`. When several track
    /// segments are in reach (corners) the closest one wins, the earliest on
    /// ties.
    pub fn path_hit(&self, point: Vec2, radius: f32) -> Option<PathHit> {
        let reach = radius + self.tuning.ball_radius();
        let mut best: Option<(PathHit, f32)> = None;

        for index in 0..self.path.segments().len() {
            let (p1, p2) = self.path.segment_endpoints(index);
            if !circle_intersects_segment(p1, p2, point, reach) {
                continue;
            }
            let closest = closest_point_on_segment(p1, p2, point);
            let gap = closest.distance_squared(point);
            if best.is_none_or(|(_, best_gap)| gap < best_gap) {
                let hit = PathHit {
                    sub_segment: index,
                    distance: self.path.distance_on_segment(index, closest),
                };
                best = Some((hit, gap));
            }
        }

        best.map(|(hit, _)| hit)
    }

    /// Ball segment touched by a circle, if any
    pub fn collision_query(&self, point: Vec2, radius: f32) -> Option<ChainHit> {
        let hit = self.path_hit(point, radius)?;
        let half = self.tuning.ball_radius();

        self.segments.iter().enumerate().find_map(|(index, segment)| {
            let covered = hit.distance >= segment.anchor - half && hit.distance <= segment.leading_edge() + half;
            covered.then(|| ChainHit {
                segment_index: index,
                offset: hit.distance - segment.anchor,
                distance: hit.distance,
            })
        })
    }

    /// Split a segment to open a one-ball gap at `offset`.
    ///
    /// The balls at and after the boundary move into a new segment right
    /// after this one, which shifts forward by one ball width. Returns
    /// false (and changes nothing) without a valid interior boundary.
    pub fn open_insertion_gap(&mut self, segment_index: usize, offset: f32) -> bool {
        let Some(segment) = self.segments.get(segment_index) else {
            log::warn!("Insertion gap requested for missing segment {}", segment_index);
            return false;
        };

        let boundary = (offset / self.tuning.ball_size).ceil();
        if !(boundary >= 1.0) || boundary >= segment.len() as f32 {
            return false;
        }
        let boundary = boundary as usize;

        let id = self.next_segment_id();
        let duration = self.tuning.insertion_duration;
        let mut rest = self.segments[segment_index].split_off(boundary, id);
        rest.begin_shift(duration);
        log::debug!(
            "Opened insertion gap in segment {} at ball {} (new segment {})",
            self.segments[segment_index].id,
            boundary,
            id
        );
        self.segments.insert(segment_index + 1, rest);
        true
    }

    /// Put a new ball at one end of a segment.
    ///
    /// At the front end (index 0, nearer the start of the path) the anchor
    /// moves back one ball so existing balls keep their path positions.
    pub fn materialize_ball(&mut self, segment_index: usize, color: BallColor, at_front_end: bool) -> bool {
        let Some(target) = self.insertion_point(segment_index, at_front_end) else {
            log::warn!("Cannot materialize ball in missing segment {}", segment_index);
            return false;
        };

        let size = self.tuning.ball_size;
        let segment = &mut self.segments[segment_index];
        let mut ball = Ball::new(color);
        ball.pos = target.0;
        ball.rotation = target.1;

        if at_front_end {
            segment.balls.insert(0, ball);
            segment.anchor -= size;
        } else {
            segment.balls.push(ball);
        }
        true
    }

    /// World position and facing of the slot a new ball would take at one
    /// end of a segment
    pub fn insertion_point(&self, segment_index: usize, at_front_end: bool) -> Option<(Vec2, f32)> {
        let segment = self.segments.get(segment_index)?;
        let distance = if at_front_end {
            segment.anchor - self.tuning.ball_size
        } else {
            segment.leading_edge()
        };
        let rotation = normalize_degrees(self.path.direction_at(distance) + 90.0);
        Some((self.path.world_position(distance), rotation))
    }
}

/// Maximal same-color runs of at least `min_run` balls, as index ranges
fn find_runs(segment: &BallSegment, min_run: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let balls = &segment.balls;
    let mut start = 0;
    while start < balls.len() {
        let color = balls[start].color;
        let mut end = start + 1;
        while end < balls.len() && balls[end].color == color {
            end += 1;
        }
        if end - start >= min_run {
            runs.push((start, end));
        }
        start = end;
    }
    runs
}
