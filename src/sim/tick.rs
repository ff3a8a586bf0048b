//! Fixed timestep simulation tick
//!
//! Advances one level deterministically: shooter, chain, then projectiles.

use glam::Vec2;

use super::state::{BallColor, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// World point to aim at (mouse/touch position)
    pub aim_at: Option<Vec2>,
    /// Fire the loaded ball
    pub fire: bool,
    /// Swap loaded and queued balls
    pub swap: bool,
    /// Idle/demo mode - AI plays the level
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    if let Some(point) = input.aim_at {
        state.shooter.aim_at(point);
    }
    if input.swap {
        state.shooter.swap();
    }
    state.shooter.update(dt);

    state.track.update(dt, &mut state.ctx);
    state.shooter.refresh_colors(&mut state.rng, &state.track);

    // No new shots once the chain is lost or the level is over
    let can_shoot = !state.track.is_failing() && !state.track.is_transitioning();
    if input.fire && can_shoot {
        if let Some(projectile) = state.shooter.fire(&mut state.rng, &state.track) {
            state.projectiles.push(projectile);
            state.shots_fired += 1;
        }
    }

    for projectile in &mut state.projectiles {
        projectile.update(dt, &mut state.track, &mut state.ctx);
    }
    state.projectiles.retain(|p| !p.is_done());
}

/// Aim at the most advanced ball matching the loaded color and keep firing.
/// Swaps first when only the queued color has a match.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let shooter = &state.shooter;
    let most_advanced = |color: Option<BallColor>| {
        state
            .track
            .segments()
            .iter()
            .flat_map(|s| s.balls.iter().enumerate().map(move |(i, b)| (s.position_of(i), b)))
            .filter(|(_, b)| b.visible && color.is_none_or(|c| b.color == c))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, b)| b.pos)
    };

    let target = match most_advanced(Some(shooter.primary)) {
        Some(pos) => Some(pos),
        None => match most_advanced(Some(shooter.secondary)) {
            Some(pos) => {
                input.swap = true;
                Some(pos)
            }
            _ => most_advanced(None),
        },
    };

    if let Some(pos) = target {
        input.aim_at = Some(pos);
        input.fire = true;
    }
}
