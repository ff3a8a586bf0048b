//! Shots fired through `tick` landing in, and clearing, a chain

use ball_track::consts::SIM_DT;
use ball_track::sim::{BallColor, GameEvent, GameState, TickInput, tick};
use ball_track::{LevelData, SoundEffect, Tuning};
use glam::Vec2;

use BallColor::*;

/// Horizontal track at y = 300 with the shooter below it at `shooter_x`
/// and no starting chain
fn open_level(shooter_x: f32) -> LevelData {
    LevelData {
        waypoints: vec![Vec2::new(0.0, 300.0), Vec2::new(1280.0, 300.0)],
        initial_ball_count: 0,
        speed_multiplier: 1.0,
        player_position: Vec2::new(shooter_x, 600.0),
    }
}

/// Fire straight up at the track
fn fire_up(state: &mut GameState) {
    let input = TickInput {
        aim_at: Some(state.shooter.pos - Vec2::new(0.0, 300.0)),
        fire: true,
        ..Default::default()
    };
    tick(state, &input, SIM_DT);
}

fn run_until_settled(state: &mut GameState, max_ticks: usize) {
    for _ in 0..max_ticks {
        tick(state, &TickInput::default(), SIM_DT);
        if state.projectiles.is_empty() && state.track.segments().iter().all(|s| !s.is_shifting()) {
            // One more tick lets touching segments merge
            tick(state, &TickInput::default(), SIM_DT);
            return;
        }
    }
}

#[test]
fn test_shot_is_inserted_into_chain() {
    // Balls at 400..650; the shot arrives around ball 3
    let mut state = GameState::new(&open_level(560.0), Tuning::default(), 8).unwrap();
    state.track.push_segment(400.0, &[Red, Blue, Yellow, Blue, Red, Blue]);
    state.shooter.primary = Yellow;
    state.shooter.secondary = Yellow;

    fire_up(&mut state);
    assert_eq!(state.shots_fired, 1);
    run_until_settled(&mut state, 300);

    assert!(state.projectiles.is_empty());
    assert_eq!(state.track.ball_count(), 7);
    assert_eq!(state.track.segments().len(), 1);
    let colors: Vec<BallColor> = state.track.segments()[0].colors().collect();
    assert_eq!(colors.iter().filter(|&&c| c == Yellow).count(), 2);
    assert!(state.ctx.count(GameEvent::Sound(SoundEffect::BallCollision)) >= 1);
    assert_eq!(state.score(), 0);
}

#[test]
fn test_shot_completing_run_scores() {
    // Shoot just behind the back ball so the projectile lands at the front end
    let mut state = GameState::new(&open_level(510.0), Tuning::default(), 8).unwrap();
    state.track.push_segment(500.0, &[Green, Green, Red, Blue]);
    state.shooter.primary = Green;
    state.shooter.secondary = Red;

    fire_up(&mut state);
    run_until_settled(&mut state, 300);

    assert_eq!(state.score(), 150);
    assert_eq!(state.ctx.count(GameEvent::Sound(SoundEffect::BallBreak)), 1);
    assert_eq!(state.track.ball_count(), 2);
    let colors: Vec<BallColor> = state.track.segments()[0].colors().collect();
    assert_eq!(colors, vec![Red, Blue]);
}

#[test]
fn test_clearing_last_balls_requests_win() {
    let mut state = GameState::new(&open_level(510.0), Tuning::default(), 3).unwrap();
    state.track.push_segment(500.0, &[Yellow, Yellow]);
    state.shooter.primary = Yellow;

    fire_up(&mut state);
    run_until_settled(&mut state, 300);

    assert_eq!(state.track.ball_count(), 0);
    assert_eq!(state.ctx.count(GameEvent::RequestWin), 1);
    assert!(state.track.is_transitioning());

    // No more shots once the level is over
    fire_up(&mut state);
    assert_eq!(state.shots_fired, 1);
}
