//! Ball Track entry point
//!
//! Plays one level headless with the autopilot and reports the outcome.
//!
//! Usage: `ball-track [LEVEL_JSON] [SEED]`

use ball_track::consts::SIM_DT;
use ball_track::sim::{GameEvent, GameState, TickInput, tick};
use ball_track::{LevelData, TrackError, Tuning};

/// Give up after this many simulated seconds
const MAX_SECONDS: f32 = 600.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let level_path = args.next();
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            log::error!("Invalid seed: {}", err);
            std::process::exit(2);
        }
        None => 12345,
    };

    if let Err(err) = run(level_path.as_deref(), seed) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(level_path: Option<&str>, seed: u64) -> Result<(), TrackError> {
    let level = match level_path {
        Some(path) => {
            log::info!("Loading level from {}", path);
            LevelData::load(path)?
        }
        None => LevelData::demo(),
    };

    let mut state = GameState::new(&level, Tuning::default(), seed)?;
    log::info!("Ball Track (headless) starting with seed {}", seed);

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let max_ticks = (MAX_SECONDS / SIM_DT) as u64;

    while state.time_ticks < max_ticks {
        tick(&mut state, &input, SIM_DT);

        for event in state.ctx.drain_events() {
            match event {
                GameEvent::Sound(effect) => log::trace!("sound: {}", effect.id()),
                GameEvent::ScoreAwarded { balls, points } => {
                    log::debug!("Eliminated {} balls for {} points", balls, points);
                }
                GameEvent::RequestWin => {
                    println!(
                        "Won after {:.1}s: score {}, {} shots",
                        state.time_ticks as f32 * SIM_DT,
                        state.score(),
                        state.shots_fired
                    );
                    return Ok(());
                }
                GameEvent::RequestFail => {
                    println!(
                        "Lost after {:.1}s: score {}, {} balls left, {} shots",
                        state.time_ticks as f32 * SIM_DT,
                        state.score(),
                        state.track.ball_count(),
                        state.shots_fired
                    );
                    return Ok(());
                }
            }
        }
    }

    println!(
        "Stopped after {:.0}s without a result: score {}, {} balls left",
        MAX_SECONDS,
        state.score(),
        state.track.ball_count()
    );
    Ok(())
}
