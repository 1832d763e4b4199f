//! Molecats headless driver
//!
//! Plays one round with scripted shots and logs what happens. Usage:
//!
//! ```text
//! molecats [settings.json] [seed] [success_clips_dir failure_clips_dir]
//! ```
//!
//! Set `RUST_LOG=debug` to see every bond and removal.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use molecats::audio::{AudioManager, LogBackend, SoundBank};
use molecats::sim::{ButtonState, MoleculeQueue, PointerInput, RoundPhase, Simulation, tick};
use molecats::{Result, SimSettings};

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u64 = 60 * 120;
/// Frames between scripted shots
const SHOT_INTERVAL: u64 = 45;
/// How far the pointer is pulled back before release
const PULL_DISTANCE: f32 = 3.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => SimSettings::load(path)?,
        None => SimSettings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let bank = match (args.next(), args.next()) {
        (Some(success), Some(failure)) => SoundBank::from_dirs(success, failure)?,
        _ => {
            log::info!("No clip directories given, bond cues are silent");
            SoundBank::default()
        }
    };

    log::info!("Molecats (headless) starting, seed {seed}");

    let mut audio = AudioManager::new(LogBackend, bank);
    audio.apply_settings(&settings);
    let mut script_rng = Pcg32::seed_from_u64(seed ^ 0x5eed);

    let mut sim = Simulation::new_round(seed, settings, MoleculeQueue::standard())?;

    while !sim.is_over() && sim.frames() < MAX_FRAMES {
        let input = scripted_input(&sim, &mut script_rng);
        let events = tick(&mut sim, &input, FRAME_DT);
        audio.play_events(&events, &mut script_rng);
    }

    match sim.phase() {
        RoundPhase::Over(outcome) => log::info!(
            "Round over after {} frames: {:?}, score {}, lives {}",
            sim.frames(),
            outcome,
            sim.score(),
            sim.lives()
        ),
        RoundPhase::Playing => log::info!(
            "Stopped after {} frames, score {}, lives {}, {} targets left",
            sim.frames(),
            sim.score(),
            sim.lives(),
            sim.targets().len()
        ),
    }
    Ok(())
}

/// Every few frames pick a random body, grab it and release it pulled back
/// in a random direction
fn scripted_input(sim: &Simulation, rng: &mut Pcg32) -> PointerInput {
    let bodies = sim.bodies();
    if bodies.is_empty() {
        return PointerInput::default();
    }

    match sim.frames() % SHOT_INTERVAL {
        0 => {
            let body = &bodies[rng.random_range(0..bodies.len())];
            PointerInput {
                position: body.position,
                shoot: ButtonState::press(),
                ..Default::default()
            }
        }
        1 => match sim.selected_body() {
            Some(body) => {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let pull = molecats::unit_from_angle(angle) * PULL_DISTANCE;
                PointerInput {
                    position: body.position + pull,
                    shoot: ButtonState::release(),
                    ..Default::default()
                }
            }
            None => PointerInput::default(),
        },
        _ => PointerInput::at(Vec2::ZERO),
    }
}
