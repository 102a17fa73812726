//! Headless demo host: a few scripted characters in one scene, stepped by a shared tick clock
//! under irregular frame times. Prints a per-second summary and each character's state history.

mod scene;
mod script;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use movement::{
    CapsuleSpec, Character, CharacterId, CharacterRegistry, ConstructionError, MovementConfig,
    Quat,
};

use crate::script::{Bot, FRAME_TIMES};

#[derive(Parser, Debug)]
#[command(name = "sim")]
#[command(about = "Runs scripted characters through the demo scene", long_about = None)]
struct Args {
    /// Movement config (TOML). Defaults are used when omitted.
    #[arg(short, long, env = "MOVEMENT_CONFIG")]
    config: Option<PathBuf>,

    /// Simulated seconds of frame time to run.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f32,

    /// Print every recorded state transition at the end.
    #[arg(long)]
    history: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ConstructionError> {
    let config = match &args.config {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            MovementConfig::load(path)?
        }
        None => MovementConfig::default(),
    };
    // Clock and characters must agree on the clamped tick settings.
    let config = config.validate()?.config;

    let world = scene::demo_world();
    let mut registry = CharacterRegistry::new(config.tick)?;
    for (i, bot) in Bot::ALL.iter().enumerate() {
        let character = Character::builder(config.clone())
            .capsule(CapsuleSpec::default())
            .spawn(bot.spawn(), Quat::identity())
            .build()?;
        registry.register(CharacterId(i as u32), character);
    }

    let mut elapsed = 0.0f32;
    let mut next_report = 1.0f32;
    let mut frames = 0usize;
    let mut ticks = 0u32;
    while elapsed < args.seconds {
        let inputs: BTreeMap<CharacterId, _> = Bot::ALL
            .iter()
            .enumerate()
            .map(|(i, bot)| (CharacterId(i as u32), bot.input(elapsed)))
            .collect();

        let dt = FRAME_TIMES[frames % FRAME_TIMES.len()];
        ticks += registry.update(&world, dt, &inputs);
        elapsed += dt;
        frames += 1;

        if elapsed >= next_report {
            report(&registry, elapsed);
            next_report += 1.0;
        }
    }

    log::info!(
        "{frames} frames, {ticks} ticks, final tick {}",
        registry.clock().current_tick()
    );
    if args.history {
        for (id, character) in registry.iter() {
            log::info!("history of {id}:");
            for entry in character.history().iter() {
                log::info!("  {entry}");
            }
        }
    }
    Ok(())
}

fn report(registry: &CharacterRegistry, elapsed: f32) {
    for ((id, character), bot) in registry.iter().zip(Bot::ALL) {
        let p = character.position();
        let h = character.horizontal_velocity();
        log::info!(
            "t={elapsed:5.2} {id} {bot:?}: {:<12} pos=({:6.2}, {:5.2}, {:6.2}) speed={:5.2} vy={:6.2} grounded={}",
            character.current_state_name(),
            p.x,
            p.y,
            p.z,
            h.norm(),
            character.vertical_velocity(),
            character.data().is_grounded,
        );
    }
}
