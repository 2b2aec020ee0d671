#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless RainDrop session.

mod autoplay;
mod profiles;
mod store;

use std::{cell::RefCell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{ensure, Result};
use clap::Parser;
use raindrop_core::{Event, EventKind, GameState, PlayAreaGeometry, SessionConfig};
use raindrop_session::Session;
use raindrop_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{autoplay::Autoplayer, store::JsonFileStore};

/// Headless RainDrop simulation driven by a scripted player.
#[derive(Debug, Parser)]
#[command(name = "raindrop", version, about)]
struct Cli {
    /// TOML file with `[[difficulty]]` profiles; the built-in catalogue is used when omitted.
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// JSON file holding the persisted best score.
    #[arg(long, default_value = "raindrop_best_score.json")]
    best_score: PathBuf,

    /// Seed for spawn decisions and the scripted player.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Length of one simulation tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Maximum simulated seconds before the run stops.
    #[arg(long, default_value_t = 180.0)]
    duration: f64,

    /// Probability that the scripted player types the correct result.
    #[arg(long, default_value_t = 0.85)]
    accuracy: f64,

    /// Milliseconds between two answers of the scripted player.
    #[arg(long, default_value_t = 900)]
    answer_every_ms: u64,

    /// Play-area width in world units.
    #[arg(long, default_value_t = 10.0)]
    width: f32,

    /// Play-area height in world units.
    #[arg(long, default_value_t = 10.0)]
    height: f32,
}

#[derive(Debug, Default)]
struct Summary {
    peak_score: i64,
    explosions: u32,
    golden_explosions: u32,
    drops_lost: u32,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    ensure!(cli.tick_ms > 0, "tick length must be positive");
    ensure!(
        cli.duration.is_finite() && cli.duration > 0.0,
        "duration must be a positive number of seconds"
    );
    ensure!(
        (0.0..=1.0).contains(&cli.accuracy),
        "accuracy must lie within 0..=1"
    );

    let catalogue = profiles::load_catalogue(cli.profiles.as_deref())?;
    let config = SessionConfig {
        geometry: PlayAreaGeometry {
            width: cli.width,
            height: cli.height,
            ..PlayAreaGeometry::default()
        },
        rng_seed: cli.seed,
        ..SessionConfig::default()
    };
    ensure!(
        config.geometry.lane_count() > 0,
        "play area is narrower than a single drop"
    );

    let store = JsonFileStore::new(cli.best_score.clone());
    let mut session = Session::new(config, catalogue, Box::new(store));
    let summary = Rc::new(RefCell::new(Summary::default()));
    subscribe(&mut session, &summary);

    let dt = Duration::from_millis(cli.tick_ms);
    let limit = Duration::from_secs_f64(cli.duration);
    let mut autoplayer = Autoplayer::new(
        cli.seed.wrapping_add(1),
        cli.accuracy,
        Duration::from_millis(cli.answer_every_ms),
    );

    session.input(Event::StartGameClicked);
    let mut elapsed = Duration::ZERO;
    while elapsed < limit && query::game_state(session.world()) == GameState::Gameplay {
        session.tick(dt);
        elapsed += dt;

        let drops = query::drop_view(session.world());
        if let Some(answer) = autoplayer.next_answer(dt, &drops) {
            let _ = session.submit_text(&answer);
        }
    }

    let world = session.world();
    let summary = summary.borrow();
    println!("state:       {}", query::game_state(world));
    println!("elapsed:     {:.1}s", elapsed.as_secs_f64());
    println!("score:       {}", summary.peak_score);
    println!("best score:  {}", query::best_score(world));
    println!("difficulty:  {}", query::difficulty_index(world) + 1);
    println!(
        "explosions:  {} ({} golden)",
        summary.explosions, summary.golden_explosions
    );
    println!("drops lost:  {}", summary.drops_lost);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn subscribe(session: &mut Session, summary: &Rc<RefCell<Summary>>) {
    let bus = session.bus_mut();

    let _ = bus.subscribe(
        EventKind::GameStateChanged,
        Box::new(|event: &Event| {
            if let Event::GameStateChanged { old, new } = event {
                info!(from = %old, to = %new, "game state changed");
            }
        }),
    );
    let _ = bus.subscribe(
        EventKind::DifficultyChanged,
        Box::new(|event: &Event| {
            if let Event::DifficultyChanged { index, profile } = event {
                info!(
                    difficulty = index + 1,
                    fall_speed = profile.fall_speed(),
                    spawn_cooldown = profile.spawn_cooldown(),
                    "difficulty increased"
                );
            }
        }),
    );
    let _ = bus.subscribe(
        EventKind::BestScoreChanged,
        Box::new(|event: &Event| {
            if let Event::BestScoreChanged { best } = event {
                info!(best, "new best score");
            }
        }),
    );

    let tally = Rc::clone(summary);
    let _ = bus.subscribe(
        EventKind::PointsChanged,
        Box::new(move |event: &Event| {
            if let Event::PointsChanged { total, .. } = event {
                let mut summary = tally.borrow_mut();
                summary.peak_score = summary.peak_score.max(*total);
            }
        }),
    );
    let tally = Rc::clone(summary);
    let _ = bus.subscribe(
        EventKind::DropExplosion,
        Box::new(move |_: &Event| tally.borrow_mut().explosions += 1),
    );
    let tally = Rc::clone(summary);
    let _ = bus.subscribe(
        EventKind::GoldenDropExplosion,
        Box::new(move |_: &Event| {
            let mut summary = tally.borrow_mut();
            summary.explosions += 1;
            summary.golden_explosions += 1;
        }),
    );
    let tally = Rc::clone(summary);
    let _ = bus.subscribe(
        EventKind::LivesChanged,
        Box::new(move |event: &Event| {
            if let Event::LivesChanged { lives, delta } = event {
                if *delta < 0 {
                    tally.borrow_mut().drops_lost += 1;
                    info!(lives, "drop reached the ground");
                }
            }
        }),
    );
}
