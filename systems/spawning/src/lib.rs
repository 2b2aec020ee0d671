#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn controller responsible for emitting drop spawn commands.
//!
//! The controller never touches world state. Each time the spawn cadence
//! elapses it decides which pool to draw from, which lane to use and which
//! operation to display, then re-arms the cadence regardless of whether a drop
//! was actually spawned.

use raindrop_core::{Command, Event, GameState, LaneIndex, OperationTemplate, PoolKind, SpawnView};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that turns cadence expiries into spawn commands.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the spawn view to emit spawn and cadence commands.
    pub fn handle(&mut self, events: &[Event], view: &SpawnView<'_>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GameStateChanged {
                    old: GameState::MainMenu,
                    new: GameState::Gameplay,
                } => out.push(Command::ArmSpawnCadence {
                    cooldown: view.profile.spawn_cooldown(),
                }),
                Event::SpawnCadenceElapsed if view.state == GameState::Gameplay => {
                    if let Some(command) = self.plan_spawn(view) {
                        out.push(command);
                    }
                    out.push(Command::ArmSpawnCadence {
                        cooldown: view.profile.spawn_cooldown(),
                    });
                }
                _ => {}
            }
        }
    }

    fn plan_spawn(&mut self, view: &SpawnView<'_>) -> Option<Command> {
        let preferred = self.flip_pool(view.profile.golden_spawn_percent());
        let Some(kind) = select_pool(preferred, view) else {
            debug!("spawn skipped, both pools exhausted");
            return None;
        };
        let Some(lane) = self.select_lane(view.available_lanes) else {
            debug!("spawn skipped, no lane available");
            return None;
        };
        let template = self.select_template(view.profile.operations())?;

        Some(Command::SpawnDrop {
            kind,
            lane,
            template,
        })
    }

    /// Golden when a uniform draw over `1..100` is strictly below the percentage.
    fn flip_pool(&mut self, golden_percent: u32) -> PoolKind {
        if self.rng.gen_range(1..100) < golden_percent {
            PoolKind::Golden
        } else {
            PoolKind::Normal
        }
    }

    fn select_lane(&mut self, lanes: &[LaneIndex]) -> Option<LaneIndex> {
        lanes.choose(&mut self.rng).copied()
    }

    fn select_template(&mut self, templates: &[OperationTemplate]) -> Option<OperationTemplate> {
        templates.choose(&mut self.rng).copied()
    }
}

fn select_pool(preferred: PoolKind, view: &SpawnView<'_>) -> Option<PoolKind> {
    [preferred, preferred.other()]
        .into_iter()
        .find(|kind| view.free_slots(*kind) > 0)
}
