#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session context wiring the RainDrop world, its systems and the event bus.
//!
//! A [`Session`] is constructed once per run and owns every collaborator. It
//! applies commands to the world, publishes the resulting events on the
//! [`EventBus`], feeds them to the systems and repeats until no command is
//! left, so each public call returns with the simulation quiescent.

use std::time::Duration;

use raindrop_core::{Command, DifficultyCatalogue, Event, PlayAreaGeometry, SessionConfig};
use raindrop_system_progression::{self as progression, Progression};
use raindrop_system_spawning::{self as spawning, Spawning};
use raindrop_world::{self as world, query, World};
use tracing::{debug, error, warn};

mod bus;
mod store;

pub use bus::{EventBus, Handler, SubscriptionId};
pub use store::{BestScoreStore, MemoryStore, StoreError};

/// Owns the world, the systems, the event bus and the best-score store.
pub struct Session {
    world: World,
    spawning: Spawning,
    progression: Progression,
    bus: EventBus,
    store: Box<dyn BestScoreStore>,
}

impl Session {
    /// Creates a session in the main menu, reading the best score from `store`.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        catalogue: DifficultyCatalogue,
        store: Box<dyn BestScoreStore>,
    ) -> Self {
        let best_score = store.load();
        debug!(best_score, profiles = catalogue.len(), "session created");
        Self {
            world: World::new(config, catalogue, best_score),
            spawning: Spawning::new(spawning::Config::new(config.rng_seed)),
            progression: Progression::new(progression::Config::new(config.points_per_match)),
            bus: EventBus::new(),
            store,
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the event bus for subscribing presentation handlers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Reports whether the player asked to quit.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.progression.quit_requested()
    }

    /// Replaces the play-area geometry; only honoured from the main menu.
    pub fn configure_play_area(&mut self, geometry: PlayAreaGeometry) {
        self.execute(vec![Command::ConfigurePlayArea { geometry }]);
    }

    /// Advances the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.execute(vec![Command::Tick { dt }]);
    }

    /// Parses text typed by the player and submits it when it is an integer.
    ///
    /// Returns whether the text was accepted.
    pub fn submit_text(&mut self, text: &str) -> bool {
        match text.trim().parse::<i32>() {
            Ok(result) => {
                self.input(Event::ResultSubmitted { result });
                true
            }
            Err(error) => {
                debug!(text, %error, "ignored non-numeric submission");
                false
            }
        }
    }

    /// Injects a player input event.
    pub fn input(&mut self, event: Event) {
        if !event.is_input() {
            warn!(kind = %event.kind(), "ignored non-input event");
            return;
        }
        let mut pending = Vec::new();
        self.dispatch(&[event], &mut pending);
        self.execute(pending);
    }

    fn execute(&mut self, mut pending: Vec<Command>) {
        let mut events = Vec::new();
        while !pending.is_empty() {
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.dispatch(&events, &mut pending);
            events.clear();
        }
    }

    fn dispatch(&mut self, events: &[Event], pending: &mut Vec<Command>) {
        for event in events {
            if let Event::BestScoreChanged { best } = event {
                self.persist(*best);
            }
            self.bus.publish(event);
        }
        self.spawning
            .handle(events, &query::spawn_view(&self.world), pending);
        self.progression
            .handle(events, &query::progress_view(&self.world), pending);
    }

    fn persist(&mut self, best: i64) {
        if let Err(error) = self.store.save(best) {
            error!(%error, "best score was not persisted");
        }
    }
}
