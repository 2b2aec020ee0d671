#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for RainDrop.
//!
//! The world owns every mutable store of a session: the timer scheduler, the
//! two drop pools, the result index, the lane scheduler and the session
//! counters. It changes only through [`apply`] and is observed through
//! [`query`].

use glam::Vec2;
use raindrop_core::{
    Command, DifficultyCatalogue, DifficultyProfile, DropId, Event, GameState, LaneIndex,
    OperationTemplate, PlayAreaGeometry, PoolKind, SessionConfig,
};
use tracing::{debug, error, trace, warn};

mod lanes;
mod pool;
mod result_index;
mod timers;

use lanes::LaneScheduler;
use result_index::ResultIndex;

pub use pool::{DropPool, PoolError, PooledDrop};
pub use timers::{TimerId, TimerScheduler, TimerState};

/// Callback payloads carried by the world's timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The spawn cadence elapsed.
    SpawnCadence,
    /// A lane cooldown elapsed.
    LaneReleased(LaneIndex),
}

#[derive(Debug)]
struct GameSession {
    state: GameState,
    score: i64,
    lives: u32,
    best_score: i64,
    points_until_next_difficulty: i64,
    difficulty_index: usize,
}

/// Represents the authoritative RainDrop world state.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    catalogue: DifficultyCatalogue,
    geometry: PlayAreaGeometry,
    timers: TimerScheduler<TimerEvent>,
    fired: Vec<TimerEvent>,
    cadence: TimerId,
    normal_pool: DropPool,
    golden_pool: DropPool,
    active: Vec<DropId>,
    index: ResultIndex,
    lanes: LaneScheduler,
    session: GameSession,
}

impl World {
    /// Creates a world sitting in the main menu with the provided configuration.
    ///
    /// `best_score` is the persisted best score read by the platform.
    #[must_use]
    pub fn new(config: SessionConfig, catalogue: DifficultyCatalogue, best_score: i64) -> Self {
        let mut timers = TimerScheduler::new();
        let cadence = timers.create();
        let lanes = LaneScheduler::new(&config.geometry, &mut timers);
        let points_until_next_difficulty = catalogue.first().score_threshold();

        Self {
            geometry: config.geometry,
            normal_pool: DropPool::new(PoolKind::Normal, config.normal_pool_capacity),
            golden_pool: DropPool::new(PoolKind::Golden, config.golden_pool_capacity),
            active: Vec::with_capacity(
                config.normal_pool_capacity + config.golden_pool_capacity,
            ),
            index: ResultIndex::default(),
            fired: Vec::new(),
            session: GameSession {
                state: GameState::MainMenu,
                score: 0,
                lives: config.starting_lives,
                best_score,
                points_until_next_difficulty,
                difficulty_index: 0,
            },
            config,
            catalogue,
            timers,
            cadence,
            lanes,
        }
    }

    fn profile(&self) -> &DifficultyProfile {
        self.catalogue
            .get(self.session.difficulty_index)
            .unwrap_or_else(|| self.catalogue.first())
    }

    fn pool(&self, kind: PoolKind) -> &DropPool {
        match kind {
            PoolKind::Normal => &self.normal_pool,
            PoolKind::Golden => &self.golden_pool,
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut DropPool {
        match kind {
            PoolKind::Normal => &mut self.normal_pool,
            PoolKind::Golden => &mut self.golden_pool,
        }
    }

    fn advance_timers(&mut self, seconds: f32, out_events: &mut Vec<Event>) {
        let mut fired = std::mem::take(&mut self.fired);
        self.timers.advance(seconds, &mut fired);
        for timer_event in fired.drain(..) {
            match timer_event {
                TimerEvent::SpawnCadence => out_events.push(Event::SpawnCadenceElapsed),
                TimerEvent::LaneReleased(lane) => {
                    self.lanes.release(lane);
                    out_events.push(Event::LaneReleased { lane });
                }
            }
        }
        self.fired = fired;
    }

    fn advance_drops(&mut self, seconds: f32, out_events: &mut Vec<Event>) {
        let distance = self.profile().fall_speed() * seconds;
        let floor = self.geometry.floor_y();

        let mut cursor = 0;
        while cursor < self.active.len() {
            let id = self.active[cursor];
            let fell_out = match self.pool_mut(id.pool()).get_mut(id) {
                Some(drop) => {
                    drop.fall(distance);
                    drop.position().y < floor
                }
                None => false,
            };

            if fell_out {
                trace!(?id, "drop fell out of the play area");
                self.despawn(id);
                out_events.push(Event::DropDespawned { drop: id });
            } else {
                cursor += 1;
            }
        }
    }

    fn spawn(
        &mut self,
        kind: PoolKind,
        lane: LaneIndex,
        template: OperationTemplate,
        out_events: &mut Vec<Event>,
    ) {
        if self.session.state != GameState::Gameplay {
            debug!(state = %self.session.state, "spawn ignored outside gameplay");
            return;
        }
        if !self.lanes.is_available(lane, &self.timers) {
            debug!(lane = lane.get(), "spawn ignored for unavailable lane");
            return;
        }
        let operation = match template.instantiate() {
            Ok(operation) => operation,
            Err(error) => {
                error!(%template, %error, "catalogue template failed to instantiate");
                debug_assert!(false, "validated template {template} failed: {error}");
                return;
            }
        };

        let position = Vec2::new(
            self.geometry.lane_center_x(lane),
            self.geometry.spawn_y(),
        );
        let Some(id) = self.pool_mut(kind).acquire(position) else {
            debug!(pool = %kind, "spawn skipped, pool exhausted");
            return;
        };
        if let Some(drop) = self.pool_mut(kind).get_mut(id) {
            drop.assign(operation, lane);
        }

        let release_after = self.geometry.lane_cooldown(self.profile().fall_speed());
        if !self.lanes.occupy(lane, release_after, &mut self.timers) {
            error!(lane = lane.get(), "spawned into a lane without starting its cooldown");
            debug_assert!(false, "lane {} accepted a spawn while cooling down", lane.get());
        }
        self.active.push(id);
        self.index.insert(operation.result(), id);

        debug!(?id, lane = lane.get(), %operation, "drop spawned");
        out_events.push(Event::DropSpawned {
            drop: id,
            lane,
            result: operation.result(),
        });
    }

    fn submit(&mut self, result: i32, out_events: &mut Vec<Event>) {
        if self.session.state != GameState::Gameplay {
            return;
        }
        let Some(id) = self.index.first(result) else {
            trace!(result, "submitted result matches no drop");
            return;
        };

        if id.pool().is_golden() {
            let cleared = self.active.len();
            self.clear_drops();
            debug!(result, cleared, "golden drop exploded");
            out_events.push(Event::GoldenDropExplosion { cleared });
        } else {
            self.despawn(id);
            debug!(result, ?id, "drop exploded");
            out_events.push(Event::DropExplosion { drop: id });
        }
    }

    /// Removes one drop from the active set, the result index and its pool.
    fn despawn(&mut self, id: DropId) {
        let result = self
            .pool(id.pool())
            .get(id)
            .and_then(PooledDrop::operation)
            .map(|operation| operation.result());

        if let Some(position) = self.active.iter().position(|active| *active == id) {
            let _ = self.active.remove(position);
        }
        if let Some(result) = result {
            let indexed = self.index.remove(result, id);
            debug_assert!(indexed, "active drop {id:?} missing from result index");
        }
        if let Err(error) = self.pool_mut(id.pool()).release(id) {
            error!(%error, "drop release violated pool ownership");
            debug_assert!(false, "drop release violated pool ownership: {error}");
        }
    }

    /// Bulk despawn without per-drop events.
    fn clear_drops(&mut self) {
        self.normal_pool.release_all();
        self.golden_pool.release_all();
        self.active.clear();
        self.index.clear();
    }

    fn set_state(&mut self, next: GameState, out_events: &mut Vec<Event>) {
        let current = self.session.state;
        if !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "rejected game state transition");
            return;
        }

        match next {
            GameState::Pause => {
                let _ = self.timers.pause(self.cadence);
            }
            GameState::Gameplay => {
                if current == GameState::Pause {
                    let _ = self.timers.unpause(self.cadence);
                }
            }
            GameState::GameOver | GameState::Victory => {
                let _ = self.timers.stop(self.cadence);
                self.clear_drops();
                if self.session.score > self.session.best_score {
                    self.session.best_score = self.session.score;
                    out_events.push(Event::BestScoreChanged {
                        best: self.session.best_score,
                    });
                }
                self.reset_score_and_lives(out_events);
            }
            GameState::MainMenu => {
                let _ = self.timers.stop(self.cadence);
                self.clear_drops();
                self.lanes.reset(&mut self.timers);
                self.reset_score_and_lives(out_events);
                self.reset_difficulty(out_events);
            }
        }

        self.session.state = next;
        debug!(from = %current, to = %next, "game state changed");
        out_events.push(Event::GameStateChanged {
            old: current,
            new: next,
        });
    }

    fn reset_score_and_lives(&mut self, out_events: &mut Vec<Event>) {
        if self.session.score != 0 {
            let delta = -self.session.score;
            self.session.score = 0;
            out_events.push(Event::PointsChanged { total: 0, delta });
        }
        let lives = self.config.starting_lives;
        if self.session.lives != lives {
            let delta = lives as i32 - self.session.lives as i32;
            self.session.lives = lives;
            out_events.push(Event::LivesChanged { lives, delta });
        }
    }

    fn reset_difficulty(&mut self, out_events: &mut Vec<Event>) {
        if self.session.difficulty_index != 0 {
            self.session.difficulty_index = 0;
            out_events.push(Event::DifficultyChanged {
                index: 0,
                profile: self.catalogue.first().clone(),
            });
        }
        self.reset_threshold(out_events);
    }

    fn reset_threshold(&mut self, out_events: &mut Vec<Event>) {
        let threshold = self.profile().score_threshold();
        let delta = threshold - self.session.points_until_next_difficulty;
        if delta != 0 {
            self.session.points_until_next_difficulty = threshold;
            out_events.push(Event::PointsLeftToDifficultyChanged {
                remaining: threshold,
                delta,
            });
        }
    }

    fn award(&mut self, points: i64, out_events: &mut Vec<Event>) {
        if self.session.state != GameState::Gameplay {
            return;
        }
        self.session.score += points;
        out_events.push(Event::PointsChanged {
            total: self.session.score,
            delta: points,
        });

        self.session.points_until_next_difficulty -= points;
        if self.session.points_until_next_difficulty <= 0 {
            out_events.push(Event::TargetPointsReached);
        } else {
            out_events.push(Event::PointsLeftToDifficultyChanged {
                remaining: self.session.points_until_next_difficulty,
                delta: -points,
            });
        }
    }

    fn lose_life(&mut self, out_events: &mut Vec<Event>) {
        if self.session.state != GameState::Gameplay || self.session.lives == 0 {
            return;
        }
        self.session.lives -= 1;
        out_events.push(Event::LivesChanged {
            lives: self.session.lives,
            delta: -1,
        });
    }

    fn advance_difficulty(&mut self, out_events: &mut Vec<Event>) {
        if self.session.state != GameState::Gameplay {
            return;
        }
        if !self.catalogue.has_next(self.session.difficulty_index) {
            out_events.push(Event::LastDifficultyFinished);
            return;
        }

        self.session.difficulty_index += 1;
        let profile = self.profile().clone();
        debug!(
            index = self.session.difficulty_index,
            fall_speed = profile.fall_speed(),
            spawn_cooldown = profile.spawn_cooldown(),
            "difficulty advanced"
        );
        out_events.push(Event::DifficultyChanged {
            index: self.session.difficulty_index,
            profile,
        });
        self.reset_threshold(out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePlayArea { geometry } => {
            if world.session.state != GameState::MainMenu {
                warn!(
                    state = %world.session.state,
                    "play area can only be reconfigured from the main menu"
                );
                return;
            }
            world.clear_drops();
            world.geometry = geometry;
            world.lanes.configure(&geometry, &mut world.timers);
            debug!(lanes = world.lanes.lane_count(), "play area configured");
        }
        Command::Tick { dt } => {
            let seconds = dt.as_secs_f32();
            world.advance_timers(seconds, out_events);
            if world.session.state == GameState::Gameplay {
                world.advance_drops(seconds, out_events);
            }
        }
        Command::SetGameState { state } => world.set_state(state, out_events),
        Command::ArmSpawnCadence { cooldown } => {
            if world.session.state == GameState::Gameplay {
                let _ = world
                    .timers
                    .start(world.cadence, cooldown, TimerEvent::SpawnCadence);
            }
        }
        Command::SpawnDrop {
            kind,
            lane,
            template,
        } => world.spawn(kind, lane, template, out_events),
        Command::SubmitResult { result } => world.submit(result, out_events),
        Command::AwardPoints { points } => world.award(points, out_events),
        Command::LoseLife => world.lose_life(out_events),
        Command::AdvanceDifficulty => world.advance_difficulty(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use raindrop_core::{
        DifficultyProfile, DropId, GameState, LaneIndex, Operation, PlayAreaGeometry, PoolKind,
        ProgressView, SpawnView,
    };

    use super::{DropPool, TimerState, World};

    /// Current state of the game state machine.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.session.state
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.session.score
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.session.lives
    }

    /// Best score recorded so far.
    #[must_use]
    pub fn best_score(world: &World) -> i64 {
        world.session.best_score
    }

    /// Points still required before the next difficulty.
    #[must_use]
    pub fn points_until_next_difficulty(world: &World) -> i64 {
        world.session.points_until_next_difficulty
    }

    /// Index of the active difficulty profile.
    #[must_use]
    pub fn difficulty_index(world: &World) -> usize {
        world.session.difficulty_index
    }

    /// Active difficulty profile.
    #[must_use]
    pub fn difficulty(world: &World) -> &DifficultyProfile {
        world.profile()
    }

    /// Play-area geometry currently in effect.
    #[must_use]
    pub fn geometry(world: &World) -> &PlayAreaGeometry {
        &world.geometry
    }

    /// Provides read-only access to the pool of the provided kind.
    #[must_use]
    pub fn pool(world: &World, kind: PoolKind) -> &DropPool {
        world.pool(kind)
    }

    /// Number of lanes derived from the play-area geometry.
    #[must_use]
    pub fn lane_count(world: &World) -> usize {
        world.lanes.lane_count()
    }

    /// Lanes currently accepting spawns, in ascending order.
    #[must_use]
    pub fn available_lanes(world: &World) -> &[LaneIndex] {
        world.lanes.available()
    }

    /// State of the spawn cadence timer.
    #[must_use]
    pub fn spawn_cadence_state(world: &World) -> TimerState {
        world.timers.state(world.cadence)
    }

    /// Oldest active drop displaying the provided result.
    #[must_use]
    pub fn oldest_drop_with_result(world: &World, result: i32) -> Option<DropId> {
        world.index.first(result)
    }

    /// Number of entries held by the result index.
    #[must_use]
    pub fn indexed_drop_count(world: &World) -> usize {
        world.index.len()
    }

    /// Reports whether the result index lists `drop` under `result`.
    #[must_use]
    pub fn is_indexed(world: &World, result: i32, drop: DropId) -> bool {
        world.index.contains(result, drop)
    }

    /// Captures the active drops in spawn order.
    #[must_use]
    pub fn drop_view(world: &World) -> DropView {
        let snapshots = world
            .active
            .iter()
            .filter_map(|id| world.pool(id.pool()).get(*id))
            .filter_map(|drop| {
                drop.operation().map(|operation| DropSnapshot {
                    id: drop.id(),
                    operation: *operation,
                    position: drop.position(),
                    lane: drop.lane(),
                })
            })
            .collect();
        DropView { snapshots }
    }

    /// Builds the view consumed by the spawn controller.
    #[must_use]
    pub fn spawn_view(world: &World) -> SpawnView<'_> {
        SpawnView {
            state: world.session.state,
            profile: world.profile(),
            normal_free: world.normal_pool.free_count(),
            golden_free: world.golden_pool.free_count(),
            available_lanes: world.lanes.available(),
        }
    }

    /// Builds the view consumed by the progression system.
    #[must_use]
    pub fn progress_view(world: &World) -> ProgressView {
        ProgressView {
            state: world.session.state,
        }
    }

    /// Read-only snapshot of the active drops.
    #[derive(Clone, Debug, Default)]
    pub struct DropView {
        snapshots: Vec<DropSnapshot>,
    }

    impl DropView {
        /// Iterator over the captured drops, oldest spawn first.
        pub fn iter(&self) -> impl Iterator<Item = &DropSnapshot> {
            self.snapshots.iter()
        }

        /// Number of active drops.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no drop is active.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view and returns the snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<DropSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single drop's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct DropSnapshot {
        /// Identifier of the drop.
        pub id: DropId,
        /// Operation the drop displays.
        pub operation: Operation,
        /// Position in world units.
        pub position: Vec2,
        /// Lane the drop falls down.
        pub lane: LaneIndex,
    }

    impl DropSnapshot {
        /// Reports whether the drop came from the golden pool.
        #[must_use]
        pub fn is_golden(&self) -> bool {
            self.id.pool().is_golden()
        }
    }
}
