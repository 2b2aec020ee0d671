#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the RainDrop simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and subscribers react to deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod difficulty;
mod operation;

pub use difficulty::{
    ConfigError, DifficultyCatalogue, DifficultyProfile, FALL_SPEED_RANGE,
    GOLDEN_SPAWN_PERCENT_RANGE, SPAWN_COOLDOWN_RANGE,
};
pub use operation::{Operation, OperationError, OperationKind, OperationTemplate};

/// Top-level state of a game session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum GameState {
    /// Title screen; no session is running.
    MainMenu,
    /// Drops spawn, fall and can be matched.
    Gameplay,
    /// Session suspended; the spawn cadence is paused.
    Pause,
    /// Lives were exhausted.
    GameOver,
    /// The last difficulty profile was completed.
    Victory,
}

impl GameState {
    /// Reports whether the state machine accepts a transition to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (GameState::MainMenu, GameState::Gameplay)
                | (GameState::Gameplay, GameState::Pause)
                | (GameState::Gameplay, GameState::GameOver)
                | (GameState::Gameplay, GameState::Victory)
                | (GameState::Pause, GameState::Gameplay)
                | (GameState::Pause, GameState::MainMenu)
                | (GameState::GameOver, GameState::MainMenu)
                | (GameState::Victory, GameState::MainMenu)
        )
    }
}

/// Identifies which of the two drop pools a drop belongs to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum_macros::Display,
)]
pub enum PoolKind {
    /// Ordinary drops; matching one removes only that drop.
    Normal,
    /// Rare drops; matching one clears every active drop.
    Golden,
}

impl PoolKind {
    /// Returns the other pool kind, used when substituting an exhausted pool.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Normal => Self::Golden,
            Self::Golden => Self::Normal,
        }
    }

    /// Reports whether drops of this kind are golden.
    #[must_use]
    pub const fn is_golden(self) -> bool {
        matches!(self, Self::Golden)
    }
}

/// Unique identifier of a pooled drop: its pool and slot within that pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DropId {
    pool: PoolKind,
    slot: u32,
}

impl DropId {
    /// Creates a new drop identifier.
    #[must_use]
    pub const fn new(pool: PoolKind, slot: u32) -> Self {
        Self { pool, slot }
    }

    /// Pool that issued the drop.
    #[must_use]
    pub const fn pool(&self) -> PoolKind {
        self.pool
    }

    /// Slot index within the issuing pool.
    #[must_use]
    pub const fn slot(&self) -> u32 {
        self.slot
    }
}

/// Index of a spawn lane, counted from the left edge of the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneIndex(u32);

impl LaneIndex {
    /// Creates a new lane index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Platform-provided geometry of the play area and of a single drop sprite.
///
/// The play area is centred on the origin: x spans `-width/2..width/2` and
/// drops fall from `height/2` toward `-height/2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayAreaGeometry {
    /// Width of the visible play area in world units.
    pub width: f32,
    /// Height of the visible play area in world units.
    pub height: f32,
    /// Half of a drop sprite's width.
    pub drop_half_width: f32,
    /// Half of a drop sprite's height.
    pub drop_half_height: f32,
}

impl PlayAreaGeometry {
    /// Number of lanes that fit side by side: `floor(width / (2 * drop_half_width))`.
    #[must_use]
    pub fn lane_count(&self) -> u32 {
        let drop_width = self.drop_half_width * 2.0;
        if drop_width <= 0.0 || self.width <= 0.0 {
            return 0;
        }
        (self.width / drop_width).floor() as u32
    }

    /// Horizontal centre of the provided lane.
    #[must_use]
    pub fn lane_center_x(&self, lane: LaneIndex) -> f32 {
        let count = self.lane_count().max(1) as f32;
        let lane_width = self.width / count;
        -self.width / 2.0 + lane.get() as f32 * lane_width + lane_width / 2.0
    }

    /// Vertical position at which new drops appear, just above the visible area.
    #[must_use]
    pub fn spawn_y(&self) -> f32 {
        self.height / 2.0 + self.drop_half_height
    }

    /// Vertical position below which a drop has left the visible area.
    #[must_use]
    pub fn floor_y(&self) -> f32 {
        -self.height / 2.0 - self.drop_half_height
    }

    /// Seconds a lane stays occupied after a spawn: one full drop height at `fall_speed`.
    #[must_use]
    pub fn lane_cooldown(&self, fall_speed: f32) -> f32 {
        self.drop_half_height * 2.0 / fall_speed
    }
}

impl Default for PlayAreaGeometry {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            drop_half_width: 0.5,
            drop_half_height: 0.5,
        }
    }
}

/// Tunables fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Play-area geometry used to derive lanes and spawn positions.
    pub geometry: PlayAreaGeometry,
    /// Lives granted at the start of every session.
    pub starting_lives: u32,
    /// Points awarded per exploded drop.
    pub points_per_match: i64,
    /// Capacity of the normal drop pool.
    pub normal_pool_capacity: usize,
    /// Capacity of the golden drop pool.
    pub golden_pool_capacity: usize,
    /// Seed for every random decision taken by the spawn controller.
    pub rng_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: PlayAreaGeometry::default(),
            starting_lives: 3,
            points_per_match: 100,
            normal_pool_capacity: 16,
            golden_pool_capacity: 4,
            rng_seed: 0x5eed_da7a_0f_d20b,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the play-area geometry and rebuilds the lanes; ignored outside the main menu.
    ConfigurePlayArea {
        /// New geometry supplied by the platform.
        geometry: PlayAreaGeometry,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a transition of the game state machine.
    SetGameState {
        /// State the world should enter.
        state: GameState,
    },
    /// Starts the spawn cadence timer unless it is already running.
    ArmSpawnCadence {
        /// Seconds until the next spawn attempt.
        cooldown: f32,
    },
    /// Requests that a drop be drawn from a pool and placed on top of a lane.
    SpawnDrop {
        /// Pool the drop is drawn from.
        kind: PoolKind,
        /// Lane the drop falls down.
        lane: LaneIndex,
        /// Operation the drop displays.
        template: OperationTemplate,
    },
    /// Matches a player-submitted result against the active drops.
    SubmitResult {
        /// Value typed by the player.
        result: i32,
    },
    /// Adds points to the score and subtracts them from the difficulty threshold.
    AwardPoints {
        /// Points to award.
        points: i64,
    },
    /// Removes one life from the player.
    LoseLife,
    /// Activates the next difficulty profile.
    AdvanceDifficulty,
}

/// Events broadcast by the world after processing commands, plus the inputs
/// adapters inject on behalf of the player.
///
/// The field-less [`EventKind`] discriminant is derived alongside and keys
/// event-bus subscriptions.
#[derive(Clone, Debug, PartialEq, strum_macros::EnumDiscriminants)]
#[strum_discriminants(
    name(EventKind),
    derive(Hash, PartialOrd, Ord, strum_macros::Display, strum_macros::EnumCount),
    allow(missing_docs)
)]
pub enum Event {
    /// The game state machine changed state.
    GameStateChanged {
        /// State before the transition.
        old: GameState,
        /// State after the transition.
        new: GameState,
    },
    /// The score changed.
    PointsChanged {
        /// Score after the change.
        total: i64,
        /// Signed amount applied.
        delta: i64,
    },
    /// The remaining points before the next difficulty changed.
    PointsLeftToDifficultyChanged {
        /// Points still required.
        remaining: i64,
        /// Signed amount applied.
        delta: i64,
    },
    /// The active profile's score threshold was reached.
    TargetPointsReached,
    /// The number of lives changed.
    LivesChanged {
        /// Lives after the change.
        lives: u32,
        /// Signed amount applied.
        delta: i32,
    },
    /// A new difficulty profile became active.
    DifficultyChanged {
        /// Index of the active profile.
        index: usize,
        /// Parameters of the active profile.
        profile: DifficultyProfile,
    },
    /// The threshold of the last profile was reached.
    LastDifficultyFinished,
    /// A new best score was recorded.
    BestScoreChanged {
        /// Best score after the update.
        best: i64,
    },
    /// The spawn cadence timer expired.
    SpawnCadenceElapsed,
    /// A lane's cooldown expired and it accepts spawns again.
    LaneReleased {
        /// Lane that became available.
        lane: LaneIndex,
    },
    /// A drop entered the play area.
    DropSpawned {
        /// Identifier of the new drop.
        drop: DropId,
        /// Lane the drop falls down.
        lane: LaneIndex,
        /// Result that matches the drop.
        result: i32,
    },
    /// A drop fell past the bottom of the play area.
    DropDespawned {
        /// Identifier of the lost drop.
        drop: DropId,
    },
    /// A normal drop was matched and destroyed.
    DropExplosion {
        /// Identifier of the destroyed drop.
        drop: DropId,
    },
    /// A golden drop was matched and every active drop was destroyed.
    ///
    /// Published once per golden match however many drops were cleared, so
    /// the match scores a single award rather than one per cleared drop.
    GoldenDropExplosion {
        /// Number of drops cleared, the golden drop included.
        cleared: usize,
    },
    /// The player submitted a numeric result.
    ResultSubmitted {
        /// Submitted value.
        result: i32,
    },
    /// The player asked to start a session from the main menu.
    StartGameClicked,
    /// The player toggled pause.
    PauseClicked,
    /// The player asked to resume from pause.
    ResumeClicked,
    /// The player asked to return to the main menu.
    GoBackToMenuClicked,
    /// The player asked to quit the application.
    QuitClicked,
}

impl Event {
    /// Discriminant of the event, used as a subscription key.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }

    /// Reports whether the event originates from player input rather than the world.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(
            self,
            Event::ResultSubmitted { .. }
                | Event::StartGameClicked
                | Event::PauseClicked
                | Event::ResumeClicked
                | Event::GoBackToMenuClicked
                | Event::QuitClicked
        )
    }
}

/// Read-only view consumed by the spawn controller.
#[derive(Clone, Copy, Debug)]
pub struct SpawnView<'a> {
    /// Current game state.
    pub state: GameState,
    /// Active difficulty profile.
    pub profile: &'a DifficultyProfile,
    /// Free slots left in the normal pool.
    pub normal_free: usize,
    /// Free slots left in the golden pool.
    pub golden_free: usize,
    /// Lanes whose cooldown is not running, in ascending order.
    pub available_lanes: &'a [LaneIndex],
}

impl SpawnView<'_> {
    /// Free slots left in the pool of the provided kind.
    #[must_use]
    pub const fn free_slots(&self, kind: PoolKind) -> usize {
        match kind {
            PoolKind::Normal => self.normal_free,
            PoolKind::Golden => self.golden_free,
        }
    }
}

/// Read-only view consumed by the progression system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressView {
    /// Current game state.
    pub state: GameState,
}

#[cfg(test)]
mod tests {
    use strum::EnumCount;

    use super::*;

    #[test]
    fn lane_count_floors_play_width() {
        let geometry = PlayAreaGeometry {
            width: 10.5,
            height: 8.0,
            drop_half_width: 0.5,
            drop_half_height: 0.25,
        };
        assert_eq!(geometry.lane_count(), 10);
    }

    #[test]
    fn lane_count_handles_degenerate_geometry() {
        let geometry = PlayAreaGeometry {
            width: 10.0,
            height: 8.0,
            drop_half_width: 0.0,
            drop_half_height: 0.25,
        };
        assert_eq!(geometry.lane_count(), 0);
    }

    #[test]
    fn lane_centres_partition_the_width() {
        let geometry = PlayAreaGeometry {
            width: 4.0,
            height: 4.0,
            drop_half_width: 0.5,
            drop_half_height: 0.5,
        };
        assert_eq!(geometry.lane_center_x(LaneIndex::new(0)), -1.5);
        assert_eq!(geometry.lane_center_x(LaneIndex::new(3)), 1.5);
    }

    #[test]
    fn lane_cooldown_matches_one_drop_height() {
        let geometry = PlayAreaGeometry {
            width: 4.0,
            height: 4.0,
            drop_half_width: 0.5,
            drop_half_height: 0.75,
        };
        assert_eq!(geometry.lane_cooldown(1.5), 1.0);
    }

    #[test]
    fn state_machine_rejects_unlisted_transitions() {
        assert!(GameState::MainMenu.can_transition_to(GameState::Gameplay));
        assert!(GameState::Pause.can_transition_to(GameState::MainMenu));
        assert!(GameState::Victory.can_transition_to(GameState::MainMenu));
        assert!(!GameState::MainMenu.can_transition_to(GameState::Pause));
        assert!(!GameState::GameOver.can_transition_to(GameState::Gameplay));
        assert!(!GameState::Pause.can_transition_to(GameState::GameOver));
        assert!(!GameState::Gameplay.can_transition_to(GameState::Gameplay));
    }

    #[test]
    fn pool_kind_substitution_is_symmetric() {
        assert_eq!(PoolKind::Normal.other(), PoolKind::Golden);
        assert_eq!(PoolKind::Golden.other(), PoolKind::Normal);
    }

    #[test]
    fn input_events_are_flagged() {
        assert!(Event::ResultSubmitted { result: 4 }.is_input());
        assert!(Event::QuitClicked.is_input());
        assert!(!Event::TargetPointsReached.is_input());
        assert_eq!(Event::PauseClicked.kind(), EventKind::PauseClicked);
    }

    #[test]
    fn event_kind_is_derived_from_every_variant() {
        assert_eq!(EventKind::COUNT, 20);
        let golden = Event::GoldenDropExplosion { cleared: 3 };
        assert_eq!(golden.kind(), EventKind::GoldenDropExplosion);
        assert_eq!(golden.kind().to_string(), "GoldenDropExplosion");
        assert_eq!(
            Event::LivesChanged { lives: 0, delta: -1 }.kind(),
            EventKind::LivesChanged
        );
    }
}
