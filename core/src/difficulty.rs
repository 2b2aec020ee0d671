//! Difficulty profiles and the validated catalogue that orders them.

use std::{collections::HashSet, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operation::{OperationError, OperationTemplate};

/// Accepted range for the golden drop spawn percentage.
pub const GOLDEN_SPAWN_PERCENT_RANGE: RangeInclusive<u32> = 1..=100;
/// Accepted range for the fall speed, in world units per second.
pub const FALL_SPEED_RANGE: RangeInclusive<f32> = 0.5..=10.0;
/// Accepted range for the spawn cadence, in seconds.
pub const SPAWN_COOLDOWN_RANGE: RangeInclusive<f32> = 0.1..=4.0;

/// Bundle of spawn and fall parameters active for one stage of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    #[serde(rename = "golden_drop_spawn_percentage")]
    golden_spawn_percent: u32,
    #[serde(rename = "drops_speed")]
    fall_speed: f32,
    spawn_cooldown: f32,
    #[serde(rename = "score_to_reach")]
    score_threshold: i64,
    operations: Vec<OperationTemplate>,
}

impl DifficultyProfile {
    /// Creates an unvalidated profile; validation happens in [`DifficultyCatalogue::new`].
    #[must_use]
    pub fn new(
        golden_spawn_percent: u32,
        fall_speed: f32,
        spawn_cooldown: f32,
        score_threshold: i64,
        operations: Vec<OperationTemplate>,
    ) -> Self {
        Self {
            golden_spawn_percent,
            fall_speed,
            spawn_cooldown,
            score_threshold,
            operations,
        }
    }

    /// Chance, in percent, that a spawn attempt produces a golden drop.
    #[must_use]
    pub const fn golden_spawn_percent(&self) -> u32 {
        self.golden_spawn_percent
    }

    /// Speed at which drops fall, in world units per second.
    #[must_use]
    pub const fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    /// Seconds between two spawn attempts.
    #[must_use]
    pub const fn spawn_cooldown(&self) -> f32 {
        self.spawn_cooldown
    }

    /// Points required to leave this profile.
    #[must_use]
    pub const fn score_threshold(&self) -> i64 {
        self.score_threshold
    }

    /// Operations this profile may spawn.
    #[must_use]
    pub fn operations(&self) -> &[OperationTemplate] {
        &self.operations
    }

    fn validate(&self, profile: usize) -> Result<(), ConfigError> {
        if !GOLDEN_SPAWN_PERCENT_RANGE.contains(&self.golden_spawn_percent) {
            return Err(ConfigError::GoldenSpawnPercentOutOfRange {
                profile,
                value: self.golden_spawn_percent,
            });
        }
        if !FALL_SPEED_RANGE.contains(&self.fall_speed) {
            return Err(ConfigError::FallSpeedOutOfRange {
                profile,
                value: self.fall_speed,
            });
        }
        if !SPAWN_COOLDOWN_RANGE.contains(&self.spawn_cooldown) {
            return Err(ConfigError::SpawnCooldownOutOfRange {
                profile,
                value: self.spawn_cooldown,
            });
        }
        if self.score_threshold <= 0 {
            return Err(ConfigError::NonPositiveScoreThreshold {
                profile,
                value: self.score_threshold,
            });
        }
        if self.operations.is_empty() {
            return Err(ConfigError::EmptyOperations { profile });
        }

        let mut seen = HashSet::with_capacity(self.operations.len());
        for template in &self.operations {
            if !seen.insert(*template) {
                return Err(ConfigError::DuplicateOperation {
                    profile,
                    template: *template,
                });
            }
            if let Err(source) = template.instantiate() {
                return Err(ConfigError::InvalidOperation {
                    profile,
                    template: *template,
                    source,
                });
            }
        }
        Ok(())
    }
}

/// Ordered, validated list of difficulty profiles loaded once per session.
#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyCatalogue {
    profiles: Vec<DifficultyProfile>,
}

impl DifficultyCatalogue {
    /// Validates the provided profiles and wraps them in a catalogue.
    pub fn new(profiles: Vec<DifficultyProfile>) -> Result<Self, ConfigError> {
        if profiles.is_empty() {
            return Err(ConfigError::NoDifficulties);
        }
        for (index, profile) in profiles.iter().enumerate() {
            profile.validate(index)?;
        }
        Ok(Self { profiles })
    }

    /// Number of profiles in the catalogue; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; present for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Retrieves the profile at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DifficultyProfile> {
        self.profiles.get(index)
    }

    /// Profile every session starts with.
    #[must_use]
    pub fn first(&self) -> &DifficultyProfile {
        &self.profiles[0]
    }

    /// Reports whether a profile exists after the provided index.
    #[must_use]
    pub fn has_next(&self, index: usize) -> bool {
        index + 1 < self.profiles.len()
    }
}

/// Configuration problems detected while loading difficulty profiles.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The catalogue contains no profiles.
    #[error("no difficulty profiles configured")]
    NoDifficulties,
    /// A profile has an empty operation list.
    #[error("difficulty {profile} has no operations")]
    EmptyOperations {
        /// Index of the offending profile.
        profile: usize,
    },
    /// A profile lists the same operation twice.
    #[error("difficulty {profile} lists operation ({template}) more than once")]
    DuplicateOperation {
        /// Index of the offending profile.
        profile: usize,
        /// Repeated template.
        template: OperationTemplate,
    },
    /// A profile lists an operation that cannot be evaluated.
    #[error("difficulty {profile} operation ({template}) is invalid: {source}")]
    InvalidOperation {
        /// Index of the offending profile.
        profile: usize,
        /// Rejected template.
        template: OperationTemplate,
        /// Reason the operation was rejected.
        source: OperationError,
    },
    /// Golden spawn percentage lies outside `1..=100`.
    #[error("difficulty {profile} golden drop percentage {value} is outside 1..=100")]
    GoldenSpawnPercentOutOfRange {
        /// Index of the offending profile.
        profile: usize,
        /// Rejected value.
        value: u32,
    },
    /// Fall speed lies outside `0.5..=10.0`.
    #[error("difficulty {profile} drop speed {value} is outside 0.5..=10.0")]
    FallSpeedOutOfRange {
        /// Index of the offending profile.
        profile: usize,
        /// Rejected value.
        value: f32,
    },
    /// Spawn cooldown lies outside `0.1..=4.0`.
    #[error("difficulty {profile} spawn cooldown {value} is outside 0.1..=4.0")]
    SpawnCooldownOutOfRange {
        /// Index of the offending profile.
        profile: usize,
        /// Rejected value.
        value: f32,
    },
    /// Score threshold is zero or negative.
    #[error("difficulty {profile} score to reach {value} must be positive")]
    NonPositiveScoreThreshold {
        /// Index of the offending profile.
        profile: usize,
        /// Rejected value.
        value: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{OperationError, OperationKind};

    fn profile(operations: Vec<OperationTemplate>) -> DifficultyProfile {
        DifficultyProfile::new(10, 1.0, 2.0, 300, operations)
    }

    fn sum(first: i32, second: i32) -> OperationTemplate {
        OperationTemplate::new(first, second, OperationKind::Sum)
    }

    #[test]
    fn accepts_well_formed_profiles() {
        let catalogue = DifficultyCatalogue::new(vec![
            profile(vec![sum(1, 2), sum(2, 1)]),
            profile(vec![sum(1, 2)]),
        ])
        .expect("valid catalogue");

        assert_eq!(catalogue.len(), 2);
        assert!(catalogue.has_next(0));
        assert!(!catalogue.has_next(1));
        assert_eq!(catalogue.first().score_threshold(), 300);
    }

    #[test]
    fn rejects_empty_catalogue() {
        assert_eq!(
            DifficultyCatalogue::new(Vec::new()),
            Err(ConfigError::NoDifficulties)
        );
    }

    #[test]
    fn rejects_empty_operation_list() {
        let result = DifficultyCatalogue::new(vec![profile(vec![sum(1, 1)]), profile(Vec::new())]);
        assert_eq!(result, Err(ConfigError::EmptyOperations { profile: 1 }));
    }

    #[test]
    fn rejects_duplicate_triples() {
        let result = DifficultyCatalogue::new(vec![profile(vec![sum(1, 2), sum(1, 2)])]);
        assert_eq!(
            result,
            Err(ConfigError::DuplicateOperation {
                profile: 0,
                template: sum(1, 2),
            })
        );
    }

    #[test]
    fn same_operands_with_different_kind_are_not_duplicates() {
        let result = DifficultyCatalogue::new(vec![profile(vec![
            sum(1, 2),
            OperationTemplate::new(1, 2, OperationKind::Mul),
        ])]);
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_division_by_zero_at_load_time() {
        let template = OperationTemplate::new(8, 0, OperationKind::Div);
        let result = DifficultyCatalogue::new(vec![profile(vec![template])]);
        assert_eq!(
            result,
            Err(ConfigError::InvalidOperation {
                profile: 0,
                template,
                source: OperationError::DivisionByZero { dividend: 8 },
            })
        );
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let golden = DifficultyProfile::new(0, 1.0, 1.0, 100, vec![sum(1, 1)]);
        assert!(matches!(
            DifficultyCatalogue::new(vec![golden]),
            Err(ConfigError::GoldenSpawnPercentOutOfRange { value: 0, .. })
        ));

        let speed = DifficultyProfile::new(5, 12.0, 1.0, 100, vec![sum(1, 1)]);
        assert!(matches!(
            DifficultyCatalogue::new(vec![speed]),
            Err(ConfigError::FallSpeedOutOfRange { .. })
        ));

        let cooldown = DifficultyProfile::new(5, 1.0, 0.05, 100, vec![sum(1, 1)]);
        assert!(matches!(
            DifficultyCatalogue::new(vec![cooldown]),
            Err(ConfigError::SpawnCooldownOutOfRange { .. })
        ));

        let threshold = DifficultyProfile::new(5, 1.0, 1.0, 0, vec![sum(1, 1)]);
        assert!(matches!(
            DifficultyCatalogue::new(vec![threshold]),
            Err(ConfigError::NonPositiveScoreThreshold { value: 0, .. })
        ));
    }

    #[test]
    fn profile_deserializes_from_configuration_names() {
        let json = r#"{
            "golden_drop_spawn_percentage": 5,
            "drops_speed": 1.5,
            "spawn_cooldown": 2.0,
            "score_to_reach": 1000,
            "operations": [
                { "first_operand": 3, "second_operand": 4, "operation_type": "Mul" }
            ]
        }"#;

        let profile: DifficultyProfile = serde_json::from_str(json).expect("profile parses");
        assert_eq!(profile.golden_spawn_percent(), 5);
        assert_eq!(profile.score_threshold(), 1000);
        assert_eq!(
            profile.operations(),
            &[OperationTemplate::new(3, 4, OperationKind::Mul)]
        );
    }
}
