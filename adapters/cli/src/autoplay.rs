use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use raindrop_world::query::DropView;

/// Scripted player that answers the lowest drop at a fixed interval.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    rng: ChaCha8Rng,
    accuracy: f64,
    answer_interval: Duration,
    since_last_answer: Duration,
}

impl Autoplayer {
    /// `accuracy` is the probability of typing the correct result.
    pub(crate) fn new(seed: u64, accuracy: f64, answer_interval: Duration) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy,
            answer_interval,
            since_last_answer: Duration::ZERO,
        }
    }

    /// Text the player types after `dt` elapsed, if an answer is due.
    pub(crate) fn next_answer(&mut self, dt: Duration, drops: &DropView) -> Option<String> {
        self.since_last_answer += dt;
        if self.since_last_answer < self.answer_interval {
            return None;
        }

        let lowest = drops
            .iter()
            .min_by(|a, b| a.position.y.total_cmp(&b.position.y))?;
        self.since_last_answer = Duration::ZERO;

        let result = lowest.operation.result();
        if self.rng.gen_bool(self.accuracy) {
            Some(result.to_string())
        } else {
            Some(result.wrapping_add(1).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use raindrop_core::{
        Command, DifficultyCatalogue, DifficultyProfile, GameState, LaneIndex, OperationKind,
        OperationTemplate, PoolKind, SessionConfig,
    };
    use raindrop_world::{self as world, query, World};

    use super::*;

    fn world_with_drops() -> World {
        let template = OperationTemplate::new(6, 7, OperationKind::Mul);
        let catalogue =
            DifficultyCatalogue::new(vec![DifficultyProfile::new(5, 1.0, 1.0, 500, vec![template])])
                .expect("valid catalogue");
        let mut world = World::new(SessionConfig::default(), catalogue, 0);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SetGameState {
                state: GameState::Gameplay,
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::SpawnDrop {
                kind: PoolKind::Normal,
                lane: LaneIndex::new(0),
                template,
            },
            &mut events,
        );
        world
    }

    #[test]
    fn waits_for_the_answer_interval() {
        let world = world_with_drops();
        let drops = query::drop_view(&world);
        let mut player = Autoplayer::new(1, 1.0, Duration::from_millis(500));

        assert_eq!(player.next_answer(Duration::from_millis(250), &drops), None);
        assert_eq!(
            player.next_answer(Duration::from_millis(250), &drops),
            Some("42".to_owned())
        );
        assert_eq!(player.next_answer(Duration::from_millis(250), &drops), None);
    }

    #[test]
    fn inaccurate_player_types_a_wrong_result() {
        let world = world_with_drops();
        let drops = query::drop_view(&world);
        let mut player = Autoplayer::new(1, 0.0, Duration::ZERO);
        assert_eq!(
            player.next_answer(Duration::ZERO, &drops),
            Some("43".to_owned())
        );
    }

    #[test]
    fn no_drops_means_no_answer() {
        let mut player = Autoplayer::new(1, 1.0, Duration::ZERO);
        assert_eq!(player.next_answer(Duration::ZERO, &DropView::default()), None);
    }
}
