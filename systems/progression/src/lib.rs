#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scoring, difficulty progression and game state rules.
//!
//! The system reacts to world events and player input by emitting the
//! commands that award points, cost lives, advance the difficulty and drive
//! the game state machine.

use raindrop_core::{Command, Event, GameState, ProgressView};

/// Configuration parameters required to construct the progression system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    points_per_match: i64,
}

impl Config {
    /// Creates a new configuration awarding `points_per_match` for every explosion.
    #[must_use]
    pub const fn new(points_per_match: i64) -> Self {
        Self { points_per_match }
    }
}

/// Pure system translating events into progression commands.
#[derive(Debug)]
pub struct Progression {
    points_per_match: i64,
    quit_requested: bool,
}

impl Progression {
    /// Creates a new progression system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            points_per_match: config.points_per_match,
            quit_requested: false,
        }
    }

    /// Reports whether the player asked to quit the application.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Consumes events and the progress view to emit progression commands.
    pub fn handle(&mut self, events: &[Event], view: &ProgressView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::DropExplosion { .. } | Event::GoldenDropExplosion { .. } => {
                    out.push(Command::AwardPoints {
                        points: self.points_per_match,
                    });
                }
                Event::TargetPointsReached => out.push(Command::AdvanceDifficulty),
                Event::LastDifficultyFinished => {
                    request_state(view.state, GameState::Victory, out);
                }
                Event::DropDespawned { .. } => out.push(Command::LoseLife),
                Event::LivesChanged { lives: 0, .. } => {
                    request_state(view.state, GameState::GameOver, out);
                }
                Event::ResultSubmitted { result } => {
                    out.push(Command::SubmitResult { result: *result });
                }
                Event::StartGameClicked => {
                    if view.state == GameState::MainMenu {
                        out.push(Command::SetGameState {
                            state: GameState::Gameplay,
                        });
                    }
                }
                Event::PauseClicked => match view.state {
                    GameState::Gameplay => out.push(Command::SetGameState {
                        state: GameState::Pause,
                    }),
                    GameState::Pause => out.push(Command::SetGameState {
                        state: GameState::Gameplay,
                    }),
                    _ => {}
                },
                Event::ResumeClicked => {
                    if view.state == GameState::Pause {
                        out.push(Command::SetGameState {
                            state: GameState::Gameplay,
                        });
                    }
                }
                Event::GoBackToMenuClicked => {
                    request_state(view.state, GameState::MainMenu, out);
                }
                Event::QuitClicked => self.quit_requested = true,
                _ => {}
            }
        }
    }
}

fn request_state(current: GameState, next: GameState, out: &mut Vec<Command>) {
    if current.can_transition_to(next) {
        out.push(Command::SetGameState { state: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(state: GameState) -> ProgressView {
        ProgressView { state }
    }

    #[test]
    fn pause_click_toggles() {
        let mut progression = Progression::new(Config::new(100));
        let mut commands = Vec::new();

        progression.handle(&[Event::PauseClicked], &view(GameState::Gameplay), &mut commands);
        progression.handle(&[Event::PauseClicked], &view(GameState::Pause), &mut commands);
        progression.handle(&[Event::PauseClicked], &view(GameState::MainMenu), &mut commands);

        assert_eq!(
            commands,
            vec![
                Command::SetGameState {
                    state: GameState::Pause,
                },
                Command::SetGameState {
                    state: GameState::Gameplay,
                },
            ]
        );
    }

    #[test]
    fn golden_explosion_awards_a_single_match() {
        let mut progression = Progression::new(Config::new(100));
        let mut commands = Vec::new();
        progression.handle(
            &[Event::GoldenDropExplosion { cleared: 5 }],
            &view(GameState::Gameplay),
            &mut commands,
        );
        assert_eq!(commands, vec![Command::AwardPoints { points: 100 }]);
    }

    #[test]
    fn quit_sets_the_flag() {
        let mut progression = Progression::new(Config::new(100));
        let mut commands = Vec::new();
        assert!(!progression.quit_requested());
        progression.handle(&[Event::QuitClicked], &view(GameState::MainMenu), &mut commands);
        assert!(progression.quit_requested());
        assert!(commands.is_empty());
    }
}
