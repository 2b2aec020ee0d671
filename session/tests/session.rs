use std::{cell::RefCell, rc::Rc, time::Duration};

use raindrop_core::{
    DifficultyCatalogue, DifficultyProfile, Event, EventKind, GameState, OperationKind,
    OperationTemplate, SessionConfig,
};
use raindrop_session::{MemoryStore, Session};
use raindrop_world::query;

const RECORDED: [EventKind; 9] = [
    EventKind::GameStateChanged,
    EventKind::PointsChanged,
    EventKind::LivesChanged,
    EventKind::DifficultyChanged,
    EventKind::DropSpawned,
    EventKind::DropDespawned,
    EventKind::DropExplosion,
    EventKind::GoldenDropExplosion,
    EventKind::BestScoreChanged,
];

fn catalogue() -> DifficultyCatalogue {
    let operations = vec![
        OperationTemplate::new(2, 3, OperationKind::Sum),
        OperationTemplate::new(7, 2, OperationKind::Sub),
        OperationTemplate::new(3, 3, OperationKind::Mul),
        OperationTemplate::new(9, 2, OperationKind::Div),
        OperationTemplate::new(110, 11, OperationKind::And),
    ];
    DifficultyCatalogue::new(vec![
        DifficultyProfile::new(10, 2.0, 0.5, 300, operations.clone()),
        DifficultyProfile::new(25, 3.0, 0.3, 500, operations),
    ])
    .expect("valid catalogue")
}

fn session_with(seed: u64, store: MemoryStore) -> (Session, Rc<RefCell<Vec<Event>>>) {
    let config = SessionConfig {
        rng_seed: seed,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config, catalogue(), Box::new(store));
    let log = Rc::new(RefCell::new(Vec::new()));
    for kind in RECORDED {
        let log = Rc::clone(&log);
        let _ = session.bus_mut().subscribe(
            kind,
            Box::new(move |event: &Event| log.borrow_mut().push(event.clone())),
        );
    }
    (session, log)
}

fn tick(session: &mut Session) {
    session.tick(Duration::from_millis(125));
}

fn answer_oldest(session: &mut Session) -> bool {
    let oldest = query::drop_view(session.world())
        .iter()
        .next()
        .map(|drop| drop.operation.result());
    match oldest {
        Some(result) => session.submit_text(&result.to_string()),
        None => false,
    }
}

#[test]
fn start_click_enters_gameplay_and_spawns_on_cadence() {
    let (mut session, log) = session_with(1, MemoryStore::default());
    session.input(Event::StartGameClicked);
    assert_eq!(query::game_state(session.world()), GameState::Gameplay);
    assert_eq!(
        log.borrow().first(),
        Some(&Event::GameStateChanged {
            old: GameState::MainMenu,
            new: GameState::Gameplay,
        })
    );

    for _ in 0..4 {
        tick(&mut session);
    }
    let spawned = log
        .borrow()
        .iter()
        .filter(|event| matches!(event, Event::DropSpawned { .. }))
        .count();
    assert_eq!(spawned, 1, "one spawn per half-second cadence");
}

#[test]
fn typed_answers_explode_drops_and_score() {
    let (mut session, log) = session_with(2, MemoryStore::default());
    session.input(Event::StartGameClicked);
    for _ in 0..4 {
        tick(&mut session);
    }

    assert!(!session.submit_text("not a number"));
    assert!(!session.submit_text(""));
    assert_eq!(query::drop_view(session.world()).len(), 1);

    assert!(answer_oldest(&mut session));
    assert_eq!(query::score(session.world()), 100);
    assert!(log.borrow().iter().any(|event| matches!(
        event,
        Event::DropExplosion { .. } | Event::GoldenDropExplosion { .. }
    )));
}

#[test]
fn game_over_persists_the_best_score() {
    let store = MemoryStore::new(50);
    let (mut session, log) = session_with(3, store.clone());
    assert_eq!(query::best_score(session.world()), 50);

    session.input(Event::StartGameClicked);
    for _ in 0..4 {
        tick(&mut session);
    }
    assert!(answer_oldest(&mut session));

    let mut ticks = 0;
    while query::game_state(session.world()) == GameState::Gameplay && ticks < 2_000 {
        tick(&mut session);
        ticks += 1;
    }

    assert_eq!(query::game_state(session.world()), GameState::GameOver);
    assert_eq!(store.best(), 100);
    assert!(log
        .borrow()
        .contains(&Event::BestScoreChanged { best: 100 }));
    assert!(query::drop_view(session.world()).is_empty());

    session.input(Event::GoBackToMenuClicked);
    assert_eq!(query::game_state(session.world()), GameState::MainMenu);
    assert_eq!(query::lives(session.world()), 3);
    assert_eq!(query::score(session.world()), 0);
}

#[test]
fn quit_click_raises_the_flag() {
    let (mut session, _) = session_with(4, MemoryStore::default());
    assert!(!session.quit_requested());
    session.input(Event::QuitClicked);
    assert!(session.quit_requested());
}

#[test]
fn world_events_cannot_be_injected_as_input() {
    let (mut session, log) = session_with(5, MemoryStore::default());
    session.input(Event::TargetPointsReached);
    session.input(Event::DropDespawned {
        drop: raindrop_core::DropId::new(raindrop_core::PoolKind::Normal, 0),
    });
    assert!(log.borrow().is_empty());
    assert_eq!(query::lives(session.world()), 3);
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay(0xabcdef);
    let second = replay(0xabcdef);

    assert!(first.len() > 10, "replay produced too few events");
    assert_eq!(first, second, "replay diverged between runs");
}

fn replay(seed: u64) -> Vec<Event> {
    let (mut session, log) = session_with(seed, MemoryStore::default());
    session.input(Event::StartGameClicked);
    for step in 0..600 {
        tick(&mut session);
        if step % 7 == 0 {
            let _ = answer_oldest(&mut session);
        }
        if query::game_state(session.world()) != GameState::Gameplay {
            break;
        }
    }
    let events = log.borrow().clone();
    events
}
