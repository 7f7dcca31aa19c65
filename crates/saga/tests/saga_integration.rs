//! Integration tests for the game handlers running on a live dispatcher.

use std::sync::Arc;
use std::time::Duration;

use common::AggregateId;
use domain::{AggregateState, Board, Mark, TicTacToe, current};
use event_store::{Event, EventStore, EventType, NewEvent};
use saga::{GAME_NOT_FOUND, GameObserver, Signal, register_game_handlers};
use tokio::task::JoinHandle;

const TIMEOUT: Duration = Duration::from_secs(2);

struct TestHarness {
    store: EventStore,
    _dispatcher: JoinHandle<()>,
}

impl TestHarness {
    fn new() -> Self {
        let (store, dispatcher) = EventStore::spawn();
        register_game_handlers(&store, Arc::new(TicTacToe)).unwrap();
        Self {
            store,
            _dispatcher: dispatcher,
        }
    }

    fn create(&self, game: &str) {
        self.store
            .commit(NewEvent::bare(game, EventType::GameCreated))
            .unwrap();
    }

    fn request(&self, game: &str, cell: &str) {
        self.store
            .commit(NewEvent::new(game, EventType::MoveRequested, cell))
            .unwrap();
    }

    /// Polls snapshots until the log holds `len` events.
    async fn wait_for_len(&self, len: usize) -> Vec<Event> {
        let poll = async {
            loop {
                let events = self.store.events().await.unwrap();
                if events.len() >= len {
                    return events;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(TIMEOUT, poll)
            .await
            .expect("log did not reach expected length")
    }

    async fn board(&self, game: &str) -> Board {
        let events = self.store.events().await.unwrap();
        match current(&TicTacToe, &events, &AggregateId::new(game)) {
            AggregateState::Initialized(board) => board,
            AggregateState::Uninitialized => panic!("game {game} does not exist"),
        }
    }
}

fn types(events: &[Event]) -> Vec<EventType> {
    events.iter().map(|e| e.event_type).collect()
}

#[tokio::test]
async fn accepted_move_derives_one_success() {
    let harness = TestHarness::new();
    harness.create("g1");
    harness.request("g1", "b2");

    let events = harness.wait_for_len(3).await;
    // Give a stray fact the chance to show up.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let events_after = harness.store.events().await.unwrap();
    assert_eq!(events, events_after);

    assert_eq!(
        types(&events),
        vec![
            EventType::GameCreated,
            EventType::MoveRequested,
            EventType::MoveSucceeded
        ]
    );
    let ids: Vec<u64> = events.iter().map(|e| e.id.as_u64()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(events[2].data, "b2");
    assert_eq!(harness.board("g1").await.get("b2".parse().unwrap()), Some(Mark::X));
}

#[tokio::test]
async fn rejected_move_derives_one_failure_and_keeps_state() {
    let harness = TestHarness::new();
    harness.create("g1");
    harness.request("g1", "b2");
    harness.wait_for_len(3).await;
    let before = harness.board("g1").await;

    harness.request("g1", "b2");
    let events = harness.wait_for_len(5).await;

    assert_eq!(events[3].event_type, EventType::MoveRequested);
    assert_eq!(events[4].event_type, EventType::MoveFailed);
    assert!(events[4].data.contains("already taken"));
    assert_eq!(harness.board("g1").await, before);
}

#[tokio::test]
async fn request_for_missing_game_fails() {
    let harness = TestHarness::new();
    harness.request("ghost", "a1");

    let events = harness.wait_for_len(2).await;
    assert_eq!(events[1].event_type, EventType::MoveFailed);
    assert_eq!(events[1].data, GAME_NOT_FOUND);
    assert_eq!(events[1].aggregate_id.as_str(), "ghost");
}

#[tokio::test]
async fn winning_move_records_exactly_one_fact() {
    let harness = TestHarness::new();
    harness.create("g1");

    // X: a1 a2 a3, O: b1 b2.
    let mut expected = 1;
    for cell in ["a1", "b1", "a2", "b2"] {
        harness.request("g1", cell);
        expected += 2;
        harness.wait_for_len(expected).await;
    }
    harness.request("g1", "a3");
    let events = harness.wait_for_len(expected + 3).await;

    let tail = &events[expected..];
    assert_eq!(
        types(tail),
        vec![
            EventType::MoveRequested,
            EventType::MoveSucceeded,
            EventType::FirstPlayerWon
        ]
    );
    assert_eq!(tail[2].data, "a3");
    assert!(tail[1].id < tail[2].id);

    // Further moves are rejected and add no second fact.
    harness.request("g1", "c3");
    let events = harness.wait_for_len(expected + 5).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let events_after = harness.store.events().await.unwrap();
    assert_eq!(events, events_after);
    assert_eq!(events.last().unwrap().event_type, EventType::MoveFailed);
    assert_eq!(
        events.iter().filter(|e| e.event_type.is_outcome()).count(),
        1
    );
}

#[tokio::test]
async fn queued_requests_after_win_record_one_fact() {
    let harness = TestHarness::new();
    harness.create("g1");

    let mut expected = 1;
    for cell in ["a1", "b1", "a2", "b2"] {
        harness.request("g1", cell);
        expected += 2;
        harness.wait_for_len(expected).await;
    }

    // Both requests are validated before the winning success is logged, so
    // both succeed and the second success arrives while the fact is queued.
    harness.request("g1", "a3");
    harness.request("g1", "c3");
    let events = harness.wait_for_len(expected + 5).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(events, harness.store.events().await.unwrap());

    let tail = &events[expected..];
    assert_eq!(
        types(tail),
        vec![
            EventType::MoveRequested,
            EventType::MoveRequested,
            EventType::MoveSucceeded,
            EventType::MoveSucceeded,
            EventType::FirstPlayerWon
        ]
    );
    assert_eq!(tail[4].data, "a3");

    // Once the fact is in the log a later request is simply rejected.
    harness.request("g1", "c2");
    let events = harness.wait_for_len(expected + 7).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(events, harness.store.events().await.unwrap());
    assert_eq!(events.last().unwrap().event_type, EventType::MoveFailed);
    assert_eq!(
        events.iter().filter(|e| e.event_type.is_outcome()).count(),
        1
    );
}

#[tokio::test]
async fn second_player_win_and_draw_facts() {
    let harness = TestHarness::new();
    harness.create("o-wins");
    harness.create("draw");

    // X: a1 b1 a3, O: c1 c2 c3.
    let mut len = 2;
    for cell in ["a1", "c1", "b1", "c2", "a3", "c3"] {
        harness.request("o-wins", cell);
        len += 2;
        harness.wait_for_len(len).await;
    }
    len += 1;
    let events = harness.wait_for_len(len).await;
    assert_eq!(events.last().unwrap().event_type, EventType::SecondPlayerWon);

    // X: a1 a2 b3 c1 c3, O: b1 b2 a3 c2.
    for cell in ["a1", "b1", "a2", "b2", "b3", "a3", "c1", "c2", "c3"] {
        harness.request("draw", cell);
        len += 2;
        harness.wait_for_len(len).await;
    }
    len += 1;
    let events = harness.wait_for_len(len).await;
    let last = events.last().unwrap();
    assert_eq!(last.event_type, EventType::Draw);
    assert_eq!(last.data, "c3");
}

#[tokio::test]
async fn each_request_gets_exactly_one_result() {
    let harness = TestHarness::new();
    harness.create("g1");
    harness.create("g2");

    let cells = ["a1", "b2", "zz", "a1", "c3"];
    for cell in cells {
        harness.request("g1", cell);
        harness.request("g2", cell);
    }

    let events = harness.wait_for_len(2 + 4 * cells.len()).await;
    for game in ["g1", "g2"] {
        let id = AggregateId::new(game);
        let stream: Vec<_> = events.iter().filter(|e| e.belongs_to(&id)).collect();
        let requests = stream
            .iter()
            .filter(|e| e.event_type == EventType::MoveRequested)
            .count();
        let results = stream
            .iter()
            .filter(|e| e.event_type.is_move_result())
            .count();
        assert_eq!(requests, cells.len());
        assert_eq!(results, cells.len());
    }
}

#[tokio::test]
async fn observer_signals_and_detaches() {
    let harness = TestHarness::new();
    harness.create("g1");
    harness.create("g2");
    let (token, mut signals) =
        GameObserver::watch(&harness.store, AggregateId::new("g1")).unwrap();

    harness.request("g2", "a1");
    harness.request("g1", "b2");
    harness.request("g1", "b2");

    let first = tokio::time::timeout(TIMEOUT, signals.recv()).await.unwrap();
    let second = tokio::time::timeout(TIMEOUT, signals.recv()).await.unwrap();
    assert_eq!(first, Some(Signal::Accepted));
    assert_eq!(second, Some(Signal::Rejected));

    drop(signals);
    harness.request("g1", "c3");
    harness.wait_for_len(2 + 8).await;

    // The observer removed itself, so deregistering again is a no-op.
    harness.store.deregister(token).unwrap();
    harness.request("g1", "a1");
    harness.wait_for_len(2 + 10).await;
}
