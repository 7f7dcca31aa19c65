use common::AggregateId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Cutoff, TicTacToe, current, replay};
use event_store::{Event, EventId, EventType};

const GAME: [&str; 9] = ["b2", "a1", "a3", "c1", "b1", "b3", "a2", "c2", "c3"];

/// A log of `games` interleaved draws, each with request/success pairs.
fn make_log(games: usize) -> Vec<Event> {
    let mut events = Vec::new();
    let mut push = |aggregate: usize, event_type: EventType, data: &str| {
        events.push(Event {
            id: EventId::new(events.len() as u64),
            aggregate_id: AggregateId::new(format!("game-{aggregate}")),
            event_type,
            data: data.to_string(),
        });
    };

    for g in 0..games {
        push(g, EventType::GameCreated, "");
    }
    for cell in GAME {
        for g in 0..games {
            push(g, EventType::MoveRequested, cell);
            push(g, EventType::MoveSucceeded, cell);
        }
    }
    events
}

fn bench_replay_single_game(c: &mut Criterion) {
    let events = make_log(1);
    let id = AggregateId::new("game-0");

    c.bench_function("domain/replay_single_game", |b| {
        b.iter(|| current(&TicTacToe, &events, &id));
    });
}

fn bench_replay_in_busy_log(c: &mut Criterion) {
    let events = make_log(100);
    let id = AggregateId::new("game-42");

    c.bench_function("domain/replay_one_of_100_games", |b| {
        b.iter(|| current(&TicTacToe, &events, &id));
    });
}

fn bench_replay_with_cutoff(c: &mut Criterion) {
    let events = make_log(100);
    let id = AggregateId::new("game-42");
    let cutoff = Cutoff::At(EventId::new(events.len() as u64 / 2));

    c.bench_function("domain/replay_as_of_midpoint", |b| {
        b.iter(|| replay(&TicTacToe, &events, &id, cutoff));
    });
}

criterion_group!(
    benches,
    bench_replay_single_game,
    bench_replay_in_busy_log,
    bench_replay_with_cutoff,
);
criterion_main!(benches);
