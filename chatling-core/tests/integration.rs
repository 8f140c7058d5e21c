//! Integration tests — end-to-end pet lifecycles.
//!
//! These tests drive the public engine API over a real SQLite database:
//! adoption, care, decay, night trouble, evolution, death and revival.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chatling_core::clock::{Clock, FixedClock};
use chatling_core::config::{EngineConfig, StorageConfig};
use chatling_core::engine::{ActionOutcome, MessagePayload, PetEngine, Rejection};
use chatling_core::repo::{PetRepository, SqliteRepository};
use chatling_core::rng::SequenceDice;
use chatling_core::scheduler::PassNotice;
use chatling_core::types::{
    ChatId, EventKind, PetType, Stage, UserId, UserRef, UserStat, Vitals,
};

const DAY: &str = "2024-06-01T12:00:00Z";
const NIGHT: &str = "2024-06-01T03:00:00Z";
const CHAT: ChatId = ChatId(42);

fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn user(id: i64, name: &str) -> UserRef {
    UserRef {
        id: UserId(id),
        username: Some(name.to_string()),
        first_name: None,
    }
}

struct World {
    clock: Arc<FixedClock>,
    engine: Arc<PetEngine>,
}

fn world_at(at: &str, dice: SequenceDice) -> World {
    let repo = SqliteRepository::open_in_memory(&StorageConfig::default()).expect("open");
    let clock = Arc::new(FixedClock::pinned(ts(at)));
    let engine = Arc::new(PetEngine::new(
        Arc::new(repo),
        Arc::new(dice),
        Arc::clone(&clock) as Arc<dyn Clock>,
        EngineConfig::default(),
    ));
    World { clock, engine }
}

fn world(at: &str) -> World {
    world_at(at, SequenceDice::default())
}

// ---------------------------------------------------------------------------
// Full lifecycle: adopt → care → grow → evolve
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_pet_lifecycle() {
    let world = world_at(DAY, SequenceDice::scripted(vec![0.49], vec![]));
    let engine = &world.engine;
    let alice = user(1, "alice");
    let bob = user(2, "bob");

    // 1. The chat adopts a pet.
    let pet = engine.adopt(CHAT, Some("Pixel")).await.expect("adopt");
    assert_eq!(pet.name, "Pixel");
    assert_eq!(pet.stage, Stage::Egg);
    assert_eq!(pet.vitals, Vitals::FULL);

    // 2. A day of care: feeds, play and one lucky gamble.
    for _ in 0..18 {
        engine.feed(CHAT, &alice).await.expect("feed");
    }
    match engine.play(CHAT, &bob).await.expect("play") {
        ActionOutcome::Played { pet, .. } => assert_eq!(pet.vitals.energy, 90),
        other => panic!("expected a play, got {other:?}"),
    }
    match engine.gamble(CHAT, &bob).await.expect("gamble") {
        ActionOutcome::GambleWon { .. } => {}
        other => panic!("expected a win, got {other:?}"),
    }

    // 3. Chatter trickles in and gets classified.
    engine
        .record_message(CHAT, &alice, MessagePayload::Text("look at him go".to_string()))
        .await
        .expect("message");
    engine
        .record_message(CHAT, &bob, MessagePayload::Sticker)
        .await
        .expect("sticker");

    // 4. One scheduler tick: decay, then the hatch at 100 xp.
    world.clock.set(ts("2024-06-01T13:00:00Z"));
    let outcomes = engine.run_tick_pass().await.expect("tick");
    assert!(
        outcomes
            .iter()
            .any(|o| matches!(o.notice, PassNotice::Evolved { .. })),
        "18 feeds, a play and a message are a hatch's worth of xp"
    );

    // 5. Status reflects the new stage and the day's bookkeeping.
    let status = engine.status(CHAT).expect("status").expect("snapshot");
    assert_eq!(status.stage, Stage::Baby);
    assert_eq!(status.xp, 101);
    assert_eq!(status.level, 2);
    assert!(status.alive);
    assert!(!status.sleeping);
    assert_eq!(status.counters.meme, 1);

    // 6. The ledger knows who did the work.
    let feeders = engine.top_users(CHAT, UserStat::Karma, 5).expect("top");
    assert_eq!(feeders[0].user, UserId(1), "alice out-fed everyone");
    assert_eq!(feeders[0].karma, 18 * 5);
    assert_eq!(feeders[1].karma, 3 + 10, "bob played and won a gamble");

    // 7. The audit trail saw every action.
    let events = engine.recent_events(CHAT, 50).expect("events");
    assert!(events.iter().any(|e| e.kind == EventKind::Evolution));
    assert!(events.iter().any(|e| e.kind == EventKind::GambleWin));
}

// ---------------------------------------------------------------------------
// Neglect: decay alone is lethal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn neglect_ends_in_death_and_revival_starts_over() {
    let world = world(DAY);
    let engine = &world.engine;
    let mourner = user(1, "mourner");

    engine.adopt(CHAT, Some("Tamago")).await.expect("adopt");

    // Nobody feeds it. Vitals bottom out after 20 ticks and the health
    // penalties grind it down from there.
    let mut death_notice = None;
    for _ in 0..30 {
        let outcomes = engine.run_tick_pass().await.expect("tick");
        if let Some(o) = outcomes
            .iter()
            .find(|o| matches!(o.notice, PassNotice::Died { .. }))
        {
            death_notice = Some(o.notice.clone());
            break;
        }
    }
    let Some(PassNotice::Died { name }) = death_notice else {
        panic!("thirty unfed ticks must kill an egg");
    };
    assert_eq!(name, "Tamago");

    // Dead pets refuse care.
    match engine.feed(CHAT, &mourner).await.expect("feed") {
        ActionOutcome::Refused(Rejection::Dead { name }) => assert_eq!(name, "Tamago"),
        other => panic!("expected a refusal, got {other:?}"),
    }

    // Revival keeps the name and resets everything else.
    match engine.revive_if_dead(CHAT).await.expect("revive") {
        ActionOutcome::Revived { pet } => {
            assert_eq!(pet.name, "Tamago");
            assert_eq!(pet.stage, Stage::Egg);
            assert_eq!(pet.vitals, Vitals::FULL);
            assert_eq!(pet.xp, 0);
        }
        other => panic!("expected a revival, got {other:?}"),
    }
    let events = engine.recent_events(CHAT, 10).expect("events");
    assert_eq!(events[0].kind, EventKind::Birth, "newest event first");
}

// ---------------------------------------------------------------------------
// Night: disturbances wound and eventually kill
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_night_disturbances_kill_the_pet() {
    let world = world(NIGHT);
    let engine = &world.engine;
    let menace = user(9, "menace");

    engine.adopt(CHAT, Some("Mochi")).await.expect("adopt");

    // Six pokes take health from 100 to 10; the pet hangs on.
    for _ in 0..6 {
        match engine.feed(CHAT, &menace).await.expect("feed") {
            ActionOutcome::Disturbed(d) => assert!(!d.fatal),
            other => panic!("night actions must disturb, got {other:?}"),
        }
    }

    // The seventh is one poke too many.
    match engine.feed(CHAT, &menace).await.expect("feed") {
        ActionOutcome::Disturbed(d) => {
            assert!(d.fatal);
            assert!(!d.pet.alive);
            assert_eq!(d.pet.vitals.health, 0);
        }
        other => panic!("expected the fatal disturbance, got {other:?}"),
    }

    let blame = engine
        .top_users(CHAT, UserStat::NightDisturbCount, 1)
        .expect("top");
    assert_eq!(blame[0].night_disturb_count, 7);

    let kinds: Vec<EventKind> = engine
        .recent_events(CHAT, 10)
        .expect("events")
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds[0], EventKind::Death);
    assert_eq!(kinds[1], EventKind::NightDisturb);
}

// ---------------------------------------------------------------------------
// Character: the chat's tone decides the teen type
// ---------------------------------------------------------------------------

#[tokio::test]
async fn a_wholesome_chat_raises_an_angel() {
    let world = world(DAY);
    let engine = &world.engine;
    let saint = user(3, "saint");

    engine.adopt(CHAT, Some("Halo")).await.expect("adopt");

    // A meme-rich, curse-free upbringing: 200 stickers and 100 feeds
    // (500 xp, enough to reach the teen threshold).
    for _ in 0..200 {
        engine
            .record_message(CHAT, &saint, MessagePayload::Sticker)
            .await
            .expect("sticker");
    }
    for _ in 0..100 {
        engine.feed(CHAT, &saint).await.expect("feed");
    }

    engine.run_tick_pass().await.expect("hatch");
    let outcomes = engine.run_tick_pass().await.expect("teen");
    assert!(
        outcomes
            .iter()
            .any(|o| matches!(o.notice, PassNotice::Evolved { .. })),
        "the second tick carries the teen evolution"
    );

    let status = engine.status(CHAT).expect("status").expect("snapshot");
    assert_eq!(status.stage, Stage::Teen);
    assert_eq!(
        status.pet_type,
        PetType::Angel,
        "no cursing and 200 counted behaviors"
    );
}

// ---------------------------------------------------------------------------
// Persistence: everything survives a restart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn state_survives_a_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("pets.db");
    let storage = StorageConfig::default();
    let keeper = user(5, "keeper");

    {
        let repo = SqliteRepository::open(&db_path, &storage).expect("open");
        let engine = Arc::new(PetEngine::new(
            Arc::new(repo),
            Arc::new(SequenceDice::default()),
            Arc::new(FixedClock::pinned(ts(DAY))),
            EngineConfig::default(),
        ));
        engine.adopt(CHAT, Some("Ferris")).await.expect("adopt");
        engine.feed(CHAT, &keeper).await.expect("feed");
        engine
            .record_message(
                CHAT,
                &keeper,
                MessagePayload::Text("FUCK THIS STUPID GAME".to_string()),
            )
            .await
            .expect("message");
    }

    let repo = SqliteRepository::open(&db_path, &storage).expect("reopen");
    let pet = repo.pet(CHAT).expect("fetch").expect("still there");
    assert_eq!(pet.name, "Ferris");
    assert_eq!(pet.xp, 6, "one feed and one message");
    assert_eq!(pet.counters.cursing, 1);
    assert_eq!(pet.counters.caps, 1);

    let engine = Arc::new(PetEngine::new(
        Arc::new(repo),
        Arc::new(SequenceDice::default()),
        Arc::new(FixedClock::pinned(ts(DAY))),
        EngineConfig::default(),
    ));
    let profile = &engine.top_users(CHAT, UserStat::Karma, 1).expect("top")[0];
    assert_eq!(profile.user, UserId(5));
    assert_eq!(profile.karma, 5);
    assert_eq!(profile.message_count, 1);
    let events = engine.recent_events(CHAT, 10).expect("events");
    assert!(events.iter().any(|e| e.kind == EventKind::Feed));
}
