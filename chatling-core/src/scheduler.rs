//! Scheduled passes and the timer loop that drives them.
//!
//! Three repeating jobs share one engine: the decay tick (configurable
//! cadence), the world-event roll (fixed half hour) and the sleep recheck
//! (fixed hour). A pass fans its chats out over a bounded worker pool;
//! each chat runs under its own lock and a failing chat is logged and
//! skipped, never the whole pass.
//!
//! Passes return [`PassOutcome`]s instead of talking to the chat
//! directly. The [`Scheduler`] relays them to a [`Notifier`] under a
//! timeout; by then the state change is committed, so a lost notification
//! costs an announcement, not data.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::PetEngine;
use crate::error::Result;
use crate::events::{roll_world_event, WorldEffect, WorldEventKind};
use crate::evolution::evolution_step;
use crate::notify::{Notification, Notifier};
use crate::stats;
use crate::types::{ChatId, EventKind, NewEvent, Pet, Vitals, VitalDelta};

/// Fixed cadence of the world-event job.
pub const EVENT_PASS_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Fixed cadence of the sleep-recheck job.
pub const SLEEP_RECHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

// ---------------------------------------------------------------------------
// Pass outcomes
// ---------------------------------------------------------------------------

/// One chat-visible consequence of a pass, for the host to relay.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    /// The chat it concerns.
    pub chat: ChatId,
    /// What to tell that chat.
    pub notice: PassNotice,
}

/// What a pass wants a chat to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum PassNotice {
    /// The pet died of neglect.
    Died {
        /// Display name.
        name: String,
    },
    /// Health fell under the critical threshold. Fires on every tick
    /// spent below it.
    CriticalHealth {
        /// Display name.
        name: String,
        /// The vitals at alert time, so the warning can show numbers.
        vitals: Vitals,
    },
    /// The pet advanced a growth stage.
    Evolved {
        /// Ready-made announcement line.
        announcement: String,
    },
    /// A world event fired.
    WorldEvent {
        /// Which kind.
        kind: WorldEventKind,
        /// Ready-made description line.
        description: &'static str,
    },
}

impl PassNotice {
    /// The chat-facing line for this notice.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Died { name } => format!("{name} has died of neglect."),
            Self::CriticalHealth { name, vitals } => format!(
                "{name} is in critical condition! Health {}, hunger {}, mood {}, energy {}.",
                vitals.health, vitals.hunger, vitals.mood, vitals.energy
            ),
            Self::Evolved { announcement } => announcement.clone(),
            Self::WorldEvent { description, .. } => (*description).to_string(),
        }
    }
}

/// The repeating jobs, used for dispatch and log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKind {
    Tick,
    WorldEvent,
    SleepRecheck,
}

impl PassKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::WorldEvent => "world-event",
            Self::SleepRecheck => "sleep-recheck",
        }
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

impl PetEngine {
    /// One decay tick over every living pet.
    ///
    /// Per pet, in order: refresh the sleep flag from the clock (waking
    /// restores energy), drain hunger/mood/energy, charge the health
    /// penalty for anything that fell low, settle death, raise the
    /// critical alert, stamp the tick, and finally check evolution. A pet
    /// that dies is done for the pass: no tick stamp, no evolution.
    ///
    /// # Errors
    ///
    /// Fails only when the pet listing itself fails; per-chat failures
    /// are logged and skipped.
    pub async fn run_tick_pass(self: &Arc<Self>) -> Result<Vec<PassOutcome>> {
        self.run_pass(PassKind::Tick).await
    }

    /// One world-event roll over every living, awake pet.
    ///
    /// # Errors
    ///
    /// Fails only when the pet listing itself fails; per-chat failures
    /// are logged and skipped.
    pub async fn run_event_pass(self: &Arc<Self>) -> Result<Vec<PassOutcome>> {
        self.run_pass(PassKind::WorldEvent).await
    }

    /// Refresh the sleep flag of every living pet without decaying
    /// anything. Keeps the cached flag honest between ticks.
    ///
    /// # Errors
    ///
    /// Fails only when the pet listing itself fails; per-chat failures
    /// are logged and skipped.
    pub async fn run_sleep_recheck_pass(self: &Arc<Self>) -> Result<Vec<PassOutcome>> {
        self.run_pass(PassKind::SleepRecheck).await
    }

    async fn run_pass(self: &Arc<Self>, kind: PassKind) -> Result<Vec<PassOutcome>> {
        let pets = match kind {
            PassKind::WorldEvent => self.repo.alive_awake_pets()?,
            PassKind::Tick | PassKind::SleepRecheck => self.repo.alive_pets()?,
        };
        let total = pets.len();

        let semaphore = Arc::new(Semaphore::new(self.config.scheduler.worker_limit));
        let mut workers = JoinSet::new();
        for pet in pets {
            let engine = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return Vec::new();
                };
                let chat = pet.chat;
                let result = match kind {
                    PassKind::Tick => engine.tick_chat(chat).await,
                    PassKind::WorldEvent => engine.world_event_chat(chat).await,
                    PassKind::SleepRecheck => engine.sleep_recheck_chat(chat).await,
                };
                result.unwrap_or_else(|e| {
                    warn!(chat = %chat, pass = kind.as_str(), error = %e, "Chat skipped in pass");
                    Vec::new()
                })
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(mut batch) => outcomes.append(&mut batch),
                Err(e) => warn!(pass = kind.as_str(), error = %e, "Pass worker panicked"),
            }
        }
        debug!(
            pass = kind.as_str(),
            pets = total,
            notices = outcomes.len(),
            "Pass complete"
        );
        Ok(outcomes)
    }

    async fn tick_chat(&self, chat: ChatId) -> Result<Vec<PassOutcome>> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let Some(pet) = self.repo.pet(chat)? else {
            return Ok(Vec::new());
        };
        if !pet.alive {
            return Ok(Vec::new());
        }

        self.refresh_sleep(&pet, now)?;

        let pet = self
            .repo
            .apply_vitals(chat, stats::decay_delta(self.config.stats.decay_per_tick), now)?;
        let penalty = stats::health_penalty(&pet.vitals);
        let pet = if penalty > 0 {
            self.repo.apply_vitals(
                chat,
                VitalDelta { health: -penalty, ..VitalDelta::ZERO },
                now,
            )?
        } else {
            pet
        };

        if pet.vitals.health <= 0 {
            let pet = self.repo.mark_dead(chat, now)?;
            self.repo.append_event(
                &NewEvent::new(
                    chat,
                    EventKind::Death,
                    None,
                    format!("{} wasted away from neglect", pet.name),
                ),
                now,
            )?;
            info!(chat = %chat, name = %pet.name, "Pet died of neglect");
            return Ok(vec![PassOutcome {
                chat,
                notice: PassNotice::Died { name: pet.name },
            }]);
        }

        let mut outcomes = Vec::new();
        if pet.is_critical(self.config.stats.critical_health_threshold) {
            self.repo.append_event(
                &NewEvent::new(
                    chat,
                    EventKind::CriticalHealth,
                    None,
                    format!("{} is critically weak (health {})", pet.name, pet.vitals.health),
                ),
                now,
            )?;
            outcomes.push(PassOutcome {
                chat,
                notice: PassNotice::CriticalHealth {
                    name: pet.name.clone(),
                    vitals: pet.vitals,
                },
            });
        }

        self.repo.touch_last_tick(chat, now)?;

        if let Some(evolution) = evolution_step(&pet) {
            let pet = self
                .repo
                .set_stage_and_type(chat, evolution.to, evolution.assigned_type)?;
            self.repo.append_event(
                &NewEvent::new(chat, EventKind::Evolution, None, evolution.announcement.clone()),
                now,
            )?;
            info!(chat = %chat, stage = %pet.stage, pet_type = %pet.pet_type, "Pet evolved");
            outcomes.push(PassOutcome {
                chat,
                notice: PassNotice::Evolved {
                    announcement: evolution.announcement,
                },
            });
        }

        Ok(outcomes)
    }

    async fn world_event_chat(&self, chat: ChatId) -> Result<Vec<PassOutcome>> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let Some(pet) = self.repo.pet(chat)? else {
            return Ok(Vec::new());
        };
        if !pet.alive || self.asleep_at(now) {
            return Ok(Vec::new());
        }
        let Some(outcome) = roll_world_event(self.dice.as_ref()) else {
            return Ok(Vec::new());
        };

        match outcome.effect {
            WorldEffect::Vitals(delta) => {
                self.repo.apply_vitals(chat, delta, now)?;
            }
            WorldEffect::Xp(amount) => {
                self.repo.add_xp(chat, amount)?;
            }
        }
        self.repo.append_event(
            &NewEvent::new(
                chat,
                EventKind::RandomEvent,
                None,
                format!("{}: {}", outcome.kind, outcome.description),
            ),
            now,
        )?;
        debug!(chat = %chat, kind = %outcome.kind, "World event fired");
        Ok(vec![PassOutcome {
            chat,
            notice: PassNotice::WorldEvent {
                kind: outcome.kind,
                description: outcome.description,
            },
        }])
    }

    async fn sleep_recheck_chat(&self, chat: ChatId) -> Result<Vec<PassOutcome>> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let Some(pet) = self.repo.pet(chat)? else {
            return Ok(Vec::new());
        };
        if pet.alive {
            self.refresh_sleep(&pet, now)?;
        }
        Ok(Vec::new())
    }

    /// Bring the cached sleeping flag in line with the wall clock. A pet
    /// that wakes gets its night's rest back as energy.
    fn refresh_sleep(&self, pet: &Pet, now: DateTime<Utc>) -> Result<()> {
        let should_sleep = self.asleep_at(now);
        if should_sleep == pet.sleeping {
            return Ok(());
        }
        self.repo.set_sleeping(pet.chat, should_sleep)?;
        if should_sleep {
            debug!(chat = %pet.chat, "Pet fell asleep");
        } else {
            self.repo.apply_vitals(
                pet.chat,
                VitalDelta { energy: stats::WAKE_ENERGY_RESTORE, ..VitalDelta::ZERO },
                now,
            )?;
            debug!(chat = %pet.chat, "Pet woke up rested");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Timer loop
// ---------------------------------------------------------------------------

/// Drives the three repeating jobs over a shared engine and relays pass
/// outcomes to the notifier.
pub struct Scheduler {
    engine: Arc<PetEngine>,
    notifier: Arc<dyn Notifier>,
    shutdown: watch::Receiver<bool>,
}

/// Handle to a spawned scheduler. Dropping it without calling
/// [`SchedulerHandle::shutdown`] also stops the loop, after the pass in
/// flight.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the scheduler to stop after the in-flight pass and wait for it.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

impl Scheduler {
    /// Spawn the scheduler onto the current runtime. The first pass of
    /// each job runs one full period after startup, not immediately.
    #[must_use]
    pub fn spawn(engine: Arc<PetEngine>, notifier: Arc<dyn Notifier>) -> SchedulerHandle {
        let (tx, rx) = watch::channel(false);
        let scheduler = Self {
            engine,
            notifier,
            shutdown: rx,
        };
        let task = tokio::spawn(scheduler.run());
        SchedulerHandle { shutdown: tx, task }
    }

    async fn run(mut self) {
        let tick_minutes = self.engine.config().scheduler.tick_interval_minutes;
        let mut ticks = pass_timer(Duration::from_secs(tick_minutes * 60));
        let mut events = pass_timer(EVENT_PASS_INTERVAL);
        let mut sleep_rechecks = pass_timer(SLEEP_RECHECK_INTERVAL);
        info!(tick_minutes, "Scheduler started");

        loop {
            tokio::select! {
                _ = ticks.tick() => self.round(PassKind::Tick).await,
                _ = events.tick() => self.round(PassKind::WorldEvent).await,
                _ = sleep_rechecks.tick() => self.round(PassKind::SleepRecheck).await,
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Scheduler stopped");
    }

    async fn round(&self, kind: PassKind) {
        match self.engine.run_pass(kind).await {
            Ok(outcomes) => {
                dispatch(
                    self.notifier.as_ref(),
                    self.engine.config().scheduler.notify_timeout_ms,
                    outcomes,
                )
                .await;
            }
            Err(e) => warn!(pass = kind.as_str(), error = %e, "Pass failed"),
        }
    }
}

/// A repeating timer that waits one full period before its first fire and
/// never bursts to catch up after a stall.
fn pass_timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Relay pass outcomes to the notifier. The state changes behind them are
/// already committed, so failures and timeouts are logged and dropped.
async fn dispatch(notifier: &dyn Notifier, timeout_ms: u64, outcomes: Vec<PassOutcome>) {
    let limit = Duration::from_millis(timeout_ms);
    for outcome in outcomes {
        let notification = Notification::new(outcome.chat, outcome.notice.text());
        match tokio::time::timeout(limit, notifier.notify(notification)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(chat = %outcome.chat, error = %e, "Notification failed");
            }
            Err(_) => {
                warn!(chat = %outcome.chat, waited_ms = timeout_ms, "Notification timed out");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::config::EngineConfig;
    use crate::error::EngineError;
    use crate::notify::ChannelNotifier;
    use crate::repo::{MemoryRepository, PetRepository};
    use crate::rng::SequenceDice;
    use crate::types::{
        BehaviorCounter, EventRecord, PetType, Stage, UserId, UserProfile, UserRef, UserStat,
    };
    use async_trait::async_trait;

    const DAY: &str = "2024-06-01T12:00:00Z";
    const LATER: &str = "2024-06-01T13:00:00Z";
    const NIGHT: &str = "2024-06-01T03:00:00Z";
    const CHAT: ChatId = ChatId(7);

    fn ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    struct Rig {
        repo: Arc<MemoryRepository>,
        clock: Arc<FixedClock>,
        engine: Arc<PetEngine>,
    }

    fn rig_at(at: &str, dice: SequenceDice) -> Rig {
        let repo = Arc::new(MemoryRepository::new());
        let clock = Arc::new(FixedClock::pinned(ts(at)));
        let engine = Arc::new(PetEngine::new(
            Arc::clone(&repo) as Arc<dyn PetRepository>,
            Arc::new(dice),
            Arc::clone(&clock) as Arc<dyn Clock>,
            EngineConfig::default(),
        ));
        Rig { repo, clock, engine }
    }

    fn rig(at: &str) -> Rig {
        rig_at(at, SequenceDice::default())
    }

    fn pet_of(rig: &Rig, chat: ChatId) -> Pet {
        rig.repo.pet(chat).expect("fetch").expect("pet")
    }

    fn event_kinds(rig: &Rig, chat: ChatId) -> Vec<EventKind> {
        rig.repo
            .recent_events(chat, 20)
            .expect("events")
            .into_iter()
            .map(|e: EventRecord| e.kind)
            .collect()
    }

    #[tokio::test]
    async fn tick_decays_every_living_pet() {
        let rig = rig(DAY);
        for id in [1, 2] {
            rig.repo
                .create_pet(ChatId(id), "Pet", ts(DAY))
                .expect("create");
        }
        rig.clock.set(ts(LATER));

        let outcomes = rig.engine.run_tick_pass().await.expect("pass");
        assert!(outcomes.is_empty(), "healthy pets make no noise");
        for id in [1, 2] {
            let pet = pet_of(&rig, ChatId(id));
            assert_eq!(pet.vitals.hunger, 95);
            assert_eq!(pet.vitals.mood, 95);
            assert_eq!(pet.vitals.energy, 95);
            assert_eq!(pet.vitals.health, 100);
            assert_eq!(pet.last_tick, ts(LATER), "completed ticks are stamped");
        }
    }

    #[tokio::test]
    async fn starvation_kills_and_ends_the_pets_pass() {
        let rig = rig(DAY);
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        rig.repo
            .apply_vitals(
                CHAT,
                VitalDelta { hunger: -100, mood: -100, energy: -100, health: -85 },
                ts(DAY),
            )
            .expect("setup");
        rig.repo.add_xp(CHAT, 150).expect("xp");
        rig.clock.set(ts(LATER));

        let outcomes = rig.engine.run_tick_pass().await.expect("pass");
        assert_eq!(
            outcomes,
            vec![PassOutcome {
                chat: CHAT,
                notice: PassNotice::Died { name: "Gizmo".to_string() },
            }]
        );

        let pet = pet_of(&rig, CHAT);
        assert!(!pet.alive);
        assert_eq!(pet.death_at, Some(ts(LATER)));
        assert_eq!(pet.stage, Stage::Egg, "the dead do not evolve");
        assert_eq!(pet.last_tick, ts(DAY), "death cuts the pass short");
        assert_eq!(event_kinds(&rig, CHAT), vec![EventKind::Death]);
    }

    #[tokio::test]
    async fn critical_alert_repeats_while_health_stays_low() {
        let rig = rig(DAY);
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        // Mood at zero costs 5 health per tick; start at 14 so the pet
        // lingers under the threshold instead of dying outright.
        rig.repo
            .apply_vitals(
                CHAT,
                VitalDelta { hunger: 0, mood: -100, energy: 0, health: -86 },
                ts(DAY),
            )
            .expect("setup");

        let first = rig.engine.run_tick_pass().await.expect("pass");
        assert!(matches!(
            first.as_slice(),
            [PassOutcome { notice: PassNotice::CriticalHealth { .. }, .. }]
        ));
        assert_eq!(pet_of(&rig, CHAT).vitals.health, 9);

        let second = rig.engine.run_tick_pass().await.expect("pass");
        assert!(
            matches!(
                second.as_slice(),
                [PassOutcome { notice: PassNotice::CriticalHealth { .. }, .. }]
            ),
            "the alert fires again every tick below the threshold"
        );
        let pet = pet_of(&rig, CHAT);
        assert_eq!(pet.vitals.health, 4);
        assert!(pet.alive);
        assert_eq!(
            event_kinds(&rig, CHAT),
            vec![EventKind::CriticalHealth, EventKind::CriticalHealth]
        );
    }

    #[tokio::test]
    async fn waking_up_restores_energy_before_decay() {
        let rig = rig(DAY);
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        rig.repo.set_sleeping(CHAT, true).expect("setup");
        rig.repo
            .apply_vitals(
                CHAT,
                VitalDelta { hunger: 0, mood: 0, energy: -60, health: 0 },
                ts(DAY),
            )
            .expect("setup");

        rig.engine.run_tick_pass().await.expect("pass");
        let pet = pet_of(&rig, CHAT);
        assert!(!pet.sleeping, "noon is past the night window");
        assert_eq!(pet.vitals.energy, 85, "40 + 50 rest, then -5 decay");
    }

    #[tokio::test]
    async fn sleeping_pets_still_decay() {
        let rig = rig(NIGHT);
        rig.repo.create_pet(CHAT, "Gizmo", ts(NIGHT)).expect("create");

        rig.engine.run_tick_pass().await.expect("pass");
        let pet = pet_of(&rig, CHAT);
        assert!(pet.sleeping, "3am falls inside the default window");
        assert_eq!(pet.vitals.energy, 95, "falling asleep restores nothing");
        assert_eq!(pet.vitals.hunger, 95);
    }

    #[tokio::test]
    async fn evolution_advances_one_stage_per_tick() {
        let rig = rig(DAY);
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        rig.repo.add_xp(CHAT, 600).expect("xp");

        let outcomes = rig.engine.run_tick_pass().await.expect("pass");
        assert!(matches!(
            outcomes.as_slice(),
            [PassOutcome { notice: PassNotice::Evolved { .. }, .. }]
        ));
        assert_eq!(pet_of(&rig, CHAT).stage, Stage::Baby, "one stage per pass");

        rig.engine.run_tick_pass().await.expect("pass");
        assert_eq!(pet_of(&rig, CHAT).stage, Stage::Teen);
    }

    #[tokio::test]
    async fn teen_evolution_locks_in_the_chat_type() {
        let rig = rig(DAY);
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        rig.repo.add_xp(CHAT, 500).expect("xp");
        for _ in 0..50 {
            rig.repo
                .bump_behavior(CHAT, BehaviorCounter::Cursing)
                .expect("bump");
        }

        rig.engine.run_tick_pass().await.expect("pass"); // Egg -> Baby
        let outcomes = rig.engine.run_tick_pass().await.expect("pass"); // Baby -> Teen
        let [PassOutcome { notice: PassNotice::Evolved { announcement }, .. }] =
            outcomes.as_slice()
        else {
            panic!("expected an evolution notice, got {outcomes:?}");
        };
        assert!(announcement.contains("goblin"), "got: {announcement}");

        let pet = pet_of(&rig, CHAT);
        assert_eq!(pet.stage, Stage::Teen);
        assert_eq!(pet.pet_type, PetType::Goblin);
    }

    #[tokio::test]
    async fn world_events_follow_the_scripted_dice() {
        let rig = rig_at(DAY, SequenceDice::scripted([0.29, 0.19], [0, 0]));
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        rig.repo
            .apply_vitals(
                CHAT,
                VitalDelta { hunger: -60, mood: 0, energy: 0, health: 0 },
                ts(DAY),
            )
            .expect("setup");

        let outcomes = rig.engine.run_event_pass().await.expect("pass");
        let [PassOutcome { chat, notice: PassNotice::WorldEvent { kind, description } }] =
            outcomes.as_slice()
        else {
            panic!("expected a world event, got {outcomes:?}");
        };
        assert_eq!(*chat, CHAT);
        assert_eq!(*kind, WorldEventKind::FoundBox);
        assert!(description.contains("full of food"), "got: {description}");
        assert_eq!(pet_of(&rig, CHAT).vitals.hunger, 90);
        assert_eq!(event_kinds(&rig, CHAT), vec![EventKind::RandomEvent]);
    }

    #[tokio::test]
    async fn world_events_can_grant_experience() {
        let rig = rig_at(DAY, SequenceDice::scripted([0.29, 0.19], [0, 4]));
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");

        rig.engine.run_event_pass().await.expect("pass");
        let pet = pet_of(&rig, CHAT);
        assert_eq!(pet.xp, 50, "the textbook grants xp, not vitals");
        assert_eq!(pet.vitals, Vitals::FULL);
    }

    #[tokio::test]
    async fn night_shields_pets_from_world_events() {
        let rig = rig_at(NIGHT, SequenceDice::scripted([0.0, 0.0], [0, 0]));
        rig.repo.create_pet(CHAT, "Gizmo", ts(NIGHT)).expect("create");

        let outcomes = rig.engine.run_event_pass().await.expect("pass");
        assert!(outcomes.is_empty(), "the clock decides, not the stale flag");
        assert_eq!(event_kinds(&rig, CHAT), vec![]);
    }

    #[tokio::test]
    async fn sleep_recheck_touches_only_the_flag() {
        let rig = rig(NIGHT);
        rig.repo.create_pet(CHAT, "Gizmo", ts(NIGHT)).expect("create");

        let outcomes = rig.engine.run_sleep_recheck_pass().await.expect("pass");
        assert!(outcomes.is_empty());
        let pet = pet_of(&rig, CHAT);
        assert!(pet.sleeping);
        assert_eq!(pet.vitals, Vitals::FULL, "no decay here");
        assert_eq!(pet.last_tick, ts(NIGHT), "not a tick");
    }

    // ------------------------------------------------------------------
    // Failure isolation
    // ------------------------------------------------------------------

    /// Delegates to a real in-memory repository but fails every pet fetch
    /// for one chat.
    struct FlakyRepo {
        inner: MemoryRepository,
        poison: ChatId,
    }

    impl PetRepository for FlakyRepo {
        fn pet(&self, chat: ChatId) -> Result<Option<Pet>> {
            if chat == self.poison {
                return Err(EngineError::Config("injected failure".to_string()));
            }
            self.inner.pet(chat)
        }

        fn create_pet(&self, chat: ChatId, name: &str, now: DateTime<Utc>) -> Result<Pet> {
            self.inner.create_pet(chat, name, now)
        }

        fn apply_vitals(&self, chat: ChatId, delta: VitalDelta, now: DateTime<Utc>) -> Result<Pet> {
            self.inner.apply_vitals(chat, delta, now)
        }

        fn add_xp(&self, chat: ChatId, amount: i64) -> Result<Pet> {
            self.inner.add_xp(chat, amount)
        }

        fn mark_dead(&self, chat: ChatId, at: DateTime<Utc>) -> Result<Pet> {
            self.inner.mark_dead(chat, at)
        }

        fn revive(&self, chat: ChatId, now: DateTime<Utc>) -> Result<Pet> {
            self.inner.revive(chat, now)
        }

        fn set_stage_and_type(
            &self,
            chat: ChatId,
            stage: Stage,
            pet_type: Option<PetType>,
        ) -> Result<Pet> {
            self.inner.set_stage_and_type(chat, stage, pet_type)
        }

        fn bump_behavior(&self, chat: ChatId, counter: BehaviorCounter) -> Result<()> {
            self.inner.bump_behavior(chat, counter)
        }

        fn set_sleeping(&self, chat: ChatId, sleeping: bool) -> Result<Pet> {
            self.inner.set_sleeping(chat, sleeping)
        }

        fn touch_last_tick(&self, chat: ChatId, at: DateTime<Utc>) -> Result<()> {
            self.inner.touch_last_tick(chat, at)
        }

        fn alive_pets(&self) -> Result<Vec<Pet>> {
            self.inner.alive_pets()
        }

        fn alive_awake_pets(&self) -> Result<Vec<Pet>> {
            self.inner.alive_awake_pets()
        }

        fn get_or_create_user(
            &self,
            chat: ChatId,
            user: &UserRef,
            now: DateTime<Utc>,
        ) -> Result<UserProfile> {
            self.inner.get_or_create_user(chat, user, now)
        }

        fn bump_user_stat(
            &self,
            chat: ChatId,
            user: UserId,
            stat: UserStat,
            amount: i64,
            now: DateTime<Utc>,
        ) -> Result<()> {
            self.inner.bump_user_stat(chat, user, stat, amount, now)
        }

        fn top_users(&self, chat: ChatId, stat: UserStat, limit: usize) -> Result<Vec<UserProfile>> {
            self.inner.top_users(chat, stat, limit)
        }

        fn append_event(&self, event: &NewEvent, at: DateTime<Utc>) -> Result<EventRecord> {
            self.inner.append_event(event, at)
        }

        fn recent_events(&self, chat: ChatId, limit: usize) -> Result<Vec<EventRecord>> {
            self.inner.recent_events(chat, limit)
        }
    }

    #[tokio::test]
    async fn one_failing_chat_does_not_stop_the_pass() {
        let repo = Arc::new(FlakyRepo {
            inner: MemoryRepository::new(),
            poison: ChatId(1),
        });
        let engine = Arc::new(PetEngine::new(
            Arc::clone(&repo) as Arc<dyn PetRepository>,
            Arc::new(SequenceDice::default()),
            Arc::new(FixedClock::pinned(ts(DAY))),
            EngineConfig::default(),
        ));
        repo.create_pet(ChatId(1), "Doomed", ts(DAY)).expect("create");
        repo.create_pet(ChatId(2), "Fine", ts(DAY)).expect("create");

        let outcomes = engine.run_tick_pass().await.expect("pass survives");
        assert!(outcomes.is_empty());

        let untouched = repo.inner.pet(ChatId(1)).expect("fetch").expect("pet");
        assert_eq!(untouched.vitals.hunger, 100, "the failing chat was skipped");
        let ticked = repo.inner.pet(ChatId(2)).expect("fetch").expect("pet");
        assert_eq!(ticked.vitals.hunger, 95, "the healthy chat still ticked");
    }

    // ------------------------------------------------------------------
    // Timer loop
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn scheduler_relays_death_notices() {
        let rig = rig(DAY);
        rig.repo.create_pet(CHAT, "Gizmo", ts(DAY)).expect("create");
        rig.repo
            .apply_vitals(
                CHAT,
                VitalDelta { hunger: -100, mood: -100, energy: -100, health: -85 },
                ts(DAY),
            )
            .expect("setup");

        let (notifier, mut rx) = ChannelNotifier::new(8);
        let handle = Scheduler::spawn(Arc::clone(&rig.engine), Arc::new(notifier));

        let notification = rx.recv().await.expect("a notice arrives");
        assert_eq!(notification.chat, CHAT);
        assert!(notification.text.contains("died"), "got: {}", notification.text);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_the_loop() {
        let rig = rig(DAY);
        let (notifier, _rx) = ChannelNotifier::new(1);
        let handle = Scheduler::spawn(Arc::clone(&rig.engine), Arc::new(notifier));
        handle.shutdown().await;
    }

    struct StallingNotifier;

    #[async_trait]
    impl Notifier for StallingNotifier {
        async fn notify(&self, _notification: Notification) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_notifiers_are_cut_off() {
        let outcomes = vec![PassOutcome {
            chat: ChatId(1),
            notice: PassNotice::Died { name: "Gizmo".to_string() },
        }];
        // Completes despite the notifier never answering.
        dispatch(&StallingNotifier, 50, outcomes).await;
    }
}
