//! The action engine: the surface the command and message layer talks to.
//!
//! One [`PetEngine`] serves every chat. Each mutation runs under that
//! chat's exclusive async lock, so a feed racing a scheduler tick for the
//! same pet serializes while unrelated chats proceed in parallel.
//!
//! Domain refusals (dead pet, too tired, too hungry) are ordinary
//! [`ActionOutcome`] variants, never errors; [`crate::error::EngineError`]
//! is reserved for infrastructure failures. Whether the pet is asleep is
//! decided from the wall clock at the moment of the action; the stored
//! `sleeping` flag is a cache that scheduler passes keep fresh.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::classify;
use crate::clock::{is_night_hour, Clock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::evolution::{next_stage, stage_threshold};
use crate::repo::PetRepository;
use crate::rng::Dice;
use crate::types::{
    BehaviorCounter, ChatId, EventKind, EventRecord, NewEvent, Pet, PetSnapshot, UserProfile,
    UserRef, UserStat, VitalDelta, DEFAULT_PET_NAME,
};

// ---------------------------------------------------------------------------
// Action tuning
// ---------------------------------------------------------------------------

/// Vitals granted by one feed.
pub const FEED_DELTA: VitalDelta = VitalDelta {
    hunger: 30,
    mood: 5,
    energy: 0,
    health: 0,
};

/// Karma awarded to the feeder.
pub const FEED_KARMA: i64 = 5;

/// Vitals shifted by one play session.
pub const PLAY_DELTA: VitalDelta = VitalDelta {
    hunger: -5,
    mood: 20,
    energy: -10,
    health: 0,
};

/// Energy required to play.
pub const PLAY_MIN_ENERGY: i32 = 20;

/// Karma awarded for playing.
pub const PLAY_KARMA: i64 = 3;

/// Hunger required to sit at the gambling table.
pub const GAMBLE_MIN_HUNGER: i32 = 30;

/// Probability that a gamble pays out.
pub const GAMBLE_WIN_ODDS: f64 = 0.5;

/// Payout of a won gamble.
pub const GAMBLE_WIN_DELTA: VitalDelta = VitalDelta {
    hunger: 50,
    mood: 0,
    energy: 0,
    health: 0,
};

/// Stake lost on a failed gamble.
pub const GAMBLE_LOSS_DELTA: VitalDelta = VitalDelta {
    hunger: -30,
    mood: 0,
    energy: 0,
    health: 0,
};

/// Karma for a won gamble.
pub const GAMBLE_WIN_KARMA: i64 = 10;

/// Karma for a lost gamble.
pub const GAMBLE_LOSS_KARMA: i64 = -5;

/// Penalty for interacting with the sleeping pet.
pub const DISTURB_DELTA: VitalDelta = VitalDelta {
    hunger: 0,
    mood: -20,
    energy: 0,
    health: -15,
};

/// Default entry count for leaderboards and event history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

// Organic message effects.
const MESSAGE_HUNGER: i32 = 1;
const STICKER_MOOD: i32 = 2;
const PHOTO_MOOD: i32 = 1;
const PROFANITY_MOOD: i32 = -2;
const CAPS_MOOD: i32 = -1;
/// Captions this long stop a photo from counting as a meme.
const MEME_CAPTION_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why an action was refused. Nothing changed when one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No pet exists for this chat yet.
    NoPet,
    /// The pet is dead and must be revived first.
    Dead {
        /// Name of the deceased.
        name: String,
    },
    /// Not enough energy to play.
    TooTired {
        /// Display name.
        name: String,
        /// Energy at the time of the attempt.
        energy: i32,
    },
    /// Not enough hunger margin to gamble.
    TooHungry {
        /// Display name.
        name: String,
        /// Hunger at the time of the attempt.
        hunger: i32,
    },
    /// Revival was requested but the pet is alive.
    StillAlive {
        /// Display name.
        name: String,
    },
}

impl Rejection {
    /// User-facing reason for the refusal.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::NoPet => "This chat has no pet yet.".to_string(),
            Self::Dead { name } => format!("{name} is dead. Revive it first."),
            Self::TooTired { name, energy } => {
                format!("{name} is too tired to play (energy {energy}).")
            }
            Self::TooHungry { name, hunger } => {
                format!("{name} is too hungry to gamble (hunger {hunger}).")
            }
            Self::StillAlive { name } => format!("{name} is alive and well."),
        }
    }
}

/// A landed night disturbance.
#[derive(Debug, Clone, PartialEq)]
pub struct Disturbance {
    /// Pet state after the penalty.
    pub pet: Pet,
    /// Whether the penalty killed the pet.
    pub fatal: bool,
}

impl Disturbance {
    /// User-facing description of the disturbance.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.fatal {
            format!(
                "{} was startled awake and did not survive the shock.",
                self.pet.name
            )
        } else {
            format!(
                "{} was disturbed mid-sleep! Health {}, mood {}.",
                self.pet.name, DISTURB_DELTA.health, DISTURB_DELTA.mood
            )
        }
    }
}

/// What came out of one user action. Success variants carry the applied
/// delta and the pet state after it.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The feed landed.
    Fed {
        /// Pet after the meal.
        pet: Pet,
        /// The applied vitals shift.
        delta: VitalDelta,
    },
    /// The play session landed.
    Played {
        /// Pet after the session.
        pet: Pet,
        /// The applied vitals shift.
        delta: VitalDelta,
    },
    /// The coin flip paid out.
    GambleWon {
        /// Pet after the payout.
        pet: Pet,
        /// The applied vitals shift.
        delta: VitalDelta,
    },
    /// The coin flip failed.
    GambleLost {
        /// Pet after the loss.
        pet: Pet,
        /// The applied vitals shift.
        delta: VitalDelta,
    },
    /// The pet was asleep; the attempted action became a disturbance and
    /// did not run.
    Disturbed(Disturbance),
    /// A dead pet was brought back as a fresh egg.
    Revived {
        /// The newborn replacement.
        pet: Pet,
    },
    /// A precondition failed and nothing changed.
    Refused(Rejection),
}

impl ActionOutcome {
    /// User-facing description of what happened.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Fed { pet, delta } => format!(
                "{} ate well. Hunger +{}, mood +{}.",
                pet.name, delta.hunger, delta.mood
            ),
            Self::Played { pet, .. } => format!("{} had a great time playing!", pet.name),
            Self::GambleWon { pet, delta } => {
                format!("{} won the gamble and feasts! Hunger +{}.", pet.name, delta.hunger)
            }
            Self::GambleLost { pet, delta } => {
                format!("{} lost the gamble. Hunger {}.", pet.name, delta.hunger)
            }
            Self::Disturbed(disturbance) => disturbance.describe(),
            Self::Revived { pet } => format!("A new egg appears. Welcome back, {}!", pet.name),
            Self::Refused(rejection) => rejection.reason(),
        }
    }
}

/// Payload of one organic chat message, as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    /// Plain text.
    Text(String),
    /// A sticker. Pure meme currency.
    Sticker,
    /// A photo with an optional caption.
    Photo {
        /// Caption text, if any.
        caption: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The shared engine over one repository, one dice source and one clock.
///
/// Cheap to share behind an [`Arc`]; every method takes `&self`.
pub struct PetEngine {
    pub(crate) repo: Arc<dyn PetRepository>,
    pub(crate) dice: Arc<dyn Dice>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: EngineConfig,
    chat_locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl fmt::Debug for PetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PetEngine")
            .field("config", &self.config)
            .field("chats_locked", &self.chat_locks.len())
            .finish_non_exhaustive()
    }
}

impl PetEngine {
    /// Build an engine over the given collaborators.
    #[must_use]
    pub fn new(
        repo: Arc<dyn PetRepository>,
        dice: Arc<dyn Dice>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repo,
            dice,
            clock,
            config,
            chat_locks: DashMap::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Exclusive guard serializing every mutation for one chat. Guards for
    /// different chats are independent.
    pub(crate) async fn lock_chat(&self, chat: ChatId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(&self.chat_locks.entry(chat).or_default());
        lock.lock_owned().await
    }

    /// Whether the pet is asleep at `now`. The wall clock is authoritative;
    /// the stored flag only caches this answer between passes.
    pub(crate) fn asleep_at(&self, now: DateTime<Utc>) -> bool {
        is_night_hour(now.hour(), &self.config.night)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create the chat's pet if none exists yet. Idempotent: an existing
    /// pet, alive or dead, is returned untouched. Creation is silent (no
    /// audit event); only revival announces a birth.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub async fn adopt(&self, chat: ChatId, name: Option<&str>) -> Result<Pet> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        self.repo
            .create_pet(chat, name.unwrap_or(DEFAULT_PET_NAME), now)
    }

    /// Replace a dead pet with a fresh egg and announce the birth.
    ///
    /// Refuses with [`Rejection::StillAlive`] when the pet is not dead,
    /// and with [`Rejection::NoPet`] when the chat never had one.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub async fn revive_if_dead(&self, chat: ChatId) -> Result<ActionOutcome> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let Some(pet) = self.repo.pet(chat)? else {
            return Ok(ActionOutcome::Refused(Rejection::NoPet));
        };
        if pet.alive {
            return Ok(ActionOutcome::Refused(Rejection::StillAlive { name: pet.name }));
        }

        let pet = self.repo.revive(chat, now)?;
        self.repo.append_event(
            &NewEvent::new(
                chat,
                EventKind::Birth,
                None,
                format!("{} is born anew. A new pet for the chat!", pet.name),
            ),
            now,
        )?;
        info!(chat = %chat, name = %pet.name, "Pet revived");
        Ok(ActionOutcome::Revived { pet })
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Feed the pet.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors; refusals come back as outcomes.
    pub async fn feed(&self, chat: ChatId, actor: &UserRef) -> Result<ActionOutcome> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let pet = match self.living_pet(chat)? {
            Ok(pet) => pet,
            Err(rejection) => return Ok(ActionOutcome::Refused(rejection)),
        };
        self.repo.get_or_create_user(chat, actor, now)?;
        if self.asleep_at(now) {
            return Ok(ActionOutcome::Disturbed(self.disturb(&pet, actor, now)?));
        }

        let pet = self.repo.apply_vitals(chat, FEED_DELTA, now)?;
        let pet = self.xp_reward(pet, self.config.xp.per_feed)?;
        self.repo
            .bump_user_stat(chat, actor.id, UserStat::FeedCount, 1, now)?;
        self.repo
            .bump_user_stat(chat, actor.id, UserStat::Karma, FEED_KARMA, now)?;
        self.repo.append_event(
            &NewEvent::new(
                chat,
                EventKind::Feed,
                Some(actor.id),
                format!("{} fed {}", actor.display_name(), pet.name),
            ),
            now,
        )?;
        debug!(chat = %chat, hunger = pet.vitals.hunger, "Pet fed");
        Ok(ActionOutcome::Fed { pet, delta: FEED_DELTA })
    }

    /// Play with the pet. Costs energy, lifts mood.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors; refusals come back as outcomes.
    pub async fn play(&self, chat: ChatId, actor: &UserRef) -> Result<ActionOutcome> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let pet = match self.living_pet(chat)? {
            Ok(pet) => pet,
            Err(rejection) => return Ok(ActionOutcome::Refused(rejection)),
        };
        self.repo.get_or_create_user(chat, actor, now)?;
        if self.asleep_at(now) {
            return Ok(ActionOutcome::Disturbed(self.disturb(&pet, actor, now)?));
        }
        if pet.vitals.energy < PLAY_MIN_ENERGY {
            return Ok(ActionOutcome::Refused(Rejection::TooTired {
                name: pet.name,
                energy: pet.vitals.energy,
            }));
        }

        let pet = self.repo.apply_vitals(chat, PLAY_DELTA, now)?;
        let pet = self.xp_reward(pet, self.config.xp.per_game)?;
        self.repo
            .bump_user_stat(chat, actor.id, UserStat::PlayCount, 1, now)?;
        self.repo
            .bump_user_stat(chat, actor.id, UserStat::Karma, PLAY_KARMA, now)?;
        self.repo.append_event(
            &NewEvent::new(
                chat,
                EventKind::Play,
                Some(actor.id),
                format!("{} played with {}", actor.display_name(), pet.name),
            ),
            now,
        )?;
        debug!(chat = %chat, mood = pet.vitals.mood, "Pet played with");
        Ok(ActionOutcome::Played { pet, delta: PLAY_DELTA })
    }

    /// Gamble the pet's food on a coin flip. No experience either way.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors; refusals come back as outcomes.
    pub async fn gamble(&self, chat: ChatId, actor: &UserRef) -> Result<ActionOutcome> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let pet = match self.living_pet(chat)? {
            Ok(pet) => pet,
            Err(rejection) => return Ok(ActionOutcome::Refused(rejection)),
        };
        self.repo.get_or_create_user(chat, actor, now)?;
        if self.asleep_at(now) {
            return Ok(ActionOutcome::Disturbed(self.disturb(&pet, actor, now)?));
        }
        if pet.vitals.hunger < GAMBLE_MIN_HUNGER {
            return Ok(ActionOutcome::Refused(Rejection::TooHungry {
                name: pet.name,
                hunger: pet.vitals.hunger,
            }));
        }

        if self.dice.roll() < GAMBLE_WIN_ODDS {
            let pet = self.repo.apply_vitals(chat, GAMBLE_WIN_DELTA, now)?;
            self.repo
                .bump_user_stat(chat, actor.id, UserStat::GambleWins, 1, now)?;
            self.repo
                .bump_user_stat(chat, actor.id, UserStat::Karma, GAMBLE_WIN_KARMA, now)?;
            self.repo.append_event(
                &NewEvent::new(
                    chat,
                    EventKind::GambleWin,
                    Some(actor.id),
                    format!("{} won a gamble for {}", actor.display_name(), pet.name),
                ),
                now,
            )?;
            debug!(chat = %chat, "Gamble won");
            Ok(ActionOutcome::GambleWon { pet, delta: GAMBLE_WIN_DELTA })
        } else {
            let pet = self.repo.apply_vitals(chat, GAMBLE_LOSS_DELTA, now)?;
            self.repo
                .bump_user_stat(chat, actor.id, UserStat::GambleLosses, 1, now)?;
            self.repo
                .bump_user_stat(chat, actor.id, UserStat::Karma, GAMBLE_LOSS_KARMA, now)?;
            self.repo.append_event(
                &NewEvent::new(
                    chat,
                    EventKind::GambleLoss,
                    Some(actor.id),
                    format!("{} lost a gamble for {}", actor.display_name(), pet.name),
                ),
                now,
            )?;
            debug!(chat = %chat, "Gamble lost");
            Ok(ActionOutcome::GambleLost { pet, delta: GAMBLE_LOSS_DELTA })
        }
    }

    /// Apply the disturbance penalty if the pet is asleep right now.
    ///
    /// For transport hooks outside feed/play/gamble (those intercept on
    /// their own). Returns `None` when there is nothing to intercept: no
    /// pet, a dead pet, or daytime.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub async fn check_night_disturbance(
        &self,
        chat: ChatId,
        actor: &UserRef,
    ) -> Result<Option<Disturbance>> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        let Some(pet) = self.repo.pet(chat)? else {
            return Ok(None);
        };
        if !pet.alive || !self.asleep_at(now) {
            return Ok(None);
        }
        self.repo.get_or_create_user(chat, actor, now)?;
        self.disturb(&pet, actor, now).map(Some)
    }

    // ------------------------------------------------------------------
    // Organic messages
    // ------------------------------------------------------------------

    /// Digest one organic chat message.
    ///
    /// Text feeds the message counter, a sliver of xp and hunger, and is
    /// classified for cursing, shouting and code. Stickers and (short- or
    /// un-captioned) photos count as memes. Skipped entirely when the chat
    /// has no living pet. Never announces anything; stage changes wait for
    /// the scheduler's tick.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub async fn record_message(
        &self,
        chat: ChatId,
        actor: &UserRef,
        payload: MessagePayload,
    ) -> Result<()> {
        let _guard = self.lock_chat(chat).await;
        let now = self.clock.now();
        match self.repo.pet(chat)? {
            Some(pet) if pet.alive => {}
            _ => return Ok(()),
        }
        self.repo.get_or_create_user(chat, actor, now)?;

        let mut delta = VitalDelta::ZERO;
        match payload {
            MessagePayload::Text(text) => {
                self.repo
                    .bump_user_stat(chat, actor.id, UserStat::MessageCount, 1, now)?;
                self.repo.add_xp(chat, self.config.xp.per_message)?;
                delta.hunger += MESSAGE_HUNGER;
                delta.mood += self.classify_text(chat, &text)?;
            }
            MessagePayload::Sticker => {
                self.repo.bump_behavior(chat, BehaviorCounter::Meme)?;
                delta.mood += STICKER_MOOD;
            }
            MessagePayload::Photo { caption } => {
                if let Some(caption) = caption.as_deref() {
                    self.classify_caption(chat, caption)?;
                }
                let meme_worthy = caption
                    .as_deref()
                    .is_none_or(|c| c.chars().count() < MEME_CAPTION_LIMIT);
                if meme_worthy {
                    self.repo.bump_behavior(chat, BehaviorCounter::Meme)?;
                    delta.mood += PHOTO_MOOD;
                }
            }
        }

        if !delta.is_zero() {
            self.repo.apply_vitals(chat, delta, now)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Plain-data status snapshot, or `None` when the chat has no pet.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub fn status(&self, chat: ChatId) -> Result<Option<PetSnapshot>> {
        let now = self.clock.now();
        let asleep = self.asleep_at(now);
        Ok(self.repo.pet(chat)?.map(|pet| PetSnapshot {
            chat: pet.chat,
            name: pet.name.clone(),
            stage: pet.stage,
            pet_type: pet.pet_type,
            level: pet.level,
            xp: pet.xp,
            xp_to_next_stage: next_stage(pet.stage)
                .map(|next| (stage_threshold(next) - pet.xp).max(0)),
            vitals: pet.vitals,
            alive: pet.alive,
            sleeping: pet.alive && asleep,
            age_days: pet.age_days(now),
            counters: pet.counters,
        }))
    }

    /// Top `limit` users of `chat` by `stat`, descending.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub fn top_users(&self, chat: ChatId, stat: UserStat, limit: usize) -> Result<Vec<UserProfile>> {
        self.repo.top_users(chat, stat, limit)
    }

    /// Latest `limit` audit events of `chat`, newest first.
    ///
    /// # Errors
    ///
    /// Fails only on repository errors.
    pub fn recent_events(&self, chat: ChatId, limit: usize) -> Result<Vec<EventRecord>> {
        self.repo.recent_events(chat, limit)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Fetch the pet and screen the preconditions every action shares.
    fn living_pet(&self, chat: ChatId) -> Result<std::result::Result<Pet, Rejection>> {
        let Some(pet) = self.repo.pet(chat)? else {
            return Ok(Err(Rejection::NoPet));
        };
        if !pet.alive {
            return Ok(Err(Rejection::Dead { name: pet.name }));
        }
        Ok(Ok(pet))
    }

    /// Grant xp and let the repository recompute the level.
    fn xp_reward(&self, pet: Pet, amount: i64) -> Result<Pet> {
        if amount == 0 {
            return Ok(pet);
        }
        self.repo.add_xp(pet.chat, amount)
    }

    /// The disturbance penalty: hit the vitals, charge the actor, and kill
    /// the pet if the hit lands on empty health. The intercepted action
    /// must not run after this.
    fn disturb(&self, pet: &Pet, actor: &UserRef, now: DateTime<Utc>) -> Result<Disturbance> {
        let chat = pet.chat;
        let pet = self.repo.apply_vitals(chat, DISTURB_DELTA, now)?;
        self.repo
            .bump_user_stat(chat, actor.id, UserStat::NightDisturbCount, 1, now)?;
        self.repo.append_event(
            &NewEvent::new(
                chat,
                EventKind::NightDisturb,
                Some(actor.id),
                format!("{} disturbed {}'s sleep", actor.display_name(), pet.name),
            ),
            now,
        )?;

        if pet.vitals.health > 0 {
            debug!(chat = %chat, health = pet.vitals.health, "Night disturbance");
            return Ok(Disturbance { pet, fatal: false });
        }

        let pet = self.repo.mark_dead(chat, now)?;
        self.repo.append_event(
            &NewEvent::new(
                chat,
                EventKind::Death,
                Some(actor.id),
                format!("{} did not survive the night disturbance", pet.name),
            ),
            now,
        )?;
        info!(chat = %chat, name = %pet.name, "Pet died from a night disturbance");
        Ok(Disturbance { pet, fatal: true })
    }

    /// Classify message text: bump the matching counters and return the
    /// accumulated mood shift. The checks are independent; one message can
    /// trip several.
    fn classify_text(&self, chat: ChatId, text: &str) -> Result<i32> {
        let mut mood = 0;
        if classify::contains_profanity(text) {
            self.repo.bump_behavior(chat, BehaviorCounter::Cursing)?;
            mood += PROFANITY_MOOD;
        }
        if classify::is_mostly_caps(text) {
            self.repo.bump_behavior(chat, BehaviorCounter::Caps)?;
            mood += CAPS_MOOD;
        }
        if classify::looks_like_code(text) {
            self.repo.bump_behavior(chat, BehaviorCounter::Code)?;
        }
        Ok(mood)
    }

    /// Photo captions feed the cursing and code counters but never move
    /// the mood.
    fn classify_caption(&self, chat: ChatId, caption: &str) -> Result<()> {
        if classify::contains_profanity(caption) {
            self.repo.bump_behavior(chat, BehaviorCounter::Cursing)?;
        }
        if classify::looks_like_code(caption) {
            self.repo.bump_behavior(chat, BehaviorCounter::Code)?;
        }
        Ok(())
    }
}
