//! Core type definitions for the chatling engine.
//!
//! Everything a pet owns lives here: identity newtypes, the vitals block,
//! growth stages, behavior counters, user profiles and audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for every vital. Vitals are integers clamped to
/// `[0, MAX_STAT]`; the lower bound is always zero.
pub const MAX_STAT: i32 = 100;

/// Display name given to a pet created without one.
pub const DEFAULT_PET_NAME: &str = "Chatling";

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Identifier of a group chat. The chat is the pet's owning scope: one pet
/// per chat, keyed by this id. Platform-assigned, may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Identifier of a chat member. Platform-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

// ---------------------------------------------------------------------------
// Growth Stages & Pet Types
// ---------------------------------------------------------------------------

/// Growth stage of a pet. Strictly ordered; a living pet only ever moves
/// forward along this order, and only revival resets it to [`Stage::Egg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Freshly created or revived.
    Egg,
    /// First hatch, reached at 100 XP.
    Baby,
    /// The type-deciding stage, reached at 500 XP.
    Teen,
    /// Reached at 1500 XP.
    Adult,
    /// Final stage, reached at 5000 XP.
    Ancient,
}

impl Stage {
    /// All stages in growth order.
    pub const ALL: [Self; 5] = [Self::Egg, Self::Baby, Self::Teen, Self::Adult, Self::Ancient];

    /// Stable storage code for this stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Egg => "EGG",
            Self::Baby => "BABY",
            Self::Teen => "TEEN",
            Self::Adult => "ADULT",
            Self::Ancient => "ANCIENT",
        }
    }

    /// Parse a storage code produced by [`Stage::as_str`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == code)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavioral archetype of a pet, decided exactly once at the TEEN
/// transition from the chat's accumulated behavior counters, then frozen
/// for the pet's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetType {
    /// Default archetype; also the type of every pet before TEEN.
    Normal,
    /// Heavy cursing chat.
    Goblin,
    /// Shouty and foul-mouthed chat.
    Troll,
    /// Meme-dominated chat.
    MemeCat,
    /// Code-dominated chat.
    CyberBot,
    /// Very active chat with zero cursing.
    Angel,
}

impl PetType {
    /// All pet types.
    pub const ALL: [Self; 6] = [
        Self::Normal,
        Self::Goblin,
        Self::Troll,
        Self::MemeCat,
        Self::CyberBot,
        Self::Angel,
    ];

    /// Stable storage code for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Goblin => "GOBLIN",
            Self::Troll => "TROLL",
            Self::MemeCat => "MEME_CAT",
            Self::CyberBot => "CYBER_BOT",
            Self::Angel => "ANGEL",
        }
    }

    /// Parse a storage code produced by [`PetType::as_str`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == code)
    }
}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Vitals
// ---------------------------------------------------------------------------

/// The four clamped vitals of a pet. Every value is always in
/// `[0, MAX_STAT]`; all writes go through the clamped-apply primitive in
/// [`crate::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    /// Satiety. Low hunger starves the pet.
    pub hunger: i32,
    /// Happiness.
    pub mood: i32,
    /// Stamina spent by playing, restored by sleep.
    pub energy: i32,
    /// Reaching zero kills the pet.
    pub health: i32,
}

impl Vitals {
    /// All vitals at full. The birth state.
    pub const FULL: Self = Self {
        hunger: MAX_STAT,
        mood: MAX_STAT,
        energy: MAX_STAT,
        health: MAX_STAT,
    };

    /// True if any vital sits below `threshold`.
    #[must_use]
    pub fn any_below(&self, threshold: i32) -> bool {
        self.hunger < threshold
            || self.mood < threshold
            || self.energy < threshold
            || self.health < threshold
    }

    /// True if every vital is in `[0, MAX_STAT]`.
    #[must_use]
    pub fn in_range(&self) -> bool {
        [self.hunger, self.mood, self.energy, self.health]
            .into_iter()
            .all(|v| (0..=MAX_STAT).contains(&v))
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::FULL
    }
}

/// A signed change to any subset of the four vitals. Zero fields leave the
/// corresponding vital untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VitalDelta {
    /// Change to hunger.
    pub hunger: i32,
    /// Change to mood.
    pub mood: i32,
    /// Change to energy.
    pub energy: i32,
    /// Change to health.
    pub health: i32,
}

impl VitalDelta {
    /// The no-op delta.
    pub const ZERO: Self = Self {
        hunger: 0,
        mood: 0,
        energy: 0,
        health: 0,
    };

    /// A delta that saturates every vital to [`MAX_STAT`] once clamped.
    pub const HEAL_ALL: Self = Self {
        hunger: MAX_STAT,
        mood: MAX_STAT,
        energy: MAX_STAT,
        health: MAX_STAT,
    };

    /// True if applying this delta cannot change anything.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

// ---------------------------------------------------------------------------
// Behavior Counters
// ---------------------------------------------------------------------------

/// The chat behaviors the engine counts towards type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorCounter {
    /// Messages containing profanity.
    Cursing,
    /// Stickers and meme-looking photos.
    Meme,
    /// Messages containing code.
    Code,
    /// Messages written mostly in capitals.
    Caps,
}

/// Accumulated behavior counts for one pet. Monotonically increasing while
/// the pet lives; reset to zero on revival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviorCounters {
    /// Profanity sightings.
    pub cursing: u32,
    /// Meme sightings.
    pub meme: u32,
    /// Code sightings.
    pub code: u32,
    /// All-caps sightings.
    pub caps: u32,
}

impl BehaviorCounters {
    /// Read one counter.
    #[must_use]
    pub fn get(&self, counter: BehaviorCounter) -> u32 {
        match counter {
            BehaviorCounter::Cursing => self.cursing,
            BehaviorCounter::Meme => self.meme,
            BehaviorCounter::Code => self.code,
            BehaviorCounter::Caps => self.caps,
        }
    }

    /// Increment one counter by one.
    pub fn bump(&mut self, counter: BehaviorCounter) {
        let slot = match counter {
            BehaviorCounter::Cursing => &mut self.cursing,
            BehaviorCounter::Meme => &mut self.meme,
            BehaviorCounter::Code => &mut self.code,
            BehaviorCounter::Caps => &mut self.caps,
        };
        *slot = slot.saturating_add(1);
    }

    /// Sum of all four counters.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.cursing + self.meme + self.code + self.caps
    }
}

// ---------------------------------------------------------------------------
// Pet
// ---------------------------------------------------------------------------

/// The per-chat virtual creature. Sole mutable root for vitals, stage,
/// type and counters; users and audit events reference it by [`ChatId`]
/// but never mutate it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    /// Owning chat.
    pub chat: ChatId,
    /// Display name.
    pub name: String,
    /// The clamped vitals block.
    pub vitals: Vitals,
    /// Accumulated experience. Non-negative, never decreases while alive.
    pub xp: i64,
    /// Derived from xp as `floor(xp/100)+1`; never decreases.
    pub level: i32,
    /// False once health hit zero. Dead pets ignore all
    /// vital-affecting operations until revival.
    pub alive: bool,
    /// Cached night-window state; the wall clock is authoritative.
    pub sleeping: bool,
    /// Current growth stage.
    pub stage: Stage,
    /// Behavioral archetype, frozen at the TEEN transition.
    pub pet_type: PetType,
    /// Accumulated behavior counts.
    pub counters: BehaviorCounters,
    /// Birth (or latest revival) time.
    pub created_at: DateTime<Utc>,
    /// Last completed decay tick.
    pub last_tick: DateTime<Utc>,
    /// Last stat-touching interaction, if any.
    pub last_interaction: Option<DateTime<Utc>>,
    /// When the pet died, if it is dead.
    pub death_at: Option<DateTime<Utc>>,
}

impl Pet {
    /// A newborn pet with birth defaults: full vitals, zero progress,
    /// EGG/NORMAL, awake and alive.
    #[must_use]
    pub fn newborn(chat: ChatId, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            chat,
            name: name.to_string(),
            vitals: Vitals::FULL,
            xp: 0,
            level: 1,
            alive: true,
            sleeping: false,
            stage: Stage::Egg,
            pet_type: PetType::Normal,
            counters: BehaviorCounters::default(),
            created_at: now,
            last_tick: now,
            last_interaction: None,
            death_at: None,
        }
    }

    /// True if the pet is alive with health below `threshold`.
    #[must_use]
    pub fn is_critical(&self, threshold: i32) -> bool {
        self.alive && self.vitals.health < threshold
    }

    /// Whole days since birth (or latest revival).
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}

/// Plain-data status view of a pet, for the surrounding command layer to
/// format. No markup, no emoji.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetSnapshot {
    /// Owning chat.
    pub chat: ChatId,
    /// Display name.
    pub name: String,
    /// Current stage.
    pub stage: Stage,
    /// Current type.
    pub pet_type: PetType,
    /// Current level.
    pub level: i32,
    /// Accumulated experience.
    pub xp: i64,
    /// Experience still missing for the next stage, or `None` at ANCIENT.
    pub xp_to_next_stage: Option<i64>,
    /// The vitals block.
    pub vitals: Vitals,
    /// Lifecycle flag.
    pub alive: bool,
    /// Night-cycle flag.
    pub sleeping: bool,
    /// Whole days since birth or latest revival.
    pub age_days: i64,
    /// Accumulated behavior counts.
    pub counters: BehaviorCounters,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Identity and display metadata of an acting chat member, as supplied by
/// the transport layer with each command or message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Platform user id.
    pub id: UserId,
    /// Login-style handle, if the platform has one.
    pub username: Option<String>,
    /// Given name, if known.
    pub first_name: Option<String>,
}

impl UserRef {
    /// A bare reference with no display metadata.
    #[must_use]
    pub fn bare(id: UserId) -> Self {
        Self {
            id,
            username: None,
            first_name: None,
        }
    }

    /// Best available human-readable name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("user {}", self.id))
    }
}

/// Per-user interaction stats the engine accumulates. Keyed by chat id and
/// user id together; karma may go negative, every other counter only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStat {
    /// Reputation points earned and lost through actions.
    Karma,
    /// Successful feeds.
    FeedCount,
    /// Successful plays.
    PlayCount,
    /// Messages seen from this user.
    MessageCount,
    /// Times this user woke the sleeping pet.
    NightDisturbCount,
    /// Gambles won.
    GambleWins,
    /// Gambles lost.
    GambleLosses,
}

impl UserStat {
    /// All user stats.
    pub const ALL: [Self; 7] = [
        Self::Karma,
        Self::FeedCount,
        Self::PlayCount,
        Self::MessageCount,
        Self::NightDisturbCount,
        Self::GambleWins,
        Self::GambleLosses,
    ];

    /// Stable storage code (doubles as the SQL column name).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Karma => "karma",
            Self::FeedCount => "feed_count",
            Self::PlayCount => "play_count",
            Self::MessageCount => "message_count",
            Self::NightDisturbCount => "night_disturb_count",
            Self::GambleWins => "gamble_wins",
            Self::GambleLosses => "gamble_losses",
        }
    }
}

impl fmt::Display for UserStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat member's accumulated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning chat.
    pub chat: ChatId,
    /// Platform user id.
    pub user: UserId,
    /// Login-style handle, if known.
    pub username: Option<String>,
    /// Given name, if known.
    pub first_name: Option<String>,
    /// Reputation points. May go negative.
    pub karma: i64,
    /// Successful feeds.
    pub feed_count: u32,
    /// Successful plays.
    pub play_count: u32,
    /// Messages seen.
    pub message_count: u32,
    /// Night disturbances caused.
    pub night_disturb_count: u32,
    /// Gambles won.
    pub gamble_wins: u32,
    /// Gambles lost.
    pub gamble_losses: u32,
    /// First interaction time.
    pub first_seen: DateTime<Utc>,
    /// Latest interaction time.
    pub last_seen: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile for a first-time interactor.
    #[must_use]
    pub fn first_contact(chat: ChatId, user: &UserRef, now: DateTime<Utc>) -> Self {
        Self {
            chat,
            user: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            karma: 0,
            feed_count: 0,
            play_count: 0,
            message_count: 0,
            night_disturb_count: 0,
            gamble_wins: 0,
            gamble_losses: 0,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Read one stat as a signed value.
    #[must_use]
    pub fn stat(&self, stat: UserStat) -> i64 {
        match stat {
            UserStat::Karma => self.karma,
            UserStat::FeedCount => i64::from(self.feed_count),
            UserStat::PlayCount => i64::from(self.play_count),
            UserStat::MessageCount => i64::from(self.message_count),
            UserStat::NightDisturbCount => i64::from(self.night_disturb_count),
            UserStat::GambleWins => i64::from(self.gamble_wins),
            UserStat::GambleLosses => i64::from(self.gamble_losses),
        }
    }

    /// Best available human-readable name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("user {}", self.user))
    }
}

// ---------------------------------------------------------------------------
// Audit Events
// ---------------------------------------------------------------------------

/// Kind of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A pet was born or revived.
    Birth,
    /// A pet died.
    Death,
    /// A pet advanced a growth stage.
    Evolution,
    /// A user fed the pet.
    Feed,
    /// A user played with the pet.
    Play,
    /// A gamble paid out.
    GambleWin,
    /// A gamble was lost.
    GambleLoss,
    /// A world event fired.
    RandomEvent,
    /// Health dropped below the critical threshold.
    CriticalHealth,
    /// A user disturbed the sleeping pet.
    NightDisturb,
}

impl EventKind {
    /// All event kinds.
    pub const ALL: [Self; 10] = [
        Self::Birth,
        Self::Death,
        Self::Evolution,
        Self::Feed,
        Self::Play,
        Self::GambleWin,
        Self::GambleLoss,
        Self::RandomEvent,
        Self::CriticalHealth,
        Self::NightDisturb,
    ];

    /// Stable storage code for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Birth => "BIRTH",
            Self::Death => "DEATH",
            Self::Evolution => "EVOLUTION",
            Self::Feed => "FEED",
            Self::Play => "PLAY",
            Self::GambleWin => "GAMBLE_WIN",
            Self::GambleLoss => "GAMBLE_LOSS",
            Self::RandomEvent => "RANDOM_EVENT",
            Self::CriticalHealth => "CRITICAL_HEALTH",
            Self::NightDisturb => "NIGHT_DISTURB",
        }
    }

    /// Parse a storage code produced by [`EventKind::as_str`].
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == code)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit event about to be appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Owning chat.
    pub chat: ChatId,
    /// What happened.
    pub kind: EventKind,
    /// The acting user, when one triggered it.
    pub actor: Option<UserId>,
    /// Human-readable description.
    pub description: String,
}

impl NewEvent {
    /// Build an event record for `chat`.
    #[must_use]
    pub fn new(chat: ChatId, kind: EventKind, actor: Option<UserId>, description: impl Into<String>) -> Self {
        Self {
            chat,
            kind,
            actor,
            description: description.into(),
        }
    }
}

/// An appended, immutable audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Storage-assigned id, increasing with append order.
    pub id: i64,
    /// Owning chat.
    pub chat: ChatId,
    /// What happened.
    pub kind: EventKind,
    /// The acting user, when one triggered it.
    pub actor: Option<UserId>,
    /// Human-readable description.
    pub description: String,
    /// Append time.
    pub created_at: DateTime<Utc>,
}
