//! Storage ports for pets, users and audit events.
//!
//! The engine only ever talks to [`PetRepository`]; two adapters implement
//! it, an in-memory one for tests and small deployments and a SQLite one
//! for real persistence. Repository methods are synchronous, they are
//! called from async code but never block on anything slower than local
//! storage.
//!
//! Timestamps are always passed in by the caller so adapters stay
//! deterministic under a test clock.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    BehaviorCounter, ChatId, EventRecord, NewEvent, Pet, PetType, Stage, UserId, UserProfile,
    UserRef, UserStat, VitalDelta,
};

mod memory;
mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// Storage port for everything the engine persists.
///
/// Mutators that target a pet return the post-update [`Pet`] so callers
/// can chain decisions without a second read; they fail with
/// [`crate::EngineError::PetMissing`] when the chat has no pet yet.
pub trait PetRepository: Send + Sync {
    // ------------------------------------------------------------------
    // Pets
    // ------------------------------------------------------------------

    /// Fetch the pet of `chat`, if one was ever created.
    fn pet(&self, chat: ChatId) -> Result<Option<Pet>>;

    /// Create a pet with birth defaults. Returns the existing pet
    /// unchanged when the chat already has one.
    fn create_pet(&self, chat: ChatId, name: &str, now: DateTime<Utc>) -> Result<Pet>;

    /// Apply a clamped vitals change and stamp `last_interaction`.
    fn apply_vitals(&self, chat: ChatId, delta: VitalDelta, now: DateTime<Utc>) -> Result<Pet>;

    /// Grant experience and recompute the level, which never decreases.
    fn add_xp(&self, chat: ChatId, amount: i64) -> Result<Pet>;

    /// Mark the pet dead: `alive = false`, health zeroed, `death_at` set.
    fn mark_dead(&self, chat: ChatId, at: DateTime<Utc>) -> Result<Pet>;

    /// Reset the pet to birth defaults, keeping only its name.
    fn revive(&self, chat: ChatId, now: DateTime<Utc>) -> Result<Pet>;

    /// Advance the growth stage; `pet_type` is written only when `Some`.
    fn set_stage_and_type(
        &self,
        chat: ChatId,
        stage: Stage,
        pet_type: Option<PetType>,
    ) -> Result<Pet>;

    /// Increment one behavior counter by one.
    fn bump_behavior(&self, chat: ChatId, counter: BehaviorCounter) -> Result<()>;

    /// Overwrite the cached sleeping flag.
    fn set_sleeping(&self, chat: ChatId, sleeping: bool) -> Result<Pet>;

    /// Stamp `last_tick` after a completed decay tick.
    fn touch_last_tick(&self, chat: ChatId, at: DateTime<Utc>) -> Result<()>;

    /// All living pets, ordered by chat id.
    fn alive_pets(&self) -> Result<Vec<Pet>>;

    /// All living pets that are not sleeping, ordered by chat id.
    fn alive_awake_pets(&self) -> Result<Vec<Pet>>;

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Fetch or create the per-chat profile for `user`.
    ///
    /// An existing profile picks up fresher display metadata from the
    /// reference and gets its `last_seen` stamped.
    fn get_or_create_user(
        &self,
        chat: ChatId,
        user: &UserRef,
        now: DateTime<Utc>,
    ) -> Result<UserProfile>;

    /// Add `amount` to one user stat, creating a bare profile if the
    /// user was never seen. Only karma accepts negative amounts.
    fn bump_user_stat(
        &self,
        chat: ChatId,
        user: UserId,
        stat: UserStat,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Top `limit` users of `chat` by `stat`, descending.
    fn top_users(&self, chat: ChatId, stat: UserStat, limit: usize) -> Result<Vec<UserProfile>>;

    // ------------------------------------------------------------------
    // Audit events
    // ------------------------------------------------------------------

    /// Append an audit event and return it with its assigned id.
    fn append_event(&self, event: &NewEvent, at: DateTime<Utc>) -> Result<EventRecord>;

    /// The latest `limit` events of `chat`, newest first.
    fn recent_events(&self, chat: ChatId, limit: usize) -> Result<Vec<EventRecord>>;
}
