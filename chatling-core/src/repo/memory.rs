//! In-memory repository adapter.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;

use crate::error::{EngineError, Result};
use crate::stats::{apply_delta, level_for_xp};
use crate::types::{
    BehaviorCounter, ChatId, EventRecord, NewEvent, Pet, PetType, Stage, UserId, UserProfile,
    UserRef, UserStat, VitalDelta,
};

use super::PetRepository;

/// Repository backed by process-local maps.
///
/// The default adapter for tests, and good enough for deployments that
/// accept losing pets on restart. Interior mutability throughout, so a
/// shared reference is all the engine needs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    pets: DashMap<ChatId, Pet>,
    users: DashMap<(ChatId, UserId), UserProfile>,
    events: Mutex<EventLog>,
}

#[derive(Debug, Default)]
struct EventLog {
    next_id: i64,
    entries: Vec<EventRecord>,
}

impl MemoryRepository {
    /// An empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update_pet<T>(&self, chat: ChatId, f: impl FnOnce(&mut Pet) -> T) -> Result<T> {
        let mut entry = self
            .pets
            .get_mut(&chat)
            .ok_or(EngineError::PetMissing { chat })?;
        Ok(f(entry.value_mut()))
    }

    fn collect_pets(&self, keep: impl Fn(&Pet) -> bool) -> Vec<Pet> {
        let mut pets: Vec<Pet> = self
            .pets
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        pets.sort_by_key(|pet| pet.chat);
        pets
    }
}

impl PetRepository for MemoryRepository {
    fn pet(&self, chat: ChatId) -> Result<Option<Pet>> {
        Ok(self.pets.get(&chat).map(|entry| entry.value().clone()))
    }

    fn create_pet(&self, chat: ChatId, name: &str, now: DateTime<Utc>) -> Result<Pet> {
        let entry = self
            .pets
            .entry(chat)
            .or_insert_with(|| Pet::newborn(chat, name, now));
        Ok(entry.value().clone())
    }

    fn apply_vitals(&self, chat: ChatId, delta: VitalDelta, now: DateTime<Utc>) -> Result<Pet> {
        self.update_pet(chat, |pet| {
            pet.vitals = apply_delta(pet.vitals, delta);
            pet.last_interaction = Some(now);
            pet.clone()
        })
    }

    fn add_xp(&self, chat: ChatId, amount: i64) -> Result<Pet> {
        self.update_pet(chat, |pet| {
            pet.xp += amount;
            let level = level_for_xp(pet.xp);
            if level > pet.level {
                pet.level = level;
            }
            pet.clone()
        })
    }

    fn mark_dead(&self, chat: ChatId, at: DateTime<Utc>) -> Result<Pet> {
        self.update_pet(chat, |pet| {
            pet.alive = false;
            pet.vitals.health = 0;
            pet.death_at = Some(at);
            pet.clone()
        })
    }

    fn revive(&self, chat: ChatId, now: DateTime<Utc>) -> Result<Pet> {
        self.update_pet(chat, |pet| {
            let name = pet.name.clone();
            *pet = Pet::newborn(chat, &name, now);
            pet.clone()
        })
    }

    fn set_stage_and_type(
        &self,
        chat: ChatId,
        stage: Stage,
        pet_type: Option<PetType>,
    ) -> Result<Pet> {
        self.update_pet(chat, |pet| {
            pet.stage = stage;
            if let Some(assigned) = pet_type {
                pet.pet_type = assigned;
            }
            pet.clone()
        })
    }

    fn bump_behavior(&self, chat: ChatId, counter: BehaviorCounter) -> Result<()> {
        self.update_pet(chat, |pet| pet.counters.bump(counter))
    }

    fn set_sleeping(&self, chat: ChatId, sleeping: bool) -> Result<Pet> {
        self.update_pet(chat, |pet| {
            pet.sleeping = sleeping;
            pet.clone()
        })
    }

    fn touch_last_tick(&self, chat: ChatId, at: DateTime<Utc>) -> Result<()> {
        self.update_pet(chat, |pet| pet.last_tick = at)
    }

    fn alive_pets(&self) -> Result<Vec<Pet>> {
        Ok(self.collect_pets(|pet| pet.alive))
    }

    fn alive_awake_pets(&self) -> Result<Vec<Pet>> {
        Ok(self.collect_pets(|pet| pet.alive && !pet.sleeping))
    }

    fn get_or_create_user(
        &self,
        chat: ChatId,
        user: &UserRef,
        now: DateTime<Utc>,
    ) -> Result<UserProfile> {
        match self.users.entry((chat, user.id)) {
            Entry::Occupied(mut occupied) => {
                let profile = occupied.get_mut();
                if user.username.is_some() {
                    profile.username = user.username.clone();
                }
                if user.first_name.is_some() {
                    profile.first_name = user.first_name.clone();
                }
                profile.last_seen = now;
                Ok(profile.clone())
            }
            Entry::Vacant(vacant) => {
                Ok(vacant.insert(UserProfile::first_contact(chat, user, now)).clone())
            }
        }
    }

    fn bump_user_stat(
        &self,
        chat: ChatId,
        user: UserId,
        stat: UserStat,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut entry = self
            .users
            .entry((chat, user))
            .or_insert_with(|| UserProfile::first_contact(chat, &UserRef::bare(user), now));
        apply_stat(entry.value_mut(), stat, amount);
        Ok(())
    }

    fn top_users(&self, chat: ChatId, stat: UserStat, limit: usize) -> Result<Vec<UserProfile>> {
        let mut users: Vec<UserProfile> = self
            .users
            .iter()
            .filter(|entry| entry.key().0 == chat)
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| {
            b.stat(stat)
                .cmp(&a.stat(stat))
                .then(a.user.0.cmp(&b.user.0))
        });
        users.truncate(limit);
        Ok(users)
    }

    fn append_event(&self, event: &NewEvent, at: DateTime<Utc>) -> Result<EventRecord> {
        let mut log = self.events.lock();
        log.next_id += 1;
        let record = EventRecord {
            id: log.next_id,
            chat: event.chat,
            kind: event.kind,
            actor: event.actor,
            description: event.description.clone(),
            created_at: at,
        };
        log.entries.push(record.clone());
        Ok(record)
    }

    fn recent_events(&self, chat: ChatId, limit: usize) -> Result<Vec<EventRecord>> {
        let log = self.events.lock();
        Ok(log
            .entries
            .iter()
            .rev()
            .filter(|record| record.chat == chat)
            .take(limit)
            .cloned()
            .collect())
    }
}

fn apply_stat(profile: &mut UserProfile, stat: UserStat, amount: i64) {
    match stat {
        UserStat::Karma => profile.karma += amount,
        UserStat::FeedCount => profile.feed_count = add_count(profile.feed_count, amount),
        UserStat::PlayCount => profile.play_count = add_count(profile.play_count, amount),
        UserStat::MessageCount => profile.message_count = add_count(profile.message_count, amount),
        UserStat::NightDisturbCount => {
            profile.night_disturb_count = add_count(profile.night_disturb_count, amount);
        }
        UserStat::GambleWins => profile.gamble_wins = add_count(profile.gamble_wins, amount),
        UserStat::GambleLosses => profile.gamble_losses = add_count(profile.gamble_losses, amount),
    }
}

/// Counters other than karma never go below zero.
fn add_count(current: u32, amount: i64) -> u32 {
    let next = i64::from(current).saturating_add(amount).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
