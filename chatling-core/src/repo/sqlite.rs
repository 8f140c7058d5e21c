//! SQLite repository adapter.
//!
//! Pets, users and audit events live in three typed tables:
//!
//! ```sql
//! CREATE TABLE pets   (chat_id INTEGER PRIMARY KEY, ...);
//! CREATE TABLE users  (chat_id INTEGER, user_id INTEGER, ..., PRIMARY KEY (chat_id, user_id));
//! CREATE TABLE events (id INTEGER PRIMARY KEY AUTOINCREMENT, chat_id INTEGER, ...);
//! ```
//!
//! - WAL mode for concurrent reads while the scheduler writes
//! - enum columns store the stable string codes from `types`
//! - timestamps are RFC 3339 text, written and read in UTC
//! - backup support via SQLite's online-backup API
//!
//! The connection sits behind a mutex; every method locks it for the
//! whole read-modify-write so single statements and RMW pairs are
//! equally atomic within the process.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, Row, params};
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{EngineError, Result};
use crate::stats::{apply_delta, level_for_xp};
use crate::types::{
    BehaviorCounter, BehaviorCounters, ChatId, EventKind, EventRecord, NewEvent, Pet, PetType,
    Stage, UserId, UserProfile, UserRef, UserStat, VitalDelta, Vitals,
};

use super::PetRepository;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS pets (
    chat_id          INTEGER PRIMARY KEY,
    name             TEXT NOT NULL,
    stage            TEXT NOT NULL,
    pet_type         TEXT NOT NULL,
    hunger           INTEGER NOT NULL,
    mood             INTEGER NOT NULL,
    energy           INTEGER NOT NULL,
    health           INTEGER NOT NULL,
    xp               INTEGER NOT NULL,
    level            INTEGER NOT NULL,
    alive            INTEGER NOT NULL,
    sleeping         INTEGER NOT NULL,
    cursing_count    INTEGER NOT NULL,
    meme_count       INTEGER NOT NULL,
    code_count       INTEGER NOT NULL,
    caps_count       INTEGER NOT NULL,
    created_at       TEXT NOT NULL,
    last_tick        TEXT NOT NULL,
    last_interaction TEXT,
    death_at         TEXT
);

CREATE TABLE IF NOT EXISTS users (
    chat_id             INTEGER NOT NULL,
    user_id             INTEGER NOT NULL,
    username            TEXT,
    first_name          TEXT,
    karma               INTEGER NOT NULL DEFAULT 0,
    feed_count          INTEGER NOT NULL DEFAULT 0,
    play_count          INTEGER NOT NULL DEFAULT 0,
    message_count       INTEGER NOT NULL DEFAULT 0,
    night_disturb_count INTEGER NOT NULL DEFAULT 0,
    gamble_wins         INTEGER NOT NULL DEFAULT 0,
    gamble_losses       INTEGER NOT NULL DEFAULT 0,
    first_seen          TEXT NOT NULL,
    last_seen           TEXT NOT NULL,
    PRIMARY KEY (chat_id, user_id)
);

CREATE TABLE IF NOT EXISTS events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id     INTEGER NOT NULL,
    kind        TEXT NOT NULL,
    actor_id    INTEGER,
    description TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_chat_id ON events (chat_id, id);
";

const PET_COLUMNS: &str = "chat_id, name, stage, pet_type, hunger, mood, energy, health, \
     xp, level, alive, sleeping, cursing_count, meme_count, code_count, caps_count, \
     created_at, last_tick, last_interaction, death_at";

const USER_COLUMNS: &str = "chat_id, user_id, username, first_name, karma, feed_count, \
     play_count, message_count, night_disturb_count, gamble_wins, gamble_losses, \
     first_seen, last_seen";

// ---------------------------------------------------------------------------
// SqliteRepository
// ---------------------------------------------------------------------------

/// Repository adapter over a SQLite database file.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
    config: StorageConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRepository")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SqliteRepository {
    /// Open (or create) the database at `path` and ensure the schema.
    ///
    /// WAL mode is enabled when `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &StorageConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;

        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Pet repository opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &StorageConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    /// Copy the database to `dest_path` with SQLite's online-backup API.
    ///
    /// Safe to call while the database is in use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on SQLite failures, or
    /// [`EngineError::Io`] if the destination is not writable.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let conn = self.conn.lock();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&conn, &mut dest)?;

        // 256 pages per step, 50ms pause between steps.
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(dest = %dest_path.as_ref().display(), "Database backup completed");
        Ok(())
    }

    /// Create a numbered backup next to the database file, rotating old
    /// ones so at most `config.backup_count` are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] or [`EngineError::Io`] on failure.
    pub fn create_rotating_backup(&self) -> Result<()> {
        if self.db_path.as_os_str() == ":memory:" {
            return Ok(());
        }

        let max = self.config.backup_count;
        if max == 0 {
            return Ok(());
        }

        // Rotate existing backups, highest first so nothing is overwritten.
        for i in (1..max).rev() {
            let src = self.backup_path(i);
            let dst = self.backup_path(i + 1);
            if src.exists() {
                std::fs::rename(&src, &dst)?;
            }
        }

        let oldest = self.backup_path(max + 1);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }

        self.backup(self.backup_path(1))?;

        info!(max_backups = max, "Rotating backup created");
        Ok(())
    }

    /// Path to a numbered backup file (e.g. `pets.db.bak.1`).
    fn backup_path(&self, n: u32) -> PathBuf {
        let mut p = self.db_path.clone();
        let ext = format!(
            "{}.bak.{n}",
            p.extension()
                .map_or(String::new(), |e| e.to_string_lossy().into_owned())
        );
        p.set_extension(ext);
        p
    }

    /// Run SQLite's integrity check.
    ///
    /// Returns `Ok(true)` if the database passes, `Ok(false)` when
    /// corruption is detected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let conn = self.conn.lock();
        let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

// ---------------------------------------------------------------------------
// PetRepository impl
// ---------------------------------------------------------------------------

impl PetRepository for SqliteRepository {
    fn pet(&self, chat: ChatId) -> Result<Option<Pet>> {
        let conn = self.conn.lock();
        fetch_pet(&conn, chat)
    }

    fn create_pet(&self, chat: ChatId, name: &str, now: DateTime<Utc>) -> Result<Pet> {
        let conn = self.conn.lock();
        if let Some(existing) = fetch_pet(&conn, chat)? {
            return Ok(existing);
        }

        let pet = Pet::newborn(chat, name, now);
        let sql = format!(
            "INSERT INTO pets ({PET_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        );
        conn.prepare_cached(&sql)?.execute(params![
            pet.chat.0,
            pet.name,
            pet.stage.as_str(),
            pet.pet_type.as_str(),
            pet.vitals.hunger,
            pet.vitals.mood,
            pet.vitals.energy,
            pet.vitals.health,
            pet.xp,
            pet.level,
            pet.alive,
            pet.sleeping,
            pet.counters.cursing,
            pet.counters.meme,
            pet.counters.code,
            pet.counters.caps,
            pet.created_at.to_rfc3339(),
            pet.last_tick.to_rfc3339(),
            None::<String>,
            None::<String>,
        ])?;

        debug!(chat = %chat, name, "Pet created");
        Ok(pet)
    }

    fn apply_vitals(&self, chat: ChatId, delta: VitalDelta, now: DateTime<Utc>) -> Result<Pet> {
        let conn = self.conn.lock();
        let mut pet = require_pet(&conn, chat)?;
        pet.vitals = apply_delta(pet.vitals, delta);
        pet.last_interaction = Some(now);

        conn.prepare_cached(
            "UPDATE pets
             SET hunger = ?2, mood = ?3, energy = ?4, health = ?5, last_interaction = ?6
             WHERE chat_id = ?1",
        )?
        .execute(params![
            chat.0,
            pet.vitals.hunger,
            pet.vitals.mood,
            pet.vitals.energy,
            pet.vitals.health,
            now.to_rfc3339(),
        ])?;
        Ok(pet)
    }

    fn add_xp(&self, chat: ChatId, amount: i64) -> Result<Pet> {
        let conn = self.conn.lock();
        let mut pet = require_pet(&conn, chat)?;
        pet.xp += amount;
        let level = level_for_xp(pet.xp);
        if level > pet.level {
            pet.level = level;
        }

        conn.prepare_cached("UPDATE pets SET xp = ?2, level = ?3 WHERE chat_id = ?1")?
            .execute(params![chat.0, pet.xp, pet.level])?;
        Ok(pet)
    }

    fn mark_dead(&self, chat: ChatId, at: DateTime<Utc>) -> Result<Pet> {
        let conn = self.conn.lock();
        let mut pet = require_pet(&conn, chat)?;
        pet.alive = false;
        pet.vitals.health = 0;
        pet.death_at = Some(at);

        conn.prepare_cached(
            "UPDATE pets SET alive = 0, health = 0, death_at = ?2 WHERE chat_id = ?1",
        )?
        .execute(params![chat.0, at.to_rfc3339()])?;
        Ok(pet)
    }

    fn revive(&self, chat: ChatId, now: DateTime<Utc>) -> Result<Pet> {
        let conn = self.conn.lock();
        let old = require_pet(&conn, chat)?;
        let pet = Pet::newborn(chat, &old.name, now);

        conn.prepare_cached(
            "UPDATE pets
             SET stage = ?2, pet_type = ?3, hunger = ?4, mood = ?5, energy = ?6, health = ?7,
                 xp = ?8, level = ?9, alive = 1, sleeping = 0,
                 cursing_count = 0, meme_count = 0, code_count = 0, caps_count = 0,
                 created_at = ?10, last_tick = ?11, last_interaction = NULL, death_at = NULL
             WHERE chat_id = ?1",
        )?
        .execute(params![
            chat.0,
            pet.stage.as_str(),
            pet.pet_type.as_str(),
            pet.vitals.hunger,
            pet.vitals.mood,
            pet.vitals.energy,
            pet.vitals.health,
            pet.xp,
            pet.level,
            pet.created_at.to_rfc3339(),
            pet.last_tick.to_rfc3339(),
        ])?;
        Ok(pet)
    }

    fn set_stage_and_type(
        &self,
        chat: ChatId,
        stage: Stage,
        pet_type: Option<PetType>,
    ) -> Result<Pet> {
        let conn = self.conn.lock();
        let mut pet = require_pet(&conn, chat)?;
        pet.stage = stage;
        if let Some(assigned) = pet_type {
            pet.pet_type = assigned;
        }

        conn.prepare_cached("UPDATE pets SET stage = ?2, pet_type = ?3 WHERE chat_id = ?1")?
            .execute(params![chat.0, pet.stage.as_str(), pet.pet_type.as_str()])?;
        Ok(pet)
    }

    fn bump_behavior(&self, chat: ChatId, counter: BehaviorCounter) -> Result<()> {
        let column = behavior_column(counter);
        let conn = self.conn.lock();
        let sql = format!("UPDATE pets SET {column} = {column} + 1 WHERE chat_id = ?1");
        let changed = conn.prepare_cached(&sql)?.execute(params![chat.0])?;
        if changed == 0 {
            return Err(EngineError::PetMissing { chat });
        }
        Ok(())
    }

    fn set_sleeping(&self, chat: ChatId, sleeping: bool) -> Result<Pet> {
        let conn = self.conn.lock();
        let mut pet = require_pet(&conn, chat)?;
        pet.sleeping = sleeping;

        conn.prepare_cached("UPDATE pets SET sleeping = ?2 WHERE chat_id = ?1")?
            .execute(params![chat.0, sleeping])?;
        Ok(pet)
    }

    fn touch_last_tick(&self, chat: ChatId, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn
            .prepare_cached("UPDATE pets SET last_tick = ?2 WHERE chat_id = ?1")?
            .execute(params![chat.0, at.to_rfc3339()])?;
        if changed == 0 {
            return Err(EngineError::PetMissing { chat });
        }
        Ok(())
    }

    fn alive_pets(&self) -> Result<Vec<Pet>> {
        let conn = self.conn.lock();
        list_pets(&conn, "WHERE alive = 1")
    }

    fn alive_awake_pets(&self) -> Result<Vec<Pet>> {
        let conn = self.conn.lock();
        list_pets(&conn, "WHERE alive = 1 AND sleeping = 0")
    }

    fn get_or_create_user(
        &self,
        chat: ChatId,
        user: &UserRef,
        now: DateTime<Utc>,
    ) -> Result<UserProfile> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE chat_id = ?1 AND user_id = ?2");
        let existing = conn
            .prepare_cached(&sql)?
            .query_row(params![chat.0, user.id.0], user_from_row)
            .optional()?;

        match existing {
            None => {
                let profile = UserProfile::first_contact(chat, user, now);
                conn.prepare_cached(
                    "INSERT INTO users (chat_id, user_id, username, first_name, first_seen, last_seen)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?
                .execute(params![
                    chat.0,
                    user.id.0,
                    profile.username,
                    profile.first_name,
                    profile.first_seen.to_rfc3339(),
                    profile.last_seen.to_rfc3339(),
                ])?;
                debug!(chat = %chat, user = %user.id, "User first seen");
                Ok(profile)
            }
            Some(mut profile) => {
                if user.username.is_some() {
                    profile.username = user.username.clone();
                }
                if user.first_name.is_some() {
                    profile.first_name = user.first_name.clone();
                }
                profile.last_seen = now;

                conn.prepare_cached(
                    "UPDATE users SET username = ?3, first_name = ?4, last_seen = ?5
                     WHERE chat_id = ?1 AND user_id = ?2",
                )?
                .execute(params![
                    chat.0,
                    user.id.0,
                    profile.username,
                    profile.first_name,
                    profile.last_seen.to_rfc3339(),
                ])?;
                Ok(profile)
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
        let column = stat.as_str();
        let conn = self.conn.lock();
        let sql = format!(
            "UPDATE users SET {column} = {column} + ?3 WHERE chat_id = ?1 AND user_id = ?2"
        );

        let changed = conn
            .prepare_cached(&sql)?
            .execute(params![chat.0, user.0, amount])?;
        if changed == 0 {
            conn.prepare_cached(
                "INSERT INTO users (chat_id, user_id, first_seen, last_seen)
                 VALUES (?1, ?2, ?3, ?3)",
            )?
            .execute(params![chat.0, user.0, now.to_rfc3339()])?;
            conn.prepare_cached(&sql)?
                .execute(params![chat.0, user.0, amount])?;
        }
        Ok(())
    }

    fn top_users(&self, chat: ChatId, stat: UserStat, limit: usize) -> Result<Vec<UserProfile>> {
        let column = stat.as_str();
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE chat_id = ?1
             ORDER BY {column} DESC, user_id ASC LIMIT ?2"
        );

        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![chat.0, limit_param(limit)], user_from_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn append_event(&self, event: &NewEvent, at: DateTime<Utc>) -> Result<EventRecord> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO events (chat_id, kind, actor_id, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
            event.chat.0,
            event.kind.as_str(),
            event.actor.map(|u| u.0),
            event.description,
            at.to_rfc3339(),
        ])?;

        let id = conn.last_insert_rowid();
        debug!(chat = %event.chat, kind = %event.kind, id, "Audit event appended");
        Ok(EventRecord {
            id,
            chat: event.chat,
            kind: event.kind,
            actor: event.actor,
            description: event.description.clone(),
            created_at: at,
        })
    }

    fn recent_events(&self, chat: ChatId, limit: usize) -> Result<Vec<EventRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, chat_id, kind, actor_id, description, created_at
             FROM events WHERE chat_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![chat.0, limit_param(limit)], event_from_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn fetch_pet(conn: &Connection, chat: ChatId) -> Result<Option<Pet>> {
    let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE chat_id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row(params![chat.0], pet_from_row).optional()?)
}

fn require_pet(conn: &Connection, chat: ChatId) -> Result<Pet> {
    fetch_pet(conn, chat)?.ok_or(EngineError::PetMissing { chat })
}

fn list_pets(conn: &Connection, filter: &str) -> Result<Vec<Pet>> {
    let sql = format!("SELECT {PET_COLUMNS} FROM pets {filter} ORDER BY chat_id");
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map([], pet_from_row)?;

    let mut pets = Vec::new();
    for row in rows {
        pets.push(row?);
    }
    Ok(pets)
}

fn pet_from_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    let stage_code: String = row.get(2)?;
    let type_code: String = row.get(3)?;
    Ok(Pet {
        chat: ChatId(row.get(0)?),
        name: row.get(1)?,
        stage: decode(2, &stage_code, Stage::from_code, "stage")?,
        pet_type: decode(3, &type_code, PetType::from_code, "pet type")?,
        vitals: Vitals {
            hunger: row.get(4)?,
            mood: row.get(5)?,
            energy: row.get(6)?,
            health: row.get(7)?,
        },
        xp: row.get(8)?,
        level: row.get(9)?,
        alive: row.get(10)?,
        sleeping: row.get(11)?,
        counters: BehaviorCounters {
            cursing: row.get(12)?,
            meme: row.get(13)?,
            code: row.get(14)?,
            caps: row.get(15)?,
        },
        created_at: timestamp(row, 16)?,
        last_tick: timestamp(row, 17)?,
        last_interaction: opt_timestamp(row, 18)?,
        death_at: opt_timestamp(row, 19)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        chat: ChatId(row.get(0)?),
        user: UserId(row.get(1)?),
        username: row.get(2)?,
        first_name: row.get(3)?,
        karma: row.get(4)?,
        feed_count: row.get(5)?,
        play_count: row.get(6)?,
        message_count: row.get(7)?,
        night_disturb_count: row.get(8)?,
        gamble_wins: row.get(9)?,
        gamble_losses: row.get(10)?,
        first_seen: timestamp(row, 11)?,
        last_seen: timestamp(row, 12)?,
    })
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    let kind_code: String = row.get(2)?;
    Ok(EventRecord {
        id: row.get(0)?,
        chat: ChatId(row.get(1)?),
        kind: decode(2, &kind_code, EventKind::from_code, "event kind")?,
        actor: row.get::<_, Option<i64>>(3)?.map(UserId),
        description: row.get(4)?,
        created_at: timestamp(row, 5)?,
    })
}

fn decode<T>(
    idx: usize,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    what: &str,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unrecognised {what} code: {raw}").into(),
        )
    })
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_rfc3339(idx, &raw)
}

fn opt_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_rfc3339(idx, &s)).transpose()
}

fn parse_rfc3339(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn behavior_column(counter: BehaviorCounter) -> &'static str {
    match counter {
        BehaviorCounter::Cursing => "cursing_count",
        BehaviorCounter::Meme => "meme_count",
        BehaviorCounter::Code => "code_count",
        BehaviorCounter::Caps => "caps_count",
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Extension trait that adds an `.optional()` combinator to `rusqlite::Result`.
///
/// Converts `Err(QueryReturnedNoRows)` into `Ok(None)`.
trait OptionalExt<T> {
    /// Convert `QueryReturnedNoRows` into `Ok(None)`.
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
