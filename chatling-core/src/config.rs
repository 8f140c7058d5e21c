//! Configuration for the chatling engine.
//!
//! Loadable from TOML (nested sections) or from flat environment variables
//! (the deployment-friendly surface). Environment names match the
//! recognized options: `TICK_INTERVAL_MINUTES`, `CRITICAL_HEALTH_THRESHOLD`,
//! `NIGHT_START_HOUR`, `NIGHT_END_HOUR`, `XP_PER_MESSAGE`, `XP_PER_FEED`,
//! `XP_PER_GAME`, `STAT_DECAY_PER_TICK`, `MAX_STAT_VALUE`.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::MAX_STAT;

/// Top-level engine configuration, loadable from TOML or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Vital decay and health thresholds.
    #[serde(default)]
    pub stats: StatsConfig,
    /// Night window driving the sleep cycle.
    #[serde(default)]
    pub night: NightConfig,
    /// Experience rewards.
    #[serde(default)]
    pub xp: XpConfig,
    /// Pass cadence and dispatch limits.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// SQLite adapter knobs.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build a configuration from the process environment, starting from
    /// defaults and overriding each recognized option that is set.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if a set variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_env_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EngineConfig::from_env`], but reads variables through
    /// `lookup` so tests can supply their own environment.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if a present value does not parse.
    pub fn from_env_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        override_from(&lookup, "TICK_INTERVAL_MINUTES", &mut config.scheduler.tick_interval_minutes)?;
        override_from(&lookup, "CRITICAL_HEALTH_THRESHOLD", &mut config.stats.critical_health_threshold)?;
        override_from(&lookup, "NIGHT_START_HOUR", &mut config.night.start_hour)?;
        override_from(&lookup, "NIGHT_END_HOUR", &mut config.night.end_hour)?;
        override_from(&lookup, "XP_PER_MESSAGE", &mut config.xp.per_message)?;
        override_from(&lookup, "XP_PER_FEED", &mut config.xp.per_feed)?;
        override_from(&lookup, "XP_PER_GAME", &mut config.xp.per_game)?;
        override_from(&lookup, "STAT_DECAY_PER_TICK", &mut config.stats.decay_per_tick)?;
        override_from(&lookup, "MAX_STAT_VALUE", &mut config.stats.max_stat)?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] naming the offending option.
    pub fn validate(&self) -> Result<()> {
        if self.night.start_hour > 23 || self.night.end_hour > 23 {
            return Err(EngineError::Config(format!(
                "night hours must be 0-23 (got start={}, end={})",
                self.night.start_hour, self.night.end_hour
            )));
        }
        if self.scheduler.tick_interval_minutes == 0 {
            return Err(EngineError::Config(
                "tick interval must be at least one minute".to_string(),
            ));
        }
        if self.scheduler.worker_limit == 0 {
            return Err(EngineError::Config(
                "worker limit must be at least one".to_string(),
            ));
        }
        if self.stats.max_stat != MAX_STAT {
            return Err(EngineError::Config(format!(
                "max stat value is fixed at {MAX_STAT} (got {})",
                self.stats.max_stat
            )));
        }
        if self.stats.decay_per_tick < 0 {
            return Err(EngineError::Config(
                "stat decay per tick cannot be negative".to_string(),
            ));
        }
        if !(0..=MAX_STAT).contains(&self.stats.critical_health_threshold) {
            return Err(EngineError::Config(format!(
                "critical health threshold must be 0-{MAX_STAT} (got {})",
                self.stats.critical_health_threshold
            )));
        }
        if self.xp.per_message < 0 || self.xp.per_feed < 0 || self.xp.per_game < 0 {
            return Err(EngineError::Config(
                "xp rewards cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn override_from<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| EngineError::Config(format!("{key}={raw}: {e}")))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Vital decay and health thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// How much hunger/mood/energy drop per decay tick.
    #[serde(default = "default_decay")]
    pub decay_per_tick: i32,
    /// Health below this emits a critical alert.
    #[serde(default = "default_critical")]
    pub critical_health_threshold: i32,
    /// Upper bound for every vital. Fixed at 100; present so a deployment
    /// that sets it to anything else fails validation loudly.
    #[serde(default = "default_max_stat")]
    pub max_stat: i32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            decay_per_tick: 5,
            critical_health_threshold: 10,
            max_stat: MAX_STAT,
        }
    }
}

/// The night window `[start_hour, end_hour)` in wall-clock hours. The
/// window may wrap past midnight (start > end).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightConfig {
    /// Hour the pet falls asleep (0-23).
    #[serde(default)]
    pub start_hour: u32,
    /// Hour the pet wakes (0-23).
    #[serde(default = "default_night_end")]
    pub end_hour: u32,
}

impl Default for NightConfig {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 7,
        }
    }
}

/// Experience rewards per interaction kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpConfig {
    /// XP per organic chat message.
    #[serde(default = "default_xp_message")]
    pub per_message: i64,
    /// XP per successful feed.
    #[serde(default = "default_xp_feed")]
    pub per_feed: i64,
    /// XP per successful play.
    #[serde(default = "default_xp_game")]
    pub per_game: i64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            per_message: 1,
            per_feed: 5,
            per_game: 10,
        }
    }
}

/// Pass cadence and dispatch limits. Only the tick interval is a
/// recognized deployment option; the event and sleep-recheck cadences are
/// fixed by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Minutes between decay ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_minutes: u64,
    /// Max chats processed concurrently inside one pass.
    #[serde(default = "default_worker_limit")]
    pub worker_limit: usize,
    /// Milliseconds allowed per notifier dispatch before it is logged as a
    /// timeout and abandoned.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_minutes: 60,
            worker_limit: 8,
            notify_timeout_ms: 5000,
        }
    }
}

/// Knobs for the SQLite repository adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Whether to enable WAL journaling on open.
    #[serde(default = "default_wal")]
    pub wal_mode: bool,
    /// How many rotating backups to keep. Zero disables backups.
    #[serde(default = "default_backup_count")]
    pub backup_count: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            backup_count: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_decay() -> i32 { 5 }
fn default_critical() -> i32 { 10 }
fn default_max_stat() -> i32 { MAX_STAT }
fn default_night_end() -> u32 { 7 }
fn default_xp_message() -> i64 { 1 }
fn default_xp_feed() -> i64 { 5 }
fn default_xp_game() -> i64 { 10 }
fn default_tick_interval() -> u64 { 60 }
fn default_worker_limit() -> usize { 8 }
fn default_notify_timeout() -> u64 { 5000 }
fn default_wal() -> bool { true }
fn default_backup_count() -> u32 { 3 }
