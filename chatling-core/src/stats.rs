//! Vital arithmetic: clamping, decay, starvation penalties, levels.
//!
//! The model:
//!   - every vital lives in `[0, MAX_STAT]`; all writes clamp, never reject
//!   - each decay tick drains hunger/mood/energy by a configured amount
//!   - after decay, health takes an additive penalty for every vital that
//!     fell below [`LOW_VITAL_THRESHOLD`]: hunger costs 10, mood 5, energy 5
//!   - health reaching 0 kills the pet
//!   - level is derived from xp as `floor(xp/100) + 1` and never decreases

use crate::types::{VitalDelta, Vitals, MAX_STAT};

/// Vitals below this value start hurting health on each tick.
pub const LOW_VITAL_THRESHOLD: i32 = 20;

/// Health penalty per tick while hunger is low.
pub const HUNGER_PENALTY: i32 = 10;

/// Health penalty per tick while mood is low.
pub const MOOD_PENALTY: i32 = 5;

/// Health penalty per tick while energy is low.
pub const ENERGY_PENALTY: i32 = 5;

/// Energy restored when the pet wakes from its night sleep.
pub const WAKE_ENERGY_RESTORE: i32 = 50;

/// XP needed per level.
pub const XP_PER_LEVEL: i64 = 100;

/// Clamp a raw vital value into `[0, MAX_STAT]`.
#[must_use]
pub fn clamp_stat(value: i32) -> i32 {
    value.clamp(0, MAX_STAT)
}

/// Apply a delta to every vital, clamping each result. The only way any
/// part of the engine mutates vitals.
#[must_use]
pub fn apply_delta(vitals: Vitals, delta: VitalDelta) -> Vitals {
    Vitals {
        hunger: clamp_stat(vitals.hunger + delta.hunger),
        mood: clamp_stat(vitals.mood + delta.mood),
        energy: clamp_stat(vitals.energy + delta.energy),
        health: clamp_stat(vitals.health + delta.health),
    }
}

/// The per-tick drain on hunger, mood and energy. Health is untouched
/// here; it only moves through the starvation penalty.
#[must_use]
pub fn decay_delta(amount: i32) -> VitalDelta {
    VitalDelta {
        hunger: -amount,
        mood: -amount,
        energy: -amount,
        health: 0,
    }
}

/// Health penalty for the given (post-decay) vitals. Penalties are
/// additive and independent: low hunger, low mood and low energy each
/// contribute on their own.
#[must_use]
pub fn health_penalty(vitals: &Vitals) -> i32 {
    let mut penalty = 0;
    if vitals.hunger < LOW_VITAL_THRESHOLD {
        penalty += HUNGER_PENALTY;
    }
    if vitals.mood < LOW_VITAL_THRESHOLD {
        penalty += MOOD_PENALTY;
    }
    if vitals.energy < LOW_VITAL_THRESHOLD {
        penalty += ENERGY_PENALTY;
    }
    penalty
}

/// Level implied by an xp total: `floor(xp/100) + 1`.
///
/// Callers must keep levels monotone: a stored level is only replaced when
/// the recomputed value is higher.
#[must_use]
pub fn level_for_xp(xp: i64) -> i32 {
    i32::try_from(xp / XP_PER_LEVEL).unwrap_or(i32::MAX - 1) + 1
}
