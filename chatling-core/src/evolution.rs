//! Growth stages and type selection.
//!
//! Everything here is pure and deterministic: stage advancement depends
//! only on accumulated xp, type selection only on the behavior counters.
//! The engine applies the returned decision and appends the audit event.

use crate::types::{BehaviorCounters, Pet, PetType, Stage};

/// Minimum cumulative xp required to occupy a stage.
#[must_use]
pub fn stage_threshold(stage: Stage) -> i64 {
    match stage {
        Stage::Egg => 0,
        Stage::Baby => 100,
        Stage::Teen => 500,
        Stage::Adult => 1500,
        Stage::Ancient => 5000,
    }
}

/// The immediate successor stage, or `None` at ANCIENT.
#[must_use]
pub fn next_stage(stage: Stage) -> Option<Stage> {
    match stage {
        Stage::Egg => Some(Stage::Baby),
        Stage::Baby => Some(Stage::Teen),
        Stage::Teen => Some(Stage::Adult),
        Stage::Adult => Some(Stage::Ancient),
        Stage::Ancient => None,
    }
}

/// Pick the type a pet locks in at the TEEN transition.
///
/// Evaluated in this exact priority order, first match wins; the order
/// resolves chats that qualify for several types, never the magnitudes:
/// 1. ANGEL — no cursing at all and at least 200 counted behaviors
/// 2. CYBER_BOT — 50+ code sightings
/// 3. MEME_CAT — 50+ meme sightings
/// 4. TROLL — 100+ caps and 30+ cursing
/// 5. GOBLIN — 50+ cursing
/// 6. NORMAL otherwise
#[must_use]
pub fn determine_type(counters: &BehaviorCounters) -> PetType {
    if counters.cursing == 0 && counters.total() >= 200 {
        PetType::Angel
    } else if counters.code >= 50 {
        PetType::CyberBot
    } else if counters.meme >= 50 {
        PetType::MemeCat
    } else if counters.caps >= 100 && counters.cursing >= 30 {
        PetType::Troll
    } else if counters.cursing >= 50 {
        PetType::Goblin
    } else {
        PetType::Normal
    }
}

/// A decided stage advancement, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evolution {
    /// Stage before the advancement.
    pub from: Stage,
    /// Stage after the advancement.
    pub to: Stage,
    /// The type locked in by this advancement; only ever `Some` when `to`
    /// is TEEN.
    pub assigned_type: Option<PetType>,
    /// Announcement line for the chat.
    pub announcement: String,
}

/// Decide whether `pet` advances a stage right now.
///
/// Dead pets never evolve. A pet advances at most one stage per call,
/// exactly when its xp has reached the next stage's threshold. The TEEN
/// advancement also decides the type from the counters accumulated so
/// far; later advancements leave the type untouched.
#[must_use]
pub fn evolution_step(pet: &Pet) -> Option<Evolution> {
    if !pet.alive {
        return None;
    }
    let to = next_stage(pet.stage)?;
    if pet.xp < stage_threshold(to) {
        return None;
    }

    let assigned_type = (to == Stage::Teen).then(|| determine_type(&pet.counters));
    let visible_type = assigned_type.unwrap_or(pet.pet_type);

    Some(Evolution {
        from: pet.stage,
        to,
        assigned_type,
        announcement: announcement(&pet.name, to, visible_type),
    })
}

/// Announcement line for an advancement into `to`.
fn announcement(name: &str, to: Stage, pet_type: PetType) -> String {
    match to {
        Stage::Egg => format!("{name} is still an egg."),
        Stage::Baby => format!("{name} hatched! A tiny creature crawls out of the egg."),
        Stage::Teen => format!(
            "{name} is growing up and has become a {}!",
            type_flavor(pet_type)
        ),
        Stage::Adult => format!("{name} is now fully grown."),
        Stage::Ancient => format!("{name} has seen it all. An ancient spirit of this chat."),
    }
}

/// Flavor phrase for a type, used in announcements.
fn type_flavor(pet_type: PetType) -> &'static str {
    match pet_type {
        PetType::Normal => "perfectly ordinary creature",
        PetType::Goblin => "foul-mouthed goblin",
        PetType::Troll => "loud, quarrelsome troll",
        PetType::MemeCat => "meme-obsessed cat",
        PetType::CyberBot => "code-crunching cyber bot",
        PetType::Angel => "pure-hearted angel",
    }
}
