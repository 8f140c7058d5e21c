//! Random world events.
//!
//! A two-stage roll decides whether anything happens: a global gate draw
//! must land under [`GLOBAL_EVENT_GATE`], then one of the three kinds is
//! picked uniformly and must pass its own independent probability. The
//! two draws are deliberately separate; the effective firing rate is the
//! product, lower than any single kind's nominal probability.
//!
//! Resolution is pure: [`roll_world_event`] only decides, the engine
//! applies the returned effect and writes the audit entry.

use crate::rng::Dice;
use crate::types::VitalDelta;

/// Global gate for the whole event subsystem, first of the two rolls.
pub const GLOBAL_EVENT_GATE: f64 = 0.30;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The closed set of world event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldEventKind {
    /// The pet finds a strange box with a surprise inside.
    FoundBox,
    /// Somebody drops by to visit the pet.
    Visitor,
    /// The weather turns.
    Weather,
}

impl WorldEventKind {
    /// All kinds, in the order the uniform pick indexes them.
    pub const ALL: [WorldEventKind; 3] = [
        WorldEventKind::FoundBox,
        WorldEventKind::Visitor,
        WorldEventKind::Weather,
    ];

    /// Per-kind trigger probability, checked by the second roll.
    #[must_use]
    pub fn probability(self) -> f64 {
        match self {
            WorldEventKind::FoundBox => 0.20,
            WorldEventKind::Visitor => 0.15,
            WorldEventKind::Weather => 0.25,
        }
    }

    /// Short display name for logs and event descriptions.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WorldEventKind::FoundBox => "mysterious box",
            WorldEventKind::Visitor => "visitor",
            WorldEventKind::Weather => "weather change",
        }
    }

    /// Pick one row from this kind's outcome table.
    fn resolve(self, dice: &dyn Dice) -> WorldEventOutcome {
        let table = self.outcomes();
        let (effect, description) = table[dice.pick(table.len())];
        WorldEventOutcome {
            kind: self,
            effect,
            description,
        }
    }

    /// The outcome table for this kind; rows are equally likely.
    fn outcomes(self) -> &'static [(WorldEffect, &'static str)] {
        match self {
            WorldEventKind::FoundBox => &BOX_OUTCOMES,
            WorldEventKind::Visitor => &VISITOR_OUTCOMES,
            WorldEventKind::Weather => &WEATHER_OUTCOMES,
        }
    }
}

impl std::fmt::Display for WorldEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Effects and outcomes
// ---------------------------------------------------------------------------

/// What an event does to the pet once it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEffect {
    /// Shift the vitals; applied through the usual clamped path.
    Vitals(VitalDelta),
    /// Grant experience instead of touching the vitals.
    Xp(i64),
}

/// A fully resolved event, ready to be applied and announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldEventOutcome {
    /// Which kind fired.
    pub kind: WorldEventKind,
    /// The effect to apply.
    pub effect: WorldEffect,
    /// Chat-facing description of what happened.
    pub description: &'static str,
}

const BOX_OUTCOMES: [(WorldEffect, &'static str); 5] = [
    (
        WorldEffect::Vitals(VitalDelta { hunger: 50, mood: 0, energy: 0, health: 0 }),
        "The box was full of food! Hunger +50",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: 0, energy: 30, health: 0 }),
        "The box held an energy drink! Energy +30",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: 40, energy: 0, health: 0 }),
        "The box was packed with toys! Mood +40",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: 0, energy: 0, health: -20 }),
        "The box was moldy inside! Health -20",
    ),
    (WorldEffect::Xp(50), "The box contained a textbook! +50 xp"),
];

const VISITOR_OUTCOMES: [(WorldEffect, &'static str); 3] = [
    (
        WorldEffect::Vitals(VitalDelta::HEAL_ALL),
        "A kind fairy dropped by and restored every vital!",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: -30, mood: 0, energy: 0, health: 0 }),
        "A mean troll stopped by and stole the food! Hunger -30",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: 50, energy: 0, health: 0 }),
        "A jolly clown came around! Mood +50",
    ),
];

const WEATHER_OUTCOMES: [(WorldEffect, &'static str); 4] = [
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: 20, energy: 0, health: 0 }),
        "Sunny skies! Mood +20",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: -10, energy: 0, health: 0 }),
        "It started raining... Mood -10",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: -20, energy: -15, health: 0 }),
        "A thunderstorm scared the pet! Mood -20, energy -15",
    ),
    (
        WorldEffect::Vitals(VitalDelta { hunger: 0, mood: 15, energy: 0, health: 0 }),
        "Snow! The pet is delighted! Mood +15",
    ),
];

// ---------------------------------------------------------------------------
// Rolling
// ---------------------------------------------------------------------------

/// Run the two-stage roll and resolve an outcome if both gates pass.
///
/// Draw order is fixed: global gate, kind pick, kind probability, then
/// the outcome row pick. Callers are expected to have already filtered
/// out dead and sleeping pets.
#[must_use]
pub fn roll_world_event(dice: &dyn Dice) -> Option<WorldEventOutcome> {
    if dice.roll() >= GLOBAL_EVENT_GATE {
        return None;
    }
    let kind = WorldEventKind::ALL[dice.pick(WorldEventKind::ALL.len())];
    if dice.roll() >= kind.probability() {
        return None;
    }
    Some(kind.resolve(dice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{Dice, SequenceDice};
    use crate::stats::apply_delta;
    use crate::types::{Vitals, MAX_STAT};

    #[test]
    fn global_gate_blocks_everything() {
        let dice = SequenceDice::scripted(vec![0.30], vec![]);
        assert!(roll_world_event(&dice).is_none(), "0.30 is not under the gate");

        let dice = SequenceDice::scripted(vec![0.99], vec![]);
        assert!(roll_world_event(&dice).is_none());
    }

    #[test]
    fn kind_probability_is_checked_after_the_gate() {
        // Gate passes, box is picked, but 0.25 >= 0.20 so nothing fires.
        let dice = SequenceDice::scripted(vec![0.29, 0.25], vec![0]);
        assert!(roll_world_event(&dice).is_none());

        // Weather's higher probability lets 0.24 through.
        let dice = SequenceDice::scripted(vec![0.29, 0.24], vec![2, 0]);
        let outcome = roll_world_event(&dice).expect("weather fires");
        assert_eq!(outcome.kind, WorldEventKind::Weather);
    }

    #[test]
    fn pick_order_matches_the_declared_table() {
        let dice = SequenceDice::scripted(vec![0.0, 0.0], vec![0, 4]);
        let outcome = roll_world_event(&dice).expect("box fires");
        assert_eq!(outcome.kind, WorldEventKind::FoundBox);
        assert_eq!(outcome.effect, WorldEffect::Xp(50));
    }

    #[test]
    fn probabilities_are_per_kind() {
        assert!((WorldEventKind::FoundBox.probability() - 0.20).abs() < f64::EPSILON);
        assert!((WorldEventKind::Visitor.probability() - 0.15).abs() < f64::EPSILON);
        assert!((WorldEventKind::Weather.probability() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn fairy_heals_a_battered_pet_to_full() {
        let dice = SequenceDice::scripted(vec![0.0, 0.0], vec![1, 0]);
        let outcome = roll_world_event(&dice).expect("visitor fires");
        assert_eq!(outcome.kind, WorldEventKind::Visitor);

        let battered = Vitals { hunger: 3, mood: 1, energy: 0, health: 12 };
        let WorldEffect::Vitals(delta) = outcome.effect else {
            panic!("fairy is a vitals outcome");
        };
        assert_eq!(apply_delta(battered, delta), Vitals::FULL);
    }

    #[test]
    fn every_outcome_keeps_vitals_in_range() {
        for kind in WorldEventKind::ALL {
            let rows = kind.outcomes().len();
            for row in 0..rows {
                let dice = SequenceDice::scripted(vec![0.0, 0.0], vec![kind_index(kind), row]);
                let outcome = roll_world_event(&dice).expect("both gates scripted to pass");
                if let WorldEffect::Vitals(delta) = outcome.effect {
                    assert!(apply_delta(Vitals::FULL, delta).in_range());
                    let empty = Vitals { hunger: 0, mood: 0, energy: 0, health: 0 };
                    assert!(apply_delta(empty, delta).in_range());
                }
                assert!(!outcome.description.is_empty());
            }
        }
    }

    #[test]
    fn resolve_consumes_exactly_one_row_pick() {
        let dice = SequenceDice::scripted(vec![0.0, 0.0, 0.5], vec![2, 3]);
        let outcome = roll_world_event(&dice).expect("weather fires");
        let WorldEffect::Vitals(delta) = outcome.effect else {
            panic!("weather only shifts vitals");
        };
        assert_eq!(delta.mood, 15, "row 3 is the snow outcome");
        // The leftover 0.5 roll was never drawn.
        assert!((dice.roll() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn max_stat_bounds_hold_for_heal_all() {
        assert_eq!(VitalDelta::HEAL_ALL.hunger, MAX_STAT);
    }

    fn kind_index(kind: WorldEventKind) -> usize {
        WorldEventKind::ALL
            .iter()
            .position(|k| *k == kind)
            .expect("kind is in ALL")
    }
}
