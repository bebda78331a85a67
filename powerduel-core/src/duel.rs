//! Duel simulation between two fixed plans
//!
//! Each round both sides reveal one card with its committed power. The side
//! with the strictly greater strength deals its card's damage; equal strength
//! is a draw and nobody is hurt. The duel stops as soon as either side is
//! down to zero health.

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// One planned round: the card's stats plus the power put behind it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Play {
    pub value: u32,
    pub damage: u32,
    pub power: u32,
}

impl Play {
    pub fn new(card: &Card, power: u32) -> Self {
        Self {
            value: card.value,
            damage: card.damage,
            power,
        }
    }

    pub fn strength(&self) -> u64 {
        strength(self.value, self.power)
    }
}

/// Committed strength of a card: value * (power + 1)
#[inline]
pub fn strength(value: u32, power: u32) -> u64 {
    u64::from(value) * (u64::from(power) + 1)
}

/// Final state of a simulated duel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuelOutcome {
    pub acting_health: i32,
    pub opposing_health: i32,
    pub rounds_played: usize,
}

impl DuelOutcome {
    /// True when the opposing side is knocked out, or finishes with no more
    /// health than the acting side. A level finish counts for the acting side.
    pub fn acting_wins(&self) -> bool {
        self.opposing_health <= 0 || self.opposing_health <= self.acting_health
    }
}

/// Replay both plans round by round.
///
/// Plans of different lengths are played for the shorter length.
pub fn simulate_duel(
    acting: &[Play],
    opposing: &[Play],
    acting_health: i32,
    opposing_health: i32,
) -> DuelOutcome {
    let mut outcome = DuelOutcome {
        acting_health,
        opposing_health,
        rounds_played: 0,
    };

    for (ours, theirs) in acting.iter().zip(opposing) {
        outcome.rounds_played += 1;

        let ours_strength = ours.strength();
        let theirs_strength = theirs.strength();
        if ours_strength > theirs_strength {
            outcome.opposing_health = take_damage(outcome.opposing_health, ours.damage);
        } else if theirs_strength > ours_strength {
            outcome.acting_health = take_damage(outcome.acting_health, theirs.damage);
        }

        if outcome.acting_health <= 0 || outcome.opposing_health <= 0 {
            break;
        }
    }

    outcome
}

/// Health after a hit, saturating at `i32::MIN`
#[inline]
fn take_damage(health: i32, damage: u32) -> i32 {
    health.saturating_sub(i32::try_from(damage).unwrap_or(i32::MAX))
}
