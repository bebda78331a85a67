//! Powerduel Core - Cards, hands and duel rules
//!
//! This crate provides the rules layer for the power duel:
//! - Cards and hands (health, power budget, per-turn selection)
//! - Combinatorics used to enumerate plans (permutations, compositions)
//! - Duel simulation between two fixed plans
//! - Card presets for dealing hands

pub mod card;
pub mod combinatorics;
pub mod deck;
pub mod duel;

// Re-exports for convenient access
pub use card::{Card, Hand, HandError, Selection};
pub use combinatorics::{
    all_compositions, all_permutations, composition_count, permutation_count,
};
pub use deck::{deal_hand, CardPreset, CARD_PRESETS, HAND_SIZE, MAX_HEALTH, MAX_POWER};
pub use duel::{simulate_duel, strength, DuelOutcome, Play};
