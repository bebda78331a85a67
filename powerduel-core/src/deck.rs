//! Card presets and hand dealing

use rand::Rng;

use crate::card::{Card, Hand};

/// Cards dealt to each player
pub const HAND_SIZE: usize = 4;

/// Starting power budget
pub const MAX_POWER: u32 = 12;

/// Starting health
pub const MAX_HEALTH: i32 = 12;

/// Value/damage pair from the preset table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardPreset {
    pub value: u32,
    pub damage: u32,
}

const fn preset(value: u32, damage: u32) -> CardPreset {
    CardPreset { value, damage }
}

/// Presets by tier; one card of each tier is dealt into a hand
pub const CARD_PRESETS: [[CardPreset; 7]; HAND_SIZE] = [
    [preset(3, 2), preset(3, 1), preset(3, 3), preset(2, 2), preset(4, 2), preset(2, 1), preset(4, 3)],
    [preset(4, 3), preset(4, 2), preset(4, 4), preset(3, 3), preset(5, 3), preset(3, 2), preset(5, 4)],
    [preset(6, 5), preset(6, 4), preset(6, 6), preset(5, 5), preset(7, 5), preset(5, 4), preset(7, 6)],
    [preset(8, 7), preset(8, 6), preset(8, 8), preset(7, 7), preset(9, 7), preset(7, 6), preset(9, 8)],
];

/// Deal a fresh hand: one random preset per tier, full health and power
pub fn deal_hand<R: Rng>(rng: &mut R) -> Hand {
    let cards = CARD_PRESETS
        .iter()
        .map(|tier| {
            let preset = tier[rng.gen_range(0..tier.len())];
            Card::new(preset.value, preset.damage)
        })
        .collect();

    Hand::new(MAX_HEALTH, MAX_POWER, cards)
}
