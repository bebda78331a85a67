//! Cards and hands

use serde::{Deserialize, Serialize};

/// A single card in a hand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Attack value, multiplied by (power + 1) when played
    pub value: u32,
    /// Damage dealt to the opponent when this card wins its round
    pub damage: u32,
    /// False once the card has been committed to a move
    #[serde(default = "default_playable")]
    pub playable: bool,
}

fn default_playable() -> bool {
    true
}

impl Card {
    pub fn new(value: u32, damage: u32) -> Self {
        Self {
            value,
            damage,
            playable: true,
        }
    }

    /// Mark the card as played.
    ///
    /// # Panics
    /// Panics if the card was already committed.
    pub fn commit(&mut self) {
        assert!(self.playable, "card already committed");
        self.playable = false;
    }
}

/// Card and power chosen for the turn currently being resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub card: usize,
    pub power: u32,
}

/// Errors found when checking a hand built from external input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandError {
    #[error("card {index} has zero value")]
    ZeroValue { index: usize },

    #[error("card {index} has zero damage")]
    ZeroDamage { index: usize },

    #[error("selected card {index} is out of range for a hand of {len} cards")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("selected card {index} is still marked playable")]
    SelectionStillPlayable { index: usize },
}

/// One player's side of the duel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub health: i32,
    /// Remaining power budget
    pub power: u32,
    pub cards: Vec<Card>,
    /// Present only while the current turn is being resolved
    #[serde(default)]
    pub selection: Option<Selection>,
}

impl Hand {
    pub fn new(health: i32, power: u32, cards: Vec<Card>) -> Self {
        Self {
            health,
            power,
            cards,
            selection: None,
        }
    }

    /// Absolute indices of the playable cards, in hand order
    pub fn playable_indices(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.playable)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn playable_count(&self) -> usize {
        self.cards.iter().filter(|card| card.playable).count()
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Commit a card and power for this turn.
    ///
    /// # Panics
    /// Panics if the card index is out of range, the card is not playable,
    /// or `power` exceeds the remaining budget.
    pub fn commit(&mut self, card: usize, power: u32) {
        assert!(
            power <= self.power,
            "power {} exceeds remaining budget {}",
            power,
            self.power
        );
        self.cards[card].commit();
        self.power -= power;
        self.selection = Some(Selection { card, power });
    }

    /// Forget the current turn's selection once the round is resolved
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Check invariants that hold for any hand handed to the engine
    pub fn validate(&self) -> Result<(), HandError> {
        for (index, card) in self.cards.iter().enumerate() {
            if card.value == 0 {
                return Err(HandError::ZeroValue { index });
            }
            if card.damage == 0 {
                return Err(HandError::ZeroDamage { index });
            }
        }

        if let Some(selection) = self.selection {
            let len = self.cards.len();
            match self.cards.get(selection.card) {
                None => {
                    return Err(HandError::SelectionOutOfRange {
                        index: selection.card,
                        len,
                    })
                }
                Some(card) if card.playable => {
                    return Err(HandError::SelectionStillPlayable {
                        index: selection.card,
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}
