use std::fmt;

use serde::{Deserialize, Serialize};

/// A startup idea as returned in ideas mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Idea {
    pub title: String,
    pub pitch: String,
    pub concept: String,
    pub monetization: String,
    pub mvp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Unicorn,
    Dogshit,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKind::Unicorn => write!(f, "unicorn"),
            CardKind::Dogshit => write!(f, "dogshit"),
        }
    }
}

/// A game card. `revealed` is session state and never read from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub pitch: String,
    pub valuation: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    #[serde(skip_deserializing, default)]
    pub revealed: bool,
}

impl Card {
    pub fn is_unicorn(&self) -> bool {
        self.kind == CardKind::Unicorn
    }
}

/// Result of the single pick in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    pub fn for_card(card: &Card) -> Self {
        if card.is_unicorn() { Outcome::Won } else { Outcome::Lost }
    }
}
