use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;

use crate::idea::{Card, Idea};

const FENCE: &str = "```";
const DECK_SIZE: usize = 3;

/// Turns raw model output into validated ideas or cards.
#[derive(Debug, Clone)]
pub struct Interpreter {
    strict_deck: bool,
}

impl Interpreter {
    pub fn new(strict_deck: bool) -> Self {
        Self { strict_deck }
    }

    /// Parse an ideas-mode response. Order is preserved.
    pub fn interpret_ideas(&self, raw: &str) -> Result<Vec<Idea>> {
        let json = strip_code_fences(raw);
        debug!("Interpreting ideas response ({} bytes)", json.len());
        serde_json::from_str(json).context("Response is not a JSON array of ideas")
    }

    /// Parse a game-mode response, validate the deck and deal it face down.
    pub fn interpret_cards<R: Rng + ?Sized>(&self, raw: &str, rng: &mut R) -> Result<Vec<Card>> {
        let json = strip_code_fences(raw);
        debug!("Interpreting game response ({} bytes)", json.len());

        let value: Value = serde_json::from_str(json).context("Response is not valid JSON")?;
        let cards = value
            .get("cards")
            .ok_or_else(|| anyhow!("Response has no \"cards\" key"))?;
        if !cards.is_array() {
            bail!("\"cards\" is not an array");
        }
        let mut cards: Vec<Card> =
            serde_json::from_value(cards.clone()).context("Malformed card in response")?;

        self.check_deck(&cards)?;
        shuffle(&mut cards, rng);
        for card in &mut cards {
            card.revealed = false;
        }
        Ok(cards)
    }

    fn check_deck(&self, cards: &[Card]) -> Result<()> {
        if cards.is_empty() {
            bail!("Response contains no cards");
        }
        if !self.strict_deck {
            return Ok(());
        }
        if cards.len() != DECK_SIZE {
            bail!("Expected {} cards, got {}", DECK_SIZE, cards.len());
        }
        let unicorns = cards.iter().filter(|c| c.is_unicorn()).count();
        if unicorns != 1 {
            bail!("Expected exactly one unicorn, got {}", unicorns);
        }
        Ok(())
    }
}

/// Remove a leading fence (with optional language tag) and a trailing fence.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        // Only the language tag goes; JSON may start on the fence line.
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

/// Uniform in-place permutation (Fisher-Yates).
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
