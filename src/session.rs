use std::fmt;

use anyhow::Result;
use rand::Rng;

use crate::error::IdeaError;
use crate::idea::{Card, Idea, Outcome};
use crate::interpreter::Interpreter;
use crate::profile::{Field, UserProfile};
use crate::prompt::{Mode, PromptBuilder};

/// Where a session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Form editable. Carries the message of the last failed generation, if any.
    Input { error: Option<String> },
    /// A generation request is in flight.
    Loading,
    /// Ideas mode result on screen; the form stays editable.
    Listing,
    /// Cards dealt face down, waiting for the single pick.
    Playing,
    /// The pick was made and every card is face up.
    Resolved(Outcome),
}

impl Phase {
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Input { .. } => "input",
            Phase::Loading => "loading",
            Phase::Listing => "listing",
            Phase::Playing => "playing",
            Phase::Resolved(Outcome::Won) => "won",
            Phase::Resolved(Outcome::Lost) => "lost",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One user's interaction, from the form to the result and back.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    mode: Mode,
    profile: UserProfile,
    phase: Phase,
    ideas: Vec<Idea>,
    cards: Vec<Card>,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            profile: UserProfile::default(),
            phase: Phase::Input { error: None },
            ideas: Vec::new(),
            cards: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Input { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn is_editable(&self) -> bool {
        matches!(self.phase, Phase::Input { .. } | Phase::Listing)
    }

    /// Update one profile field. Rejected while loading or during a game.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), IdeaError> {
        if !self.is_editable() {
            return Err(self.rejected("edit the profile"));
        }
        self.profile.set(field, value);
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.is_editable() && self.profile.is_complete()
    }

    /// Validate the profile and move to `Loading`, returning the prompt to send.
    ///
    /// On error nothing changes: the phase, profile and previous results are
    /// left exactly as they were.
    pub fn begin_submission(&mut self, prompts: &PromptBuilder) -> Result<String, IdeaError> {
        if !self.is_editable() {
            return Err(self.rejected("submit"));
        }
        self.profile.validate()?;

        self.ideas.clear();
        self.cards.clear();
        self.phase = Phase::Loading;
        Ok(prompts.build(&self.profile, self.mode))
    }

    /// Consume the raw model output for the in-flight submission.
    ///
    /// A response that does not parse puts the session back into `Input`
    /// with the error message and returns the same error.
    pub fn complete_submission<R: Rng + ?Sized>(
        &mut self,
        raw: &str,
        interpreter: &Interpreter,
        rng: &mut R,
    ) -> Result<usize, IdeaError> {
        if self.phase != Phase::Loading {
            return Err(self.rejected("accept a response"));
        }

        let mode = self.mode;
        let parsed: Result<usize> = match mode {
            Mode::Ideas => interpreter.interpret_ideas(raw).map(|ideas| {
                self.ideas = ideas;
                self.phase = Phase::Listing;
                self.ideas.len()
            }),
            Mode::Game => interpreter.interpret_cards(raw, rng).map(|cards| {
                self.cards = cards;
                self.phase = Phase::Playing;
                self.cards.len()
            }),
        };

        parsed.map_err(|e| {
            let error = IdeaError::GenerationFailed(format!("{:#}", e));
            self.fail_submission(&error);
            error
        })
    }

    /// Return a `Loading` session to `Input` carrying the error message.
    /// On a session that already failed, the message is replaced.
    pub fn fail_submission(&mut self, error: &IdeaError) {
        if matches!(self.phase, Phase::Loading | Phase::Input { error: Some(_) }) {
            self.ideas.clear();
            self.cards.clear();
            self.phase = Phase::Input {
                error: Some(error.to_string()),
            };
        }
    }

    /// Pick a card. Only the first pick while `Playing` counts; it flips every
    /// card at once. Anything else is a no-op returning `None`.
    pub fn reveal(&mut self, index: usize) -> Option<Outcome> {
        if self.phase != Phase::Playing || self.cards.iter().any(|c| c.revealed) {
            return None;
        }
        let outcome = Outcome::for_card(self.cards.get(index)?);
        for card in &mut self.cards {
            card.revealed = true;
        }
        self.phase = Phase::Resolved(outcome);
        Some(outcome)
    }

    /// Back to a fresh form. Rejected while a request is in flight.
    pub fn reset(&mut self) -> Result<(), IdeaError> {
        if self.phase == Phase::Loading {
            return Err(self.rejected("reset"));
        }
        *self = Session::new(self.mode);
        Ok(())
    }

    fn rejected(&self, action: &'static str) -> IdeaError {
        IdeaError::Rejected {
            action,
            phase: self.phase.tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idea::CardKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const IDEAS: &str = r#"```json
[{"title":"HiveMind","pitch":"Bees as a service","concept":"Sensors","monetization":"SaaS","mvp":"One hive"}]
```"#;

    const GAME: &str = r#"{"cards":[
        {"title":"U","pitch":"p","valuation":"$1,000,000,000","type":"unicorn"},
        {"title":"D1","pitch":"p","valuation":"$0","type":"dogshit"},
        {"title":"D2","pitch":"p","valuation":"-$50,000","type":"dogshit"}
    ]}"#;

    fn filled(mode: Mode) -> Session {
        let mut session = Session::new(mode);
        session.set_field(Field::Interests, "Fintech").unwrap();
        session.set_field(Field::Skills, "Rust").unwrap();
        session.set_field(Field::Hobbies, "Chess").unwrap();
        session
    }

    fn playing() -> Session {
        let mut session = filled(Mode::Game);
        session.begin_submission(&PromptBuilder::new()).unwrap();
        session
            .complete_submission(GAME, &Interpreter::new(true), &mut StdRng::seed_from_u64(1))
            .unwrap();
        session
    }

    /// A game with a known, unshuffled deck order.
    fn playing_with(kinds: &[CardKind]) -> Session {
        let mut session = playing();
        session.cards = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| Card {
                title: format!("card {}", i),
                pitch: "p".to_string(),
                valuation: "v".to_string(),
                kind: *kind,
                revealed: false,
            })
            .collect();
        session
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new(Mode::Game);
        assert_eq!(session.phase(), &Phase::Input { error: None });
        assert!(!session.can_submit());
        assert!(session.cards().is_empty());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_validation_gate() {
        for blank in ["", "   ", "\n\t"] {
            let mut session = filled(Mode::Ideas);
            session.set_field(Field::Skills, blank).unwrap();
            let before = session.clone();

            let err = session.begin_submission(&PromptBuilder::new()).unwrap_err();
            assert!(matches!(err, IdeaError::Validation { .. }));
            assert_eq!(session, before);
        }
    }

    #[test]
    fn test_submit_returns_prompt_and_loads() {
        let mut session = filled(Mode::Ideas);
        let prompt = session.begin_submission(&PromptBuilder::new()).unwrap();
        assert_eq!(prompt, PromptBuilder::new().build(session.profile(), Mode::Ideas));
        assert_eq!(session.phase(), &Phase::Loading);
    }

    #[test]
    fn test_no_submission_or_edit_while_loading() {
        let mut session = filled(Mode::Game);
        session.begin_submission(&PromptBuilder::new()).unwrap();

        assert!(matches!(
            session.begin_submission(&PromptBuilder::new()),
            Err(IdeaError::Rejected { action: "submit", phase: "loading" })
        ));
        assert!(session.set_field(Field::Hobbies, "Golf").is_err());
        assert!(session.reset().is_err());
        assert_eq!(session.phase(), &Phase::Loading);
    }

    #[test]
    fn test_ideas_success_lists_in_order() {
        let mut session = filled(Mode::Ideas);
        session.begin_submission(&PromptBuilder::new()).unwrap();
        let count = session
            .complete_submission(IDEAS, &Interpreter::new(true), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(session.phase(), &Phase::Listing);
        assert_eq!(session.ideas()[0].title, "HiveMind");
        assert!(session.can_submit());
    }

    #[test]
    fn test_resubmission_from_listing_clears_results() {
        let mut session = filled(Mode::Ideas);
        session.begin_submission(&PromptBuilder::new()).unwrap();
        session
            .complete_submission(IDEAS, &Interpreter::new(true), &mut StdRng::seed_from_u64(1))
            .unwrap();

        session.begin_submission(&PromptBuilder::new()).unwrap();
        assert_eq!(session.phase(), &Phase::Loading);
        assert!(session.ideas().is_empty());
    }

    #[test]
    fn test_parse_failure_surfaces_error() {
        for mode in [Mode::Ideas, Mode::Game] {
            let mut session = filled(mode);
            session.begin_submission(&PromptBuilder::new()).unwrap();
            let err = session
                .complete_submission("not json", &Interpreter::new(true), &mut StdRng::seed_from_u64(1))
                .unwrap_err();

            assert!(matches!(err, IdeaError::GenerationFailed(_)));
            assert!(matches!(session.phase(), Phase::Input { error: Some(_) }));
            assert_eq!(session.error(), Some(err.to_string().as_str()));
            assert!(session.ideas().is_empty());
            assert!(session.cards().is_empty());
            assert_eq!(session.profile().interests, "Fintech");
        }
    }

    #[test]
    fn test_error_cleared_on_next_submission() {
        let mut session = filled(Mode::Game);
        session.begin_submission(&PromptBuilder::new()).unwrap();
        session.fail_submission(&IdeaError::GenerationFailed("boom".to_string()));
        assert_eq!(session.error(), Some("Generation failed: boom"));

        session.begin_submission(&PromptBuilder::new()).unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_failure_message_can_be_replaced() {
        let mut session = filled(Mode::Ideas);
        session.fail_submission(&IdeaError::GenerationFailed("ignored".to_string()));
        assert_eq!(session.phase(), &Phase::Input { error: None });

        session.begin_submission(&PromptBuilder::new()).unwrap();
        session.fail_submission(&IdeaError::GenerationFailed("401".to_string()));
        session.fail_submission(&IdeaError::ConfigurationMissing {
            env_var: "GEMINI_API_KEY".to_string(),
        });
        assert!(session.error().unwrap().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_game_deals_face_down() {
        let mut session = playing();
        assert_eq!(session.phase(), &Phase::Playing);
        assert_eq!(session.cards().len(), 3);
        assert!(session.cards().iter().all(|c| !c.revealed));
        assert!(session.set_field(Field::Skills, "Go").is_err());
    }

    #[test]
    fn test_win_condition() {
        let deck = [CardKind::Unicorn, CardKind::Dogshit, CardKind::Dogshit];
        let expected = [Outcome::Won, Outcome::Lost, Outcome::Lost];
        for (index, outcome) in expected.into_iter().enumerate() {
            let mut session = playing_with(&deck);
            assert_eq!(session.reveal(index), Some(outcome));
            assert_eq!(session.phase(), &Phase::Resolved(outcome));
            assert_eq!(session.outcome(), Some(outcome));
            assert!(session.cards().iter().all(|c| c.revealed));
        }
    }

    #[test]
    fn test_first_pick_is_final() {
        let mut session =
            playing_with(&[CardKind::Unicorn, CardKind::Dogshit, CardKind::Dogshit]);
        assert_eq!(session.reveal(1), Some(Outcome::Lost));
        let after_first = session.clone();

        for index in [0, 1, 2, 7] {
            assert_eq!(session.reveal(index), None);
            assert_eq!(session, after_first);
        }
    }

    #[test]
    fn test_out_of_range_pick_is_ignored() {
        let mut session = playing();
        assert_eq!(session.reveal(3), None);
        assert_eq!(session.phase(), &Phase::Playing);
        assert!(session.cards().iter().all(|c| !c.revealed));
    }

    #[test]
    fn test_reveal_outside_playing_is_noop() {
        let mut session = filled(Mode::Game);
        assert_eq!(session.reveal(0), None);
        session.begin_submission(&PromptBuilder::new()).unwrap();
        assert_eq!(session.reveal(0), None);
        assert_eq!(session.phase(), &Phase::Loading);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = playing();
        session.reveal(0).unwrap();
        session.reset().unwrap();
        assert_eq!(session, Session::new(Mode::Game));
        assert!(session.profile().interests.is_empty());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_game_submission_rejected_until_reset() {
        let mut session = playing();
        assert!(session.begin_submission(&PromptBuilder::new()).is_err());
        session.reveal(2).unwrap();
        assert!(session.begin_submission(&PromptBuilder::new()).is_err());
    }
}
