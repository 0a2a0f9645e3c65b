use std::fmt;

use crate::profile::UserProfile;

/// What the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A plain list of startup ideas
    Ideas,
    /// Three cards, one of them the unicorn
    Game,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Ideas => write!(f, "ideas"),
            Mode::Game => write!(f, "game"),
        }
    }
}

/// Renders the instruction sent to the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptBuilder {
    response_language: Option<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for answers in a fixed language instead of mirroring the input.
    pub fn with_response_language(mut self, language: Option<String>) -> Self {
        self.response_language = language.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn build(&self, profile: &UserProfile, mode: Mode) -> String {
        let output_format = match mode {
            Mode::Ideas => Self::ideas_output_format(),
            Mode::Game => Self::game_output_format(),
        };

        format!(
            "{}\n\n{}\n\n{}\n\n{}\n\n**Output Format:**\n{}\n\n{}",
            Self::role(),
            Self::task(profile),
            Self::objective(mode),
            Self::guidelines(),
            self.language_instruction(),
            output_format
        )
    }

    fn role() -> &'static str {
        r#"**Role:**
You are a world-class Venture Capitalist and Visionary Startup Founder known for spotting "Unicorn" opportunities (startups with $1B+ potential). Your specialty is finding non-obvious intersections between a founder's personal traits and massive market gaps."#
    }

    fn task(profile: &UserProfile) -> String {
        format!(
            "**Task:**\nAnalyze the user's input data:\n1. **Interests:** {}\n2. **Skills:** {}\n3. **Hobbies:** {}",
            profile.interests, profile.skills, profile.hobbies
        )
    }

    fn objective(mode: Mode) -> &'static str {
        match mode {
            Mode::Ideas => {
                r#"**Objective:**
Generate 3 distinct, high-growth startup ideas that synthesize these three areas. Do not generate small business ideas (like a consulting firm or a local shop). Generate scalable, "500x potential" technology or platform plays."#
            }
            Mode::Game => {
                r#"**Objective:**
Generate exactly 3 startup ideas that synthesize these three areas for a guessing game. Exactly ONE of them must be a genuine "Unicorn": a scalable, "500x potential" technology or platform play. The other TWO must be plausible-sounding but doomed ideas ("dogshit") that a sharp investor would reject. Write all three pitches with equal confidence so the unicorn cannot be spotted from tone alone."#
            }
        }
    }

    fn guidelines() -> &'static str {
        r#"**Guidelines for Idea Generation:**
* **The Intersection:** Look for the "Blue Ocean." How can a specific skill (e.g., Coding) apply to a hobby (e.g., Gardening) in a way that disrupts the industry?
* **Scalability:** The idea must be software-based, a platform, or a high-tech product that can scale globally.
* **Differentiation:** Avoid generic ideas. Think weird, contrarian, and visionary."#
    }

    fn language_instruction(&self) -> String {
        match &self.response_language {
            Some(language) => format!("Please respond in {}.", language),
            None => "Please respond in the same language as the user's input.".to_string(),
        }
    }

    fn ideas_output_format() -> &'static str {
        r#"IMPORTANT: Return your answer strictly as a JSON array with the following keys for each idea: "title", "pitch", "concept", "monetization", "mvp".
Do not use Markdown code blocks.

Example structure:
[
  {
    "title": "Startup Name",
    "pitch": "The Unicorn Pitch",
    "concept": "The Core Concept",
    "monetization": "Monetization details",
    "mvp": "MVP Strategy"
  }
]"#
    }

    fn game_output_format() -> &'static str {
        r#"IMPORTANT: Return your answer strictly as a JSON object with a single key "cards" holding an array of exactly 3 objects with the keys "title", "pitch", "valuation", "type".
Rules:
* Exactly one card has "type": "unicorn" and its "valuation" is "$1,000,000,000".
* The other two cards have "type": "dogshit" with the valuations "$0" and "-$50,000".
Do not use Markdown code blocks.

Example structure:
{
  "cards": [
    { "title": "Startup Name", "pitch": "One-line pitch", "valuation": "$1,000,000,000", "type": "unicorn" },
    { "title": "Startup Name", "pitch": "One-line pitch", "valuation": "$0", "type": "dogshit" },
    { "title": "Startup Name", "pitch": "One-line pitch", "valuation": "-$50,000", "type": "dogshit" }
  ]
}"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile::new("Sustainability", "Embedded Rust", "Beekeeping")
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let builder = PromptBuilder::new();
        for mode in [Mode::Ideas, Mode::Game] {
            let first = builder.build(&profile(), mode);
            let second = builder.build(&profile(), mode);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_prompt_contains_profile_verbatim() {
        let prompt = PromptBuilder::new().build(&profile(), Mode::Ideas);
        assert!(prompt.contains("**Interests:** Sustainability"));
        assert!(prompt.contains("**Skills:** Embedded Rust"));
        assert!(prompt.contains("**Hobbies:** Beekeeping"));
        assert!(prompt.starts_with("**Role:**"));
        assert!(prompt.contains("Do not use Markdown code blocks."));
    }

    #[test]
    fn test_ideas_schema() {
        let prompt = PromptBuilder::new().build(&profile(), Mode::Ideas);
        for key in ["\"title\"", "\"pitch\"", "\"concept\"", "\"monetization\"", "\"mvp\""] {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(prompt.contains("JSON array"));
        assert!(!prompt.contains("\"cards\""));
    }

    #[test]
    fn test_game_schema() {
        let prompt = PromptBuilder::new().build(&profile(), Mode::Game);
        assert!(prompt.contains("\"cards\""));
        assert!(prompt.contains("exactly 3"));
        assert!(prompt.contains("Exactly one card has \"type\": \"unicorn\""));
        assert!(prompt.contains("\"dogshit\""));
        assert!(prompt.contains("$1,000,000,000"));
        assert!(!prompt.contains("\"monetization\""));
    }

    #[test]
    fn test_modes_differ() {
        let builder = PromptBuilder::new();
        assert_ne!(
            builder.build(&profile(), Mode::Ideas),
            builder.build(&profile(), Mode::Game)
        );
    }

    #[test]
    fn test_response_language() {
        let mirrored = PromptBuilder::new().build(&profile(), Mode::Ideas);
        assert!(mirrored.contains("same language as the user's input"));

        let fixed = PromptBuilder::new()
            .with_response_language(Some("Estonian".to_string()))
            .build(&profile(), Mode::Ideas);
        assert!(fixed.contains("Please respond in Estonian."));

        let blank = PromptBuilder::new().with_response_language(Some("  ".to_string()));
        assert_eq!(blank, PromptBuilder::new());
    }
}
