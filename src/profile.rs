use serde::{Deserialize, Serialize};

use crate::error::IdeaError;

/// The three free-text attributes the ideas are built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub interests: String,
    pub skills: String,
    pub hobbies: String,
}

/// One editable field of a `UserProfile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Interests,
    Skills,
    Hobbies,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Interests, Field::Skills, Field::Hobbies];

    pub fn name(self) -> &'static str {
        match self {
            Field::Interests => "interests",
            Field::Skills => "skills",
            Field::Hobbies => "hobbies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Interests => "Interests",
            Field::Skills => "Skills",
            Field::Hobbies => "Hobbies",
        }
    }

    pub fn example(self) -> &'static str {
        match self {
            Field::Interests => "e.g. Technology, Finance, Sustainability",
            Field::Skills => "e.g. Programming, Marketing, Design",
            Field::Hobbies => "e.g. Hiking, Reading, Cooking",
        }
    }
}

impl UserProfile {
    #[cfg(test)]
    pub fn new(
        interests: impl Into<String>,
        skills: impl Into<String>,
        hobbies: impl Into<String>,
    ) -> Self {
        Self {
            interests: interests.into(),
            skills: skills.into(),
            hobbies: hobbies.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Interests => &self.interests,
            Field::Skills => &self.skills,
            Field::Hobbies => &self.hobbies,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Interests => &mut self.interests,
            Field::Skills => &mut self.skills,
            Field::Hobbies => &mut self.hobbies,
        };
        *slot = value.into();
    }

    /// Fields that are empty or whitespace-only, in form order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn validate(&self) -> Result<(), IdeaError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IdeaError::Validation {
                missing: missing.into_iter().map(Field::name).collect(),
            })
        }
    }
}
