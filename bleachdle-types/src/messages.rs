use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{AttributeSet, AttributeVerdict};

/// Body posted to every comparison endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRequest {
    pub selected_character: String,
}

impl GuessRequest {
    pub fn new(selected_character: impl Into<String>) -> Self {
        Self {
            selected_character: selected_character.into(),
        }
    }
}

/// Raw reply of `/compare_character`, `/compare_bankai` and `/compare_schrift`.
///
/// Failures carry only `error`. The character variant sends
/// `comparison_result` and `todays_character`; the name-only variants send a
/// top-level `is_correct` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompareResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub character_data: Option<AttributeSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub todays_character: Option<AttributeSet>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub comparison_result: BTreeMap<String, AttributeVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl CompareResponse {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Split the reply into a backend rejection or a usable guess result.
    pub fn into_outcome(self) -> CompareOutcome {
        if let Some(message) = self.error {
            return CompareOutcome::Rejected(message);
        }

        let Some(character_data) = self.character_data else {
            return CompareOutcome::Rejected("Comparison response has no character data".to_string());
        };
        let todays_character = self.todays_character.unwrap_or_default();

        // Name equality is the fallback for the character variant, which
        // never sends a top-level flag.
        let is_correct = self.is_correct.unwrap_or_else(|| {
            matches!(
                (character_data.name(), todays_character.name()),
                (Some(guess), Some(target)) if guess == target
            )
        });

        CompareOutcome::Accepted(GuessResult {
            character_data,
            todays_character,
            comparison_result: self.comparison_result,
            is_correct,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompareOutcome {
    Rejected(String),
    Accepted(GuessResult),
}

/// A successful comparison, normalized across variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessResult {
    #[ts(type = "Record<string, unknown>")]
    pub character_data: AttributeSet,
    /// Only the fields needed for directional hints; empty for name-only variants
    #[ts(type = "Record<string, unknown>")]
    pub todays_character: AttributeSet,
    pub comparison_result: BTreeMap<String, AttributeVerdict>,
    pub is_correct: bool,
}

impl GuessResult {
    /// Missing verdicts count as incorrect.
    pub fn is_attribute_correct(&self, key: &str) -> bool {
        self.comparison_result
            .get(key)
            .is_some_and(|verdict| verdict.is_correct)
    }
}
