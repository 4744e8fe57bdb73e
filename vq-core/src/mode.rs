//! Coaching modes and their dispatch profiles.
//!
//! Every request runs in exactly one mode. A mode's [`ModeProfile`] is the
//! single source of truth for how its provider request is assembled, whether
//! it expects JSON back, and how it interacts with the memory bank. Adding a
//! mode means one enum variant, one match arm, and one prompt template.

use serde::{Deserialize, Serialize};

/// Coaching mode requested by the client. Unknown strings are rejected at
/// deserialization; a missing mode means [`Mode::Chat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Chat,
    Title,
    GenerateSummary,
    GoalIntake,
    Plan,
    ValidateGoal,
    /// Full program roadmap. `generate_full_plan` is the legacy client name.
    #[serde(alias = "generate_full_plan")]
    GenerateRoadmap,
    GenerateDailyTasks,
    AnalyzeMeal,
    MealSuggest,
    IngredientSuggest,
}

/// How the provider request is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// The composed prompt is the sole user turn; history and attachments
    /// are ignored
    SingleShot,
    /// Prompt as system instruction, message plus inlined images as the
    /// single user turn
    Multimodal,
    /// Prompt as system instruction, history passed through verbatim ahead
    /// of the current turn
    Conversational,
}

/// How Markdown fences are cleaned out of the model's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceCleanup {
    /// Leave the reply untouched
    Off,
    /// Strip only when a ```json fence is present; conversational replies
    /// may legitimately contain fenced snippets
    Gentle,
    /// Strip every fence marker
    Aggressive,
}

/// Dispatch profile of a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    pub shape: RequestShape,
    /// Request `application/json` output from the provider
    pub json_output: bool,
    /// Whether the prompt template consumes the rendered memory block
    pub injects_memory: bool,
    /// Whether the message is eligible for background fact extraction
    pub extracts_facts: bool,
    pub fences: FenceCleanup,
}

impl Mode {
    /// The dispatch profile for this mode
    pub fn profile(&self) -> ModeProfile {
        use FenceCleanup::*;
        use RequestShape::*;

        match self {
            Mode::Chat => ModeProfile {
                shape: Conversational,
                json_output: false,
                injects_memory: true,
                extracts_facts: true,
                fences: Off,
            },
            Mode::Title => ModeProfile {
                shape: SingleShot,
                json_output: false,
                injects_memory: false,
                extracts_facts: false,
                fences: Off,
            },
            Mode::GenerateSummary => ModeProfile {
                shape: SingleShot,
                json_output: false,
                injects_memory: false,
                extracts_facts: true,
                fences: Off,
            },
            Mode::GoalIntake => ModeProfile {
                shape: Conversational,
                json_output: false,
                injects_memory: true,
                extracts_facts: true,
                fences: Gentle,
            },
            Mode::Plan => ModeProfile {
                shape: SingleShot,
                json_output: true,
                injects_memory: true,
                extracts_facts: true,
                fences: Aggressive,
            },
            Mode::ValidateGoal => ModeProfile {
                shape: SingleShot,
                json_output: true,
                injects_memory: false,
                extracts_facts: true,
                fences: Aggressive,
            },
            Mode::GenerateRoadmap => ModeProfile {
                shape: SingleShot,
                json_output: true,
                injects_memory: false,
                extracts_facts: true,
                fences: Aggressive,
            },
            Mode::GenerateDailyTasks => ModeProfile {
                shape: SingleShot,
                json_output: true,
                injects_memory: false,
                extracts_facts: true,
                fences: Aggressive,
            },
            Mode::AnalyzeMeal => ModeProfile {
                shape: Multimodal,
                json_output: true,
                injects_memory: false,
                extracts_facts: true,
                fences: Aggressive,
            },
            Mode::MealSuggest => ModeProfile {
                shape: SingleShot,
                json_output: true,
                injects_memory: true,
                extracts_facts: true,
                fences: Aggressive,
            },
            Mode::IngredientSuggest => ModeProfile {
                shape: Multimodal,
                json_output: true,
                injects_memory: true,
                extracts_facts: true,
                fences: Aggressive,
            },
        }
    }
}

/// Remove Markdown fence markers from a model reply according to the mode's
/// cleanup style
pub fn clean_fences(text: &str, cleanup: FenceCleanup) -> String {
    match cleanup {
        FenceCleanup::Off => text.to_string(),
        FenceCleanup::Gentle => {
            if text.contains("```json") {
                text.replace("```json", "").replace("```", "").trim().to_string()
            } else {
                text.to_string()
            }
        }
        // Replacing the tagged marker first keeps the bare marker pass from
        // leaving a stray "json" behind
        FenceCleanup::Aggressive => {
            text.replace("```json", "").replace("```", "").trim().to_string()
        }
    }
}
