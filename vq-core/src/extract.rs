//! Fact extraction from user messages.
//!
//! Each eligible message makes one JSON-mode generation call that filters
//! out durable health facts worth remembering. Extraction is best-effort:
//! malformed model output yields an empty list, never an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::memory::FactCategory;
use crate::provider::GeminiClient;
use crate::types::{Content, GenerateRequest, GenerationConfig};

/// A fact pulled out of a user message
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFact {
    pub text: String,
    pub category: FactCategory,
}

/// Extracts durable health facts from chat messages
pub struct FactExtractor {
    provider: Arc<GeminiClient>,
}

impl FactExtractor {
    pub fn new(provider: Arc<GeminiClient>) -> Self {
        Self { provider }
    }

    /// Ask the model which permanent facts `message` contains
    pub async fn extract(&self, message: &str) -> Result<Vec<ExtractedFact>> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::user(extraction_prompt(message))],
            generation_config: Some(GenerationConfig::json()),
        };
        let text = self.provider.generate(&request).await?;
        Ok(parse_facts(&text))
    }
}

fn extraction_prompt(message: &str) -> String {
    format!(
        r#"Analyze this user message for permanent health-related facts or preferences.
Message: "{message}"

Rules:
- Extract personal details: Name, Age, Location/Place, Height, Weight.
- Extract health facts: Diet, injuries, allergies, goals, habits.
- Assign a category to each fact: 'personal', 'diet', 'medical', 'fitness', 'general'.
- Ignore casual conversation ("Hello", "Thanks").

Output JSON format:
{{
  "facts": [
    {{ "text": "fact 1", "category": "diet" }},
    {{ "text": "fact 2", "category": "personal" }}
  ]
}}
or {{ "facts": [] }}"#
    )
}

/// Parse the model's reply. Unparseable output yields an empty list.
fn parse_facts(text: &str) -> Vec<ExtractedFact> {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, "fact extraction returned unparseable JSON");
            return Vec::new();
        }
    };

    let Some(entries) = parsed.get("facts").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries.iter().filter_map(fact_from_entry).collect()
}

fn fact_from_entry(entry: &Value) -> Option<ExtractedFact> {
    let (text, category) = match entry {
        // Older model outputs returned bare strings
        Value::String(text) => (text.clone(), FactCategory::General),
        Value::Object(map) => {
            let text = map.get("text")?.as_str()?.to_string();
            let category = map
                .get("category")
                .and_then(Value::as_str)
                .map(FactCategory::from_label)
                .unwrap_or_default();
            (text, category)
        }
        _ => return None,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(ExtractedFact { text, category })
    }
}
