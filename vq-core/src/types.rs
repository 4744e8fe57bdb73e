//! Shared types for vq-core.
//!
//! The wire types mirror the generative API's JSON shapes exactly; field
//! names that differ from Rust conventions are pinned with serde renames.

use serde::{Deserialize, Serialize};

use crate::mode::Mode;

// ─────────────────────────────────────────────────────────────────────────────
// Agent Request
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a coaching request. Every field is optional; the dispatcher
/// fills in defaults (mode falls back to chat).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentRequest {
    /// Current user message, if any
    #[serde(default)]
    pub message: Option<String>,
    /// Free-form app state (goal, weights, hydration, ...)
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    /// Coaching mode; missing means chat
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Prior conversation turns, passed through verbatim
    #[serde(default)]
    pub history: Option<Vec<Content>>,
    /// Uploaded media to inline into the current turn
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    /// Owner of the memory bank
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

/// A previously uploaded file, addressed by public URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type, e.g. "image/jpeg"
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(rename = "publicUrl")]
    pub public_url: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Generative API wire types
// ─────────────────────────────────────────────────────────────────────────────

/// One part of a content turn: plain text or inline binary data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Text payload, if this is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::InlineData { .. } => None,
        }
    }
}

/// Base64-encoded media payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// A conversation turn with its role ("user" or "model")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

/// System instruction block; the wire shape carries no role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
        }
    }
}

/// Generation tuning; only the response MIME type is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
}

impl GenerationConfig {
    /// Force a JSON response body
    pub fn json() -> Self {
        Self {
            response_mime_type: "application/json".to_string(),
        }
    }
}

/// Body of a generateContent call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    pub contents: Vec<Content>,
    #[serde(
        rename = "generationConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub generation_config: Option<GenerationConfig>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Generative API responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl GenerateResponse {
    /// Text of the first candidate's first part, if any
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .as_text()
    }
}
