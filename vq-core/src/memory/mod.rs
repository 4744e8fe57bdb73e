//! User memory: durable health facts with vector recall.
//!
//! Facts are immutable rows owned by a user. Corrections arrive as new facts
//! and recall instructs the model to prefer the latest timestamp; the only
//! other lifecycle operation is a hard delete ("forget").

pub mod rest;
pub mod service;
pub mod store;

pub use rest::RestMemoryStore;
pub use service::{MemoryContext, MemoryService};
pub use store::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most recent facts always included in recall
pub const RECENT_FACTS_LIMIT: usize = 5;
/// Upper bound on similarity matches per recall
pub const SIMILAR_FACTS_LIMIT: usize = 5;
/// Similarity floor for a fact to count as relevant
pub const SIMILARITY_THRESHOLD: f32 = 0.5;

/// Classification assigned to a fact at extraction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactCategory {
    Personal,
    Diet,
    Medical,
    Fitness,
    #[default]
    General,
}

impl FactCategory {
    /// Map a free-form label onto a known category; anything unrecognized
    /// lands in General
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "personal" => Self::Personal,
            "diet" => Self::Diet,
            "medical" => Self::Medical,
            "fitness" => Self::Fitness,
            _ => Self::General,
        }
    }
}

/// A stored fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: Uuid,
    pub user_id: String,
    pub fact_text: String,
    #[serde(default)]
    pub category: FactCategory,
    pub created_at: DateTime<Utc>,
}

/// Input for storing a new fact
#[derive(Debug, Clone, Serialize)]
pub struct NewFact {
    pub user_id: String,
    pub fact_text: String,
    pub category: FactCategory,
    pub embedding: Vec<f32>,
}

/// Narrow projection returned by recall queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalledFact {
    pub fact_text: String,
    pub created_at: DateTime<Utc>,
}
