//! Remember/recall pipeline over the fact store.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::store::MemoryStore;
use super::{
    Fact, NewFact, RecalledFact, RECENT_FACTS_LIMIT, SIMILAR_FACTS_LIMIT, SIMILARITY_THRESHOLD,
};
use crate::error::Result;
use crate::extract::{ExtractedFact, FactExtractor};
use crate::provider::GeminiClient;

/// Facts gathered for one request
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    /// Latest profile facts, newest first
    pub profile: Vec<RecalledFact>,
    /// Similarity matches not already present among the profile facts
    pub relevant: Vec<RecalledFact>,
}

impl MemoryContext {
    /// Render the block injected into prompt templates. Empty when nothing
    /// was recalled.
    pub fn render(&self) -> String {
        let mut block = String::new();
        if !self.profile.is_empty() {
            block.push_str("USER PROFILE FACTS:\n");
            block.push_str(&join_lines(&self.profile));
        }
        if !self.relevant.is_empty() {
            if !block.is_empty() {
                block.push_str("\n\n");
            }
            block.push_str("RELEVANT MEMORIES:\n");
            block.push_str(&join_lines(&self.relevant));
        }
        block
    }
}

fn join_lines(facts: &[RecalledFact]) -> String {
    facts
        .iter()
        .map(|fact| {
            format!(
                "- {} (Recorded: {})",
                fact.fact_text,
                fact.created_at.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coordinates extraction, embedding, and retrieval around a [`MemoryStore`]
pub struct MemoryService {
    store: Arc<dyn MemoryStore>,
    provider: Arc<GeminiClient>,
    extractor: FactExtractor,
}

impl MemoryService {
    pub fn new(store: Arc<dyn MemoryStore>, provider: Arc<GeminiClient>) -> Self {
        let extractor = FactExtractor::new(provider.clone());
        Self {
            store,
            provider,
            extractor,
        }
    }

    /// Extract facts from a message and persist each one. Failures are
    /// isolated per fact so one bad embed does not drop the rest.
    pub async fn remember(&self, user_id: &str, message: &str) {
        let facts = match self.extractor.extract(message).await {
            Ok(facts) => facts,
            Err(err) => {
                warn!(%err, "fact extraction failed");
                return;
            }
        };
        if facts.is_empty() {
            return;
        }
        debug!(count = facts.len(), "extracted facts");

        for fact in facts {
            if let Err(err) = self.store_fact(user_id, fact).await {
                warn!(%err, "failed to save memory");
            }
        }
    }

    /// Run [`Self::remember`] on a detached task; the response never waits
    /// for it
    pub fn spawn_remember(self: &Arc<Self>, user_id: String, message: String) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.remember(&user_id, &message).await;
        });
    }

    async fn store_fact(&self, user_id: &str, fact: ExtractedFact) -> Result<()> {
        let embedding = self.provider.embed(&fact.text).await?;
        self.store
            .insert(NewFact {
                user_id: user_id.to_string(),
                fact_text: fact.text,
                category: fact.category,
                embedding,
            })
            .await
    }

    /// Gather profile facts and, when a query message is present, similarity
    /// matches. Store failures degrade to an empty context.
    pub async fn recall(&self, user_id: &str, query: Option<&str>) -> MemoryContext {
        let profile = match self.store.recent(user_id, RECENT_FACTS_LIMIT).await {
            Ok(facts) => facts,
            Err(err) => {
                warn!(%err, "recent fact lookup failed");
                Vec::new()
            }
        };

        let mut relevant = Vec::new();
        if let Some(query) = query {
            match self.similar_facts(user_id, query).await {
                Ok(matches) => {
                    relevant = matches
                        .into_iter()
                        .filter(|m| !profile.iter().any(|f| f.fact_text == m.fact_text))
                        .collect();
                }
                Err(err) => warn!(%err, "memory similarity lookup failed"),
            }
        }

        MemoryContext { profile, relevant }
    }

    async fn similar_facts(&self, user_id: &str, query: &str) -> Result<Vec<RecalledFact>> {
        let embedding = self.provider.embed(query).await?;
        self.store
            .similar(user_id, &embedding, SIMILARITY_THRESHOLD, SIMILAR_FACTS_LIMIT)
            .await
    }

    /// Every stored fact for a user, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Fact>> {
        self.store.list(user_id).await
    }

    /// Hard-delete one stored fact
    pub async fn forget(&self, user_id: &str, id: Uuid) -> Result<()> {
        self.store.forget(user_id, id).await
    }
}
