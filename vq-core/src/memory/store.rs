//! Storage seam for user memory.

use async_trait::async_trait;
use uuid::Uuid;

use super::{Fact, NewFact, RecalledFact};
use crate::error::Result;

/// Persistence operations the memory pipeline needs.
///
/// Implementations must be shareable across tasks; recall and the detached
/// remember task run concurrently against the same store.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist a new fact. Facts are never updated in place.
    async fn insert(&self, fact: NewFact) -> Result<()>;

    /// Latest facts for a user, newest first
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<RecalledFact>>;

    /// Facts whose embedding lies within `threshold` of the query vector,
    /// best match first
    async fn similar(
        &self,
        user_id: &str,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<RecalledFact>>;

    /// Every fact for a user, newest first
    async fn list(&self, user_id: &str) -> Result<Vec<Fact>>;

    /// Hard-delete one fact by id
    async fn forget(&self, user_id: &str, id: Uuid) -> Result<()>;
}
