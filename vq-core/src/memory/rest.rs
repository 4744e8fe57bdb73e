//! REST adapter for the hosted fact store.
//!
//! Speaks PostgREST conventions: table access under `/rest/v1/user_memory`
//! and vector search through the `match_memory` stored procedure. Requests
//! authenticate with the service key in both the `apikey` and bearer headers.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::store::MemoryStore;
use super::{Fact, NewFact, RecalledFact};
use crate::error::{Error, Result};

/// Memory store backed by a PostgREST endpoint
#[derive(Clone)]
pub struct RestMemoryStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestMemoryStore {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/user_memory", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::store(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl MemoryStore for RestMemoryStore {
    async fn insert(&self, fact: NewFact) -> Result<()> {
        debug!(user_id = %fact.user_id, "inserting fact");
        let response = self
            .authed(self.http.post(self.table_url()))
            .json(&fact)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<RecalledFact>> {
        let url = format!(
            "{}?user_id=eq.{}&select=fact_text,created_at&order=created_at.desc&limit={}",
            self.table_url(),
            user_id,
            limit
        );
        let response = self.authed(self.http.get(&url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn similar(
        &self,
        user_id: &str,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<RecalledFact>> {
        let url = format!("{}/rest/v1/rpc/match_memory", self.base_url);
        let body = json!({
            "query_embedding": embedding,
            "match_threshold": threshold,
            "match_count": limit,
            "p_user_id": user_id,
        });
        let response = self.authed(self.http.post(&url)).json(&body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Fact>> {
        let url = format!(
            "{}?user_id=eq.{}&select=*&order=created_at.desc",
            self.table_url(),
            user_id
        );
        let response = self.authed(self.http.get(&url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn forget(&self, user_id: &str, id: Uuid) -> Result<()> {
        let url = format!("{}?id=eq.{}&user_id=eq.{}", self.table_url(), id, user_id);
        let response = self.authed(self.http.delete(&url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
