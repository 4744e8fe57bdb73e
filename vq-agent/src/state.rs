//! Shared application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use vq_core::memory::{MemoryService, RestMemoryStore};
use vq_core::provider::{GeminiClient, GeminiConfig};

use crate::config::Config;

/// Timeout for every outbound HTTP call, generation included
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: Config,
    /// Client for the generative backend
    pub provider: Arc<GeminiClient>,
    /// Memory pipeline over the fact store
    pub memory: Arc<MemoryService>,
    /// Client used to download message attachments
    pub http: reqwest::Client,
    /// Start time, for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    /// Wire up the provider client and memory pipeline from configuration.
    /// All components share one connection pool.
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let provider = Arc::new(GeminiClient::new(
            http.clone(),
            GeminiConfig {
                base_url: config.gemini_base_url.clone(),
                api_key: config.gemini_api_key.clone(),
                chat_model: config.chat_model.clone(),
                embed_model: config.embed_model.clone(),
            },
        ));

        let store = Arc::new(RestMemoryStore::new(
            http.clone(),
            &config.memory_api_url,
            &config.memory_api_key,
        ));

        let memory = Arc::new(MemoryService::new(store, provider.clone()));

        Ok(Arc::new(Self {
            config,
            provider,
            memory,
            http,
            start_time: Instant::now(),
        }))
    }
}
