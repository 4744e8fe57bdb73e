//! Service configuration loaded from the environment.

use std::env;

use anyhow::{Context, Result};
use vq_core::provider::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBED_MODEL};

/// Default listen address
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// API key for the generative backend
    pub gemini_api_key: String,
    /// Base URL of the generative backend
    pub gemini_base_url: String,
    /// Model used for generation calls
    pub chat_model: String,
    /// Model used for embedding calls
    pub embed_model: String,
    /// Base URL of the fact store REST API
    pub memory_api_url: String,
    /// Service key for the fact store
    pub memory_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast when a required credential is missing so a misconfigured
    /// deployment dies at startup rather than on the first request.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: env_or("VQ_BIND_ADDR", DEFAULT_BIND_ADDR),
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            chat_model: env_or("GEMINI_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            embed_model: env_or("GEMINI_EMBED_MODEL", DEFAULT_EMBED_MODEL),
            memory_api_url: require("MEMORY_API_URL")?,
            memory_api_key: require("MEMORY_API_KEY")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} is not set"))
}
