//! Client for the generative language API.
//!
//! Wraps `generateContent` and `embedContent` with typed requests. Non-success
//! responses become [`Error::Upstream`] so the HTTP layer can mirror the
//! provider's status code back to the caller.

use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::types::GenerateRequest;

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default generation model
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
/// Default embedding model
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";

/// Connection settings for the generative API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub embed_model: String,
}

impl GeminiConfig {
    /// Settings with the default host and models
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }
}

/// Client for generateContent / embedContent
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, config: GeminiConfig) -> Self {
        Self { http, config }
    }

    /// Run a generateContent call and return the first candidate's text.
    ///
    /// A success response without candidate text becomes
    /// [`Error::EmptyResponse`] carrying the raw body.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.chat_model, self.config.api_key
        );
        debug!(model = %self.config.chat_model, "dispatching generation request");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "generation request failed");
            return Err(Error::upstream(status.as_u16(), body));
        }

        let parsed: crate::types::GenerateResponse = serde_json::from_str(&body)?;
        match parsed.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                error!("generation response carried no candidate text");
                Err(Error::EmptyResponse(body))
            }
        }
    }

    /// Embed a piece of text into the provider's vector space
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent?key={}",
            self.config.base_url, self.config.embed_model, self.config.api_key
        );

        let body = serde_json::json!({
            "content": { "parts": [{ "text": text }] }
        });

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(status.as_u16(), body));
        }

        let parsed: EmbedResponse = response.json().await?;
        if parsed.embedding.values.is_empty() {
            return Err(Error::EmptyEmbedding);
        }
        Ok(parsed.embedding.values)
    }
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbedValues,
}

#[derive(Debug, Deserialize)]
struct EmbedValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;
    use axum::extract::Json;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn spawn_upstream(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Option<Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/v1beta/models/{model}",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                let reply = reply.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn client_for(base_url: &str) -> GeminiClient {
        let config = GeminiConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        };
        GeminiClient::new(reqwest::Client::new(), config)
    }

    fn simple_request(text: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: None,
            contents: vec![Content::user(text)],
            generation_config: None,
        }
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let reply = json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "hello!" }] } }
            ]
        });
        let (base_url, seen) = spawn_upstream(StatusCode::OK, reply).await;
        let client = client_for(&base_url);

        let text = client.generate(&simple_request("hi")).await.unwrap();
        assert_eq!(text, "hello!");

        let sent = seen.lock().unwrap().clone().unwrap();
        assert_eq!(sent["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn test_generate_maps_failure_status_and_body() {
        let reply = json!({ "error": { "message": "quota exceeded" } });
        let (base_url, _) = spawn_upstream(StatusCode::TOO_MANY_REQUESTS, reply).await;
        let client = client_for(&base_url);

        let err = client.generate(&simple_request("hi")).await.unwrap_err();
        match err {
            Error::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("quota exceeded"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_without_candidates_is_empty_response() {
        let reply = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let (base_url, _) = spawn_upstream(StatusCode::OK, reply).await;
        let client = client_for(&base_url);

        let err = client.generate(&simple_request("hi")).await.unwrap_err();
        match err {
            Error::EmptyResponse(raw) => assert!(raw.contains("SAFETY")),
            other => panic!("expected empty response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_reads_vector_values() {
        let reply = json!({ "embedding": { "values": [0.25, -0.5, 1.0] } });
        let (base_url, seen) = spawn_upstream(StatusCode::OK, reply).await;
        let client = client_for(&base_url);

        let values = client.embed("I am vegetarian").await.unwrap();
        assert_eq!(values, vec![0.25, -0.5, 1.0]);

        let sent = seen.lock().unwrap().clone().unwrap();
        assert_eq!(sent["content"]["parts"][0]["text"], "I am vegetarian");
    }

    #[tokio::test]
    async fn test_embed_empty_vector_is_error() {
        let reply = json!({ "embedding": { "values": [] } });
        let (base_url, _) = spawn_upstream(StatusCode::OK, reply).await;
        let client = client_for(&base_url);

        let err = client.embed("anything").await.unwrap_err();
        assert!(matches!(err, Error::EmptyEmbedding));
    }
}
