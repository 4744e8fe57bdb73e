//! Memory review routes.
//!
//! The app's settings screen lets users inspect and delete what the coach
//! has remembered about them:
//! - `GET /memory/{user_id}` - all stored facts, newest first
//! - `DELETE /memory/{user_id}/{id}` - remove one fact

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;
use vq_core::memory::Fact;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/memory/{user_id}", get(list_facts))
        .route("/memory/{user_id}/{id}", delete(forget_fact))
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FactList {
    pub facts: Vec<Fact>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_facts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<FactList>, (StatusCode, Json<Value>)> {
    let facts = state
        .memory
        .list(&user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(FactList { facts }))
}

pub async fn forget_fact(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Deleted>, (StatusCode, Json<Value>)> {
    state
        .memory
        .forget(&user_id, id)
        .await
        .map_err(store_error)?;
    Ok(Json(Deleted { deleted: true }))
}

fn store_error(err: vq_core::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::routes::create_router;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Fact store stub speaking the PostgREST dialect the real one does.
    /// Records the query string of each hit.
    async fn spawn_store(rows: Value, seen: Arc<Mutex<Vec<String>>>) -> String {
        let list_seen = seen.clone();
        let delete_seen = seen.clone();
        let app = Router::new().route(
            "/rest/v1/user_memory",
            get(move |request: Request<Body>| {
                let rows = rows.clone();
                let seen = list_seen.clone();
                async move {
                    let query = request.uri().query().unwrap_or_default().to_string();
                    seen.lock().unwrap().push(query);
                    Json(rows)
                }
            })
            .post(|| async { StatusCode::CREATED })
            .delete(move |request: Request<Body>| {
                let seen = delete_seen.clone();
                async move {
                    let query = request.uri().query().unwrap_or_default().to_string();
                    seen.lock().unwrap().push(query);
                    StatusCode::NO_CONTENT
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn test_router(store_url: &str) -> Router {
        let config = Config {
            bind_addr: "127.0.0.1:0".to_string(),
            gemini_api_key: "gk-test".to_string(),
            gemini_base_url: "http://127.0.0.1:1".to_string(),
            chat_model: "gemini-2.5-flash".to_string(),
            embed_model: "text-embedding-004".to_string(),
            memory_api_url: store_url.to_string(),
            memory_api_key: "mk-test".to_string(),
        };
        create_router(AppState::new(config).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_returns_stored_facts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let rows = json!([
            {
                "id": "7d8a1f84-13b2-4f52-9c1e-2a58a1a0b9d1",
                "user_id": "user-1",
                "fact_text": "User is vegetarian",
                "category": "diet",
                "created_at": "2026-03-01T10:00:00Z"
            },
            {
                "id": "3f0c2b51-8f7e-42d3-b0a9-64d1c7f2e8a2",
                "user_id": "user-1",
                "fact_text": "User has a knee injury",
                "category": "medical",
                "created_at": "2026-02-20T09:30:00Z"
            }
        ]);
        let store_url = spawn_store(rows, seen.clone()).await;

        let response = test_router(&store_url)
            .oneshot(
                Request::builder()
                    .uri("/memory/user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["facts"].as_array().unwrap().len(), 2);
        assert_eq!(body["facts"][0]["fact_text"], "User is vegetarian");
        assert_eq!(body["facts"][1]["category"], "medical");

        let queries = seen.lock().unwrap();
        assert!(queries[0].contains("user_id=eq.user-1"));
        assert!(queries[0].contains("order=created_at.desc"));
    }

    #[tokio::test]
    async fn test_forget_scopes_delete_to_user() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store_url = spawn_store(json!([]), seen.clone()).await;

        let response = test_router(&store_url)
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/memory/user-1/7d8a1f84-13b2-4f52-9c1e-2a58a1a0b9d1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["deleted"], true);

        let queries = seen.lock().unwrap();
        assert!(queries[0].contains("id=eq.7d8a1f84-13b2-4f52-9c1e-2a58a1a0b9d1"));
        assert!(queries[0].contains("user_id=eq.user-1"));
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_bad_gateway() {
        let app = Router::new().route(
            "/rest/v1/user_memory",
            get(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let response = test_router(&format!("http://{addr}"))
            .oneshot(
                Request::builder()
                    .uri("/memory/user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_forget_rejects_malformed_fact_id() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store_url = spawn_store(json!([]), seen.clone()).await;

        let response = test_router(&store_url)
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/memory/user-1/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(seen.lock().unwrap().is_empty());
    }
}
