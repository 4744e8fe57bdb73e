//! Provider request assembly.
//!
//! Turns a composed prompt plus the incoming request's history and
//! attachments into the generateContent body for the mode's request shape.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mode::{ModeProfile, RequestShape};
use crate::types::{
    Attachment, Content, GenerateRequest, GenerationConfig, Part, SystemInstruction,
};

/// Assemble the generateContent body for one agent request.
///
/// Attachment downloads are best-effort; a failed fetch is skipped with a
/// warning and never fails the request.
pub async fn build_request(
    http: &reqwest::Client,
    profile: &ModeProfile,
    prompt: &str,
    message: Option<&str>,
    history: Option<&[Content]>,
    attachments: Option<&[Attachment]>,
) -> GenerateRequest {
    let generation_config = profile.json_output.then(GenerationConfig::json);

    match profile.shape {
        RequestShape::SingleShot => GenerateRequest {
            system_instruction: None,
            contents: vec![Content::user(prompt)],
            generation_config,
        },
        RequestShape::Multimodal => {
            let parts = current_turn_parts(http, message, attachments).await;
            if parts.is_empty() {
                // No message and nothing fetched; send the instruction as
                // the turn itself so the provider still has one content
                GenerateRequest {
                    system_instruction: None,
                    contents: vec![Content::user(prompt)],
                    generation_config,
                }
            } else {
                GenerateRequest {
                    system_instruction: Some(SystemInstruction::new(prompt)),
                    contents: vec![Content {
                        role: "user".to_string(),
                        parts,
                    }],
                    generation_config,
                }
            }
        }
        RequestShape::Conversational => {
            let mut contents: Vec<Content> = history.map(<[Content]>::to_vec).unwrap_or_default();
            let parts = current_turn_parts(http, message, attachments).await;
            if !parts.is_empty() {
                contents.push(Content {
                    role: "user".to_string(),
                    parts,
                });
            }
            GenerateRequest {
                system_instruction: Some(SystemInstruction::new(prompt)),
                contents,
                generation_config,
            }
        }
    }
}

/// Message text plus every attachment that could be fetched and inlined
async fn current_turn_parts(
    http: &reqwest::Client,
    message: Option<&str>,
    attachments: Option<&[Attachment]>,
) -> Vec<Part> {
    let mut parts = Vec::new();

    if let Some(message) = message {
        if !message.is_empty() {
            parts.push(Part::text(message));
        }
    }

    for attachment in attachments.unwrap_or_default() {
        if attachment.public_url.is_empty() {
            continue;
        }
        match fetch_inline(http, attachment).await {
            Ok(part) => parts.push(part),
            Err(err) => warn!(url = %attachment.public_url, %err, "skipping attachment"),
        }
    }

    parts
}

async fn fetch_inline(http: &reqwest::Client, attachment: &Attachment) -> Result<Part> {
    debug!(url = %attachment.public_url, "fetching attachment");
    let response = http.get(&attachment.public_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Other(format!("attachment fetch returned {status}")));
    }
    let bytes = response.bytes().await?;
    Ok(Part::inline_data(
        &attachment.mime_type,
        STANDARD.encode(&bytes),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    const IMAGE_BYTES: &[u8] = b"\x89PNG fake image payload";

    async fn spawn_file_server() -> String {
        let app = Router::new()
            .route("/meal.png", get(|| async { IMAGE_BYTES.to_vec() }))
            .route(
                "/missing.png",
                get(|| async { (StatusCode::NOT_FOUND, "gone") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn history_fixture() -> Vec<Content> {
        vec![
            Content {
                role: "user".to_string(),
                parts: vec![Part::text("I want to get fitter")],
            },
            Content {
                role: "model".to_string(),
                parts: vec![Part::text("Great, let's start with your goal.")],
            },
        ]
    }

    #[tokio::test]
    async fn test_single_shot_sends_prompt_as_sole_user_turn() {
        let http = reqwest::Client::new();
        let profile = Mode::Plan.profile();
        let history = history_fixture();
        let request = build_request(
            &http,
            &profile,
            "PLAN PROMPT",
            Some("ignored message"),
            Some(&history),
            None,
        )
        .await;

        assert!(request.system_instruction.is_none());
        assert_eq!(request.contents, vec![Content::user("PLAN PROMPT")]);
        assert_eq!(
            request.generation_config,
            Some(GenerationConfig::json())
        );
    }

    #[tokio::test]
    async fn test_title_single_shot_has_no_generation_config() {
        let http = reqwest::Client::new();
        let profile = Mode::Title.profile();
        let request = build_request(&http, &profile, "TITLE PROMPT", None, None, None).await;

        assert!(request.generation_config.is_none());
        assert_eq!(request.contents.len(), 1);
    }

    #[tokio::test]
    async fn test_conversational_preserves_history_order_and_roles() {
        let http = reqwest::Client::new();
        let profile = Mode::Chat.profile();
        let history = history_fixture();
        let request = build_request(
            &http,
            &profile,
            "SYSTEM PROMPT",
            Some("what next?"),
            Some(&history),
            None,
        )
        .await;

        assert_eq!(
            request.system_instruction,
            Some(SystemInstruction::new("SYSTEM PROMPT"))
        );
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[1].role, "model");
        assert_eq!(
            request.contents[1].parts[0].as_text(),
            Some("Great, let's start with your goal.")
        );
        assert_eq!(request.contents[2].parts[0].as_text(), Some("what next?"));
        assert!(request.generation_config.is_none());
    }

    #[tokio::test]
    async fn test_conversational_skips_empty_current_turn() {
        let http = reqwest::Client::new();
        let profile = Mode::Chat.profile();
        let history = history_fixture();
        let request =
            build_request(&http, &profile, "SYSTEM PROMPT", None, Some(&history), None).await;

        assert_eq!(request.contents.len(), 2);
    }

    #[tokio::test]
    async fn test_multimodal_inlines_fetched_attachment_after_text() {
        let base_url = spawn_file_server().await;
        let http = reqwest::Client::new();
        let profile = Mode::AnalyzeMeal.profile();
        let attachments = vec![Attachment {
            mime_type: "image/png".to_string(),
            public_url: format!("{base_url}/meal.png"),
        }];

        let request = build_request(
            &http,
            &profile,
            "ANALYSIS PROMPT",
            Some("my lunch"),
            None,
            Some(&attachments),
        )
        .await;

        assert_eq!(
            request.system_instruction,
            Some(SystemInstruction::new("ANALYSIS PROMPT"))
        );
        assert_eq!(request.contents.len(), 1);
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text(), Some("my lunch"));
        assert_eq!(
            parts[1],
            Part::inline_data("image/png", STANDARD.encode(IMAGE_BYTES))
        );
        assert_eq!(
            request.generation_config,
            Some(GenerationConfig::json())
        );
    }

    #[tokio::test]
    async fn test_multimodal_skips_unfetchable_attachment() {
        let base_url = spawn_file_server().await;
        let http = reqwest::Client::new();
        let profile = Mode::AnalyzeMeal.profile();
        let attachments = vec![
            Attachment {
                mime_type: "image/png".to_string(),
                public_url: format!("{base_url}/missing.png"),
            },
            Attachment {
                mime_type: "image/png".to_string(),
                public_url: format!("{base_url}/meal.png"),
            },
        ];

        let request = build_request(
            &http,
            &profile,
            "ANALYSIS PROMPT",
            Some("my lunch"),
            None,
            Some(&attachments),
        )
        .await;

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[1], Part::InlineData { .. }));
    }

    #[tokio::test]
    async fn test_multimodal_without_inputs_degrades_to_single_shot() {
        let http = reqwest::Client::new();
        let profile = Mode::AnalyzeMeal.profile();
        let request = build_request(&http, &profile, "ANALYSIS PROMPT", None, None, None).await;

        assert!(request.system_instruction.is_none());
        assert_eq!(request.contents, vec![Content::user("ANALYSIS PROMPT")]);
    }

    #[tokio::test]
    async fn test_attachment_with_blank_url_is_ignored() {
        let http = reqwest::Client::new();
        let profile = Mode::Chat.profile();
        let attachments = vec![Attachment {
            mime_type: "image/png".to_string(),
            public_url: String::new(),
        }];

        let request = build_request(
            &http,
            &profile,
            "SYSTEM PROMPT",
            Some("hello"),
            None,
            Some(&attachments),
        )
        .await;

        assert_eq!(request.contents[0].parts.len(), 1);
    }
}
