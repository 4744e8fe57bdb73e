//! vq-core - Core library for the VitalQuest coach agent
//!
//! This crate provides everything between the HTTP surface and the
//! generative backend:
//!
//! - **provider**: Gemini-style generateContent/embedContent client
//! - **mode**: coaching modes and their dispatch profiles
//! - **prompt**: per-mode prompt composition
//! - **request**: provider request assembly (single-shot, multimodal, chat)
//! - **memory**: fact model, store trait, REST adapter, remember/recall
//! - **extract**: fact extraction from user messages

pub mod error;
pub mod extract;
pub mod memory;
pub mod mode;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use mode::Mode;
pub use provider::GeminiClient;
