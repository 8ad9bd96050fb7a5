//! OpenAI-compatible chat completion wire types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a `/chat/completions` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Request in incremental (token-chunked) mode
    pub fn streaming(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

/// One `data:` payload of a streamed completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// Chunk carrying a content delta
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            id: None,
            choices: vec![ChunkChoice {
                index: 0,
                delta: Some(ChunkDelta {
                    role: None,
                    content: Some(content.into()),
                }),
                finish_reason: None,
            }],
        }
    }

    /// Terminal chunk with `finish_reason: "stop"`
    pub fn stop() -> Self {
        Self {
            id: None,
            choices: vec![ChunkChoice {
                index: 0,
                delta: Some(ChunkDelta::default()),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChunkChoice {
    pub fn is_stop(&self) -> bool {
        self.finish_reason.as_deref() == Some("stop")
    }

    /// Delta text, `None` for role-only or null content
    pub fn content(&self) -> Option<&str> {
        self.delta.as_ref().and_then(|d| d.content.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
