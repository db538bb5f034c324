//! Generation and chat request/response shapes (camelCase JSON)

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mitsumori_types::{Error, InferenceError, Result};
use serde::{Deserialize, Serialize};

pub const FINISH_REASON_STOP: &str = "STOP";

/// Base64 image payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl InlineData {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Read an image file, inferring the MIME type from its extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for_path(path)
            .ok_or_else(|| Error::InvalidImageFormat(path.display().to_string()))?;
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(mime_type, &bytes))
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| InferenceError::InvalidResponse(format!("bad image data: {}", e)).into())
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(data: InlineData) -> Self {
        Self {
            text: None,
            inline_data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub model: String,
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// One user turn made of the given parts
    pub fn new(model: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            model: model.into(),
            contents: vec![Content { role: None, parts }],
            config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Content of the first candidate, provided generation finished normally
    pub fn completed_content(&self) -> std::result::Result<&Content, InferenceError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(InferenceError::Blocked(reason.clone()));
        }
        let candidate = self.candidates.first().ok_or(InferenceError::NoCandidates)?;
        match candidate.finish_reason.as_deref() {
            Some(FINISH_REASON_STOP) => {}
            other => {
                return Err(InferenceError::UnexpectedFinish(
                    other.unwrap_or("none").to_string(),
                ))
            }
        }
        candidate
            .content
            .as_ref()
            .ok_or(InferenceError::MissingPart("content"))
    }

    /// First inline image of a completed response
    pub fn image(&self) -> std::result::Result<&InlineData, InferenceError> {
        self.completed_content()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .ok_or(InferenceError::MissingPart("image"))
    }

    /// Concatenated text of a completed response
    pub fn text(&self) -> std::result::Result<String, InferenceError> {
        let text: String = self
            .completed_content()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Err(InferenceError::MissingPart("text"));
        }
        Ok(text)
    }
}

/// Streaming chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub contents: String,
}

/// One streamed fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub text: String,
}
