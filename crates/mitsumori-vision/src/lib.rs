//! Vision module - AI rendering of renovation results and quotation estimation

pub mod ai;
pub mod chat;
pub mod presets;

// Re-export main types for convenience
pub use ai::backend::{ChatStream, InferenceBackend};
pub use ai::command_backend::CommandBackend;
pub use ai::prompts::{
    build_chat_prompt, build_help_prompt, build_quotation_prompt, build_renovation_prompt,
    build_sales_coach_prompt, ProductReference, RenderOptions,
};
pub use ai::request::{
    mime_type_for_path, ChatRequest, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, InlineData, Part,
};
pub use chat::{AssistantKind, ChatRole, ChatTurn};
pub use presets::{find_preset, presets_for, StylePreset, PRESETS};

use mitsumori_types::{InferenceError, ItemMaster, QuotationResult, RenovationScope, Result};

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Model selection for inference calls
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub image_model: String,
    pub chat_model: String,
    pub temperature: Option<f32>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: None,
        }
    }
}

impl InferenceConfig {
    pub fn with_image_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.image_model = model;
        }
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Generate the "after" image for a before photo.
///
/// The response must finish with STOP and carry an inline image part.
pub fn render_after_image(
    backend: &dyn InferenceBackend,
    config: &InferenceConfig,
    before: &InlineData,
    preset: &StylePreset,
    options: &RenderOptions,
) -> Result<InlineData> {
    let prompt = build_renovation_prompt(preset, options);
    let request = GenerateContentRequest::new(
        &config.image_model,
        vec![Part::inline(before.clone()), Part::text(prompt)],
    )
    .with_config(GenerationConfig {
        response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        temperature: config.temperature,
        response_mime_type: None,
    });

    tracing::info!(preset = preset.id, model = %config.image_model, "requesting rendering");
    let response = backend.generate(&request)?;
    let image = response.image()?.clone();
    tracing::debug!(mime = %image.mime_type, "rendering received");
    Ok(image)
}

/// Estimate construction items from a before/after image pair
pub fn estimate_quotation(
    backend: &dyn InferenceBackend,
    config: &InferenceConfig,
    before: &InlineData,
    after: &InlineData,
    scope: RenovationScope,
    item_masters: &[ItemMaster],
) -> Result<QuotationResult> {
    let prompt = build_quotation_prompt(scope, item_masters);
    let request = GenerateContentRequest::new(
        &config.chat_model,
        vec![
            Part::inline(before.clone()),
            Part::inline(after.clone()),
            Part::text(prompt),
        ],
    )
    .with_config(GenerationConfig {
        response_modalities: Vec::new(),
        temperature: config.temperature,
        response_mime_type: Some("application/json".to_string()),
    });

    tracing::info!(scope = scope.label(), masters = item_masters.len(), "requesting quotation");
    let response = backend.generate(&request)?;
    let text = response.text()?;
    parse_quotation_response(&text)
}

/// Parse the model's quotation answer (JSON, optionally fenced)
pub fn parse_quotation_response(response: &str) -> Result<QuotationResult> {
    let json_str = extract_json_from_response(response);
    serde_json::from_str(&json_str).map_err(|e| {
        let truncated: String = response.chars().take(500).collect();
        InferenceError::InvalidResponse(format!("{} | raw: {}", e, truncated)).into()
    })
}

/// Start a streaming chat completion for a fully built prompt
pub fn stream_chat(
    backend: &dyn InferenceBackend,
    config: &InferenceConfig,
    prompt: &str,
) -> Result<ChatStream> {
    let request = ChatRequest {
        model: config.chat_model.clone(),
        contents: prompt.to_string(),
    };
    backend.chat_stream(&request)
}

/// Extract JSON from response (handles markdown code blocks)
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(end);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if start < end {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitsumori_types::Error;
    use std::sync::Mutex;

    /// Replays canned responses and records the requests it saw
    struct FakeBackend {
        response: String,
        chunks: Vec<String>,
        seen: Mutex<Vec<GenerateContentRequest>>,
    }

    impl FakeBackend {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                chunks: Vec::new(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl InferenceBackend for FakeBackend {
        fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(serde_json::from_str(&self.response)?)
        }

        fn chat_stream(&self, _request: &ChatRequest) -> Result<ChatStream> {
            Ok(Box::new(self.chunks.clone().into_iter().map(Ok)))
        }
    }

    fn before_image() -> InlineData {
        InlineData::from_bytes("image/jpeg", b"before")
    }

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"items\": []}\n```";
        assert_eq!(extract_json_from_response(response), "{\"items\": []}");
    }

    #[test]
    fn test_extract_json_plain() {
        let response = "{\"notes\": \"x\"}";
        assert_eq!(extract_json_from_response(response), response);
    }

    #[test]
    fn test_extract_json_with_text() {
        let response = "見積結果です: {\"notes\": \"x\"} 以上";
        assert_eq!(extract_json_from_response(response), "{\"notes\": \"x\"}");
    }

    #[test]
    fn test_render_sends_image_and_modalities() {
        let backend = FakeBackend::new(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"YWZ0ZXI="}}]},"finishReason":"STOP"}]}"#,
        );
        let preset = find_preset("modern").unwrap();
        let image = render_after_image(
            &backend,
            &InferenceConfig::default(),
            &before_image(),
            preset,
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(image.decode().unwrap(), b"after");

        let seen = backend.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(request.contents[0].parts[0].inline_data, Some(before_image()));
        assert_eq!(
            request.config.as_ref().unwrap().response_modalities,
            vec!["TEXT", "IMAGE"]
        );
    }

    #[test]
    fn test_render_rejects_blocked_response() {
        let backend = FakeBackend::new(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = render_after_image(
            &backend,
            &InferenceConfig::default(),
            &before_image(),
            find_preset("natural").unwrap(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Inference(InferenceError::Blocked(_))));
    }

    #[test]
    fn test_estimate_parses_fenced_answer() {
        let answer = "```json\n{\"items\":[{\"name\":\"クロス張替え\",\"cost_range\":\"5万円〜8万円\"}],\"total_cost_range\":\"5万円〜8万円\",\"notes\":\"家具移動は別途\"}\n```";
        let response = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": answer}]}, "finishReason": "STOP"}]
        });
        let backend = FakeBackend::new(&response.to_string());
        let after = InlineData::from_bytes("image/png", b"after");
        let result = estimate_quotation(
            &backend,
            &InferenceConfig::default(),
            &before_image(),
            &after,
            RenovationScope::Interior,
            &[],
        )
        .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].cost_range, "5万円〜8万円");
        assert_eq!(result.notes, "家具移動は別途");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].contents[0].parts.len(), 3);
    }

    #[test]
    fn test_unparseable_quotation_is_invalid_response() {
        let err = parse_quotation_response("申し訳ありません、画像を判別できません").unwrap_err();
        assert!(matches!(err, Error::Inference(InferenceError::InvalidResponse(_))));
    }

    #[test]
    fn test_stream_chat_passes_fragments() {
        let mut backend = FakeBackend::new("{}");
        backend.chunks = vec!["外壁の".to_string(), "ご提案です".to_string()];
        let text: String = stream_chat(&backend, &InferenceConfig::default(), "q")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(text, "外壁のご提案です");
    }
}
