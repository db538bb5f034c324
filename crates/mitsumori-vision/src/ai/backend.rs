//! Backend seam for the AI inference endpoint

use mitsumori_types::Result;

use super::request::{ChatRequest, GenerateContentRequest, GenerateContentResponse};

/// Incremental chat text, consumed in order
pub type ChatStream = Box<dyn Iterator<Item = Result<String>> + Send>;

/// An AI inference endpoint.
///
/// Calls are blocking and not retried. Validation of the generation response
/// (finish reason, block reason, missing parts) is left to the caller.
pub trait InferenceBackend {
    fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse>;

    fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream>;
}
