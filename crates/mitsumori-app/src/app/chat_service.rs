//! Chat assistants (usage help, sales coaching)

use mitsumori_types::Result;
use mitsumori_vision::{build_chat_prompt, stream_chat, AssistantKind, ChatTurn, InferenceBackend, InferenceConfig};

/// One conversation with an assistant persona
#[derive(Debug, Clone)]
pub struct ChatAssistant {
    kind: AssistantKind,
    history: Vec<ChatTurn>,
}

impl ChatAssistant {
    pub fn new(kind: AssistantKind) -> Self {
        Self {
            kind,
            history: Vec::new(),
        }
    }

    pub fn kind(&self) -> AssistantKind {
        self.kind
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Ask a question, passing each streamed fragment to `on_chunk`.
    ///
    /// Both turns are appended only after the stream completed; on error the
    /// history is unchanged.
    pub fn ask(
        &mut self,
        backend: &dyn InferenceBackend,
        config: &InferenceConfig,
        question: &str,
        mut on_chunk: impl FnMut(&str),
    ) -> Result<String> {
        let prompt = build_chat_prompt(self.kind, &self.history, question);
        let mut answer = String::new();
        for chunk in stream_chat(backend, config, &prompt)? {
            let chunk = chunk?;
            on_chunk(&chunk);
            answer.push_str(&chunk);
        }

        tracing::debug!(kind = ?self.kind, chars = answer.chars().count(), "chat answer complete");
        self.history.push(ChatTurn::user(question.trim()));
        self.history.push(ChatTurn::assistant(answer.clone()));
        Ok(answer)
    }
}
