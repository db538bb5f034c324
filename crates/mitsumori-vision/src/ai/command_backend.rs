//! InferenceBackend that forwards requests to an external command
//!
//! The command is run as `<command> generate` or `<command> chat`. The request
//! JSON is written to its stdin. For `generate` the whole stdout is one response
//! JSON (markdown fences allowed); for `chat` every stdout line is a
//! `{"text": "..."}` fragment.

use std::io::{BufRead, BufReader, Lines, Read, Write};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use mitsumori_types::{ConfigError, InferenceError, Result};
use serde::Serialize;

use super::backend::{ChatStream, InferenceBackend};
use super::request::{ChatChunk, ChatRequest, GenerateContentRequest, GenerateContentResponse};
use crate::extract_json_from_response;

pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Parse a shell-style command line, e.g. `node bridge.js --region asia`
    pub fn new(command_line: &str) -> Result<Self> {
        let mut parts = shell_words::split(command_line)
            .map_err(|e| ConfigError::ParseError(format!("backend command: {}", e)))?;
        if parts.is_empty() {
            return Err(ConfigError::Missing("backend command".to_string()).into());
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }

    fn spawn<T: Serialize>(&self, mode: &str, request: &T) -> Result<Child> {
        let payload = serde_json::to_vec(request)?;
        tracing::debug!(program = %self.program, mode, bytes = payload.len(), "spawning backend");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(mode)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| InferenceError::Command(format!("{}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| InferenceError::Command("stdin unavailable".to_string()))?;
        // stdin is fed from its own thread while the caller drains stdout
        thread::spawn(move || {
            if let Err(e) = stdin.write_all(&payload) {
                tracing::warn!("failed to write backend request: {}", e);
            }
        });
        Ok(child)
    }
}

impl InferenceBackend for CommandBackend {
    fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let output = self.spawn("generate", request)?.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InferenceError::Command(format!(
                "exit {}: {}",
                output.status,
                stderr.trim()
            ))
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json = extract_json_from_response(&stdout);
        serde_json::from_str(&json).map_err(|e| {
            InferenceError::InvalidResponse(format!("{} - response: {}", e, json)).into()
        })
    }

    fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        let mut child = self.spawn("chat", request)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| InferenceError::Command("stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| InferenceError::Command("stderr unavailable".to_string()))?;
        Ok(Box::new(CommandChatStream {
            child,
            lines: BufReader::new(stdout).lines(),
            stderr: Some(drain(stderr)),
            finished: false,
        }))
    }
}

/// Collect a pipe on its own thread so the child never blocks on it
fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut bytes) {
            tracing::warn!("failed to read backend stderr: {}", e);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

/// Reads fragments line by line; the exit status is checked once stdout ends.
struct CommandChatStream {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

impl CommandChatStream {
    fn finish(&mut self) -> Option<Result<String>> {
        self.finished = true;
        let status = self.child.wait();
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        match status {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(InferenceError::Stream(format!(
                "backend exited with {}: {}",
                status,
                stderr.trim()
            ))
            .into())),
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl Iterator for CommandChatStream {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.lines.next() {
                None => return self.finish(),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => {
                    return match serde_json::from_str::<ChatChunk>(&line) {
                        Ok(chunk) => Some(Ok(chunk.text)),
                        Err(e) => {
                            self.finished = true;
                            Some(Err(InferenceError::Stream(format!(
                                "bad fragment {:?}: {}",
                                line, e
                            ))
                            .into()))
                        }
                    }
                }
            }
        }
    }
}

impl Drop for CommandChatStream {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
