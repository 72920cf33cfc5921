//! Ollama API client implementation
//!
//! Implements the InferenceClient trait against Ollama's `/api/generate`
//! endpoint, for both single-shot and newline-delimited streaming replies.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::{ClientError, Generation, InferenceClient, ModelInfo, StreamChunk, TokenUsage};
use crate::config::{LlmConfig, RuntimeOptions};

/// Ollama API client bound to one model and temperature
#[derive(Debug)]
pub struct OllamaClient {
    model: String,
    base_url: Url,
    http: Client,
    temperature: f32,
    options: RuntimeOptions,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration
    ///
    /// No request is made here; an unreachable runtime is reported by the
    /// first call instead.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ClientError> {
        debug!(?config, "from_config: called");
        if config.model.trim().is_empty() {
            return Err(ClientError::Connection("model identifier is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&config.temperature) {
            return Err(ClientError::Connection(format!(
                "temperature {} is outside 0.0..=1.0",
                config.temperature
            )));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Connection(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Connection(format!(
                "unsupported URL scheme '{}'",
                base_url.scheme()
            )));
        }

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            model: config.model.clone(),
            base_url,
            http,
            temperature: config.temperature,
            options: config.options.clone(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Build the request body for `/api/generate`
    fn build_request_body(&self, prompt: &str, stream: bool) -> serde_json::Value {
        debug!(%self.model, stream, "build_request_body: called");
        serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": stream,
            "options": self.runtime_options(),
        })
    }

    /// Map configured tuning onto Ollama `options`
    fn runtime_options(&self) -> serde_json::Value {
        let mut options = serde_json::json!({ "temperature": self.temperature });
        if let Some(threads) = self.options.threads {
            options["num_thread"] = serde_json::json!(threads);
        }
        if let Some(mmap) = self.options.mmap {
            options["use_mmap"] = serde_json::json!(mmap);
        }
        // Ollama offloads to GPU by default; zero layers keeps it on CPU
        if self.options.gpu == Some(false) {
            options["num_gpu"] = serde_json::json!(0);
        }
        options
    }

    async fn post_generate(&self, prompt: &str, stream: bool) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint("api/generate");
        let body = self.build_request_body(prompt, stream);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "post_generate: API error");
            return Err(ClientError::Api {
                status,
                message: error_message(&text),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<Generation, ClientError> {
        debug!(%self.model, prompt_len = prompt.len(), "generate: called");
        let response = self.post_generate(prompt, false).await?;

        let text = response
            .text()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;
        let reply: GenerateReply = serde_json::from_str(&text)?;

        if let Some(error) = reply.error {
            return Err(ClientError::Runtime(error));
        }
        if !reply.done {
            return Err(ClientError::InvalidResponse("reply not marked done".to_string()));
        }

        debug!("generate: success");
        let usage = reply.usage();
        Ok(Generation {
            text: reply.response,
            usage,
        })
    }

    async fn stream(&self, prompt: &str, chunk_tx: mpsc::Sender<StreamChunk>) -> Result<Generation, ClientError> {
        debug!(%self.model, prompt_len = prompt.len(), "stream: called");
        let response = self.post_generate(prompt, true).await?;

        let mut stream = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut full_text = String::new();
        let mut usage = None;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| ClientError::from_transport(e, self.timeout))?;
            lines.push(&chunk);

            while let Some(line) = lines.next_line() {
                if let Some(done_usage) = self.handle_line(&line, &mut full_text, &chunk_tx).await? {
                    usage = Some(done_usage);
                }
            }
        }

        // Final object without a trailing newline
        if let Some(rest) = lines.finish()
            && let Some(done_usage) = self.handle_line(&rest, &mut full_text, &chunk_tx).await?
        {
            usage = Some(done_usage);
        }

        let Some(usage) = usage else {
            return Err(ClientError::InvalidResponse(
                "stream ended before the runtime reported completion".to_string(),
            ));
        };

        let _ = chunk_tx.send(StreamChunk::Done { usage }).await;
        debug!(len = full_text.len(), "stream: success");
        Ok(Generation { text: full_text, usage })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ClientError> {
        debug!("list_models: called");
        let response = self
            .http
            .get(self.endpoint("api/tags"))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: error_message(&text),
            });
        }

        let tags: TagsReply = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(tags.models)
    }
}

impl OllamaClient {
    /// Process one NDJSON line; returns usage once the runtime reports done
    async fn handle_line(
        &self,
        line: &[u8],
        full_text: &mut String,
        chunk_tx: &mpsc::Sender<StreamChunk>,
    ) -> Result<Option<TokenUsage>, ClientError> {
        let line = std::str::from_utf8(line)
            .map_err(|e| ClientError::InvalidResponse(format!("non UTF-8 stream line: {}", e)))?
            .trim();
        if line.is_empty() {
            return Ok(None);
        }

        let reply: GenerateReply = serde_json::from_str(line)?;
        if let Some(error) = reply.error {
            return Err(ClientError::Runtime(error));
        }

        if !reply.response.is_empty() {
            // Diagnostic copy of every partial token
            trace!(delta = %reply.response, "stream: token");
            full_text.push_str(&reply.response);
            let _ = chunk_tx.send(StreamChunk::TextDelta(reply.response.clone())).await;
        }

        Ok(reply.done.then(|| reply.usage()))
    }
}

/// Accumulates raw stream bytes and yields complete NDJSON lines
///
/// Lines are only cut at `\n`, so a multi-byte character split across
/// network chunks is decoded whole.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Next complete line including its terminator
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let line_end = self.bytes.iter().position(|b| *b == b'\n')?;
        Some(self.bytes.drain(..=line_end).collect())
    }

    /// Whatever is left once the stream closes
    fn finish(self) -> Option<Vec<u8>> {
        (!self.bytes.is_empty()).then_some(self.bytes)
    }
}

/// Pull the `error` field out of an Ollama error body, or use the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorReply>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

// Ollama API response types

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl GenerateReply {
    fn usage(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_eval_count.unwrap_or(0),
            output_tokens: self.eval_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(options: RuntimeOptions) -> OllamaClient {
        let config = LlmConfig {
            options,
            ..LlmConfig::default()
        };
        OllamaClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = client_with(RuntimeOptions::default());
        let body = client.build_request_body("hello", false);

        assert_eq!(body["model"], "deepseek-r1:1.5b");
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["stream"], false);
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(body["options"].get("num_thread").is_none());
        assert!(body["options"].get("num_gpu").is_none());
    }

    #[test]
    fn test_runtime_options_mapping() {
        let client = client_with(RuntimeOptions {
            gpu: Some(false),
            threads: Some(8),
            mmap: Some(true),
        });
        let options = client.runtime_options();

        assert_eq!(options["num_thread"], 8);
        assert_eq!(options["use_mmap"], true);
        assert_eq!(options["num_gpu"], 0);
    }

    #[test]
    fn test_gpu_enabled_leaves_default_offload() {
        let client = client_with(RuntimeOptions {
            gpu: Some(true),
            ..RuntimeOptions::default()
        });
        assert!(client.runtime_options().get("num_gpu").is_none());
    }

    #[test]
    fn test_from_config_rejects_bad_settings() {
        let bad_url = LlmConfig {
            base_url: "not a url".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            OllamaClient::from_config(&bad_url),
            Err(ClientError::Connection(_))
        ));

        let bad_scheme = LlmConfig {
            base_url: "ftp://localhost:11434".to_string(),
            ..LlmConfig::default()
        };
        assert!(OllamaClient::from_config(&bad_scheme).is_err());

        let empty_model = LlmConfig {
            model: String::new(),
            ..LlmConfig::default()
        };
        assert!(OllamaClient::from_config(&empty_model).is_err());

        let hot = LlmConfig {
            temperature: 1.2,
            ..LlmConfig::default()
        };
        assert!(OllamaClient::from_config(&hot).is_err());
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..LlmConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint("api/generate"), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":"model 'x' not found, try pulling it first"}"#),
            "model 'x' not found, try pulling it first"
        );
        assert_eq!(error_message("  plain failure \n"), "plain failure");
    }

    #[tokio::test]
    async fn test_handle_line_accumulates_and_detects_done() {
        let client = client_with(RuntimeOptions::default());
        let (tx, mut rx) = mpsc::channel(8);
        let mut text = String::new();

        let first = client
            .handle_line(r#"{"response":"안녕","done":false}"#.as_bytes(), &mut text, &tx)
            .await
            .unwrap();
        assert!(first.is_none());

        let last = client
            .handle_line(
                br#"{"response":"","done":true,"prompt_eval_count":12,"eval_count":3}"#,
                &mut text,
                &tx,
            )
            .await
            .unwrap();
        assert_eq!(
            last,
            Some(TokenUsage {
                prompt_tokens: 12,
                output_tokens: 3
            })
        );
        assert_eq!(text, "안녕");
        assert_eq!(rx.recv().await, Some(StreamChunk::TextDelta("안녕".to_string())));
    }

    #[tokio::test]
    async fn test_line_buffer_keeps_hangul_split_across_chunks() {
        let client = client_with(RuntimeOptions::default());
        let (tx, _rx) = mpsc::channel(8);
        let mut text = String::new();

        let line = "{\"response\":\"안녕\",\"done\":false}\n".as_bytes();
        // '안' is three bytes; cut after its first byte
        let cut = line.iter().position(|b| *b >= 0x80).unwrap() + 1;

        let mut lines = LineBuffer::default();
        lines.push(&line[..cut]);
        assert!(lines.next_line().is_none());
        assert!(std::str::from_utf8(&line[..cut]).is_err());

        lines.push(&line[cut..]);
        let whole = lines.next_line().unwrap();
        assert_eq!(whole, line);
        assert!(lines.next_line().is_none());
        assert!(lines.finish().is_none());

        client.handle_line(&whole, &mut text, &tx).await.unwrap();
        assert_eq!(text, "안녕");
    }

    #[test]
    fn test_line_buffer_returns_unterminated_tail() {
        let mut lines = LineBuffer::default();
        lines.push(b"{\"done\":true}\n{\"done\":");
        lines.push(b"true}");

        assert_eq!(lines.next_line().unwrap(), b"{\"done\":true}\n");
        assert!(lines.next_line().is_none());
        assert_eq!(lines.finish().unwrap(), b"{\"done\":true}");
    }

    #[tokio::test]
    async fn test_handle_line_surfaces_runtime_error() {
        let client = client_with(RuntimeOptions::default());
        let (tx, _rx) = mpsc::channel(8);
        let mut text = String::new();

        let result = client
            .handle_line(br#"{"error":"out of memory"}"#, &mut text, &tx)
            .await;
        assert!(matches!(result, Err(ClientError::Runtime(msg)) if msg == "out of memory"));
    }
}
