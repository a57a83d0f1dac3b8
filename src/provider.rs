use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ModelOptions;
use crate::error::InferenceError;

/// Everything the inference service needs for one completion.
#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub system: Option<&'a str>,
    pub options: &'a ModelOptions,
}

/// Inference capability used by the pipeline.
pub trait Inference {
    /// Run one completion and return the raw reply text.
    fn generate(&self, request: &InferenceRequest<'_>) -> Result<String, InferenceError>;
}

/// [`Inference`] backed by an Ollama server's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    host: String,
    show_spinner: bool,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            show_spinner: true,
        }
    }

    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.host)
    }
}

impl Inference for OllamaClient {
    fn generate(&self, request: &InferenceRequest<'_>) -> Result<String, InferenceError> {
        let url = self.endpoint();
        let body = build_request_body(request);
        debug!(url = %url, model = request.model, "sending generate request");

        let spinner = if self.show_spinner {
            start_spinner(request.model)
        } else {
            ProgressBar::hidden()
        };

        let response = ureq::post(&url)
            .set("Content-Type", "application/json")
            .send_json(&body);

        spinner.finish_and_clear();

        let response = response.map_err(|e| match e {
            ureq::Error::Status(code, resp) => {
                let body = resp.into_string().unwrap_or_default();
                InferenceError::Status {
                    code,
                    body: error_detail(&body),
                }
            }
            ureq::Error::Transport(t) => InferenceError::Transport(t.to_string()),
        })?;

        let json: Value = response.into_json().map_err(|e| {
            InferenceError::InvalidResponse(format!("body is not valid JSON: {e}"))
        })?;

        let reply = response_text(&json)?;
        info!(chars = reply.len(), "received model reply");
        Ok(reply)
    }
}

fn start_spinner(model: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Generating commit message with {model}..."));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn build_request_body(request: &InferenceRequest<'_>) -> Value {
    let options = request.options;
    let mut body = serde_json::json!({
        "model": request.model,
        "prompt": request.prompt,
        "stream": false,
        "options": {
            "temperature": options.temperature(),
            "top_p": options.top_p(),
            "top_k": options.top_k(),
            "num_predict": options.max_output_tokens()
        }
    });
    if let Some(system) = request.system {
        body["system"] = Value::String(system.to_string());
    }
    body
}

/// Ollama reports failures as `{"error": "..."}`; fall back to the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// The generated text lives in the top-level `response` string.
fn response_text(json: &Value) -> Result<String, InferenceError> {
    match json.get("response") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(InferenceError::InvalidResponse(
            "'response' is not a string".to_string(),
        )),
        None => Err(InferenceError::InvalidResponse(format!(
            "missing 'response' in {json}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_options_and_optional_system() {
        let options = ModelOptions::new(0.3, 0.8, 12, -1).unwrap();
        let request = InferenceRequest {
            model: "m",
            prompt: "p",
            system: None,
            options: &options,
        };
        let body = build_request_body(&request);
        assert_eq!(body["stream"], Value::Bool(false));
        assert_eq!(body["options"]["top_k"], 12);
        assert_eq!(body["options"]["num_predict"], -1);
        assert!(body.get("system").is_none());

        let with_system = InferenceRequest {
            system: Some("be brief"),
            ..request
        };
        assert_eq!(build_request_body(&with_system)["system"], "be brief");
    }

    #[test]
    fn error_detail_prefers_json_error_field() {
        assert_eq!(
            error_detail(r#"{"error":"model 'x' not found"}"#),
            "model 'x' not found"
        );
        assert_eq!(error_detail(" plain text \n"), "plain text");
    }

    #[test]
    fn response_text_requires_a_string_field() {
        let json = serde_json::json!({"response": "<summary>hi</summary>", "done": true});
        assert_eq!(response_text(&json).unwrap(), "<summary>hi</summary>");
        assert!(response_text(&serde_json::json!({"response": 3})).is_err());
        assert!(response_text(&serde_json::json!({"done": true})).is_err());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
    }
}
