//! OpenAI completions API (`gpt-3` backend)

use super::GenerationParams;
use crate::filemap::{Completion, END_OF_SEQUENCE};
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";

/// Upper bound the completions endpoint accepts for `n`.
pub const MAX_COMPLETIONS: u32 = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl OpenAiConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            org_id: None,
            url: default_url(),
            model: default_model(),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/completions", self.url.trim_end_matches('/'))
    }
}

/// Body of a `POST /completions` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub n: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

impl CompletionRequest {
    pub fn new(config: &OpenAiConfig, prompt: &str, params: &GenerationParams) -> Self {
        Self {
            model: config.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: params.max_tokens,
            n: params.completions.clamp(1, MAX_COMPLETIONS),
            temperature: 0.0,
            top_p: 1.0,
            stop: vec![END_OF_SEQUENCE.to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// Choices in `index` order.
    ///
    /// The API strips the stop sequence from the text, so a `stop` finish
    /// reason is carried as a flag and the text is left as returned.
    pub fn into_completions(mut self) -> Vec<Completion> {
        self.choices.sort_by_key(|choice| choice.index);
        self.choices
            .into_iter()
            .map(|choice| match choice.finish_reason.as_deref() {
                Some("stop") => Completion::stopped(choice.text),
                _ => Completion::from(choice.text),
            })
            .collect()
    }
}
