//! Hugging Face inference API serving BLOOM (`bloom` backend)

use super::GenerationParams;
use crate::filemap::Completion;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "https://api-inference.huggingface.co/models/bigscience/bloom";

/// Largest `max_new_tokens` the hosted inference API accepts.
pub const DEFAULT_TOKEN_SIZE: u32 = 250;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomConfig {
    pub api_key: String,
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

impl BloomConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: default_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub inputs: String,
    pub parameters: GenerateParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateParameters {
    pub seed: u32,
    pub early_stopping: bool,
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub top_p: f32,
    pub return_full_text: bool,
}

impl GenerateRequest {
    /// Sampling stays off; the seed only varies generation and is drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(prompt: &str, params: &GenerationParams, rng: &mut R) -> Self {
        Self {
            inputs: prompt.to_string(),
            parameters: GenerateParameters {
                seed: rng.gen_range(0..100),
                early_stopping: false,
                max_new_tokens: params.max_tokens.min(DEFAULT_TOKEN_SIZE),
                do_sample: false,
                top_p: 0.9,
                return_full_text: false,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

pub fn into_completions(response: Vec<GeneratedText>) -> Vec<Completion> {
    response
        .into_iter()
        .map(|generated| Completion::from(generated.generated_text))
        .collect()
}
