//! Self-hosted GPT-J generation server (`gpt-j` backend)

use super::GenerationParams;
use crate::filemap::Completion;
use serde::{Deserialize, Serialize};

/// Longest response the GPT-J server will produce.
pub const MAX_TOKENS_GENERATE: u32 = 2048;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GptJConfig {
    pub url: String,
}

/// Body of a generate call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub context: String,
    pub temp: f32,
    pub response_length: u32,
    pub remove_input: bool,
}

impl GenerateRequest {
    /// Greedy decoding with the prompt stripped from the response.
    pub fn new(prompt: &str, params: &GenerationParams) -> Self {
        Self {
            context: prompt.to_string(),
            temp: 0.0,
            response_length: params.max_tokens.min(MAX_TOKENS_GENERATE),
            remove_input: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub completion: String,
}

impl GenerateResponse {
    pub fn into_completions(self) -> Vec<Completion> {
        vec![Completion::from(self.completion)]
    }
}
