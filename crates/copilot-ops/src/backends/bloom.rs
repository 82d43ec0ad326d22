use super::{post_json, Generate};
use crate::prelude::*;
use copilot_ops_core::backend::bloom::{into_completions, BloomConfig, GenerateRequest, GeneratedText};
use copilot_ops_core::backend::Backend;
use copilot_ops_core::filemap::Completion;

/// Client for the Hugging Face inference API
#[derive(Debug)]
pub struct BloomClient {
    http: reqwest::Client,
    config: BloomConfig,
    body: GenerateRequest,
}

impl BloomClient {
    pub fn new(http: reqwest::Client, config: BloomConfig, body: GenerateRequest) -> Self {
        Self { http, config, body }
    }
}

impl Generate for BloomClient {
    fn backend(&self) -> Backend {
        Backend::Bloom
    }

    async fn generate(&self) -> Result<Vec<Completion>> {
        let request = self
            .http
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key);
        let response: Vec<GeneratedText> = post_json(self.backend(), request, &self.body).await?;

        Ok(into_completions(response))
    }
}
