use super::{post_json, Generate};
use crate::prelude::*;
use copilot_ops_core::backend::gptj::{GenerateRequest, GenerateResponse, GptJConfig};
use copilot_ops_core::backend::Backend;
use copilot_ops_core::filemap::Completion;

/// Client for a self-hosted GPT-J server
#[derive(Debug)]
pub struct GptJClient {
    http: reqwest::Client,
    config: GptJConfig,
    body: GenerateRequest,
}

impl GptJClient {
    pub fn new(http: reqwest::Client, config: GptJConfig, body: GenerateRequest) -> Self {
        Self { http, config, body }
    }
}

impl Generate for GptJClient {
    fn backend(&self) -> Backend {
        Backend::GptJ
    }

    async fn generate(&self) -> Result<Vec<Completion>> {
        let request = self.http.post(&self.config.url);
        let response: GenerateResponse = post_json(self.backend(), request, &self.body).await?;

        Ok(response.into_completions())
    }
}
