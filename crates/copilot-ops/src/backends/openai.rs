use super::{post_json, Generate};
use crate::prelude::*;
use copilot_ops_core::backend::openai::{CompletionRequest, CompletionResponse, OpenAiConfig};
use copilot_ops_core::backend::Backend;
use copilot_ops_core::filemap::Completion;

/// Client for the OpenAI completions endpoint
#[derive(Debug)]
pub struct Gpt3Client {
    http: reqwest::Client,
    config: OpenAiConfig,
    body: CompletionRequest,
}

impl Gpt3Client {
    pub fn new(http: reqwest::Client, config: OpenAiConfig, body: CompletionRequest) -> Self {
        Self { http, config, body }
    }
}

impl Generate for Gpt3Client {
    fn backend(&self) -> Backend {
        Backend::Gpt3
    }

    async fn generate(&self) -> Result<Vec<Completion>> {
        let mut request = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key);

        if let Some(org_id) = &self.config.org_id {
            request = request.header("OpenAI-Organization", org_id);
        }

        let response: CompletionResponse = post_json(self.backend(), request, &self.body).await?;

        Ok(response.into_completions())
    }
}
