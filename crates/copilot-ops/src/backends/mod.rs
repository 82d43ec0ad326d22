//! HTTP clients for the generation backends
//!
//! A [`GenerateClient`] is built from a [`GenerationPlan`] and performs exactly
//! one request/response cycle. There are no retries at this layer.

mod bloom;
mod gptj;
mod openai;

use crate::prelude::*;
use copilot_ops_core::backend::{Backend, GenerationPlan};
use copilot_ops_core::filemap::Completion;
use serde::{de::DeserializeOwned, Serialize};

pub use bloom::BloomClient;
pub use gptj::GptJClient;
pub use openai::Gpt3Client;

/// Produce completions for a prompt.
pub trait Generate {
    fn backend(&self) -> Backend;

    /// Send the request once and return the completions in order.
    async fn generate(&self) -> Result<Vec<Completion>>;
}

/// One client per backend that supports generation
#[derive(Debug)]
pub enum GenerateClient {
    Gpt3(Gpt3Client),
    GptJ(GptJClient),
    Bloom(BloomClient),
}

impl GenerateClient {
    pub fn from_plan(plan: GenerationPlan) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("copilot-ops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(match plan {
            GenerationPlan::Gpt3 { config, body } => {
                GenerateClient::Gpt3(Gpt3Client::new(http, config, body))
            }
            GenerationPlan::GptJ { config, body } => {
                GenerateClient::GptJ(GptJClient::new(http, config, body))
            }
            GenerationPlan::Bloom { config, body } => {
                GenerateClient::Bloom(BloomClient::new(http, config, body))
            }
        })
    }
}

impl Generate for GenerateClient {
    fn backend(&self) -> Backend {
        match self {
            GenerateClient::Gpt3(client) => client.backend(),
            GenerateClient::GptJ(client) => client.backend(),
            GenerateClient::Bloom(client) => client.backend(),
        }
    }

    async fn generate(&self) -> Result<Vec<Completion>> {
        let completions = match self {
            GenerateClient::Gpt3(client) => client.generate().await?,
            GenerateClient::GptJ(client) => client.generate().await?,
            GenerateClient::Bloom(client) => client.generate().await?,
        };

        if completions.is_empty() {
            return Err(Error::EmptyResponse(self.backend().to_string()).into());
        }

        log::debug!("{} returned {} completion(s)", self.backend(), completions.len());

        Ok(completions)
    }
}

/// POST `body` as JSON and decode the JSON response.
///
/// Non-success statuses are returned as [`Error::BackendStatus`] carrying the
/// response body, which is where these APIs put their error messages.
async fn post_json<B, T>(backend: Backend, request: reqwest::RequestBuilder, body: &B) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| Error::Network(f!("{backend}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::BackendStatus {
            backend: backend.to_string(),
            status: status.as_u16(),
            body,
        }
        .into());
    }

    response.json::<T>().await.map_err(|e| {
        Error::InvalidResponse {
            backend: backend.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
