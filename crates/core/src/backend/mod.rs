//! Generation backend selection
//!
//! Each backend owns its configuration type and its request/response wire
//! types. [`plan_generation`] checks the selection against the loaded
//! configuration and produces a [`GenerationPlan`]: everything the shell needs
//! to perform the single HTTP call, with backend-specific defaults already
//! applied. No network access happens here.

pub mod bloom;
pub mod gptj;
pub mod openai;

use crate::config::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use bloom::BloomConfig;
pub use gptj::GptJConfig;
pub use openai::OpenAiConfig;

/// Identifier of a generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Gpt3,
    GptJ,
    Bloom,
    Opt,
    Unselected,
}

impl Backend {
    pub const ALL: [Backend; 4] = [Backend::Gpt3, Backend::GptJ, Backend::Bloom, Backend::Opt];

    pub fn id(&self) -> &'static str {
        match self {
            Backend::Gpt3 => "gpt-3",
            Backend::GptJ => "gpt-j",
            Backend::Bloom => "bloom",
            Backend::Opt => "opt",
            Backend::Unselected => "",
        }
    }

    /// Parse a backend identifier, matched exactly. An empty identifier means
    /// no backend was selected; anything else unknown is rejected.
    pub fn parse(id: &str) -> Result<Self, GenerateError> {
        if id.is_empty() {
            return Ok(Backend::Unselected);
        }

        Self::ALL
            .into_iter()
            .find(|backend| backend.id() == id)
            .ok_or_else(|| GenerateError::InvalidBackend(id.to_string()))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Unselected => write!(f, "unselected"),
            backend => write!(f, "{}", backend.id()),
        }
    }
}

/// Configuration for the OPT backend. It can be configured, but does not generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptConfig {
    pub url: String,
}

/// Errors raised while selecting a backend. None of them are retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("no config provided for {0}")]
    MissingConfig(Backend),

    #[error("no backend selected")]
    Unselected,

    #[error("invalid backend selected: '{0}'")]
    InvalidBackend(String),

    #[error("{0} does not implement the generate client")]
    Unsupported(Backend),
}

impl GenerateError {
    /// True for errors caused by configuration rather than backend capability.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, GenerateError::Unsupported(_))
    }
}

/// Generation parameters every backend receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub completions: u32,
}

/// A validated backend selection with its request body
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPlan {
    Gpt3 {
        config: OpenAiConfig,
        body: openai::CompletionRequest,
    },
    GptJ {
        config: GptJConfig,
        body: gptj::GenerateRequest,
    },
    Bloom {
        config: BloomConfig,
        body: bloom::GenerateRequest,
    },
}

impl GenerationPlan {
    pub fn backend(&self) -> Backend {
        match self {
            GenerationPlan::Gpt3 { .. } => Backend::Gpt3,
            GenerationPlan::GptJ { .. } => Backend::GptJ,
            GenerationPlan::Bloom { .. } => Backend::Bloom,
        }
    }
}

/// Select `backend` and build its request for `prompt`.
///
/// Fails when the backend's config section is missing, when the backend
/// cannot generate, or when no backend was selected. `rng` seeds the backends
/// that take a random seed.
pub fn plan_generation<R: Rng + ?Sized>(
    backend: Backend,
    config: &Config,
    prompt: &str,
    params: &GenerationParams,
    rng: &mut R,
) -> Result<GenerationPlan, GenerateError> {
    match backend {
        Backend::Gpt3 => {
            let config = config
                .openai
                .clone()
                .ok_or(GenerateError::MissingConfig(backend))?;
            let body = openai::CompletionRequest::new(&config, prompt, params);
            Ok(GenerationPlan::Gpt3 { config, body })
        }
        Backend::GptJ => {
            let config = config
                .gptj
                .clone()
                .ok_or(GenerateError::MissingConfig(backend))?;
            let body = gptj::GenerateRequest::new(prompt, params);
            Ok(GenerationPlan::GptJ { config, body })
        }
        Backend::Bloom => {
            let config = config
                .bloom
                .clone()
                .ok_or(GenerateError::MissingConfig(backend))?;
            let body = bloom::GenerateRequest::new(prompt, params, rng);
            Ok(GenerationPlan::Bloom { config, body })
        }
        Backend::Opt => Err(GenerateError::Unsupported(backend)),
        Backend::Unselected => Err(GenerateError::Unselected),
    }
}
