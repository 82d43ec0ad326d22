//! A single generate request
//!
//! Ties together the user's instruction, the backend selection, the loaded
//! configuration, and the context files for one invocation.

use crate::backend::{plan_generation, Backend, GenerateError, GenerationParams, GenerationPlan};
use crate::config::Config;
use crate::filemap::FileMap;
use crate::prompt::build_generate_prompt;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Request {
    pub user_request: String,
    pub backend: Backend,
    pub config: Config,
    pub params: GenerationParams,
    pub files: FileMap,
}

impl Request {
    /// Context files in their prompt encoding.
    pub fn filemap_text(&self) -> String {
        self.files.encode()
    }

    pub fn prompt(&self) -> String {
        build_generate_prompt(&self.user_request, &self.filemap_text())
    }

    /// Build the prompt and select the backend for it.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GenerationPlan, GenerateError> {
        plan_generation(self.backend, &self.config, &self.prompt(), &self.params, rng)
    }
}
