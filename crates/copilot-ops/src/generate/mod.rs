mod output;

use crate::backends::{Generate, GenerateClient};
use crate::prelude::{eprintln, *};
use copilot_ops_core::backend::{Backend, GenerationParams, GenerationPlan};
use copilot_ops_core::filemap::FileMap;
use copilot_ops_core::request::Request;
use copilot_ops_core::resolve::{resolve_completions, Resolution};
use std::path::{Path, PathBuf};

pub use output::{print_or_write, OutputMode};

pub const DEFAULT_TOKENS: u32 = 512;
pub const DEFAULT_COMPLETIONS: u32 = 1;

#[derive(Debug, clap::Args)]
pub struct GenerateOptions {
    /// Natural-language description of the YAML to generate
    #[arg(short, long)]
    pub request: String,

    /// File paths (glob, relative to the working directory; use ** to match at any depth) to be considered for the generation (can be specified multiple times)
    #[arg(short, long = "file", value_name = "GLOB")]
    pub files: Vec<String>,

    /// Fileset names (defined in .copilot-ops.toml) to be considered for the generation (can be specified multiple times)
    #[arg(short = 's', long = "fileset", value_name = "NAME")]
    pub filesets: Vec<String>,

    /// Max number of tokens to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOKENS)]
    pub ntokens: u32,

    /// Number of completions to generate
    #[arg(short = 'c', long, default_value_t = DEFAULT_COMPLETIONS)]
    pub ncompletions: u32,

    /// Backend to generate with: gpt-3, gpt-j, bloom, opt (overrides the config file)
    #[arg(short, long, env = "COPILOT_OPS_BACKEND")]
    pub backend: Option<String>,

    /// Path to the config file (defaults to .copilot-ops.toml in the working directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the generated files to disk instead of printing them
    #[arg(short, long, conflicts_with = "json")]
    pub write: bool,

    /// Print the generated files as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateOptions {
    fn output_mode(&self) -> OutputMode {
        if self.write {
            OutputMode::Write
        } else if self.json {
            OutputMode::Json
        } else {
            OutputMode::Print
        }
    }
}

/// Module entry point
pub async fn run(options: GenerateOptions, global: crate::Global) -> Result<()> {
    let root = std::env::current_dir().context("Failed to get current directory")?;

    let request = prepare_request(&options, &root)?;
    let prompt = request.prompt();

    if global.verbose {
        eprintln!("Backend: {}", request.backend);
        eprintln!("Context files: {}", request.files.len());
        eprintln!("Prompt length: {} chars", prompt.len());
    }

    let plan = request
        .plan(&mut rand::thread_rng())
        .map_err(|e| eyre!("could not create client: {}", e))?;

    let files = generate_files(plan).await?;

    print_or_write(&files, &root, options.output_mode())
}

/// Assemble a [`Request`] from the command-line options, the config file, and
/// the context files under `root`.
pub fn prepare_request(options: &GenerateOptions, root: &Path) -> Result<Request> {
    let config = crate::config::load_config(options.config.as_deref(), root)?;

    let backend_id = options
        .backend
        .clone()
        .or_else(|| config.backend.clone())
        .unwrap_or_default();
    let backend = Backend::parse(&backend_id).map_err(|e| eyre!("{}", e))?;

    let mut patterns = options.files.clone();
    for name in &options.filesets {
        let fileset = config.fileset(name).map_err(|e| eyre!("{}", e))?;
        patterns.extend(fileset.files.iter().cloned());
    }
    let files = crate::files::collect_files(root, &patterns)?;

    Ok(Request {
        user_request: options.request.clone(),
        backend,
        config,
        params: GenerationParams {
            max_tokens: options.ntokens,
            completions: options.ncompletions,
        },
        files,
    })
}

/// Call the planned backend once and resolve its completions into files.
///
/// A completion that cannot be decoded is not an error: every completion is
/// then returned as one whole file.
pub async fn generate_files(plan: GenerationPlan) -> Result<FileMap> {
    let client = GenerateClient::from_plan(plan).wrap_err("could not create client")?;

    let completions = client
        .generate()
        .await
        .wrap_err("could not generate files")?;

    log::info!("decoding output");

    let resolution = resolve_completions(completions.as_slice());
    if let Resolution::Fallback { error, .. } = &resolution {
        log::warn!(
            "decoding failed, got error: {}; keeping each of the {} completion(s) as a whole file",
            error,
            completions.len()
        );
    }

    Ok(resolution.into_files())
}
