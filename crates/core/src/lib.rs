//! Core library for copilot-ops
//!
//! This crate implements the **Functional Core** of copilot-ops, following
//! the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`copilot_ops_core`** (this crate): Pure transformation functions with zero I/O
//! - **`copilot-ops`**: File access, backend HTTP calls, and output (the Imperative Shell)
//!
//! A `generate` run flows through the modules in this order:
//!
//! 1. [`filemap`] encodes the context files into one delimited blob
//! 2. [`prompt`] wraps the blob and the user's request into the generation prompt
//! 3. [`backend`] validates the backend selection and builds its request body
//! 4. the shell sends the request and collects the completions
//! 5. [`resolve`] decodes the completions back into files, or falls back to
//!    one raw file per completion
//!
//! [`config`] parses the TOML configuration file and [`request`] ties the
//! pieces of one invocation together.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use copilot_ops_core::filemap::Completion;
//! use copilot_ops_core::resolve::resolve_completions;
//!
//! let resolution = resolve_completions(&[Completion::from("# @pod.yaml\nkind: Pod\n#EOF")]);
//! assert_eq!(resolution.files().len(), 1);
//! ```

pub mod backend;
pub mod config;
pub mod filemap;
pub mod prompt;
pub mod request;
pub mod resolve;
