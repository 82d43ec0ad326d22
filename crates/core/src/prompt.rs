//! Generation prompt assembly
//!
//! The prompt is a `##`-commented document made of three parts: a preamble,
//! a numbered outline of the document, and a call-to-action that repeats the
//! outline with the actual request, the optional context files, and an empty
//! header for the model to continue from.

use crate::filemap::{END_OF_SEQUENCE, FILE_DELIMITER};

/// Build the generation prompt for `request`, with `encoded_files` as context.
///
/// Whether the preamble and outline mention context files depends on the raw
/// length of `encoded_files`, while the call-to-action only includes them when
/// they are non-blank. A whitespace-only blob therefore produces an outline
/// with three steps and a call-to-action with two.
pub fn build_generate_prompt(request: &str, encoded_files: &str) -> String {
    let with_files = !encoded_files.is_empty();

    let mut prompt = String::new();
    prompt.push_str(preamble(with_files));
    prompt.push_str(&instructions(with_files));
    prompt.push_str(&call_to_action(request, encoded_files));
    prompt
}

fn preamble(with_files: bool) -> &'static str {
    if with_files {
        "## This document contains instructions for a new Kubernetes YAML that needs to be created,\n\
         ## along with the relevant YAMLs for context, and the resultant YAML."
    } else {
        "## This document contains instructions for a new Kubernetes YAML that needs to be created,\n\
         ## and the resultant YAML."
    }
}

fn instructions(with_files: bool) -> String {
    let mut step = 1;

    let mut prompt = format!(
        "\n##\n## The structure of the document is as follows:\n## {step}. Description of the desired YAML"
    );
    step += 1;

    if with_files {
        prompt.push_str(&format!(
            "\n## {step}. The existing YAMLs, each separated by a '{FILE_DELIMITER}'"
        ));
        step += 1;
    }

    prompt.push_str(&format!(
        "\n## {step}. The new YAML, terminated by an '{END_OF_SEQUENCE}'\n"
    ));

    prompt
}

fn call_to_action(request: &str, encoded_files: &str) -> String {
    let mut step = 1;

    let mut prompt = format!("\n## {step}. Instructions for the new Kubernetes YAML:\n{request}\n");
    step += 1;

    if !encoded_files.trim().is_empty() {
        prompt.push_str(&format!("\n## {step}. Existing YAMLs:\n{encoded_files}\n"));
        step += 1;
    }

    prompt.push_str(&format!("\n## {step}. The new YAML:\n"));
    prompt
}
