//! Turning backend completions into files
//!
//! Resolution runs in two phases. All completions are first decoded into a
//! fresh [`FileMap`]. If any completion fails to decode, that map is thrown
//! away and every completion becomes one whole file instead.

use crate::filemap::{generated_path, Completion, DecodeError, File, FileMap};

/// Outcome of resolving a batch of completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every completion decoded into files.
    Decoded(FileMap),
    /// Decoding failed with `error`; `files` holds one raw file per completion.
    Fallback { files: FileMap, error: DecodeError },
}

impl Resolution {
    pub fn files(&self) -> &FileMap {
        match self {
            Resolution::Decoded(files) => files,
            Resolution::Fallback { files, .. } => files,
        }
    }

    pub fn into_files(self) -> FileMap {
        match self {
            Resolution::Decoded(files) => files,
            Resolution::Fallback { files, .. } => files,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }
}

/// Decode `completions`, falling back to whole-file synthesis on the first error.
pub fn resolve_completions(completions: &[Completion]) -> Resolution {
    match decode_all(completions) {
        Ok(files) => Resolution::Decoded(files),
        Err(error) => Resolution::Fallback {
            files: synthesize_files(completions),
            error,
        },
    }
}

fn decode_all(completions: &[Completion]) -> Result<FileMap, DecodeError> {
    let mut files = FileMap::new();
    for completion in completions {
        files.decode_completion(completion)?;
    }
    Ok(files)
}

/// One file per completion, text verbatim as the backend returned it, named by
/// 1-based position.
pub fn synthesize_files(completions: &[Completion]) -> FileMap {
    completions
        .iter()
        .enumerate()
        .map(|(i, completion)| File::new(generated_path(i + 1), completion.text.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(texts: &[&str]) -> Vec<Completion> {
        texts.iter().copied().map(Completion::from).collect()
    }

    #[test]
    fn test_single_terminated_completion_decodes() {
        let resolution = resolve_completions(&raw(&["---\napiVersion: v1\nkind: Pod\n#EOF"]));

        assert!(!resolution.is_fallback());
        let files = resolution.into_files();
        assert_eq!(files.len(), 1);
        assert_eq!(
            files.files().next().unwrap().content,
            "---\napiVersion: v1\nkind: Pod\n"
        );
    }

    #[test]
    fn test_stopped_completion_decodes_without_terminator_text() {
        let resolution = resolve_completions(&[Completion::stopped("kind: Pod\n")]);

        assert!(!resolution.is_fallback());
        let files = resolution.into_files();
        assert_eq!(files.get(&generated_path(1)).unwrap().content, "kind: Pod\n");
    }

    #[test]
    fn test_unstructured_completion_falls_back() {
        let text = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\n";
        let resolution = resolve_completions(&raw(&[text]));

        match resolution {
            Resolution::Fallback { files, error } => {
                assert_eq!(error, DecodeError::NoFileBoundary);
                let file = files
                    .get("generated-by-copilot-ops/generated-by-copilot-ops1.yaml")
                    .unwrap();
                assert_eq!(file.name, "generated-by-copilot-ops1.yaml");
                assert_eq!(file.content, text);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_one_bad_completion_falls_back_for_whole_batch() {
        let texts = [
            "# @pod.yaml\nkind: Pod\n#EOF",
            "kind: Service",
            "kind: Deployment\n#EOF",
        ];

        let resolution = resolve_completions(&raw(&texts));
        assert!(resolution.is_fallback());

        let files = resolution.files();
        assert_eq!(files.len(), 3);
        assert!(files.get("pod.yaml").is_none());
        for (i, text) in texts.iter().enumerate() {
            let file = files.get(&generated_path(i + 1)).unwrap();
            assert_eq!(file.content, *text);
        }
    }

    #[test]
    fn test_fallback_keeps_stopped_text_untouched() {
        let completions = vec![
            Completion::stopped("kind: Pod\n"),
            Completion::from("kind: Service"),
        ];

        match resolve_completions(&completions) {
            Resolution::Fallback { files, error } => {
                assert_eq!(error, DecodeError::NoFileBoundary);
                assert_eq!(files.get(&generated_path(1)).unwrap().content, "kind: Pod\n");
                assert_eq!(files.get(&generated_path(2)).unwrap().content, "kind: Service");
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_decoded_completions_are_merged() {
        let resolution = resolve_completions(&raw(&[
            "# @pod.yaml\nkind: Pod\n#EOF",
            "# @svc.yaml\nkind: Service\n#EOF",
        ]));

        let files = resolution.into_files();
        assert_eq!(files.paths().collect::<Vec<_>>(), vec!["pod.yaml", "svc.yaml"]);
    }

    #[test]
    fn test_no_completions() {
        let resolution = resolve_completions(&[]);
        assert_eq!(resolution, Resolution::Decoded(FileMap::new()));
    }

    #[test]
    fn test_synthesize_keeps_terminator() {
        let files = synthesize_files(&raw(&["kind: Pod\n#EOF"]));
        assert_eq!(files.get(&generated_path(1)).unwrap().content, "kind: Pod\n#EOF");
    }
}
