//! FileMap codec
//!
//! Pure functions for packing a set of text files into a single prompt blob
//! and for recovering files from a model completion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker that opens every file inside an encoded blob, followed by the file path.
pub const FILE_DELIMITER: &str = "# @";

/// Terminator the prompt asks the model to emit after the generated YAML.
pub const END_OF_SEQUENCE: &str = "#EOF";

/// Directory and file-name stem used for files the tool names itself.
pub const GENERATED_PREFIX: &str = "generated-by-copilot-ops";

/// Error type for decoding a completion into files
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("output has no '# @' file header and no '#EOF' terminator")]
    NoFileBoundary,

    #[error("file header on line {0} has an empty path")]
    EmptyPath(usize),

    #[error("output does not contain any file content")]
    Empty,
}

/// A single named text file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub path: String,
    pub content: String,
}

impl File {
    /// Create a file, deriving its name from the final segment of `path`.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: file_name(&path).to_string(),
            path,
            content: content.into(),
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Name and path for the `index`th (1-based) file synthesized by the tool.
///
/// Produces `generated-by-copilot-ops/generated-by-copilot-ops<index>.yaml`.
pub fn generated_path(index: usize) -> String {
    format!("{GENERATED_PREFIX}/{GENERATED_PREFIX}{index}.yaml")
}

/// Files keyed by path, iterated in ascending path order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap {
    files: BTreeMap<String, File>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous file with the same path.
    pub fn insert(&mut self, file: File) {
        self.files.insert(file.path.clone(), file);
    }

    pub fn get(&self, path: &str) -> Option<&File> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Encode every file as `# @<path>\n<content>\n`, concatenated in path order.
    ///
    /// Content lines that would read as a file header or as the terminator are
    /// escaped with a leading `\`, so decoding gives back the same files.
    pub fn encode(&self) -> String {
        self.files
            .values()
            .map(|file| {
                format!(
                    "{FILE_DELIMITER}{}\n{}\n",
                    file.path,
                    escape_content(&file.content)
                )
            })
            .collect()
    }

    /// Decode one completion and add the recovered files to this map.
    ///
    /// Same as [`FileMap::decode_completion`] for a completion the backend did
    /// not mark as terminated.
    pub fn decode_from_output(&mut self, output: &str) -> Result<(), DecodeError> {
        self.decode(output, false)
    }

    /// Decode one completion and add the recovered files to this map.
    ///
    /// Everything from the first line that is exactly `#EOF` (ignoring trailing
    /// whitespace) is discarded. Each `# @<path>` line starts a new file. Text
    /// that is not under any header becomes an untitled file named with
    /// [`generated_path`], but only if the completion was terminated, either by
    /// a terminator line or by the backend stopping on it, or carried at least
    /// one header. Nothing is inserted when an error is returned.
    pub fn decode_completion(&mut self, completion: &Completion) -> Result<(), DecodeError> {
        self.decode(&completion.text, completion.stopped_on_terminator)
    }

    fn decode(&mut self, output: &str, stopped: bool) -> Result<(), DecodeError> {
        let mut terminated = stopped;
        let mut leading = String::new();
        let mut sections: Vec<(String, String)> = Vec::new();

        for (number, line) in output.split_inclusive('\n').enumerate() {
            if is_terminator(line) {
                terminated = true;
                break;
            }

            if let Some(header) = line.strip_prefix(FILE_DELIMITER) {
                let path = header.trim();
                if path.is_empty() {
                    return Err(DecodeError::EmptyPath(number + 1));
                }
                sections.push((path.to_string(), String::new()));
                continue;
            }

            let line = unescape_line(line);
            match sections.last_mut() {
                Some((_, content)) => content.push_str(line),
                None => leading.push_str(line),
            }
        }

        if sections.is_empty() && !terminated {
            return Err(DecodeError::NoFileBoundary);
        }

        let mut decoded = Vec::with_capacity(sections.len() + 1);

        if !leading.trim().is_empty() {
            let path = generated_path(self.len() + 1);
            decoded.push(File::new(path, leading.trim_start_matches('\n')));
        }

        for (path, mut content) in sections {
            if content.ends_with('\n') {
                content.pop();
            }
            decoded.push(File::new(path, content));
        }

        if decoded.is_empty() {
            return Err(DecodeError::Empty);
        }

        for file in decoded {
            self.insert(file);
        }

        Ok(())
    }
}

/// One candidate returned by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Text exactly as the backend returned it.
    pub text: String,
    /// The backend reported that generation ended on the terminator, which it
    /// removed from `text`.
    pub stopped_on_terminator: bool,
}

impl Completion {
    pub fn stopped(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stopped_on_terminator: true,
        }
    }
}

impl From<String> for Completion {
    fn from(text: String) -> Self {
        Self {
            text,
            stopped_on_terminator: false,
        }
    }
}

impl From<&str> for Completion {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

const ESCAPE: char = '\\';

fn is_terminator(line: &str) -> bool {
    line.trim_end() == END_OF_SEQUENCE
}

/// Lines that would be read as structure, whatever number of escapes precede them.
fn needs_escape(line: &str) -> bool {
    let unescaped = line.trim_start_matches(ESCAPE);
    unescaped.starts_with(FILE_DELIMITER) || is_terminator(unescaped)
}

fn escape_content(content: &str) -> String {
    content
        .split_inclusive('\n')
        .map(|line| {
            if needs_escape(line) {
                format!("{ESCAPE}{line}")
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn unescape_line(line: &str) -> &str {
    match line.strip_prefix(ESCAPE) {
        Some(rest) if needs_escape(rest) => rest,
        _ => line,
    }
}

impl FromIterator<File> for FileMap {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        let mut map = FileMap::new();
        for file in iter {
            map.insert(file);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(output: &str) -> Result<FileMap, DecodeError> {
        let mut map = FileMap::new();
        map.decode_from_output(output)?;
        Ok(map)
    }

    #[test]
    fn test_file_name_is_last_path_segment() {
        let file = File::new("examples/app1/mysql-pvc.yaml", "kind: PVC");
        assert_eq!(file.name, "mysql-pvc.yaml");

        let file = File::new("pod.yaml", "");
        assert_eq!(file.name, "pod.yaml");
    }

    #[test]
    fn test_encode_empty_map() {
        assert_eq!(FileMap::new().encode(), "");
    }

    #[test]
    fn test_encode_is_sorted_by_path() {
        let map: FileMap = vec![
            File::new("b.yaml", "kind: Service"),
            File::new("a.yaml", "kind: Pod"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            map.encode(),
            "# @a.yaml\nkind: Pod\n# @b.yaml\nkind: Service\n"
        );
    }

    #[test]
    fn test_round_trip_two_files() {
        let original: FileMap = vec![
            File::new("a.yaml", "apiVersion: v1\nkind: Pod\n"),
            File::new("b.yaml", "apiVersion: v1\nkind: Service"),
        ]
        .into_iter()
        .collect();

        let decoded = decode(&original.encode()).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.get("a.yaml").unwrap().name, "a.yaml");
    }

    #[test]
    fn test_round_trip_nested_paths() {
        let original: FileMap = vec![
            File::new("deploy/app/pvc.yaml", "kind: PersistentVolumeClaim\n\n"),
            File::new("deploy/app/pod.yaml", "---\nkind: Pod\n"),
        ]
        .into_iter()
        .collect();

        assert_eq!(decode(&original.encode()).unwrap(), original);
    }

    #[test]
    fn test_round_trip_helm_comment_lines() {
        let original: FileMap = vec![
            File::new("values.yaml", "# @default -- 3\nreplicas: 3"),
            File::new("pod.yaml", "kind: Pod\n"),
        ]
        .into_iter()
        .collect();

        let decoded = decode(&original.encode()).unwrap();

        assert_eq!(decoded.paths().collect::<Vec<_>>(), vec!["pod.yaml", "values.yaml"]);
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_round_trip_inline_terminator_text() {
        let original: FileMap = vec![
            File::new("a.yaml", "kind: Pod #EOF marker\n"),
            File::new("b.yaml", "kind: Service"),
        ]
        .into_iter()
        .collect();

        assert_eq!(decode(&original.encode()).unwrap(), original);
    }

    #[test]
    fn test_round_trip_varied_content() {
        let contents = [
            "",
            "\n",
            "\n\n",
            "kind: Pod",
            "kind: Pod\n\n\n",
            "#EOF",
            "#EOF\n",
            "#EOF  \r\nafter: 1\n",
            "  #EOF\n",
            "# @nested.yaml\nkind: Pod",
            "  # @indented.yaml\n",
            "\\# @escaped.yaml\n\\\\#EOF\n",
            "\\\nbackslash: true\n",
            "a: 1\r\nb: 2\r\n",
            "# @\n",
        ];

        for content in contents {
            let original: FileMap = vec![
                File::new("first.yaml", content),
                File::new("second.yaml", content),
            ]
            .into_iter()
            .collect();

            let decoded = decode(&original.encode())
                .unwrap_or_else(|e| panic!("{content:?} failed to decode: {e}"));
            assert_eq!(decoded, original, "content {content:?}");
        }
    }

    #[test]
    fn test_encode_escapes_structural_lines() {
        let map: FileMap = vec![File::new("a.yaml", "# @b.yaml\n#EOF\n\\#EOF")]
            .into_iter()
            .collect();

        assert_eq!(map.encode(), "# @a.yaml\n\\# @b.yaml\n\\#EOF\n\\\\#EOF\n");
    }

    #[test]
    fn test_inline_terminator_is_content() {
        let decoded = decode("# @a.yaml\nkind: Pod #EOF marker\n# @b.yaml\nkind: Service\n").unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("a.yaml").unwrap().content, "kind: Pod #EOF marker");
        assert_eq!(decoded.get("b.yaml").unwrap().content, "kind: Service");
    }

    #[test]
    fn test_terminator_line_may_have_trailing_whitespace() {
        let decoded = decode("kind: Pod\n#EOF \r\nkind: Garbage\n").unwrap();
        assert_eq!(decoded.files().next().unwrap().content, "kind: Pod\n");
    }

    #[test]
    fn test_unterminated_inline_marker_is_not_a_boundary() {
        assert_eq!(decode("kind: Pod #EOF"), Err(DecodeError::NoFileBoundary));
    }

    #[test]
    fn test_stopped_completion_counts_as_terminated() {
        let mut map = FileMap::new();
        map.decode_completion(&Completion::stopped("kind: Pod\n")).unwrap();

        assert_eq!(map.get(&generated_path(1)).unwrap().content, "kind: Pod\n");
        assert!(map.decode_completion(&Completion::from("kind: Pod\n")).is_err());
    }

    #[test]
    fn test_terminated_output_without_header() {
        let decoded = decode("---\napiVersion: v1\nkind: Pod\n#EOF").unwrap();

        assert_eq!(decoded.len(), 1);
        let file = decoded.files().next().unwrap();
        assert_eq!(file.path, "generated-by-copilot-ops/generated-by-copilot-ops1.yaml");
        assert_eq!(file.content, "---\napiVersion: v1\nkind: Pod\n");
        assert!(!file.content.contains(END_OF_SEQUENCE));
    }

    #[test]
    fn test_text_after_terminator_is_dropped() {
        let decoded = decode("\nkind: Pod\n#EOF\n\nkind: Garbage\n").unwrap();
        assert_eq!(decoded.files().next().unwrap().content, "kind: Pod\n");
    }

    #[test]
    fn test_headers_with_terminator() {
        let decoded = decode("# @pod.yaml\nkind: Pod\n# @svc.yaml\nkind: Service\n#EOF").unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("pod.yaml").unwrap().content, "kind: Pod");
        assert_eq!(decoded.get("svc.yaml").unwrap().content, "kind: Service");
    }

    #[test]
    fn test_header_path_is_trimmed() {
        let decoded = decode("# @  pod.yaml \nkind: Pod\n").unwrap();
        assert!(decoded.get("pod.yaml").is_some());
    }

    #[test]
    fn test_leading_text_before_header_is_untitled_file() {
        let decoded = decode("kind: Namespace\n# @pod.yaml\nkind: Pod\n").unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded.get(&generated_path(1)).unwrap().content,
            "kind: Namespace\n"
        );
    }

    #[test]
    fn test_untitled_files_do_not_collide_across_completions() {
        let mut map = FileMap::new();
        map.decode_from_output("kind: Pod\n#EOF").unwrap();
        map.decode_from_output("kind: Service\n#EOF").unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&generated_path(2)).unwrap().content, "kind: Service\n");
    }

    #[test]
    fn test_no_boundary_fails() {
        assert_eq!(
            decode("apiVersion: v1\nkind: Pod\n"),
            Err(DecodeError::NoFileBoundary)
        );
    }

    #[test]
    fn test_terminator_only_fails() {
        assert_eq!(decode("\n  \n#EOF"), Err(DecodeError::Empty));
    }

    #[test]
    fn test_empty_header_path_fails() {
        assert_eq!(
            decode("kind: Pod\n# @ \nkind: Service\n"),
            Err(DecodeError::EmptyPath(2))
        );
    }

    #[test]
    fn test_failed_decode_leaves_map_untouched() {
        let mut map = FileMap::new();
        map.insert(File::new("a.yaml", "kind: Pod"));

        assert!(map.decode_from_output("kind: Service").is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_generated_path() {
        assert_eq!(
            generated_path(3),
            "generated-by-copilot-ops/generated-by-copilot-ops3.yaml"
        );
    }

    #[test]
    fn test_serializes_as_path_map() {
        let map: FileMap = vec![File::new("a.yaml", "kind: Pod")].into_iter().collect();
        let json = serde_json::to_value(&map).unwrap();

        assert_eq!(json["a.yaml"]["content"], "kind: Pod");
        assert_eq!(json["a.yaml"]["name"], "a.yaml");
    }
}
