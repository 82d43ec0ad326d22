use crate::prelude::{eprintln, println, *};
use copilot_ops_core::filemap::FileMap;
use std::path::{Component, Path, PathBuf};

/// Where the generated files go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Print the files to stdout in their encoded form.
    Print,
    /// Print the files to stdout as a JSON object keyed by path.
    Json,
    /// Write the files to disk relative to the working directory.
    Write,
}

pub fn print_or_write(files: &FileMap, root: &Path, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Print => {
            anstream::print!("{}", files.encode());
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(files)
                .map_err(|e| eyre!("Failed to serialize JSON: {}", e))?;
            println!("{}", json);
        }
        OutputMode::Write => {
            for path in write_files(files, root)? {
                eprintln!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}

/// Write every file under `root`, creating parent directories as needed.
///
/// Paths must be relative and stay inside `root`; nothing is written if any
/// path does not.
pub fn write_files(files: &FileMap, root: &Path) -> Result<Vec<PathBuf>> {
    let targets = files
        .files()
        .map(|file| {
            let relative = Path::new(&file.path);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(eyre!(
                    "Refusing to write '{}' outside of {}",
                    file.path,
                    root.display()
                ));
            }
            Ok((root.join(relative), file))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(targets.len());
    for (target, file) in targets {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| f!("Failed to create directory '{}'", parent.display()))?;
        }
        std::fs::write(&target, &file.content)
            .with_context(|| f!("Failed to write file '{}'", target.display()))?;
        log::info!("wrote {}", target.display());
        written.push(target);
    }

    Ok(written)
}
