use crate::prelude::*;
use copilot_ops_core::config::{Config, CONFIG_FILE};
use std::path::Path;

/// Load the configuration file and apply environment overrides.
///
/// An explicit `path` must exist. Without one, `.copilot-ops.toml` in `root` is
/// used when present and an empty configuration otherwise.
pub fn load_config(path: Option<&Path>, root: &Path) -> Result<Config> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => {
            let default_path = root.join(CONFIG_FILE);
            if default_path.is_file() {
                read_config(&default_path)?
            } else {
                log::debug!("no {} found in {}", CONFIG_FILE, root.display());
                Config::default()
            }
        }
    };

    Ok(config.with_env(|name| std::env::var(name).ok()))
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| f!("Failed to read config file '{}'", path.display()))?;

    Config::from_toml_str(&content).map_err(|e| eyre!("{}: {}", path.display(), e))
}
