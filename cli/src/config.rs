use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use brutyf_core::AttackConfig;

/// The configuration files looked up when none is given, in this order.
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("brutyf.json")];

    if let Some(home) = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("brutyf")
                .join("config.json"),
        );
    }

    paths
}

/// Loads the default options from `path`, or from the first default configuration file found.
/// Without any file, the built-in defaults are used.
pub fn load(path: Option<&Path>) -> Result<AttackConfig> {
    let path = match path {
        Some(path) => path.to_owned(),
        None => match default_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => path,
            None => return Ok(AttackConfig::default()),
        },
    };

    debug!("Loading the configuration from {}", path.display());

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Unable to read the configuration file {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid configuration file {}", path.display()))
}
