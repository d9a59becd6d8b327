//! Update configuration and artifact directory resolution.
//!
//! # Example YAML
//!
//! ```yaml
//! directory: /var/lib/cli-tree
//! commands:
//!   - kubectl
//!   - ls
//! timeout_secs: 120
//! max_nodes: 2048
//! warn_on_errors: true
//! ```

use std::env;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::build::DEFAULT_MAX_NODES;
use crate::error::{GenerateError, Result};
use crate::runner::DEFAULT_TIMEOUT_SECS;

/// Environment variable naming the installation root.
pub const ROOT_ENV: &str = "CLI_TREE_ROOT";

/// Settings for a batch update. Every field is optional in the file.
///
/// # Examples
///
/// ```
/// use cli_tree_generator::config::TreeConfig;
///
/// let config: TreeConfig = serde_yaml::from_str("commands: [kubectl]\n").unwrap();
/// assert_eq!(config.commands, ["kubectl"]);
/// assert_eq!(config.timeout_secs, 60);
/// assert!(config.directory.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Artifact directory; replaces the install and user directories.
    pub directory: Option<PathBuf>,
    /// Root commands to update (empty = every command with an adapter).
    pub commands: Vec<String>,
    /// Per-invocation timeout.
    pub timeout_secs: u64,
    /// Maximum number of commands expanded per root.
    pub max_nodes: usize,
    /// Log failures as warnings instead of failing the run.
    pub warn_on_errors: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            directory: None,
            commands: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_nodes: DEFAULT_MAX_NODES,
            warn_on_errors: false,
        }
    }
}

impl TreeConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Config`](GenerateError::Config) if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| GenerateError::Config {
            path: path.to_path_buf(),
            message,
        };
        let file = std::fs::File::open(path).map_err(|e| config_error(e.to_string()))?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| config_error(e.to_string()))
    }
}

/// Artifact directory shipped with the installation.
///
/// `$CLI_TREE_ROOT/data/cli` when the variable is set, otherwise
/// `<exe dir>/../share/cli-tree/cli`.
pub fn install_dir() -> Option<PathBuf> {
    if let Some(root) = env::var_os(ROOT_ENV).filter(|root| !root.is_empty()) {
        return Some(PathBuf::from(root).join("data").join("cli"));
    }
    let exe = env::current_exe().ok()?;
    let prefix = exe.parent()?.parent()?;
    Some(prefix.join("share").join("cli-tree").join("cli"))
}

/// Per-user artifact directory.
pub fn user_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cli-tree").map(|dirs| dirs.config_dir().join("cli"))
}

/// Directories searched for artifacts, in priority order.
///
/// An explicit directory is used alone. Otherwise the install directory
/// comes first and the user directory last; new artifacts are written to
/// the last entry.
///
/// # Errors
///
/// Returns [`InstallRootNotFound`](GenerateError::InstallRootNotFound) when
/// no install directory can be resolved, unless `warn_on_errors` is set.
pub fn tree_directories(explicit: Option<&Path>, warn_on_errors: bool) -> Result<Vec<PathBuf>> {
    if let Some(dir) = explicit {
        return Ok(vec![dir.to_path_buf()]);
    }

    let mut directories = Vec::new();
    match install_dir() {
        Some(dir) => directories.push(dir),
        None if warn_on_errors => warn!("{}", GenerateError::InstallRootNotFound),
        None => return Err(GenerateError::InstallRootNotFound),
    }
    if let Some(dir) = user_dir() {
        directories.push(dir);
    }
    if directories.is_empty() {
        return Err(GenerateError::InstallRootNotFound);
    }
    Ok(directories)
}
