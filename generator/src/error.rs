//! Error types for tree generation, persistence and batch updates.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while generating, loading or persisting a CLI tree.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Neither an adapter nor a man page exists for the root command.
    #[error("no CLI tree generator or man page for [{0}]")]
    UnsupportedCommand(String),

    /// The tool exited with a status its dialect does not treat as help.
    #[error("command [{argv}] exited with status {status}: {stderr}")]
    Subprocess {
        argv: String,
        status: i32,
        stderr: String,
    },

    /// The tool was killed by a signal or otherwise reported no exit code.
    #[error("command [{0}] terminated without an exit status")]
    Terminated(String),

    /// The tool could not be started.
    #[error("failed to run [{argv}]: {source}")]
    Spawn {
        argv: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool did not exit within the configured timeout.
    #[error("command [{argv}] timed out after {secs}s")]
    Timeout { argv: String, secs: u64 },

    /// The version query produced no usable version token.
    #[error("could not determine the version of [{0}]")]
    VersionNotFound(String),

    /// The traversal visited more nodes than the configured budget allows.
    #[error("CLI tree for [{command}] exceeds the {limit} node limit")]
    NodeLimitExceeded { command: String, limit: usize },

    /// The tree could not be written to its resolved location.
    #[error("failed to write CLI tree [{}]: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No install directory could be resolved and no override was given.
    #[error("CLI tree install directory not found; set CLI_TREE_ROOT or pass a directory")]
    InstallRootNotFound,

    /// Configuration file could not be loaded.
    #[error("invalid config [{}]: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// One or more roots failed during a batch update.
    #[error("No CLI tree {} for [{}].", pluralize(.0.len(), "generator"), .0.join(", "))]
    UpdateFailed(Vec<String>),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results with [`GenerateError`].
pub type Result<T> = std::result::Result<T, GenerateError>;

fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_failed_message() {
        let one = GenerateError::UpdateFailed(vec!["bq".to_string()]);
        assert_eq!(one.to_string(), "No CLI tree generator for [bq].");

        let two = GenerateError::UpdateFailed(vec!["bq".to_string(), "gsutil".to_string()]);
        assert_eq!(two.to_string(), "No CLI tree generators for [bq, gsutil].");
    }
}
