//! Artifact lookup, staleness check and persistence.
//!
//! A tree is stored as `<command>.json` in the first directory that already
//! holds one; new trees go to the last directory. A stored tree is reused
//! only while both its CLI version and schema version match.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cli_tree_core::{CliTree, TREE_SCHEMA_VERSION, validate_tree};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{GenerateError, Result};
use crate::progress::ProgressReporter;
use crate::registry::CliTreeGenerator;

/// Options for [`CliTreeGenerator::load_or_generate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Log not-installed and up-to-date roots at info level.
    pub verbose: bool,
    /// Log write failures and return the unsaved tree.
    pub warn_on_errors: bool,
    /// Regenerate even when the stored tree is current.
    pub force: bool,
}

/// What [`CliTreeGenerator::load_tree`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The root command is not installed.
    NotInstalled,
    /// The stored tree is current and was returned unchanged.
    UpToDate(CliTree),
    /// A tree was generated and written to `path`.
    Generated { tree: CliTree, path: PathBuf },
    /// A tree was generated but could not be written.
    Unsaved(CliTree),
}

impl LoadOutcome {
    pub fn into_tree(self) -> Option<CliTree> {
        match self {
            LoadOutcome::NotInstalled => None,
            LoadOutcome::UpToDate(tree)
            | LoadOutcome::Generated { tree, .. }
            | LoadOutcome::Unsaved(tree) => Some(tree),
        }
    }
}

/// Returns the artifact path for `cli_name` and whether it exists.
///
/// The first existing `<cli_name>.json` wins; otherwise the path in the last
/// directory is returned.
pub fn find_tree_file(cli_name: &str, directories: &[PathBuf]) -> (PathBuf, bool) {
    let file_name = format!("{cli_name}.json");
    for directory in directories {
        let path = directory.join(&file_name);
        if path.is_file() {
            return (path, true);
        }
    }
    let fallback = directories
        .last()
        .map_or_else(|| PathBuf::from(&file_name), |dir| dir.join(&file_name));
    (fallback, false)
}

/// Reads a stored tree, treating unreadable, malformed or structurally
/// invalid artifacts as absent.
pub fn read_tree(path: &Path) -> Option<CliTree> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Cannot read CLI tree");
            return None;
        }
    };
    let tree: CliTree = match serde_json::from_str(&raw) {
        Ok(tree) => tree,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Ignoring corrupt CLI tree");
            return None;
        }
    };
    let problems = validate_tree(&tree);
    if !problems.is_empty() {
        warn!(
            path = %path.display(),
            problems = problems.len(),
            first = %problems[0],
            "Ignoring invalid CLI tree"
        );
        return None;
    }
    Some(tree)
}

/// Writes `tree` as pretty JSON through a temporary file in the target
/// directory, then renames it into place.
pub fn write_tree(path: &Path, tree: &CliTree) -> Result<()> {
    write_atomically(path, tree).map_err(|source| GenerateError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomically(path: &Path, tree: &CliTree) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, tree)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

impl CliTreeGenerator<'_> {
    /// Loads the stored tree or generates a new one if it is missing or
    /// stale. Returns `Ok(None)` when the command is not installed.
    pub fn load_or_generate(
        &self,
        directories: &[PathBuf],
        options: &LoadOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<Option<CliTree>> {
        self.load_tree(directories, options, progress)
            .map(LoadOutcome::into_tree)
    }

    /// Like [`load_or_generate`](Self::load_or_generate), reporting what
    /// happened.
    pub fn load_tree(
        &self,
        directories: &[PathBuf],
        options: &LoadOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<LoadOutcome> {
        let name = self.cli_name();
        if self.locate().is_none() {
            if options.verbose {
                warn!("Command [{name}] not found.");
            } else {
                debug!(command = name, "Command not found");
            }
            return Ok(LoadOutcome::NotInstalled);
        }

        let (path, exists) = find_tree_file(name, directories);
        if exists && !options.force {
            if let Some(tree) = read_tree(&path) {
                let version = self.get_version()?;
                if tree.is_current(&version) {
                    if options.verbose {
                        info!("[{name}] CLI tree version [{version}] is up to date.");
                    } else {
                        debug!(command = name, %version, "CLI tree is up to date");
                    }
                    return Ok(LoadOutcome::UpToDate(tree));
                }
                debug!(
                    command = name,
                    stored = %tree.cli_version,
                    stored_schema = %tree.schema_version,
                    live = %version,
                    schema = TREE_SCHEMA_VERSION,
                    "CLI tree is stale"
                );
            }
        }

        let verb = if exists { "Updating" } else { "Generating" };
        progress.begin(&format!("{verb} the [{name}] CLI tree"));
        let generated = self.generate_tree();
        progress.finish(generated.is_ok());
        let tree = generated?;

        match write_tree(&path, &tree) {
            Ok(()) => {
                info!(command = name, path = %path.display(), "Wrote CLI tree");
                Ok(LoadOutcome::Generated { tree, path })
            }
            Err(err) if options.warn_on_errors => {
                warn!("{err}");
                Ok(LoadOutcome::Unsaved(tree))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli_tree_core::CommandNode;

    fn tree() -> CliTree {
        CliTree::new(CommandNode::new(vec!["ls".to_string()]), "MAN(1)")
    }

    #[test]
    fn test_find_tree_file_prefers_existing() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let (path, exists) = find_tree_file("ls", &dirs);
        assert!(!exists);
        assert_eq!(path, second.path().join("ls.json"));

        fs::write(first.path().join("ls.json"), "{}").unwrap();
        let (path, exists) = find_tree_file("ls", &dirs);
        assert!(exists);
        assert_eq!(path, first.path().join("ls.json"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ls.json");
        write_tree(&path, &tree()).unwrap();
        assert_eq!(read_tree(&path), Some(tree()));
        assert!(fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_corrupt_and_invalid_artifacts_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{\"path\": [\"ls\"").unwrap();
        assert_eq!(read_tree(&corrupt), None);

        let mut bad = tree();
        bad.cli_version.clear();
        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, serde_json::to_string(&bad).unwrap()).unwrap();
        assert_eq!(read_tree(&invalid), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_into_file_path_fails_with_persist() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let err = write_tree(&blocker.join("ls.json"), &tree()).unwrap_err();
        assert!(matches!(err, GenerateError::Persist { .. }));
    }
}
