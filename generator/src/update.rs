//! Batch driver: brings the stored trees of several root commands up to
//! date, one command at a time.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{GenerateError, Result};
use crate::progress::ProgressReporter;
use crate::registry::{CliTreeGenerator, Dialect};
use crate::runner::ToolRunner;
use crate::store::{LoadOptions, LoadOutcome};

/// Inputs for [`update_cli_trees`].
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Root commands to update; empty means every command with an adapter.
    pub commands: Vec<String>,
    /// Directories searched for artifacts, in priority order.
    pub directories: Vec<PathBuf>,
    pub options: LoadOptions,
    /// Node budget per root; `None` keeps the generator default.
    pub max_nodes: Option<usize>,
}

/// Per-root results of one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    pub up_to_date: Vec<String>,
    pub generated: Vec<String>,
    /// Generated, but the artifact could not be written.
    pub unsaved: Vec<String>,
    pub not_installed: Vec<String>,
    /// Failed roots with the error message for each.
    pub failed: Vec<(String, String)>,
}

impl UpdateSummary {
    pub fn failed_commands(&self) -> Vec<String> {
        self.failed.iter().map(|(command, _)| command.clone()).collect()
    }
}

/// Errors that mean no tree can be produced for a root: the tool has no
/// usable help or man output. Anything else aborts the batch unchanged.
fn is_missing_generator(err: &GenerateError) -> bool {
    matches!(
        err,
        GenerateError::UnsupportedCommand(_)
            | GenerateError::Subprocess { .. }
            | GenerateError::Terminated(_)
    )
}

/// Updates every requested root in sorted order.
///
/// A root whose tool fails or has no man page does not stop the run. Once
/// every root was processed, those failures are returned as one
/// [`UpdateFailed`](GenerateError::UpdateFailed) error, or only logged when
/// `warn_on_errors` is set. Any other error, such as an unwritable artifact
/// directory, is returned as is.
pub fn update_cli_trees(
    runner: &dyn ToolRunner,
    request: &UpdateRequest,
    progress: &dyn ProgressReporter,
) -> Result<UpdateSummary> {
    let commands: BTreeSet<String> = if request.commands.is_empty() {
        Dialect::known_commands()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        request.commands.iter().cloned().collect()
    };

    let mut summary = UpdateSummary::default();
    for command in commands {
        let mut generator = CliTreeGenerator::new(&command, runner);
        if let Some(max_nodes) = request.max_nodes {
            generator = generator.with_max_nodes(max_nodes);
        }

        match generator.load_tree(&request.directories, &request.options, progress) {
            Ok(LoadOutcome::NotInstalled) => summary.not_installed.push(command),
            Ok(LoadOutcome::UpToDate(_)) => summary.up_to_date.push(command),
            Ok(LoadOutcome::Generated { .. }) => summary.generated.push(command),
            Ok(LoadOutcome::Unsaved(_)) => summary.unsaved.push(command),
            Err(err) if is_missing_generator(&err) => {
                warn!(command = %command, error = %err, "CLI tree update failed");
                summary.failed.push((command, err.to_string()));
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        up_to_date = summary.up_to_date.len(),
        generated = summary.generated.len(),
        not_installed = summary.not_installed.len(),
        failed = summary.failed.len(),
        "CLI tree update finished"
    );

    if summary.failed.is_empty() {
        return Ok(summary);
    }
    let failure = GenerateError::UpdateFailed(summary.failed_commands());
    if request.options.warn_on_errors {
        warn!("{failure}");
        Ok(summary)
    } else {
        Err(failure)
    }
}
