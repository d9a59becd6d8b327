//! Root command to dialect lookup, version probing and tree generation.

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cli_tree_core::CliTree;
use regex::Regex;
use tracing::{debug, info};

use crate::build::{DEFAULT_MAX_NODES, TreeBuilder};
use crate::error::{GenerateError, Result};
use crate::runner::ToolRunner;

/// Version stamp for trees generated from man pages.
pub const MAN_PAGE_VERSION: &str = "MAN(1)";

// SAFETY: These regexes are compile-time constants and are validated by tests.
static GIT_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"GitVersion:"([^"]*)""#).expect("static regex must compile"));
static CLIENT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Client Version:\s*(\S+)").expect("static regex must compile")
});

/// Help-output layout of a root command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Dialect {
    Bq,
    Gsutil,
    Kubectl,
    #[cfg_attr(feature = "clap", value(name = "man"))]
    ManPage,
}

const ADAPTERS: [(&str, Dialect); 3] = [
    ("bq", Dialect::Bq),
    ("gsutil", Dialect::Gsutil),
    ("kubectl", Dialect::Kubectl),
];

impl Dialect {
    /// Returns the dialect for `command`; commands without a dedicated
    /// adapter fall back to their man page.
    pub fn for_command(command: &str) -> Self {
        ADAPTERS
            .iter()
            .find(|(name, _)| *name == command)
            .map_or(Dialect::ManPage, |(_, dialect)| *dialect)
    }

    /// Root commands with a dedicated adapter, sorted.
    pub fn known_commands() -> Vec<&'static str> {
        ADAPTERS.iter().map(|(name, _)| *name).collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            Dialect::Bq => "bq",
            Dialect::Gsutil => "gsutil",
            Dialect::Kubectl => "kubectl",
            Dialect::ManPage => "man",
        }
    }

    /// Non-zero exit statuses the tool uses for successful help output.
    pub fn ok_exit_codes(self) -> &'static [i32] {
        match self {
            Dialect::Bq | Dialect::Gsutil => &[1],
            Dialect::Kubectl | Dialect::ManPage => &[],
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generates the tree for one root command.
///
/// The command may carry a directory prefix (`/opt/sdk/bin/bq`); the tree
/// and artifact are named after the final component.
pub struct CliTreeGenerator<'r> {
    cli_name: String,
    cli_dir: Option<PathBuf>,
    dialect: Dialect,
    runner: &'r dyn ToolRunner,
    max_nodes: usize,
    cli_version: OnceCell<String>,
}

impl fmt::Debug for CliTreeGenerator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliTreeGenerator")
            .field("cli_name", &self.cli_name)
            .field("cli_dir", &self.cli_dir)
            .field("dialect", &self.dialect)
            .field("max_nodes", &self.max_nodes)
            .finish_non_exhaustive()
    }
}

impl<'r> CliTreeGenerator<'r> {
    pub fn new(command: &str, runner: &'r dyn ToolRunner) -> Self {
        let path = Path::new(command);
        let cli_name = path
            .file_name()
            .map_or_else(|| command.to_string(), |name| name.to_string_lossy().into_owned());
        let cli_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        let dialect = Dialect::for_command(&cli_name);

        Self {
            cli_name,
            cli_dir,
            dialect,
            runner,
            max_nodes: DEFAULT_MAX_NODES,
            cli_version: OnceCell::new(),
        }
    }

    /// Caps the number of commands expanded while building one tree.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn cli_name(&self) -> &str {
        &self.cli_name
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Program to invoke for the root command itself.
    pub(crate) fn program(&self) -> String {
        match &self.cli_dir {
            Some(dir) => dir.join(&self.cli_name).to_string_lossy().into_owned(),
            None => self.cli_name.clone(),
        }
    }

    /// Resolved executable, or `None` if the command is not installed.
    pub fn locate(&self) -> Option<PathBuf> {
        self.runner.locate(&self.program())
    }

    /// Runs `argv` and returns its stdout, accepting the dialect's help exit
    /// statuses.
    pub(crate) fn run(&self, argv: &[String]) -> Result<String> {
        let output = self.runner.run(argv)?;
        match output.exit_code {
            Some(0) => {}
            Some(code) if self.dialect.ok_exit_codes().contains(&code) => {
                debug!(command = ?argv, code, "Accepting help exit status");
            }
            Some(code) => {
                return Err(GenerateError::Subprocess {
                    argv: argv.join(" "),
                    status: code,
                    stderr: output.stderr.trim().to_string(),
                });
            }
            None => return Err(GenerateError::Terminated(argv.join(" "))),
        }

        if self.dialect == Dialect::Bq {
            Ok(output.stdout.replace("bq.py", "bq"))
        } else {
            Ok(output.stdout)
        }
    }

    /// Returns the live version of the tool, querying it at most once.
    pub fn get_version(&self) -> Result<String> {
        if let Some(version) = self.cli_version.get() {
            return Ok(version.clone());
        }

        let version = match self.dialect {
            Dialect::ManPage => MAN_PAGE_VERSION.to_string(),
            Dialect::Kubectl => {
                let argv = [self.program(), "version".to_string(), "--client".to_string()];
                parse_kubectl_version(&self.run(&argv)?)
                    .ok_or_else(|| GenerateError::VersionNotFound(self.cli_name.clone()))?
            }
            Dialect::Bq | Dialect::Gsutil => {
                let argv = [self.program(), "version".to_string()];
                self.run(&argv)?
                    .split_whitespace()
                    .last()
                    .map(str::to_string)
                    .ok_or_else(|| GenerateError::VersionNotFound(self.cli_name.clone()))?
            }
        };

        debug!(command = %self.cli_name, %version, "Resolved CLI version");
        let _ = self.cli_version.set(version.clone());
        Ok(version)
    }

    /// Builds the full tree for the root command and stamps it with the live
    /// and schema versions.
    pub fn generate_tree(&self) -> Result<CliTree> {
        let root = TreeBuilder::new(self).build()?;
        let version = self.get_version()?;
        info!(
            command = %self.cli_name,
            nodes = root.node_count(),
            %version,
            "Generated CLI tree"
        );
        Ok(CliTree::new(root, &version))
    }
}

fn parse_kubectl_version(output: &str) -> Option<String> {
    GIT_VERSION_RE
        .captures(output)
        .or_else(|| CLIENT_VERSION_RE.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CapturedOutput, ScriptedRunner};

    #[test]
    fn test_dialect_lookup_defaults_to_man_page() {
        assert_eq!(Dialect::for_command("bq"), Dialect::Bq);
        assert_eq!(Dialect::for_command("kubectl"), Dialect::Kubectl);
        assert_eq!(Dialect::for_command("ls"), Dialect::ManPage);
        assert_eq!(Dialect::known_commands(), ["bq", "gsutil", "kubectl"]);
    }

    #[test]
    fn test_directory_prefix_is_split() {
        let runner = ScriptedRunner::new();
        let generator = CliTreeGenerator::new("/opt/sdk/bin/gsutil", &runner);
        assert_eq!(generator.cli_name(), "gsutil");
        assert_eq!(generator.dialect(), Dialect::Gsutil);
        assert_eq!(generator.program(), "/opt/sdk/bin/gsutil");

        let bare = CliTreeGenerator::new("gsutil", &runner);
        assert_eq!(bare.program(), "gsutil");
    }

    #[test]
    fn test_kubectl_version_formats() {
        assert_eq!(
            parse_kubectl_version(r#"Client Version: version.Info{Major:"1", GitVersion:"v1.11.0"}"#),
            Some("v1.11.0".to_string())
        );
        assert_eq!(
            parse_kubectl_version("Client Version: v1.28.2\nKustomize Version: v5.0.4"),
            Some("v1.28.2".to_string())
        );
        assert_eq!(parse_kubectl_version("garbage"), None);
    }

    #[test]
    fn test_version_is_memoized() {
        let runner = ScriptedRunner::new()
            .installed("bq")
            .respond("bq version", CapturedOutput::success("This is BigQuery CLI 2.0.94\n"));
        let generator = CliTreeGenerator::new("bq", &runner);
        assert_eq!(generator.get_version().unwrap(), "2.0.94");
        assert_eq!(generator.get_version().unwrap(), "2.0.94");
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_man_page_version_runs_nothing() {
        let runner = ScriptedRunner::new();
        let generator = CliTreeGenerator::new("ls", &runner);
        assert_eq!(generator.get_version().unwrap(), MAN_PAGE_VERSION);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_empty_version_output() {
        let runner = ScriptedRunner::new().respond("gsutil version", CapturedOutput::success("\n"));
        let generator = CliTreeGenerator::new("gsutil", &runner);
        assert!(matches!(
            generator.get_version(),
            Err(GenerateError::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_exit_status_tolerance() {
        let runner = ScriptedRunner::new()
            .respond("bq help", CapturedOutput::exited(1, "USAGE: bq.py\n"))
            .respond("bq broken", CapturedOutput::exited(2, ""))
            .respond("kubectl --help", CapturedOutput::exited(1, ""));

        let bq = CliTreeGenerator::new("bq", &runner);
        assert_eq!(bq.run(&["bq".into(), "help".into()]).unwrap(), "USAGE: bq\n");
        assert!(matches!(
            bq.run(&["bq".into(), "broken".into()]),
            Err(GenerateError::Subprocess { status: 2, .. })
        ));

        let kubectl = CliTreeGenerator::new("kubectl", &runner);
        assert!(matches!(
            kubectl.run(&["kubectl".into(), "--help".into()]),
            Err(GenerateError::Subprocess { status: 1, .. })
        ));
    }

    #[test]
    fn test_signal_termination_is_an_error() {
        let output = CapturedOutput {
            exit_code: None,
            ..CapturedOutput::default()
        };
        let runner = ScriptedRunner::new().respond("gsutil --help", output);
        let generator = CliTreeGenerator::new("gsutil", &runner);
        assert!(matches!(
            generator.run(&["gsutil".into(), "--help".into()]),
            Err(GenerateError::Terminated(_))
        ));
    }
}
