//! Command tree generation for third-party CLIs.
//!
//! This crate runs a tool's own help or man output, parses it with a
//! dialect-specific grammar and recurses into every subcommand it finds,
//! producing a [`CliTree`]. Trees are cached as `<command>.json` and
//! regenerated when the tool's version changes.
//!
//! # Main entry points
//!
//! - [`parse_page`]: parse one pre-captured help page without running
//!   anything.
//! - [`CliTreeGenerator::load_or_generate`]: reuse or rebuild the stored
//!   tree for one root command.
//! - [`update::update_cli_trees`]: batch update of several roots.
//!
//! # Example
//!
//! ```
//! use cli_tree_generator::{Dialect, parse_page};
//!
//! let help = "\
//! Display one or many resources.
//!
//! Options:
//!     -A, --all-namespaces=false: List across all namespaces.
//!     -o, --output='': Output format.
//!
//! Usage:
//!   kubectl get [flags] [options]
//! ";
//!
//! let path = vec!["kubectl".to_string(), "get".to_string()];
//! let page = parse_page(Dialect::Kubectl, &path, help);
//! assert!(page.node.flags["--all-namespaces"].is_boolean());
//! assert_eq!(page.node.flags["--output"].value, "VALUE");
//! ```
//!
//! [`CliTree`]: cli_tree_core::CliTree

pub mod build;
pub mod collect;
pub mod config;
pub mod error;
pub mod flags;
pub mod output;
pub mod progress;
pub mod registry;
pub mod runner;
pub mod store;
pub mod update;

pub use build::{Page, parse_page};
pub use error::{GenerateError, Result};
pub use progress::{NoopProgress, ProgressReporter};
pub use registry::{CliTreeGenerator, Dialect};
pub use runner::{CapturedOutput, ScriptedRunner, SystemRunner, ToolRunner};
pub use store::{LoadOptions, LoadOutcome};
