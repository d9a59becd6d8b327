mod progress;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use cli_tree_core::{CliTree, CommandNode, validate_tree};
use cli_tree_generator::config::{TreeConfig, tree_directories};
use cli_tree_generator::output::{OutputFormat, format_node, format_tree};
use cli_tree_generator::store::{find_tree_file, read_tree};
use cli_tree_generator::update::{UpdateRequest, UpdateSummary, update_cli_trees};
use cli_tree_generator::{Dialect, LoadOptions, SystemRunner, parse_page};
use tracing_subscriber::EnvFilter;

use crate::progress::SpinnerProgress;

#[derive(Debug, Parser)]
#[command(name = "cli-tree")]
#[command(about = "Generate and inspect command trees of installed CLIs")]
struct Cli {
    /// Log every invocation and parse decision to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Regenerate stored trees whose tool version changed.
    Update(UpdateArgs),
    /// Parse one captured help or man page without running anything.
    ParseFile(ParseFileArgs),
    /// Print a stored tree.
    Show(ShowArgs),
    /// Validate one or more tree JSON files.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Comma-separated root commands (default: every command with an adapter).
    #[arg(long)]
    commands: Option<String>,
    /// Artifact directory; replaces the install and user directories.
    #[arg(long)]
    directory: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Regenerate even when the stored tree is current.
    #[arg(long)]
    force: bool,
    /// Report failures as warnings and exit successfully.
    #[arg(long)]
    warn_on_errors: bool,
    /// Per-invocation timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Maximum number of commands expanded per root.
    #[arg(long)]
    max_nodes: Option<usize>,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Help-output layout of the page.
    #[arg(long, value_enum)]
    dialect: Dialect,
    /// Command path the page belongs to (e.g. "kubectl create").
    #[arg(long)]
    command: String,
    /// Captured page.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Root command, optionally followed by a subcommand path (e.g. "kubectl get").
    #[arg(long)]
    command: String,
    /// Artifact directory to read from.
    #[arg(long)]
    directory: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Tree JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Update(args) => run_update(args, cli.verbose),
        Command::ParseFile(args) => run_parse_file(args),
        Command::Show(args) => run_show(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_update(args: UpdateArgs, verbose: bool) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => TreeConfig::load(path).map_err(|e| e.to_string())?,
        None => TreeConfig::default(),
    };

    let commands = parse_csv_list(args.commands);
    if !commands.is_empty() {
        config.commands = commands;
    }
    if args.directory.is_some() {
        config.directory = args.directory;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(max_nodes) = args.max_nodes {
        config.max_nodes = max_nodes;
    }
    config.warn_on_errors |= args.warn_on_errors;

    let directories = tree_directories(config.directory.as_deref(), config.warn_on_errors)
        .map_err(|e| e.to_string())?;
    let request = UpdateRequest {
        commands: config.commands,
        directories,
        options: LoadOptions {
            verbose,
            warn_on_errors: config.warn_on_errors,
            force: args.force,
        },
        max_nodes: Some(config.max_nodes),
    };

    let runner = SystemRunner::new(Duration::from_secs(config.timeout_secs));
    let summary = update_cli_trees(&runner, &request, &SpinnerProgress::new())
        .map_err(|e| e.to_string())?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &UpdateSummary) {
    let groups = [
        ("Generated", &summary.generated),
        ("Up to date", &summary.up_to_date),
        ("Not saved", &summary.unsaved),
        ("Not installed", &summary.not_installed),
    ];
    for (label, commands) in groups {
        if !commands.is_empty() {
            println!("{label}: {}", commands.join(", "));
        }
    }
    for (command, reason) in &summary.failed {
        println!("Failed: {command}: {reason}");
    }
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), String> {
    let text = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let path: Vec<String> = args.command.split_whitespace().map(str::to_string).collect();
    if path.is_empty() {
        return Err("--command must name at least one word".to_string());
    }

    let page = parse_page(args.dialect, &path, &text);
    let mut node = page.node;
    for child in &page.children {
        node.add_subcommand(CommandNode::new(node.child_path(child)));
    }
    if !page.topics.is_empty() {
        tracing::info!(topics = ?page.topics, "Page lists help topics");
    }

    println!("{}", format_node(&node, args.format)?);
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let words: Vec<&str> = args.command.split_whitespace().collect();
    let Some((root, rest)) = words.split_first() else {
        return Err("--command must name at least one word".to_string());
    };

    let directories = tree_directories(args.directory.as_deref(), true).map_err(|e| e.to_string())?;
    let (path, exists) = find_tree_file(root, &directories);
    if !exists {
        return Err(format!("No stored tree for '{root}'"));
    }
    let tree = read_tree(&path)
        .ok_or_else(|| format!("Stored tree '{}' is unreadable or invalid", path.display()))?;

    let output = if rest.is_empty() {
        format_tree(&tree, args.format)?
    } else {
        let node = tree
            .root
            .find(rest)
            .ok_or_else(|| format!("'{}' is not in the {root} tree", args.command))?;
        format_node(node, args.format)?
    };
    println!("{output}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut invalid = 0usize;
    for input in &args.inputs {
        let raw = fs::read_to_string(input)
            .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
        let problems: Vec<String> = match serde_json::from_str::<CliTree>(&raw) {
            Ok(tree) => validate_tree(&tree)
                .iter()
                .map(ToString::to_string)
                .collect(),
            Err(err) => vec![format!("not a tree: {err}")],
        };
        if problems.is_empty() {
            continue;
        }
        invalid += 1;
        for problem in problems {
            eprintln!("{}: {problem}", input.display());
        }
    }

    if invalid > 0 {
        return Err(format!("{invalid} of {} file(s) invalid", args.inputs.len()));
    }
    println!("Validated {} tree file(s).", args.inputs.len());
    Ok(())
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}
