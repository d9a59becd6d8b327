use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use cli_tree_core::{CliTree, CommandNode, FlagNode};

const KUBECTL_CREATE: &str = "\
Create a resource from a file or from stdin.

Available Commands:
  namespace             Create a namespace with the specified name
  secret                Create a secret using a specified subcommand

Options:
    --dry-run='none': Must be \"none\", \"server\", or \"client\".
    -f, --filename=[]: Filename, directory, or URL to files to use to create the resource

Usage:
  kubectl create -f FILENAME [options]
";

fn cli_tree(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cli-tree"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cli-tree")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_kubectl_tree(dir: &Path) {
    let mut root = CommandNode::new(vec!["kubectl".to_string()]);
    root.add_flag(FlagNode::with_value("--context", "VALUE").global(true));
    let mut get = CommandNode::new(root.child_path("get"));
    get.capsule = "Display one or many resources.".to_string();
    root.add_subcommand(get);
    let tree = CliTree::new(root, "v1.28.2");
    fs::write(
        dir.join("kubectl.json"),
        serde_json::to_string_pretty(&tree).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_parse_file_kubectl_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("create.txt");
    fs::write(&input, KUBECTL_CREATE).unwrap();

    let output = cli_tree(&[
        "parse-file",
        "--dialect",
        "kubectl",
        "--command",
        "kubectl create",
        "--input",
        input.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let node: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(node["path"], serde_json::json!(["kubectl", "create"]));
    assert_eq!(node["capsule"], "Create a resource from a file or from stdin.");
    assert!(node["flags"]["--filename"].is_object());
    assert!(node["subcommands"]["secret"].is_object());
    assert_eq!(node["is_group"], true);
}

#[test]
fn test_parse_file_missing_input_fails() {
    let output = cli_tree(&[
        "parse-file",
        "--dialect",
        "man",
        "--command",
        "ls",
        "--input",
        "/nonexistent/ls.txt",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Failed to read"));
}

#[test]
fn test_validate_good_and_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    write_kubectl_tree(dir.path());
    let good = dir.path().join("kubectl.json");

    let output = cli_tree(&["validate", good.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Validated 1 tree file(s)."));

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{\"cli_version\": 3}").unwrap();
    let output = cli_tree(&["validate", good.to_str().unwrap(), bad.to_str().unwrap()]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("bad.json: not a tree"));
    assert!(err.contains("error: 1 of 2 file(s) invalid"));
}

#[test]
fn test_show_subcommand_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_kubectl_tree(dir.path());

    let output = cli_tree(&[
        "show",
        "--command",
        "kubectl get",
        "--directory",
        dir.path().to_str().unwrap(),
        "--format",
        "yaml",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("capsule: Display one or many resources."));

    let missing = cli_tree(&[
        "show",
        "--command",
        "gsutil",
        "--directory",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("No stored tree for 'gsutil'"));
}

#[test]
fn test_update_skips_command_that_is_not_installed() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli_tree(&[
        "update",
        "--commands",
        "cli-tree-no-such-command",
        "--directory",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Not installed: cli-tree-no-such-command"));
    assert!(!dir.path().join("cli-tree-no-such-command.json").exists());
}

#[test]
fn test_update_with_bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("cli-tree.yml");
    fs::write(&config, "timeout_secs: [nope]\n").unwrap();

    let output = cli_tree(&["update", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error:"));
    assert!(stderr(&output).contains("cli-tree.yml"));
}
