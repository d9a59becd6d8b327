#![allow(dead_code)]

use cli_tree_generator::{CapturedOutput, ScriptedRunner};

pub const KUBECTL_VERSION: &str = "Client Version: v1.28.2\nKustomize Version: v5.0.4\n";

pub fn kubectl_runner() -> ScriptedRunner {
    kubectl_runner_with_version(KUBECTL_VERSION)
}

pub fn kubectl_runner_with_version(version: &str) -> ScriptedRunner {
    let leaf = include_str!("../fixtures/kubectl_leaf.txt");
    ScriptedRunner::new()
        .installed("kubectl")
        .respond("kubectl version --client", CapturedOutput::success(version))
        .respond(
            "kubectl --help",
            CapturedOutput::success(include_str!("../fixtures/kubectl_root.txt")),
        )
        .respond(
            "kubectl create --help",
            CapturedOutput::success(include_str!("../fixtures/kubectl_create.txt")),
        )
        .respond("kubectl create namespace --help", CapturedOutput::success(leaf))
        .respond("kubectl create secret --help", CapturedOutput::success(leaf))
        .respond("kubectl get --help", CapturedOutput::success(leaf))
        .respond(
            "kubectl options",
            CapturedOutput::success(include_str!("../fixtures/kubectl_options.txt")),
        )
}

pub fn gsutil_runner() -> ScriptedRunner {
    let root = include_str!("../fixtures/gsutil_root.txt");
    let leaf = include_str!("../fixtures/gsutil_leaf.txt");
    ScriptedRunner::new()
        .installed("gsutil")
        .respond("gsutil version", CapturedOutput::success("gsutil version: 5.27\n"))
        .respond("gsutil --help", CapturedOutput::success(root))
        .respond("gsutil help", CapturedOutput::exited(1, root))
        .respond(
            "gsutil acl --help",
            CapturedOutput::exited(1, include_str!("../fixtures/gsutil_acl.txt")),
        )
        .respond("gsutil acl set --help", CapturedOutput::success(leaf))
        .respond("gsutil acl get --help", CapturedOutput::success(leaf))
        .respond("gsutil cp --help", CapturedOutput::success(leaf))
        .respond(
            "gsutil help options",
            CapturedOutput::success(include_str!("../fixtures/gsutil_options.txt")),
        )
        .respond(
            "gsutil help acls",
            CapturedOutput::success(include_str!("../fixtures/gsutil_topic.txt")),
        )
}

pub fn bq_runner() -> ScriptedRunner {
    ScriptedRunner::new()
        .installed("bq")
        .respond("bq version", CapturedOutput::success("This is BigQuery CLI 2.0.94\n"))
        .respond(
            "bq help",
            CapturedOutput::exited(1, include_str!("../fixtures/bq_help.txt")),
        )
        .respond(
            "bq --help",
            CapturedOutput::exited(1, include_str!("../fixtures/bq_flags.txt")),
        )
}

pub fn ls_runner() -> ScriptedRunner {
    ScriptedRunner::new().installed("ls").respond(
        "man ls",
        CapturedOutput::success(include_str!("../fixtures/ls_man.txt")),
    )
}
