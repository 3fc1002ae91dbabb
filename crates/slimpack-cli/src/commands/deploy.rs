use super::Project;
use super::build::{print_summary, run_build};
use slimpack_cloud::LambdaClient;
use slimpack_core::config::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Publish an archive to every `[[functions]]` entry.
pub async fn deploy(config_path: Option<&Path>, archive: Option<&Path>) -> anyhow::Result<()> {
    let project = Project::load(config_path)?;
    let functions = &project.config.functions;
    if functions.is_empty() {
        anyhow::bail!("no functions to deploy: add a [[functions]] entry to {CONFIG_FILE}");
    }

    let client = LambdaClient::new();
    let version = client.cli_version().await?;
    tracing::debug!(%version, "aws cli available");

    let archive_path: PathBuf = match archive {
        Some(path) => path.to_path_buf(),
        None => {
            let artifact = run_build(&project).await?;
            print_summary(&artifact);
            println!();
            artifact.archive_path
        }
    };

    println!(
        "Publishing {} to {} function(s)...",
        archive_path.display(),
        functions.len()
    );
    let report = client
        .publish(&archive_path, functions, &project.config.deploy)
        .await?;

    println!();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(arn) => println!("  ok      {}  {arn}", outcome.function),
            Err(e) => println!("  FAILED  {}  {}", outcome.function, error_chain(e)),
        }
    }

    if !report.all_succeeded() {
        let failed = report.failures().count();
        anyhow::bail!("{failed} of {} function(s) failed to publish", report.outcomes.len());
    }

    Ok(())
}

fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
