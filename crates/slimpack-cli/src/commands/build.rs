use super::Project;
use slimpack_build::BuildArtifact;
use std::path::Path;

/// Run the build pipeline and print a summary.
pub async fn build(config_path: Option<&Path>, keep_workspace: bool) -> anyhow::Result<()> {
    let mut project = Project::load(config_path)?;
    if keep_workspace {
        project.config.build.delete_workspace = false;
    }

    let artifact = run_build(&project).await?;
    print_summary(&artifact);
    Ok(())
}

/// Build on the blocking pool; the pipeline is synchronous file I/O.
pub(crate) async fn run_build(project: &Project) -> anyhow::Result<BuildArtifact> {
    let request = project.request()?;
    println!("Building {}...", request.function_name());

    let artifact = tokio::task::spawn_blocking(move || slimpack_build::build(&request)).await??;
    Ok(artifact)
}

pub(crate) fn print_summary(artifact: &BuildArtifact) {
    println!();
    println!("Build:    {}", artifact.build_id);
    println!(
        "Archive:  {} ({} bytes)",
        artifact.archive_path.display(),
        artifact.archive_size
    );
    if artifact.bundled_dependencies.is_empty() {
        println!("Packages: none");
    } else {
        println!("Packages: {}", artifact.bundled_dependencies.join(", "));
    }
    if artifact.workspace_retained {
        println!("Workspace kept at {}", artifact.workspace_dir.display());
    }
    for path in &artifact.missing_files {
        println!("Warning: unresolved import {}", path.display());
    }
}
