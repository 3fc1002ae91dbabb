use std::collections::BTreeSet;
use std::path::PathBuf;

use slimpack_core::{BuildRequest, RootManifest};

use crate::archive::{self, ArchiveError};
use crate::build_id::BuildId;
use crate::graph::{self, GraphError};
use crate::workspace::{self, AssembleError, PackageManifest};

/// Durable result of one build.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    pub build_id: BuildId,
    /// Workspace the archive was built from; gone unless it was retained
    pub workspace_dir: PathBuf,
    pub archive_path: PathBuf,
    /// Archive size in bytes
    pub archive_size: u64,
    pub manifest: PackageManifest,
    pub bundled_dependencies: Vec<String>,
    /// Local imports that pointed at nothing
    pub missing_files: BTreeSet<PathBuf>,
    pub workspace_retained: bool,
}

/// Run the whole pipeline for `request`.
///
/// Stages run strictly in order; the first failure aborts the build and
/// leaves whatever it already created on disk in place.
pub fn build(request: &BuildRequest) -> Result<BuildArtifact, BuildError> {
    let build_id = BuildId::generate(request.function_name());
    let workspace_dir = request.temp_dir().join(build_id.as_str());
    let archive_path = request.output_dir().join(build_id.archive_name());

    tracing::info!(
        function = request.function_name(),
        build_id = %build_id,
        workspace = %workspace_dir.display(),
        "starting build"
    );

    let root_manifest = RootManifest::load(request.app_root()).map_err(BuildError::Manifest)?;

    let graph = graph::walk(
        request.entry_file(),
        request.app_root(),
        request.required_modules(),
    )?;
    for path in &graph.missing {
        tracing::warn!(path = %path.display(), "skipping unresolved import");
    }

    let assembled = workspace::assemble(request, &graph, &root_manifest, &workspace_dir)?;
    let missing_files = graph.missing;

    let archive_size = archive::archive(&workspace_dir, &archive_path)?;

    if request.delete_workspace() {
        std::fs::remove_dir_all(&workspace_dir).map_err(|e| BuildError::Cleanup {
            path: workspace_dir.clone(),
            source: e,
        })?;
        tracing::debug!(path = %workspace_dir.display(), "workspace removed");
    }

    tracing::info!(
        build_id = %build_id,
        archive = %archive_path.display(),
        bytes = archive_size,
        "build finished"
    );

    Ok(BuildArtifact {
        build_id,
        workspace_dir,
        archive_path,
        archive_size,
        manifest: assembled.manifest,
        bundled_dependencies: assembled.bundled_dependencies,
        missing_files,
        workspace_retained: !request.delete_workspace(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to load root manifest")]
    Manifest(#[source] slimpack_core::Error),
    #[error("dependency discovery failed")]
    Graph(#[from] GraphError),
    #[error("workspace assembly failed")]
    Assemble(#[from] AssembleError),
    #[error("archiving failed")]
    Archive(#[from] ArchiveError),
    #[error("failed to remove workspace {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}
