//! Per-build workspace assembly.
//!
//! The workspace receives only what the dependency walk found reachable:
//!
//! ```text
//! <workspace>/
//!   lib/...                  local files at their original relative offsets
//!   node_modules/<name>/     bundled external packages
//!   package.json             trimmed manifest
//!   config.js                runtime configuration module
//!   index.js                 canonical entry point
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use slimpack_core::{BuildRequest, RootManifest, RuntimeConfig};
use walkdir::WalkDir;

use crate::graph::{DependencyGraph, normalize};

/// Trimmed `package.json` written into the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub private: bool,
    pub dependencies: BTreeMap<String, String>,
    #[serde(rename = "bundledDependencies")]
    pub bundled_dependencies: Vec<String>,
}

impl PackageManifest {
    /// Merge discovered externals with the versions the root manifest declares.
    pub fn synthesize(
        name: &str,
        graph: &DependencyGraph,
        root: &RootManifest,
        bundled_dependencies: Vec<String>,
    ) -> Self {
        let dependencies = graph
            .externals
            .iter()
            .map(|(dep, fallback)| {
                let version = root.dependency_version(dep).unwrap_or(fallback.as_str());
                (dep.clone(), version.to_owned())
            })
            .collect();

        Self {
            name: name.to_owned(),
            version: root.version.clone(),
            private: true,
            dependencies,
            bundled_dependencies,
        }
    }
}

/// Result of a successful assembly.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub workspace_dir: PathBuf,
    pub manifest: PackageManifest,
    /// External packages physically copied into the workspace
    pub bundled_dependencies: Vec<String>,
}

/// Populate `workspace_dir` for `request` from a finished dependency walk.
///
/// The runtime configuration is loaded before anything on disk changes, so
/// a broken config never leaves a half-built workspace behind.
pub fn assemble(
    request: &BuildRequest,
    graph: &DependencyGraph,
    root_manifest: &RootManifest,
    workspace_dir: &Path,
) -> Result<Assembled, AssembleError> {
    let runtime_config = RuntimeConfig::load(&request.app_root().join(request.runtime_config()))
        .map_err(AssembleError::RuntimeConfig)?;
    let config_module = runtime_config
        .to_module()
        .map_err(|e| AssembleError::Render {
            what: slimpack_core::CONFIG_MODULE_FILE,
            source: e,
        })?;

    prepare_dirs(request, &graph.root, workspace_dir)?;

    tracing::info!(count = graph.local_files.len(), "copying local files");
    for relative in graph.relative_files() {
        copy_file(&graph.root.join(relative), &workspace_dir.join(relative))?;
    }

    let bundled_dependencies = if request.include_packages() {
        copy_packages(request.app_root(), graph, workspace_dir)?
    } else {
        tracing::info!("skipping external packages");
        Vec::new()
    };

    write_file(
        &workspace_dir.join(slimpack_core::CONFIG_MODULE_FILE),
        config_module.as_bytes(),
    )?;

    let manifest = PackageManifest::synthesize(
        request.function_name(),
        graph,
        root_manifest,
        bundled_dependencies.clone(),
    );
    let manifest_json =
        serde_json::to_string_pretty(&manifest).map_err(|e| AssembleError::Render {
            what: slimpack_core::MANIFEST_FILE,
            source: e,
        })?;
    write_file(
        &workspace_dir.join(slimpack_core::MANIFEST_FILE),
        manifest_json.as_bytes(),
    )?;

    copy_file(
        &request.app_root().join(request.execution_file()),
        &workspace_dir.join(slimpack_core::ENTRY_FILE),
    )?;

    for relative in request.additional_files() {
        copy_file(
            &request.app_root().join(relative),
            &workspace_dir.join(relative),
        )?;
    }

    for relative in request.remove_directories() {
        remove_path(&workspace_dir.join(relative))?;
    }

    Ok(Assembled {
        workspace_dir: workspace_dir.to_path_buf(),
        manifest,
        bundled_dependencies,
    })
}

fn prepare_dirs(
    request: &BuildRequest,
    app_root: &Path,
    workspace_dir: &Path,
) -> Result<(), AssembleError> {
    let output_dir = request.output_dir();

    if request.clear_output_dir() && output_dir.exists() {
        let resolved = output_dir
            .canonicalize()
            .unwrap_or_else(|_| normalize(output_dir));
        if app_root.starts_with(&resolved) {
            return Err(AssembleError::UnsafeOutputDir {
                path: output_dir.to_path_buf(),
            });
        }
        tracing::debug!(path = %output_dir.display(), "clearing output directory");
        std::fs::remove_dir_all(output_dir).map_err(|e| AssembleError::Cleanup {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
    }

    for dir in [workspace_dir, output_dir] {
        std::fs::create_dir_all(dir).map_err(|e| AssembleError::Create {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Copy every external package present in the store; returns their names.
fn copy_packages(
    app_root: &Path,
    graph: &DependencyGraph,
    workspace_dir: &Path,
) -> Result<Vec<String>, AssembleError> {
    let store = app_root.join(slimpack_core::PACKAGE_STORE_DIR);
    let target_store = workspace_dir.join(slimpack_core::PACKAGE_STORE_DIR);
    let mut bundled = Vec::new();

    for name in graph.externals.keys() {
        let src = store.join(name);
        if !src.is_dir() {
            tracing::debug!(package = %name, "not in package store, skipping");
            continue;
        }

        let dst = target_store.join(name);
        if dst.exists() {
            remove_path(&dst)?;
        }
        copy_tree(&src, &dst)?;
        tracing::debug!(package = %name, "bundled");
        bundled.push(name.clone());
    }

    tracing::info!(count = bundled.len(), "copied external packages");
    Ok(bundled)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), AssembleError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| AssembleError::Walk {
            path: src.to_path_buf(),
            source: e,
        })?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| AssembleError::Create {
                path: target.clone(),
                source: e,
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), AssembleError> {
    let link = std::fs::read_link(src).map_err(|e| AssembleError::CopyFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    ensure_parent(dst)?;
    std::os::unix::fs::symlink(&link, dst).map_err(|e| AssembleError::CopyFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), AssembleError> {
    copy_file(src, dst)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), AssembleError> {
    ensure_parent(to)?;
    std::fs::copy(from, to).map_err(|e| AssembleError::CopyFile {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), AssembleError> {
    ensure_parent(path)?;
    std::fs::write(path, contents).map_err(|e| AssembleError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn ensure_parent(path: &Path) -> Result<(), AssembleError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AssembleError::Create {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Remove a file, symlink, or directory tree; absent paths are fine.
fn remove_path(path: &Path) -> Result<(), AssembleError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(AssembleError::Cleanup {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| AssembleError::Cleanup {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("failed to load runtime configuration")]
    RuntimeConfig(#[source] slimpack_core::Error),
    #[error("failed to render {what}")]
    Render {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error("refusing to clear output directory {path}: it contains the application root")]
    UnsafeOutputDir { path: PathBuf },
    #[error("failed to clean up {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy {from} to {to}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk package directory {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
