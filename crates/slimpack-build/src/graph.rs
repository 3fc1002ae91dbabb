//! Static dependency discovery.
//!
//! Starting from an entry file, [`walk`] follows every relative specifier to
//! the local files it names and records every bare specifier as an external
//! package. Traversal uses an explicit stack, so deep import chains cannot
//! exhaust the call stack, and a file is marked visited before its own
//! specifiers are processed, so cycles terminate.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::imports;

/// Extensions a local specifier may already carry.
const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "json"];

/// Appended to local specifiers without a recognized extension.
const DEFAULT_EXTENSION: &str = "js";

/// Specifier prefix of runtime built-in modules.
const BUILTIN_PREFIX: &str = "node:";

/// Everything statically reachable from one entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Canonical application root all local files live under
    pub root: PathBuf,
    /// Absolute path of the entry file
    pub entry: PathBuf,
    /// Absolute paths of every reachable local file, entry included
    pub local_files: BTreeSet<PathBuf>,
    /// External package name → version constraint
    pub externals: BTreeMap<String, String>,
    /// Local specifiers that resolved to nothing on disk
    pub missing: BTreeSet<PathBuf>,
    /// Local specifiers that resolved outside the application root
    pub outside_root: BTreeSet<PathBuf>,
    /// Local files that exist but could not be read
    pub unreadable: BTreeSet<PathBuf>,
}

impl DependencyGraph {
    /// Local files relative to the application root.
    pub fn relative_files(&self) -> impl Iterator<Item = &Path> {
        self.local_files
            .iter()
            .filter_map(|p| p.strip_prefix(&self.root).ok())
    }

    pub fn has_diagnostics(&self) -> bool {
        !(self.missing.is_empty() && self.outside_root.is_empty() && self.unreadable.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("failed to resolve application root {path}")]
    RootResolve {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("entry file {path} does not exist")]
    EntryNotFound { path: PathBuf },
    #[error("entry file {path} lies outside the application root")]
    EntryOutsideRoot { path: PathBuf },
    #[error("failed to read entry file {path}")]
    EntryRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Walk the import graph rooted at `entry_file` (relative to `app_root`).
///
/// `preseeded` names are always present in the result's externals, with the
/// caller's version constraint. Unresolvable local specifiers are recorded
/// as diagnostics and never abort the walk; only a missing or unreadable
/// entry file does.
pub fn walk(
    entry_file: &Path,
    app_root: &Path,
    preseeded: &BTreeMap<String, String>,
) -> Result<DependencyGraph, GraphError> {
    let root = app_root
        .canonicalize()
        .map_err(|e| GraphError::RootResolve {
            path: app_root.to_path_buf(),
            source: e,
        })?;

    let entry = normalize(&root.join(entry_file));
    if !entry.starts_with(&root) {
        return Err(GraphError::EntryOutsideRoot { path: entry });
    }
    if !entry.is_file() {
        return Err(GraphError::EntryNotFound { path: entry });
    }
    // Surface an unreadable entry as a hard failure instead of an empty graph.
    std::fs::File::open(&entry).map_err(|e| GraphError::EntryRead {
        path: entry.clone(),
        source: e,
    })?;

    let mut ctx = BuildContext::new(root, entry.clone(), preseeded);
    ctx.push(entry);
    while let Some(file) = ctx.stack.pop() {
        ctx.visit(&file);
    }

    tracing::debug!(
        local = ctx.graph.local_files.len(),
        external = ctx.graph.externals.len(),
        missing = ctx.graph.missing.len(),
        "dependency walk finished"
    );
    Ok(ctx.graph)
}

/// Traversal state for a single walk.
struct BuildContext {
    visited: HashSet<PathBuf>,
    stack: Vec<PathBuf>,
    graph: DependencyGraph,
}

impl BuildContext {
    fn new(root: PathBuf, entry: PathBuf, preseeded: &BTreeMap<String, String>) -> Self {
        let graph = DependencyGraph {
            root,
            local_files: BTreeSet::from([entry.clone()]),
            entry,
            externals: preseeded.clone(),
            ..Default::default()
        };
        Self {
            visited: HashSet::new(),
            stack: Vec::new(),
            graph,
        }
    }

    /// Marks `file` visited and schedules it; no-op if already seen.
    fn push(&mut self, file: PathBuf) {
        if self.visited.insert(file.clone()) {
            self.stack.push(file);
        }
    }

    fn visit(&mut self, file: &Path) {
        if !is_scannable(file) {
            return;
        }

        let source = match std::fs::read(file) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "cannot read source file");
                self.graph.unreadable.insert(file.to_path_buf());
                return;
            }
        };
        tracing::debug!(path = %file.display(), "scanning");

        let dir = file.parent().unwrap_or(&self.graph.root).to_path_buf();
        for specifier in imports::scan(&source) {
            if is_local(&specifier) {
                self.add_local(&dir, &specifier);
            } else if !specifier.starts_with(BUILTIN_PREFIX) {
                self.add_external(&specifier);
            }
        }
    }

    fn add_local(&mut self, dir: &Path, specifier: &str) {
        let resolved = resolve_local(dir, specifier);

        if !resolved.starts_with(&self.graph.root) {
            tracing::warn!(specifier, path = %resolved.display(), "import escapes application root");
            self.graph.outside_root.insert(resolved);
            return;
        }

        if resolved.is_file() {
            self.graph.local_files.insert(resolved.clone());
            self.push(resolved);
        } else {
            tracing::warn!(specifier, path = %resolved.display(), "imported file not found");
            self.graph.missing.insert(resolved);
        }
    }

    fn add_external(&mut self, specifier: &str) {
        if let Some(name) = package_name(specifier) {
            self.graph
                .externals
                .entry(name.to_owned())
                .or_insert_with(|| slimpack_core::ANY_VERSION.to_owned());
        }
    }
}

/// `./x`, `../x`, `.` and `..` name project files; anything else is a package.
fn is_local(specifier: &str) -> bool {
    matches!(specifier, "." | "..") || specifier.starts_with("./") || specifier.starts_with("../")
}

/// Resolve a relative specifier against the importing file's directory.
fn resolve_local(dir: &Path, specifier: &str) -> PathBuf {
    let joined = normalize(&dir.join(specifier));
    let recognized = joined
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));

    if recognized {
        joined
    } else {
        let mut with_ext = joined.into_os_string();
        with_ext.push(".");
        with_ext.push(DEFAULT_EXTENSION);
        PathBuf::from(with_ext)
    }
}

fn is_scannable(file: &Path) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .is_none_or(|ext| ext != "json")
}

/// Package directory name for a bare specifier.
///
/// `lodash/fp` → `lodash`, `@aws-sdk/client-s3/dist` → `@aws-sdk/client-s3`.
pub fn package_name(specifier: &str) -> Option<&str> {
    let trimmed = specifier.trim_start_matches('/');
    let mut parts = trimmed.splitn(3, '/');
    let first = parts.next().filter(|s| is_segment(s))?;

    if !first.starts_with('@') {
        return Some(first);
    }
    match parts.next().filter(|s| !s.is_empty()) {
        Some(second) if is_segment(second) => Some(&trimmed[..first.len() + 1 + second.len()]),
        Some(_) => None,
        None => Some(first),
    }
}

/// A package path segment that stays inside its parent directory.
fn is_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

/// Lexically normalize a path, resolving `.` and `..` without touching disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_handles_subpaths_and_scopes() {
        assert_eq!(package_name("left-pad"), Some("left-pad"));
        assert_eq!(package_name("lodash/fp"), Some("lodash"));
        assert_eq!(package_name("@aws-sdk/client-s3"), Some("@aws-sdk/client-s3"));
        assert_eq!(
            package_name("@aws-sdk/client-s3/dist/index.js"),
            Some("@aws-sdk/client-s3")
        );
        assert_eq!(package_name("@a/a"), Some("@a/a"));
        assert_eq!(package_name("@scope"), Some("@scope"));
        assert_eq!(package_name(""), None);
    }

    #[test]
    fn package_name_rejects_dot_segments() {
        assert_eq!(package_name("@x/.."), None);
        assert_eq!(package_name("@x/."), None);
        assert_eq!(package_name("../"), None);
        assert_eq!(package_name(".."), None);
        assert_eq!(package_name("./"), None);
        assert_eq!(package_name(".bin/tool"), Some(".bin"));
    }

    #[test]
    fn only_dot_slash_specifiers_are_local() {
        assert!(is_local("./a"));
        assert!(is_local("../a"));
        assert!(is_local("."));
        assert!(is_local(".."));
        assert!(!is_local(".hidden/x"));
        assert!(!is_local("..weird"));
        assert!(!is_local("lodash"));
    }

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(
            normalize(Path::new("/app/lib/./util/../db.js")),
            PathBuf::from("/app/lib/db.js")
        );
        assert_eq!(normalize(Path::new("/app/../../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[test]
    fn resolve_local_appends_default_extension() {
        let dir = Path::new("/app/lib");
        assert_eq!(resolve_local(dir, "./b"), PathBuf::from("/app/lib/b.js"));
        assert_eq!(resolve_local(dir, "./b.js"), PathBuf::from("/app/lib/b.js"));
        assert_eq!(resolve_local(dir, "../data.json"), PathBuf::from("/app/data.json"));
        assert_eq!(
            resolve_local(dir, "./webpack.config"),
            PathBuf::from("/app/lib/webpack.config.js")
        );
    }
}
