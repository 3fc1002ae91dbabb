//! Dependency discovery, workspace assembly, and packaging for slimpack.
//!
//! # Build pipeline
//!
//! ```text
//! slimpack build
//!   1. Manifest  ── package.json → RootManifest
//!   2. Walk      ── entry file → DependencyGraph (local files + externals)
//!   3. Assemble  ── reachable files, node_modules, package.json, config.js, index.js
//!   4. Archive   ── workspace → <output dir>/<build id>.zip
//!   5. Cleanup   ── workspace removed (unless retained)
//! ```
//!
//! # Workspace isolation
//!
//! Every build gets a [`BuildId`] of the form
//! `<unix timestamp>_<slug>_<random hex>`; the workspace lives at
//! `<temp dir>/<build id>` and the archive at `<output dir>/<build id>.zip`,
//! so concurrent builds never touch each other's files.

pub mod archive;
pub mod build;
pub mod build_id;
pub mod graph;
pub mod imports;
pub mod workspace;

pub use archive::{ArchiveError, archive};
pub use build::{BuildArtifact, BuildError, build};
pub use build_id::BuildId;
pub use graph::{DependencyGraph, GraphError, walk};
pub use workspace::{AssembleError, Assembled, PackageManifest, assemble};
