//! Core types and configuration for slimpack.
//!
//! This crate defines the `slimpack.toml` schema ([`SlimpackConfig`]),
//! the validated [`BuildRequest`] handed to the build pipeline, the root
//! `package.json` reader ([`RootManifest`]), and shared error types.

pub mod config;
pub mod error;
pub mod manifest;
pub mod request;

pub use config::{BuildConfig, DeployConfig, FunctionConfig, PackageConfig, SlimpackConfig};
pub use error::{Error, Result};
pub use manifest::{RootManifest, RuntimeConfig};
pub use request::BuildRequest;

/// Version constraint recorded for external packages nobody pinned.
pub const ANY_VERSION: &str = "*";

/// Directory, relative to the app root and the workspace, holding external packages.
pub const PACKAGE_STORE_DIR: &str = "node_modules";

/// File name of the root and synthesized manifests.
pub const MANIFEST_FILE: &str = "package.json";

/// File name the execution entry is copied to inside the workspace.
pub const ENTRY_FILE: &str = "index.js";

/// File name of the synthesized runtime configuration module.
pub const CONFIG_MODULE_FILE: &str = "config.js";
