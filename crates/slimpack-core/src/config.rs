use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::request::BuildRequest;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "slimpack.toml";

/// slimpack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlimpackConfig {
    #[serde(default)]
    pub package: PackageConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    /// Lambda functions the archive is published to
    #[serde(default)]
    pub functions: Vec<FunctionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Function/package name (defaults to package.json name)
    pub name: Option<String>,
    /// File where dependency discovery starts, relative to the app root
    #[serde(default = "default_entry")]
    pub entry: String,
    /// File copied to index.js and run at start-up (defaults to `entry`)
    pub execution_file: Option<String>,
    /// Extra files copied verbatim
    #[serde(default)]
    pub additional_files: Vec<String>,
    /// Workspace-relative directories deleted after assembly
    #[serde(default)]
    pub remove_directories: Vec<String>,
    /// External packages always bundled, with their version constraint
    #[serde(default)]
    pub required_modules: BTreeMap<String, String>,
    /// JSON object serialized into the workspace's config.js
    #[serde(default = "default_runtime_config")]
    pub runtime_config: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Where archives are written, relative to the app root
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Root for per-build workspaces (defaults to the OS temp dir)
    pub temp_dir: Option<PathBuf>,
    /// Remove the output directory before building
    #[serde(default = "default_true")]
    pub clear_output_dir: bool,
    /// Remove the workspace once the archive is written
    #[serde(default = "default_true")]
    pub delete_workspace: bool,
    /// Copy external packages from node_modules into the workspace
    #[serde(default = "default_true")]
    pub include_packages: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Lambda runtime identifier
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Default handler for functions that don't set one
    #[serde(default = "default_handler")]
    pub handler: String,
    /// Default execution role ARN
    pub role: Option<String>,
    /// AWS region (falls back to the CLI's configured region)
    pub region: Option<String>,
    /// AWS CLI profile
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub name: String,
    pub handler: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Memory size in MB
    #[serde(default = "default_memory")]
    pub memory: u32,
    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: None,
            entry: default_entry(),
            execution_file: None,
            additional_files: Vec::new(),
            remove_directories: Vec::new(),
            required_modules: BTreeMap::new(),
            runtime_config: default_runtime_config(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            temp_dir: None,
            clear_output_dir: true,
            delete_workspace: true,
            include_packages: true,
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            handler: default_handler(),
            role: None,
            region: None,
            profile: None,
        }
    }
}

impl SlimpackConfig {
    /// Load slimpack.toml from the given project directory.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(crate::Error::ConfigMissing {
                dir: project_dir.to_path_buf(),
            });
        }
        Self::load_file(&config_path)
    }

    /// Load a config file by explicit path, whatever its name.
    pub fn load_file(config_path: &Path) -> crate::Result<Self> {
        let content =
            std::fs::read_to_string(config_path).map_err(|e| crate::Error::ConfigLoad {
                path: config_path.to_path_buf(),
                source: e,
            })?;
        tracing::debug!(path = %config_path.display(), "loaded slimpack config");

        toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }

    /// Build a validated request for the project rooted at `app_root`.
    ///
    /// `fallback_name` is used when `[package].name` is unset, usually the
    /// `name` field of the root package.json.
    pub fn to_request(
        &self,
        app_root: &Path,
        fallback_name: Option<&str>,
    ) -> crate::Result<BuildRequest> {
        let name = self
            .package
            .name
            .as_deref()
            .or(fallback_name)
            .ok_or(crate::Error::EmptyFunctionName)?;

        let output_dir = app_root.join(&self.build.output_dir);
        let temp_dir = self
            .build
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        BuildRequest::builder(name, app_root, &self.package.entry)
            .execution_file(
                self.package
                    .execution_file
                    .as_deref()
                    .unwrap_or(&self.package.entry),
            )
            .additional_files(self.package.additional_files.iter().cloned())
            .remove_directories(self.package.remove_directories.iter().cloned())
            .required_modules(self.package.required_modules.clone())
            .runtime_config(&self.package.runtime_config)
            .output_dir(output_dir)
            .temp_dir(temp_dir)
            .clear_output_dir(self.build.clear_output_dir)
            .delete_workspace(self.build.delete_workspace)
            .include_packages(self.build.include_packages)
            .build()
    }
}

fn default_entry() -> String {
    "index.js".to_owned()
}

fn default_runtime_config() -> String {
    "config.json".to_owned()
}

fn default_output_dir() -> String {
    "dist".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_runtime() -> String {
    "nodejs20.x".to_owned()
}

fn default_handler() -> String {
    "index.handler".to_owned()
}

fn default_memory() -> u32 {
    128
}

fn default_timeout() -> u32 {
    3
}
