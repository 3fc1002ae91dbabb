mod build;
mod deploy;
mod graph;
mod init;

use slimpack_core::{BuildRequest, RootManifest, SlimpackConfig, config::CONFIG_FILE};
use std::path::{Path, PathBuf};

pub use build::build;
pub use deploy::deploy;
pub use graph::graph;
pub use init::init_project;

/// A loaded project: where it lives and how it is configured.
pub(crate) struct Project {
    pub app_root: PathBuf,
    pub config: SlimpackConfig,
}

impl Project {
    /// Load `config_path`, or `./slimpack.toml` when none is given.
    ///
    /// The directory holding the config file is the application root.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = config_path else {
            let app_root = PathBuf::from(".");
            let config = SlimpackConfig::load(&app_root)?;
            return Ok(Self { app_root, config });
        };

        let app_root = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let config = SlimpackConfig::load_file(path)?;
        Ok(Self { app_root, config })
    }

    /// Validated request for this project, named after `[package].name` or
    /// the package.json `name`.
    pub fn request(&self) -> anyhow::Result<BuildRequest> {
        let fallback = match self.config.package.name {
            Some(_) => None,
            None => RootManifest::load(&self.app_root)?.name,
        };
        self.config
            .to_request(&self.app_root, fallback.as_deref())
            .map_err(|e| match e {
                slimpack_core::Error::EmptyFunctionName => anyhow::anyhow!(
                    "no function name: set [package].name in {CONFIG_FILE} or \"name\" in package.json"
                ),
                other => other.into(),
            })
    }
}
