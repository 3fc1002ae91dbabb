use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("slimpack.toml not found in {dir} — run `slimpack init` first")]
    ConfigMissing { dir: PathBuf },

    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {field} path {path:?}: {reason}")]
    InvalidPath {
        field: &'static str,
        path: String,
        reason: &'static str,
    },

    #[error("function name must not be empty")]
    EmptyFunctionName,

    // ── Root manifest ──
    #[error("failed to read manifest {path}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ── Runtime configuration ──
    #[error("failed to read runtime config {path}")]
    RuntimeConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse runtime config {path}")]
    RuntimeConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("runtime config {path} must contain a JSON object")]
    RuntimeConfigInvalid { path: PathBuf },
}

impl Error {
    /// Whether this error belongs to the root manifest / runtime config class.
    ///
    /// These abort a build before the workspace is touched.
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::ManifestRead { .. }
                | Self::ManifestParse { .. }
                | Self::RuntimeConfigRead { .. }
                | Self::RuntimeConfigParse { .. }
                | Self::RuntimeConfigInvalid { .. }
        )
    }
}
