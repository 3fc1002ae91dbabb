//! Root `package.json` and runtime configuration readers.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Version recorded when the root manifest does not declare one.
const DEFAULT_VERSION: &str = "0.0.0";

/// Fields slimpack needs from the project's root package.json.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootManifest {
    pub name: Option<String>,
    pub version: String,
    /// Declared dependency version constraints
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl RootManifest {
    /// Read `<app_root>/package.json`.
    pub fn load(app_root: &Path) -> crate::Result<Self> {
        let path = app_root.join(crate::MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| crate::Error::ManifestRead {
            path: path.clone(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| crate::Error::ManifestParse { path, source: e })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let parsed: PackageJson = serde_json::from_str(content)?;
        Ok(Self {
            name: parsed.name,
            version: parsed
                .version
                .unwrap_or_else(|| DEFAULT_VERSION.to_owned()),
            dependencies: parsed.dependencies,
        })
    }

    /// Declared constraint for `name`, if any.
    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        self.dependencies.get(name).map(String::as_str)
    }
}

/// The project's runtime configuration object, baked into the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    value: serde_json::Map<String, serde_json::Value>,
}

impl RuntimeConfig {
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::Error::RuntimeConfigRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| crate::Error::RuntimeConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        match value {
            serde_json::Value::Object(value) => Ok(Self { value }),
            _ => Err(crate::Error::RuntimeConfigInvalid {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.value
    }

    /// Render as a self-contained CommonJS module, tab-indented.
    pub fn to_module(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(&self.value, &mut ser)?;
        Ok(format!(
            "module.exports = {};\n",
            String::from_utf8_lossy(&buf)
        ))
    }
}
