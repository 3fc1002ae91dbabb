use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Everything a single build needs, validated up front.
///
/// Relative paths (entry, execution file, additional files, removed
/// directories, runtime config) are guaranteed to stay inside their root:
/// they are never absolute and never contain `..`.
///
/// # Examples
///
/// ```
/// use slimpack_core::BuildRequest;
///
/// let request = BuildRequest::builder("resize-image", "/srv/app", "lib/handler.js")
///     .output_dir("/srv/app/dist")
///     .include_packages(false)
///     .build()
///     .unwrap();
/// assert_eq!(request.execution_file().to_str(), Some("lib/handler.js"));
/// assert!(!request.include_packages());
/// ```
#[derive(Debug, Clone)]
pub struct BuildRequest {
    function_name: String,
    app_root: PathBuf,
    entry_file: PathBuf,
    execution_file: PathBuf,
    additional_files: Vec<PathBuf>,
    remove_directories: Vec<PathBuf>,
    required_modules: BTreeMap<String, String>,
    runtime_config: PathBuf,
    output_dir: PathBuf,
    temp_dir: PathBuf,
    clear_output_dir: bool,
    delete_workspace: bool,
    include_packages: bool,
}

impl BuildRequest {
    pub fn builder(
        function_name: impl Into<String>,
        app_root: impl Into<PathBuf>,
        entry_file: impl Into<PathBuf>,
    ) -> BuildRequestBuilder {
        let app_root = app_root.into();
        let entry_file = entry_file.into();
        BuildRequestBuilder {
            function_name: function_name.into(),
            output_dir: app_root.join("dist"),
            execution_file: None,
            app_root,
            entry_file,
            additional_files: Vec::new(),
            remove_directories: Vec::new(),
            required_modules: BTreeMap::new(),
            runtime_config: PathBuf::from("config.json"),
            temp_dir: std::env::temp_dir(),
            clear_output_dir: true,
            delete_workspace: true,
            include_packages: true,
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    /// Graph root, relative to the app root.
    pub fn entry_file(&self) -> &Path {
        &self.entry_file
    }

    /// File copied to the canonical entry point, relative to the app root.
    pub fn execution_file(&self) -> &Path {
        &self.execution_file
    }

    pub fn additional_files(&self) -> &[PathBuf] {
        &self.additional_files
    }

    pub fn remove_directories(&self) -> &[PathBuf] {
        &self.remove_directories
    }

    pub fn required_modules(&self) -> &BTreeMap<String, String> {
        &self.required_modules
    }

    /// Runtime configuration object, relative to the app root.
    pub fn runtime_config(&self) -> &Path {
        &self.runtime_config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn clear_output_dir(&self) -> bool {
        self.clear_output_dir
    }

    pub fn delete_workspace(&self) -> bool {
        self.delete_workspace
    }

    pub fn include_packages(&self) -> bool {
        self.include_packages
    }
}

#[derive(Debug, Clone)]
pub struct BuildRequestBuilder {
    function_name: String,
    app_root: PathBuf,
    entry_file: PathBuf,
    execution_file: Option<PathBuf>,
    additional_files: Vec<PathBuf>,
    remove_directories: Vec<PathBuf>,
    required_modules: BTreeMap<String, String>,
    runtime_config: PathBuf,
    output_dir: PathBuf,
    temp_dir: PathBuf,
    clear_output_dir: bool,
    delete_workspace: bool,
    include_packages: bool,
}

impl BuildRequestBuilder {
    pub fn execution_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.execution_file = Some(path.into());
        self
    }

    pub fn additional_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.additional_files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn remove_directories<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.remove_directories
            .extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn required_modules(mut self, modules: BTreeMap<String, String>) -> Self {
        self.required_modules.extend(modules);
        self
    }

    pub fn runtime_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_config = path.into();
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn temp_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_dir = path.into();
        self
    }

    pub fn clear_output_dir(mut self, yes: bool) -> Self {
        self.clear_output_dir = yes;
        self
    }

    pub fn delete_workspace(mut self, yes: bool) -> Self {
        self.delete_workspace = yes;
        self
    }

    pub fn include_packages(mut self, yes: bool) -> Self {
        self.include_packages = yes;
        self
    }

    pub fn build(self) -> crate::Result<BuildRequest> {
        if self.function_name.trim().is_empty() {
            return Err(crate::Error::EmptyFunctionName);
        }

        validate_relative("entry", &self.entry_file)?;
        let execution_file = self.execution_file.unwrap_or_else(|| self.entry_file.clone());
        validate_relative("execution_file", &execution_file)?;
        validate_relative("runtime_config", &self.runtime_config)?;
        for path in &self.additional_files {
            validate_relative("additional_files", path)?;
        }
        for path in &self.remove_directories {
            validate_relative("remove_directories", path)?;
        }

        Ok(BuildRequest {
            function_name: self.function_name,
            app_root: self.app_root,
            entry_file: self.entry_file,
            execution_file,
            additional_files: self.additional_files,
            remove_directories: self.remove_directories,
            required_modules: self.required_modules,
            runtime_config: self.runtime_config,
            output_dir: self.output_dir,
            temp_dir: self.temp_dir,
            clear_output_dir: self.clear_output_dir,
            delete_workspace: self.delete_workspace,
            include_packages: self.include_packages,
        })
    }
}

fn validate_relative(field: &'static str, path: &Path) -> crate::Result<()> {
    let invalid = |reason| crate::Error::InvalidPath {
        field,
        path: path.display().to_string(),
        reason,
    };

    if !path.components().any(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid("path is empty"));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the project root"));
            }
        }
    }

    Ok(())
}
