use crate::aws::AwsError;
use crate::executor::{AwsExecutor, RealExecutor};
use futures::future::join_all;
use slimpack_core::{DeployConfig, FunctionConfig};
use std::path::Path;

/// Lambda operations client, parameterized over the executor for testability.
pub struct LambdaClient<E: AwsExecutor = RealExecutor> {
    executor: E,
}

impl LambdaClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for LambdaClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: AwsExecutor> LambdaClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Version string reported by the installed aws CLI.
    pub async fn cli_version(&self) -> Result<String, AwsError> {
        let out = self.executor.exec(&args(["--version"])).await?;
        Ok(out.trim().to_owned())
    }

    // ── Publish ──

    /// Upload `archive` to every function in `functions`.
    ///
    /// Uploads run concurrently and each one's outcome is reported
    /// independently; a failing function does not stop the others. Only an
    /// unusable archive path fails the whole call.
    pub async fn publish(
        &self,
        archive: &Path,
        functions: &[FunctionConfig],
        deploy: &DeployConfig,
    ) -> Result<PublishReport, PublishError> {
        if !archive.is_file() {
            return Err(PublishError::ArchiveMissing(archive.to_path_buf()));
        }
        let archive_str = archive
            .to_str()
            .ok_or_else(|| PublishError::InvalidPath(archive.to_path_buf()))?;
        let zip_file = format!("fileb://{archive_str}");
        let zip_file = zip_file.as_str();

        let uploads = functions.iter().map(|function| async move {
            tracing::info!(function = %function.name, "uploading");
            let result = self.upload(zip_file, function, deploy).await;
            match &result {
                Ok(arn) => tracing::info!(function = %function.name, %arn, "published"),
                Err(e) => tracing::warn!(function = %function.name, error = %e, "upload failed"),
            }
            PublishOutcome {
                function: function.name.clone(),
                result,
            }
        });

        Ok(PublishReport {
            outcomes: join_all(uploads).await,
        })
    }

    /// Create or update one function; returns its ARN.
    async fn upload(
        &self,
        zip_file: &str,
        function: &FunctionConfig,
        deploy: &DeployConfig,
    ) -> Result<String, PublishError> {
        let name = function.name.as_str();
        let handler = function.handler.as_deref().unwrap_or(&deploy.handler);
        let role = function.role.as_deref().or(deploy.role.as_deref());
        let memory = function.memory.to_string();
        let timeout = function.timeout.to_string();

        let exists = match self
            .executor
            .exec(&lambda(deploy, ["get-function", "--function-name", name]))
            .await
        {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                return Err(PublishError::Lookup {
                    function: name.to_owned(),
                    source: e,
                });
            }
        };

        if !exists {
            let role = role.ok_or_else(|| PublishError::MissingRole(name.to_owned()))?;
            let arn = self
                .executor
                .exec(&lambda(
                    deploy,
                    [
                        "create-function",
                        "--function-name",
                        name,
                        "--runtime",
                        &deploy.runtime,
                        "--handler",
                        handler,
                        "--role",
                        role,
                        "--description",
                        &function.description,
                        "--memory-size",
                        &memory,
                        "--timeout",
                        &timeout,
                        "--zip-file",
                        zip_file,
                        "--query",
                        "FunctionArn",
                        "--output",
                        "text",
                    ],
                ))
                .await
                .map_err(|e| PublishError::Create {
                    function: name.to_owned(),
                    source: e,
                })?;
            return Ok(arn.trim().to_owned());
        }

        let arn = self
            .executor
            .exec(&lambda(
                deploy,
                [
                    "update-function-code",
                    "--function-name",
                    name,
                    "--zip-file",
                    zip_file,
                    "--query",
                    "FunctionArn",
                    "--output",
                    "text",
                ],
            ))
            .await
            .map_err(|e| PublishError::UpdateCode {
                function: name.to_owned(),
                source: e,
            })?;

        // Configuration updates are rejected while the code update is in progress.
        self.executor
            .exec(&lambda(
                deploy,
                ["wait", "function-updated", "--function-name", name],
            ))
            .await
            .map_err(|e| PublishError::Wait {
                function: name.to_owned(),
                source: e,
            })?;

        let mut config = vec![
            "update-function-configuration",
            "--function-name",
            name,
            "--runtime",
            &deploy.runtime,
            "--handler",
            handler,
            "--description",
            &function.description,
            "--memory-size",
            &memory,
            "--timeout",
            &timeout,
        ];
        if let Some(role) = role {
            config.push("--role");
            config.push(role);
        }
        self.executor
            .exec(&lambda(deploy, config))
            .await
            .map_err(|e| PublishError::UpdateConfig {
                function: name.to_owned(),
                source: e,
            })?;

        Ok(arn.trim().to_owned())
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

/// `aws lambda <a...>` plus the configured region and profile.
fn lambda<'a>(deploy: &DeployConfig, a: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut cmd = vec!["lambda".to_owned()];
    cmd.extend(a.into_iter().map(str::to_owned));
    if let Some(region) = &deploy.region {
        cmd.push("--region".to_owned());
        cmd.push(region.clone());
    }
    if let Some(profile) = &deploy.profile {
        cmd.push("--profile".to_owned());
        cmd.push(profile.clone());
    }
    cmd
}

// ── Report types ──

#[derive(Debug)]
pub struct PublishOutcome {
    pub function: String,
    /// Function ARN on success
    pub result: Result<String, PublishError>,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PublishOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("archive not found: {0}")]
    ArchiveMissing(std::path::PathBuf),

    #[error("archive path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("no execution role for new function '{0}' — set [deploy].role or the function's role")]
    MissingRole(String),

    #[error("failed to look up function '{function}'")]
    Lookup { function: String, source: AwsError },

    #[error("failed to create function '{function}'")]
    Create { function: String, source: AwsError },

    #[error("failed to upload code for '{function}'")]
    UpdateCode { function: String, source: AwsError },

    #[error("function '{function}' did not finish updating")]
    Wait { function: String, source: AwsError },

    #[error("failed to update configuration of '{function}'")]
    UpdateConfig { function: String, source: AwsError },
}
