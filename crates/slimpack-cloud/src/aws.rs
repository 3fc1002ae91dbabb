#[derive(Debug, thiserror::Error)]
pub enum AwsError {
    #[error("aws CLI not found — install: https://docs.aws.amazon.com/cli/latest/userguide/getting-started-install.html")]
    NotFound { source: std::io::Error },

    #[error("aws command failed: {args:?}\n{stderr}")]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("aws output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },
}

impl AwsError {
    /// Whether the service reported that the named resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { stderr, .. } if stderr.contains("ResourceNotFoundException")
        )
    }
}
