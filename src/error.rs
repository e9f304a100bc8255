use thiserror::Error;

/// Exit code for every failure that is not a remote non-zero exit.
pub const LOCAL_FAILURE_EXIT_CODE: u8 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("no kubeconfig file found in {0}")]
    MissingKubeconfig(String),

    #[error("failed to infer cluster config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("failed to build cluster client: {0}")]
    Client(#[source] kube::Error),

    #[error("failed to list pods: {0}")]
    List(#[source] kube::Error),

    #[error("no running pod found matching selector '{selector}'")]
    NotFound { selector: String },

    #[error("exec stream failed: {0}")]
    Stream(String),

    #[error("remote command exited with status {status}")]
    RemoteExit { status: i32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True for failures raised while establishing the cluster session.
    pub fn is_session_setup(&self) -> bool {
        matches!(
            self,
            Error::Kubeconfig(_)
                | Error::MissingKubeconfig(_)
                | Error::InferConfig(_)
                | Error::Client(_)
        )
    }

    /// Process exit code for this error. Remote statuses pass through,
    /// anything outside 1..=255 collapses to the local failure code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::RemoteExit { status } => u8::try_from(*status)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(LOCAL_FAILURE_EXIT_CODE),
            _ => LOCAL_FAILURE_EXIT_CODE,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Stream(err.to_string())
    }
}
