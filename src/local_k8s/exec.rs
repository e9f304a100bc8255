//! Non-interactive exec into a pod container.
//!
//! Only stdout and stderr are requested. Both are copied to the local
//! writers until the remote side closes them, after which the exit status
//! sent on the error channel decides the outcome.

use async_trait::async_trait;
use k8s_openapi::{api::core::v1::Pod, apimachinery::pkg::apis::meta::v1::Status};
use kube::api::{Api, AttachParams};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::pods::WorkloadPod;
use super::session::KubeSession;
use crate::error::{Error, Result};

/// One command to run in one container of one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub pod: String,
    pub namespace: String,
    pub container: String,
    pub command: Vec<String>,
}

impl ExecRequest {
    pub fn new(pod: &WorkloadPod, container: &str, command: Vec<String>) -> Result<Self> {
        if command.is_empty() {
            return Err(Error::Configuration("no command given".to_string()));
        }
        Ok(Self {
            pod: pod.name.clone(),
            namespace: pod.namespace.clone(),
            container: container.to_string(),
            command,
        })
    }
}

/// Anything that can run an [`ExecRequest`] and relay its output.
#[async_trait]
pub trait ExecTarget {
    async fn exec<O, E>(
        &self,
        request: &ExecRequest,
        stdout: &mut O,
        stderr: &mut E,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send;
}

pub fn attach_params(container: &str) -> AttachParams {
    AttachParams::default()
        .container(container)
        .stdin(false)
        .stdout(true)
        .stderr(true)
        .tty(false)
}

#[async_trait]
impl ExecTarget for KubeSession {
    async fn exec<O, E>(
        &self,
        request: &ExecRequest,
        stdout: &mut O,
        stderr: &mut E,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        stdout.flush().await?;
        stderr.flush().await?;

        // The pod snapshot carries its own namespace; fall back to the session's
        // for pods built without one.
        let namespace = if request.namespace.is_empty() {
            self.namespace()
        } else {
            request.namespace.as_str()
        };
        let pods: Api<Pod> = Api::namespaced(self.client().clone(), namespace);
        let ap = attach_params(&request.container);
        let mut attached = tokio::select! {
            attached = pods.exec(&request.pod, request.command.clone(), &ap) => {
                attached.map_err(|e| Error::Stream(e.to_string()))?
            }
            _ = cancel.cancelled() => return Err(Error::Stream("cancelled".to_string())),
        };

        let remote_stdout = attached
            .stdout()
            .ok_or_else(|| Error::Stream("stdout channel not available".to_string()))?;
        let remote_stderr = attached
            .stderr()
            .ok_or_else(|| Error::Stream("stderr channel not available".to_string()))?;
        let status = attached
            .take_status()
            .ok_or_else(|| Error::Stream("status channel not available".to_string()))?;

        relay(remote_stdout, remote_stderr, stdout, stderr, cancel).await?;

        let status = tokio::select! {
            status = status => status,
            _ = cancel.cancelled() => return Err(Error::Stream("cancelled".to_string())),
        };
        attached
            .join()
            .await
            .map_err(|e| Error::Stream(e.to_string()))?;

        exit_result(status)
    }
}

/// Copy both remote streams to the local writers until EOF on each.
pub async fn relay<RO, RE, O, E>(
    mut remote_stdout: RO,
    mut remote_stderr: RE,
    stdout: &mut O,
    stderr: &mut E,
    cancel: &CancellationToken,
) -> Result<()>
where
    RO: AsyncRead + Unpin,
    RE: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let copy = async {
        futures::try_join!(
            tokio::io::copy(&mut remote_stdout, &mut *stdout),
            tokio::io::copy(&mut remote_stderr, &mut *stderr),
        )
    };

    let (out_bytes, err_bytes) = tokio::select! {
        copied = copy => copied?,
        _ = cancel.cancelled() => return Err(Error::Stream("cancelled".to_string())),
    };
    stdout.flush().await?;
    stderr.flush().await?;

    tracing::debug!("relayed {} bytes of stdout, {} bytes of stderr", out_bytes, err_bytes);
    Ok(())
}

/// Turn the final status frame of an exec stream into a result.
pub fn exit_result(status: Option<Status>) -> Result<()> {
    let status = status
        .ok_or_else(|| Error::Stream("stream closed without an exit status".to_string()))?;

    if status.status.as_deref() == Some("Success") {
        return Ok(());
    }

    if status.reason.as_deref() == Some("NonZeroExitCode") {
        let code = status
            .details
            .as_ref()
            .and_then(|d| d.causes.as_ref())
            .and_then(|causes| {
                causes
                    .iter()
                    .find(|c| c.reason.as_deref() == Some("ExitCode"))
            })
            .and_then(|c| c.message.as_deref())
            .and_then(|m| m.trim().parse::<i32>().ok());
        if let Some(status) = code {
            return Err(Error::RemoteExit { status });
        }
    }

    Err(Error::Stream(
        status
            .message
            .unwrap_or_else(|| "remote command failed without a message".to_string()),
    ))
}
