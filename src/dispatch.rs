use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::local_k8s::{select_by_filter, ExecRequest, ExecTarget, PodSource};

/// Selects a pod and runs one command in it.
pub struct ExecDispatcher<'a, S> {
    session: &'a S,
}

impl<'a, S> ExecDispatcher<'a, S>
where
    S: PodSource + ExecTarget + Sync,
{
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    pub async fn dispatch<O, E>(
        &self,
        target: &TargetConfig,
        stdout: &mut O,
        stderr: &mut E,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        tracing::debug!(
            "executing {:?} in container '{}' of pod matching '{}'",
            target.command,
            target.container,
            target.filter
        );

        let pod = select_by_filter(self.session, &target.filter)
            .await?
            .ok_or_else(|| Error::NotFound {
                selector: target.filter.clone(),
            })?;
        tracing::debug!("using pod {}/{}", pod.namespace, pod.name);
        if !pod.containers.iter().any(|c| c == &target.container) {
            // Not fatal here, the API server validates the container.
            tracing::warn!(
                "pod {} has no container '{}' (containers: {:?})",
                pod.name,
                target.container,
                pod.containers
            );
        }

        let request = ExecRequest::new(&pod, &target.container, target.command.clone())?;
        self.session
            .exec(&request, stdout, stderr, cancel)
            .await
    }
}
