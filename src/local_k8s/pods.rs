use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, ListParams},
    ResourceExt,
};

use super::session::KubeSession;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Read-only snapshot of a pod as returned by the list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadPod {
    pub name: String,
    pub namespace: String,
    pub phase: PodPhase,
    pub containers: Vec<String>,
}

impl WorkloadPod {
    pub fn is_running(&self) -> bool {
        self.phase == PodPhase::Running
    }
}

impl From<Pod> for WorkloadPod {
    fn from(pod: Pod) -> Self {
        let name = pod.name_any();
        let namespace = pod.namespace().unwrap_or_default();
        let phase = PodPhase::parse(pod.status.as_ref().and_then(|s| s.phase.as_deref()));
        let containers = pod
            .spec
            .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
            .unwrap_or_default();

        Self {
            name,
            namespace,
            phase,
            containers,
        }
    }
}

/// Anything that can list pods in the session namespace by label selector.
#[async_trait]
pub trait PodSource {
    async fn list_pods(&self, selector: &str) -> Result<Vec<WorkloadPod>>;
}

#[async_trait]
impl PodSource for KubeSession {
    async fn list_pods(&self, selector: &str) -> Result<Vec<WorkloadPod>> {
        let pods: Api<Pod> = Api::namespaced(self.client().clone(), self.namespace());
        let list = pods
            .list(&ListParams::default().labels(selector))
            .await
            .map_err(Error::List)?;
        Ok(list.items.into_iter().map(WorkloadPod::from).collect())
    }
}

/// First running pod in list order.
///
/// List order is whatever the API server returns, so with several running
/// pods the choice is effectively arbitrary. Kept as-is until a real
/// tie-break policy is decided.
pub fn first_running(pods: Vec<WorkloadPod>) -> Option<WorkloadPod> {
    let total = pods.len();
    let mut running = pods.into_iter().filter(WorkloadPod::is_running);
    let chosen = running.next();
    let skipped = running.count();
    if skipped > 0 {
        tracing::debug!(
            "{} running pods matched out of {}, taking the first in list order",
            skipped + 1,
            total
        );
    }
    chosen
}

/// Resolve a label selector to one running pod. No running pod is `Ok(None)`,
/// a failed list call is `Err(Error::List)`.
pub async fn select_by_filter<S>(source: &S, selector: &str) -> Result<Option<WorkloadPod>>
where
    S: PodSource + Sync + ?Sized,
{
    if selector.trim().is_empty() {
        return Err(Error::Configuration("empty label selector".to_string()));
    }
    let pods = source.list_pods(selector).await?;
    tracing::debug!("selector '{}' matched {} pods", selector, pods.len());
    Ok(first_running(pods))
}
