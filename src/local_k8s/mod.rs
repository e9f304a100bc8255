mod exec;
mod pods;
mod session;

pub use exec::{ExecRequest, ExecTarget};
pub use pods::{select_by_filter, PodPhase, PodSource, WorkloadPod};
pub use session::KubeSession;

#[cfg(test)]
pub(crate) use pods::tests::pod;
