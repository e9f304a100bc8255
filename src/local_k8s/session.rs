use std::path::PathBuf;

use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};

use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// Authenticated client bound to the namespace of the resolved context.
#[derive(Clone)]
pub struct KubeSession {
    client: Client,
    namespace: String,
}

impl KubeSession {
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let kube_config = if config.kubeconfigs.is_empty() {
            Config::infer().await?
        } else {
            let kubeconfig = merged_kubeconfig(&config.kubeconfigs)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        };
        let namespace = kube_config.default_namespace.clone();
        let client = Client::try_from(kube_config).map_err(Error::Client)?;

        tracing::debug!("cluster session ready in namespace {}", namespace);
        Ok(Self::from_client(client, namespace))
    }

    pub fn from_client(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Read every existing file of the list and merge them, earlier files first.
/// Missing entries are skipped as long as at least one file exists.
fn merged_kubeconfig(paths: &[PathBuf]) -> Result<Kubeconfig> {
    let mut merged: Option<Kubeconfig> = None;
    for path in paths.iter().filter(|p| p.is_file()) {
        tracing::debug!("loading kubeconfig from {}", path.display());
        let next = Kubeconfig::read_from(path)?;
        merged = Some(match merged {
            Some(current) => current.merge(next)?,
            None => next,
        });
    }
    merged.ok_or_else(|| {
        let listed: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        Error::MissingKubeconfig(listed.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_kubeconfig(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "kube-select-exec-{}-{}.yaml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    const DEV_CLUSTER: &str = r#"apiVersion: v1
kind: Config
current-context: dev
clusters:
- name: dev
  cluster:
    server: http://127.0.0.1:8080
"#;

    const DEV_CONTEXT: &str = r#"apiVersion: v1
kind: Config
current-context: other
contexts:
- name: dev
  context:
    cluster: dev
    user: dev
    namespace: payments
users:
- name: dev
  user:
    token: abc
"#;

    #[tokio::test]
    async fn missing_kubeconfig_is_a_session_setup_error() {
        let config = SessionConfig {
            kubeconfigs: vec![PathBuf::from("/nonexistent/kube-select-exec/config")],
        };
        let err = KubeSession::connect(&config).await.err().unwrap();
        assert!(matches!(err, Error::MissingKubeconfig(_)), "{err}");
        assert!(err.is_session_setup());
    }

    #[tokio::test]
    async fn unparseable_kubeconfig_is_a_session_setup_error() {
        let path = temp_kubeconfig("invalid", "clusters: [this is: not valid");
        let config = SessionConfig {
            kubeconfigs: vec![path.clone()],
        };
        let result = KubeSession::connect(&config).await;
        std::fs::remove_file(&path).unwrap();
        assert!(result.err().unwrap().is_session_setup());
    }

    #[tokio::test]
    async fn namespace_comes_from_current_context() {
        let path = temp_kubeconfig(
            "single",
            r#"current-context: dev
clusters:
- name: dev
  cluster:
    server: http://127.0.0.1:8080
contexts:
- name: dev
  context:
    cluster: dev
    user: dev
    namespace: payments
users:
- name: dev
  user:
    token: abc
"#,
        );
        let config = SessionConfig {
            kubeconfigs: vec![path.clone()],
        };
        let result = KubeSession::connect(&config).await;
        std::fs::remove_file(&path).unwrap();
        let session = result.unwrap();
        assert_eq!(session.namespace(), "payments");
    }

    #[tokio::test]
    async fn path_list_is_merged_in_order() {
        let clusters = temp_kubeconfig("merge-a", DEV_CLUSTER);
        let contexts = temp_kubeconfig("merge-b", DEV_CONTEXT);
        let config = SessionConfig {
            kubeconfigs: vec![
                clusters.clone(),
                PathBuf::from("/nonexistent/kube-select-exec/config"),
                contexts.clone(),
            ],
        };
        let result = KubeSession::connect(&config).await;
        std::fs::remove_file(&clusters).unwrap();
        std::fs::remove_file(&contexts).unwrap();

        // current-context from the first file, context and user from the second
        let session = result.unwrap();
        assert_eq!(session.namespace(), "payments");
    }
}
