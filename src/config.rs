//! Explicit run configuration.
//!
//! Everything the core needs is collected here at the CLI boundary; the
//! session, selector and streamer never look at process environment.

use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Kubeconfig files to merge, in precedence order. Empty falls back to
    /// kube's inference chain.
    pub kubeconfigs: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub filter: String,
    pub container: String,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub session: SessionConfig,
    pub target: TargetConfig,
}

impl Config {
    pub fn new(
        filter: Option<String>,
        container: Option<String>,
        kubeconfig: Option<PathBuf>,
        command: Vec<String>,
    ) -> Result<Self> {
        let filter = required(filter, "filter")?;
        let container = required(container, "container")?;
        if command.is_empty() {
            return Err(Error::Configuration("no command given".to_string()));
        }
        // KUBECONFIG is an OS path list, same as PATH.
        let kubeconfigs = kubeconfig
            .map(|list| {
                std::env::split_paths(&list)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session: SessionConfig { kubeconfigs },
            target: TargetConfig {
                filter,
                container,
                command,
            },
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Configuration(format!("no \"{name}\" set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn builds_config_from_values() {
        let config = Config::new(
            Some("app=web".into()),
            Some("app".into()),
            Some(PathBuf::from("/tmp/kubeconfig")),
            cmd(&["echo", "a;b"]),
        )
        .unwrap();

        assert_eq!(config.target.filter, "app=web");
        assert_eq!(config.target.container, "app");
        assert_eq!(config.target.command, cmd(&["echo", "a;b"]));
        assert_eq!(
            config.session.kubeconfigs,
            vec![PathBuf::from("/tmp/kubeconfig")]
        );
    }

    #[test]
    fn missing_filter_is_rejected() {
        let err = Config::new(None, Some("app".into()), None, cmd(&["true"])).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("filter")));
    }

    #[test]
    fn blank_container_is_rejected() {
        let err =
            Config::new(Some("app=web".into()), Some("  ".into()), None, cmd(&["true"])).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("container")));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = Config::new(Some("app=web".into()), Some("app".into()), None, vec![]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn kubeconfig_path_list_is_split() {
        let list = std::env::join_paths(["/tmp/a.yaml", "", "/tmp/b.yaml"]).unwrap();
        let config = Config::new(
            Some("app=web".into()),
            Some("app".into()),
            Some(PathBuf::from(list)),
            cmd(&["true"]),
        )
        .unwrap();
        assert_eq!(
            config.session.kubeconfigs,
            vec![PathBuf::from("/tmp/a.yaml"), PathBuf::from("/tmp/b.yaml")]
        );
    }

    #[test]
    fn empty_kubeconfig_falls_back_to_inference() {
        let config = Config::new(
            Some("app=web".into()),
            Some("app".into()),
            Some(PathBuf::new()),
            cmd(&["true"]),
        )
        .unwrap();
        assert_eq!(config.session, SessionConfig::default());
    }
}
