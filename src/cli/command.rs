use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "kube-select-exec", version)]
#[command(about = "Run a command in the first running pod matching a label selector")]
#[command(override_usage = "kube-select-exec [flags] command params -foo -bar=a")]
pub struct PodCli {
    /// Label selector used to find the pod
    #[arg(long, env = "FILTER")]
    pub filter: Option<String>,

    /// Container to execute the command in
    #[arg(long, env = "CONTAINER")]
    pub container: Option<String>,

    /// Kubeconfig path, or an OS path list of files to merge
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command and arguments, passed to the container verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl PodCli {
    pub fn into_config(self) -> Result<Config> {
        Config::new(self.filter, self.container, self.kubeconfig, self.command)
    }
}
