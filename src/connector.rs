//! Connecting the local kubeconfig to a selected cluster.
//!
//! Each provider owns the external command that writes kubeconfig entries
//! for its clusters. The connector only picks the provider's command and runs
//! it with the operator's terminal attached.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::DispatchError;
use crate::model::{Cluster, Provider};
use crate::provider::{aws, gcp};

/// An external credential-configuration invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl ConnectCommand {
    /// The command that configures kubeconfig access to `cluster`.
    pub fn for_cluster(cluster: &Cluster) -> Self {
        match cluster.provider() {
            Provider::Eks => aws::update_kubeconfig_command(cluster),
            Provider::Gke => gcp::get_credentials_command(cluster),
        }
    }
}

impl fmt::Display for ConnectCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Something that can connect kubeconfig to a cluster.
#[async_trait]
pub trait Dispatch: Send {
    async fn connect(&mut self, cluster: &Cluster) -> Result<(), DispatchError>;
}

/// Runs the provider's CLI as a child process with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessDispatcher;

impl ProcessDispatcher {
    pub async fn run(command: &ConnectCommand) -> Result<(), DispatchError> {
        info!("{command}");

        let status = Command::new(command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| DispatchError::Spawn {
                program: command.program.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DispatchError::Exit {
                program: command.program.to_string(),
                status,
            })
        }
    }
}

#[async_trait]
impl Dispatch for ProcessDispatcher {
    async fn connect(&mut self, cluster: &Cluster) -> Result<(), DispatchError> {
        Self::run(&ConnectCommand::for_cluster(cluster)).await
    }
}
