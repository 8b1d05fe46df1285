use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "k8s-connector",
    version,
    about = "Pick an EKS or GKE cluster and configure kubeconfig access to it"
)]
pub struct Args {
    /// GCP comma separated projects list (empty skips GKE discovery)
    #[arg(short, long)]
    pub projects: Option<String>,

    /// AWS comma separated regions list, overriding the built-in list
    #[arg(short, long)]
    pub regions: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
