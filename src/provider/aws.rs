//! Amazon EKS discovery.
//!
//! Profiles are read from the shared AWS config file, one client is built per
//! profile, and every profile is crossed with a static list of regions. Each
//! (profile, region) pair is one fetch unit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_eks::config::Region;
use futures::FutureExt;
use tracing::{debug, info};

use crate::config::AwsConfig;
use crate::connector::ConnectCommand;
use crate::discovery::{FetchUnit, fan_out};
use crate::error::{BoxError, DiscoveryError};
use crate::model::{Cluster, Provider};

pub const DEFAULT_PROFILE: &str = "default";

const DEFAULT_PROFILE_HEADER: &str = "[default]";
const PROFILE_PREFIX: &str = "[profile ";
const PROFILE_SUFFIX: &str = "]";

/// Public regions searched when no region list is configured.
pub const DEFAULT_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ap-south-1",
    "ap-northeast-3",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "sa-east-1",
];

/// Location of the shared AWS config file.
///
/// Honors `AWS_CONFIG_FILE`, otherwise `~/.aws/config`.
pub fn default_config_file() -> Option<PathBuf> {
    std::env::var_os("AWS_CONFIG_FILE")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("config")))
}

/// Read profile names from the shared config file, in file order.
pub fn read_profiles(path: &Path) -> Result<Vec<String>, DiscoveryError> {
    let content = std::fs::read_to_string(path).map_err(|source| DiscoveryError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let profiles = parse_profiles(&content);
    debug!(path = %path.display(), count = profiles.len(), "Read AWS profiles");
    Ok(profiles)
}

/// Extract profile names from config file content.
///
/// `[default]` yields `"default"`, `[profile <name>]` yields the trimmed name.
/// Every other line is ignored and duplicates are kept.
pub fn parse_profiles(content: &str) -> Vec<String> {
    content.lines().filter_map(parse_profile_line).collect()
}

fn parse_profile_line(line: &str) -> Option<String> {
    if line == DEFAULT_PROFILE_HEADER {
        return Some(DEFAULT_PROFILE.to_string());
    }
    line.strip_prefix(PROFILE_PREFIX)?
        .strip_suffix(PROFILE_SUFFIX)
        .map(|name| name.trim().to_string())
}

/// The EKS calls discovery needs.
#[async_trait]
pub trait EksApi: Send + Sync {
    /// Names of every cluster visible in `region`.
    async fn list_clusters(&self, region: &str) -> Result<Vec<String>, BoxError>;
}

/// EKS API bound to one profile's resolved configuration.
#[derive(Debug, Clone)]
pub struct EksClient {
    config: SdkConfig,
}

impl EksClient {
    /// Resolve credentials for `profile` and build a client for it.
    ///
    /// Profiles are looked up in `config_file` plus the default credentials
    /// file. The default profile uses the ambient credential chain.
    /// Credentials are resolved eagerly so a broken profile fails here and not
    /// in every region.
    pub async fn new(profile: &str, config_file: &Path) -> Result<Self, DiscoveryError> {
        let auth_error = |source: BoxError| DiscoveryError::Auth {
            provider: Provider::Eks,
            identity: profile.to_string(),
            source,
        };

        let profile_files = ProfileFiles::builder()
            .with_file(ProfileFileKind::Config, config_file)
            .include_default_credentials_file(true)
            .build();
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).profile_files(profile_files);
        if profile != DEFAULT_PROFILE {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        let credentials = config
            .credentials_provider()
            .ok_or_else(|| auth_error("no credentials provider configured".into()))?;
        credentials
            .provide_credentials()
            .await
            .map_err(|err| auth_error(Box::new(err)))?;

        Ok(Self { config })
    }
}

#[async_trait]
impl EksApi for EksClient {
    async fn list_clusters(&self, region: &str) -> Result<Vec<String>, BoxError> {
        let config = aws_sdk_eks::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        let client = aws_sdk_eks::Client::from_conf(config);

        let names = client
            .list_clusters()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await?;
        Ok(names)
    }
}

/// A client bound to the profile it was built for.
#[derive(Clone)]
pub struct ProfileClient {
    pub profile: String,
    pub api: Arc<dyn EksApi>,
}

/// Build one client per profile, resolving profiles against `config_file`.
///
/// Any failure aborts the whole set. A profile listed twice gets one client.
pub async fn create_clients(
    profiles: &[String],
    config_file: &Path,
) -> Result<Vec<ProfileClient>, DiscoveryError> {
    let mut clients: Vec<ProfileClient> = Vec::with_capacity(profiles.len());
    for profile in profiles {
        if clients.iter().any(|c| &c.profile == profile) {
            continue;
        }
        let client = EksClient::new(profile, config_file).await?;
        clients.push(ProfileClient {
            profile: profile.clone(),
            api: Arc::new(client),
        });
    }
    Ok(clients)
}

/// One fetch unit per (profile, region) pair.
pub fn fetch_units(clients: &[ProfileClient], regions: &[String]) -> Vec<FetchUnit> {
    clients
        .iter()
        .flat_map(|client| {
            regions
                .iter()
                .map(move |region| fetch_unit(client.clone(), region.clone()))
        })
        .collect()
}

fn fetch_unit(client: ProfileClient, region: String) -> FetchUnit {
    async move {
        let listed = client.api.list_clusters(&region).await;
        let names = match listed {
            Ok(names) => names,
            Err(source) => {
                return Err(DiscoveryError::Provider {
                    provider: Provider::Eks,
                    location: client.profile,
                    region,
                    source,
                });
            }
        };

        debug!(profile = %client.profile, %region, count = names.len(), "Listed EKS clusters");
        Ok(names
            .into_iter()
            .map(|name| Cluster::new(Provider::Eks, client.profile.as_str(), region.as_str(), name))
            .collect())
    }
    .boxed()
}

/// Discover clusters for prepared clients.
pub async fn discover_with(
    clients: &[ProfileClient],
    regions: &[String],
) -> Result<Vec<Cluster>, DiscoveryError> {
    Ok(fan_out(fetch_units(clients, regions)).await?)
}

/// Discover every EKS cluster reachable through the configured profiles.
pub async fn discover(config: &AwsConfig) -> Result<Vec<Cluster>, DiscoveryError> {
    let path = config
        .config_file
        .clone()
        .or_else(default_config_file)
        .ok_or_else(|| DiscoveryError::ConfigRead {
            path: PathBuf::from("~/.aws/config"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine home directory",
            ),
        })?;

    let profiles = read_profiles(&path)?;
    let clients = create_clients(&profiles, &path).await?;
    info!(
        profiles = clients.len(),
        regions = config.regions.len(),
        "Listing EKS clusters"
    );

    discover_with(&clients, &config.regions).await
}

/// `aws eks update-kubeconfig` for an EKS cluster.
pub fn update_kubeconfig_command(cluster: &Cluster) -> ConnectCommand {
    ConnectCommand {
        program: "aws",
        args: vec![
            "eks".to_string(),
            "--profile".to_string(),
            cluster.location().to_string(),
            "--region".to_string(),
            cluster.region().to_string(),
            "update-kubeconfig".to_string(),
            "--name".to_string(),
            cluster.name().to_string(),
        ],
    }
}
