//! Google GKE discovery.
//!
//! GKE discovery is optional: with no projects configured nothing is listed.
//! Otherwise one client is built from application-default credentials and
//! each project is listed across all of its locations as one fetch unit.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use google_cloud_container_v1::client::ClusterManager;
use tracing::{debug, info, warn};

use crate::connector::ConnectCommand;
use crate::discovery::{FetchUnit, fan_out};
use crate::error::{BoxError, DiscoveryError};
use crate::model::{Cluster, Provider};

/// Split a comma separated project list.
///
/// Ids are trimmed and blanks dropped, so `""` and `" , "` yield no projects.
pub fn parse_projects(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|project| !project.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// A cluster as returned by the GKE API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GkeCluster {
    pub name: String,
    /// Zone or region the cluster lives in.
    pub location: String,
}

/// The GKE calls discovery needs.
#[async_trait]
pub trait GkeApi: Send + Sync {
    /// Every cluster of `project`, across all locations.
    async fn list_clusters(&self, project: &str) -> Result<Vec<GkeCluster>, BoxError>;
}

#[derive(Debug, Clone)]
pub struct GkeClient {
    client: ClusterManager,
}

impl GkeClient {
    /// Build a client using application-default credentials.
    pub async fn new() -> Result<Self, DiscoveryError> {
        let auth_error = |source: BoxError| DiscoveryError::Auth {
            provider: Provider::Gke,
            identity: "application-default credentials".to_string(),
            source,
        };

        let credentials = google_cloud_auth::credentials::Builder::default()
            .build()
            .map_err(|err| auth_error(Box::new(err)))?;
        let client = ClusterManager::builder()
            .with_credentials(credentials)
            .build()
            .await
            .map_err(|err| auth_error(Box::new(err)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl GkeApi for GkeClient {
    async fn list_clusters(&self, project: &str) -> Result<Vec<GkeCluster>, BoxError> {
        let response = self
            .client
            .list_clusters()
            .set_parent(format!("projects/{project}/locations/-"))
            .send()
            .await?;

        if !response.missing_zones.is_empty() {
            warn!(
                project,
                zones = ?response.missing_zones,
                "GKE listing is missing zones"
            );
        }

        Ok(response
            .clusters
            .into_iter()
            .map(|cluster| GkeCluster {
                name: cluster.name,
                location: cluster.location,
            })
            .collect())
    }
}

/// One fetch unit per project.
pub fn fetch_units(api: &Arc<dyn GkeApi>, projects: &[String]) -> Vec<FetchUnit> {
    projects
        .iter()
        .map(|project| fetch_unit(Arc::clone(api), project.clone()))
        .collect()
}

fn fetch_unit(api: Arc<dyn GkeApi>, project: String) -> FetchUnit {
    async move {
        let listed = api.list_clusters(&project).await;
        let clusters = match listed {
            Ok(clusters) => clusters,
            Err(source) => {
                return Err(DiscoveryError::Provider {
                    provider: Provider::Gke,
                    location: project,
                    region: "-".to_string(),
                    source,
                });
            }
        };

        debug!(%project, count = clusters.len(), "Listed GKE clusters");
        Ok(clusters
            .into_iter()
            .map(|c| Cluster::new(Provider::Gke, project.as_str(), c.location, c.name))
            .collect())
    }
    .boxed()
}

/// Discover clusters of `projects` through a prepared client.
pub async fn discover_with(
    api: &Arc<dyn GkeApi>,
    projects: &[String],
) -> Result<Vec<Cluster>, DiscoveryError> {
    Ok(fan_out(fetch_units(api, projects)).await?)
}

/// Discover every GKE cluster of `projects`.
pub async fn discover(projects: &[String]) -> Result<Vec<Cluster>, DiscoveryError> {
    if projects.is_empty() {
        debug!("No GCP projects given, skipping GKE discovery");
        return Ok(Vec::new());
    }

    let api: Arc<dyn GkeApi> = Arc::new(GkeClient::new().await?);
    info!(projects = projects.len(), "Listing GKE clusters");
    discover_with(&api, projects).await
}

/// `gcloud container clusters get-credentials` for a GKE cluster.
pub fn get_credentials_command(cluster: &Cluster) -> ConnectCommand {
    ConnectCommand {
        program: "gcloud",
        args: vec![
            "container".to_string(),
            "clusters".to_string(),
            "get-credentials".to_string(),
            cluster.name().to_string(),
            "--project".to_string(),
            cluster.location().to_string(),
            "--region".to_string(),
            cluster.region().to_string(),
        ],
    }
}
