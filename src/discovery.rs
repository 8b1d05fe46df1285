//! Concurrent cluster discovery.
//!
//! Every provider call is a fetch unit: one boxed future producing the
//! clusters of a single (identity, locality) pair. [`fan_out`] spawns all
//! units at once and joins them with an all-or-nothing policy: if any unit
//! fails, every other unit still runs to completion but the caller only sees
//! the aggregated errors.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{CompositeError, DiscoveryError};
use crate::model::Cluster;

/// One independent discovery call.
pub type FetchUnit = BoxFuture<'static, Result<Vec<Cluster>, DiscoveryError>>;

/// Run all units concurrently and merge their clusters.
///
/// Clusters are appended in completion order, which is not deterministic.
/// The catalog imposes the final ordering.
pub async fn fan_out<I>(units: I) -> Result<Vec<Cluster>, CompositeError>
where
    I: IntoIterator<Item = FetchUnit>,
{
    let collected = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = JoinSet::new();

    for unit in units {
        let collected = Arc::clone(&collected);
        tasks.spawn(async move {
            let clusters = unit.await?;
            collected
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(clusters);
            Ok::<_, DiscoveryError>(())
        });
    }

    let total = tasks.len();
    let mut errors = CompositeError::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(%err, "Discovery unit failed");
                errors.push(err);
            }
            Err(err) => {
                warn!(%err, "Discovery task did not complete");
                errors.push(DiscoveryError::Task(err.to_string()));
            }
        }
    }

    debug!(units = total, failed = errors.len(), "Fan-out finished");
    errors.into_result()?;

    let clusters = std::mem::take(&mut *collected.lock().unwrap_or_else(PoisonError::into_inner));
    Ok(clusters)
}

/// Clusters found on each provider by one discovery run.
#[derive(Debug, Default)]
pub struct Discovered {
    pub eks: Vec<Cluster>,
    pub gke: Vec<Cluster>,
}

/// Run the EKS and GKE discoveries side by side.
///
/// Both discoveries always finish. If either one failed the result holds
/// the errors of both and none of the clusters.
pub async fn discover_all<A, G>(eks: A, gke: G) -> Result<Discovered, CompositeError>
where
    A: Future<Output = Result<Vec<Cluster>, DiscoveryError>>,
    G: Future<Output = Result<Vec<Cluster>, DiscoveryError>>,
{
    info!("reading clusters ...");
    let (eks, gke) = tokio::join!(eks, gke);

    match (eks, gke) {
        (Ok(eks), Ok(gke)) => {
            info!(eks = eks.len(), gke = gke.len(), "Cluster discovery complete");
            Ok(Discovered { eks, gke })
        }
        (eks, gke) => Err([eks.err(), gke.err()].into_iter().flatten().collect()),
    }
}
