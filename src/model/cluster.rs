use std::fmt;

use crate::model::Provider;

/// A managed Kubernetes cluster discovered on one of the providers.
///
/// Fields are private so a cluster cannot change after a fetch unit built it.
/// The derived ordering compares `(provider, location, region, name)`
/// lexicographically, which is the order the catalog presents clusters in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cluster {
    provider: Provider,
    /// AWS profile name or GCP project id.
    location: String,
    /// AWS region code or the GKE location (zone or region).
    region: String,
    name: String,
}

impl Cluster {
    pub fn new(
        provider: Provider,
        location: impl Into<String>,
        region: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            location: location.into(),
            region: region.into(),
            name: name.into(),
        }
    }

    pub const fn provider(&self) -> Provider {
        self.provider
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description shown next to the selection key.
    pub fn description(&self) -> String {
        format!("{} : {} : {}", self.provider, self.location, self.region)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}/{})",
            self.name,
            self.provider.display_name(),
            self.location,
            self.region
        )
    }
}
