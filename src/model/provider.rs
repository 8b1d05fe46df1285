use std::fmt;

/// Managed Kubernetes offerings supported by k8s-connector.
///
/// Variant order is the catalog sort order, so EKS entries are listed
/// before GKE entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provider {
    /// Amazon Elastic Kubernetes Service
    Eks,
    /// Google Kubernetes Engine
    Gke,
}

impl Provider {
    /// Human-readable display name for the provider.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Eks => "AWS EKS",
            Self::Gke => "GCP GKE",
        }
    }

    /// Short lowercase identifier for the provider.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Eks => "eks",
            Self::Gke => "gke",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_order_matches_ids() {
        assert!(Provider::Eks < Provider::Gke);
        assert!(Provider::Eks.id() < Provider::Gke.id());
    }

    #[test]
    fn test_display_uses_id() {
        assert_eq!(Provider::Eks.to_string(), "eks");
        assert_eq!(Provider::Gke.to_string(), "gke");
    }
}
