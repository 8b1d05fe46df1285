//! The addressable cluster catalog.
//!
//! Built once per run after discovery. Clusters are sorted by
//! `(provider, location, region, name)` and numbered from 1; the number plus
//! the cluster name form the selection key an operator types at the prompt.

use std::collections::HashMap;

use tracing::debug;

use crate::model::Cluster;

/// One entry of the prompt's suggestion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Selection key, e.g. `"3. payments"`.
    pub key: String,
    /// `"<provider> : <location> : <region>"`.
    pub description: String,
}

/// Read-only index of every discovered cluster.
#[derive(Debug, Default)]
pub struct Catalog {
    clusters: HashMap<String, Cluster>,
    suggestions: Vec<Suggestion>,
}

impl Catalog {
    /// Merge both providers' clusters into one catalog.
    pub fn build(eks: Vec<Cluster>, gke: Vec<Cluster>) -> Self {
        let mut all = eks;
        all.extend(gke);
        Self::from_clusters(all)
    }

    pub fn from_clusters(mut clusters: Vec<Cluster>) -> Self {
        clusters.sort();

        let mut index = HashMap::with_capacity(clusters.len());
        let mut suggestions = Vec::with_capacity(clusters.len());
        for (i, cluster) in clusters.into_iter().enumerate() {
            let key = selection_key(i + 1, cluster.name());
            suggestions.push(Suggestion {
                key: key.clone(),
                description: cluster.description(),
            });
            index.insert(key, cluster);
        }

        debug!(entries = suggestions.len(), "Catalog built");
        Self {
            clusters: index,
            suggestions,
        }
    }

    /// Look up the cluster a selection key denotes.
    pub fn resolve(&self, key: &str) -> Option<&Cluster> {
        self.clusters.get(key)
    }

    /// All suggestions in catalog order.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

fn selection_key(ordinal: usize, name: &str) -> String {
    format!("{ordinal}. {name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provider;

    fn keys(catalog: &Catalog) -> Vec<&str> {
        catalog.suggestions().iter().map(|s| s.key.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_provider_location_region_name() {
        let gke = vec![Cluster::new(Provider::Gke, "proj-a", "europe-west4", "apps")];
        let eks = vec![
            Cluster::new(Provider::Eks, "prod", "us-east-1", "zeta"),
            Cluster::new(Provider::Eks, "dev", "us-east-1", "beta"),
            Cluster::new(Provider::Eks, "prod", "eu-west-1", "alpha"),
            Cluster::new(Provider::Eks, "prod", "us-east-1", "alpha"),
        ];

        let catalog = Catalog::build(eks, gke);

        assert_eq!(
            keys(&catalog),
            vec!["1. beta", "2. alpha", "3. alpha", "4. zeta", "5. apps"]
        );
        assert_eq!(catalog.resolve("2. alpha").unwrap().region(), "eu-west-1");
        assert_eq!(catalog.resolve("3. alpha").unwrap().region(), "us-east-1");
        assert_eq!(catalog.resolve("5. apps").unwrap().provider(), Provider::Gke);
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let clusters = vec![
            Cluster::new(Provider::Gke, "p", "us-central1", "b"),
            Cluster::new(Provider::Eks, "default", "us-east-1", "a"),
            Cluster::new(Provider::Eks, "default", "ap-south-1", "c"),
        ];
        let mut reversed = clusters.clone();
        reversed.reverse();

        let first = Catalog::from_clusters(clusters);
        let second = Catalog::from_clusters(reversed);

        assert_eq!(first.suggestions(), second.suggestions());
    }

    #[test]
    fn test_duplicate_names_get_unique_keys() {
        let eks = vec![
            Cluster::new(Provider::Eks, "default", "us-east-1", "main"),
            Cluster::new(Provider::Eks, "dev", "us-east-1", "main"),
        ];
        let gke = vec![Cluster::new(Provider::Gke, "proj", "us-central1-a", "main")];

        let catalog = Catalog::build(eks, gke);

        assert_eq!(catalog.len(), 3);
        assert_eq!(keys(&catalog), vec!["1. main", "2. main", "3. main"]);
        assert_eq!(catalog.resolve("2. main").unwrap().location(), "dev");
    }

    #[test]
    fn test_descriptions() {
        let catalog = Catalog::build(
            vec![Cluster::new(Provider::Eks, "default", "us-east-1", "api")],
            vec![Cluster::new(Provider::Gke, "proj-a", "us-central1", "web")],
        );

        let descriptions: Vec<_> = catalog
            .suggestions()
            .iter()
            .map(|s| s.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            vec!["eks : default : us-east-1", "gke : proj-a : us-central1"]
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::build(Vec::new(), Vec::new());

        assert!(catalog.is_empty());
        assert!(catalog.suggestions().is_empty());
        assert!(catalog.resolve("1. nonexistent").is_none());
    }
}
