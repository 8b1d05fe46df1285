//! Domain models for k8s-connector.
//!
//! This module contains core domain types that are not UI-specific:
//! - [`Provider`] - Managed Kubernetes offering a cluster was discovered on
//! - [`Cluster`] - One discovered cluster, addressable by provider/location/region/name

pub mod cluster;
pub mod provider;

pub use cluster::Cluster;
pub use provider::Provider;
