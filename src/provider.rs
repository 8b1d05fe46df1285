//! Provider-specific discovery and connect commands.
//!
//! - [`aws`] - EKS clusters across shared-config profiles and regions
//! - [`gcp`] - GKE clusters across a list of projects

pub mod aws;
pub mod gcp;
