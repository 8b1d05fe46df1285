//! Error types for discovery, selection and dispatch.
//!
//! Everything below `main` returns these typed errors. `main` is the only
//! place that turns them into a report and an exit status.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::model::Provider;

/// Boxed error returned by provider API seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure while discovering clusters.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The local credentials/config file could not be read.
    #[error("unable to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Building an authenticated client for an identity failed.
    #[error("unable to resolve {provider} credentials for {identity}: {source}")]
    Auth {
        provider: Provider,
        identity: String,
        #[source]
        source: BoxError,
    },

    /// A list-clusters call failed.
    #[error("unable to list {provider} clusters in {location}/{region}: {source}")]
    Provider {
        provider: Provider,
        location: String,
        region: String,
        #[source]
        source: BoxError,
    },

    /// A fan-out task panicked or was cancelled before reporting.
    #[error("discovery task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Aggregate of every unit failure of one fan-out.
#[derive(Debug, Default)]
pub struct CompositeError {
    errors: Vec<DiscoveryError>,
}

impl CompositeError {
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add a failure. Nested composites are flattened into this one.
    pub fn push(&mut self, error: DiscoveryError) {
        match error {
            DiscoveryError::Composite(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    pub fn errors(&self) -> &[DiscoveryError] {
        &self.errors
    }

    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing failed, otherwise the composite itself.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            1 => write!(f, "1 discovery error occurred:")?,
            n => write!(f, "{n} discovery errors occurred:")?,
        }
        for error in &self.errors {
            write!(f, "\n\t* {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompositeError {}

impl FromIterator<DiscoveryError> for CompositeError {
    fn from_iter<T: IntoIterator<Item = DiscoveryError>>(iter: T) -> Self {
        let mut composite = Self::new();
        for error in iter {
            composite.push(error);
        }
        composite
    }
}

/// The external credential-configuration command failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unable to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },

    /// The terminal could not be handed over to the child process.
    #[error("unable to restore terminal: {0}")]
    Terminal(String),
}

/// A failure while handling a submitted prompt line.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("cluster not found: {0}")]
    NotFound(String),

    #[error("unable to connect to cluster: {0}")]
    Dispatch(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(region: &str) -> DiscoveryError {
        DiscoveryError::Provider {
            provider: Provider::Eks,
            location: "dev".to_string(),
            region: region.to_string(),
            source: "access denied".into(),
        }
    }

    #[test]
    fn test_composite_flattens_nested() {
        let inner: CompositeError = [provider_error("us-east-1"), provider_error("us-east-2")]
            .into_iter()
            .collect();

        let mut outer = CompositeError::new();
        outer.push(DiscoveryError::Composite(inner));
        outer.push(DiscoveryError::Task("panicked".to_string()));

        assert_eq!(outer.len(), 3);
        assert!(matches!(outer.errors()[2], DiscoveryError::Task(_)));
    }

    #[test]
    fn test_composite_display_lists_every_error() {
        let composite: CompositeError = [provider_error("us-east-1"), provider_error("eu-west-1")]
            .into_iter()
            .collect();

        let message = composite.to_string();
        assert!(message.starts_with("2 discovery errors occurred:"));
        assert!(message.contains("eks clusters in dev/us-east-1: access denied"));
        assert!(message.contains("eks clusters in dev/eu-west-1: access denied"));
    }

    #[test]
    fn test_empty_composite_is_ok() {
        assert!(CompositeError::new().into_result().is_ok());
        let failed: CompositeError = std::iter::once(provider_error("sa-east-1")).collect();
        assert!(failed.into_result().is_err());
    }
}
