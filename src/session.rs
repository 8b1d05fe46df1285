//! The interactive selection session.
//!
//! A [`Session`] owns the catalog for the interactive phase and tracks
//! whether the prompt is still waiting for input. The front-end feeds it
//! partial input for suggestions and full lines for submission.

use tracing::debug;

use crate::catalog::{Catalog, Suggestion};
use crate::connector::Dispatch;
use crate::error::SelectionError;
use crate::search::Matcher;

/// Line that ends the session without connecting.
pub const EXIT_COMMAND: &str = ".exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    AwaitingInput,
    Terminated,
}

/// What a submitted line did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Empty line, nothing happened.
    Ignored,
    /// The operator asked to leave.
    Exit,
    /// Kubeconfig was configured for the cluster behind this key.
    Connected(String),
}

pub struct Session {
    catalog: Catalog,
    matcher: Matcher,
    state: SelectorState,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            matcher: Matcher::new(),
            state: SelectorState::AwaitingInput,
        }
    }

    pub const fn state(&self) -> SelectorState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SelectorState::Terminated
    }

    /// Suggestions whose key fuzzy-matches `input`, in catalog order.
    pub fn suggestions(&self, input: &str) -> Vec<&Suggestion> {
        self.matcher
            .filter(self.catalog.suggestions(), input.trim_start(), |s| s.key.as_str())
    }

    /// Handle one submitted line.
    ///
    /// An unknown key or a failed dispatch terminates the session and is
    /// returned as an error.
    pub async fn submit<D>(
        &mut self,
        line: &str,
        dispatcher: &mut D,
    ) -> Result<Submission, SelectionError>
    where
        D: Dispatch + ?Sized,
    {
        if self.is_terminated() {
            return Ok(Submission::Ignored);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(Submission::Ignored);
        }
        if line == EXIT_COMMAND {
            debug!("Exit requested");
            self.state = SelectorState::Terminated;
            return Ok(Submission::Exit);
        }

        let Some(cluster) = self.catalog.resolve(line) else {
            self.state = SelectorState::Terminated;
            return Err(SelectionError::NotFound(line.to_string()));
        };

        debug!(key = line, cluster = %cluster, "Connecting");
        let dispatched = dispatcher.connect(cluster).await;
        self.state = SelectorState::Terminated;
        dispatched?;

        Ok(Submission::Connected(line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::DispatchError;
    use crate::model::{Cluster, Provider};

    #[derive(Default)]
    struct RecordingDispatcher {
        connected: Vec<Cluster>,
        fail: bool,
    }

    #[async_trait]
    impl Dispatch for RecordingDispatcher {
        async fn connect(&mut self, cluster: &Cluster) -> Result<(), DispatchError> {
            self.connected.push(cluster.clone());
            if self.fail {
                return Err(DispatchError::Terminal("no tty".to_string()));
            }
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new(Catalog::build(
            vec![
                Cluster::new(Provider::Eks, "default", "us-east-1", "api"),
                Cluster::new(Provider::Eks, "dev", "eu-west-1", "batch"),
            ],
            vec![Cluster::new(Provider::Gke, "proj-a", "us-central1", "web")],
        ))
    }

    #[tokio::test]
    async fn test_exit_without_dispatch() {
        let mut session = session();
        let mut dispatcher = RecordingDispatcher::default();

        let result = session.submit(".exit", &mut dispatcher).await.unwrap();

        assert_eq!(result, Submission::Exit);
        assert_eq!(session.state(), SelectorState::Terminated);
        assert!(dispatcher.connected.is_empty());
    }

    #[tokio::test]
    async fn test_empty_line_keeps_waiting() {
        let mut session = session();
        let mut dispatcher = RecordingDispatcher::default();

        assert_eq!(session.submit("", &mut dispatcher).await.unwrap(), Submission::Ignored);
        assert_eq!(session.submit("   ", &mut dispatcher).await.unwrap(), Submission::Ignored);
        assert_eq!(session.state(), SelectorState::AwaitingInput);
        assert!(dispatcher.connected.is_empty());
    }

    #[tokio::test]
    async fn test_known_key_dispatches_and_terminates() {
        let mut session = session();
        let mut dispatcher = RecordingDispatcher::default();

        let result = session.submit("2. batch", &mut dispatcher).await.unwrap();

        assert_eq!(result, Submission::Connected("2. batch".to_string()));
        assert_eq!(
            dispatcher.connected,
            vec![Cluster::new(Provider::Eks, "dev", "eu-west-1", "batch")]
        );
        assert!(session.is_terminated());
    }

    #[tokio::test]
    async fn test_unknown_key_is_fatal() {
        let mut session = Session::new(Catalog::default());
        let mut dispatcher = RecordingDispatcher::default();

        let err = session
            .submit("1. nonexistent", &mut dispatcher)
            .await
            .unwrap_err();

        assert!(matches!(err, SelectionError::NotFound(key) if key == "1. nonexistent"));
        assert!(session.is_terminated());
        assert!(dispatcher.connected.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_fatal() {
        let mut session = session();
        let mut dispatcher = RecordingDispatcher {
            fail: true,
            ..Default::default()
        };

        let err = session.submit("3. web", &mut dispatcher).await.unwrap_err();

        assert!(matches!(err, SelectionError::Dispatch(_)));
        assert!(session.is_terminated());
    }

    #[tokio::test]
    async fn test_input_after_termination_is_ignored() {
        let mut session = session();
        let mut dispatcher = RecordingDispatcher::default();

        session.submit(".exit", &mut dispatcher).await.unwrap();
        let result = session.submit("1. api", &mut dispatcher).await.unwrap();

        assert_eq!(result, Submission::Ignored);
        assert!(dispatcher.connected.is_empty());
    }

    #[test]
    fn test_suggestions_filter() {
        let session = session();

        let all: Vec<_> = session.suggestions("").iter().map(|s| s.key.clone()).collect();
        assert_eq!(all, vec!["1. api", "2. batch", "3. web"]);

        let web: Vec<_> = session.suggestions("WB").iter().map(|s| s.key.clone()).collect();
        assert_eq!(web, vec!["3. web"]);

        assert!(session.suggestions("zzz").is_empty());
    }

    #[test]
    fn test_empty_catalog_has_no_suggestions() {
        let session = Session::new(Catalog::default());
        assert!(session.suggestions("").is_empty());
        assert_eq!(session.state(), SelectorState::AwaitingInput);
    }
}
