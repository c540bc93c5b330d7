//! Specification loading lifecycle

use openapi_catalog::Specification;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ExplorerError, Result};
use crate::transport::HttpTransport;
use crate::types::PreparedRequest;

/// Loader state
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Nothing requested yet, or the last load was cancelled
    Idle,
    /// A fetch is in flight
    Loading,
    /// The document is loaded
    Ready(Arc<Specification>),
    /// The last attempt failed; stays here until retried
    Failed(ExplorerError),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    /// The loaded document, if ready
    pub fn spec(&self) -> Option<Arc<Specification>> {
        match self {
            LoadState::Ready(spec) => Some(spec.clone()),
            _ => None,
        }
    }
}

/// Fetches and parses the OpenAPI document, one load at a time.
///
/// State changes are published on a watch channel: callers can poll
/// [`SpecLoader::state`] or await changes through [`SpecLoader::subscribe`].
pub struct SpecLoader {
    spec_url: String,
    transport: Arc<dyn HttpTransport>,
    state: watch::Sender<LoadState>,
    /// Bumped on cancel; a load only commits if the epoch it started in is current
    epoch: AtomicU64,
}

impl SpecLoader {
    /// Create an idle loader
    pub fn new(spec_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            spec_url: spec_url.into(),
            transport,
            state,
            epoch: AtomicU64::new(0),
        }
    }

    /// Current state
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent state change
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub fn spec_url(&self) -> &str {
        &self.spec_url
    }

    /// Load the document if nothing was requested yet.
    ///
    /// A no-op while loading, once ready, and after a failure (use
    /// [`SpecLoader::retry`]). Returns the state after the call settles.
    pub async fn load(&self) -> LoadState {
        let Some(epoch) = self.begin(|state| matches!(state, LoadState::Idle)) else {
            debug!("Spec load skipped, state is {}", self.state_name());
            return self.state();
        };
        self.run(epoch).await
    }

    /// Load again after a failure
    pub async fn retry(&self) -> LoadState {
        let Some(epoch) = self.begin(|state| matches!(state, LoadState::Idle | LoadState::Failed(_)))
        else {
            debug!("Spec retry skipped, state is {}", self.state_name());
            return self.state();
        };
        info!("Retrying spec load");
        self.run(epoch).await
    }

    /// Forget any in-flight load; its result is dropped when it arrives
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_if_modified(|state| {
            if matches!(state, LoadState::Loading) {
                *state = LoadState::Idle;
                true
            } else {
                false
            }
        });
        debug!("Spec load cancelled");
    }

    /// Atomically move to Loading when `allowed` accepts the current state,
    /// returning the epoch the load belongs to
    fn begin<F>(&self, allowed: F) -> Option<u64>
    where
        F: Fn(&LoadState) -> bool,
    {
        let mut epoch = None;
        self.state.send_if_modified(|state| {
            if allowed(state) {
                *state = LoadState::Loading;
                epoch = Some(self.epoch.load(Ordering::SeqCst));
                true
            } else {
                false
            }
        });
        epoch
    }

    async fn run(&self, epoch: u64) -> LoadState {
        let outcome = match self.fetch().await {
            Ok(spec) => LoadState::Ready(Arc::new(spec)),
            Err(e) => {
                warn!("Failed to load spec: {}", e);
                LoadState::Failed(e)
            }
        };

        if self.commit(epoch, outcome.clone()) {
            outcome
        } else {
            debug!("Discarding spec load result from a cancelled request");
            self.state()
        }
    }

    /// Publish a load result unless its epoch went stale. The check runs under
    /// the channel lock, which `cancel` also takes after bumping the epoch.
    fn commit(&self, epoch: u64, outcome: LoadState) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *state = outcome;
            true
        })
    }

    async fn fetch(&self) -> Result<Specification> {
        info!("Fetching OpenAPI spec from: {}", self.spec_url);

        let started = Instant::now();
        let request = PreparedRequest::get(&self.spec_url).with_header("Accept", "application/json");
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            return Err(ExplorerError::SpecFetch {
                status: response.status,
                status_text: response.status_text,
            });
        }

        let spec = Specification::from_json_str(&response.body)?;

        info!(
            "Loaded spec with {} operations in {}ms",
            spec.len(),
            started.elapsed().as_millis()
        );
        Ok(spec)
    }

    fn state_name(&self) -> &'static str {
        match *self.state.borrow() {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Ready(_) => "ready",
            LoadState::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::transport::TransportError;
    use tokio::sync::Notify;

    const SPEC: &str = r#"{"paths": {"/users": {"get": {"summary": "List users"}}}}"#;

    fn loader(transport: ScriptedTransport) -> (SpecLoader, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let loader = SpecLoader::new("http://localhost:8000/openapi.json", transport.clone());
        (loader, transport)
    }

    #[tokio::test]
    async fn test_load_ready() {
        let (loader, transport) = loader(ScriptedTransport::new().reply(200, SPEC));
        assert_eq!(loader.state(), LoadState::Idle);

        let state = loader.load().await;
        assert!(state.is_ready());
        assert_eq!(state.spec().unwrap().len(), 1);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "http://localhost:8000/openapi.json");
        assert_eq!(requests[0].header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_second_load_is_a_no_op() {
        let (loader, transport) = loader(ScriptedTransport::new().reply(200, SPEC));

        loader.load().await;
        let state = loader.load().await;
        assert!(state.is_ready());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_is_terminal_until_retry() {
        let (loader, transport) = loader(
            ScriptedTransport::new()
                .reply(503, "down")
                .reply(200, SPEC),
        );

        let state = loader.load().await;
        assert_eq!(
            state,
            LoadState::Failed(ExplorerError::SpecFetch {
                status: 503,
                status_text: "Service Unavailable".to_string(),
            })
        );

        // load() does not leave Failed
        assert!(matches!(loader.load().await, LoadState::Failed(_)));
        assert_eq!(transport.requests().len(), 1);

        assert!(loader.retry().await.is_ready());
        assert_eq!(transport.requests().len(), 2);

        // retry() does nothing once ready
        assert!(loader.retry().await.is_ready());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let (loader, _) = loader(ScriptedTransport::new().reply(200, "<html>oops</html>"));

        match loader.load().await {
            LoadState::Failed(ExplorerError::SpecParse(message)) => assert!(!message.is_empty()),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error() {
        let (loader, _) = loader(ScriptedTransport::new().fail(TransportError::Timeout("30s".to_string())));

        assert!(matches!(
            loader.load().await,
            LoadState::Failed(ExplorerError::Transport(_))
        ));
    }

    #[test]
    fn test_commit_checks_epoch() {
        let loader = SpecLoader::new("http://h/openapi.json", Arc::new(ScriptedTransport::new()));

        let epoch = loader.begin(|state| matches!(state, LoadState::Idle)).unwrap();
        loader.cancel();
        let ready = LoadState::Ready(Arc::new(Specification::default()));
        assert!(!loader.commit(epoch, ready.clone()));
        assert_eq!(loader.state(), LoadState::Idle);

        // The next load belongs to the new epoch and commits
        let epoch = loader.begin(|state| matches!(state, LoadState::Idle)).unwrap();
        assert!(loader.commit(epoch, ready.clone()));
        assert_eq!(loader.state(), ready);

        // Cancelling after a commit leaves the result in place
        loader.cancel();
        assert!(loader.state().is_ready());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_racing_commit_never_resurrects_result() {
        for _ in 0..200 {
            let loader = Arc::new(SpecLoader::new(
                "http://h/openapi.json",
                Arc::new(ScriptedTransport::new()),
            ));
            let epoch = loader.begin(|state| matches!(state, LoadState::Idle)).unwrap();

            let committer = tokio::spawn({
                let loader = loader.clone();
                async move {
                    loader.commit(epoch, LoadState::Ready(Arc::new(Specification::default())))
                }
            });
            loader.cancel();
            let committed = committer.await.unwrap();

            // Either the commit won the lock and stays, or it was rejected
            assert_eq!(loader.state().is_ready(), committed);
            if !committed {
                assert_eq!(loader.state(), LoadState::Idle);
            }
        }
    }

    #[tokio::test]
    async fn test_cancelled_result_is_discarded() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(ScriptedTransport::gated(gate.clone()).reply(200, SPEC));
        let loader = Arc::new(SpecLoader::new("http://h/openapi.json", transport.clone()));

        let mut changes = loader.subscribe();
        let task = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });

        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), LoadState::Loading);

        // A concurrent load while one is in flight does nothing
        assert_eq!(loader.load().await, LoadState::Loading);

        loader.cancel();
        assert_eq!(loader.state(), LoadState::Idle);

        gate.notify_one();
        let state = task.await.unwrap();
        assert_eq!(state, LoadState::Idle);
        assert_eq!(loader.state(), LoadState::Idle);
        assert_eq!(transport.requests().len(), 1);
    }
}
