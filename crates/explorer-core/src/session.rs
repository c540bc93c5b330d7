//! Explorer session
//!
//! Ties the loader, the tag catalog, the selection draft and request
//! submission together for one user session.

use openapi_catalog::{HttpMethod, OperationGroups, Specification};
use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::builder::RequestBuilder;
use crate::error::{ExplorerError, Result};
use crate::executor::RequestExecutor;
use crate::loader::{LoadState, SpecLoader};
use crate::selection::{SelectionStore, SubmissionOutcome};
use crate::settings::Settings;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::ResponseRecord;

/// Submission latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Settled,
}

/// Catalog derived from one loaded document
struct Catalog {
    spec: Arc<Specification>,
    groups: Arc<OperationGroups>,
}

/// Returns the latch to Settled when dropped, including when the submit
/// future is dropped mid-flight
struct SubmissionGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(SubmissionState::Settled);
    }
}

/// One explorer session
pub struct ExplorerSession {
    id: Uuid,
    settings: Settings,
    transport: Arc<dyn HttpTransport>,
    loader: SpecLoader,
    catalog: RwLock<Option<Catalog>>,
    selection: RwLock<SelectionStore>,
    submission: watch::Sender<SubmissionState>,
}

impl ExplorerSession {
    /// Create a session over the given transport
    pub fn new(settings: Settings, transport: Arc<dyn HttpTransport>) -> Self {
        let id = Uuid::new_v4();
        let loader = SpecLoader::new(settings.spec_url.clone(), transport.clone());
        let (submission, _) = watch::channel(SubmissionState::Idle);

        info!(
            "Created explorer session {} ({} transport)",
            id,
            transport.transport_name()
        );

        Self {
            id,
            settings,
            transport,
            loader,
            catalog: RwLock::new(None),
            selection: RwLock::new(SelectionStore::new()),
            submission,
        }
    }

    /// Validate the settings and create a session over reqwest
    pub fn from_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let transport = ReqwestTransport::from_settings(&settings)?;
        Ok(Self::new(settings, Arc::new(transport)))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    /// Receive loader state changes
    pub fn subscribe_load_state(&self) -> watch::Receiver<LoadState> {
        self.loader.subscribe()
    }

    pub fn submission_state(&self) -> SubmissionState {
        *self.submission.borrow()
    }

    /// Receive submission latch changes
    pub fn subscribe_submission(&self) -> watch::Receiver<SubmissionState> {
        self.submission.subscribe()
    }

    /// Load the document, then derive the catalog
    pub async fn load_spec(&self) -> LoadState {
        let state = self.loader.load().instrument(self.span()).await;
        self.refresh_catalog(&state).await;
        state
    }

    /// Retry a failed load, then derive the catalog
    pub async fn retry_spec(&self) -> LoadState {
        let state = self.loader.retry().instrument(self.span()).await;
        self.refresh_catalog(&state).await;
        state
    }

    /// Current catalog, empty until the document is ready
    pub async fn groups(&self) -> Arc<OperationGroups> {
        self.catalog
            .read()
            .await
            .as_ref()
            .map(|catalog| catalog.groups.clone())
            .unwrap_or_default()
    }

    /// Select an operation from the catalog, discarding the previous draft
    pub async fn select(&self, method: HttpMethod, path: &str) -> Result<()> {
        let operation = {
            let catalog = self.catalog.read().await;
            let catalog = catalog.as_ref().ok_or(ExplorerError::SpecNotLoaded)?;
            catalog
                .groups
                .find(method, path)
                .ok_or_else(|| ExplorerError::OperationNotFound(format!("{} {}", method, path)))?
        };

        self.selection.write().await.select(operation);
        Ok(())
    }

    /// Read access to the selection and its draft
    pub async fn selection(&self) -> RwLockReadGuard<'_, SelectionStore> {
        self.selection.read().await
    }

    /// Write access to the draft, for parameter and body edits
    pub async fn selection_mut(&self) -> RwLockWriteGuard<'_, SelectionStore> {
        self.selection.write().await
    }

    /// Build and send the selected operation.
    ///
    /// Only one submission runs at a time. The outcome is also recorded on
    /// the selection unless the selection changed while the request was in
    /// flight. Any HTTP status yields `Ok`; a non-2xx status is additionally
    /// recorded as [`ExplorerError::UnsuccessfulStatus`].
    pub async fn submit(&self) -> Result<ResponseRecord> {
        let _guard = self.begin_submission()?;

        let (generation, built) = {
            let mut selection = self.selection.write().await;
            let operation = selection.selected().ok_or(ExplorerError::NothingSelected)?;
            selection.begin_submission();
            let built = RequestBuilder::build(
                &operation,
                selection.params(),
                selection.body(),
                &self.settings.base_url,
            );
            (selection.generation(), built)
        };

        let request = match built {
            Ok(request) => request,
            Err(e) => {
                debug!("Request validation failed: {}", e);
                let err = ExplorerError::from(e);
                self.record(generation, None, Some(err.clone())).await;
                return Err(err);
            }
        };

        let executed = RequestExecutor::execute(&request, self.transport.as_ref())
            .instrument(self.span())
            .await;

        match executed {
            Ok(record) => {
                let error = (!record.ok).then_some(ExplorerError::UnsuccessfulStatus(record.status));
                self.record(generation, Some(record.clone()), error).await;
                Ok(record)
            }
            Err(e) => {
                self.record(generation, None, Some(e.clone())).await;
                Err(e)
            }
        }
    }

    /// Cancel any in-flight load and drop the selection
    pub async fn shutdown(&self) {
        self.loader.cancel();
        self.selection.write().await.clear();
        info!("Closed explorer session {}", self.id);
    }

    fn begin_submission(&self) -> Result<SubmissionGuard<'_>> {
        let acquired = self.submission.send_if_modified(|state| {
            if *state == SubmissionState::Submitting {
                false
            } else {
                *state = SubmissionState::Submitting;
                true
            }
        });

        if !acquired {
            return Err(ExplorerError::SubmissionInFlight);
        }
        Ok(SubmissionGuard {
            state: &self.submission,
        })
    }

    async fn record(&self, generation: u64, response: Option<ResponseRecord>, error: Option<ExplorerError>) {
        self.selection
            .write()
            .await
            .record_outcome(generation, SubmissionOutcome { response, error });
    }

    async fn refresh_catalog(&self, state: &LoadState) {
        let Some(spec) = state.spec() else {
            return;
        };

        let mut catalog = self.catalog.write().await;
        if catalog.as_ref().is_some_and(|c| Arc::ptr_eq(&c.spec, &spec)) {
            return;
        }

        let groups = OperationGroups::build(&spec);
        debug!("Catalog has {} tags", groups.len());
        *catalog = Some(Catalog {
            spec,
            groups: Arc::new(groups),
        });
    }

    fn span(&self) -> tracing::Span {
        info_span!("session", id = %self.id)
    }
}
