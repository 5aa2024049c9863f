//! Concurrent loading of the agent and chatflow collections.
//!
//! Each load spawns one worker thread per collection. The workers run
//! independently: a failure in one never cancels or delays the other. Every
//! load takes a fresh request token, and a worker may only write its slot if
//! the slot still carries that token, so a slow response from an earlier load
//! cannot overwrite a newer one.
//!
//! Failures are turned into state here and never reach the caller. Within one
//! load the first failure's message is the one reported; a later failure of
//! the other collection is logged but does not replace it. A failed
//! collection keeps its last good items and is flagged stale.

use crate::catalog::{
    AgentListing, CatalogEntry, ChatflowListing, Collection, FacetSet, FetchError, ListingClient,
    build_facets,
};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Per-collection load state.
#[derive(Debug)]
pub struct LoadState<T> {
    pub status: LoadStatus,
    pub error: Option<String>,
    /// Last successfully loaded items; survives later failures.
    pub items: Arc<[T]>,
    /// Set when `items` predates a failed load.
    pub stale: bool,
    request: u64,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            error: None,
            items: Arc::from(Vec::new()),
            stale: false,
            request: 0,
        }
    }
}

impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            error: self.error.clone(),
            items: Arc::clone(&self.items),
            stale: self.stale,
            request: self.request,
        }
    }
}

impl<T> LoadState<T> {
    fn begin(&mut self, token: u64) {
        self.status = LoadStatus::Loading;
        self.error = None;
        self.request = token;
    }

    fn succeed(&mut self, items: Vec<T>) {
        self.status = LoadStatus::Success;
        self.error = None;
        self.items = Arc::from(items);
        self.stale = false;
    }

    fn fail(&mut self, message: String) {
        self.status = LoadStatus::Error;
        self.error = Some(message);
        self.stale = !self.items.is_empty();
    }
}

/// Combine two collection statuses.
///
/// Any error wins, then both must succeed for success; two idle slots are
/// idle and every other mix is still loading.
pub fn aggregate_status(agents: LoadStatus, chatflows: LoadStatus) -> LoadStatus {
    match (agents, chatflows) {
        (LoadStatus::Error, _) | (_, LoadStatus::Error) => LoadStatus::Error,
        (LoadStatus::Success, LoadStatus::Success) => LoadStatus::Success,
        (LoadStatus::Idle, LoadStatus::Idle) => LoadStatus::Idle,
        _ => LoadStatus::Loading,
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    agents: LoadState<AgentListing>,
    chatflows: LoadState<ChatflowListing>,
    error_message: Option<String>,
    facets: FacetSet,
    retrying: bool,
    last_token: u64,
}

/// Picks the slot a listing variant is stored in.
trait Slotted: CatalogEntry + Sized {
    fn slot(state: &mut CatalogState) -> &mut LoadState<Self>;
}

impl Slotted for AgentListing {
    fn slot(state: &mut CatalogState) -> &mut LoadState<Self> {
        &mut state.agents
    }
}

impl Slotted for ChatflowListing {
    fn slot(state: &mut CatalogState) -> &mut LoadState<Self> {
        &mut state.chatflows
    }
}

impl CatalogState {
    fn begin(&mut self, retrying: bool) -> u64 {
        self.last_token += 1;
        let token = self.last_token;
        self.agents.begin(token);
        self.chatflows.begin(token);
        self.error_message = None;
        self.retrying = retrying;
        token
    }

    fn complete<L: Slotted>(&mut self, token: u64, result: Result<Vec<L>, FetchError>) {
        let collection = L::COLLECTION;
        let slot = L::slot(self);
        if slot.request != token {
            debug!(%collection, token, current = slot.request, "discarding superseded response");
            return;
        }

        match result {
            Ok(items) => {
                info!(%collection, token, count = items.len(), "collection loaded");
                slot.succeed(items);
            }
            Err(err) => {
                let message = err.to_string();
                warn!(%collection, token, error = %message, "collection load failed");
                slot.fail(message.clone());
                if self.error_message.is_none() {
                    self.error_message = Some(message);
                }
            }
        }

        if self.agents.status == LoadStatus::Success
            && self.chatflows.status == LoadStatus::Success
        {
            self.facets = build_facets(&self.agents.items[..], &self.chatflows.items[..]);
            debug!(token, facets = self.facets.len(), "rebuilt category facets");
        }

        if self.agents.status != LoadStatus::Loading && self.chatflows.status != LoadStatus::Loading
        {
            self.retrying = false;
            info!(token, status = ?self.status(), "load settled");
        }
    }

    fn status(&self) -> LoadStatus {
        aggregate_status(self.agents.status, self.chatflows.status)
    }

    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            agents: self.agents.clone(),
            chatflows: self.chatflows.clone(),
            facets: self.facets.clone(),
            error_message: self.error_message.clone(),
            retrying: self.retrying,
        }
    }
}

/// Point-in-time copy of everything the orchestrator owns.
///
/// Item lists are shared, so taking a snapshot does not copy listings.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    pub agents: LoadState<AgentListing>,
    pub chatflows: LoadState<ChatflowListing>,
    pub facets: FacetSet,
    pub error_message: Option<String>,
    pub retrying: bool,
}

impl CatalogSnapshot {
    pub fn status(&self) -> LoadStatus {
        aggregate_status(self.agents.status, self.chatflows.status)
    }

    /// True when either collection is showing data from before a failed load.
    pub fn is_stale(&self) -> bool {
        self.agents.stale || self.chatflows.stale
    }

    pub fn status_of(&self, collection: Collection) -> LoadStatus {
        match collection {
            Collection::Agents => self.agents.status,
            Collection::Chatflows => self.chatflows.status,
        }
    }

    pub fn find_agent(&self, slug: &str) -> Option<&AgentListing> {
        self.agents.items.iter().find(|agent| agent.slug == slug)
    }

    pub fn find_chatflow(&self, slug: &str) -> Option<&ChatflowListing> {
        self.chatflows.items.iter().find(|flow| flow.slug == slug)
    }
}

/// Workers started by one `load` or `retry`.
///
/// Dropping the handle detaches the workers; they still write their results.
pub struct LoadHandle {
    token: u64,
    workers: Vec<JoinHandle<()>>,
}

impl LoadHandle {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Block until both collections of this load have settled.
    pub fn wait(self) {
        for worker in self.workers {
            if worker.join().is_err() {
                warn!(token = self.token, "fetch worker exited abnormally");
            }
        }
    }
}

/// Owns both collections and their load state.
pub struct FetchOrchestrator {
    client: ListingClient,
    shared: Arc<Mutex<CatalogState>>,
}

impl FetchOrchestrator {
    pub fn new(client: ListingClient) -> Self {
        Self {
            client,
            shared: Arc::new(Mutex::new(CatalogState::default())),
        }
    }

    /// Start loading both collections concurrently.
    pub fn load(&self) -> LoadHandle {
        self.start(false)
    }

    /// Same as `load`, but flagged so consumers can show a retry indicator.
    ///
    /// Calling it while a load is in flight supersedes that load: whichever
    /// responses belong to the older token are dropped.
    pub fn retry(&self) -> LoadHandle {
        self.start(true)
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        lock(&self.shared).snapshot()
    }

    pub fn status(&self) -> LoadStatus {
        lock(&self.shared).status()
    }

    fn start(&self, retrying: bool) -> LoadHandle {
        let token = lock(&self.shared).begin(retrying);
        info!(token, retrying, "loading listing collections");

        let workers = [
            self.spawn_fetch::<AgentListing>(token),
            self.spawn_fetch::<ChatflowListing>(token),
        ]
        .into_iter()
        .flatten()
        .collect();
        LoadHandle { token, workers }
    }

    fn spawn_fetch<L: Slotted>(&self, token: u64) -> Option<JoinHandle<()>> {
        let client = self.client.clone();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", L::COLLECTION))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| client.fetch::<L>()))
                    .unwrap_or_else(|_| {
                        Err(FetchError::Transport(format!(
                            "{} fetch panicked",
                            L::COLLECTION
                        )))
                    });
                lock(&shared).complete(token, result);
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                let message = format!("failed to start {} fetch: {err}", L::COLLECTION);
                lock(&self.shared).complete::<L>(token, Err(FetchError::Transport(message)));
                None
            }
        }
    }
}

fn lock(shared: &Mutex<CatalogState>) -> MutexGuard<'_, CatalogState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
