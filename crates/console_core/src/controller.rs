//! Generic paginated-list state shared by every list screen.
//!
//! Each state change bumps a sequence number under the same lock that updates the
//! request, so the number attached to a fetch always identifies the newest
//! request. A response is applied only if its number is still the latest.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::{ClientError, ClientResult, ValidationError},
    paging::{FilterPatch, PageRequest, PageResult},
};

pub type FetchFuture<T> = BoxFuture<'static, ClientResult<PageResult<T>>>;
pub type FetchFn<T> = Arc<dyn Fn(PageRequest) -> FetchFuture<T> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub request: PageRequest,
    pub data: Option<PageResult<T>>,
    pub loading: bool,
    pub error: Option<ClientError>,
}

impl<T> ListSnapshot<T> {
    pub fn items(&self) -> &[T] {
        self.data
            .as_ref()
            .map(|page| page.items.as_slice())
            .unwrap_or_default()
    }

    /// A loaded page with no rows; not an error even when past the last page.
    pub fn is_empty_state(&self) -> bool {
        !self.loading && self.data.as_ref().is_some_and(PageResult::is_empty)
    }
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Applied,
    /// A newer request was issued while this one was in flight.
    Superseded,
    Failed(ClientError),
}

impl FetchOutcome {
    pub fn into_result(self) -> ClientResult<bool> {
        match self {
            Self::Applied => Ok(true),
            Self::Superseded => Ok(false),
            Self::Failed(err) => Err(err),
        }
    }
}

struct ControllerInner<T> {
    label: String,
    fetch: FetchFn<T>,
    sequence: AtomicU64,
    state: watch::Sender<ListSnapshot<T>>,
}

pub struct ResourceListController<T> {
    inner: Arc<ControllerInner<T>>,
}

impl<T> Clone for ResourceListController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ResourceListController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a controller without fetching; call [`Self::refresh`] to load.
    pub fn configure(label: impl Into<String>, fetch: FetchFn<T>, initial: PageRequest) -> Self {
        let (state, _) = watch::channel(ListSnapshot {
            request: initial,
            data: None,
            loading: false,
            error: None,
        });
        Self {
            inner: Arc::new(ControllerInner {
                label: label.into(),
                fetch,
                sequence: AtomicU64::new(0),
                state,
            }),
        }
    }

    pub fn from_fn<F, Fut>(label: impl Into<String>, fetch: F, initial: PageRequest) -> Self
    where
        F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<PageResult<T>>> + Send + 'static,
    {
        let fetch: FetchFn<T> = Arc::new(move |request| fetch(request).boxed());
        Self::configure(label, fetch, initial)
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn current(&self) -> ListSnapshot<T> {
        self.inner.state.borrow().clone()
    }

    pub fn request(&self) -> PageRequest {
        self.inner.state.borrow().request.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.inner.state.subscribe()
    }

    pub async fn set_filters(&self, patch: FilterPatch) -> FetchOutcome {
        self.dispatch(|request| request.apply_filters(patch)).await
    }

    pub async fn set_sort(&self, sort: Option<String>) -> FetchOutcome {
        self.dispatch(|request| request.set_sort(sort)).await
    }

    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, ValidationError> {
        self.try_dispatch(|request| request.set_page(page)).await
    }

    /// Returns to the first page with the new page size.
    pub async fn set_limit(&self, limit: u32) -> Result<FetchOutcome, ValidationError> {
        self.try_dispatch(|request| request.set_limit(limit)).await
    }

    pub async fn next_page(&self) -> Option<FetchOutcome> {
        let page = self.current().data?;
        if !page.has_next() {
            return None;
        }
        self.set_page(page.page + 1).await.ok()
    }

    pub async fn previous_page(&self) -> Option<FetchOutcome> {
        let page = self.request().page();
        if page <= 1 {
            return None;
        }
        self.set_page(page - 1).await.ok()
    }

    /// Repeats the last request without touching paging or filters.
    pub async fn refresh(&self) -> FetchOutcome {
        self.dispatch(|_| {}).await
    }

    async fn dispatch(&self, mutate: impl FnOnce(&mut PageRequest)) -> FetchOutcome {
        let applied = self
            .try_dispatch(|request| {
                mutate(request);
                Ok(())
            })
            .await;
        applied.unwrap_or_else(|err| FetchOutcome::Failed(err.into()))
    }

    /// Applies `mutate` to a copy of the active request; the snapshot is only
    /// touched, and a fetch only issued, when the mutation is accepted.
    async fn try_dispatch(
        &self,
        mutate: impl FnOnce(&mut PageRequest) -> Result<(), ValidationError>,
    ) -> Result<FetchOutcome, ValidationError> {
        let mut issued = Ok(None);
        self.inner.state.send_if_modified(|snapshot| {
            let mut next = snapshot.request.clone();
            if let Err(err) = mutate(&mut next) {
                issued = Err(err);
                return false;
            }
            snapshot.request = next;
            snapshot.loading = true;
            let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            issued = Ok(Some((seq, snapshot.request.clone())));
            true
        });
        let Some((seq, request)) = issued? else {
            return Ok(FetchOutcome::Superseded);
        };

        debug!(
            resource = %self.inner.label,
            seq,
            page = request.page(),
            limit = request.limit(),
            "fetching list page"
        );
        let result = (self.inner.fetch)(request).await;
        Ok(self.apply(seq, result))
    }

    fn apply(&self, seq: u64, result: ClientResult<PageResult<T>>) -> FetchOutcome {
        let mut outcome = FetchOutcome::Superseded;
        self.inner.state.send_if_modified(|snapshot| {
            if self.inner.sequence.load(Ordering::SeqCst) != seq {
                return false;
            }
            snapshot.loading = false;
            match &result {
                Ok(page) => {
                    snapshot.data = Some(page.clone());
                    snapshot.error = None;
                    outcome = FetchOutcome::Applied;
                }
                Err(err) => {
                    snapshot.error = Some(err.clone());
                    outcome = FetchOutcome::Failed(err.clone());
                }
            }
            true
        });

        match &outcome {
            FetchOutcome::Superseded => {
                debug!(resource = %self.inner.label, seq, "discarding superseded list response");
            }
            FetchOutcome::Failed(err) => {
                warn!(resource = %self.inner.label, seq, error = %err, "list fetch failed");
            }
            FetchOutcome::Applied => {}
        }
        outcome
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
