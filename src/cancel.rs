//! Cancelling requests in flight.

use crate::method::HttpMethod;
use futures_util::future::AbortHandle;
use http::Uri;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Handle to an asynchronous request, returned by
/// [`RestCall::execute_async`](crate::RestCall::execute_async).
///
/// Cancelling before the request reaches the network stops it from being sent.
/// Cancelling after that suppresses the result, the completion callback is then
/// told the call was cancelled.
///
/// When the request could not even be prepared the canceler only describes
/// the call, and cancelling it does nothing.
#[derive(Clone)]
pub struct RestOperationCanceler {
    method: HttpMethod,
    uri: Uri,
    handle: Option<OperationHandle>,
}

#[derive(Clone)]
pub(crate) struct OperationHandle {
    abort: AbortHandle,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl OperationHandle {
    pub(crate) fn new(abort: AbortHandle) -> Self {
        OperationHandle {
            abort,
            cancelled: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The work has resolved, one way or another.
    pub(crate) fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.abort.abort();
    }
}

impl RestOperationCanceler {
    pub(crate) fn new(method: HttpMethod, uri: Uri, handle: OperationHandle) -> Self {
        RestOperationCanceler {
            method,
            uri,
            handle: Some(handle),
        }
    }

    /// A canceler for a call that never got as far as the network.
    pub(crate) fn detached(method: HttpMethod, uri: Uri) -> Self {
        RestOperationCanceler {
            method,
            uri,
            handle: None,
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Cancel the request. Idempotent.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            debug!("Cancel {} request for '{}'", self.method, self.uri);
            handle.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_cancelled()).unwrap_or(false)
    }

    /// Whether the request has run to an outcome. A detached canceler is
    /// always finished.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl fmt::Debug for RestOperationCanceler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestOperationCanceler")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Cancels every request it was handed to, including ones started after
/// [`cancel`](CancellationToken::cancel) was called.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct CancellationToken {
    state: Arc<Mutex<TokenState>>,
}

#[derive(Default)]
struct TokenState {
    cancelled: bool,
    cancelers: Vec<RestOperationCanceler>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        let cancelers = {
            let mut state = self.lock();
            state.cancelled = true;
            std::mem::take(&mut state.cancelers)
        };
        for canceler in cancelers {
            canceler.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Number of requests this token could still cancel.
    pub fn pending(&self) -> usize {
        let mut state = self.lock();
        state.cancelers.retain(|c| !c.is_finished());
        state.cancelers.len()
    }

    pub(crate) fn register(&self, canceler: RestOperationCanceler) {
        let mut state = self.lock();
        if state.cancelled {
            drop(state);
            canceler.cancel();
        } else {
            state.cancelers.retain(|c| !c.is_finished());
            state.cancelers.push(canceler);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TokenState> {
        // a panic while holding the lock leaves the state consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("pending", &self.pending())
            .finish()
    }
}
