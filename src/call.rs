//! One REST call, and the three ways of running it.
//!
//! Every call goes through the same steps: the request is created and handed
//! to the request callback, executed, checked by the error handler and finally
//! turned into a value by the response extractor. Only the execute step
//! differs between [`RestCall::execute`], [`RestCall::execute_async`] and
//! [`RestCall::execute_task`].

use crate::callback::RequestCallback;
use crate::cancel::{CancellationToken, OperationHandle, RestOperationCanceler};
use crate::client::{ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse};
use crate::error::status_name;
use crate::error_handler::ResponseErrorHandler;
use crate::extractor::ResponseExtractor;
use crate::method::HttpMethod;
use crate::Error;
use futures_channel::oneshot;
use futures_util::future::{AbortHandle, Abortable, Aborted, FutureExt};
use http::Uri;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// How an asynchronous call ended. Delivered exactly once.
#[derive(Debug)]
pub enum Completion<T> {
    Completed(T),
    Failed(Error),
    Cancelled,
}

impl<T> Completion<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Completion::Cancelled)
    }

    /// `Cancelled` becomes [`Error::Cancelled`].
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Completion::Completed(v) => Ok(v),
            Completion::Failed(e) => Err(e),
            Completion::Cancelled => Err(Error::Cancelled),
        }
    }
}

/// The parts of a call that survive URI building.
pub(crate) struct Exchange<T> {
    pub factory: Arc<dyn ClientHttpRequestFactory>,
    pub error_handler: Arc<dyn ResponseErrorHandler>,
    pub callback: Option<Box<dyn RequestCallback>>,
    pub extractor: Box<dyn ResponseExtractor<T>>,
}

impl<T> Exchange<T> {
    fn prepare(&self, uri: &Uri, method: &HttpMethod) -> Result<Box<dyn ClientHttpRequest>, Error> {
        let mut request = self.factory.create_request(uri, method)?;

        debug!("Created {} request for '{}'", method, uri);

        if let Some(callback) = &self.callback {
            callback.do_with_request(&mut *request)?;
        }

        Ok(request)
    }

    fn finish(
        &self,
        uri: &Uri,
        method: &HttpMethod,
        response: Box<dyn ClientHttpResponse>,
    ) -> Result<T, Error> {
        let status = response.status();

        debug!(
            "{} request for '{}' resulted in {} - {} ({})",
            method,
            uri,
            status.as_u16(),
            status_name(status),
            response.status_description()
        );

        if self.error_handler.has_error(uri, method, &*response) {
            self.error_handler.handle_error(uri, method, &*response)?;
        }

        self.extractor.extract_data(&*response)
    }
}

/// A call ready to run. Pick how with one of the `execute` methods.
///
/// Nothing happens until one of them is called.
#[must_use = "a RestCall does nothing until executed"]
pub struct RestCall<T> {
    method: HttpMethod,
    uri: Result<Uri, Error>,
    exchange: Exchange<T>,
}

impl<T> RestCall<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(method: HttpMethod, uri: Result<Uri, Error>, exchange: Exchange<T>) -> Self {
        RestCall {
            method,
            uri,
            exchange,
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// The expanded URI, or `None` if it could not be built.
    pub fn uri(&self) -> Option<&Uri> {
        self.uri.as_ref().ok()
    }

    /// Run the call on the current thread.
    pub fn execute(self) -> Result<T, Error> {
        let uri = self.uri?;
        let method = self.method;

        let request = self.exchange.prepare(&uri, &method)?;
        let response = request.execute()?;

        self.exchange.finish(&uri, &method, response)
    }

    /// Run the call on the `async-std` executor, and hand the outcome to
    /// `on_complete` there.
    ///
    /// An invalid URI is returned straight away. Any later failure, including
    /// one while preparing the request, goes to `on_complete`.
    pub fn execute_async<F>(self, on_complete: F) -> Result<RestOperationCanceler, Error>
    where
        F: FnOnce(Completion<T>) + Send + 'static,
    {
        self.spawn(on_complete, None)
    }

    /// Run the call on the `async-std` executor and await the outcome.
    ///
    /// Cancelling `token` cancels the call. An invalid URI is returned straight
    /// away.
    pub fn execute_task(self, token: Option<&CancellationToken>) -> Result<RestTask<T>, Error> {
        let (tx, rx) = oneshot::channel();

        let canceler = self.spawn(
            move |completion| {
                // the task may have been dropped
                let _ = tx.send(completion);
            },
            token,
        )?;

        Ok(RestTask { rx, canceler })
    }

    fn spawn<F>(
        self,
        on_complete: F,
        token: Option<&CancellationToken>,
    ) -> Result<RestOperationCanceler, Error>
    where
        F: FnOnce(Completion<T>) + Send + 'static,
    {
        let uri = self.uri?;
        let method = self.method;
        let exchange = self.exchange;

        let request = match exchange.prepare(&uri, &method) {
            Ok(request) => request,
            Err(e) => {
                debug!("Failed to prepare {} request for '{}': {}", method, uri, e);
                async_std::task::spawn(async move { on_complete(Completion::Failed(e)) });
                return Ok(RestOperationCanceler::detached(method, uri));
            }
        };

        let (abort, registration) = AbortHandle::new_pair();
        let handle = OperationHandle::new(abort);
        let canceler = RestOperationCanceler::new(method.clone(), uri.clone(), handle.clone());

        // before spawning, so an already cancelled token stops the request
        if let Some(token) = token {
            token.register(canceler.clone());
        }

        let work = Abortable::new(
            AssertUnwindSafe(async move {
                let response = request.execute_async().await?;
                exchange.finish(&uri, &method, response)
            })
            .catch_unwind(),
            registration,
        );

        async_std::task::spawn(async move {
            let outcome = work.await;
            handle.finish();

            let completion = match outcome {
                Err(Aborted) => Completion::Cancelled,
                Ok(Err(panic)) => {
                    let msg = panic_message(&*panic);
                    warn!("Async request panicked: {}", msg);
                    Completion::Failed(Error::Panicked(msg))
                }
                // the response arrived, but too late
                Ok(Ok(_)) if handle.is_cancelled() => Completion::Cancelled,
                Ok(Ok(Ok(value))) => Completion::Completed(value),
                Ok(Ok(Err(e))) => Completion::Failed(e),
            };
            on_complete(completion);
        });

        Ok(canceler)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<T> fmt::Debug for RestCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestCall")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .finish()
    }
}

/// The outcome of [`RestCall::execute_task`], as a future.
///
/// A cancelled call resolves to [`Error::Cancelled`].
pub struct RestTask<T> {
    rx: oneshot::Receiver<Completion<T>>,
    canceler: RestOperationCanceler,
}

impl<T> RestTask<T> {
    pub fn canceler(&self) -> &RestOperationCanceler {
        &self.canceler
    }

    pub fn cancel(&self) {
        self.canceler.cancel();
    }
}

impl<T> Future for RestTask<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(completion)) => Poll::Ready(completion.into_result()),
            // the executor dropped the call without running it to an outcome
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Panicked(
                "call dropped before completing".into(),
            ))),
        }
    }
}

impl<T> fmt::Debug for RestTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestTask")
            .field("canceler", &self.canceler)
            .finish()
    }
}
