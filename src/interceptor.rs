//! Interceptors wrap the execution of every request a template makes.
//!
//! There are three kinds. A [`BeforeInterceptor`] touches the request just
//! before it is sent, whichever way it is sent. A [`SyncInterceptor`] wraps
//! blocking execution and an [`AsyncInterceptor`] wraps asynchronous execution;
//! each is skipped on the other path.
//!
//! Interceptors run in registration order on the way to the network and in
//! reverse order on the way back.

use crate::client::{ClientHttpRequest, ClientHttpRequestFactory, ResponseResult};
use crate::headers::{HttpHeaders, AUTHORIZATION};
use crate::method::HttpMethod;
use crate::Error;
use base64::Engine;
use futures_util::future::{self, BoxFuture};
use http::Uri;
use std::fmt;
use std::sync::Arc;

/// Mutates a request right before execution.
pub trait BeforeInterceptor: Send + Sync {
    fn before_execute(&self, request: &mut dyn ClientHttpRequest) -> Result<(), Error>;
}

/// Wraps blocking execution.
///
/// Call [`SyncExecution::execute`] to proceed down the chain, or return
/// without calling it to short circuit.
pub trait SyncInterceptor: Send + Sync {
    fn execute(&self, execution: SyncExecution) -> ResponseResult;
}

/// Wraps asynchronous execution.
pub trait AsyncInterceptor: Send + Sync {
    fn execute_async(&self, execution: AsyncExecution) -> BoxFuture<'static, ResponseResult>;
}

#[derive(Clone)]
pub enum RequestInterceptor {
    Before(Arc<dyn BeforeInterceptor>),
    Sync(Arc<dyn SyncInterceptor>),
    Async(Arc<dyn AsyncInterceptor>),
}

impl RequestInterceptor {
    pub fn before<I: BeforeInterceptor + 'static>(i: I) -> Self {
        RequestInterceptor::Before(Arc::new(i))
    }

    pub fn sync<I: SyncInterceptor + 'static>(i: I) -> Self {
        RequestInterceptor::Sync(Arc::new(i))
    }

    pub fn async_<I: AsyncInterceptor + 'static>(i: I) -> Self {
        RequestInterceptor::Async(Arc::new(i))
    }
}

impl fmt::Debug for RequestInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestInterceptor::Before(_) => write!(f, "RequestInterceptor::Before"),
            RequestInterceptor::Sync(_) => write!(f, "RequestInterceptor::Sync"),
            RequestInterceptor::Async(_) => write!(f, "RequestInterceptor::Async"),
        }
    }
}

type Chain = Arc<Vec<RequestInterceptor>>;

/// The rest of a blocking interceptor chain, and the request travelling down it.
pub struct SyncExecution {
    request: Box<dyn ClientHttpRequest>,
    chain: Chain,
    index: usize,
}

impl SyncExecution {
    pub fn request(&self) -> &dyn ClientHttpRequest {
        &*self.request
    }

    pub fn request_mut(&mut self) -> &mut dyn ClientHttpRequest {
        &mut *self.request
    }

    /// Hand the request to the next interceptor, or send it when there is none.
    pub fn execute(mut self) -> ResponseResult {
        loop {
            let next = match self.chain.get(self.index) {
                Some(next) => next.clone(),
                None => break,
            };
            self.index += 1;

            match next {
                RequestInterceptor::Before(i) => i.before_execute(&mut *self.request)?,
                RequestInterceptor::Sync(i) => return i.execute(self),
                RequestInterceptor::Async(_) => {}
            }
        }

        self.request.execute()
    }
}

/// The rest of an asynchronous interceptor chain, and the request travelling down it.
pub struct AsyncExecution {
    request: Box<dyn ClientHttpRequest>,
    chain: Chain,
    index: usize,
}

impl AsyncExecution {
    pub fn request(&self) -> &dyn ClientHttpRequest {
        &*self.request
    }

    pub fn request_mut(&mut self) -> &mut dyn ClientHttpRequest {
        &mut *self.request
    }

    /// Hand the request to the next interceptor, or send it when there is none.
    pub fn execute(mut self) -> BoxFuture<'static, ResponseResult> {
        loop {
            let next = match self.chain.get(self.index) {
                Some(next) => next.clone(),
                None => break,
            };
            self.index += 1;

            match next {
                RequestInterceptor::Before(i) => {
                    if let Err(e) = i.before_execute(&mut *self.request) {
                        return Box::pin(future::ready(Err(e)));
                    }
                }
                RequestInterceptor::Async(i) => return i.execute_async(self),
                RequestInterceptor::Sync(_) => {}
            }
        }

        self.request.execute_async()
    }
}

/// Factory whose requests run through an interceptor chain.
pub(crate) struct InterceptingRequestFactory {
    inner: Arc<dyn ClientHttpRequestFactory>,
    chain: Chain,
}

impl InterceptingRequestFactory {
    pub fn new(inner: Arc<dyn ClientHttpRequestFactory>, interceptors: Vec<RequestInterceptor>) -> Self {
        InterceptingRequestFactory {
            inner,
            chain: Arc::new(interceptors),
        }
    }
}

impl ClientHttpRequestFactory for InterceptingRequestFactory {
    fn create_request(
        &self,
        uri: &Uri,
        method: &HttpMethod,
    ) -> Result<Box<dyn ClientHttpRequest>, Error> {
        Ok(Box::new(InterceptingRequest {
            inner: self.inner.create_request(uri, method)?,
            chain: self.chain.clone(),
        }))
    }
}

struct InterceptingRequest {
    inner: Box<dyn ClientHttpRequest>,
    chain: Chain,
}

impl ClientHttpRequest for InterceptingRequest {
    fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    fn method(&self) -> &HttpMethod {
        self.inner.method()
    }

    fn headers(&self) -> &HttpHeaders {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HttpHeaders {
        self.inner.headers_mut()
    }

    fn body_mut(&mut self) -> &mut Vec<u8> {
        self.inner.body_mut()
    }

    fn execute(self: Box<Self>) -> ResponseResult {
        let this = *self;
        SyncExecution {
            request: this.inner,
            chain: this.chain,
            index: 0,
        }
        .execute()
    }

    fn execute_async(self: Box<Self>) -> BoxFuture<'static, ResponseResult> {
        let this = *self;
        AsyncExecution {
            request: this.inner,
            chain: this.chain,
            index: 0,
        }
        .execute()
    }
}

/// Sets `Authorization: Basic ...` on every request.
pub struct BasicAuthInterceptor {
    header_value: String,
}

impl BasicAuthInterceptor {
    pub fn new(username: &str, password: &str) -> Self {
        let credentials = format!("{}:{}", username, password);
        BasicAuthInterceptor {
            header_value: format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(credentials)
            ),
        }
    }
}

impl fmt::Debug for BasicAuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthInterceptor").finish()
    }
}

impl BeforeInterceptor for BasicAuthInterceptor {
    fn before_execute(&self, request: &mut dyn ClientHttpRequest) -> Result<(), Error> {
        request.headers_mut().set(AUTHORIZATION, self.header_value.clone());
        Ok(())
    }
}
