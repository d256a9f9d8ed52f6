//! The seam between the template and whatever carries the bytes.
//!
//! A [`ClientHttpRequestFactory`] hands out requests. Each request is prepared
//! (headers, buffered body) and then executed exactly once, either blocking or
//! as a future. The default implementation is [`DefaultRequestFactory`].
//!
//! [`DefaultRequestFactory`]: crate::DefaultRequestFactory

use crate::headers::HttpHeaders;
use crate::method::HttpMethod;
use crate::Error;
use futures_util::future::BoxFuture;
use http::{StatusCode, Uri};

/// Result of executing a request.
pub type ResponseResult = Result<Box<dyn ClientHttpResponse>, Error>;

/// Creates requests for a URI and method.
pub trait ClientHttpRequestFactory: Send + Sync {
    fn create_request(
        &self,
        uri: &Uri,
        method: &HttpMethod,
    ) -> Result<Box<dyn ClientHttpRequest>, Error>;
}

/// A request that can be prepared and then executed once.
pub trait ClientHttpRequest: Send {
    fn uri(&self) -> &Uri;

    fn method(&self) -> &HttpMethod;

    fn headers(&self) -> &HttpHeaders;

    fn headers_mut(&mut self) -> &mut HttpHeaders;

    /// Buffer for the request body.
    fn body_mut(&mut self) -> &mut Vec<u8>;

    /// Send the request and wait for the entire response on the current thread.
    fn execute(self: Box<Self>) -> ResponseResult;

    /// Send the request. Nothing is sent until the future is polled.
    fn execute_async(self: Box<Self>) -> BoxFuture<'static, ResponseResult>;
}

/// A received response with its body read into memory.
///
/// Dropping the response releases the underlying connection.
pub trait ClientHttpResponse: Send {
    fn status(&self) -> StatusCode;

    /// The reason phrase as sent by the server.
    fn status_description(&self) -> &str;

    fn headers(&self) -> &HttpHeaders;

    fn body(&self) -> &[u8];
}

/// An incoming message as seen by a message converter.
pub trait HttpInputMessage {
    fn headers(&self) -> &HttpHeaders;

    fn body(&self) -> &[u8];
}

/// An outgoing message as seen by a message converter.
pub trait HttpOutputMessage {
    fn headers(&self) -> &HttpHeaders;

    fn headers_mut(&mut self) -> &mut HttpHeaders;

    fn body_mut(&mut self) -> &mut Vec<u8>;
}

impl<'a, T: ClientHttpResponse + ?Sized> HttpInputMessage for &'a T {
    fn headers(&self) -> &HttpHeaders {
        ClientHttpResponse::headers(*self)
    }

    fn body(&self) -> &[u8] {
        ClientHttpResponse::body(*self)
    }
}

impl<'a, T: ClientHttpRequest + ?Sized> HttpOutputMessage for &'a mut T {
    fn headers(&self) -> &HttpHeaders {
        ClientHttpRequest::headers(&**self)
    }

    fn headers_mut(&mut self) -> &mut HttpHeaders {
        ClientHttpRequest::headers_mut(&mut **self)
    }

    fn body_mut(&mut self) -> &mut Vec<u8> {
        ClientHttpRequest::body_mut(&mut **self)
    }
}
