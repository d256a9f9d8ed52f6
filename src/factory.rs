//! Default request factory: one HTTP/1.1 exchange per TCP connection.

use crate::client::{ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse};
use crate::client::ResponseResult;
use crate::headers::HttpHeaders;
use crate::http11::{poll_for_crlfcrlf, try_parse_res, write_http11_req};
use crate::limit::LimitRead;
use crate::method::HttpMethod;
use crate::Error;
use async_std::net::TcpStream;
use futures_util::future::{poll_fn, BoxFuture};
use futures_util::io::{AsyncWriteExt, BufReader};
use http::{StatusCode, Uri};
use std::io;
use std::time::Duration;

/// Creates requests that open a new connection each, and close it once the
/// response is read. Plain `http` only.
#[derive(Debug, Clone, Default)]
pub struct DefaultRequestFactory {
    timeout: Option<Duration>,
}

impl DefaultRequestFactory {
    pub fn new() -> Self {
        DefaultRequestFactory::default()
    }

    /// Limit for an entire exchange: connect, send and receive.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl ClientHttpRequestFactory for DefaultRequestFactory {
    fn create_request(
        &self,
        uri: &Uri,
        method: &HttpMethod,
    ) -> Result<Box<dyn ClientHttpRequest>, Error> {
        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(Error::Unsupported(format!(
                    "scheme '{}' for '{}', only http is supported",
                    other, uri
                )));
            }
            None => {
                return Err(Error::Argument(format!("'{}' is not an absolute uri", uri)));
            }
        }

        Ok(Box::new(DefaultRequest {
            uri: uri.clone(),
            method: method.clone(),
            headers: HttpHeaders::new(),
            body: vec![],
            timeout: self.timeout,
        }))
    }
}

struct DefaultRequest {
    uri: Uri,
    method: HttpMethod,
    headers: HttpHeaders,
    body: Vec<u8>,
    timeout: Option<Duration>,
}

impl ClientHttpRequest for DefaultRequest {
    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn method(&self) -> &HttpMethod {
        &self.method
    }

    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    fn execute(self: Box<Self>) -> ResponseResult {
        async_std::task::block_on(self.execute_async())
    }

    fn execute_async(self: Box<Self>) -> BoxFuture<'static, ResponseResult> {
        Box::pin(async move {
            let req = *self;
            match req.timeout {
                Some(timeout) => {
                    let uri = req.uri.clone();
                    async_std::future::timeout(timeout, req.send())
                        .await
                        .map_err(|_| {
                            io::Error::new(
                                io::ErrorKind::TimedOut,
                                format!("Request for '{}' timed out after {:?}", uri, timeout),
                            )
                        })?
                }
                None => req.send().await,
            }
        })
    }
}

impl DefaultRequest {
    fn to_http_request(&self) -> Result<http::Request<()>, Error> {
        let mut req = http::Request::builder()
            .method(self.method.to_http()?)
            .uri(self.uri.clone())
            .version(http::Version::HTTP_11)
            .body(())?;

        let headers = req.headers_mut();
        headers.extend(self.headers.to_header_map());

        if !headers.contains_key(http::header::CONNECTION) {
            headers.insert(
                http::header::CONNECTION,
                http::HeaderValue::from_static("close"),
            );
        }

        let wants_length = !self.body.is_empty()
            || self.method == HttpMethod::POST
            || self.method == HttpMethod::PUT;

        if wants_length && !headers.contains_key(http::header::CONTENT_LENGTH) {
            headers.insert(http::header::CONTENT_LENGTH, self.body.len().into());
        }

        Ok(req)
    }

    async fn send(self) -> ResponseResult {
        let req = self.to_http_request()?;

        let host = self
            .uri
            .host()
            .ok_or_else(|| Error::Argument(format!("No host in '{}'", self.uri)))?;
        let port = self.uri.port_u16().unwrap_or(80);

        trace!("Connect to {}:{}", host, port);
        let tcp = TcpStream::connect((host, port)).await?;
        let mut io = BufReader::new(tcp);

        let mut to_write = Vec::with_capacity(1024 + self.body.len());
        write_http11_req(&req, &mut to_write)?;
        to_write.extend_from_slice(&self.body);

        io.get_mut().write_all(&to_write).await?;
        io.get_mut().flush().await?;

        let mut head = vec![];
        poll_fn(|cx| poll_for_crlfcrlf(cx, &mut head, &mut io)).await?;

        let (head, _) = try_parse_res(&head)?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "Incomplete http11 response head")
        })?;

        let limit = LimitRead::from_response(&self.method, &head.response);
        let body = limit.read_body(&mut io).await?;

        trace!("Received {} body bytes from '{}'", body.len(), self.uri);

        let (parts, _) = head.response.into_parts();

        Ok(Box::new(DefaultResponse {
            status: parts.status,
            reason: head.reason,
            headers: HttpHeaders::from(&parts.headers),
            body,
        }))
    }
}

struct DefaultResponse {
    status: StatusCode,
    reason: String,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl ClientHttpResponse for DefaultResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn status_description(&self) -> &str {
        &self.reason
    }

    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}
