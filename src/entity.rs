use crate::headers::HttpHeaders;
use http::StatusCode;

/// A request (or response) body together with its headers.
#[derive(Debug, Clone, Default)]
pub struct HttpEntity<B> {
    body: Option<B>,
    headers: HttpHeaders,
}

impl HttpEntity<()> {
    /// An entity with neither body nor headers.
    pub fn empty() -> Self {
        HttpEntity {
            body: None,
            headers: HttpHeaders::new(),
        }
    }

    /// An entity with headers only.
    pub fn from_headers(headers: HttpHeaders) -> Self {
        HttpEntity {
            body: None,
            headers,
        }
    }
}

impl<B> HttpEntity<B> {
    pub fn new(body: B) -> Self {
        HttpEntity {
            body: Some(body),
            headers: HttpHeaders::new(),
        }
    }

    pub fn with_headers(body: B, headers: HttpHeaders) -> Self {
        HttpEntity {
            body: Some(body),
            headers,
        }
    }

    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn into_parts(self) -> (Option<B>, HttpHeaders) {
        (self.body, self.headers)
    }
}

/// A received response, read and error checked.
#[derive(Debug, Clone)]
pub struct HttpResponseMessage<T> {
    headers: HttpHeaders,
    status: StatusCode,
    status_description: String,
    body: Option<T>,
}

impl<T> HttpResponseMessage<T> {
    pub fn new(
        body: Option<T>,
        headers: HttpHeaders,
        status: StatusCode,
        status_description: impl Into<String>,
    ) -> Self {
        HttpResponseMessage {
            headers,
            status,
            status_description: status_description.into(),
            body,
        }
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase sent by the server.
    pub fn status_description(&self) -> &str {
        &self.status_description
    }

    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }
}
