use crate::headers::HttpHeaders;
use crate::method::HttpMethod;
use http::StatusCode;
use std::fmt;
use std::io;

/// Possible errors from this crate.
#[derive(Debug)]
pub enum Error {
    /// A usage problem such as a relative URI with no base address, or mismatched
    /// URI template variables.
    Argument(String),
    /// A media type string that could not be parsed.
    InvalidMediaType(String),
    /// A single header value was asked for, but several are stored.
    MultipleHeaderValues(String),
    /// No registered message converter can read or write the requested body.
    NoSuitableConverter(String),
    /// A message converter failed to read or write a body.
    Conversion(String),
    /// The request was canceled before a result was delivered.
    Cancelled,
    /// Something the default request factory does not do, such as TLS.
    Unsupported(String),
    /// An asynchronous call panicked while running. Holds the panic message.
    Panicked(String),
    /// The server answered with a 4xx status.
    Client(HttpResponseError),
    /// The server answered with a 5xx status.
    Server(HttpResponseError),
    /// A wrapped std::io::Error from the underlying transport (socket).
    Io(io::Error),
    /// HTTP/1.1 parse errors from the `httparse` crate.
    Http11Parser(httparse::Error),
    /// Http errors from the `http` crate.
    Http(http::Error),
    /// JSON (de)serialization errors from `serde_json`.
    Json(serde_json::Error),
}

impl Error {
    /// Tells whether this error stands for a canceled request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// The captured response of a client or server error.
    pub fn response_error(&self) -> Option<&HttpResponseError> {
        match self {
            Error::Client(e) | Error::Server(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Argument(v) => write!(f, "{}", v),
            Error::InvalidMediaType(v) => write!(f, "invalid media type: {}", v),
            Error::MultipleHeaderValues(v) => {
                write!(f, "multiple values found for header '{}'", v)
            }
            Error::NoSuitableConverter(v) => write!(f, "{}", v),
            Error::Conversion(v) => write!(f, "{}", v),
            Error::Cancelled => write!(f, "The request was canceled"),
            Error::Unsupported(v) => write!(f, "unsupported: {}", v),
            Error::Panicked(v) => write!(f, "request panicked: {}", v),
            Error::Client(v) => fmt::Display::fmt(v, f),
            Error::Server(v) => fmt::Display::fmt(v, f),
            Error::Io(v) => fmt::Display::fmt(v, f),
            Error::Http11Parser(v) => write!(f, "http11 parser: {}", v),
            Error::Http(v) => write!(f, "http api: {}", v),
            Error::Json(v) => write!(f, "json: {}", v),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http11Parser(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<httparse::Error> for Error {
    fn from(e: httparse::Error) -> Self {
        Error::Http11Parser(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// A fully captured error response.
///
/// Carries everything needed to inspect the failure without re-issuing the request.
#[derive(Debug, Clone)]
pub struct HttpResponseError {
    uri: http::Uri,
    method: HttpMethod,
    status: StatusCode,
    status_description: String,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl HttpResponseError {
    pub(crate) fn new(
        uri: http::Uri,
        method: HttpMethod,
        status: StatusCode,
        status_description: String,
        headers: HttpHeaders,
        body: Vec<u8>,
    ) -> Self {
        HttpResponseError {
            uri,
            method,
            status,
            status_description,
            headers,
            body,
        }
    }

    pub fn uri(&self) -> &http::Uri {
        &self.uri
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_description(&self) -> &str {
        &self.status_description
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn response_body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body with the charset of the response content type.
    ///
    /// Falls back on ISO-8859-1 when there is no usable charset.
    pub fn response_body_as_string(&self) -> String {
        let encoding = self
            .headers
            .content_type()
            .ok()
            .flatten()
            .and_then(|ct| ct.charset())
            .unwrap_or(encoding_rs::WINDOWS_1252);

        let (text, _, _) = encoding.decode(&self.body);

        text.into_owned()
    }
}

impl fmt::Display for HttpResponseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} request for '{}' resulted in {} - {} ({}).",
            self.method,
            self.uri,
            self.status.as_u16(),
            status_name(self.status),
            self.status_description
        )
    }
}

impl std::error::Error for HttpResponseError {}

/// Status code as a single word, i.e. `404` becomes `NotFound`.
pub(crate) fn status_name(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect(),
        None => status.as_u16().to_string(),
    }
}
