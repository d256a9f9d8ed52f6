use crate::Error;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An HTTP verb.
///
/// The token is kept as given, but comparison and hashing ignore ASCII case, so
/// `HttpMethod::new("get") == HttpMethod::GET`.
#[derive(Debug, Clone)]
pub struct HttpMethod(Cow<'static, str>);

impl HttpMethod {
    pub const GET: HttpMethod = HttpMethod(Cow::Borrowed("GET"));
    pub const POST: HttpMethod = HttpMethod(Cow::Borrowed("POST"));
    pub const PUT: HttpMethod = HttpMethod(Cow::Borrowed("PUT"));
    pub const DELETE: HttpMethod = HttpMethod(Cow::Borrowed("DELETE"));
    pub const HEAD: HttpMethod = HttpMethod(Cow::Borrowed("HEAD"));
    pub const OPTIONS: HttpMethod = HttpMethod(Cow::Borrowed("OPTIONS"));
    pub const TRACE: HttpMethod = HttpMethod(Cow::Borrowed("TRACE"));
    pub const CONNECT: HttpMethod = HttpMethod(Cow::Borrowed("CONNECT"));

    const KNOWN: [HttpMethod; 8] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
        HttpMethod::TRACE,
        HttpMethod::CONNECT,
    ];

    /// Create a method from a token. Well known verbs resolve to their constant.
    ///
    /// Errors if the token is empty or contains whitespace.
    pub fn new(token: &str) -> Result<HttpMethod, Error> {
        let token = token.trim();

        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(Error::Argument(format!("Invalid http method: '{}'", token)));
        }

        for known in HttpMethod::KNOWN.iter() {
            if known.as_str().eq_ignore_ascii_case(token) {
                return Ok(known.clone());
            }
        }

        Ok(HttpMethod(Cow::Owned(token.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conversion for the `http` crate, which is case sensitive.
    pub fn to_http(&self) -> Result<http::Method, Error> {
        http::Method::from_bytes(self.0.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::Http(e.into()))
    }
}

impl PartialEq for HttpMethod {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HttpMethod {}

impl Hash for HttpMethod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::new(s)
    }
}
