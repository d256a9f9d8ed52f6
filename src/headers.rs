//! Header collection with typed accessors.

use crate::media_type::MediaType;
use crate::method::HttpMethod;
use crate::Error;
use std::fmt;
use std::time::SystemTime;

pub const ACCEPT: &str = "Accept";
pub const ALLOW: &str = "Allow";
pub const AUTHORIZATION: &str = "Authorization";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const DATE: &str = "Date";
pub const ETAG: &str = "ETag";
pub const EXPIRES: &str = "Expires";
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
pub const IF_NONE_MATCH: &str = "If-None-Match";
pub const LAST_MODIFIED: &str = "Last-Modified";
pub const LOCATION: &str = "Location";
pub const PRAGMA: &str = "Pragma";

/// Ordered multi-map of header name to values.
///
/// Names are compared ignoring ASCII case, and keep the spelling of the first
/// insert. Typed accessors parse the raw strings on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        HttpHeaders::default()
    }

    fn entry(&self, name: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Append a value to the header.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some((_, values)) = self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            values.push(value);
        } else {
            self.entries.push((name.to_string(), vec![value]));
        }
    }

    /// Replace all values of the header with one value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some((_, values)) = self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            *values = vec![value];
        } else {
            self.entries.push((name.to_string(), vec![value]));
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// All values of the header, joined by `,`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.entry(name).map(|v| v.join(","))
    }

    /// The raw stored values of the header.
    pub fn values(&self, name: &str) -> &[String] {
        self.entry(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The one value of the header.
    ///
    /// Errors if more than one value was added.
    pub fn single_value(&self, name: &str) -> Result<Option<&str>, Error> {
        match self.entry(name).map(|v| v.as_slice()) {
            None | Some([]) => Ok(None),
            Some([one]) => Ok(Some(one.as_str())),
            Some(_) => Err(Error::MultipleHeaderValues(name.to_string())),
        }
    }

    /// The header split on `,` and trimmed.
    ///
    /// The split does not respect quoting, so `"a,b"` is two values.
    pub fn multi_values(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).map(|joined| {
            joined
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    /// Iterate name/value pairs in insertion order. A name with several values is
    /// repeated.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(n, vs)| vs.iter().map(move |v| (n.as_str(), v.as_str())))
    }

    /// Header names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn accept(&self) -> Result<Vec<MediaType>, Error> {
        match self.multi_values(ACCEPT) {
            Some(values) => values.iter().map(|v| MediaType::parse(v)).collect(),
            None => Ok(vec![]),
        }
    }

    /// Appends to any existing `Accept` values.
    pub fn set_accept(&mut self, media_types: &[MediaType]) {
        self.add(ACCEPT, join(media_types));
    }

    pub fn allow(&self) -> Result<Vec<HttpMethod>, Error> {
        match self.multi_values(ALLOW) {
            Some(values) => values.iter().map(|v| HttpMethod::new(v)).collect(),
            None => Ok(vec![]),
        }
    }

    /// Appends to any existing `Allow` values.
    pub fn set_allow(&mut self, methods: &[HttpMethod]) {
        self.add(ALLOW, join(methods));
    }

    pub fn cache_control(&self) -> Result<Option<&str>, Error> {
        self.single_value(CACHE_CONTROL)
    }

    pub fn set_cache_control(&mut self, value: &str) {
        self.set(CACHE_CONTROL, value);
    }

    /// The content length, `-1` when absent or unparseable.
    pub fn content_length(&self) -> i64 {
        self.single_value(CONTENT_LENGTH)
            .ok()
            .flatten()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(-1)
    }

    pub fn set_content_length(&mut self, length: i64) {
        self.set(CONTENT_LENGTH, length.to_string());
    }

    pub fn content_type(&self) -> Result<Option<MediaType>, Error> {
        self.single_value(CONTENT_TYPE)?
            .map(MediaType::parse)
            .transpose()
    }

    /// Errors if the media type has a wildcard type or subtype.
    pub fn set_content_type(&mut self, media_type: &MediaType) -> Result<(), Error> {
        if media_type.is_wildcard_type() {
            return Err(Error::Argument(
                "'Content-Type' cannot contain wildcard type '*'".into(),
            ));
        }
        if media_type.is_wildcard_subtype() {
            return Err(Error::Argument(
                "'Content-Type' cannot contain wildcard subtype '*'".into(),
            ));
        }
        self.set(CONTENT_TYPE, media_type.to_string());
        Ok(())
    }

    pub fn date(&self) -> Result<Option<SystemTime>, Error> {
        self.get_date(DATE)
    }

    pub fn set_date(&mut self, date: SystemTime) {
        self.set_date_header(DATE, date);
    }

    /// The entity tag, quotes included.
    pub fn etag(&self) -> Result<Option<&str>, Error> {
        self.single_value(ETAG)
    }

    /// Quotes the tag unless it is already quoted or weak (`W/"..."`).
    pub fn set_etag(&mut self, etag: &str) {
        self.set(ETAG, quote_etag(etag));
    }

    pub fn expires(&self) -> Result<Option<SystemTime>, Error> {
        self.get_date(EXPIRES)
    }

    pub fn set_expires(&mut self, date: SystemTime) {
        self.set_date_header(EXPIRES, date);
    }

    pub fn if_modified_since(&self) -> Result<Option<SystemTime>, Error> {
        self.get_date(IF_MODIFIED_SINCE)
    }

    pub fn set_if_modified_since(&mut self, date: SystemTime) {
        self.set_date_header(IF_MODIFIED_SINCE, date);
    }

    pub fn if_none_match(&self) -> Vec<String> {
        self.multi_values(IF_NONE_MATCH).unwrap_or_default()
    }

    pub fn set_if_none_match(&mut self, etags: &[&str]) {
        let quoted: Vec<String> = etags.iter().map(|e| quote_etag(e)).collect();
        self.set(IF_NONE_MATCH, quoted.join(", "));
    }

    pub fn last_modified(&self) -> Result<Option<SystemTime>, Error> {
        self.get_date(LAST_MODIFIED)
    }

    pub fn set_last_modified(&mut self, date: SystemTime) {
        self.set_date_header(LAST_MODIFIED, date);
    }

    pub fn location(&self) -> Result<Option<http::Uri>, Error> {
        match self.single_value(LOCATION)? {
            Some(v) => Ok(Some(v.trim().parse().map_err(|e: http::uri::InvalidUri| {
                Error::Http(e.into())
            })?)),
            None => Ok(None),
        }
    }

    pub fn set_location(&mut self, location: &http::Uri) {
        self.set(LOCATION, location.to_string());
    }

    pub fn pragma(&self) -> Result<Option<&str>, Error> {
        self.single_value(PRAGMA)
    }

    pub fn set_pragma(&mut self, value: &str) {
        self.set(PRAGMA, value);
    }

    fn get_date(&self, name: &str) -> Result<Option<SystemTime>, Error> {
        match self.single_value(name)? {
            Some(v) => httpdate::parse_http_date(v.trim()).map(Some).map_err(|_| {
                Error::Argument(format!("Cannot parse date value '{}' for '{}' header", v, name))
            }),
            None => Ok(None),
        }
    }

    // SystemTime carries no zone, the RFC 1123 form is always GMT.
    fn set_date_header(&mut self, name: &str, date: SystemTime) {
        self.set(name, httpdate::fmt_http_date(date));
    }

    /// Convert to the `http` crate header map. Invalid names and values are dropped.
    pub fn to_header_map(&self) -> http::HeaderMap {
        let mut map = http::HeaderMap::with_capacity(self.entries.len());

        for (name, value) in self.iter() {
            let name = http::header::HeaderName::from_bytes(name.as_bytes());
            let value = http::header::HeaderValue::from_str(value);
            match (name, value) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                (Err(e), _) => {
                    debug!("Dropping bad header name: {}", e);
                }
                (Ok(name), Err(e)) => {
                    debug!("Dropping bad header value ({}): {}", name, e);
                }
            }
        }

        map
    }
}

impl From<&http::HeaderMap> for HttpHeaders {
    fn from(map: &http::HeaderMap) -> Self {
        let mut headers = HttpHeaders::new();
        for (name, value) in map {
            match value.to_str() {
                Ok(v) => headers.add(name.as_str(), v),
                Err(_) => headers.add(name.as_str(), String::from_utf8_lossy(value.as_bytes())),
            }
        }
        headers
    }
}

impl fmt::Display for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in &self.entries {
            writeln!(f, "{}: {}", name, values.join(","))?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_etag(etag: &str) -> String {
    if etag.starts_with('"') || etag.starts_with("W/") {
        etag.to_string()
    } else {
        format!("\"{}\"", etag)
    }
}
