//! MIME types as used in `Accept` and `Content-Type` headers.

use crate::Error;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const WILDCARD: &str = "*";
const PARAM_CHARSET: &str = "charset";
const PARAM_QUALITY: &str = "q";

/// A media type, i.e. `text/plain;charset=utf-8`.
///
/// Type and subtype are always lower case. Parameter names are compared ignoring
/// case (and stored lower case), parameter values are compared ignoring case.
#[derive(Debug, Clone)]
pub struct MediaType {
    type_: Cow<'static, str>,
    subtype: Cow<'static, str>,
    params: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl MediaType {
    pub const ALL: MediaType = MediaType::from_static("*", "*");
    pub const APPLICATION_ATOM_XML: MediaType = MediaType::from_static("application", "atom+xml");
    pub const APPLICATION_FORM_URLENCODED: MediaType =
        MediaType::from_static("application", "x-www-form-urlencoded");
    pub const APPLICATION_JSON: MediaType = MediaType::from_static("application", "json");
    pub const APPLICATION_OCTET_STREAM: MediaType =
        MediaType::from_static("application", "octet-stream");
    pub const APPLICATION_RSS_XML: MediaType = MediaType::from_static("application", "rss+xml");
    pub const APPLICATION_WILDCARD_JSON: MediaType = MediaType::from_static("application", "*+json");
    pub const APPLICATION_WILDCARD_XML: MediaType = MediaType::from_static("application", "*+xml");
    pub const APPLICATION_XHTML_XML: MediaType = MediaType::from_static("application", "xhtml+xml");
    pub const APPLICATION_XML: MediaType = MediaType::from_static("application", "xml");
    pub const IMAGE_GIF: MediaType = MediaType::from_static("image", "gif");
    pub const IMAGE_JPEG: MediaType = MediaType::from_static("image", "jpeg");
    pub const IMAGE_PNG: MediaType = MediaType::from_static("image", "png");
    pub const MULTIPART_FORM_DATA: MediaType = MediaType::from_static("multipart", "form-data");
    pub const TEXT_HTML: MediaType = MediaType::from_static("text", "html");
    pub const TEXT_PLAIN: MediaType = MediaType::from_static("text", "plain");
    pub const TEXT_XML: MediaType = MediaType::from_static("text", "xml");

    // Callers must pass lower case.
    const fn from_static(type_: &'static str, subtype: &'static str) -> MediaType {
        MediaType {
            type_: Cow::Borrowed(type_),
            subtype: Cow::Borrowed(subtype),
            params: Vec::new(),
        }
    }

    /// Create a media type without parameters.
    pub fn new(type_: &str, subtype: &str) -> MediaType {
        MediaType {
            type_: Cow::Owned(type_.trim().to_ascii_lowercase()),
            subtype: Cow::Owned(subtype.trim().to_ascii_lowercase()),
            params: Vec::new(),
        }
    }

    /// Create a media type with parameters.
    ///
    /// A later parameter replaces an earlier one of the same name.
    pub fn with_parameters<I, K, V>(type_: &str, subtype: &str, params: I) -> MediaType
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut media_type = MediaType::new(type_, subtype);
        for (name, value) in params {
            media_type.put_param(name.as_ref(), value.as_ref());
        }
        media_type
    }

    /// Parse a single media type, i.e. `application/json;q=0.8`.
    pub fn parse(text: &str) -> Result<MediaType, Error> {
        let mut parts = text.split(';');

        let full_type = parts.next().map(str::trim).unwrap_or("");
        let full_type = if full_type == WILDCARD { "*/*" } else { full_type };

        let slash = full_type.find('/').ok_or_else(|| {
            Error::InvalidMediaType(format!("'{}' does not contain '/'", text))
        })?;

        let type_ = &full_type[..slash];
        let subtype = &full_type[slash + 1..];

        if type_.is_empty() {
            return Err(Error::InvalidMediaType(format!(
                "'{}' does not contain a type",
                text
            )));
        }
        if subtype.is_empty() {
            return Err(Error::InvalidMediaType(format!(
                "'{}' does not contain a subtype",
                text
            )));
        }
        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(Error::InvalidMediaType(format!(
                "'{}' has a wildcard type with a concrete subtype",
                text
            )));
        }

        let mut media_type = MediaType::new(type_, subtype);

        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }

            let eq = param.find('=').ok_or_else(|| {
                Error::InvalidMediaType(format!("'{}' has a parameter without '='", text))
            })?;

            let name = param[..eq].trim();
            let value = param[eq + 1..].trim();

            if name.eq_ignore_ascii_case(PARAM_QUALITY) {
                let q: f64 = unquote(value).parse().map_err(|_| {
                    Error::InvalidMediaType(format!("'{}' has an invalid quality value", text))
                })?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(Error::InvalidMediaType(format!(
                        "'{}' has a quality value outside 0.0 to 1.0",
                        text
                    )));
                }
            }

            media_type.put_param(name, value);
        }

        Ok(media_type)
    }

    /// Parse a comma separated list of media types, as found in an `Accept` header.
    pub fn parse_list(text: &str) -> Result<Vec<MediaType>, Error> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(MediaType::parse)
            .collect()
    }

    fn put_param(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();

        if let Some(existing) = self.params.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = Cow::Owned(value);
        } else {
            self.params.push((Cow::Owned(name), Cow::Owned(value)));
        }
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Raw parameter value, quotes included.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }

    /// Parameters in the order they were given.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_ref(), v.as_ref()))
    }

    /// The encoding named by the `charset` parameter.
    pub fn charset(&self) -> Option<&'static Encoding> {
        self.parameter(PARAM_CHARSET)
            .and_then(|label| Encoding::for_label(unquote(label).as_bytes()))
    }

    /// The `q` parameter, `1.0` when absent.
    pub fn quality_value(&self) -> f64 {
        self.parameter(PARAM_QUALITY)
            .and_then(|q| unquote(q).parse().ok())
            .unwrap_or(1.0)
    }

    /// A copy with the `charset` parameter set.
    pub fn with_charset(&self, charset: &str) -> MediaType {
        let mut copy = self.clone();
        copy.put_param(PARAM_CHARSET, charset);
        copy
    }

    /// A copy with the quality value of `other`, if it has one.
    pub fn copy_quality_value(&self, other: &MediaType) -> MediaType {
        match other.parameter(PARAM_QUALITY) {
            Some(q) => {
                let mut copy = self.clone();
                copy.put_param(PARAM_QUALITY, q);
                copy
            }
            None => self.clone(),
        }
    }

    /// A copy without the `q` parameter.
    pub fn remove_quality_value(&self) -> MediaType {
        let mut copy = self.clone();
        copy.params.retain(|(n, _)| n != PARAM_QUALITY);
        copy
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == WILDCARD
    }

    /// `*` or a suffix wildcard like `*+xml`.
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD || self.subtype.starts_with("*+")
    }

    /// Neither type nor subtype is a wildcard.
    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard_type() && !self.is_wildcard_subtype()
    }

    fn subtype_suffix(&self) -> Option<&str> {
        self.subtype.find('+').map(|i| &self.subtype[i + 1..])
    }

    /// Whether this media type includes `other`.
    ///
    /// `text/*` includes `text/plain`, but not the other way around.
    pub fn includes(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() {
            return true;
        }
        if self.type_ != other.type_ {
            return false;
        }
        if self.subtype == other.subtype {
            return true;
        }
        if self.is_wildcard_subtype() {
            // application/*+xml includes application/soap+xml
            match self.subtype.find('+') {
                None => return true,
                Some(this_plus) => {
                    if let Some(other_plus) = other.subtype.find('+') {
                        let this_prefix = &self.subtype[..this_plus];
                        let this_suffix = &self.subtype[this_plus + 1..];
                        let other_suffix = &other.subtype[other_plus + 1..];

                        if this_prefix == WILDCARD && this_suffix == other_suffix {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Symmetric version of [`includes`](MediaType::includes).
    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() || other.is_wildcard_type() {
            return true;
        }
        if self.type_ != other.type_ {
            return false;
        }
        if self.subtype == other.subtype {
            return true;
        }
        if self.is_wildcard_subtype() || other.is_wildcard_subtype() {
            if self.subtype == WILDCARD || other.subtype == WILDCARD {
                return true;
            }

            let this_suffix = self.subtype_suffix();
            let other_suffix = other.subtype_suffix();

            if self.is_wildcard_subtype() {
                if let Some(this_suffix) = this_suffix {
                    return this_suffix == other.subtype() || Some(this_suffix) == other_suffix;
                }
            }
            if other.is_wildcard_subtype() {
                if let Some(other_suffix) = other_suffix {
                    return other_suffix == self.subtype() || Some(other_suffix) == this_suffix;
                }
            }
        }
        false
    }

    fn sorted_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<_> = self
            .params
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_ascii_lowercase()))
            .collect();
        params.sort();
        params
    }

    /// Stable sort, most specific first.
    ///
    /// ```
    /// # use rest_h1::MediaType;
    /// let mut list: Vec<MediaType> = vec![
    ///     "audio/*".parse().unwrap(),
    ///     "audio/basic;level=1".parse().unwrap(),
    ///     "*/*".parse().unwrap(),
    ///     "audio/basic".parse().unwrap(),
    /// ];
    /// MediaType::sort_by_specificity(&mut list);
    /// assert_eq!(list[0].to_string(), "audio/basic;level=1");
    /// assert_eq!(list[3].to_string(), "*/*");
    /// ```
    pub fn sort_by_specificity(list: &mut Vec<MediaType>) {
        stable_sort(list, compare_specificity);
    }

    /// Stable sort, highest quality value first, then by specificity.
    pub fn sort_by_quality_value(list: &mut Vec<MediaType>) {
        stable_sort(list, compare_quality_value);
    }
}

/// Sorts `list` pairing each element with its original index.
///
/// The rank comparators are not total orders (unrelated types compare equal), so
/// this uses an insertion sort where ties keep their original position.
fn stable_sort(list: &mut Vec<MediaType>, rank: fn(&MediaType, &MediaType) -> Ordering) {
    if list.len() < 2 {
        return;
    }

    let mut indexed: Vec<(usize, MediaType)> = list.drain(..).enumerate().collect();

    for i in 1..indexed.len() {
        let mut j = i;
        while j > 0 {
            let (ia, a) = &indexed[j - 1];
            let (ib, b) = &indexed[j];
            let ord = rank(a, b).then_with(|| ia.cmp(ib));
            if ord != Ordering::Greater {
                break;
            }
            indexed.swap(j - 1, j);
            j -= 1;
        }
    }

    list.extend(indexed.into_iter().map(|(_, m)| m));
}

fn compare_wildcards(a: &MediaType, b: &MediaType) -> Option<Ordering> {
    if a.is_wildcard_type() && !b.is_wildcard_type() {
        return Some(Ordering::Greater);
    }
    if b.is_wildcard_type() && !a.is_wildcard_type() {
        return Some(Ordering::Less);
    }
    if a.type_ != b.type_ {
        return Some(Ordering::Equal);
    }
    if a.is_wildcard_subtype() && !b.is_wildcard_subtype() {
        return Some(Ordering::Greater);
    }
    if b.is_wildcard_subtype() && !a.is_wildcard_subtype() {
        return Some(Ordering::Less);
    }
    if a.subtype != b.subtype {
        return Some(Ordering::Equal);
    }
    None
}

fn compare_quality(a: &MediaType, b: &MediaType) -> Ordering {
    // higher quality first
    b.quality_value()
        .partial_cmp(&a.quality_value())
        .unwrap_or(Ordering::Equal)
}

fn compare_param_count(a: &MediaType, b: &MediaType) -> Ordering {
    // more parameters is more specific
    b.params.len().cmp(&a.params.len())
}

fn compare_specificity(a: &MediaType, b: &MediaType) -> Ordering {
    if let Some(ord) = compare_wildcards(a, b) {
        return ord;
    }
    compare_quality(a, b).then_with(|| compare_param_count(a, b))
}

fn compare_quality_value(a: &MediaType, b: &MediaType) -> Ordering {
    let ord = compare_quality(a, b);
    if ord != Ordering::Equal {
        return ord;
    }
    if let Some(ord) = compare_wildcards(a, b) {
        return ord;
    }
    compare_param_count(a, b)
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MediaType {}

impl PartialOrd for MediaType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_
            .cmp(&other.type_)
            .then_with(|| self.subtype.cmp(&other.subtype))
            .then_with(|| self.params.len().cmp(&other.params.len()))
            .then_with(|| self.sorted_params().cmp(&other.sorted_params()))
    }
}

impl Hash for MediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_.hash(state);
        self.subtype.hash(state);
        self.sorted_params().hash(state);
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, ";{}={}", name, value)?;
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}
