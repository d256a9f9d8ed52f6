//! URI templates like `/user/{id}` and resolution against a base address.

use crate::Error;
use http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::{BTreeMap, HashMap};

/// Everything but RFC 3986 unreserved characters is encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Values for the `{name}` placeholders of a URI template.
#[derive(Debug, Clone)]
pub enum UriVariables {
    /// The URI is already expanded and used as is.
    None,
    /// Values in order of first appearance of each placeholder.
    Positional(Vec<String>),
    /// Values by placeholder name.
    Named(HashMap<String, String>),
}

impl From<()> for UriVariables {
    fn from(_: ()) -> Self {
        UriVariables::None
    }
}

impl From<Vec<String>> for UriVariables {
    fn from(v: Vec<String>) -> Self {
        UriVariables::Positional(v)
    }
}

impl From<&[&str]> for UriVariables {
    fn from(v: &[&str]) -> Self {
        UriVariables::Positional(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for UriVariables {
    fn from(v: [&str; N]) -> Self {
        UriVariables::Positional(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<HashMap<String, String>> for UriVariables {
    fn from(v: HashMap<String, String>) -> Self {
        UriVariables::Named(v)
    }
}

impl From<&HashMap<String, String>> for UriVariables {
    fn from(v: &HashMap<String, String>) -> Self {
        UriVariables::Named(v.clone())
    }
}

impl From<HashMap<&str, &str>> for UriVariables {
    fn from(v: HashMap<&str, &str>) -> Self {
        UriVariables::Named(
            v.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for UriVariables {
    fn from(v: BTreeMap<String, String>) -> Self {
        UriVariables::Named(v.into_iter().collect())
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Variable(&'a str),
}

fn parse_template(template: &str) -> Result<Vec<Segment<'_>>, Error> {
    let mut segments = vec![];
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let close = rest[open..].find('}').ok_or_else(|| {
            Error::Argument(format!("Unclosed '{{' in uri template '{}'", template))
        })?;
        let name = rest[open + 1..open + close].trim();
        if name.is_empty() {
            return Err(Error::Argument(format!(
                "Empty variable name in uri template '{}'",
                template
            )));
        }
        segments.push(Segment::Variable(name));
        rest = &rest[open + close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }

    Ok(segments)
}

/// Distinct variable names of a template, in order of first appearance.
pub fn variable_names(template: &str) -> Result<Vec<String>, Error> {
    let mut names: Vec<String> = vec![];
    for segment in parse_template(template)? {
        if let Segment::Variable(name) = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Substitute the placeholders of `template`. Substituted values are percent encoded.
pub fn expand(template: &str, variables: &UriVariables) -> Result<String, Error> {
    let values: HashMap<String, String> = match variables {
        UriVariables::None => return Ok(template.to_string()),
        UriVariables::Named(map) => {
            for name in variable_names(template)? {
                if !map.contains_key(&name) {
                    return Err(Error::Argument(format!(
                        "Uri template '{}' variable '{}' has no value",
                        template, name
                    )));
                }
            }
            map.clone()
        }
        UriVariables::Positional(list) => {
            let names = variable_names(template)?;
            if names.len() != list.len() {
                return Err(Error::Argument(format!(
                    "Invalid amount of variables values in '{}': expected {}; got {}",
                    template,
                    names.len(),
                    list.len()
                )));
            }
            names.into_iter().zip(list.iter().cloned()).collect()
        }
    };

    let mut expanded = String::with_capacity(template.len());

    for segment in parse_template(template)? {
        match segment {
            Segment::Literal(s) => expanded.push_str(s),
            Segment::Variable(name) => {
                // presence checked above
                let value = values.get(name).map(|v| v.as_str()).unwrap_or("");
                expanded.extend(utf8_percent_encode(value, COMPONENT));
            }
        }
    }

    Ok(expanded)
}

/// Expand `template` and resolve it against `base` when relative.
///
/// Errors if the result is relative and there is no base address.
pub fn build_uri(
    base: Option<&Uri>,
    template: &str,
    variables: &UriVariables,
) -> Result<Uri, Error> {
    let expanded = expand(template, variables)?;

    let absolute = match url::Url::parse(&expanded) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                Error::Argument(format!(
                    "'{}' is not an absolute uri and no base address is set",
                    expanded
                ))
            })?;
            let base = url::Url::parse(&base.to_string()).map_err(|e| {
                Error::Argument(format!("Invalid base address '{}': {}", base, e))
            })?;
            base.join(&expanded).map_err(|e| {
                Error::Argument(format!("Cannot resolve '{}' against '{}': {}", expanded, base, e))
            })?
        }
        Err(e) => {
            return Err(Error::Argument(format!("Invalid uri '{}': {}", expanded, e)));
        }
    };

    absolute
        .as_str()
        .parse()
        .map_err(|e: http::uri::InvalidUri| Error::Http(e.into()))
}
