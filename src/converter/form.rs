use super::{can_read_media_type, can_write_media_type, write_bytes};
use super::{input_content_type, wrong_type, BodyType, HttpMessageConverter};
use crate::client::{HttpInputMessage, HttpOutputMessage};
use crate::media_type::MediaType;
use crate::Error;
use std::any::Any;

/// Ordered name/value pairs of an `application/x-www-form-urlencoded` body.
///
/// A name may occur several times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        FormData::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// First value for the name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Reads and writes [`FormData`] as `application/x-www-form-urlencoded`.
///
/// Only UTF-8 is supported.
#[derive(Debug)]
pub struct FormConverter {
    supported: Vec<MediaType>,
}

impl FormConverter {
    pub fn new() -> Self {
        FormConverter {
            supported: vec![MediaType::APPLICATION_FORM_URLENCODED],
        }
    }
}

impl Default for FormConverter {
    fn default() -> Self {
        FormConverter::new()
    }
}

impl HttpMessageConverter for FormConverter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn can_read(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        body_type.is::<FormData>() && can_read_media_type(&self.supported, media_type)
    }

    fn can_write(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        body_type.is::<FormData>() && can_write_media_type(&self.supported, media_type)
    }

    fn read(
        &self,
        _body_type: BodyType,
        message: &dyn HttpInputMessage,
    ) -> Result<Box<dyn Any + Send>, Error> {
        if let Some(charset) = input_content_type(message).and_then(|m| m.charset()) {
            if charset != encoding_rs::UTF_8 {
                debug!("Reading form body as UTF-8, ignoring charset {}", charset.name());
            }
        }

        let form: FormData = form_urlencoded::parse(message.body()).into_owned().collect();

        Ok(Box::new(form))
    }

    fn write(
        &self,
        body: &dyn Any,
        _media_type: Option<&MediaType>,
        message: &mut dyn HttpOutputMessage,
    ) -> Result<(), Error> {
        let form = body
            .downcast_ref::<FormData>()
            .ok_or_else(|| wrong_type("FormConverter", "FormData"))?;

        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter())
            .finish();

        write_bytes(
            message,
            &MediaType::APPLICATION_FORM_URLENCODED,
            encoded.as_bytes(),
        )
    }
}
