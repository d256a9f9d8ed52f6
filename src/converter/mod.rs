//! Message converters: turning bodies into bytes and back.
//!
//! Content negotiation is driven entirely by [`HttpMessageConverter::can_read`]
//! and [`HttpMessageConverter::can_write`]. Bodies cross the converter boundary
//! type erased, identified by a [`BodyType`].

mod byte_array;
mod form;
mod json;
mod string;

pub use byte_array::ByteArrayConverter;
pub use form::{FormConverter, FormData};
pub use json::JsonConverter;
pub use string::StringConverter;

use crate::client::{HttpInputMessage, HttpOutputMessage};
use crate::media_type::MediaType;
use crate::Error;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// The ordered converter list shared between a template and its in-flight requests.
pub type MessageConverters = Arc<Vec<Arc<dyn HttpMessageConverter>>>;

/// The converters every new template starts with: bytes, strings, forms and JSON values.
pub fn default_converters() -> Vec<Arc<dyn HttpMessageConverter>> {
    vec![
        Arc::new(ByteArrayConverter::new()),
        Arc::new(StringConverter::new()),
        Arc::new(FormConverter::new()),
        Arc::new(JsonConverter::<serde_json::Value>::new()),
    ]
}

/// Runtime identity of a body type.
#[derive(Clone, Copy)]
pub struct BodyType {
    id: TypeId,
    name: &'static str,
}

impl BodyType {
    pub fn of<T: Any>() -> Self {
        BodyType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for BodyType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BodyType {}

impl fmt::Debug for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Reads and writes bodies of some types in some media types.
pub trait HttpMessageConverter: Send + Sync {
    /// Media types this converter handles, most preferred first.
    fn supported_media_types(&self) -> &[MediaType];

    /// Whether a body of `body_type` can be read from `media_type`. `None` means
    /// the media type is unknown.
    fn can_read(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool;

    /// Whether a body of `body_type` can be written as `media_type`. `None`
    /// means any media type.
    fn can_write(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool;

    /// Read a body. The returned box holds a value of `body_type`.
    fn read(
        &self,
        body_type: BodyType,
        message: &dyn HttpInputMessage,
    ) -> Result<Box<dyn Any + Send>, Error>;

    /// Write a body, setting `Content-Type` unless already set.
    fn write(
        &self,
        body: &dyn Any,
        media_type: Option<&MediaType>,
        message: &mut dyn HttpOutputMessage,
    ) -> Result<(), Error>;
}

/// Whether any supported media type includes `media_type`.
pub(crate) fn can_read_media_type(supported: &[MediaType], media_type: Option<&MediaType>) -> bool {
    match media_type {
        None => true,
        Some(media_type) => supported.iter().any(|s| s.includes(media_type)),
    }
}

/// Whether any supported media type is compatible with `media_type`.
pub(crate) fn can_write_media_type(
    supported: &[MediaType],
    media_type: Option<&MediaType>,
) -> bool {
    match media_type {
        None => true,
        Some(m) if *m == MediaType::ALL => true,
        Some(media_type) => supported.iter().any(|s| s.is_compatible_with(media_type)),
    }
}

/// The content type to write: the requested one when concrete, otherwise `default`.
pub(crate) fn content_type_for(
    media_type: Option<&MediaType>,
    default: &MediaType,
) -> MediaType {
    match media_type {
        Some(m) if m.is_concrete() => m.clone(),
        _ => default.clone(),
    }
}

/// Sets content type and length on the message, unless already present, and
/// appends the bytes to its body.
pub(crate) fn write_bytes(
    message: &mut dyn HttpOutputMessage,
    content_type: &MediaType,
    bytes: &[u8],
) -> Result<(), Error> {
    let headers = message.headers_mut();

    if !headers.contains(crate::headers::CONTENT_TYPE) {
        headers.set_content_type(content_type)?;
    }
    if !headers.contains(crate::headers::CONTENT_LENGTH) {
        headers.set_content_length(bytes.len() as i64);
    }

    message.body_mut().extend_from_slice(bytes);

    Ok(())
}

/// The content type of an incoming message, if it has a usable one.
pub(crate) fn input_content_type(message: &dyn HttpInputMessage) -> Option<MediaType> {
    message.headers().content_type().ok().flatten()
}

pub(crate) fn wrong_type(converter: &str, expected: &str) -> Error {
    Error::Conversion(format!(
        "{} can only handle bodies of type [{}]",
        converter, expected
    ))
}
