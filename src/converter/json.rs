use super::{can_read_media_type, can_write_media_type, content_type_for, write_bytes};
use super::{wrong_type, BodyType, HttpMessageConverter};
use crate::client::{HttpInputMessage, HttpOutputMessage};
use crate::media_type::MediaType;
use crate::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::marker::PhantomData;

/// Reads and writes `T` as JSON via `serde_json`.
///
/// One converter handles one type. The default template registers
/// `JsonConverter<serde_json::Value>`; register more for your own types:
///
/// ```
/// # use rest_h1::{JsonConverter, RestTemplate};
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// let mut rest = RestTemplate::new();
/// rest.message_converters_mut().push(std::sync::Arc::new(JsonConverter::<User>::new()));
/// ```
pub struct JsonConverter<T = serde_json::Value> {
    supported: Vec<MediaType>,
    _type: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    pub fn new() -> Self {
        JsonConverter {
            supported: vec![MediaType::APPLICATION_JSON, MediaType::APPLICATION_WILDCARD_JSON],
            _type: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        JsonConverter::new()
    }
}

impl<T> std::fmt::Debug for JsonConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T> HttpMessageConverter for JsonConverter<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn can_read(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        body_type.is::<T>() && can_read_media_type(&self.supported, media_type)
    }

    fn can_write(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        body_type.is::<T>() && can_write_media_type(&self.supported, media_type)
    }

    fn read(
        &self,
        _body_type: BodyType,
        message: &dyn HttpInputMessage,
    ) -> Result<Box<dyn Any + Send>, Error> {
        // RFC 8259: JSON exchanged between systems is UTF-8.
        let value: T = serde_json::from_slice(message.body())?;
        Ok(Box::new(value))
    }

    fn write(
        &self,
        body: &dyn Any,
        media_type: Option<&MediaType>,
        message: &mut dyn HttpOutputMessage,
    ) -> Result<(), Error> {
        let value = body
            .downcast_ref::<T>()
            .ok_or_else(|| wrong_type("JsonConverter", std::any::type_name::<T>()))?;

        let bytes = serde_json::to_vec(value)?;
        let content_type = content_type_for(media_type, &MediaType::APPLICATION_JSON);

        write_bytes(message, &content_type, &bytes)
    }
}
