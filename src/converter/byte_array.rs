use super::{can_read_media_type, can_write_media_type, content_type_for, write_bytes};
use super::{wrong_type, BodyType, HttpMessageConverter};
use crate::client::{HttpInputMessage, HttpOutputMessage};
use crate::media_type::MediaType;
use crate::Error;
use std::any::Any;

/// Reads and writes `Vec<u8>` bodies of any media type.
///
/// Writes `application/octet-stream` unless told otherwise.
#[derive(Debug)]
pub struct ByteArrayConverter {
    supported: Vec<MediaType>,
}

impl ByteArrayConverter {
    pub fn new() -> Self {
        ByteArrayConverter {
            supported: vec![MediaType::APPLICATION_OCTET_STREAM, MediaType::ALL],
        }
    }
}

impl Default for ByteArrayConverter {
    fn default() -> Self {
        ByteArrayConverter::new()
    }
}

impl HttpMessageConverter for ByteArrayConverter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn can_read(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        body_type.is::<Vec<u8>>() && can_read_media_type(&self.supported, media_type)
    }

    fn can_write(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        (body_type.is::<Vec<u8>>() || body_type.is::<&'static [u8]>())
            && can_write_media_type(&self.supported, media_type)
    }

    fn read(
        &self,
        _body_type: BodyType,
        message: &dyn HttpInputMessage,
    ) -> Result<Box<dyn Any + Send>, Error> {
        Ok(Box::new(message.body().to_vec()))
    }

    fn write(
        &self,
        body: &dyn Any,
        media_type: Option<&MediaType>,
        message: &mut dyn HttpOutputMessage,
    ) -> Result<(), Error> {
        let bytes: &[u8] = if let Some(v) = body.downcast_ref::<Vec<u8>>() {
            v
        } else if let Some(v) = body.downcast_ref::<&'static [u8]>() {
            v
        } else {
            return Err(wrong_type("ByteArrayConverter", "Vec<u8>"));
        };

        let content_type = content_type_for(media_type, &MediaType::APPLICATION_OCTET_STREAM);

        write_bytes(message, &content_type, bytes)
    }
}
