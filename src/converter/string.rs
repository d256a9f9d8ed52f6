use super::{can_read_media_type, can_write_media_type, content_type_for, write_bytes};
use super::{input_content_type, wrong_type, BodyType, HttpMessageConverter};
use crate::client::{HttpInputMessage, HttpOutputMessage};
use crate::media_type::MediaType;
use crate::Error;
use encoding_rs::Encoding;
use std::any::Any;

/// Reads `String` bodies and writes `String` or `&'static str` bodies.
///
/// The charset of the content type decides the encoding, falling back on
/// ISO-8859-1.
#[derive(Debug)]
pub struct StringConverter {
    supported: Vec<MediaType>,
    default_content_type: MediaType,
}

impl StringConverter {
    pub fn new() -> Self {
        let default_content_type = MediaType::TEXT_PLAIN.with_charset("ISO-8859-1");
        StringConverter {
            supported: vec![default_content_type.clone(), MediaType::ALL],
            default_content_type,
        }
    }

    fn encoding_of(media_type: Option<&MediaType>) -> &'static Encoding {
        media_type
            .and_then(|m| m.charset())
            // The ISO-8859-1 label maps to windows-1252 in encoding_rs.
            .unwrap_or(encoding_rs::WINDOWS_1252)
    }
}

impl Default for StringConverter {
    fn default() -> Self {
        StringConverter::new()
    }
}

impl HttpMessageConverter for StringConverter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn can_read(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        body_type.is::<String>() && can_read_media_type(&self.supported, media_type)
    }

    fn can_write(&self, body_type: BodyType, media_type: Option<&MediaType>) -> bool {
        (body_type.is::<String>() || body_type.is::<&'static str>())
            && can_write_media_type(&self.supported, media_type)
    }

    fn read(
        &self,
        _body_type: BodyType,
        message: &dyn HttpInputMessage,
    ) -> Result<Box<dyn Any + Send>, Error> {
        let content_type = input_content_type(message);
        let encoding = StringConverter::encoding_of(content_type.as_ref());

        let (text, _, had_errors) = encoding.decode(message.body());
        if had_errors {
            debug!("Replaced malformed {} sequences in body", encoding.name());
        }

        Ok(Box::new(text.into_owned()))
    }

    fn write(
        &self,
        body: &dyn Any,
        media_type: Option<&MediaType>,
        message: &mut dyn HttpOutputMessage,
    ) -> Result<(), Error> {
        let text: &str = if let Some(v) = body.downcast_ref::<String>() {
            v
        } else if let Some(v) = body.downcast_ref::<&'static str>() {
            v
        } else {
            return Err(wrong_type("StringConverter", "String"));
        };

        let content_type = match message.headers().content_type()? {
            Some(existing) => existing,
            None => content_type_for(media_type, &self.default_content_type),
        };
        let encoding = StringConverter::encoding_of(Some(&content_type));

        let (bytes, _, _) = encoding.encode(text);

        write_bytes(message, &content_type, &bytes)
    }
}
