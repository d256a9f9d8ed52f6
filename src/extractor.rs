//! Response extractors derive the result of a call from the received response.

use crate::client::ClientHttpResponse;
use crate::converter::{BodyType, MessageConverters};
use crate::entity::HttpResponseMessage;
use crate::headers::HttpHeaders;
use crate::media_type::MediaType;
use crate::method::HttpMethod;
use crate::Error;
use http::{StatusCode, Uri};
use std::any::Any;
use std::marker::PhantomData;

/// Derives a value from a response that passed the error handler.
pub trait ResponseExtractor<T>: Send {
    fn extract_data(&self, response: &dyn ClientHttpResponse) -> Result<T, Error>;
}

/// Whether the response carries a body worth converting.
///
/// 204 and 304 never do, nor does a declared or observed empty body.
pub fn has_message_body(response: &dyn ClientHttpResponse) -> bool {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return false;
    }
    match response.headers().content_length() {
        0 => false,
        -1 => !response.body().is_empty(),
        _ => true,
    }
}

/// Read the body as `T` with the first converter that can.
///
/// A response without content type is read as `application/octet-stream`.
pub fn read_body<T: Any + Send>(
    converters: &MessageConverters,
    response: &dyn ClientHttpResponse,
) -> Result<Option<T>, Error> {
    if !has_message_body(response) {
        return Ok(None);
    }

    let content_type = response
        .headers()
        .content_type()?
        .unwrap_or(MediaType::APPLICATION_OCTET_STREAM);
    let body_type = BodyType::of::<T>();

    for converter in converters.iter() {
        if converter.can_read(body_type, Some(&content_type)) {
            debug!("Reading [{}] as \"{}\"", body_type, content_type);

            let value = converter.read(body_type, &response)?;

            return value.downcast::<T>().map(|v| Some(*v)).map_err(|_| {
                Error::Conversion(format!(
                    "Converter for [{}] produced a body of another type",
                    body_type
                ))
            });
        }
    }

    Err(Error::NoSuitableConverter(format!(
        "Could not extract response: no suitable HttpMessageConverter found for response type [{}] and content type [{}]",
        body_type, content_type
    )))
}

/// Body as `T`, or `None` when there is no body.
pub struct MessageConverterResponseExtractor<T> {
    converters: MessageConverters,
    _type: PhantomData<fn() -> T>,
}

impl<T> MessageConverterResponseExtractor<T> {
    pub fn new(converters: MessageConverters) -> Self {
        MessageConverterResponseExtractor {
            converters,
            _type: PhantomData,
        }
    }
}

impl<T: Any + Send> ResponseExtractor<Option<T>> for MessageConverterResponseExtractor<T> {
    fn extract_data(&self, response: &dyn ClientHttpResponse) -> Result<Option<T>, Error> {
        read_body(&self.converters, response)
    }
}

/// Status, headers and body as `T`.
pub struct HttpMessageResponseExtractor<T> {
    converters: MessageConverters,
    _type: PhantomData<fn() -> T>,
}

impl<T> HttpMessageResponseExtractor<T> {
    pub fn new(converters: MessageConverters) -> Self {
        HttpMessageResponseExtractor {
            converters,
            _type: PhantomData,
        }
    }
}

impl<T: Any + Send> ResponseExtractor<HttpResponseMessage<T>> for HttpMessageResponseExtractor<T> {
    fn extract_data(
        &self,
        response: &dyn ClientHttpResponse,
    ) -> Result<HttpResponseMessage<T>, Error> {
        let body = read_body(&self.converters, response)?;
        Ok(HttpResponseMessage::new(
            body,
            response.headers().clone(),
            response.status(),
            response.status_description(),
        ))
    }
}

/// Status and headers, ignoring any body.
#[derive(Debug, Default)]
pub struct HttpMessageNoBodyResponseExtractor;

impl ResponseExtractor<HttpResponseMessage<()>> for HttpMessageNoBodyResponseExtractor {
    fn extract_data(
        &self,
        response: &dyn ClientHttpResponse,
    ) -> Result<HttpResponseMessage<()>, Error> {
        Ok(HttpResponseMessage::new(
            None,
            response.headers().clone(),
            response.status(),
            response.status_description(),
        ))
    }
}

/// The response headers.
#[derive(Debug, Default)]
pub struct HeadersResponseExtractor;

impl ResponseExtractor<HttpHeaders> for HeadersResponseExtractor {
    fn extract_data(&self, response: &dyn ClientHttpResponse) -> Result<HttpHeaders, Error> {
        Ok(response.headers().clone())
    }
}

/// The `Location` header.
#[derive(Debug, Default)]
pub struct LocationHeaderResponseExtractor;

impl ResponseExtractor<Option<Uri>> for LocationHeaderResponseExtractor {
    fn extract_data(&self, response: &dyn ClientHttpResponse) -> Result<Option<Uri>, Error> {
        response.headers().location()
    }
}

/// The methods of the `Allow` header.
#[derive(Debug, Default)]
pub struct AllowHeaderResponseExtractor;

impl ResponseExtractor<Vec<HttpMethod>> for AllowHeaderResponseExtractor {
    fn extract_data(&self, response: &dyn ClientHttpResponse) -> Result<Vec<HttpMethod>, Error> {
        response.headers().allow()
    }
}

/// Nothing.
#[derive(Debug, Default)]
pub struct NoResponseExtractor;

impl ResponseExtractor<()> for NoResponseExtractor {
    fn extract_data(&self, _response: &dyn ClientHttpResponse) -> Result<(), Error> {
        Ok(())
    }
}
