//! Request callbacks prepare an outgoing request before it is executed.

use crate::client::ClientHttpRequest;
use crate::converter::{BodyType, MessageConverters};
use crate::entity::HttpEntity;
use crate::media_type::MediaType;
use crate::Error;
use std::any::Any;

/// Prepares a request: headers, body or both.
pub trait RequestCallback: Send {
    fn do_with_request(&self, request: &mut dyn ClientHttpRequest) -> Result<(), Error>;
}

/// Sets `Accept` to the media types readable into the response type.
pub struct AcceptHeaderRequestCallback {
    response_type: Option<BodyType>,
    converters: MessageConverters,
}

impl AcceptHeaderRequestCallback {
    /// A `None` response type leaves the request untouched.
    pub fn new(response_type: Option<BodyType>, converters: MessageConverters) -> Self {
        AcceptHeaderRequestCallback {
            response_type,
            converters,
        }
    }

    fn acceptable_media_types(&self, response_type: BodyType) -> Vec<MediaType> {
        let mut all: Vec<MediaType> = vec![];

        for converter in self.converters.iter() {
            if !converter.can_read(response_type, None) {
                continue;
            }
            for supported in converter.supported_media_types() {
                // Accept does not carry charsets.
                let media_type = if supported.charset().is_some() {
                    MediaType::new(supported.type_(), supported.subtype())
                } else {
                    supported.clone()
                };
                if !all.contains(&media_type) {
                    all.push(media_type);
                }
            }
        }

        MediaType::sort_by_specificity(&mut all);

        all
    }
}

impl RequestCallback for AcceptHeaderRequestCallback {
    fn do_with_request(&self, request: &mut dyn ClientHttpRequest) -> Result<(), Error> {
        if let Some(response_type) = self.response_type {
            let accept = self.acceptable_media_types(response_type);
            if !accept.is_empty() {
                trace!("Setting request Accept header to {:?}", accept);
                request.headers_mut().set_accept(&accept);
            }
        }
        Ok(())
    }
}

/// Copies the entity headers onto the request and writes its body with the first
/// converter that can.
pub struct HttpEntityRequestCallback<B> {
    accept: AcceptHeaderRequestCallback,
    entity: HttpEntity<B>,
}

impl<B> HttpEntityRequestCallback<B>
where
    B: Any + Send,
{
    pub fn new(
        entity: HttpEntity<B>,
        response_type: Option<BodyType>,
        converters: MessageConverters,
    ) -> Self {
        HttpEntityRequestCallback {
            accept: AcceptHeaderRequestCallback::new(response_type, converters),
            entity,
        }
    }
}

impl<B> RequestCallback for HttpEntityRequestCallback<B>
where
    B: Any + Send,
{
    fn do_with_request(&self, mut request: &mut dyn ClientHttpRequest) -> Result<(), Error> {
        self.accept.do_with_request(request)?;

        let entity_headers = self.entity.headers();
        for name in entity_headers.names() {
            request.headers_mut().remove(name);
            for value in entity_headers.values(name) {
                request.headers_mut().add(name, value.clone());
            }
        }

        let body = match self.entity.body() {
            Some(body) => body,
            None => return Ok(()),
        };

        let body_type = BodyType::of::<B>();
        let content_type = entity_headers.content_type()?;

        for converter in self.accept.converters.iter() {
            if converter.can_write(body_type, content_type.as_ref()) {
                match &content_type {
                    Some(ct) => debug!("Writing [{}] as \"{}\"", body_type, ct),
                    None => debug!("Writing [{}]", body_type),
                }
                return converter.write(body, content_type.as_ref(), &mut request);
            }
        }

        let mut msg = format!(
            "Could not write request: no suitable HttpMessageConverter found for request type [{}]",
            body_type
        );
        if let Some(ct) = &content_type {
            msg.push_str(&format!(" and content type [{}]", ct));
        }

        Err(Error::NoSuitableConverter(msg))
    }
}
