use crate::client::ClientHttpResponse;
use crate::error::HttpResponseError;
use crate::method::HttpMethod;
use crate::Error;
use http::Uri;

/// Decides whether a response is an error, and turns it into one.
pub trait ResponseErrorHandler: Send + Sync {
    fn has_error(&self, uri: &Uri, method: &HttpMethod, response: &dyn ClientHttpResponse) -> bool;

    /// Called when [`has_error`](ResponseErrorHandler::has_error) is true. Returning
    /// `Ok` lets the response through to the extractor.
    fn handle_error(
        &self,
        uri: &Uri,
        method: &HttpMethod,
        response: &dyn ClientHttpResponse,
    ) -> Result<(), Error>;
}

/// 4xx responses become [`Error::Client`], 5xx become [`Error::Server`].
#[derive(Debug, Clone, Default)]
pub struct DefaultResponseErrorHandler;

impl ResponseErrorHandler for DefaultResponseErrorHandler {
    fn has_error(&self, _uri: &Uri, _method: &HttpMethod, response: &dyn ClientHttpResponse) -> bool {
        let status = response.status();
        status.is_client_error() || status.is_server_error()
    }

    fn handle_error(
        &self,
        uri: &Uri,
        method: &HttpMethod,
        response: &dyn ClientHttpResponse,
    ) -> Result<(), Error> {
        let status = response.status();

        let captured = HttpResponseError::new(
            uri.clone(),
            method.clone(),
            status,
            response.status_description().to_string(),
            response.headers().clone(),
            response.body().to_vec(),
        );

        if status.is_client_error() {
            Err(Error::Client(captured))
        } else if status.is_server_error() {
            Err(Error::Server(captured))
        } else {
            Ok(())
        }
    }
}
