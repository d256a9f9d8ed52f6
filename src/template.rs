use crate::call::{Exchange, RestCall};
use crate::callback::{AcceptHeaderRequestCallback, HttpEntityRequestCallback, RequestCallback};
use crate::client::ClientHttpRequestFactory;
use crate::converter::{default_converters, BodyType, HttpMessageConverter, MessageConverters};
use crate::entity::{HttpEntity, HttpResponseMessage};
use crate::error_handler::{DefaultResponseErrorHandler, ResponseErrorHandler};
use crate::extractor::{AllowHeaderResponseExtractor, HeadersResponseExtractor};
use crate::extractor::{HttpMessageNoBodyResponseExtractor, HttpMessageResponseExtractor};
use crate::extractor::{LocationHeaderResponseExtractor, MessageConverterResponseExtractor};
use crate::extractor::{NoResponseExtractor, ResponseExtractor};
use crate::factory::DefaultRequestFactory;
use crate::headers::HttpHeaders;
use crate::interceptor::{InterceptingRequestFactory, RequestInterceptor};
use crate::method::HttpMethod;
use crate::uri::{build_uri, UriVariables};
use http::Uri;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Entry point for REST calls.
///
/// A template holds configuration only: base address, message converters,
/// request factory, error handler and interceptors. Each verb method returns a
/// [`RestCall`] that is run blocking, with a completion callback or as a future.
///
/// URL templates may contain `{name}` placeholders, filled from the variables
/// argument. That is either positional values (`["a", "b"]`, `Vec<String>`),
/// named values (a `HashMap`), or `()` for a URL used as is. Relative URLs are
/// resolved against the base address.
///
/// ```no_run
/// # use rest_h1::RestTemplate;
/// let rest = RestTemplate::new().with_base_address("http://localhost:8080/api/".parse()?);
///
/// let name: Option<String> = rest
///     .get_for_object::<String>("user/{id}/name", ["5"])
///     .execute()?;
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// Configuration is shared with calls in flight, so mutate a template before
/// using it concurrently. Cloning is cheap.
#[derive(Clone)]
pub struct RestTemplate {
    base_address: Option<Uri>,
    converters: MessageConverters,
    request_factory: Arc<dyn ClientHttpRequestFactory>,
    error_handler: Arc<dyn ResponseErrorHandler>,
    interceptors: Vec<RequestInterceptor>,
}

impl RestTemplate {
    /// A template with the default converters, request factory and error handler.
    pub fn new() -> Self {
        RestTemplate {
            base_address: None,
            converters: Arc::new(default_converters()),
            request_factory: Arc::new(DefaultRequestFactory::new()),
            error_handler: Arc::new(DefaultResponseErrorHandler),
            interceptors: vec![],
        }
    }

    pub fn with_base_address(mut self, base_address: Uri) -> Self {
        self.base_address = Some(base_address);
        self
    }

    pub fn base_address(&self) -> Option<&Uri> {
        self.base_address.as_ref()
    }

    pub fn set_base_address(&mut self, base_address: Option<Uri>) {
        self.base_address = base_address;
    }

    pub fn message_converters(&self) -> &[Arc<dyn HttpMessageConverter>] {
        &self.converters
    }

    /// Converters are tried in order, the first one that can wins.
    pub fn message_converters_mut(&mut self) -> &mut Vec<Arc<dyn HttpMessageConverter>> {
        Arc::make_mut(&mut self.converters)
    }

    pub fn set_message_converters(&mut self, converters: Vec<Arc<dyn HttpMessageConverter>>) {
        self.converters = Arc::new(converters);
    }

    pub fn request_factory(&self) -> &Arc<dyn ClientHttpRequestFactory> {
        &self.request_factory
    }

    pub fn set_request_factory<F: ClientHttpRequestFactory + 'static>(&mut self, factory: F) {
        self.request_factory = Arc::new(factory);
    }

    pub fn error_handler(&self) -> &Arc<dyn ResponseErrorHandler> {
        &self.error_handler
    }

    pub fn set_error_handler<H: ResponseErrorHandler + 'static>(&mut self, handler: H) {
        self.error_handler = Arc::new(handler);
    }

    pub fn interceptors(&self) -> &[RequestInterceptor] {
        &self.interceptors
    }

    pub fn interceptors_mut(&mut self) -> &mut Vec<RequestInterceptor> {
        &mut self.interceptors
    }

    pub fn add_interceptor(&mut self, interceptor: RequestInterceptor) {
        self.interceptors.push(interceptor);
    }

    // GET

    /// GET the body of `url` as `T`. `None` when the response has no body.
    pub fn get_for_object<T: Any + Send>(
        &self,
        url: &str,
        vars: impl Into<UriVariables>,
    ) -> RestCall<Option<T>> {
        self.call(
            url,
            HttpMethod::GET,
            vars.into(),
            Some(self.accept_callback::<T>()),
            MessageConverterResponseExtractor::<T>::new(self.converters.clone()),
        )
    }

    /// GET `url`, keeping status and headers along with the body as `T`.
    pub fn get_for_message<T: Any + Send>(
        &self,
        url: &str,
        vars: impl Into<UriVariables>,
    ) -> RestCall<HttpResponseMessage<T>> {
        self.call(
            url,
            HttpMethod::GET,
            vars.into(),
            Some(self.accept_callback::<T>()),
            HttpMessageResponseExtractor::<T>::new(self.converters.clone()),
        )
    }

    // HEAD

    pub fn head_for_headers(
        &self,
        url: &str,
        vars: impl Into<UriVariables>,
    ) -> RestCall<HttpHeaders> {
        self.call(
            url,
            HttpMethod::HEAD,
            vars.into(),
            None,
            HeadersResponseExtractor,
        )
    }

    // POST

    /// POST `request` and return the `Location` of the created resource.
    pub fn post_for_location<B: Any + Send>(
        &self,
        url: &str,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<Option<Uri>> {
        self.call(
            url,
            HttpMethod::POST,
            vars.into(),
            Some(self.entity_callback(request, None)),
            LocationHeaderResponseExtractor,
        )
    }

    /// POST `request` and read the response body as `T`.
    pub fn post_for_object<T: Any + Send, B: Any + Send>(
        &self,
        url: &str,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<Option<T>> {
        self.call(
            url,
            HttpMethod::POST,
            vars.into(),
            Some(self.entity_callback(request, Some(BodyType::of::<T>()))),
            MessageConverterResponseExtractor::<T>::new(self.converters.clone()),
        )
    }

    pub fn post_for_message<T: Any + Send, B: Any + Send>(
        &self,
        url: &str,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<HttpResponseMessage<T>> {
        self.call(
            url,
            HttpMethod::POST,
            vars.into(),
            Some(self.entity_callback(request, Some(BodyType::of::<T>()))),
            HttpMessageResponseExtractor::<T>::new(self.converters.clone()),
        )
    }

    pub fn post_for_message_no_body<B: Any + Send>(
        &self,
        url: &str,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<HttpResponseMessage<()>> {
        self.call(
            url,
            HttpMethod::POST,
            vars.into(),
            Some(self.entity_callback(request, None)),
            HttpMessageNoBodyResponseExtractor,
        )
    }

    // PUT

    pub fn put<B: Any + Send>(
        &self,
        url: &str,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<()> {
        self.call(
            url,
            HttpMethod::PUT,
            vars.into(),
            Some(self.entity_callback(request, None)),
            NoResponseExtractor,
        )
    }

    // DELETE

    pub fn delete(&self, url: &str, vars: impl Into<UriVariables>) -> RestCall<()> {
        self.call(
            url,
            HttpMethod::DELETE,
            vars.into(),
            None,
            NoResponseExtractor,
        )
    }

    // OPTIONS

    /// The methods listed in the `Allow` header of an OPTIONS response.
    pub fn options_for_allow(
        &self,
        url: &str,
        vars: impl Into<UriVariables>,
    ) -> RestCall<Vec<HttpMethod>> {
        self.call(
            url,
            HttpMethod::OPTIONS,
            vars.into(),
            None,
            AllowHeaderResponseExtractor,
        )
    }

    // exchange

    /// Send `request` with any method, and read the response body as `T`.
    pub fn exchange<T: Any + Send, B: Any + Send>(
        &self,
        url: &str,
        method: HttpMethod,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<HttpResponseMessage<T>> {
        self.call(
            url,
            method,
            vars.into(),
            Some(self.entity_callback(request, Some(BodyType::of::<T>()))),
            HttpMessageResponseExtractor::<T>::new(self.converters.clone()),
        )
    }

    pub fn exchange_no_body<B: Any + Send>(
        &self,
        url: &str,
        method: HttpMethod,
        request: HttpEntity<B>,
        vars: impl Into<UriVariables>,
    ) -> RestCall<HttpResponseMessage<()>> {
        self.call(
            url,
            method,
            vars.into(),
            Some(self.entity_callback(request, None)),
            HttpMessageNoBodyResponseExtractor,
        )
    }

    // general execution

    /// The most general call: any method, any request callback, any extractor.
    pub fn execute<T: Send + 'static>(
        &self,
        url: &str,
        method: HttpMethod,
        vars: impl Into<UriVariables>,
        callback: Option<Box<dyn RequestCallback>>,
        extractor: impl ResponseExtractor<T> + 'static,
    ) -> RestCall<T> {
        self.call(url, method, vars.into(), callback, extractor)
    }

    fn call<T: Send + 'static>(
        &self,
        url: &str,
        method: HttpMethod,
        vars: UriVariables,
        callback: Option<Box<dyn RequestCallback>>,
        extractor: impl ResponseExtractor<T> + 'static,
    ) -> RestCall<T> {
        let uri = build_uri(self.base_address.as_ref(), url, &vars);

        if let Err(e) = &uri {
            debug!("Invalid uri for {} request '{}': {}", method, url, e);
        }

        RestCall::new(
            method,
            uri,
            Exchange {
                factory: self.effective_factory(),
                error_handler: self.error_handler.clone(),
                callback,
                extractor: Box::new(extractor),
            },
        )
    }

    fn effective_factory(&self) -> Arc<dyn ClientHttpRequestFactory> {
        if self.interceptors.is_empty() {
            self.request_factory.clone()
        } else {
            Arc::new(InterceptingRequestFactory::new(
                self.request_factory.clone(),
                self.interceptors.clone(),
            ))
        }
    }

    fn accept_callback<T: Any>(&self) -> Box<dyn RequestCallback> {
        Box::new(AcceptHeaderRequestCallback::new(
            Some(BodyType::of::<T>()),
            self.converters.clone(),
        ))
    }

    fn entity_callback<B: Any + Send>(
        &self,
        request: HttpEntity<B>,
        response_type: Option<BodyType>,
    ) -> Box<dyn RequestCallback> {
        Box::new(HttpEntityRequestCallback::new(
            request,
            response_type,
            self.converters.clone(),
        ))
    }
}

impl Default for RestTemplate {
    fn default() -> Self {
        RestTemplate::new()
    }
}

impl fmt::Debug for RestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestTemplate")
            .field("base_address", &self.base_address)
            .field("converters", &self.converters.len())
            .field("interceptors", &self.interceptors)
            .finish()
    }
}
