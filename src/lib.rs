#![warn(clippy::all)]

//! A typed REST client over HTTP/1.1.
//!
//! [`RestTemplate`] turns calls like "GET this URL as a `String`" into HTTP
//! exchanges. Bodies are converted to and from bytes by pluggable
//! [message converters](converter), chosen by the `Content-Type` and `Accept`
//! headers.
//!
//! # Execution
//!
//! Every verb method returns a [`RestCall`]. The same call can be run
//!
//! * blocking, with [`RestCall::execute`],
//! * on the `async-std` executor with a completion callback, with
//!   [`RestCall::execute_async`], or
//! * as a future, with [`RestCall::execute_task`].
//!
//! All of them share request preparation, error handling and result
//! extraction, and report errors the same way.
//!
//! ```no_run
//! use rest_h1::{HttpEntity, RestTemplate};
//!
//! let rest = RestTemplate::new();
//!
//! // blocking
//! let body: Option<String> = rest
//!     .get_for_object::<String>("http://localhost:8080/user/{id}", ["5"])
//!     .execute()?;
//!
//! // as a future
//! async_std::task::block_on(async {
//!     let location = rest
//!         .post_for_location("http://localhost:8080/user", HttpEntity::new("John".to_string()), ())
//!         .execute_task(None)?
//!         .await?;
//!     println!("Created {:?}", location);
//!     Ok::<_, rest_h1::Error>(())
//! })?;
//! # Ok::<_, rest_h1::Error>(())
//! ```
//!
//! # Out of scope
//!
//! * TLS, only plain `http` URIs are handled by the default request factory.
//! * Connection pooling, every request opens a new connection.
//! * Following redirects.
//! * `Content-Encoding` compression.
//!
//! Any of these can be had with another [`ClientHttpRequestFactory`].

#[macro_use]
extern crate log;

mod call;
mod cancel;
mod entity;
mod error;
mod factory;
mod limit;
mod method;
mod template;

#[doc(hidden)]
pub mod http11;

pub(crate) use futures_io::{AsyncBufRead, AsyncRead};

pub mod callback;
pub mod client;
pub mod converter;
pub mod error_handler;
pub mod extractor;
pub mod headers;
pub mod interceptor;
pub mod media_type;
pub mod uri;

pub use call::{Completion, RestCall, RestTask};
pub use cancel::{CancellationToken, RestOperationCanceler};
pub use client::{ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse};
pub use converter::{ByteArrayConverter, FormConverter, FormData, HttpMessageConverter};
pub use converter::{JsonConverter, StringConverter};
pub use entity::{HttpEntity, HttpResponseMessage};
pub use error::{Error, HttpResponseError};
pub use factory::DefaultRequestFactory;
pub use headers::HttpHeaders;
pub use interceptor::{BasicAuthInterceptor, RequestInterceptor};
pub use media_type::MediaType;
pub use method::HttpMethod;
pub use template::RestTemplate;
pub use uri::UriVariables;

pub use http::{StatusCode, Uri};
