#![allow(dead_code)]

use async_std::net::TcpListener;
use async_std::task::JoinHandle;
use futures_util::future::{poll_fn, BoxFuture};
use futures_util::io::{AsyncReadExt, AsyncWriteExt};
use rest_h1::client::ResponseResult;
use rest_h1::http11::poll_for_crlfcrlf;
use rest_h1::{ClientHttpRequest, ClientHttpRequestFactory, ClientHttpResponse};
use rest_h1::{Error, HttpHeaders, HttpMethod, StatusCode, Uri};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

/// Serve one connection with a canned response. Resolves to the received request,
/// head and body.
pub async fn serve_once(response: Vec<u8>) -> Result<(String, JoinHandle<Result<String, Error>>), Error> {
    serve_once_delayed(response, Duration::from_millis(0)).await
}

/// Like `serve_once`, but waits before answering.
pub async fn serve_once_delayed(
    response: Vec<u8>,
    delay: Duration,
) -> Result<(String, JoinHandle<Result<String, Error>>), Error> {
    setup_logger();

    let l = TcpListener::bind("127.0.0.1:0").await?;
    let base = format!("http://127.0.0.1:{}", l.local_addr()?.port());

    let handle = async_std::task::spawn(async move {
        let (mut s, _) = l.accept().await?;

        let mut head = vec![];
        poll_fn(|cx| poll_for_crlfcrlf(cx, &mut head, &mut s)).await?;
        let head = String::from_utf8_lossy(&head).to_string();

        let mut body = vec![0; content_length(&head)];
        s.read_exact(&mut body).await?;

        if delay > Duration::from_millis(0) {
            async_std::task::sleep(delay).await;
        }

        s.write_all(&response).await?;
        s.flush().await?;

        Ok::<_, Error>(format!("{}{}", head, String::from_utf8_lossy(&body)))
    });

    Ok((base, handle))
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|l| {
            let mut split = l.splitn(2, ':');
            let name = split.next()?;
            let value = split.next()?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(0)
}

/// An HTTP/1.1 response with `Content-Length` set from the body.
pub fn response(status_line: &str, headers: &[(&str, &str)], body: &str) -> Vec<u8> {
    let mut res = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        res.push_str(&format!("{}: {}\r\n", name, value));
    }
    res.push_str(&format!("content-length: {}\r\n\r\n{}", body.len(), body));
    res.into_bytes()
}

pub fn setup_logger() {
    static START: Once = Once::new();
    START.call_once(|| {
        let test_log = std::env::var("TEST_LOG")
            .map(|x| x != "0" && x.to_lowercase() != "false")
            .unwrap_or(false);
        let level = if test_log {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Warn)
            .filter_module("rest_h1", level)
            .target(env_logger::Target::Stdout)
            .init();
    });
}

/// A request as seen by `CannedFactory`.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: HttpMethod,
    pub uri: Uri,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

/// Answers every request with the same response, without any network.
#[derive(Clone)]
pub struct CannedFactory {
    status: StatusCode,
    headers: HttpHeaders,
    body: Vec<u8>,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl CannedFactory {
    pub fn new(status: StatusCode, headers: &[(&str, &str)], body: &str) -> Self {
        let mut h = HttpHeaders::new();
        for (name, value) in headers {
            h.add(name, *value);
        }
        CannedFactory {
            status,
            headers: h,
            body: body.as_bytes().to_vec(),
            seen: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl ClientHttpRequestFactory for CannedFactory {
    fn create_request(
        &self,
        uri: &Uri,
        method: &HttpMethod,
    ) -> Result<Box<dyn ClientHttpRequest>, Error> {
        Ok(Box::new(CannedRequest {
            factory: self.clone(),
            seen: SeenRequest {
                method: method.clone(),
                uri: uri.clone(),
                headers: HttpHeaders::new(),
                body: vec![],
            },
        }))
    }
}

struct CannedRequest {
    factory: CannedFactory,
    seen: SeenRequest,
}

impl CannedRequest {
    fn respond(self) -> ResponseResult {
        self.factory.seen.lock().unwrap().push(self.seen);
        Ok(Box::new(CannedResponse {
            status: self.factory.status,
            headers: self.factory.headers.clone(),
            body: self.factory.body.clone(),
        }))
    }
}

impl ClientHttpRequest for CannedRequest {
    fn uri(&self) -> &Uri {
        &self.seen.uri
    }

    fn method(&self) -> &HttpMethod {
        &self.seen.method
    }

    fn headers(&self) -> &HttpHeaders {
        &self.seen.headers
    }

    fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.seen.headers
    }

    fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.seen.body
    }

    fn execute(self: Box<Self>) -> ResponseResult {
        self.respond()
    }

    fn execute_async(self: Box<Self>) -> BoxFuture<'static, ResponseResult> {
        Box::pin(async move { self.respond() })
    }
}

pub struct CannedResponse {
    pub status: StatusCode,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl ClientHttpResponse for CannedResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn status_description(&self) -> &str {
        self.status.canonical_reason().unwrap_or("")
    }

    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}
