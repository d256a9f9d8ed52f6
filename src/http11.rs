use crate::AsyncRead;
use crate::Error;
use futures_util::ready;
use http::header::{HeaderName, HeaderValue};
use std::io;
use std::io::Write;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A parsed response head along with the reason phrase, which `http::Response`
/// does not keep.
#[derive(Debug)]
pub struct ResponseHead {
    pub response: http::Response<()>,
    pub reason: String,
}

/// Write an http/1.1 request head to a buffer.
#[allow(clippy::write_with_newline)]
pub fn write_http11_req(req: &http::Request<()>, w: &mut Vec<u8>) -> Result<(), Error> {
    // Path and query
    let pq = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let ver = match req.version() {
        http::Version::HTTP_10 => "1.0",
        http::Version::HTTP_11 => "1.1",
        v => {
            return Err(Error::Unsupported(format!("http version: {:?}", v)));
        }
    };

    write!(w, "{} {} HTTP/{}\r\n", req.method(), pq, ver)?;

    if !req.headers().contains_key(http::header::HOST) {
        let default_port: u16 = match req.uri().scheme_str() {
            Some("https") => 443,
            _ => 80,
        };
        // fall back on uri host
        if let Some(h) = req.uri().host() {
            write!(w, "host: {}", h)?;
            match req.uri().port_u16() {
                Some(p) if p != default_port => write!(w, ":{}", p)?,
                _ => {}
            }
            write!(w, "\r\n")?;
        }
    }

    // the rest of the headers.
    for (name, value) in req.headers() {
        write!(w, "{}: ", name)?;
        w.write_all(value.as_bytes())?;
        write!(w, "\r\n")?;
    }
    write!(w, "\r\n")?;

    debug!("write_http11_req: {:?}", String::from_utf8_lossy(&w[..]));

    Ok(())
}

fn version_of(v: Option<u8>) -> http::Version {
    match v {
        Some(0) => http::Version::HTTP_10,
        _ => http::Version::HTTP_11,
    }
}

/// Attempt to parse an http/1.1 response.
pub fn try_parse_res(buf: &[u8]) -> Result<Option<(ResponseHead, usize)>, Error> {
    trace!("try_parse_res: {:?}", String::from_utf8_lossy(buf));

    let mut headers = [httparse::EMPTY_HEADER; 128];
    let mut parser = httparse::Response::new(&mut headers);

    let status = parser.parse(&buf)?;

    let len = match status {
        httparse::Status::Partial => return Ok(None),
        httparse::Status::Complete(len) => len,
    };

    let mut bld = http::Response::builder().version(version_of(parser.version));

    if let Some(code) = parser.code {
        bld = bld.status(code);
    }

    for head in parser.headers.iter() {
        let name = HeaderName::from_bytes(head.name.as_bytes());
        let value = HeaderValue::from_bytes(head.value);
        match (name, value) {
            (Ok(name), Ok(value)) => bld = bld.header(name, value),
            (Err(e), _) => {
                debug!("Dropping bad header name: {}", e);
            }
            (Ok(name), Err(e)) => {
                debug!("Dropping bad header value ({}): {}", name, e);
            }
        }
    }

    let response = bld.body(())?;
    let reason = parser.reason.unwrap_or("").to_string();

    debug!("try_parse_res success: {:?} {:?}", response, reason);

    Ok(Some((ResponseHead { response, reason }, len)))
}

/// Largest head `poll_for_crlfcrlf` accepts before giving up.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Helper to poll for a response head.
///
/// It looks out for \r\n\r\n, which indicates the end of the headers and body begins.
/// Reads one byte at a time so nothing of the body is consumed. Fails with
/// `InvalidData` once the head grows past [`MAX_HEAD_SIZE`].
pub fn poll_for_crlfcrlf<S>(
    cx: &mut Context<'_>,
    buf: &mut Vec<u8>,
    io: &mut S,
) -> Poll<io::Result<()>>
where
    S: AsyncRead + Unpin,
{
    const END_OF_HEADER: &[u8] = &[b'\r', b'\n', b'\r', b'\n'];
    let mut end_index = 0;
    let mut buf_index = 0;
    let mut one = [0_u8; 1];

    // fix so end_index is where it needs to be
    while buf_index < buf.len() && end_index < END_OF_HEADER.len() {
        if buf[buf_index] == END_OF_HEADER[end_index] {
            end_index += 1;
        } else if end_index > 0 {
            end_index = if buf[buf_index] == END_OF_HEADER[0] { 1 } else { 0 };
        }
        buf_index += 1;
    }

    if end_index == END_OF_HEADER.len() {
        return Ok(()).into();
    }

    loop {
        if buf_index == buf.len() {
            // read one more char
            let amount = ready!(Pin::new(&mut *io).poll_read(cx, &mut one[..]))?;
            if amount == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "EOF before complete http11 header",
                ))
                .into();
            }
            if buf.len() >= MAX_HEAD_SIZE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("http11 header exceeds {} bytes", MAX_HEAD_SIZE),
                ))
                .into();
            }
            buf.push(one[0]);
        }

        if buf[buf_index] == END_OF_HEADER[end_index] {
            end_index += 1;
        } else if end_index > 0 {
            end_index = if buf[buf_index] == END_OF_HEADER[0] { 1 } else { 0 };
        }

        buf_index += 1;

        if end_index == END_OF_HEADER.len() {
            // we found the end of header sequence
            break;
        }
    }

    Ok(()).into()
}
