use crate::method::HttpMethod;
use crate::Error;
use crate::{AsyncBufRead, AsyncRead};
use futures_util::io::{AsyncBufReadExt, AsyncReadExt};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Size of buffer reading response body into.
const READ_BUF_INIT_SIZE: usize = 16_384;

/// How far to read a response body, given configuration from response headers.
pub(crate) enum LimitRead {
    /// Read with a chunked decoder until the zero sized chunk.
    Chunked,
    /// Body data is limited by a `content-length` header.
    ContentLength(u64),
    /// Read until the connection closes (HTTP/1.0).
    ReadToEnd,
    /// No expected body.
    NoBody,
}

impl LimitRead {
    /// Create an instance from a response head.
    ///
    /// 1. Responses to HEAD, and 1xx, 204 and 304 responses, never have a body.
    /// 2. If header `transfer-encoding: chunked` use chunked decoder regardless of other headers.
    /// 3. If header `content-length: <number>` use a reader limited by length
    /// 4. Otherwise read until the server closes the connection.
    pub fn from_response(method: &HttpMethod, res: &http::Response<()>) -> Self {
        let status = res.status();
        let headers = res.headers();

        let ret = if *method == HttpMethod::HEAD
            || status.is_informational()
            || status == http::StatusCode::NO_CONTENT
            || status == http::StatusCode::NOT_MODIFIED
        {
            LimitRead::NoBody
        } else if is_chunked(headers) {
            // https://tools.ietf.org/html/rfc7230#page-31
            // If a message is received with both a Transfer-Encoding and a
            // Content-Length header field, the Transfer-Encoding overrides the
            // Content-Length.
            LimitRead::Chunked
        } else if let Some(size) = get_as::<u64>(headers, "content-length") {
            LimitRead::ContentLength(size)
        } else {
            // https://tools.ietf.org/html/rfc1945#section-7.2.2
            // Otherwise, the body length is determined by the closing
            // of the connection by the server.
            LimitRead::ReadToEnd
        };

        trace!("LimitRead from response: {:?}", ret);

        ret
    }

    /// Read the entire body.
    pub async fn read_body<S: AsyncBufRead + AsyncRead + Unpin>(
        &self,
        recv: &mut S,
    ) -> Result<Vec<u8>, Error> {
        match self {
            LimitRead::NoBody => Ok(vec![]),
            LimitRead::ContentLength(limit) => read_content_length(recv, *limit).await,
            LimitRead::ReadToEnd => {
                let mut body = Vec::with_capacity(READ_BUF_INIT_SIZE);
                recv.read_to_end(&mut body).await?;
                Ok(body)
            }
            LimitRead::Chunked => read_chunked(recv).await,
        }
    }
}

async fn read_content_length<S: AsyncRead + Unpin>(
    recv: &mut S,
    limit: u64,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::with_capacity((limit as usize).min(READ_BUF_INIT_SIZE));
    let mut buf = vec![0_u8; READ_BUF_INIT_SIZE];
    let mut total = 0_u64;

    while total < limit {
        let max = ((limit - total) as usize).min(buf.len());
        let amount = recv.read(&mut buf[0..max]).await?;

        if amount == 0 {
            // https://tools.ietf.org/html/rfc7230#page-32
            // If the sender closes the connection before the indicated number
            // of octets are received, the recipient MUST consider the message
            // to be incomplete.
            let msg = format!(
                "Partial body received {} bytes and expected {}",
                total, limit
            );
            trace!("{}", msg);
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, msg).into());
        }

        body.extend_from_slice(&buf[0..amount]);
        total += amount as u64;
    }

    Ok(body)
}

async fn read_chunked<S: AsyncBufRead + AsyncRead + Unpin>(recv: &mut S) -> Result<Vec<u8>, Error> {
    let mut body = Vec::with_capacity(READ_BUF_INIT_SIZE);
    let mut line = String::new();

    loop {
        line.clear();
        if recv.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Partial body").into());
        }

        let size = parse_chunk_size(&line)?;
        trace!("Chunk size: {}", size);

        if size == 0 {
            // Skip trailers up to the terminating empty line.
            loop {
                line.clear();
                let amount = recv.read_line(&mut line).await?;
                if amount == 0 || line.trim_end().is_empty() {
                    break;
                }
            }
            return Ok(body);
        }

        // the declared size is untrusted, the body grows only with what arrives
        let amount = (&mut *recv).take(size).read_to_end(&mut body).await? as u64;
        if amount < size {
            let msg = format!("Partial chunk received {} bytes and expected {}", amount, size);
            trace!("{}", msg);
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, msg).into());
        }

        let mut crlf = [0_u8; 2];
        recv.read_exact(&mut crlf).await?;
        if &crlf != b"\r\n" {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "Missing CRLF after chunk",
            )));
        }
    }
}

fn parse_chunk_size(line: &str) -> Result<u64, Error> {
    // chunk extensions follow a ';'
    let hex = line.trim_end().split(';').next().unwrap_or("").trim();

    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unexpected char in chunk size: {:?}", c),
        )));
    }

    u64::from_str_radix(hex, 16).map_err(|e| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Bad chunk size: {}", e),
        ))
    })
}

impl fmt::Debug for LimitRead {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            LimitRead::Chunked => write!(f, "Chunked")?,
            LimitRead::ContentLength(l) => write!(f, "ContentLength({})", l)?,
            LimitRead::ReadToEnd => write!(f, "ReadToEnd")?,
            LimitRead::NoBody => write!(f, "NoBody")?,
        }
        Ok(())
    }
}

fn is_chunked(headers: &http::HeaderMap<http::HeaderValue>) -> bool {
    headers
        .get("transfer-encoding")
        .and_then(|h| h.to_str().ok())
        // https://tools.ietf.org/html/rfc2616#section-4.4
        //
        // If a Transfer-Encoding header field (section 14.41) is present and
        // has any value other than "identity", then the transfer-length is
        // defined by use of the "chunked" transfer-coding
        .map(|h| !h.contains("identity"))
        .unwrap_or(false)
}

fn get_str<'a>(headers: &'a http::HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|v| v.to_str().ok())
}

fn get_as<T: FromStr>(headers: &http::HeaderMap, key: &str) -> Option<T> {
    get_str(headers, key).and_then(|v| v.trim().parse().ok())
}
