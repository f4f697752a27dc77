// iwhois - WHOIS Transport
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One TCP exchange per query
//!
//! Connect, send the query line terminated by CRLF, read until the server
//! closes the connection, then decode the whole reply at once. The socket is
//! owned by the exchange future, so it is closed on success, on error and
//! when the timeout drops the future.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::WhoisError;
use crate::config::{MAX_RESPONSE_BYTES, TIMEOUT_SECONDS};
use crate::{log_debug, log_warn};

/// A single query as it goes on the wire
#[derive(Debug, Clone, Copy)]
pub struct WhoisRequest<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Query line after quirks, without the CRLF terminator
    pub line: &'a str,
    /// Reply charset; detected from the reply when `None`
    pub encoding: Option<&'static Encoding>,
}

/// Executes one WHOIS exchange and returns the decoded reply
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    async fn execute(&self, request: WhoisRequest<'_>) -> Result<String, WhoisError>;
}

/// Plain TCP transport used in production
#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
    max_response_bytes: usize,
}

impl TcpTransport {
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Self {
        Self {
            timeout,
            max_response_bytes,
        }
    }

    async fn exchange(&self, request: WhoisRequest<'_>) -> Result<Vec<u8>, WhoisError> {
        let mut stream = TcpStream::connect((request.host, request.port)).await?;

        if let Err(e) = stream.set_nodelay(true) {
            log_warn!("Failed to set TCP_NODELAY: {}", e);
        }

        let query = format!("{}\r\n", request.line);
        stream.write_all(query.as_bytes()).await.map_err(classify_io_error)?;
        stream.flush().await.map_err(classify_io_error)?;

        let mut response = Vec::new();
        let mut buffer = [0u8; 8192];
        loop {
            let n = stream.read(&mut buffer).await.map_err(classify_io_error)?;
            if n == 0 {
                break;
            }
            response.extend_from_slice(&buffer[..n]);

            if response.len() >= self.max_response_bytes {
                log_debug!(
                    "Response from {} exceeded {} bytes, truncating",
                    request.host,
                    self.max_response_bytes
                );
                response.truncate(self.max_response_bytes);
                break;
            }
        }

        Ok(response)
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(TIMEOUT_SECONDS), MAX_RESPONSE_BYTES)
    }
}

#[async_trait]
impl WhoisTransport for TcpTransport {
    async fn execute(&self, request: WhoisRequest<'_>) -> Result<String, WhoisError> {
        log_debug!("Querying {}:{} with '{}'", request.host, request.port, request.line);

        let bytes = match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(WhoisError::ConnectionTimeout),
        };

        log_debug!("Received {} bytes from {}:{}", bytes.len(), request.host, request.port);
        Ok(decode_reply(&bytes, request.encoding))
    }
}

/// Errors after the connection is up mean the peer went away abnormally
fn classify_io_error(error: io::Error) -> WhoisError {
    match error.kind() {
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => WhoisError::ConnectionClosedWithError,
        _ => WhoisError::Transport(error),
    }
}

/// Decodes a complete reply, guessing the charset when none is given
pub fn decode_reply(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    let encoding = encoding.unwrap_or_else(|| detect_encoding(bytes));
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        log_debug!("Reply contained bytes invalid in {}", actual.name());
    }
    text.into_owned()
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}
