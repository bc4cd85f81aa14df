use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use url::Url;

use crate::data::Method;

/// A boxed stream type for HTTP response bodies.
///
/// The stream yields `Result<Bytes, E>` where E is the error type of the transport.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Outbound request handed to a [`Transport`].
///
/// Consumed by [`Transport::send`], so the message is released as soon as
/// the transport is done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    /// Message-level headers. Never contains the reserved content headers.
    pub headers: Vec<(String, String)>,
    /// Headers describing `body` (`content-type`, `content-encoding`).
    pub content_headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

/// Status line, headers and an unread body.
pub struct TransportResponse<E> {
    pub status: u16,
    /// Final request URI after any redirects the transport followed.
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Headers the transport classifies as describing the content.
    pub content_headers: Vec<(String, String)>,
    /// Declared body length, if any.
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Bytes, E>>,
}

impl<E> std::fmt::Debug for TransportResponse<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("content_headers", &self.content_headers)
            .field("content_length", &self.content_length)
            .field("body", &"{ ... }")
            .finish()
    }
}

/// Asynchronous HTTP transport abstraction.
///
/// Implementations own wire parsing, TLS, connection reuse and redirect
/// policy. The request manager only needs a response head followed by a
/// body stream.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: Production implementation using `reqwest`
/// - Scripted implementations for testing
pub trait Transport: Send + Sync {
    /// Error type for transport operations.
    type Error: std::error::Error + Send + 'static;

    /// Send `request` and resolve once the response head has arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered (DNS failure,
    /// connection error, TLS failure, ...). HTTP error statuses are not
    /// errors; they are returned as ordinary responses.
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<TransportResponse<Self::Error>, Self::Error>> + Send;
}

/// Headers that describe the entity rather than the message.
pub fn is_content_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("content-") || matches!(name.as_str(), "expires" | "last-modified" | "allow")
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::TryStreamExt;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    pub enum ReqwestError {
        #[error(transparent)]
        Request(#[from] reqwest::Error),

        #[error("invalid method: {0}")]
        InvalidMethod(String),
    }

    /// Production transport implementation using reqwest.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Create a new ReqwestTransport with default configuration.
        pub fn new() -> Self {
            Self::default()
        }

        /// Wrap an existing client, keeping its redirect and TLS settings.
        pub fn from_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl Transport for ReqwestTransport {
        type Error = ReqwestError;

        async fn send(
            &self,
            request: OutboundRequest,
        ) -> Result<TransportResponse<Self::Error>, Self::Error> {
            let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|_| ReqwestError::InvalidMethod(request.method.to_string()))?;
            let mut builder = self.client.request(method, request.url);

            for (name, value) in request.headers.iter().chain(&request.content_headers) {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;

            let mut headers = Vec::new();
            let mut content_headers = Vec::new();
            for (name, value) in response.headers() {
                let pair = (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                );
                if is_content_header(name.as_str()) {
                    content_headers.push(pair);
                } else {
                    headers.push(pair);
                }
            }

            Ok(TransportResponse {
                status: response.status().as_u16(),
                url: response.url().clone(),
                headers,
                content_headers,
                content_length: response.content_length(),
                body: Box::pin(response.bytes_stream().map_err(ReqwestError::from)),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ReqwestError, ReqwestTransport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_content_headers() {
        assert!(is_content_header("Content-Type"));
        assert!(is_content_header("content-length"));
        assert!(is_content_header("Last-Modified"));
        assert!(is_content_header("expires"));
        assert!(!is_content_header("Set-Cookie"));
        assert!(!is_content_header("x-content"));
    }
}
