use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Caller-assigned identifier correlating a send with its abort and every
/// event emitted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// HTTP method token.
///
/// Any RFC 9110 token is accepted so that extension methods pass through to
/// the transport untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(String);

impl Method {
    pub fn parse(method: &str) -> Result<Self> {
        let method = method.trim();
        if method.is_empty() {
            return Err(Error::Input("method is required".to_string()));
        }
        if !method.bytes().all(is_token_byte) {
            return Err(Error::Input(format!("invalid method: {method}")));
        }
        Ok(Self(method.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// How the response body is delivered back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseMode {
    /// Whole body decoded as UTF-8 text, delivered in one data event.
    BufferedText,
    /// Whole body as raw bytes, delivered base64-encoded in one data event.
    BufferedBinary,
    /// Body delivered as a sequence of text chunks with progress accounting.
    IncrementalText,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::BufferedText => "buffered-text",
            ResponseMode::BufferedBinary => "buffered-binary",
            ResponseMode::IncrementalText => "incremental-text",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buffered-text" => Ok(ResponseMode::BufferedText),
            "buffered-binary" => Ok(ResponseMode::BufferedBinary),
            "incremental-text" => Ok(ResponseMode::IncrementalText),
            other => Err(Error::Input(format!("unsupported response mode: {other}"))),
        }
    }
}

/// Value of a single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// A file-backed part. Not encoded by this crate; skipped when building.
    Uri {
        uri: String,
        content_type: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }
}

/// Tagged description of the outbound request body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyDescription {
    #[default]
    None,
    Text(String),
    /// Raw bytes carried as base64 text across the host boundary.
    Base64(String),
    /// Reference to a local resource, read right before sending.
    UriRef(String),
    MultipartFields(Vec<FormField>),
}

impl BodyDescription {
    pub fn is_none(&self) -> bool {
        matches!(self, BodyDescription::None)
    }
}

/// A validated request, immutable once accepted by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub id: RequestId,
    pub method: Method,
    pub url: Url,
    /// Caller headers in encounter order.
    pub headers: Vec<(String, String)>,
    pub body: BodyDescription,
    pub mode: ResponseMode,
    /// `None` means the request has no deadline of its own.
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(id: impl Into<RequestId>, method: Method, url: Url) -> Self {
        Self {
            id: id.into(),
            method,
            url,
            headers: Vec::new(),
            body: BodyDescription::None,
            mode: ResponseMode::BufferedText,
            timeout: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: BodyDescription) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the deadline in milliseconds; zero or negative clears it.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout = timeout_from_millis(timeout_ms);
        self
    }
}

pub(crate) fn timeout_from_millis(timeout_ms: i64) -> Option<Duration> {
    u64::try_from(timeout_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
