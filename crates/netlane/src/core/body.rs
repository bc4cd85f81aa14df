//! Turns a [`BodyDescription`] into transport-ready content.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::core::headers::find_header;
use crate::core::multipart;
use crate::data::BodyDescription;
use crate::error::{Error, Result};

/// Where the body bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    Empty,
    Inline(Bytes),
    /// Read by the executor immediately before sending.
    Uri(String),
}

/// Body plus the content headers derived for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBody {
    pub source: BodySource,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

impl PreparedBody {
    pub fn empty() -> Self {
        Self {
            source: BodySource::Empty,
            content_type: None,
            content_encoding: None,
        }
    }

    /// Content-level headers to attach alongside the payload.
    pub fn content_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(content_type) = &self.content_type {
            headers.push(("content-type".to_string(), content_type.clone()));
        }
        if let Some(encoding) = &self.content_encoding {
            headers.push(("content-encoding".to_string(), encoding.clone()));
        }
        headers
    }
}

/// Build the outbound body from its description and the caller's headers.
///
/// Text, base64 and URI bodies need a caller-supplied content type. Multipart
/// bodies default to `multipart/form-data` with a generated boundary.
pub fn build_body(body: &BodyDescription, headers: &[(String, String)]) -> Result<PreparedBody> {
    let content_type = find_header(headers, "content-type")
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let content_encoding = find_header(headers, "content-encoding")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match body {
        BodyDescription::None => Ok(PreparedBody::empty()),
        BodyDescription::Text(text) => {
            let content_type = content_type.ok_or(Error::MissingContentType)?;
            Ok(PreparedBody {
                source: BodySource::Inline(encode_content(
                    Bytes::from(text.clone().into_bytes()),
                    content_encoding,
                )?),
                content_type: Some(content_type.to_string()),
                content_encoding: content_encoding.map(str::to_string),
            })
        }
        BodyDescription::Base64(data) => {
            let content_type = content_type.ok_or(Error::MissingContentType)?;
            let raw = STANDARD
                .decode(data.trim())
                .map_err(|e| Error::InvalidBody(format!("invalid base64 payload: {e}")))?;
            Ok(PreparedBody {
                source: BodySource::Inline(encode_content(Bytes::from(raw), content_encoding)?),
                content_type: Some(content_type.to_string()),
                content_encoding: content_encoding.map(str::to_string),
            })
        }
        BodyDescription::UriRef(uri) => {
            let content_type = content_type.ok_or(Error::MissingContentType)?;
            Ok(PreparedBody {
                source: BodySource::Uri(uri.clone()),
                content_type: Some(content_type.to_string()),
                content_encoding: content_encoding.map(str::to_string),
            })
        }
        BodyDescription::MultipartFields(fields) => {
            let boundary = content_type
                .and_then(multipart::boundary_of)
                .map(str::to_string)
                .unwrap_or_else(multipart::new_boundary);
            Ok(PreparedBody {
                source: BodySource::Inline(multipart::encode(fields, &boundary)),
                content_type: Some(multipart::content_type(content_type, &boundary)),
                content_encoding: None,
            })
        }
    }
}

/// Apply the requested content coding to a payload.
///
/// Only `gzip` transforms the bytes; any other coding is passed through and
/// assumed to be applied by the caller already.
pub fn encode_content(payload: Bytes, encoding: Option<&str>) -> Result<Bytes> {
    match encoding {
        Some(enc) if enc.eq_ignore_ascii_case("gzip") => gzip(&payload)
            .map(Bytes::from)
            .map_err(|e| Error::InvalidBody(format!("gzip encoding failed: {e}"))),
        _ => Ok(payload),
    }
}

fn gzip(payload: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(payload.len() / 2), Compression::default());
    encoder.write_all(payload)?;
    encoder.finish()
}
