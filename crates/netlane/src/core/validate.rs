//! Synchronous validation of host calls.
//!
//! Everything rejected here is reported straight back to the caller; no
//! request id is registered and no event is emitted.

use url::Url;

use crate::data::request::timeout_from_millis;
use crate::data::{
    BodyDescription, FormField, FormValue, Method, RequestData, RequestSpec, ResponseMode,
    SendRequest,
};
use crate::error::{Error, Result};

/// Map the host's `responseType` and incremental flag onto a [`ResponseMode`].
///
/// Incremental delivery only exists for text; for `base64` the flag is ignored.
pub fn response_mode(response_type: &str, incremental: bool) -> Result<ResponseMode> {
    match (response_type, incremental) {
        ("text", true) => Ok(ResponseMode::IncrementalText),
        ("text", false) => Ok(ResponseMode::BufferedText),
        ("base64", _) => Ok(ResponseMode::BufferedBinary),
        (other, _) => other.parse(),
    }
}

pub fn parse_url(url: &str) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::Input("url is required".to_string()));
    }
    Url::parse(url).map_err(|e| Error::Input(format!("invalid url '{url}': {e}")))
}

/// Turn the host's body description into a [`BodyDescription`].
pub fn body_description(data: Option<RequestData>) -> BodyDescription {
    let Some(data) = data else {
        return BodyDescription::None;
    };
    if let Some(text) = data.string {
        BodyDescription::Text(text)
    } else if let Some(base64) = data.base64 {
        BodyDescription::Base64(base64)
    } else if let Some(uri) = data.uri {
        BodyDescription::UriRef(uri)
    } else if let Some(parts) = data.form_data {
        BodyDescription::MultipartFields(
            parts
                .into_iter()
                .map(|part| FormField {
                    name: part.field_name,
                    value: match (part.string, part.uri) {
                        (Some(text), _) => FormValue::Text(text),
                        (None, uri) => FormValue::Uri {
                            uri: uri.unwrap_or_default(),
                            content_type: part.content_type,
                        },
                    },
                })
                .collect(),
        )
    } else {
        BodyDescription::None
    }
}

/// Validate a host call and normalise it into a [`RequestSpec`].
pub fn validate(call: SendRequest) -> Result<RequestSpec> {
    let id = call.id();
    let method = Method::parse(call.method.as_deref().unwrap_or_default())?;
    let url = parse_url(call.url.as_deref().unwrap_or_default())?;
    let response_type = call.response_type.as_deref().unwrap_or("text");
    let mode = response_mode(response_type, call.incremental_updates)?;

    Ok(RequestSpec {
        id,
        method,
        url,
        headers: call.headers,
        body: body_description(call.data),
        mode,
        timeout: timeout_from_millis(call.timeout),
    })
}
