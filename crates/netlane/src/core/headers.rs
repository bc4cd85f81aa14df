//! Conversions between header pair lists and the merged response map.

use crate::data::ResponseHeaders;

/// Headers that describe the body and are therefore derived from the body
/// description, never copied from the caller's list.
pub const RESERVED_REQUEST_HEADERS: [&str; 3] =
    ["content-type", "content-length", "content-encoding"];

/// Returns `true` if `name` is one of [`RESERVED_REQUEST_HEADERS`], ignoring case.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_REQUEST_HEADERS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Look up a header by name, ignoring case. The last occurrence wins.
pub fn find_header<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Copy caller headers onto an outbound message.
///
/// Reserved names are skipped. For any other name the last value supplied
/// wins; the header keeps the position where it was first seen.
pub fn apply_request_headers(message: &mut Vec<(String, String)>, pairs: &[(String, String)]) {
    for (name, value) in pairs {
        if is_reserved(name) {
            continue;
        }
        set_header(message, name, value);
    }
}

/// Set `name` to `value`, replacing any existing header of the same name.
pub fn set_header(message: &mut Vec<(String, String)>, name: &str, value: &str) {
    match message.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(existing) => existing.1 = value.to_string(),
        None => message.push((name.to_string(), value.to_string())),
    }
}

/// Fold `headers` into `into`, joining repeated names with `", "`.
///
/// Called once with the message-level headers and once with the
/// content-level headers, so content values land after message values.
pub fn merge_response_headers(into: &mut ResponseHeaders, headers: &[(String, String)]) {
    for (name, value) in headers {
        into.entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.clone());
    }
}
