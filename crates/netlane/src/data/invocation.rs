//! Shapes of the host calls that feed the manager.
//!
//! These mirror what the module-dispatch layer hands over: loosely typed,
//! camelCase, everything optional. `core::validate` turns them into a
//! [`RequestSpec`](super::RequestSpec) or rejects them.

use serde::Deserialize;

use super::request::RequestId;

/// A `sendRequest` call as received from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendRequest {
    pub method: Option<String>,
    pub url: Option<String>,
    pub request_id: i64,
    pub headers: Vec<(String, String)>,
    pub data: Option<RequestData>,
    /// `text` or `base64`.
    pub response_type: Option<String>,
    pub incremental_updates: bool,
    /// Milliseconds; zero or negative means no deadline.
    pub timeout: i64,
}

impl SendRequest {
    pub fn id(&self) -> RequestId {
        RequestId(self.request_id)
    }
}

/// Body as described by the host. At most one field is expected to be set;
/// the first present in declaration order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestData {
    pub string: Option<String>,
    pub base64: Option<String>,
    pub uri: Option<String>,
    pub form_data: Option<Vec<FormPart>>,
}

/// One multipart entry from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormPart {
    pub field_name: String,
    pub string: Option<String>,
    pub uri: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_host_call() {
        let call: SendRequest = serde_json::from_str(
            r#"{
                "method": "POST",
                "url": "https://example.com/upload",
                "requestId": 42,
                "headers": [["Content-Type", "text/plain"], ["X-Foo", "1"]],
                "data": { "string": "hello" },
                "responseType": "text",
                "incrementalUpdates": true,
                "timeout": 500
            }"#,
        )
        .unwrap();

        assert_eq!(call.id(), RequestId(42));
        assert_eq!(call.headers.len(), 2);
        assert_eq!(call.data.unwrap().string.as_deref(), Some("hello"));
        assert!(call.incremental_updates);
        assert_eq!(call.timeout, 500);
    }

    #[test]
    fn form_parts_keep_type_field() {
        let data: RequestData = serde_json::from_str(
            r#"{ "formData": [
                { "fieldName": "a", "string": "1" },
                { "fieldName": "f", "uri": "file:///tmp/x", "type": "image/png" }
            ] }"#,
        )
        .unwrap();
        let parts = data.form_data.unwrap();
        assert_eq!(parts[0].string.as_deref(), Some("1"));
        assert_eq!(parts[1].content_type.as_deref(), Some("image/png"));
    }
}
