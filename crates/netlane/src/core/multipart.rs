//! `multipart/form-data` encoding for text fields.

use bytes::{BufMut, Bytes, BytesMut};

use crate::data::{FormField, FormValue};

pub const DEFAULT_MULTIPART_TYPE: &str = "multipart/form-data";

/// Fresh boundary token, unique enough to never collide with field data.
pub fn new_boundary() -> String {
    format!("netlane-{}", uuid::Uuid::new_v4().simple())
}

/// Content type for a multipart body.
///
/// Falls back to `multipart/form-data` and appends the boundary parameter
/// unless the supplied type already declares one.
pub fn content_type(supplied: Option<&str>, boundary: &str) -> String {
    let base = supplied
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_MULTIPART_TYPE);
    if boundary_of(base).is_some() {
        base.to_string()
    } else {
        format!("{base}; boundary={boundary}")
    }
}

/// Boundary parameter declared by a content type, if any.
pub fn boundary_of(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Encode the text fields of `fields` as one multipart payload.
///
/// Non-text values are skipped.
pub fn encode(fields: &[FormField], boundary: &str) -> Bytes {
    let mut out = BytesMut::new();
    for field in fields {
        let FormValue::Text(value) = &field.value else {
            tracing::warn!(field = %field.name, "skipping non-text form field");
            continue;
        };
        out.put_slice(b"--");
        out.put_slice(boundary.as_bytes());
        out.put_slice(b"\r\nContent-Disposition: form-data; name=\"");
        out.put_slice(escape_name(&field.name).as_bytes());
        out.put_slice(b"\"\r\n\r\n");
        out.put_slice(value.as_bytes());
        out.put_slice(b"\r\n");
    }
    out.put_slice(b"--");
    out.put_slice(boundary.as_bytes());
    out.put_slice(b"--\r\n");
    out.freeze()
}

fn escape_name(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_fields_in_order() {
        let fields = vec![FormField::text("a", "1"), FormField::text("b", "two")];
        let body = encode(&fields, "XYZ");
        let expected = "--XYZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
                        --XYZ\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\ntwo\r\n\
                        --XYZ--\r\n";
        assert_eq!(body, Bytes::from(expected));
    }

    #[test]
    fn skips_file_parts() {
        let fields = vec![
            FormField {
                name: "photo".to_string(),
                value: FormValue::Uri {
                    uri: "file:///tmp/p.png".to_string(),
                    content_type: Some("image/png".to_string()),
                },
            },
            FormField::text("caption", "hi"),
        ];
        let body = String::from_utf8(encode(&fields, "B").to_vec()).unwrap();
        assert!(!body.contains("photo"));
        assert!(body.contains("name=\"caption\""));
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let body = encode(&[FormField::text("a\"b", "v")], "B");
        assert!(String::from_utf8_lossy(&body).contains("name=\"a%22b\""));
    }

    #[test]
    fn content_type_gets_boundary() {
        assert_eq!(content_type(None, "B"), "multipart/form-data; boundary=B");
        assert_eq!(
            content_type(Some("multipart/mixed"), "B"),
            "multipart/mixed; boundary=B"
        );
        assert_eq!(
            content_type(Some("multipart/form-data; boundary=own"), "B"),
            "multipart/form-data; boundary=own"
        );
    }

    #[test]
    fn reads_declared_boundary() {
        assert_eq!(boundary_of("multipart/form-data; boundary=abc"), Some("abc"));
        assert_eq!(boundary_of("multipart/form-data; Boundary=\"q r\""), Some("q r"));
        assert_eq!(boundary_of("multipart/form-data"), None);
    }

    #[test]
    fn boundaries_differ() {
        assert_ne!(new_boundary(), new_boundary());
    }
}
