//! Pure transformations for request lifecycle management.
//!
//! Header translation, body building, host-call validation and text
//! decoding. None of these functions perform I/O.

pub mod body;
pub mod decode;
pub mod headers;
pub mod multipart;
pub mod validate;

pub use body::{BodySource, PreparedBody, build_body, encode_content};
pub use decode::{Utf8Decoder, decode_text};
pub use headers::{
    apply_request_headers, find_header, is_reserved, merge_response_headers, set_header,
};
pub use validate::validate;
