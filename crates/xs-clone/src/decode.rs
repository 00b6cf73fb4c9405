//! Content decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use xs_types::error::{Result, XsError};

use crate::source::FileDescriptor;

/// Decode a file descriptor's content into text.
///
/// The service wraps base64 at 60 columns, so whitespace is stripped before
/// decoding. Bytes that are not UTF-8 are replaced: only text survives.
pub fn decode_content(desc: &FileDescriptor) -> Result<String> {
    let Some(raw) = desc.content.as_deref() else {
        return Ok(String::new());
    };
    match desc.encoding.as_deref() {
        None | Some("base64") => {
            let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| XsError::Validation(format!("invalid base64: {e}")))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        },
        Some("none" | "utf-8") => Ok(raw.to_string()),
        Some(other) => Err(XsError::Validation(format!("unsupported encoding: {other}"))),
    }
}
