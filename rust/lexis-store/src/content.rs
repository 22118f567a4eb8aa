//! Post-processing of stored content returned to callers.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Whether `bytes` should be treated as binary rather than text.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0) || std::str::from_utf8(bytes).is_err()
}

/// Text is returned as is, binary data as standard base64.
pub fn encode_if_binary(bytes: Vec<u8>) -> Vec<u8> {
    if is_binary(&bytes) {
        STANDARD.encode(&bytes).into_bytes()
    } else {
        bytes
    }
}

/// Content of the file `content` refers to, if it looks like a path (holds a
/// `.` or a `/`) naming an existing regular file.
pub fn resolve_file_link(content: &[u8]) -> Option<Vec<u8>> {
    if !content.iter().any(|&b| b == b'.' || b == b'/') {
        return None;
    }
    let path = Path::new(std::str::from_utf8(content).ok()?);
    if !path.is_file() {
        return None;
    }
    match std::fs::read(path) {
        Ok(bytes) => {
            log::debug!("resolved file link {}", path.display());
            Some(encode_if_binary(bytes))
        }
        Err(e) => {
            log::warn!("failed to read linked file {}: {e}", path.display());
            None
        }
    }
}
