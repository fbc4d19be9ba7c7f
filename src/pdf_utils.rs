//! Text-string helpers for reading and writing Info dictionary entries.

use lopdf::{Object, StringFormat};

const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Extract a text string value from a PDF dictionary for a given key.
///
/// Returns `Some(String)` if the key exists and contains a non-empty string,
/// `None` otherwise. UTF-16BE strings (with byte-order mark) are decoded;
/// everything else is read as UTF-8, lossily.
pub fn extract_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_str().ok())
        .map(decode_text_string)
        .filter(|s| !s.is_empty())
}

/// Encode `text` as a PDF text string object.
///
/// ASCII text becomes a literal string; anything else is written as
/// hexadecimal UTF-16BE prefixed with a byte-order mark.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&UTF16_BE_BOM);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&UTF16_BE_BOM) {
        Some(body) => {
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}
