//! Data-URI codec and size formatting.
//!
//! Stored payloads are `data:<mime>;base64,<payload>` strings. The MIME type
//! travels inside the payload so a renderer can use a record without the
//! original file.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

/// MIME used when a file reports none.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUri {
    /// MIME type from the header
    pub mime_type: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

/// Encode bytes as a base64 data URI.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let mime = if mime_type.is_empty() { FALLBACK_MIME } else { mime_type };
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode a base64 data URI back into its MIME type and bytes.
///
/// Header parameters (`;charset=...`) are tolerated; the last parameter must
/// be `base64`.
pub fn decode_data_uri(uri: &str) -> Result<DecodedDataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidDataUri("missing 'data:' prefix".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUri("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    if params.last() != Some("base64") {
        return Err(Error::InvalidDataUri("payload is not base64".to_string()));
    }

    let bytes = STANDARD.decode(payload.trim())?;

    Ok(DecodedDataUri {
        mime_type: if mime.is_empty() { FALLBACK_MIME.to_string() } else { mime.to_string() },
        bytes,
    })
}

/// Format a byte count base-1024 with at most two decimals: `"0 Bytes"`,
/// `"1.5 KB"`, `"2 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_carries_mime() {
        let uri = encode_data_uri("image/jpeg", &[0xff, 0xd8, 0xff]);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_decode_recovers_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let decoded = decode_data_uri(&encode_data_uri("application/pdf", &bytes)).unwrap();
        assert_eq!(decoded.mime_type, "application/pdf");
        assert_eq!(decoded.bytes, bytes);
    }

    #[test]
    fn test_empty_mime_falls_back() {
        let uri = encode_data_uri("", b"x");
        assert!(uri.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_decode_tolerates_parameters() {
        let decoded = decode_data_uri("data:text/plain;charset=utf-8;base64,aGk=").unwrap();
        assert_eq!(decoded.mime_type, "text/plain");
        assert_eq!(decoded.bytes, b"hi");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode_data_uri("blob:abc"), Err(Error::InvalidDataUri(_))));
        assert!(matches!(decode_data_uri("data:image/png;base64"), Err(Error::InvalidDataUri(_))));
        assert!(matches!(decode_data_uri("data:text/plain,hello"), Err(Error::InvalidDataUri(_))));
        assert!(matches!(decode_data_uri("data:image/png;base64,@@@"), Err(Error::InvalidDataUri(_))));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_file_size(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
    }
}
