//! Image payloads for analysis requests.
//!
//! Inspection images arrive as data-URI strings (`data:image/png;base64,...`).
//! The metadata prefix is stripped before transmission and the MIME type is
//! taken from magic bytes first, the declared type second, and
//! [`DEFAULT_IMAGE_MIME`](crate::defaults::DEFAULT_IMAGE_MIME) last.

use base64::Engine;

use crate::defaults::DEFAULT_IMAGE_MIME;
use crate::error::{Error, Result};

/// Decoded image bytes plus the MIME type sent to the model.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl ImagePayload {
    /// Decode a data-URI (or bare base64) string.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let (declared, encoded) = match uri.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    Error::InvalidImage("data URI has no payload separator".to_string())
                })?;
                let mut params = header.split(';');
                let mime = params.next().unwrap_or_default().trim().to_lowercase();
                if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
                    return Err(Error::InvalidImage(
                        "only base64-encoded data URIs are supported".to_string(),
                    ));
                }
                (Some(mime), payload)
            }
            None => (None, uri),
        };

        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let data = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::InvalidImage(format!("base64 decode failed: {}", e)))?;

        Self::from_bytes_with_hint(data, declared.as_deref())
    }

    /// Wrap raw image bytes, sniffing the MIME type.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_hint(data, None)
    }

    fn from_bytes_with_hint(data: Vec<u8>, declared: Option<&str>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidImage("empty image payload".to_string()));
        }

        let mime_type = match infer::get(&data) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
                kind.mime_type().to_string()
            }
            Some(kind) => {
                return Err(Error::InvalidImage(format!(
                    "expected an image, found {}",
                    kind.mime_type()
                )))
            }
            None => match declared {
                Some(mime) if mime.starts_with("image/") => mime.to_string(),
                _ => DEFAULT_IMAGE_MIME.to_string(),
            },
        };

        Ok(Self { mime_type, data })
    }

    /// Base64 body as transmitted to the model (no data-URI prefix).
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Full data-URI form, as stored on inspection records.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_strips_data_uri_prefix() {
        let uri = format!("data:image/png;base64,{}", encode(PNG_HEADER));
        let payload = ImagePayload::from_data_uri(&uri).unwrap();
        assert_eq!(payload.data, PNG_HEADER);
        assert_eq!(payload.to_base64(), encode(PNG_HEADER));
    }

    #[test]
    fn test_magic_bytes_override_declared_mime() {
        let uri = format!("data:image/jpeg;base64,{}", encode(PNG_HEADER));
        let payload = ImagePayload::from_data_uri(&uri).unwrap();
        assert_eq!(payload.mime_type, "image/png");
    }

    #[test]
    fn test_declared_mime_used_when_unrecognized() {
        let uri = format!("data:image/webp;base64,{}", encode(b"not-really-an-image"));
        let payload = ImagePayload::from_data_uri(&uri).unwrap();
        assert_eq!(payload.mime_type, "image/webp");
    }

    #[test]
    fn test_defaults_to_jpeg() {
        let payload = ImagePayload::from_data_uri(&encode(b"opaque bytes")).unwrap();
        assert_eq!(payload.mime_type, DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn test_bare_base64_jpeg() {
        let payload = ImagePayload::from_data_uri(&encode(JPEG_HEADER)).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn test_rejects_non_image_content() {
        let pdf = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";
        let uri = format!("data:image/png;base64,{}", encode(pdf));
        let err = ImagePayload::from_data_uri(&uri).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_rejects_empty_payload() {
        let err = ImagePayload::from_data_uri("data:image/png;base64,").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_rejects_data_uri_without_separator() {
        let err = ImagePayload::from_data_uri("data:image/png;base64").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        let err = ImagePayload::from_data_uri("data:image/png;base64,@@@@").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_rejects_non_base64_data_uri() {
        let err = ImagePayload::from_data_uri("data:image/svg+xml,%3Csvg%3E").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_tolerates_wrapped_base64() {
        let encoded = encode(PNG_HEADER);
        let (a, b) = encoded.split_at(8);
        let uri = format!("data:image/png;base64,{}\n{}", a, b);
        let payload = ImagePayload::from_data_uri(&uri).unwrap();
        assert_eq!(payload.data, PNG_HEADER);
    }

    #[test]
    fn test_data_uri_roundtrip_keeps_mime() {
        let payload = ImagePayload::from_bytes(PNG_HEADER.to_vec()).unwrap();
        let uri = payload.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(ImagePayload::from_data_uri(&uri).unwrap(), payload);
    }

    #[test]
    fn test_debug_omits_bytes() {
        let payload = ImagePayload::from_bytes(PNG_HEADER.to_vec()).unwrap();
        let debug = format!("{:?}", payload);
        assert!(debug.contains("len: 12"));
        assert!(!debug.contains("137"));
    }
}
