use mime_guess::mime::{self, Mime};
use serde::Serialize;

use super::DocumentError;

/// Kind tag of JSON payloads
pub const JSON_KIND: &str = "json";

/// A plaintext payload, before ciphering or after deciphering
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    File { extension: String, bytes: Vec<u8> },
}

impl Payload {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, DocumentError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// A file payload, typed either by extension (`pdf`) or by MIME
    ///  type (`application/pdf`)
    pub fn file(kind: &str, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        Ok(Self::File {
            extension: extension_for(kind)?,
            bytes,
        })
    }

    /// The tag stored alongside the ciphered bytes
    pub fn kind(&self) -> &str {
        match self {
            Payload::Json(_) => JSON_KIND,
            Payload::File { extension, .. } => extension,
        }
    }

    pub fn mime(&self) -> Mime {
        match self {
            Payload::Json(_) => mime::APPLICATION_JSON,
            Payload::File { extension, .. } => {
                mime_guess::from_ext(extension).first_or_octet_stream()
            }
        }
    }

    /// Plaintext bytes to be ciphered
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        match self {
            Payload::Json(value) => Ok(serde_json::to_vec(value)?),
            Payload::File { bytes, .. } => Ok(bytes.clone()),
        }
    }

    /// Rebuild a payload from deciphered bytes and their kind tag
    pub fn from_bytes(kind: &str, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        if kind == JSON_KIND {
            return Ok(Payload::Json(serde_json::from_slice(&bytes)?));
        }
        Ok(Payload::File {
            extension: kind.to_string(),
            bytes,
        })
    }
}

fn extension_for(kind: &str) -> Result<String, DocumentError> {
    if !kind.contains('/') {
        return Ok(kind.trim_start_matches('.').to_string());
    }
    mime_guess::get_mime_extensions_str(kind)
        .and_then(|extensions| extensions.first())
        .map(|extension| extension.to_string())
        .ok_or_else(|| DocumentError::UnknownMime(kind.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_kind_and_bytes() {
        let payload = Payload::json(&serde_json::json!({"prop1": 1, "prop2": "hola"})).unwrap();
        assert_eq!(payload.kind(), "json");
        assert_eq!(payload.mime(), mime::APPLICATION_JSON);

        let bytes = payload.to_bytes().unwrap();
        assert_eq!(Payload::from_bytes("json", bytes).unwrap(), payload);
    }

    #[test]
    fn test_file_from_extension_or_mime() {
        let by_ext = Payload::file("pdf", b"%PDF".to_vec()).unwrap();
        let by_mime = Payload::file("application/pdf", b"%PDF".to_vec()).unwrap();
        assert_eq!(by_ext, by_mime);
        assert_eq!(by_ext.kind(), "pdf");
        assert_eq!(by_ext.mime().essence_str(), "application/pdf");

        assert!(matches!(
            Payload::file("application/x-not-a-thing", vec![]),
            Err(DocumentError::UnknownMime(_))
        ));
    }

    #[test]
    fn test_non_json_bytes_under_json_kind() {
        assert!(matches!(
            Payload::from_bytes("json", b"\x00\x01".to_vec()),
            Err(DocumentError::Json(_))
        ));
    }
}
