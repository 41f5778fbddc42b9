//! Image reference classification and size accounting.

use std::path::Path;

use base64::Engine;

use crate::error::AnalysisError;

/// Decoded-size ceiling for inline images (20 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// A validated image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// `data:<media_type>;base64,<payload>`
    DataUrl { media_type: &'a str, payload: &'a str },
    /// Anything else is handed to the model provider to fetch.
    Remote(&'a str),
}

impl<'a> ImageRef<'a> {
    /// Classify a raw reference. Only data URLs are structurally checked.
    pub fn parse(raw: &'a str) -> Result<Self, AnalysisError> {
        let Some(rest) = raw.strip_prefix("data:") else {
            return Ok(Self::Remote(raw));
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AnalysisError::malformed("Invalid data URL: missing payload"))?;

        let params = header.strip_suffix(";base64").ok_or_else(|| {
            AnalysisError::malformed("Invalid data URL: expected base64 encoding")
        })?;
        let media_type = params.split(';').next().unwrap_or(params).trim();

        if !media_type.starts_with("image/") {
            return Err(AnalysisError::malformed(format!(
                "Unsupported media type: {}",
                if media_type.is_empty() { "(none)" } else { media_type }
            )));
        }
        if payload.is_empty() {
            return Err(AnalysisError::malformed("Invalid data URL: empty payload"));
        }

        Ok(Self::DataUrl { media_type, payload })
    }

    /// Decoded byte length of an inline image, computed without decoding.
    /// Remote images are not measured.
    pub fn decoded_len(&self) -> Option<usize> {
        match self {
            Self::DataUrl { payload, .. } => Some(base64_decoded_len(payload)),
            Self::Remote(_) => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::DataUrl { .. })
    }
}

fn base64_decoded_len(payload: &str) -> usize {
    let significant = payload.trim_end_matches('=').len();
    significant * 3 / 4
}

/// Encode raw image bytes as a `data:` URL.
pub fn encode_data_url(bytes: &[u8], media_type: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", media_type, b64)
}

/// Guess an image media type from a file name or URL extension.
pub fn media_type_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_url_passes_through() {
        let image = ImageRef::parse("https://cdn.example.com/receipt.jpg").unwrap();
        assert_eq!(image, ImageRef::Remote("https://cdn.example.com/receipt.jpg"));
        assert_eq!(image.decoded_len(), None);
        assert!(!image.is_inline());
    }

    #[test]
    fn test_data_url_parsing() {
        let image = ImageRef::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        match image {
            ImageRef::DataUrl { media_type, payload } => {
                assert_eq!(media_type, "image/png");
                assert_eq!(payload, "iVBORw0KGgo=");
            }
            other => panic!("expected data URL, got {:?}", other),
        }
    }

    #[test]
    fn test_data_url_with_parameters() {
        let image = ImageRef::parse("data:image/jpeg;name=r.jpg;base64,AAAA").unwrap();
        assert!(matches!(image, ImageRef::DataUrl { media_type: "image/jpeg", .. }));
    }

    #[test]
    fn test_rejects_non_image_data_url() {
        let err = ImageRef::parse("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_rejects_non_base64_data_url() {
        assert!(ImageRef::parse("data:image/svg+xml,<svg/>").is_err());
        assert!(ImageRef::parse("data:image/png;base64").is_err());
        assert!(ImageRef::parse("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_decoded_len_matches_real_decoding() {
        for raw in [&b"a"[..], b"ab", b"abc", b"abcd", b"receipt bytes!"] {
            let url = encode_data_url(raw, "image/png");
            let image = ImageRef::parse(&url).unwrap();
            assert_eq!(image.decoded_len(), Some(raw.len()), "input {:?}", raw);
        }
    }

    #[test]
    fn test_decoded_len_unpadded() {
        let image = ImageRef::parse("data:image/png;base64,YWI").unwrap();
        assert_eq!(image.decoded_len(), Some(2));
    }

    #[test]
    fn test_media_type_from_path() {
        assert_eq!(media_type_from_path(Path::new("a/receipt.PNG")), "image/png");
        assert_eq!(media_type_from_path(Path::new("receipt.jpeg")), "image/jpeg");
        assert_eq!(media_type_from_path(Path::new("receipt.webp")), "image/webp");
        assert_eq!(media_type_from_path(Path::new("receipt")), "image/jpeg");
    }
}
