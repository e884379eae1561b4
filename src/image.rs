//! Embedding a photo in an entry as a `data:` URI.

use crate::errors::{DiaryError, DiaryResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    })
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Reads an image file and returns it as a `data:<mime>;base64,...` string.
pub fn to_data_uri(path: &Path) -> DiaryResult<String> {
    let mime = mime_for(path).ok_or_else(|| {
        DiaryError::Validation(format!("'{}' is not a supported image file", path.display()))
    })?;
    let bytes = fs::read(path).map_err(|e| {
        DiaryError::Validation(format!("cannot read image '{}': {e}", path.display()))
    })?;
    Ok(encode_data_uri(mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn encodes_known_image_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.PNG");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        assert_eq!(to_data_uri(&path).unwrap(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn rejects_unknown_extensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        assert!(matches!(to_data_uri(&path), Err(DiaryError::Validation(_))));
    }

    #[test]
    fn missing_file_is_a_validation_error() {
        let err = to_data_uri(Path::new("/definitely/not/here.jpg")).unwrap_err();
        assert!(err.to_string().contains("cannot read image"));
    }
}
