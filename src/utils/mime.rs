//! Image MIME handling for uploads.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Subtype used when the extension is not in the table.
const FALLBACK_SUBTYPE: &str = "jpeg";

/// Map a file's extension to the `image/<subtype>` it is uploaded as.
pub fn image_subtype(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "jpeg",
        Some("png") => "png",
        Some("gif") => "gif",
        Some("bmp") => "bmp",
        Some("webp") => "webp",
        _ => FALLBACK_SUBTYPE,
    }
}

/// Build a `data:image/<subtype>;base64,...` URI for an image's bytes.
pub fn encode_data_uri(path: &Path, bytes: &[u8]) -> String {
    format!(
        "data:image/{};base64,{}",
        image_subtype(path),
        STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_subtype() {
        assert_eq!(image_subtype(Path::new("a.JPG")), "jpeg");
        assert_eq!(image_subtype(Path::new("a.jpeg")), "jpeg");
        assert_eq!(image_subtype(Path::new("dir/b.png")), "png");
        assert_eq!(image_subtype(Path::new("c.webp")), "webp");
        assert_eq!(image_subtype(Path::new("d.tiff")), "jpeg");
        assert_eq!(image_subtype(Path::new("noext")), "jpeg");
    }

    #[test]
    fn test_encode_data_uri() {
        assert_eq!(
            encode_data_uri(Path::new("x.gif"), b"GIF89a"),
            "data:image/gif;base64,R0lGODlh"
        );
    }
}
