use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// MIME type for a file, decided by its extension alone (case-insensitive).
pub fn get_content_type(file_path: impl AsRef<Path>) -> &'static str {
    let extension = file_path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("tiff") | Some("tif") => "image/tiff",
        Some("bmp") => "image/bmp",
        Some("gif") => "image/gif",
        Some("heif") | Some("heic") => "image/heif",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("pptx") => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Removes `key` from a raw JSON object and decodes it. Absent and `null`
/// both read as `None`.
pub(crate) fn take_json_field<T: DeserializeOwned>(
    raw: &mut Map<String, Value>,
    key: &str,
) -> serde_json::Result<Option<T>> {
    raw.remove(key)
        .filter(|value| !value.is_null())
        .map(serde_json::from_value)
        .transpose()
}
