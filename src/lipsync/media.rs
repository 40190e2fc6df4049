//! Format and content-type inference for lip-sync inputs.

use std::path::Path;

use super::client::LipsyncError;

/// Content type used when an audio file's type cannot be guessed.
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// Supported face formats: (extension, content type, is static image).
const FACE_FORMATS: &[(&str, &str, bool)] = &[
    ("jpg", "image/jpeg", true),
    ("jpeg", "image/jpeg", true),
    ("png", "image/png", true),
    ("mp4", "video/mp4", false),
    ("avi", "video/x-msvideo", false),
    ("mov", "video/quicktime", false),
];

/// A face input: still image or video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMedia {
    /// Lowercased extension without the dot.
    pub format: String,
    pub content_type: String,
    /// True for still images, false for video.
    pub is_static: bool,
}

impl FaceMedia {
    /// File name used for the multipart upload.
    pub fn upload_name(&self) -> String {
        format!("face.{}", self.format)
    }
}

/// An audio input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMedia {
    /// Lowercased extension without the dot; empty when the file has none.
    pub format: String,
    pub content_type: String,
}

impl AudioMedia {
    /// File name used for the multipart upload.
    pub fn upload_name(&self) -> String {
        if self.format.is_empty() {
            "audio".to_string()
        } else {
            format!("audio.{}", self.format)
        }
    }
}

fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Classify a face file by extension.
///
/// # Errors
///
/// Returns `LipsyncError::UnsupportedFormat` for anything outside the
/// image and video tables, including paths without an extension.
pub fn face_media(path: &Path) -> Result<FaceMedia, LipsyncError> {
    let ext = normalized_extension(path);

    FACE_FORMATS
        .iter()
        .find(|(known, _, _)| *known == ext)
        .map(|(_, content_type, is_static)| FaceMedia {
            format: ext.clone(),
            content_type: content_type.to_string(),
            is_static: *is_static,
        })
        .ok_or_else(|| LipsyncError::UnsupportedFormat(format!(".{}", ext)))
}

/// Classify an audio file. Never fails; the first guess for the extension
/// wins, whatever its top-level type, and `audio/wav` is used when there is
/// no guess at all.
pub fn audio_media(path: &Path) -> AudioMedia {
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_AUDIO_CONTENT_TYPE.to_string());

    AudioMedia {
        format: normalized_extension(path),
        content_type,
    }
}
