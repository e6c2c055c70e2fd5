//! Type MIME immuable et ses drapeaux de classification.

use serde::{Deserialize, Serialize};
use std::fmt;

const TYPE_VIDEO: &str = "video";
const TYPE_AUDIO: &str = "audio";
const TYPE_IMAGE: &str = "image";
const TYPE_APPLICATION: &str = "application";
const SUBTYPE_SUBRIP: &str = "x-subrip";

/// Un couple `type/subtype`, par exemple `video/x-msvideo`.
///
/// Les drapeaux (`is_video`, `is_audio`, ...) sont dérivés du type à la
/// construction ; la valeur ne change plus ensuite. Deux `MimeType` sont égaux
/// si leur chaîne complète est égale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MimeType {
    mime_type: String,
    type_: String,
    sub_type: String,
}

impl MimeType {
    /// Construit un type MIME à partir de sa forme textuelle `type/subtype`.
    ///
    /// Retourne `None` si la chaîne ne contient pas exactement un `/` séparant
    /// deux parties non vides.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (type_, sub_type) = value.split_once('/')?;
        if type_.is_empty() || sub_type.is_empty() || sub_type.contains('/') {
            return None;
        }

        Some(Self {
            mime_type: value.to_string(),
            type_: type_.to_string(),
            sub_type: sub_type.to_string(),
        })
    }

    /// La chaîne complète `type/subtype`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn is_video(&self) -> bool {
        self.type_.eq_ignore_ascii_case(TYPE_VIDEO)
    }

    pub fn is_audio(&self) -> bool {
        self.type_.eq_ignore_ascii_case(TYPE_AUDIO)
    }

    pub fn is_image(&self) -> bool {
        self.type_.eq_ignore_ascii_case(TYPE_IMAGE)
    }

    /// Sous-titres SubRip (`application/x-subrip`).
    pub fn is_subtitle(&self) -> bool {
        self.type_.eq_ignore_ascii_case(TYPE_APPLICATION)
            && self.sub_type.eq_ignore_ascii_case(SUBTYPE_SUBRIP)
    }

    /// Vrai dès que le type est vidéo, audio ou image.
    pub fn is_media(&self) -> bool {
        self.is_video() || self.is_audio() || self.is_image()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type)
    }
}

impl TryFrom<String> for MimeType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MimeType::parse(&value).ok_or_else(|| format!("Invalid MIME type: {}", value))
    }
}

impl From<MimeType> for String {
    fn from(value: MimeType) -> Self {
        value.mime_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video() {
        let mime = MimeType::parse("video/x-msvideo").unwrap();
        assert_eq!(mime.type_(), "video");
        assert_eq!(mime.sub_type(), "x-msvideo");
        assert_eq!(mime.mime_type(), "video/x-msvideo");
        assert!(mime.is_video());
        assert!(mime.is_media());
        assert!(!mime.is_audio());
        assert!(!mime.is_image());
        assert!(!mime.is_subtitle());
    }

    #[test]
    fn test_subtitle_is_not_media() {
        let mime = MimeType::parse("application/x-subrip").unwrap();
        assert!(mime.is_subtitle());
        assert!(!mime.is_media());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(MimeType::parse("").is_none());
        assert!(MimeType::parse("video").is_none());
        assert!(MimeType::parse("/mpeg").is_none());
        assert!(MimeType::parse("video/").is_none());
        assert!(MimeType::parse("a/b/c").is_none());
    }

    #[test]
    fn test_display_and_equality() {
        let a = MimeType::parse("audio/mpeg").unwrap();
        let b: MimeType = "audio/mpeg".to_string().try_into().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "audio/mpeg");
    }
}
