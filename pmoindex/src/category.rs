use serde::{Deserialize, Serialize};
use std::fmt;

/// Catégorie de média d'un partage et de tout ce qu'il contient.
///
/// L'ordre de déclaration est l'ordre de présentation des partages à la
/// racine du catalogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaCategory {
    Video,
    Audio,
    Picture,
    Podcast,
    #[default]
    None,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Video => "VIDEO",
            MediaCategory::Audio => "AUDIO",
            MediaCategory::Picture => "PICTURE",
            MediaCategory::Podcast => "PODCAST",
            MediaCategory::None => "NONE",
        }
    }

    /// Décode une catégorie, sans tenir compte de la casse.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VIDEO" => Some(MediaCategory::Video),
            "AUDIO" => Some(MediaCategory::Audio),
            "PICTURE" => Some(MediaCategory::Picture),
            "PODCAST" => Some(MediaCategory::Podcast),
            "NONE" => Some(MediaCategory::None),
            _ => None,
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
