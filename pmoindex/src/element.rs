use pmomime::MimeType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::MediaCategory;

/// Espace de noms des identifiants UUID v5 du catalogue.
const ELEMENT_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_2e0a_93d4_5b7e_8a41_0f3c_d2b9_e517);

/// Identifiant déterministe d'un élément, dérivé de `(parent_id, path)`.
///
/// Ré-indexer le même nœud logique après un redémarrage redonne le même
/// identifiant.
pub fn element_id(parent_id: &str, path: &str) -> String {
    derive_id(parent_id, path, 0)
}

/// Variante de [`element_id`] utilisée quand l'identifiant de base est déjà
/// pris par un élément déplacé (`update`).
pub(crate) fn derive_id(parent_id: &str, path: &str, attempt: u32) -> String {
    let mut name = Vec::with_capacity(parent_id.len() + path.len() + 8);
    name.extend_from_slice(parent_id.as_bytes());
    name.push(0);
    name.extend_from_slice(path.as_bytes());
    if attempt > 0 {
        name.push(0);
        name.extend_from_slice(attempt.to_string().as_bytes());
    }
    Uuid::new_v5(&ELEMENT_NAMESPACE, &name).to_string()
}

/// Un nœud du catalogue virtuel.
///
/// `mime_type` vaut `None` pour les dossiers et les racines de partage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaIndexElement {
    pub id: String,
    pub parent_id: String,
    pub category: MediaCategory,
    pub mime_type: Option<MimeType>,
    pub path: String,
    pub name: String,
    pub is_local: bool,
    pub is_root: bool,
}

impl MediaIndexElement {
    /// Crée un élément (dossier non local par défaut) sous `parent_id`.
    pub fn new(parent_id: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        let parent_id = parent_id.into();
        let path = path.into();
        Self {
            id: element_id(&parent_id, &path),
            parent_id,
            category: MediaCategory::None,
            mime_type: None,
            path,
            name: name.into(),
            is_local: false,
            is_root: false,
        }
    }

    pub fn with_category(mut self, category: MediaCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_mime_type(mut self, mime_type: MimeType) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn local(mut self, is_local: bool) -> Self {
        self.is_local = is_local;
        self
    }

    pub fn root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// `true` pour les éléments sans type MIME (dossiers, racines).
    pub fn is_folder(&self) -> bool {
        self.mime_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_deterministic() {
        assert_eq!(element_id("5", "/movies"), element_id("5", "/movies"));
        assert_ne!(element_id("5", "/movies"), element_id("6", "/movies"));
        assert_ne!(element_id("5", "/movies"), element_id("5", "/films"));
        assert_ne!(derive_id("5", "/movies", 1), element_id("5", "/movies"));
    }

    #[test]
    fn test_id_does_not_mix_parent_and_path() {
        assert_ne!(element_id("ab", "c"), element_id("a", "bc"));
    }

    #[test]
    fn test_builder() {
        let mime = MimeType::parse("video/mp4").unwrap();
        let element = MediaIndexElement::new("p", "/movies/a.mp4", "a.mp4")
            .with_category(MediaCategory::Video)
            .with_mime_type(mime.clone())
            .local(true);

        assert_eq!(element.id, element_id("p", "/movies/a.mp4"));
        assert_eq!(element.mime_type, Some(mime));
        assert!(element.is_local);
        assert!(!element.is_root);
        assert!(!element.is_folder());
    }
}
