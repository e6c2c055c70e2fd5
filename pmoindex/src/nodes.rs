//! Nœuds de configuration et fabrique d'éléments de catalogue.

use serde::{Deserialize, Serialize};

use crate::category::MediaCategory;
use crate::element::MediaIndexElement;

/// Un partage configuré (dossier vidéo, audio, photo ou flux de podcast).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RootNode {
    pub id: String,
    pub category: MediaCategory,
    pub is_local: bool,
}

impl RootNode {
    pub fn new(id: impl Into<String>, category: MediaCategory, is_local: bool) -> Self {
        Self {
            id: id.into(),
            category,
            is_local,
        }
    }
}

/// L'entrée saisie par l'utilisateur pour un partage : chemin absolu ou URL
/// de flux, et libellé affiché.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigurationNode {
    pub id: String,
    pub label: String,
    pub path: String,
}

impl ConfigurationNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Construit l'élément racine d'un partage.
///
/// Fonction pure : le parent est l'identifiant du `RootNode`, la catégorie et
/// le drapeau local viennent du `RootNode`, le chemin et le nom du
/// `ConfigurationNode`.
pub fn build_root_element(root: &RootNode, config: &ConfigurationNode) -> MediaIndexElement {
    MediaIndexElement::new(root.id.clone(), config.path.clone(), config.label.clone())
        .with_category(root.category)
        .local(root.is_local)
        .root(true)
}
