//! Partages déclarés dans la configuration.

use pmoindex::{ConfigurationNode, MediaCategory, RootNode};
use serde::{Deserialize, Serialize};

/// Sections de `shares` et catégorie associée.
pub(crate) const SHARE_SECTIONS: &[(&str, MediaCategory)] = &[
    ("videos", MediaCategory::Video),
    ("audios", MediaCategory::Audio),
    ("pictures", MediaCategory::Picture),
    ("podcasts", MediaCategory::Podcast),
];

/// Entrée brute d'une section `shares.*`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ShareEntry {
    pub id: Option<String>,
    pub label: Option<String>,
    pub path: String,
}

/// Un partage configuré.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    pub id: String,
    pub label: String,
    pub path: String,
    pub category: MediaCategory,
}

impl ShareConfig {
    pub(crate) fn from_entry(entry: ShareEntry, category: MediaCategory) -> Self {
        let path = entry.path.trim().to_string();
        let id = entry
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("{}:{}", category.as_str().to_lowercase(), path));
        let label = entry
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| default_label(&path));

        Self {
            id,
            label,
            path,
            category,
        }
    }

    /// `false` pour les flux distants (`http://`, `https://`).
    pub fn is_local(&self) -> bool {
        let lower = self.path.to_ascii_lowercase();
        !(lower.starts_with("http://") || lower.starts_with("https://"))
    }

    /// Nœuds à publier sur le bus de configuration.
    pub fn to_nodes(&self) -> (RootNode, ConfigurationNode) {
        (
            RootNode::new(self.id.clone(), self.category, self.is_local()),
            ConfigurationNode::new(self.id.clone(), self.label.clone(), self.path.clone()),
        )
    }
}

/// Dernier composant du chemin, ou le chemin entier.
fn default_label(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
        .to_string()
}
