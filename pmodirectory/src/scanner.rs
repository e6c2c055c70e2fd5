//! Producteurs d'entrées de catalogue.

use pmoindex::MediaIndexElement;
use pmomime::MimeTypeRegistry;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Produit les enfants d'un dossier du catalogue, prêts à être indexés.
pub trait EntryProducer: Send + Sync {
    /// Enfants directs de `parent`. `parent.id` sert de parent aux entrées.
    fn produce(&self, parent: &MediaIndexElement) -> Vec<MediaIndexElement>;
}

/// Parcourt un niveau de dossier local.
///
/// - Les fichiers et dossiers cachés (`.xxx`) sont ignorés.
/// - Les fichiers dont l'extension est inconnue sont écartés.
/// - Les sous-titres sont écartés : ils accompagnent une vidéo mais ne se
///   naviguent pas.
/// - Les sous-dossiers sont conservés comme dossiers.
///
/// Les dossiers viennent en premier, puis les fichiers, chacun trié par nom.
pub struct FolderScanner {
    mimes: Arc<MimeTypeRegistry>,
}

impl FolderScanner {
    pub fn new(mimes: Arc<MimeTypeRegistry>) -> Self {
        Self { mimes }
    }
}

impl EntryProducer for FolderScanner {
    fn produce(&self, parent: &MediaIndexElement) -> Vec<MediaIndexElement> {
        let dir = Path::new(&parent.path);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %parent.path, error = %e, "Cannot read folder");
                return Vec::new();
            }
        };

        let mut folders = Vec::new();
        let mut files = Vec::new();

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!(path = ?entry.path(), "Skipping non UTF-8 file name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            let Some(path_str) = path.to_str() else {
                continue;
            };
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if is_dir {
                folders.push(
                    MediaIndexElement::new(parent.id.clone(), path_str, name)
                        .with_category(parent.category)
                        .local(true),
                );
                continue;
            }

            match self.mimes.resolve(name) {
                Some(mime) if !mime.is_subtitle() => files.push(
                    MediaIndexElement::new(parent.id.clone(), path_str, name)
                        .with_category(parent.category)
                        .with_mime_type(mime)
                        .local(true),
                ),
                _ => {}
            }
        }

        let by_name = |a: &MediaIndexElement, b: &MediaIndexElement| {
            a.name.to_lowercase().cmp(&b.name.to_lowercase())
        };
        folders.sort_by(by_name);
        files.sort_by(by_name);

        folders.extend(files);
        folders
    }
}
