//! Navigation dans le catalogue, filtrée par device.

use pmodevices::DeviceRegistry;
use pmoindex::{IndexError, MediaIndex, MediaIndexElement};
use pmomime::MimeTypeRegistry;
use std::sync::Arc;
use tracing::debug;

use crate::error::{BrowseError, Result};
use crate::scanner::EntryProducer;

/// Identifiant de la racine synthétique du catalogue.
pub const ROOT_ID: &str = "0";
/// Parent de la racine synthétique.
pub const ROOT_PARENT_ID: &str = "-1";

/// Service de navigation.
///
/// Deux devices qui parcourent le même dossier peuvent voir des listes
/// différentes : chaque enfant typé est filtré selon les types MIME annoncés
/// par le device appelant.
pub struct ContentDirectoryService {
    index: Arc<MediaIndex>,
    devices: Arc<DeviceRegistry>,
    mimes: Arc<MimeTypeRegistry>,
    producer: Option<Arc<dyn EntryProducer>>,
}

impl ContentDirectoryService {
    pub fn new(index: Arc<MediaIndex>, devices: Arc<DeviceRegistry>, mimes: Arc<MimeTypeRegistry>) -> Self {
        Self {
            index,
            devices,
            mimes,
            producer: None,
        }
    }

    /// Active le producteur d'entrées utilisé pour peupler les dossiers
    /// locaux avant de les lister.
    pub fn with_producer(mut self, producer: Arc<dyn EntryProducer>) -> Self {
        self.producer = Some(producer);
        self
    }

    pub fn index(&self) -> &Arc<MediaIndex> {
        &self.index
    }

    /// Les racines de partage, par catégorie puis dans l'ordre d'ajout.
    pub fn browse_roots(&self) -> Vec<MediaIndexElement> {
        let mut roots = self.index.roots();
        roots.sort_by_key(|root| root.category);
        roots
    }

    /// Enfants de `parent_id` visibles par le device `host`.
    ///
    /// `ROOT_ID` liste les racines de partage.
    ///
    /// # Errors
    ///
    /// [`BrowseError::ObjectNotFound`] si `parent_id` n'existe pas au moment
    /// de l'appel.
    pub fn browse(&self, host: &str, parent_id: &str) -> Result<Vec<MediaIndexElement>> {
        if parent_id == ROOT_ID {
            return Ok(self.browse_roots());
        }

        if let Some(producer) = &self.producer {
            self.refresh(producer.as_ref(), parent_id);
        }

        let children = self.index.children(parent_id).map_err(|e| match e {
            IndexError::NotFound(id) => BrowseError::ObjectNotFound(id),
            other => BrowseError::ObjectNotFound(other.to_string()),
        })?;

        let available = self.devices.available_mime_types(host);
        let total = children.len();
        let visible: Vec<_> = children
            .into_iter()
            .filter(|child| match &child.mime_type {
                Some(mime) => self.mimes.is_compliant(mime, available.as_deref()),
                None => true,
            })
            .collect();

        debug!(
            host = %host,
            parent_id = %parent_id,
            total,
            visible = visible.len(),
            "Browse"
        );
        Ok(visible)
    }

    /// Synchronise les enfants d'un dossier local avec le disque.
    ///
    /// Le disque est lu hors verrou ; le résultat n'est appliqué que si le
    /// dossier n'a été ni supprimé ni déplacé entre-temps.
    fn refresh(&self, producer: &dyn EntryProducer, parent_id: &str) {
        let Ok(parent) = self.index.get(parent_id) else {
            return;
        };
        if !parent.is_local || !parent.is_folder() {
            return;
        }

        let entries = producer.produce(&parent);

        match self.index.sync_children(&parent.id, &parent.path, entries) {
            Ok((added, stale)) if added > 0 || stale > 0 => {
                debug!(parent_id = %parent_id, added, stale, "Folder refreshed");
            }
            Ok(_) => {}
            Err(e) => {
                debug!(parent_id = %parent_id, error = %e, "Folder changed during scan, refresh dropped");
            }
        }
    }
}
