//! Registre centralisé des devices connus.
//!
//! Deux espaces de noms indépendants partagent le même registre :
//! - les renderers (navigation), indexés par adresse hôte ;
//! - les récepteurs Airplay (commandes), indexés par identifiant entier.
//!
//! Les entrées sont indépendantes les unes des autres : chaque opération ne
//! prend le verrou que le temps d'une insertion, d'une suppression ou d'une
//! copie de l'entrée.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::receiver::Receiver;
use crate::renderer::Renderer;

/// Registre des devices, partagé entre les deux protocoles.
///
/// Le registre est clonable à faible coût : les clones partagent les mêmes
/// tables.
///
/// # Examples
///
/// ```
/// use pmodevices::DeviceRegistry;
///
/// let registry = DeviceRegistry::new();
/// registry.add_renderer("192.168.1.10", Some(vec!["video/mpeg".to_string()]));
/// registry.add_receiver(42, "192.168.1.20", 7000);
///
/// assert_eq!(
///     registry.available_mime_types("192.168.1.10"),
///     Some(vec!["video/mpeg".to_string()])
/// );
/// assert_eq!(registry.receiver(42).unwrap().port, 7000);
/// ```
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    renderers: Arc<RwLock<HashMap<String, Arc<Renderer>>>>,
    receivers: Arc<RwLock<HashMap<u32, Arc<Receiver>>>>,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("renderer_count", &self.renderers.read().len())
            .field("receiver_count", &self.receivers.read().len())
            .finish()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ============= Renderers (navigation) =============

    /// Enregistre un renderer et la liste des types MIME qu'il accepte.
    ///
    /// Une nouvelle annonce pour le même hôte remplace l'entrée existante.
    pub fn add_renderer(&self, host: impl Into<String>, mime_types: Option<Vec<String>>) {
        let mut renderer = Renderer::new(host);
        renderer.mime_types = mime_types;
        self.register_renderer(renderer);
    }

    /// Enregistre un renderer complet.
    pub fn register_renderer(&self, renderer: Renderer) {
        info!(
            host = %renderer.host,
            mime_count = renderer.mime_types.as_ref().map_or(0, Vec::len),
            "Registering renderer"
        );
        self.renderers
            .write()
            .insert(renderer.host.clone(), Arc::new(renderer));
    }

    /// Types MIME annoncés par le renderer `host`.
    ///
    /// `None` si l'hôte est inconnu ou s'il n'a annoncé aucune liste.
    pub fn available_mime_types(&self, host: &str) -> Option<Vec<String>> {
        self.renderers.read().get(host)?.mime_types.clone()
    }

    pub fn renderer(&self, host: &str) -> Option<Arc<Renderer>> {
        self.renderers.read().get(host).cloned()
    }

    /// Supprime un renderer. Retourne `true` s'il était présent.
    pub fn remove_renderer(&self, host: &str) -> bool {
        let removed = self.renderers.write().remove(host).is_some();
        if removed {
            info!(host = %host, "Removed renderer");
        } else {
            debug!(host = %host, "Renderer already absent");
        }
        removed
    }

    pub fn list_renderers(&self) -> Vec<Arc<Renderer>> {
        self.renderers.read().values().cloned().collect()
    }

    // ============= Récepteurs (commandes) =============

    /// Enregistre un récepteur adressé par `id`.
    pub fn add_receiver(&self, id: u32, host: impl Into<String>, port: u16) {
        self.register_receiver(Receiver::new(id, host, port));
    }

    /// Enregistre un récepteur complet (nom, fonctionnalités).
    pub fn register_receiver(&self, receiver: Receiver) {
        info!(receiver = %receiver, "Registering Airplay receiver");
        self.receivers.write().insert(receiver.id, Arc::new(receiver));
    }

    pub fn receiver(&self, id: u32) -> Option<Arc<Receiver>> {
        self.receivers.read().get(&id).cloned()
    }

    /// Supprime un récepteur. Retourne `true` s'il était présent.
    pub fn remove_receiver(&self, id: u32) -> bool {
        let removed = self.receivers.write().remove(&id);
        match removed {
            Some(receiver) => {
                info!(receiver = %receiver, "Removed Airplay receiver");
                true
            }
            None => false,
        }
    }

    pub fn list_receivers(&self) -> Vec<Arc<Receiver>> {
        self.receivers.read().values().cloned().collect()
    }

    /// Récepteurs publiés par une adresse donnée.
    pub fn find_receivers_by_host(&self, host: &str) -> Vec<Arc<Receiver>> {
        self.receivers
            .read()
            .values()
            .filter(|r| r.host == host)
            .cloned()
            .collect()
    }
}
