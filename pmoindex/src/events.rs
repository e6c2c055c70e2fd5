//! Propagation des changements de configuration vers le catalogue.
//!
//! Le bus distribue chaque [`ConfigurationEvent`] à ses abonnés, un événement
//! à la fois. Un abonné qui échoue sur un événement est journalisé et ignoré :
//! la distribution continue avec l'abonné suivant puis l'événement suivant.

use crossbeam_channel::{Sender, unbounded};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{IndexError, Result};
use crate::index::MediaIndex;
use crate::nodes::{ConfigurationNode, RootNode, build_root_element};

/// Un changement de configuration portant sur un partage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationEvent {
    Add { node: ConfigurationNode, root: RootNode },
    Update { node: ConfigurationNode, root: RootNode },
    Delete { node: ConfigurationNode, root: RootNode },
}

impl ConfigurationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationEvent::Add { .. } => "ADD",
            ConfigurationEvent::Update { .. } => "UPDATE",
            ConfigurationEvent::Delete { .. } => "DELETE",
        }
    }

    pub fn node(&self) -> &ConfigurationNode {
        match self {
            ConfigurationEvent::Add { node, .. }
            | ConfigurationEvent::Update { node, .. }
            | ConfigurationEvent::Delete { node, .. } => node,
        }
    }

    pub fn root(&self) -> &RootNode {
        match self {
            ConfigurationEvent::Add { root, .. }
            | ConfigurationEvent::Update { root, .. }
            | ConfigurationEvent::Delete { root, .. } => root,
        }
    }
}

/// Abonné du bus de configuration.
pub trait ConfigurationListener: Send + Sync {
    fn on_event(&self, event: &ConfigurationEvent) -> Result<()>;
}

/// Bus de configuration in-process.
///
/// `publish` est synchrone ; les appels concurrents sont sérialisés, de sorte
/// qu'un abonné ne traite jamais deux événements en même temps.
#[derive(Default)]
pub struct ConfigurationEventBus {
    listeners: RwLock<Vec<Arc<dyn ConfigurationListener>>>,
    dispatch: Mutex<()>,
}

impl ConfigurationEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ConfigurationListener>) {
        self.listeners.write().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Distribue un événement à tous les abonnés.
    ///
    /// Retourne le nombre d'abonnés en échec (journalisés).
    pub fn publish(&self, event: &ConfigurationEvent) -> usize {
        let _guard = self.dispatch.lock();
        let listeners = self.listeners.read().clone();

        debug!(
            kind = event.kind(),
            root_id = %event.root().id,
            path = %event.node().path,
            "Dispatching configuration event"
        );

        let mut failures = 0;
        for listener in listeners {
            if let Err(e) = listener.on_event(event) {
                failures += 1;
                warn!(
                    kind = event.kind(),
                    root_id = %event.root().id,
                    error = %e,
                    "Configuration event failed, skipping"
                );
            }
        }
        failures
    }

    /// Démarre un thread de distribution alimenté par un canal.
    ///
    /// Les événements soumis par [`EventDispatcher::submit`] sont distribués
    /// dans l'ordre de soumission.
    pub fn start_dispatcher(self: &Arc<Self>) -> std::io::Result<EventDispatcher> {
        let (tx, rx) = unbounded::<DispatchMessage>();
        let bus = Arc::clone(self);

        let thread = thread::Builder::new()
            .name("config-events".to_string())
            .spawn(move || {
                info!("Configuration event dispatcher started");
                for message in rx.iter() {
                    match message {
                        DispatchMessage::Event(event) => {
                            bus.publish(&event);
                        }
                        DispatchMessage::Stop => break,
                    }
                }
                info!("Configuration event dispatcher stopped");
            })?;

        Ok(EventDispatcher {
            sender: tx,
            thread: Some(thread),
        })
    }
}

enum DispatchMessage {
    Event(ConfigurationEvent),
    Stop,
}

/// Poignée sur le thread de distribution.
pub struct EventDispatcher {
    sender: Sender<DispatchMessage>,
    thread: Option<JoinHandle<()>>,
}

impl EventDispatcher {
    /// Soumet un événement. Retourne `false` si le thread est arrêté.
    pub fn submit(&self, event: ConfigurationEvent) -> bool {
        self.sender.send(DispatchMessage::Event(event)).is_ok()
    }

    /// Arrête le thread après distribution des événements déjà soumis.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.sender.send(DispatchMessage::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Configuration event dispatcher panicked");
            }
        }
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Abonné qui reporte les changements de configuration dans le catalogue.
///
/// - ADD : indexe la racine du partage. Un ADD rejoué est sans effet.
/// - UPDATE : remplace le chemin et le libellé de la racine.
/// - DELETE : supprime la racine et tout son sous-arbre.
///
/// Un UPDATE ou un DELETE sur un partage inconnu est sans effet.
pub struct MediaIndexListener {
    index: Arc<MediaIndex>,
}

impl MediaIndexListener {
    pub fn new(index: Arc<MediaIndex>) -> Self {
        Self { index }
    }
}

impl ConfigurationListener for MediaIndexListener {
    fn on_event(&self, event: &ConfigurationEvent) -> Result<()> {
        match event {
            ConfigurationEvent::Add { node, root } => {
                match self.index.put(build_root_element(root, node)) {
                    Ok(id) => {
                        info!(root_id = %root.id, id = %id, path = %node.path, "Share added");
                    }
                    Err(IndexError::DuplicateElement { .. }) => {
                        debug!(root_id = %root.id, path = %node.path, "Share already indexed");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                }
            }
            ConfigurationEvent::Update { node, root } => match self.index.root_element(&root.id) {
                Some(element) => {
                    self.index.update(&element.id, &node.path, &node.label)?;
                }
                None => {
                    debug!(root_id = %root.id, "Update for unknown share ignored");
                    return Ok(());
                }
            },
            ConfigurationEvent::Delete { node, root } => match self.index.root_element(&root.id) {
                Some(element) => {
                    self.index.remove(&element.id);
                    info!(root_id = %root.id, path = %node.path, "Share removed");
                }
                None => {
                    debug!(root_id = %root.id, "Delete for unknown share ignored");
                    return Ok(());
                }
            },
        }

        self.index.bump_update_id();
        Ok(())
    }
}
