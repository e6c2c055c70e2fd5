//! # pmodevices - Registre des devices
//!
//! Garde la trace des devices vus sur le réseau, dans deux espaces de noms :
//!
//! - **Renderers** : clients de navigation, indexés par adresse hôte, avec la
//!   liste des types MIME qu'ils savent lire.
//! - **Récepteurs** : cibles du protocole de commande Airplay, indexées par
//!   identifiant entier.
//!
//! Le registre est alimenté par la découverte réseau (hors de ce crate) et
//! consulté par le service de navigation et le client de commande.

mod receiver;
mod registry;
mod renderer;

pub use receiver::{Receiver, ReceiverFeatures};
pub use registry::DeviceRegistry;
pub use renderer::Renderer;
