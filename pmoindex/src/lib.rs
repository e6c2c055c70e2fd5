//! # pmoindex - Catalogue des médias
//!
//! Le catalogue représente les partages configurés et leur contenu sous forme
//! d'arbre navigable, avec des identifiants stables : un même nœud logique
//! (même parent, même chemin) garde le même identifiant d'un redémarrage à
//! l'autre.
//!
//! Les changements de configuration arrivent par le [`ConfigurationEventBus`]
//! et sont appliqués au catalogue par le [`MediaIndexListener`].
//!
//! ```
//! use std::sync::Arc;
//! use pmoindex::{
//!     ConfigurationEvent, ConfigurationEventBus, ConfigurationNode, MediaCategory, MediaIndex,
//!     MediaIndexListener, RootNode,
//! };
//!
//! let index = Arc::new(MediaIndex::new());
//! let bus = ConfigurationEventBus::new();
//! bus.subscribe(Arc::new(MediaIndexListener::new(index.clone())));
//!
//! bus.publish(&ConfigurationEvent::Add {
//!     node: ConfigurationNode::new("c1", "Movies", "/movies"),
//!     root: RootNode::new("1", MediaCategory::Video, true),
//! });
//!
//! assert_eq!(index.roots()[0].name, "Movies");
//! ```

mod category;
mod element;
mod error;
mod events;
mod index;
mod nodes;

pub use category::MediaCategory;
pub use element::{MediaIndexElement, element_id};
pub use error::{IndexError, Result};
pub use events::{
    ConfigurationEvent, ConfigurationEventBus, ConfigurationListener, EventDispatcher,
    MediaIndexListener,
};
pub use index::MediaIndex;
pub use nodes::{ConfigurationNode, RootNode, build_root_element};
