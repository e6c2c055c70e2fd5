//! # pmomime - Types MIME
//!
//! Résolution du type MIME d'un fichier d'après son extension, et filtre de
//! conformité utilisé pour adapter les listings à chaque renderer.
//!
//! ```
//! use pmomime::MimeTypeRegistry;
//!
//! let registry = MimeTypeRegistry::new();
//! let mime = registry.resolve("concert.mkv").unwrap();
//!
//! // Un renderer qui n'annonce rien accepte tout
//! assert!(registry.is_compliant(&mime, None));
//! assert!(!registry.is_compliant(&mime, Some(&["video/mpeg".to_string()])));
//! ```

mod mime_type;
mod registry;
mod table;

pub use mime_type::MimeType;
pub use registry::{MimeTypeRegistry, is_compliant};
