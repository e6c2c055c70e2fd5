//! # pmodirectory - Navigation dans le catalogue
//!
//! - [`ContentDirectoryService`] : enfants d'un objet du catalogue, filtrés
//!   selon les types MIME acceptés par le device appelant.
//! - [`FolderScanner`] : peuple les dossiers locaux à la demande.
//! - [`ContentDirectory`] : réponses `Browse` au format DIDL-Lite, paginées.

mod directory;
mod error;
mod scanner;
mod service;

pub use directory::{BrowseFlag, BrowseResponse, ContentDirectory};
pub use error::{BrowseError, Result};
pub use scanner::{EntryProducer, FolderScanner};
pub use service::{ContentDirectoryService, ROOT_ID, ROOT_PARENT_ID};
