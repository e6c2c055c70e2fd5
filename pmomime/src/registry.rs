//! Résolution des types MIME et filtre de conformité par device.

use std::collections::HashMap;
use std::path::Path;

use crate::mime_type::MimeType;
use crate::table::EXTENSIONS;

/// Registre des types MIME connus, indexés par extension de fichier.
///
/// Le registre est immuable une fois construit : il peut être partagé entre
/// threads (`Arc<MimeTypeRegistry>`) sans verrou.
///
/// # Examples
///
/// ```
/// use pmomime::MimeTypeRegistry;
///
/// let registry = MimeTypeRegistry::new();
/// let mime = registry.resolve("movie.avi").unwrap();
/// assert_eq!(mime.mime_type(), "video/x-msvideo");
/// assert!(registry.resolve("movie.blabla").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MimeTypeRegistry {
    by_extension: HashMap<String, MimeType>,
}

impl MimeTypeRegistry {
    /// Crée un registre à partir de la table d'extensions intégrée.
    pub fn new() -> Self {
        Self::with_extensions(EXTENSIONS.iter().copied())
    }

    /// Crée un registre à partir d'une table `(extension, type MIME)`.
    ///
    /// Les entrées dont le type MIME est mal formé sont ignorées.
    pub fn with_extensions<'a, I>(extensions: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut by_extension = HashMap::new();
        for (ext, mime) in extensions {
            match MimeType::parse(mime) {
                Some(mime_type) => {
                    by_extension.insert(ext.to_ascii_lowercase(), mime_type);
                }
                None => tracing::warn!(extension = %ext, mime = %mime, "Ignoring malformed MIME type"),
            }
        }
        Self { by_extension }
    }

    /// Nombre d'extensions connues.
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }

    /// Résout le type MIME d'un nom de fichier d'après son extension.
    ///
    /// `None` est un résultat normal : le fichier n'est pas un contenu
    /// diffusable et doit être écarté silencieusement des listings.
    pub fn resolve(&self, file_name: &str) -> Option<MimeType> {
        let ext = Path::new(file_name).extension()?.to_str()?;
        self.by_extension.get(&ext.to_ascii_lowercase()).cloned()
    }

    /// Vérifie qu'un type MIME est accepté par un device.
    ///
    /// Un device sans liste de capacités (absente ou vide) accepte tout.
    /// Sinon la chaîne `type/subtype` doit figurer dans la liste, sans tenir
    /// compte de la casse.
    pub fn is_compliant(&self, mime_type: &MimeType, available: Option<&[String]>) -> bool {
        is_compliant(mime_type, available)
    }
}

impl Default for MimeTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Version libre de [`MimeTypeRegistry::is_compliant`], sans état.
pub fn is_compliant(mime_type: &MimeType, available: Option<&[String]>) -> bool {
    match available {
        None => true,
        Some([]) => true,
        Some(list) => list
            .iter()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(mime_type.mime_type())),
    }
}
