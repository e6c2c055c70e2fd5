use serde::{Deserialize, Serialize};

/// Un renderer (client de navigation UPnP/DLNA), identifié par son adresse.
///
/// `mime_types` est la liste des formats annoncés par le device. `None`
/// signifie que le device n'a rien annoncé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderer {
    pub host: String,
    pub friendly_name: Option<String>,
    pub mime_types: Option<Vec<String>>,
}

impl Renderer {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            friendly_name: None,
            mime_types: None,
        }
    }

    pub fn with_mime_types(mut self, mime_types: Vec<String>) -> Self {
        self.mime_types = Some(mime_types);
        self
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }
}
