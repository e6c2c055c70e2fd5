//! # pmodidl - DIDL-Lite
//!
//! Modèle des documents DIDL-Lite échangés avec les clients UPnP/DLNA :
//! lecture (`parse`) et écriture (`to_xml`) via quick-xml et serde.

use serde::{Deserialize, Serialize};

pub const DIDL_NAMESPACE: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
pub const UPNP_NAMESPACE: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const DLNA_NAMESPACE: &str = "urn:schemas-dlna-org:metadata-1-0/";

/// Classes UPnP utilisées par le serveur.
pub mod class {
    pub const STORAGE_FOLDER: &str = "object.container.storageFolder";
    pub const VIDEO_ITEM: &str = "object.item.videoItem";
    pub const AUDIO_ITEM: &str = "object.item.audioItem";
    pub const IMAGE_ITEM: &str = "object.item.imageItem";
    pub const ITEM: &str = "object.item";
}

#[derive(Debug, thiserror::Error)]
pub enum DidlError {
    #[error("Failed to parse DIDL-Lite: {0}")]
    Parse(#[from] quick_xml::de::DeError),

    #[error("Failed to serialize DIDL-Lite: {0}")]
    Serialize(#[from] quick_xml::se::SeError),
}

// ============= Structures DIDL-Lite =============

/// Racine d'un document DIDL-Lite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DIDLLite {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:upnp", skip_serializing_if = "Option::is_none")]
    pub xmlns_upnp: Option<String>,

    #[serde(rename = "@xmlns:dc", skip_serializing_if = "Option::is_none")]
    pub xmlns_dc: Option<String>,

    #[serde(rename = "@xmlns:dlna", skip_serializing_if = "Option::is_none")]
    pub xmlns_dlna: Option<String>,

    #[serde(rename = "container", default)]
    pub containers: Vec<Container>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

/// Container (dossier ou racine de partage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted", skip_serializing_if = "Option::is_none")]
    pub restricted: Option<String>,

    #[serde(rename = "@childCount", skip_serializing_if = "Option::is_none")]
    pub child_count: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,

    #[serde(rename = "container", default)]
    pub containers: Vec<Container>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

/// Item (fichier vidéo, audio ou image)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted", skip_serializing_if = "Option::is_none")]
    pub restricted: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(
        rename = "dc:creator",
        alias = "creator",
        skip_serializing_if = "Option::is_none"
    )]
    pub creator: Option<String>,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,

    #[serde(
        rename = "dc:date",
        alias = "date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    #[serde(
        rename = "upnp:albumArtURI",
        alias = "albumArtURI",
        skip_serializing_if = "Option::is_none"
    )]
    pub album_art: Option<String>,

    #[serde(rename = "res", default)]
    pub resources: Vec<Resource>,
}

/// Ressource média
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "@protocolInfo")]
    pub protocol_info: String,

    #[serde(rename = "@size", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(rename = "@duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "@resolution", skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    #[serde(rename = "$text")]
    pub url: String,
}

// ============= Implémentation des méthodes =============

impl DIDLLite {
    /// Document avec les espaces de noms usuels.
    pub fn new(containers: Vec<Container>, items: Vec<Item>) -> Self {
        Self {
            xmlns: DIDL_NAMESPACE.to_string(),
            xmlns_upnp: Some(UPNP_NAMESPACE.to_string()),
            xmlns_dc: Some(DC_NAMESPACE.to_string()),
            xmlns_dlna: Some(DLNA_NAMESPACE.to_string()),
            containers,
            items,
        }
    }

    pub fn parse(input: &str) -> Result<Self, DidlError> {
        Ok(quick_xml::de::from_str(input)?)
    }

    /// Sérialise le document (sans déclaration XML).
    pub fn to_xml(&self) -> Result<String, DidlError> {
        Ok(quick_xml::se::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.containers.len() + self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.items.is_empty()
    }

    /// Itère sur tous les containers de manière récursive
    pub fn all_containers(&self) -> impl Iterator<Item = &Container> {
        AllContainersIter::new(&self.containers)
    }

    /// Itère sur tous les items de manière récursive
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        AllItemsIter::new(&self.containers, &self.items)
    }

    pub fn get_container_by_id(&self, id: &str) -> Option<&Container> {
        self.all_containers().find(|c| c.id == id)
    }

    pub fn get_item_by_id(&self, id: &str) -> Option<&Item> {
        self.all_items().find(|i| i.id == id)
    }
}

impl Container {
    /// Dossier de stockage en lecture seule.
    pub fn storage_folder(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        child_count: Option<usize>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            restricted: Some("1".to_string()),
            child_count: child_count.map(|c| c.to_string()),
            title: title.into(),
            class: class::STORAGE_FOLDER.to_string(),
            containers: Vec::new(),
            items: Vec::new(),
        }
    }
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            restricted: Some("1".to_string()),
            title: title.into(),
            creator: None,
            class: class.into(),
            date: None,
            album_art: None,
            resources: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Retourne la ressource principale (première disponible)
    pub fn primary_resource(&self) -> Option<&Resource> {
        self.resources.first()
    }
}

impl Resource {
    /// Ressource HTTP : `protocolInfo` vaut `http-get:*:<mime>:*`.
    pub fn http_get(mime_type: &str, url: impl Into<String>) -> Self {
        Self {
            protocol_info: format!("http-get:*:{}:*", mime_type),
            size: None,
            duration: None,
            resolution: None,
            url: url.into(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size.to_string());
        self
    }

    /// Type MIME extrait du `protocolInfo` (troisième champ).
    pub fn mime_type(&self) -> Option<&str> {
        self.protocol_info.split(':').nth(2).filter(|m| !m.is_empty())
    }
}

// ============= Itérateurs personnalisés =============

struct AllContainersIter<'a> {
    stack: Vec<&'a Container>,
}

impl<'a> AllContainersIter<'a> {
    fn new(containers: &'a [Container]) -> Self {
        Self {
            stack: containers.iter().collect(),
        }
    }
}

impl<'a> Iterator for AllContainersIter<'a> {
    type Item = &'a Container;

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.pop().map(|container| {
            self.stack.extend(container.containers.iter());
            container
        })
    }
}

struct AllItemsIter<'a> {
    containers: Vec<&'a Container>,
    current_items: std::slice::Iter<'a, Item>,
}

impl<'a> AllItemsIter<'a> {
    fn new(containers: &'a [Container], items: &'a [Item]) -> Self {
        Self {
            containers: containers.iter().collect(),
            current_items: items.iter(),
        }
    }
}

impl<'a> Iterator for AllItemsIter<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current_items.next() {
                return Some(item);
            }

            let container = self.containers.pop()?;
            self.containers.extend(container.containers.iter());
            self.current_items = container.items.iter();
        }
    }
}
