//! # ContentDirectory - Réponses Browse au format DIDL-Lite
//!
//! Traduit les appels `Browse` des clients UPnP/DLNA en requêtes sur le
//! [`ContentDirectoryService`] et met en forme le résultat :
//!
//! - **BrowseMetadata** : l'objet lui-même
//! - **BrowseDirectChildren** : ses enfants, paginés
//! - **Update ID** : compteur de mises à jour du catalogue

use pmodidl::{Container, DIDLLite, Item, Resource, class};
use pmoindex::MediaIndexElement;
use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::error::{BrowseError, Result};
use crate::service::{ContentDirectoryService, ROOT_ID, ROOT_PARENT_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseFlag {
    BrowseMetadata,
    BrowseDirectChildren,
}

impl FromStr for BrowseFlag {
    type Err = BrowseError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "BrowseMetadata" => Ok(BrowseFlag::BrowseMetadata),
            "BrowseDirectChildren" => Ok(BrowseFlag::BrowseDirectChildren),
            other => Err(BrowseError::InvalidBrowseFlag(other.to_string())),
        }
    }
}

/// Résultat d'un appel `Browse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseResponse {
    pub didl: String,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: u32,
}

pub struct ContentDirectory {
    service: Arc<ContentDirectoryService>,
    base_url: String,
    title: String,
}

impl ContentDirectory {
    /// `base_url` préfixe les URL de contenu (`<base_url>/content/<id>`).
    pub fn new(service: Arc<ContentDirectoryService>, base_url: impl Into<String>) -> Self {
        Self {
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            title: "PMOHome".to_string(),
        }
    }

    /// Titre de la racine synthétique.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn content_url(&self, id: &str) -> String {
        format!("{}/content/{}", self.base_url, id)
    }

    pub fn system_update_id(&self) -> u32 {
        self.service.index().system_update_id()
    }

    /// Browse un objet ou ses enfants.
    ///
    /// * `host` - adresse du device appelant (filtre MIME)
    /// * `object_id` - `"0"` pour la racine
    /// * `browse_flag` - `"BrowseMetadata"` ou `"BrowseDirectChildren"`
    /// * `requested_count` - `0` pour tout
    pub fn browse(
        &self,
        host: &str,
        object_id: &str,
        browse_flag: &str,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseResponse> {
        debug!(
            host = %host,
            object_id = %object_id,
            browse_flag = %browse_flag,
            starting_index,
            requested_count,
            "ContentDirectory::Browse"
        );

        match browse_flag.parse::<BrowseFlag>()? {
            BrowseFlag::BrowseMetadata => self.browse_metadata(object_id),
            BrowseFlag::BrowseDirectChildren => {
                self.browse_direct_children(host, object_id, starting_index, requested_count)
            }
        }
    }

    fn browse_metadata(&self, object_id: &str) -> Result<BrowseResponse> {
        let didl = if object_id == ROOT_ID {
            let count = self.service.browse_roots().len();
            DIDLLite::new(
                vec![Container::storage_folder(
                    ROOT_ID,
                    ROOT_PARENT_ID,
                    self.title.clone(),
                    Some(count),
                )],
                Vec::new(),
            )
        } else {
            let element = self
                .service
                .index()
                .get(object_id)
                .map_err(|_| BrowseError::ObjectNotFound(object_id.to_string()))?;
            let (containers, items) = self.to_didl(std::slice::from_ref(&element));
            DIDLLite::new(containers, items)
        };

        Ok(BrowseResponse {
            didl: didl.to_xml()?,
            number_returned: 1,
            total_matches: 1,
            update_id: self.system_update_id(),
        })
    }

    fn browse_direct_children(
        &self,
        host: &str,
        object_id: &str,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseResponse> {
        let children = self.service.browse(host, object_id)?;

        // Appliquer la pagination
        let total = children.len();
        let start = (starting_index as usize).min(total);
        let count = if requested_count == 0 {
            total - start
        } else {
            requested_count as usize
        };
        let page: Vec<_> = children.into_iter().skip(start).take(count).collect();

        let (containers, items) = self.to_didl(&page);
        let didl = DIDLLite::new(containers, items);

        Ok(BrowseResponse {
            didl: didl.to_xml()?,
            number_returned: page.len() as u32,
            total_matches: total as u32,
            update_id: self.system_update_id(),
        })
    }

    fn to_didl(&self, elements: &[MediaIndexElement]) -> (Vec<Container>, Vec<Item>) {
        let mut containers = Vec::new();
        let mut items = Vec::new();

        for element in elements {
            // Les racines de partage sont présentées sous la racine synthétique.
            let parent_id = if element.is_root {
                ROOT_ID
            } else {
                element.parent_id.as_str()
            };

            match &element.mime_type {
                None => containers.push(Container::storage_folder(
                    element.id.clone(),
                    parent_id,
                    element.name.clone(),
                    None,
                )),
                Some(mime) => {
                    let upnp_class = if mime.is_video() {
                        class::VIDEO_ITEM
                    } else if mime.is_audio() {
                        class::AUDIO_ITEM
                    } else if mime.is_image() {
                        class::IMAGE_ITEM
                    } else {
                        class::ITEM
                    };

                    let mut resource =
                        Resource::http_get(mime.mime_type(), self.content_url(&element.id));
                    if element.is_local {
                        if let Ok(meta) = fs::metadata(&element.path) {
                            resource = resource.with_size(meta.len());
                        }
                    }

                    items.push(
                        Item::new(element.id.clone(), parent_id, element.name.clone(), upnp_class)
                            .with_resource(resource),
                    );
                }
            }
        }

        (containers, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_flag() {
        assert_eq!(
            "BrowseMetadata".parse::<BrowseFlag>().unwrap(),
            BrowseFlag::BrowseMetadata
        );
        assert_eq!(
            "BrowseDirectChildren".parse::<BrowseFlag>().unwrap(),
            BrowseFlag::BrowseDirectChildren
        );
        assert!(matches!(
            "browse".parse::<BrowseFlag>(),
            Err(BrowseError::InvalidBrowseFlag(_))
        ));
    }
}
