//! Le catalogue à identifiants stables.
//!
//! Toutes les mutations prennent le verrou en écriture le temps de
//! s'appliquer entièrement ; les lectures prennent le verrou partagé. Un
//! lecteur observe donc l'arbre avant ou après une mutation, jamais pendant.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

use crate::element::{MediaIndexElement, derive_id};
use crate::error::{IndexError, Result};

#[derive(Default)]
struct Inner {
    elements: HashMap<String, MediaIndexElement>,
    /// Enfants par parent, dans l'ordre d'insertion.
    children: HashMap<String, Vec<String>>,
    /// `(parent_id, path)` -> id
    locations: HashMap<(String, String), String>,
    /// `(id du RootNode, id de l'élément racine)`, dans l'ordre d'insertion.
    roots: Vec<(String, String)>,
}

impl Inner {
    fn insert(&mut self, mut element: MediaIndexElement) -> Result<String> {
        let location = (element.parent_id.clone(), element.path.clone());
        if self.locations.contains_key(&location) {
            return Err(IndexError::DuplicateElement {
                parent_id: location.0,
                path: location.1,
            });
        }

        if element.is_root && self.roots.iter().any(|(root_id, _)| *root_id == element.parent_id) {
            return Err(IndexError::RootAlreadyBound {
                root_id: element.parent_id,
            });
        }

        // Un élément déplacé par `update` peut occuper l'identifiant de base.
        let mut attempt = 0;
        let mut id = derive_id(&element.parent_id, &element.path, attempt);
        while self.elements.contains_key(&id) {
            attempt += 1;
            id = derive_id(&element.parent_id, &element.path, attempt);
        }
        element.id = id.clone();

        debug!(id = %id, parent_id = %element.parent_id, path = %element.path, "Indexing element");

        self.children
            .entry(element.parent_id.clone())
            .or_default()
            .push(id.clone());
        self.locations.insert(location, id.clone());
        if element.is_root {
            self.roots.push((element.parent_id.clone(), id.clone()));
        }
        self.elements.insert(id.clone(), element);

        Ok(id)
    }

    /// Identifiants de tous les descendants de `id` (exclu).
    fn descendants(&self, id: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.children.get(&current) {
                for child in children {
                    found.push(child.clone());
                    stack.push(child.clone());
                }
            }
        }
        found
    }

    fn detach(&mut self, id: &str) -> Option<MediaIndexElement> {
        let element = self.elements.remove(id)?;
        self.locations
            .remove(&(element.parent_id.clone(), element.path.clone()));
        if element.is_root {
            self.roots.retain(|(_, root)| root != id);
        }
        self.children.remove(id);
        Some(element)
    }

    fn remove_subtree(&mut self, id: &str) -> usize {
        if !self.elements.contains_key(id) {
            return 0;
        }

        let descendants = self.descendants(id);
        let mut removed = 0;
        for child in descendants.iter().rev() {
            if self.detach(child).is_some() {
                removed += 1;
            }
        }

        if let Some(element) = self.detach(id) {
            removed += 1;
            let parent = element.parent_id;
            let now_empty = match self.children.get_mut(&parent) {
                Some(siblings) => {
                    siblings.retain(|sibling| sibling != id);
                    siblings.is_empty()
                }
                None => false,
            };
            // Un parent virtuel (id de RootNode) n'existe que par ses enfants.
            if now_empty && !self.elements.contains_key(&parent) {
                self.children.remove(&parent);
            }
        }

        removed
    }
}

/// Le catalogue des médias.
///
/// # Examples
///
/// ```
/// use pmoindex::{MediaIndex, MediaIndexElement};
///
/// let index = MediaIndex::new();
/// let root = index.put(MediaIndexElement::new("5", "/movies", "Movies").root(true)).unwrap();
/// let child = index.put(MediaIndexElement::new(&root, "/movies/a.mkv", "a.mkv")).unwrap();
///
/// assert_eq!(index.children(&root).unwrap()[0].id, child);
/// assert_eq!(index.remove(&root), 2);
/// assert!(index.get(&child).is_err());
/// ```
#[derive(Default)]
pub struct MediaIndex {
    inner: RwLock<Inner>,
    update_id: AtomicU32,
}

impl std::fmt::Debug for MediaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaIndex")
            .field("len", &self.len())
            .field("update_id", &self.system_update_id())
            .finish()
    }
}

impl MediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insère un élément et retourne son identifiant.
    ///
    /// L'identifiant est dérivé de `(parent_id, path)` ; celui que porte
    /// `element` est ignoré. Si un élément déplacé par [`update`](Self::update)
    /// occupe déjà l'identifiant de base, un identifiant de repli est dérivé :
    /// celui-ci n'est stable que pour la durée de vie de l'index.
    ///
    /// # Errors
    ///
    /// - [`IndexError::DuplicateElement`] si `(parent_id, path)` est déjà indexé.
    /// - [`IndexError::RootAlreadyBound`] si l'élément est une racine et que
    ///   son `RootNode` porte déjà une autre racine.
    pub fn put(&self, element: MediaIndexElement) -> Result<String> {
        self.inner.write().insert(element)
    }

    /// Insère un lot d'éléments sous une seule section exclusive.
    ///
    /// Le résultat est rapporté élément par élément ; un doublon n'interrompt
    /// pas le lot.
    pub fn put_all(&self, elements: Vec<MediaIndexElement>) -> Vec<Result<String>> {
        let mut inner = self.inner.write();
        elements.into_iter().map(|e| inner.insert(e)).collect()
    }

    /// Remplace les enfants directs de `parent_id` par `entries`, sous une
    /// seule section exclusive.
    ///
    /// Les enfants dont le chemin ne figure plus dans `entries` sont retirés
    /// avec leurs descendants ; ceux qui y figurent gardent leur identifiant.
    /// Les entrées d'un autre parent sont ignorées.
    ///
    /// Retourne `(ajoutés, retirés)`.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotFound`] si `parent_id` n'existe plus ou ne porte plus
    /// `expected_path` ; l'index n'est alors pas modifié.
    pub fn sync_children(
        &self,
        parent_id: &str,
        expected_path: &str,
        entries: Vec<MediaIndexElement>,
    ) -> Result<(usize, usize)> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        match inner.elements.get(parent_id) {
            Some(parent) if parent.path == expected_path => {}
            _ => return Err(IndexError::NotFound(parent_id.to_string())),
        }

        let current: HashSet<&str> = entries
            .iter()
            .filter(|e| e.parent_id == parent_id)
            .map(|e| e.path.as_str())
            .collect();
        let stale: Vec<String> = inner
            .children
            .get(parent_id)
            .map(|ids| {
                ids.iter()
                    .filter(|id| {
                        inner
                            .elements
                            .get(id.as_str())
                            .is_some_and(|child| !current.contains(child.path.as_str()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(current);

        let removed: usize = stale.iter().map(|id| inner.remove_subtree(id)).sum();

        let mut added = 0;
        for entry in entries {
            if entry.parent_id != parent_id {
                debug!(parent_id = %parent_id, path = %entry.path, "Ignoring entry of another parent");
                continue;
            }
            match inner.insert(entry) {
                Ok(_) => added += 1,
                Err(IndexError::DuplicateElement { .. }) => {}
                Err(e) => debug!(parent_id = %parent_id, error = %e, "Entry not indexed"),
            }
        }

        Ok((added, removed))
    }

    pub fn get(&self, id: &str) -> Result<MediaIndexElement> {
        self.inner
            .read()
            .elements
            .get(id)
            .cloned()
            .ok_or_else(|| IndexError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().elements.contains_key(id)
    }

    /// Identifiant de l'élément indexé à `(parent_id, path)`, s'il existe.
    pub fn find(&self, parent_id: &str, path: &str) -> Option<String> {
        self.inner
            .read()
            .locations
            .get(&(parent_id.to_string(), path.to_string()))
            .cloned()
    }

    /// Enfants directs de `parent_id`, dans l'ordre d'insertion.
    ///
    /// `parent_id` peut désigner un élément ou un `RootNode` portant une
    /// racine.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotFound`] si `parent_id` n'est pas connu.
    pub fn children(&self, parent_id: &str) -> Result<Vec<MediaIndexElement>> {
        let inner = self.inner.read();
        match inner.children.get(parent_id) {
            Some(ids) => Ok(ids
                .iter()
                .filter_map(|id| inner.elements.get(id).cloned())
                .collect()),
            None if inner.elements.contains_key(parent_id) => Ok(Vec::new()),
            None => Err(IndexError::NotFound(parent_id.to_string())),
        }
    }

    /// Supprime un élément et tous ses descendants.
    ///
    /// Retourne le nombre d'éléments supprimés ; supprimer un identifiant
    /// absent n'est pas une erreur.
    pub fn remove(&self, id: &str) -> usize {
        let removed = self.inner.write().remove_subtree(id);
        if removed > 0 {
            info!(id = %id, removed, "Removed catalog subtree");
        }
        removed
    }

    /// Remplace le chemin et le nom d'un élément sans changer son identifiant
    /// ni son parent.
    ///
    /// Quand le chemin change, les descendants (issus de l'ancien chemin) sont
    /// retirés ; ils seront reproduits au prochain parcours.
    pub fn update(&self, id: &str, path: &str, name: &str) -> Result<()> {
        let mut inner = self.inner.write();
        let (parent_id, old_path) = match inner.elements.get(id) {
            Some(element) => (element.parent_id.clone(), element.path.clone()),
            None => return Err(IndexError::NotFound(id.to_string())),
        };

        if old_path != path {
            let target = (parent_id.clone(), path.to_string());
            if inner.locations.contains_key(&target) {
                return Err(IndexError::DuplicateElement {
                    parent_id,
                    path: path.to_string(),
                });
            }

            let stale: usize = inner
                .children
                .get(id)
                .cloned()
                .unwrap_or_default()
                .iter()
                .map(|child| inner.remove_subtree(child))
                .sum();
            if stale > 0 {
                debug!(id = %id, stale, "Dropped children of moved element");
            }

            inner.locations.remove(&(parent_id, old_path));
            inner.locations.insert(target, id.to_string());
        }

        if let Some(element) = inner.elements.get_mut(id) {
            element.path = path.to_string();
            element.name = name.to_string();
        }
        info!(id = %id, path = %path, name = %name, "Updated catalog element");
        Ok(())
    }

    /// L'élément racine porté par un `RootNode`.
    pub fn root_element(&self, root_id: &str) -> Option<MediaIndexElement> {
        let inner = self.inner.read();
        inner
            .roots
            .iter()
            .find(|(root, _)| root == root_id)
            .and_then(|(_, id)| inner.elements.get(id).cloned())
    }

    /// Toutes les racines de partage, dans l'ordre d'insertion.
    pub fn roots(&self) -> Vec<MediaIndexElement> {
        let inner = self.inner.read();
        inner
            .roots
            .iter()
            .filter_map(|(_, id)| inner.elements.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().elements.is_empty()
    }

    /// Retire les éléments locaux dont le chemin n'existe plus sur disque,
    /// avec leurs descendants. Les racines de partage ne sont jamais retirées.
    ///
    /// Retourne le nombre total d'éléments supprimés.
    pub fn clean(&self) -> usize {
        let candidates: Vec<(String, String)> = {
            let inner = self.inner.read();
            inner
                .elements
                .values()
                .filter(|e| e.is_local && !e.is_root)
                .map(|e| (e.id.clone(), e.path.clone()))
                .collect()
        };

        // Le disque est consulté hors verrou.
        let missing: Vec<String> = candidates
            .into_iter()
            .filter(|(_, path)| !Path::new(path).exists())
            .map(|(id, _)| id)
            .collect();

        if missing.is_empty() {
            return 0;
        }

        let mut inner = self.inner.write();
        let removed: usize = missing.iter().map(|id| inner.remove_subtree(id)).sum();
        info!(removed, "Cleaned missing local elements");
        removed
    }

    /// Compteur de mises à jour du catalogue, incrémenté à chaque événement
    /// de configuration appliqué.
    pub fn system_update_id(&self) -> u32 {
        self.update_id.load(Ordering::SeqCst)
    }

    pub(crate) fn bump_update_id(&self) -> u32 {
        self.update_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}
