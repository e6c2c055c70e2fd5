use pmodevices::DeviceRegistry;
use pmodirectory::{BrowseError, ContentDirectoryService, EntryProducer, FolderScanner};
use pmoindex::{MediaCategory, MediaIndex, MediaIndexElement};
use pmomime::MimeTypeRegistry;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

fn service_with_scanner(index: Arc<MediaIndex>, devices: Arc<DeviceRegistry>) -> ContentDirectoryService {
    let mimes = Arc::new(MimeTypeRegistry::new());
    ContentDirectoryService::new(index, devices, mimes.clone())
        .with_producer(Arc::new(FolderScanner::new(mimes)))
}

fn local_root(index: &MediaIndex, root_id: &str, path: &str) -> String {
    index
        .put(
            MediaIndexElement::new(root_id, path, "Share")
                .with_category(MediaCategory::Video)
                .local(true)
                .root(true),
        )
        .unwrap()
}

#[test]
fn test_local_folder_is_scanned_on_browse() {
    let temp_dir = tempfile::tempdir().unwrap();
    let base = temp_dir.path();
    fs::write(base.join("a.mkv"), b"x").unwrap();
    fs::write(base.join("a.srt"), b"x").unwrap();
    fs::create_dir(base.join("season1")).unwrap();
    fs::write(base.join("season1/e01.mp4"), b"x").unwrap();

    let index = Arc::new(MediaIndex::new());
    let root = local_root(&index, "1", base.to_str().unwrap());
    let service = service_with_scanner(index.clone(), Arc::new(DeviceRegistry::new()));

    let children = service.browse("tv", &root).unwrap();
    let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["season1", "a.mkv"]);

    // Les identifiants restent stables d'un parcours à l'autre
    let again = service.browse("tv", &root).unwrap();
    assert_eq!(
        children.iter().map(|c| &c.id).collect::<Vec<_>>(),
        again.iter().map(|c| &c.id).collect::<Vec<_>>()
    );

    let season = service.browse("tv", &children[0].id).unwrap();
    assert_eq!(season.len(), 1);
    assert_eq!(season[0].name, "e01.mp4");

    // Un fichier supprimé disparaît au parcours suivant
    fs::remove_file(base.join("a.mkv")).unwrap();
    let after = service.browse("tv", &root).unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, children[0].id);
}

#[test]
fn test_browse_during_unrelated_delete() {
    let temp_dir = tempfile::tempdir().unwrap();
    for i in 0..20 {
        fs::write(temp_dir.path().join(format!("{i:02}.mkv")), b"x").unwrap();
    }

    let index = Arc::new(MediaIndex::new());
    let devices = Arc::new(DeviceRegistry::new());
    let stable = local_root(&index, "1", temp_dir.path().to_str().unwrap());
    let service = Arc::new(service_with_scanner(index.clone(), devices));
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let service = service.clone();
            let stable = stable.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let children = service.browse("tv", &stable).unwrap();
                    assert_eq!(children.len(), 20);
                    assert!(children.iter().all(|c| c.parent_id == stable));
                }
            })
        })
        .collect();

    for round in 0..30 {
        let branch = index
            .put(MediaIndexElement::new("2", format!("http://feed/{round}"), "Feed").root(true))
            .unwrap();
        let entries = (0..50)
            .map(|i| MediaIndexElement::new(&branch, format!("http://feed/{round}/{i}"), "ep"))
            .collect();
        index.put_all(entries);
        index.remove(&branch);
    }

    stop.store(true, Ordering::SeqCst);
    for reader in readers {
        reader.join().unwrap();
    }
}

/// Producteur qui modifie le catalogue pendant le parcours du dossier.
struct Interfering<F: Fn(&MediaIndex, &MediaIndexElement) + Send + Sync> {
    index: Arc<MediaIndex>,
    action: F,
}

impl<F: Fn(&MediaIndex, &MediaIndexElement) + Send + Sync> EntryProducer for Interfering<F> {
    fn produce(&self, parent: &MediaIndexElement) -> Vec<MediaIndexElement> {
        (self.action)(&self.index, parent);
        vec![MediaIndexElement::new(&parent.id, format!("{}/a.avi", parent.path), "a.avi")]
    }
}

fn interfering_service<F>(index: Arc<MediaIndex>, action: F) -> ContentDirectoryService
where
    F: Fn(&MediaIndex, &MediaIndexElement) + Send + Sync + 'static,
{
    let producer = Interfering {
        index: index.clone(),
        action,
    };
    ContentDirectoryService::new(
        index,
        Arc::new(DeviceRegistry::new()),
        Arc::new(MimeTypeRegistry::new()),
    )
    .with_producer(Arc::new(producer))
}

#[test]
fn test_share_deleted_during_scan() {
    let index = Arc::new(MediaIndex::new());
    let root = local_root(&index, "1", "/srv/movies");
    let service = interfering_service(index.clone(), |index, parent| {
        index.remove(&parent.id);
    });

    let result = service.browse("tv", &root);
    assert!(matches!(result, Err(BrowseError::ObjectNotFound(_))));
    assert!(index.is_empty());
    assert!(index.children(&root).is_err());
}

#[test]
fn test_share_moved_during_scan() {
    let index = Arc::new(MediaIndex::new());
    let root = local_root(&index, "1", "/srv/movies");
    let service = interfering_service(index.clone(), |index, parent| {
        index.update(&parent.id, "/srv/films", "Films").unwrap();
    });

    let children = service.browse("tv", &root).unwrap();
    assert!(children.is_empty());
    assert_eq!(index.len(), 1);
    assert_eq!(index.find(&root, "/srv/movies/a.avi"), None);
}

/// Alterne entre deux contenus de dossier, comme un fichier renommé.
struct Renaming {
    renamed: AtomicBool,
}

impl EntryProducer for Renaming {
    fn produce(&self, parent: &MediaIndexElement) -> Vec<MediaIndexElement> {
        let renamed = !self.renamed.fetch_xor(true, Ordering::SeqCst);
        let name = if renamed { "new.mkv" } else { "old.mkv" };
        vec![MediaIndexElement::new(&parent.id, format!("{}/{name}", parent.path), name)]
    }
}

#[test]
fn test_browse_during_rename() {
    let index = Arc::new(MediaIndex::new());
    let root = local_root(&index, "1", "/srv/movies");
    let service = Arc::new(
        ContentDirectoryService::new(
            index.clone(),
            Arc::new(DeviceRegistry::new()),
            Arc::new(MimeTypeRegistry::new()),
        )
        .with_producer(Arc::new(Renaming {
            renamed: AtomicBool::new(false),
        })),
    );
    assert_eq!(service.browse("tv", &root).unwrap().len(), 1);

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let index = index.clone();
            let root = root.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let children = index.children(&root).unwrap();
                    assert_eq!(children.len(), 1);
                }
            })
        })
        .collect();

    for _ in 0..200 {
        let children = service.browse("tv", &root).unwrap();
        assert_eq!(children.len(), 1);
    }

    stop.store(true, Ordering::SeqCst);
    for reader in readers {
        reader.join().unwrap();
    }
}
