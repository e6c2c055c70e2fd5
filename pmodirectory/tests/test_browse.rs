use pmodevices::DeviceRegistry;
use pmodirectory::{BrowseError, ContentDirectory, ContentDirectoryService, ROOT_ID};
use pmodidl::DIDLLite;
use pmoindex::{
    ConfigurationEvent, ConfigurationEventBus, ConfigurationNode, MediaCategory, MediaIndex,
    MediaIndexElement, MediaIndexListener, RootNode,
};
use pmomime::MimeTypeRegistry;
use std::sync::Arc;

struct Fixture {
    index: Arc<MediaIndex>,
    devices: Arc<DeviceRegistry>,
    service: Arc<ContentDirectoryService>,
    share: String,
}

fn fixture() -> Fixture {
    let index = Arc::new(MediaIndex::new());
    let devices = Arc::new(DeviceRegistry::new());
    let mimes = Arc::new(MimeTypeRegistry::new());

    let share = index
        .put(
            MediaIndexElement::new("1", "http://feeds/videos", "Videos")
                .with_category(MediaCategory::Video)
                .root(true),
        )
        .unwrap();
    index
        .put(MediaIndexElement::new(&share, "http://feeds/videos/sf", "SF"))
        .unwrap();
    for name in ["alien.avi", "theme.mp3", "trailer.mp4"] {
        let mime = mimes.resolve(name).unwrap();
        index
            .put(
                MediaIndexElement::new(&share, format!("http://feeds/videos/{name}"), name)
                    .with_mime_type(mime),
            )
            .unwrap();
    }

    let service = Arc::new(ContentDirectoryService::new(
        index.clone(),
        devices.clone(),
        mimes,
    ));

    Fixture {
        index,
        devices,
        service,
        share,
    }
}

fn names(elements: &[MediaIndexElement]) -> Vec<&str> {
    elements.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_device_without_capabilities_sees_everything() {
    let f = fixture();
    f.devices.add_renderer("10.0.0.1", None);
    f.devices.add_renderer("10.0.0.2", Some(Vec::new()));

    for host in ["10.0.0.1", "10.0.0.2", "10.0.0.99"] {
        let children = f.service.browse(host, &f.share).unwrap();
        assert_eq!(
            names(&children),
            vec!["SF", "alien.avi", "theme.mp3", "trailer.mp4"]
        );
    }
}

#[test]
fn test_children_are_filtered_per_device() {
    let f = fixture();
    f.devices
        .add_renderer("tv", Some(vec!["VIDEO/X-MSVIDEO".to_string()]));
    f.devices
        .add_renderer("speaker", Some(vec!["audio/mpeg".to_string()]));
    f.devices
        .add_renderer("picky", Some(vec!["video/mpeg".to_string()]));

    assert_eq!(
        names(&f.service.browse("tv", &f.share).unwrap()),
        vec!["SF", "alien.avi"]
    );
    assert_eq!(
        names(&f.service.browse("speaker", &f.share).unwrap()),
        vec!["SF", "theme.mp3"]
    );
    assert_eq!(names(&f.service.browse("picky", &f.share).unwrap()), vec!["SF"]);
}

#[test]
fn test_unknown_object() {
    let f = fixture();
    assert!(matches!(
        f.service.browse("tv", "missing"),
        Err(BrowseError::ObjectNotFound(id)) if id == "missing"
    ));
}

#[test]
fn test_roots_ordered_by_category() {
    let f = fixture();
    f.index
        .put(
            MediaIndexElement::new("2", "/podcasts", "Podcasts")
                .with_category(MediaCategory::Podcast)
                .root(true),
        )
        .unwrap();
    f.index
        .put(
            MediaIndexElement::new("3", "/music", "Music")
                .with_category(MediaCategory::Audio)
                .root(true),
        )
        .unwrap();

    assert_eq!(
        names(&f.service.browse_roots()),
        vec!["Videos", "Music", "Podcasts"]
    );
    assert_eq!(f.service.browse("any", ROOT_ID).unwrap().len(), 3);
}

#[test]
fn test_didl_browse_direct_children_with_pagination() {
    let f = fixture();
    let directory = ContentDirectory::new(f.service.clone(), "http://10.0.0.5:8080/");

    let response = directory
        .browse("tv", &f.share, "BrowseDirectChildren", 1, 2)
        .unwrap();
    assert_eq!(response.number_returned, 2);
    assert_eq!(response.total_matches, 4);

    let didl = DIDLLite::parse(&response.didl).unwrap();
    assert!(didl.containers.is_empty());
    assert_eq!(didl.items.len(), 2);
    assert_eq!(didl.items[0].title, "alien.avi");
    assert_eq!(didl.items[0].class, "object.item.videoItem");
    assert_eq!(didl.items[1].class, "object.item.audioItem");
    assert_eq!(didl.items[0].parent_id, f.share);

    let res = didl.items[0].primary_resource().unwrap();
    assert_eq!(res.protocol_info, "http-get:*:video/x-msvideo:*");
    assert_eq!(
        res.url,
        format!("http://10.0.0.5:8080/content/{}", didl.items[0].id)
    );

    let all = directory
        .browse("tv", &f.share, "BrowseDirectChildren", 0, 0)
        .unwrap();
    assert_eq!(all.number_returned, 4);

    let past_end = directory
        .browse("tv", &f.share, "BrowseDirectChildren", 10, 5)
        .unwrap();
    assert_eq!(past_end.number_returned, 0);
    assert_eq!(past_end.total_matches, 4);
}

#[test]
fn test_didl_root_metadata_and_listing() {
    let f = fixture();
    let directory = ContentDirectory::new(f.service.clone(), "http://h:1").with_title("Home");

    let meta = directory.browse("tv", ROOT_ID, "BrowseMetadata", 0, 0).unwrap();
    let didl = DIDLLite::parse(&meta.didl).unwrap();
    assert_eq!(didl.containers[0].id, "0");
    assert_eq!(didl.containers[0].parent_id, "-1");
    assert_eq!(didl.containers[0].title, "Home");
    assert_eq!(didl.containers[0].child_count.as_deref(), Some("1"));

    let roots = directory
        .browse("tv", ROOT_ID, "BrowseDirectChildren", 0, 0)
        .unwrap();
    let didl = DIDLLite::parse(&roots.didl).unwrap();
    assert_eq!(didl.containers.len(), 1);
    assert_eq!(didl.containers[0].id, f.share);
    assert_eq!(didl.containers[0].parent_id, "0");
    assert_eq!(didl.containers[0].class, "object.container.storageFolder");

    let share_meta = directory
        .browse("tv", &f.share, "BrowseMetadata", 0, 0)
        .unwrap();
    assert_eq!(share_meta.number_returned, 1);
    assert!(share_meta.didl.contains("Videos"));
}

#[test]
fn test_didl_errors() {
    let f = fixture();
    let directory = ContentDirectory::new(f.service.clone(), "http://h:1");

    assert!(matches!(
        directory.browse("tv", &f.share, "Nope", 0, 0),
        Err(BrowseError::InvalidBrowseFlag(_))
    ));
    assert!(matches!(
        directory.browse("tv", "missing", "BrowseMetadata", 0, 0),
        Err(BrowseError::ObjectNotFound(_))
    ));
    assert!(matches!(
        directory.browse("tv", "missing", "BrowseDirectChildren", 0, 0),
        Err(BrowseError::ObjectNotFound(_))
    ));
}

#[test]
fn test_update_id_follows_configuration_events() {
    let f = fixture();
    let directory = ContentDirectory::new(f.service.clone(), "http://h:1");
    let bus = ConfigurationEventBus::new();
    bus.subscribe(Arc::new(MediaIndexListener::new(f.index.clone())));

    assert_eq!(directory.system_update_id(), 0);
    let node = ConfigurationNode::new("c7", "Photos", "/photos");
    let root = RootNode::new("7", MediaCategory::Picture, true);
    bus.publish(&ConfigurationEvent::Add {
        node: node.clone(),
        root: root.clone(),
    });
    bus.publish(&ConfigurationEvent::Delete { node, root });

    let response = directory
        .browse("tv", ROOT_ID, "BrowseDirectChildren", 0, 0)
        .unwrap();
    assert_eq!(response.update_id, 2);
    assert_eq!(response.number_returned, 1);
}
