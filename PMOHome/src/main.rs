mod logs;

use pmoairplay::AirplayClient;
use pmoconfig::get_config;
use pmodevices::DeviceRegistry;
use pmodirectory::{ContentDirectory, ContentDirectoryService, FolderScanner};
use pmoindex::{ConfigurationEvent, ConfigurationEventBus, MediaIndex, MediaIndexListener};
use pmomime::MimeTypeRegistry;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();
    logs::init_logging(&config);

    // ========== PHASE 1 : Registres ==========

    let mimes = Arc::new(MimeTypeRegistry::new());
    let devices = Arc::new(DeviceRegistry::new());
    let index = Arc::new(MediaIndex::new());
    info!(extensions = mimes.len(), "MIME registry ready");

    // ========== PHASE 2 : Services ==========

    let bus = Arc::new(ConfigurationEventBus::new());
    bus.subscribe(Arc::new(MediaIndexListener::new(index.clone())));

    let service = Arc::new(
        ContentDirectoryService::new(index.clone(), devices.clone(), mimes.clone())
            .with_producer(Arc::new(FolderScanner::new(mimes.clone()))),
    );
    let directory = ContentDirectory::new(service, config.get_base_url())
        .with_title(config.get_friendly_name());
    info!(content_url = %directory.content_url("{id}"), "ContentDirectory ready");

    let airplay = AirplayClient::new(devices.clone(), config.get_airplay_timeout());
    info!(timeout = ?airplay.timeout(), "Airplay client ready");

    // ========== PHASE 3 : Partages ==========

    let dispatcher = bus.start_dispatcher()?;

    let shares = config.get_shares();
    info!("📂 {} share(s) configured", shares.len());
    for share in shares {
        info!(id = %share.id, category = %share.category, path = %share.path, "  - {}", share.label);
        let (root, node) = share.to_nodes();
        if !dispatcher.submit(ConfigurationEvent::Add { node, root }) {
            warn!(id = %share.id, "Configuration dispatcher is stopped");
        }
    }

    info!("✅ PMOHome is ready!");
    info!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    dispatcher.shutdown();
    info!(
        roots = index.roots().len(),
        elements = index.len(),
        update_id = directory.system_update_id(),
        "Index state at shutdown"
    );

    Ok(())
}
