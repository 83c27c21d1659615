pub mod assets;
mod disk_io;
pub mod loader;

pub use crate::assets::{CubeTextureAsset, LoadedAsset, ModelAsset, TextureAsset};
pub use crate::disk_io::DiskAssetIO;
pub use crate::loader::{
    AssetReadySignal, LoadCompleteResult, LoadFailedResult, LoaderEvent, LoaderIO, ReadyState,
    ReadySubscription, ResultStore,
};

use preload_base::{LoadBatch, PreloadProjectConfiguration, PreloadResult};
use std::path::PathBuf;


// Typical flow for a page/session:
//
// - Read the project configuration
// - Create one ResourceManager and hand references to it to whatever builds the scene
// - Subscribe with on_ready() the code that needs the loaded assets
// - Start the batch from the source manifest
// - Call update() once per frame until the batch is ready
//
// Requests that fail are logged and keep the batch pending forever. There is no timeout and no
// cancellation.

/// Owns the disk IO and the ready signal for the assets of one session
pub struct ResourceManager {
    sources_manifest_path: PathBuf,
    signal: AssetReadySignal<LoadedAsset>,
}

impl ResourceManager {
    pub fn new(config: &PreloadProjectConfiguration) -> PreloadResult<Self> {
        let (loader_events_tx, loader_events_rx) = crossbeam_channel::unbounded();

        let asset_io = DiskAssetIO::new(
            config.asset_root_path.clone(),
            config.io_thread_count,
            loader_events_tx,
        )?;
        let signal = AssetReadySignal::new(Box::new(asset_io), loader_events_rx);

        Ok(ResourceManager {
            sources_manifest_path: config.sources_manifest_path.clone(),
            signal,
        })
    }

    pub fn start(
        &mut self,
        batch: LoadBatch,
    ) -> PreloadResult<()> {
        self.signal.start(batch)
    }

    // Reads the configured source manifest and starts loading everything in it
    pub fn start_from_manifest(&mut self) -> PreloadResult<()> {
        let batch = LoadBatch::load_manifest_file(&self.sources_manifest_path)?;
        log::info!("Loading {} assets", batch.len());
        self.start(batch)
    }

    pub fn on_ready<F>(
        &mut self,
        callback: F,
    ) -> ReadySubscription
    where
        F: FnOnce(&ResultStore<LoadedAsset>) + 'static,
    {
        self.signal.on_ready(callback)
    }

    pub fn signal(&self) -> &AssetReadySignal<LoadedAsset> {
        &self.signal
    }

    pub fn signal_mut(&mut self) -> &mut AssetReadySignal<LoadedAsset> {
        &mut self.signal
    }

    pub fn is_ready(&self) -> bool {
        self.signal.is_ready()
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&LoadedAsset> {
        self.signal.get(name)
    }

    pub fn update(&mut self) {
        self.signal.update();
    }
}
