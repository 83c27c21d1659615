use preload::base::PreloadProjectConfiguration;
use preload::loader::{LoadedAsset, ResourceManager, ResultStore};
use std::path::PathBuf;
use std::time::{Duration, Instant};

// How long the demo keeps pumping before it reports what is still outstanding and gives up
const MAX_WAIT: Duration = Duration::from_secs(30);

pub fn default_project_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

fn log_loaded_assets(results: &ResultStore<LoadedAsset>) {
    for (name, asset) in results.iter() {
        match asset {
            LoadedAsset::Texture(texture) => {
                log::info!("  {} texture {}x{}", name, texture.width, texture.height)
            }
            LoadedAsset::CubeTexture(cube_texture) => {
                let (width, height) = cube_texture.face_size();
                log::info!("  {} cube texture, faces {}x{}", name, width, height)
            }
            LoadedAsset::Model(model) => log::info!("  {} model {:?}", name, model),
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let search_location = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_project_path);
    let project_file = PreloadProjectConfiguration::locate_project_file(&search_location)?;
    let config = PreloadProjectConfiguration::read_from_path(&project_file)?;

    let mut resource_manager = ResourceManager::new(&config)?;
    resource_manager.on_ready(|results| {
        log::info!("resources ready, {} assets", results.len());
        log_loaded_assets(results);
    });
    resource_manager.start_from_manifest()?;

    let start_time = Instant::now();
    let mut frame_count = 0u64;
    loop {
        profiling::scope!("frame");
        std::thread::sleep(Duration::from_millis(15));
        resource_manager.update();
        frame_count += 1;

        if resource_manager.is_ready() {
            break;
        }

        if start_time.elapsed() > MAX_WAIT {
            let signal = resource_manager.signal();
            return Err(format!(
                "gave up after {:?}, {}/{} loaded, still waiting on {:?}",
                MAX_WAIT,
                signal.loaded_count(),
                signal.request_count(),
                signal.pending_requests()
            )
            .into());
        }

        profiling::finish_frame!();
    }

    // This is the point where a page would build its scene
    let env_map = resource_manager
        .get("environmentMapTexture")
        .and_then(LoadedAsset::as_cube_texture);
    let fox = resource_manager
        .get("foxModel")
        .and_then(LoadedAsset::as_model);
    log::info!(
        "Scene assets available after {} frames ({:?}): environment map {}, fox model {}",
        frame_count,
        start_time.elapsed(),
        env_map.is_some(),
        fox.is_some()
    );

    Ok(())
}

fn main() {
    // Setup logging
    env_logger::Builder::default()
        .write_style(env_logger::WriteStyle::Always)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use preload::base::{AssetKind, LoadBatch};

    #[test]
    fn shipped_project_parses() {
        let project_file =
            PreloadProjectConfiguration::locate_project_file(&default_project_path()).unwrap();
        let config = PreloadProjectConfiguration::read_from_path(&project_file).unwrap();
        assert!(config.asset_root_path.is_dir());

        let batch = LoadBatch::load_manifest_file(&config.sources_manifest_path).unwrap();
        let kinds: Vec<_> = batch.requests().iter().map(|x| x.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                AssetKind::CubeTexture,
                AssetKind::Model,
                AssetKind::Texture,
                AssetKind::Texture
            ]
        );
    }
}
