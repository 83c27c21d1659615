use crate::assets::{CubeTextureAsset, LoadedAsset, ModelAsset, TextureAsset};
use crate::loader::{LoadCompleteResult, LoadFailedResult, LoaderEvent, LoaderIO};
use crossbeam_channel::{Receiver, Sender};
use image::GenericImageView;
use preload_base::{LoadHandle, PreloadResult, CUBE_FACE_COUNT};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

enum DiskAssetIORequest {
    Texture {
        load_handle: LoadHandle,
        path: String,
    },
    CubeTexture {
        load_handle: LoadHandle,
        face_paths: [String; CUBE_FACE_COUNT],
    },
    Model {
        load_handle: LoadHandle,
        path: String,
    },
}

impl DiskAssetIORequest {
    fn load_handle(&self) -> LoadHandle {
        match self {
            DiskAssetIORequest::Texture { load_handle, .. } => *load_handle,
            DiskAssetIORequest::CubeTexture { load_handle, .. } => *load_handle,
            DiskAssetIORequest::Model { load_handle, .. } => *load_handle,
        }
    }
}

fn decode_texture(path: &Path) -> Result<TextureAsset, String> {
    profiling::scope!("decode_texture");
    let decoded_image =
        image::open(path).map_err(|e| format!("could not decode image {:?}: {}", path, e))?;

    let (width, height) = decoded_image.dimensions();
    let rgba8 = decoded_image.into_rgba8().into_raw();
    Ok(TextureAsset {
        width,
        height,
        rgba8,
    })
}

fn decode_cube_texture(
    root_path: &Path,
    face_paths: &[String; CUBE_FACE_COUNT],
) -> Result<CubeTextureAsset, String> {
    profiling::scope!("decode_cube_texture");
    let mut faces = Vec::with_capacity(CUBE_FACE_COUNT);
    for face_path in face_paths {
        faces.push(decode_texture(&root_path.join(face_path))?);
    }

    let (width, height) = (faces[0].width, faces[0].height);
    for (face_index, face) in faces.iter().enumerate() {
        if face.width != width || face.height != height {
            return Err(format!(
                "cube texture face {} is {}x{}, expected {}x{}",
                face_index, face.width, face.height, width, height
            ));
        }
    }

    let faces: [TextureAsset; CUBE_FACE_COUNT] = faces
        .try_into()
        .map_err(|_| "cube texture face count mismatch".to_string())?;
    Ok(CubeTextureAsset { faces })
}

fn decode_model(path: &Path) -> Result<ModelAsset, String> {
    profiling::scope!("decode_model");
    let (document, buffers, images) =
        gltf::import(path).map_err(|e| format!("gltf import of {:?} failed: {}", path, e))?;
    Ok(ModelAsset {
        document,
        buffers,
        images,
    })
}

fn process_request(
    root_path: &Path,
    request: &DiskAssetIORequest,
) -> Result<LoadedAsset, String> {
    match request {
        DiskAssetIORequest::Texture { path, .. } => {
            decode_texture(&root_path.join(path)).map(LoadedAsset::Texture)
        }
        DiskAssetIORequest::CubeTexture { face_paths, .. } => {
            decode_cube_texture(root_path, face_paths).map(LoadedAsset::CubeTexture)
        }
        DiskAssetIORequest::Model { path, .. } => {
            decode_model(&root_path.join(path)).map(LoadedAsset::Model)
        }
    }
}

// Thread that tries to take jobs out of the request channel and ends when the finish channel is signalled
struct DiskAssetIOWorkerThread {
    finish_tx: Sender<()>,
    join_handle: JoinHandle<()>,
}

impl DiskAssetIOWorkerThread {
    fn new(
        root_path: Arc<PathBuf>,
        request_rx: Receiver<DiskAssetIORequest>,
        result_tx: Sender<LoaderEvent<LoadedAsset>>,
        active_request_count: Arc<AtomicUsize>,
        thread_index: usize,
    ) -> PreloadResult<Self> {
        let (finish_tx, finish_rx) = crossbeam_channel::bounded(1);
        let join_handle = std::thread::Builder::new()
            .name(format!("IO Thread {}", thread_index))
            .spawn(move || {
                profiling::register_thread!(&format!("DiskAssetIOWorkerThread {}", thread_index));
                loop {
                    crossbeam_channel::select! {
                        recv(request_rx) -> msg => {
                            let request = match msg {
                                Ok(request) => request,
                                // The pool dropped its sender, nothing more will arrive
                                Err(_) => return,
                            };

                            let load_handle = request.load_handle();
                            log::trace!("Start read {:?}", load_handle);
                            let event = match process_request(&root_path, &request) {
                                Ok(asset) => LoaderEvent::LoadComplete(LoadCompleteResult {
                                    load_handle,
                                    asset,
                                }),
                                Err(error) => LoaderEvent::LoadFailed(LoadFailedResult {
                                    load_handle,
                                    error,
                                }),
                            };

                            if result_tx.send(event).is_err() {
                                log::debug!("Result for {:?} dropped, signal no longer exists", load_handle);
                            }
                            active_request_count.fetch_sub(1, Ordering::Release);
                        },
                        recv(finish_rx) -> _msg => {
                            return;
                        }
                    }
                }
            })?;

        Ok(DiskAssetIOWorkerThread {
            finish_tx,
            join_handle,
        })
    }
}

// Spans N threads, proxies messages to/from them, and kills the threads when the pool is dropped
struct DiskAssetIOThreadPool {
    worker_threads: Vec<DiskAssetIOWorkerThread>,
    request_tx: Sender<DiskAssetIORequest>,
    active_request_count: Arc<AtomicUsize>,
}

impl DiskAssetIOThreadPool {
    fn new(
        root_path: Arc<PathBuf>,
        max_requests_in_flight: usize,
        result_tx: Sender<LoaderEvent<LoadedAsset>>,
    ) -> PreloadResult<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<DiskAssetIORequest>();
        let active_request_count = Arc::new(AtomicUsize::new(0));

        let mut worker_threads = Vec::with_capacity(max_requests_in_flight);
        for thread_index in 0..max_requests_in_flight {
            let worker = DiskAssetIOWorkerThread::new(
                root_path.clone(),
                request_rx.clone(),
                result_tx.clone(),
                active_request_count.clone(),
                thread_index,
            )?;
            worker_threads.push(worker);
        }

        Ok(DiskAssetIOThreadPool {
            request_tx,
            worker_threads,
            active_request_count,
        })
    }

    fn add_request(
        &self,
        request: DiskAssetIORequest,
    ) {
        self.active_request_count.fetch_add(1, Ordering::Release);
        if self.request_tx.send(request).is_err() {
            // Workers hold the receiver until the pool is finished, so this only happens during drop
            self.active_request_count.fetch_sub(1, Ordering::Release);
            log::error!("IO request dropped, no worker threads are running");
        }
    }

    fn active_request_count(&self) -> usize {
        self.active_request_count.load(Ordering::Acquire)
    }

    fn finish(self) {
        for worker_thread in &self.worker_threads {
            let _ = worker_thread.finish_tx.send(());
        }

        for worker_thread in self.worker_threads {
            if worker_thread.join_handle.join().is_err() {
                log::error!("IO worker thread panicked");
            }
        }
    }
}

/// Reads and decodes assets from a directory on a pool of worker threads. Request paths are
/// relative to the root directory.
pub struct DiskAssetIO {
    thread_pool: Option<DiskAssetIOThreadPool>,
    root_path: Arc<PathBuf>,
}

impl Drop for DiskAssetIO {
    fn drop(&mut self) {
        if let Some(thread_pool) = self.thread_pool.take() {
            thread_pool.finish();
        }
    }
}

impl DiskAssetIO {
    pub fn new(
        asset_root_path: PathBuf,
        io_thread_count: usize,
        tx: Sender<LoaderEvent<LoadedAsset>>,
    ) -> PreloadResult<Self> {
        if !asset_root_path.is_dir() {
            return Err(format!("Asset root {:?} is not a directory", asset_root_path).into());
        }

        let root_path = Arc::new(asset_root_path);
        let thread_pool = Some(DiskAssetIOThreadPool::new(
            root_path.clone(),
            io_thread_count.max(1),
            tx,
        )?);

        Ok(DiskAssetIO {
            thread_pool,
            root_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    // Requests queued or being decoded right now
    pub fn active_request_count(&self) -> usize {
        self.thread_pool
            .as_ref()
            .map(|thread_pool| thread_pool.active_request_count())
            .unwrap_or(0)
    }

    fn add_request(
        &self,
        request: DiskAssetIORequest,
    ) {
        if let Some(thread_pool) = &self.thread_pool {
            thread_pool.add_request(request);
        }
    }
}

impl LoaderIO<LoadedAsset> for DiskAssetIO {
    fn load_texture(
        &self,
        load_handle: LoadHandle,
        path: &str,
    ) {
        log::debug!("load_texture {:?} {}", load_handle, path);
        self.add_request(DiskAssetIORequest::Texture {
            load_handle,
            path: path.to_string(),
        });
    }

    fn load_cube_texture(
        &self,
        load_handle: LoadHandle,
        face_paths: &[String; CUBE_FACE_COUNT],
    ) {
        log::debug!("load_cube_texture {:?} {:?}", load_handle, face_paths);
        self.add_request(DiskAssetIORequest::CubeTexture {
            load_handle,
            face_paths: face_paths.clone(),
        });
    }

    fn load_model(
        &self,
        load_handle: LoadHandle,
        path: &str,
    ) {
        log::debug!("load_model {:?} {}", load_handle, path);
        self.add_request(DiskAssetIORequest::Model {
            load_handle,
            path: path.to_string(),
        });
    }
}
