use crossbeam_channel::Receiver;
use preload_base::hashing::HashMap;
use preload_base::{
    AssetKind, AssetName, AssetPath, LoadBatch, LoadHandle, LoadState, PreloadError,
    PreloadResult, CUBE_FACE_COUNT,
};

//
// Interface for IO
//
// Every request in a batch is handed to the IO layer with a load handle. The IO layer does the
// work however it likes (worker threads, cached data, synchronously inside the call) and reports
// back by sending a LoaderEvent carrying the same load handle. Events are only applied when the
// owner of the signal calls update(), so all bookkeeping happens on one thread.
//

// Represents the three external load primitives: single image texture, six-face cube texture and
// 3D model package
pub trait LoaderIO<A>: Send + Sync {
    fn load_texture(
        &self,
        load_handle: LoadHandle,
        path: &str,
    );

    // Face paths are ordered +X, -X, +Y, -Y, +Z, -Z
    fn load_cube_texture(
        &self,
        load_handle: LoadHandle,
        face_paths: &[String; CUBE_FACE_COUNT],
    );

    fn load_model(
        &self,
        load_handle: LoadHandle,
        path: &str,
    );
}

// Sent by LoaderIO when a request produced an asset
pub struct LoadCompleteResult<A> {
    pub load_handle: LoadHandle,
    pub asset: A,
}

impl<A> std::fmt::Debug for LoadCompleteResult<A> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoadCompleteResult")
            .field("load_handle", &self.load_handle)
            .finish()
    }
}

// Sent by LoaderIO when a request could not produce an asset. This is reported in the log only, the
// request stays pending and the batch will never become ready.
#[derive(Debug)]
pub struct LoadFailedResult {
    pub load_handle: LoadHandle,
    pub error: String,
}

pub enum LoaderEvent<A> {
    LoadComplete(LoadCompleteResult<A>),
    LoadFailed(LoadFailedResult),
}

impl<A> std::fmt::Debug for LoaderEvent<A> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            LoaderEvent::LoadComplete(result) => f.debug_tuple("LoadComplete").field(result).finish(),
            LoaderEvent::LoadFailed(result) => f.debug_tuple("LoadFailed").field(result).finish(),
        }
    }
}

/// Loaded assets keyed by the name of the request that produced them.
pub struct ResultStore<A> {
    assets: HashMap<AssetName, A>,
}

impl<A> Default for ResultStore<A> {
    fn default() -> Self {
        ResultStore {
            assets: Default::default(),
        }
    }
}

impl<A> ResultStore<A> {
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&A> {
        self.assets.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.assets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetName, &A)> {
        self.assets.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &AssetName> {
        self.assets.keys()
    }

    fn insert(
        &mut self,
        name: AssetName,
        asset: A,
    ) -> Option<A> {
        self.assets.insert(name, asset)
    }
}

impl<A> std::fmt::Debug for ResultStore<A> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_set().entries(self.assets.keys()).finish()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ReadyState {
    // Fewer completions than requests so far
    Pending,
    // Every request completed and the ready callbacks have run
    Ready,
}

/// Returned by `on_ready`, can be used to remove the callback before it runs
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ReadySubscription(u64);

type ReadyCallback<A> = Box<dyn FnOnce(&ResultStore<A>)>;

struct RequestInfo {
    name: AssetName,
    kind: AssetKind,
    load_state: LoadState,
}

/// Dispatches a fixed batch of loads and notifies subscribers exactly once, when the last of them
/// has completed.
pub struct AssetReadySignal<A> {
    // The data source requests are dispatched to
    loader_io: Box<dyn LoaderIO<A>>,
    // Completions reported by the loader IO, drained in update()
    events_rx: Receiver<LoaderEvent<A>>,

    // One entry per request in the batch, indexed by load handle. Empty until start() is called
    requests: Vec<RequestInfo>,
    started: bool,

    // Number of requests that have reached LoadState::Loaded. Never exceeds requests.len()
    loaded_count: usize,
    results: ResultStore<A>,
    state: ReadyState,

    next_subscription: u64,
    ready_callbacks: Vec<(ReadySubscription, ReadyCallback<A>)>,
}

impl<A> AssetReadySignal<A> {
    pub fn new(
        loader_io: Box<dyn LoaderIO<A>>,
        events_rx: Receiver<LoaderEvent<A>>,
    ) -> Self {
        AssetReadySignal {
            loader_io,
            events_rx,
            requests: Default::default(),
            started: false,
            loaded_count: 0,
            results: Default::default(),
            state: ReadyState::Pending,
            next_subscription: 0,
            ready_callbacks: Default::default(),
        }
    }

    /// Dispatches every request in the batch and returns immediately. Readiness is only ever
    /// evaluated when completions are processed in `update()`, never here.
    #[profiling::function]
    pub fn start(
        &mut self,
        batch: LoadBatch,
    ) -> PreloadResult<()> {
        if self.started {
            return Err(PreloadError::AlreadyStarted);
        }
        self.started = true;

        if batch.is_empty() {
            log::warn!("Started an empty load batch, it will never become ready");
        }

        self.requests = batch
            .requests()
            .iter()
            .map(|request| RequestInfo {
                name: request.name().clone(),
                kind: request.kind(),
                load_state: LoadState::Requested,
            })
            .collect();

        for (index, request) in batch.requests().iter().enumerate() {
            let load_handle = LoadHandle::from_index(index);
            log::debug!(
                "dispatch {:?} {} {:?}",
                load_handle,
                request.name(),
                request.kind()
            );

            match (request.kind(), request.path()) {
                (AssetKind::Texture, AssetPath::Single(path)) => {
                    self.loader_io.load_texture(load_handle, path)
                }
                (AssetKind::Model, AssetPath::Single(path)) => {
                    self.loader_io.load_model(load_handle, path)
                }
                (AssetKind::CubeTexture, AssetPath::CubeFaces(face_paths)) => {
                    self.loader_io.load_cube_texture(load_handle, face_paths)
                }
                // LoadRequest constructors pair each kind with its path shape
                (kind, path) => unreachable!("{:?} request with path {:?}", kind, path),
            }
        }

        Ok(())
    }

    /// Registers a callback to run once with the final results. If the batch is already ready the
    /// callback runs before this returns.
    pub fn on_ready<F>(
        &mut self,
        callback: F,
    ) -> ReadySubscription
    where
        F: FnOnce(&ResultStore<A>) + 'static,
    {
        let subscription = ReadySubscription(self.next_subscription);
        self.next_subscription += 1;

        if self.state == ReadyState::Ready {
            callback(&self.results);
        } else {
            self.ready_callbacks.push((subscription, Box::new(callback)));
        }

        subscription
    }

    /// Removes a callback that has not run yet. Returns false if it already ran or was removed.
    pub fn unsubscribe(
        &mut self,
        subscription: ReadySubscription,
    ) -> bool {
        let count_before = self.ready_callbacks.len();
        self.ready_callbacks
            .retain(|(existing, _)| *existing != subscription);
        self.ready_callbacks.len() != count_before
    }

    // Process all events, possibly completing requests and firing the ready callbacks
    #[profiling::function]
    pub fn update(&mut self) {
        while let Ok(loader_event) = self.events_rx.try_recv() {
            log::trace!("handle event {:?}", loader_event);
            match loader_event {
                LoaderEvent::LoadComplete(result) => self.handle_load_complete(result),
                LoaderEvent::LoadFailed(result) => self.handle_load_failed(result),
            }
        }
    }

    fn handle_load_complete(
        &mut self,
        result: LoadCompleteResult<A>,
    ) {
        let request = if let Some(request) = self.requests.get_mut(result.load_handle.index()) {
            request
        } else {
            log::warn!(
                "Ignoring completion for unknown load handle {:?}",
                result.load_handle
            );
            return;
        };

        if request.load_state == LoadState::Loaded {
            // A loader reported the same request twice. Counting it again would make the batch
            // look complete while another request is still outstanding.
            log::warn!(
                "Ignoring duplicate completion for {:?} {}",
                result.load_handle,
                request.name
            );
            return;
        }

        log::debug!(
            "handle_load_complete {:?} {} {:?}",
            result.load_handle,
            request.name,
            request.kind
        );

        request.load_state = LoadState::Loaded;
        if self.results.insert(request.name.clone(), result.asset).is_some() {
            log::warn!(
                "Asset name {} is used by more than one request, keeping the latest result",
                request.name
            );
        }

        self.loaded_count += 1;
        if self.loaded_count == self.requests.len() {
            self.signal_ready();
        }
    }

    fn handle_load_failed(
        &mut self,
        result: LoadFailedResult,
    ) {
        let name = self
            .requests
            .get(result.load_handle.index())
            .map(|request| request.name.as_str())
            .unwrap_or("<unknown>");

        log::error!(
            "Failed to load {:?} {}: {}. The load batch will not become ready",
            result.load_handle,
            name,
            result.error
        );
    }

    fn signal_ready(&mut self) {
        debug_assert_eq!(self.state, ReadyState::Pending);
        log::info!("All {} requested assets loaded", self.requests.len());
        self.state = ReadyState::Ready;

        let callbacks = std::mem::take(&mut self.ready_callbacks);
        for (_, callback) in callbacks {
            callback(&self.results);
        }
    }

    pub fn state(&self) -> ReadyState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ReadyState::Ready
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    // Fraction of requests completed, 0.0 before anything has been started
    pub fn progress(&self) -> f32 {
        if self.requests.is_empty() {
            0.0
        } else {
            self.loaded_count as f32 / self.requests.len() as f32
        }
    }

    // Names of requests that have not completed yet. A batch stuck in Pending can be diagnosed
    // from this
    pub fn pending_requests(&self) -> Vec<&AssetName> {
        self.requests
            .iter()
            .filter(|request| request.load_state == LoadState::Requested)
            .map(|request| &request.name)
            .collect()
    }

    pub fn results(&self) -> &ResultStore<A> {
        &self.results
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&A> {
        self.results.get(name)
    }
}
