#[cfg(feature = "preload-base")]
pub use preload_base as base;

#[cfg(feature = "preload-loader")]
pub use preload_loader as loader;
