pub mod hashing;

pub mod handle;
pub use handle::LoadHandle;
pub use handle::LoadState;

mod asset_source;
pub use asset_source::*;

mod error;
pub use error::{PreloadError, PreloadResult};

mod project;
pub use project::{PreloadProjectConfiguration, PreloadProjectConfigurationJson};
