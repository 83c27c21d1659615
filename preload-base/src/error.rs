use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum PreloadError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidSource { name: String, reason: String },
    AlreadyStarted,
}

impl std::error::Error for PreloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            PreloadError::StringError(_) => None,
            PreloadError::IoError(ref e) => Some(&**e),
            PreloadError::JsonError(ref e) => Some(&**e),
            PreloadError::InvalidSource { .. } => None,
            PreloadError::AlreadyStarted => None,
        }
    }
}

impl core::fmt::Display for PreloadError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            PreloadError::StringError(ref e) => write!(fmt, "{}", e),
            PreloadError::IoError(ref e) => write!(fmt, "{}", e),
            PreloadError::JsonError(ref e) => write!(fmt, "{}", e),
            PreloadError::InvalidSource {
                ref name,
                ref reason,
            } => write!(fmt, "Invalid asset source {}: {}", name, reason),
            PreloadError::AlreadyStarted => write!(fmt, "Load batch was already started"),
        }
    }
}

impl From<&str> for PreloadError {
    fn from(str: &str) -> Self {
        PreloadError::StringError(str.to_string())
    }
}

impl From<String> for PreloadError {
    fn from(string: String) -> Self {
        PreloadError::StringError(string)
    }
}

impl From<std::io::Error> for PreloadError {
    fn from(error: std::io::Error) -> Self {
        PreloadError::IoError(Arc::new(error))
    }
}

impl From<serde_json::Error> for PreloadError {
    fn from(error: serde_json::Error) -> Self {
        PreloadError::JsonError(Arc::new(error))
    }
}

pub type PreloadResult<T> = Result<T, PreloadError>;
