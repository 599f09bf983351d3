use crate::catalog::ResourceId;

/// Errors surfaced by catalog construction and viewer control.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// A viewer needs at least one item to have an active index at all.
    #[error("catalog is empty; at least one item is required")]
    InvalidCatalog,

    #[error("index {index} is out of range for a catalog of {len} items")]
    OutOfRangeIndex { index: usize, len: usize },

    #[error("level {0} is outside 0..=100")]
    InvalidLevel(u32),

    #[error("unrecognised color '{0}'")]
    InvalidColor(String),

    #[error("malformed catalog: {0}")]
    CatalogFormat(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Returned by a [`ResourceLoader`](crate::cache::ResourceLoader) when a
/// resource cannot be produced.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("texture data is {got} bytes, expected {expected}")]
    BadDimensions { expected: usize, got: usize },

    #[error("texture is {width}x{height}, larger than the {max}px limit")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// A texture that could not be loaded. Recovered locally by the cache, which
/// substitutes its fallback texture and publishes one of these on its failure
/// channel.
#[derive(Debug, Clone)]
pub struct ResourceLoadFailure {
    pub id: ResourceId,
    pub reason: LoadError,
}

impl std::fmt::Display for ResourceLoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to load '{}': {}", self.id, self.reason)
    }
}
