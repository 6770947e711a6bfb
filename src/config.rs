//! Engine and client configuration.

/// Default number of documents a source fetches per round trip.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Configuration for one group-reduce run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on distinct groups held in memory.
    ///
    /// Default: unbounded. Set this when the key space is controlled by the
    /// data rather than by the caller.
    pub max_groups: Option<usize>,

    /// Number of fragments pulled and converted together on the rayon pool.
    ///
    /// Read by `stream_parallel` (feature `parallel`); `stream` converts one
    /// fragment at a time. Default: 200 when unset.
    pub conversion_batch: Option<usize>,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of distinct groups.
    #[must_use]
    pub fn max_groups(mut self, limit: usize) -> Self {
        self.max_groups = Some(limit);
        self
    }

    /// Converts fragments in batches of `size` on the rayon pool.
    #[must_use]
    pub fn conversion_batch(mut self, size: usize) -> Self {
        self.conversion_batch = Some(size.max(1));
        self
    }
}

/// Configuration for [`ChronixClient`](crate::ChronixClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Documents requested from the source per page.
    ///
    /// Default: 200
    pub page_size: usize,

    /// Settings forwarded to the engine on every call.
    pub engine: EngineConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            engine: EngineConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Sets the page size. Zero is raised to one.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Replaces the engine settings.
    #[must_use]
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}
