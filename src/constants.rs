pub mod cache {
    use std::time::Duration;

    pub const ENTRY_TTL: Duration = Duration::from_secs(30 * 60);

    pub const MAX_ENTRIES: usize = 50;

    pub const RECENT_SEARCHES_LIMIT: usize = 10;
}

pub mod feed {

    pub const FEED_SIZE: usize = 6;

    /// How many of the most recent queries contribute to the feed.
    pub const RECENT_QUERIES_USED: usize = 3;

    /// Result items taken per contributing query.
    pub const RESULTS_PER_QUERY: usize = 2;

    /// Sample size for the pure-fallback (no signal / forced refresh) feed.
    pub const RANDOM_SAMPLE_SIZE: usize = 4;
}

pub mod storage {

    pub const ENTRIES_KEY_PREFIX: &str = "entries:";

    pub const RECENCY_KEY_PREFIX: &str = "recency:";

    pub const ANONYMOUS_SCOPE: &str = "anonymous";

    /// Serialized store format version. A mismatch is treated as an empty
    /// store rather than migrated.
    pub const STORE_VERSION: u32 = 1;
}
