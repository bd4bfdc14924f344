pub mod fallback;
pub mod personalization;

pub use fallback::FallbackPool;
pub use personalization::{CacheSettings, PersonalizationCache};
