use std::future::Future;
use std::time::Duration;

use snafu::{Location, Snafu};

pub use dashboard::*;
pub use memory::*;

mod dashboard;
mod memory;

pub type Result<T, E = CacheError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CacheError {
    #[snafu(display("cache backend failed on key `{key}` at {location}: {source}"))]
    Backend {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
        #[snafu(implicit)]
        location: Location,
    },
}

impl crate::Located for CacheError {
    fn location(&self) -> Location {
        match self {
            CacheError::Backend { location, .. } => *location,
        }
    }
}

/// A key-value store with per-entry expiry.
///
/// Every key is independent: there is no way to write several keys atomically.
pub trait Cache: Send + Sync {
    /// Returns the stored bytes, or `None` if the key is absent or has expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Stores `value` under `key`, replacing any previous value, for `ttl` from now.
    fn set_with_expiry(
        &self, key: &str, value: Vec<u8>, ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send;
}
