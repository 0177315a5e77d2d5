pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod logger;
pub mod model;
pub mod recorder;
pub mod service;
pub mod stats;
pub mod store;
pub mod time;

pub use cache::{Cache, MemoryCache};
pub use database::Database;
pub use recorder::SnapshotRecorder;
pub use service::{Dashboard, DashboardStats};

pub trait Located {
    fn location(&self) -> snafu::Location;
}
