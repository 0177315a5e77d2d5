use std::future::Future;

use crate::database::Result;
use crate::model::{CourseId, SnapshotRecord, UserPlaylist};

/// Where periodic snapshots are kept.
pub trait SnapshotStore: Send + Sync {
    /// Up to `limit` snapshots, newest first.
    fn recent_snapshots(
        &self, limit: usize,
    ) -> impl Future<Output = Result<Vec<SnapshotRecord>>> + Send;

    fn record_snapshot(
        &self, snapshot: SnapshotRecord,
    ) -> impl Future<Output = Result<SnapshotRecord>> + Send;
}

/// Users' playlists and the courses they point to.
pub trait PlaylistStore: Send + Sync {
    fn playlists(&self) -> impl Future<Output = Result<Vec<UserPlaylist>>> + Send;

    /// Name of the instructor that created `course`, `None` if there is no such course.
    fn course_author(
        &self, course: &CourseId,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}
