use serde::{Deserialize, Serialize};
use snafu::{OptionExt as _, ResultExt as _};
use surrealdb::sql::Datetime;

use super::{Database, DatabaseQuerySnafu, EmptyQuerySnafu, Result, Thing};
use crate::define_relation;
use crate::model::{CourseId, PlaylistEntry, SnapshotRecord, UserPlaylist};
use crate::store::{PlaylistStore, SnapshotStore};
use crate::time::now;

/// A row of the `stats` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct SnapshotRow {
    pub users: u64,
    pub subscription: u64,
    pub views: u64,
    pub created_at: Datetime,
}

impl From<SnapshotRow> for SnapshotRecord {
    fn from(row: SnapshotRow) -> Self {
        SnapshotRecord::new(row.users, row.subscription, row.views, Some(row.created_at.0))
    }
}

impl From<SnapshotRecord> for SnapshotRow {
    fn from(record: SnapshotRecord) -> Self {
        SnapshotRow {
            users: record.users,
            subscription: record.subscription,
            views: record.views,
            created_at: record.created_at.unwrap_or_else(now).into(),
        }
    }
}

define_relation! {
    SnapshotRow > recent(limit: usize) > Vec<SnapshotRow>
        where "SELECT * FROM stats ORDER BY created_at DESC LIMIT $limit"
}

/// A row of the `users` table, reduced to what the dashboard reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct UserRow {
    pub name: String,
    #[serde(default)]
    pub playlist: Vec<PlaylistRow>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct PlaylistRow {
    /// Key of the record in the `courses` table.
    pub course: String,
    pub date: Datetime,
}

impl From<UserRow> for UserPlaylist {
    fn from(row: UserRow) -> Self {
        let entries = row
            .playlist
            .into_iter()
            .map(|item| PlaylistEntry::new(CourseId::new(item.course), item.date.0))
            .collect();

        UserPlaylist::new(row.name, entries)
    }
}

define_relation! {
    UserRow > all() > Vec<UserRow>
        where "SELECT name, playlist FROM users"
}

pub(crate) struct CourseRow;

define_relation! {
    CourseRow > author(course: Thing) > Option<String>
        where "SELECT VALUE created_by FROM courses WHERE id = $course LIMIT 1"
}

fn course_thing(course: &CourseId) -> Thing {
    ("courses".to_owned(), course.as_str().to_owned()).into()
}

impl SnapshotStore for Database {
    async fn recent_snapshots(&self, limit: usize) -> Result<Vec<SnapshotRecord>> {
        tracing::debug!(limit, "fetching recent snapshots from database");
        let rows = SnapshotRow::recent(limit, self).await?;
        Ok(rows.into_iter().map(SnapshotRecord::from).collect())
    }

    async fn record_snapshot(&self, snapshot: SnapshotRecord) -> Result<SnapshotRecord> {
        let row = SnapshotRow::from(snapshot);
        tracing::debug!(stats = ?row, "inserting snapshot into database");

        let created: Vec<SnapshotRow> = self
            .create("stats")
            .content(row)
            .await
            .context(DatabaseQuerySnafu)?;

        created.into_iter().next().map(SnapshotRecord::from).context(EmptyQuerySnafu)
    }
}

impl PlaylistStore for Database {
    async fn playlists(&self) -> Result<Vec<UserPlaylist>> {
        tracing::debug!("fetching user playlists from database");
        let rows = UserRow::all(self).await?;
        Ok(rows.into_iter().map(UserPlaylist::from).collect())
    }

    async fn course_author(&self, course: &CourseId) -> Result<Option<String>> {
        CourseRow::author(course_thing(course), self).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use url::Url;

    use super::*;
    use crate::database::DatabaseConfig;

    async fn memory_database() -> Database {
        let config = DatabaseConfig {
            url: Url::parse("mem://").unwrap(),
            namespace: "test".to_owned(),
            database: "test".to_owned(),
            credentials: None,
        };
        Database::connect(&config).await.expect("in-memory database should start")
    }

    #[tokio::test]
    async fn recent_snapshots_are_newest_first_and_limited() {
        let db = memory_database().await;
        let start = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();

        for month in 0..14u64 {
            let at = start + Duration::days(31 * month as i64);
            db.record_snapshot(SnapshotRecord::new(month, month * 2, month * 10, Some(at)))
                .await
                .unwrap();
        }

        let recent = db.recent_snapshots(12).await.unwrap();
        assert_eq!(recent.len(), 12);
        assert_eq!(recent[0].users, 13, "newest snapshot should come first");
        assert_eq!(recent[11].users, 2);
        assert!(recent.windows(2).all(|pair| pair[0].created_at > pair[1].created_at));
    }

    #[tokio::test]
    async fn recorded_snapshot_keeps_its_values() {
        let db = memory_database().await;
        let at = Utc.with_ymd_and_hms(2026, 10, 5, 0, 0, 0).unwrap();

        let stored = db.record_snapshot(SnapshotRecord::new(4, 5, 6, Some(at))).await.unwrap();
        assert_eq!(stored, SnapshotRecord::new(4, 5, 6, Some(at)));
    }

    #[tokio::test]
    async fn snapshot_without_timestamp_is_stamped() {
        let db = memory_database().await;
        let stored = db.record_snapshot(SnapshotRecord::PLACEHOLDER).await.unwrap();

        assert!(stored.created_at.is_some());
    }

    #[tokio::test]
    async fn playlists_and_course_authors() {
        let db = memory_database().await;
        let added = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();

        db.query("CREATE courses:rust SET created_by = 'ada'").await.unwrap();

        let user = UserRow {
            name: "bob".to_owned(),
            playlist: vec![PlaylistRow {
                course: "rust".to_owned(),
                date: added.into(),
            }],
        };
        db.query("CREATE users CONTENT $user")
            .bind(("user", user))
            .await
            .unwrap();

        let playlists = db.playlists().await.unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].user, "bob");
        assert_eq!(playlists[0].entries, vec![PlaylistEntry::new("rust".into(), added)]);

        let author = db.course_author(&"rust".into()).await.unwrap();
        assert_eq!(author.as_deref(), Some("ada"));
        assert_eq!(db.course_author(&"haskell".into()).await.unwrap(), None);
    }
}
