use std::time::Duration;

use derive_new::new;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use snafu::{Location, ResultExt as _, Snafu};
use tracing::instrument;

use crate::cache::{self, Cache};
use crate::database::DatabaseError;
use crate::model::{AuthoredEntry, CourseId, UserPlaylist};
use crate::stats::{
    build_window, compute_deltas, tally, GrowthTally, GrowthWindow, StatsWindow,
    SubscriptionGrowth, WINDOW_LEN,
};
use crate::store::{PlaylistStore, SnapshotStore};
use crate::time::Timestamp;
use crate::Located;

/// Default lifetime of every cached dashboard figure.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashboardError {
    #[snafu(display("failed to fetch recent snapshots at {location}: {source}"))]
    FetchSnapshots {
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to fetch user playlists at {location}: {source}"))]
    FetchPlaylists {
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to look up the author of course `{course}` at {location}: {source}"))]
    ResolveCourse {
        course: CourseId,
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for DashboardError {
    fn location(&self) -> Location {
        match self {
            DashboardError::FetchSnapshots { location, .. }
            | DashboardError::FetchPlaylists { location, .. }
            | DashboardError::ResolveCourse { location, .. } => *location,
        }
    }
}

/// Everything the dashboard shows about the platform as a whole.
///
/// Serializes with the field names the dashboard client reads. Non-finite percentages become
/// `null` in JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub stats: StatsWindow,
    pub users_count: u64,
    pub subscription_count: u64,
    pub views_count: u64,
    pub subscription_percentage: f64,
    pub views_percentage: f64,
    pub users_percentage: f64,
    pub subscription_profit: bool,
    pub views_profit: bool,
    pub users_profit: bool,
}

impl DashboardStats {
    pub fn from_window(window: StatsWindow) -> Self {
        let deltas = compute_deltas(&window);

        Self {
            stats: window,
            users_count: deltas.users.current_value,
            subscription_count: deltas.subscription.current_value,
            views_count: deltas.views.current_value,
            subscription_percentage: deltas.subscription.percentage_change,
            views_percentage: deltas.views.percentage_change,
            users_percentage: deltas.users.percentage_change,
            subscription_profit: deltas.subscription.is_increase,
            views_profit: deltas.views.is_increase,
            users_profit: deltas.users.is_increase,
        }
    }
}

/// Dashboard figures computed from `store`, read through `cache`.
#[derive(Debug, Clone, new)]
pub struct Dashboard<S, C> {
    store: S,
    cache: C,
    #[new(value = "DEFAULT_TTL")]
    ttl: Duration,
}

impl<S, C> Dashboard<S, C> {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<S, C> Dashboard<S, C>
where
    S: SnapshotStore,
    C: Cache,
{
    /// Cached stats if every figure is still cached, fresh ones otherwise.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, DashboardError> {
        if let Some(stats) = cache::load_stats(&self.cache).await {
            tracing::debug!("serving dashboard stats from the cache");
            return Ok(stats);
        }

        self.refresh_stats().await
    }

    /// Recompute the stats from the store and rewrite every cached figure.
    #[instrument(skip(self))]
    pub async fn refresh_stats(&self) -> Result<DashboardStats, DashboardError> {
        let history = self
            .store
            .recent_snapshots(WINDOW_LEN)
            .await
            .context(FetchSnapshotsSnafu)?;

        let window = build_window(&history);
        tracing::info!(
            real = window.real_len(),
            padded = WINDOW_LEN - window.real_len(),
            "built the dashboard window"
        );

        let stats = DashboardStats::from_window(window);
        cache::store_stats(&self.cache, &stats, self.ttl).await;

        Ok(stats)
    }
}

impl<S, C> Dashboard<S, C>
where
    S: PlaylistStore,
    C: Cache,
{
    /// Cached growth of `actor`'s courses if still cached, a fresh figure otherwise.
    #[instrument(skip(self))]
    pub async fn subscription_growth(
        &self, actor: &str, now: Timestamp,
    ) -> Result<SubscriptionGrowth, DashboardError> {
        if let Some(growth) = cache::load_growth(&self.cache, actor).await {
            tracing::debug!(actor, "serving subscription growth from the cache");
            return Ok(growth);
        }

        self.refresh_subscription_growth(actor, now).await
    }

    /// Recompute the growth of `actor`'s courses over the two months before `now`.
    #[instrument(skip(self))]
    pub async fn refresh_subscription_growth(
        &self, actor: &str, now: Timestamp,
    ) -> Result<SubscriptionGrowth, DashboardError> {
        let playlists = self.store.playlists().await.context(FetchPlaylistsSnafu)?;
        let window = GrowthWindow::ending_at(now);

        let mut total = GrowthTally::default();
        for playlist in &playlists {
            let entries = self.resolve_authors(playlist).await?;
            total = total.merge(tally(&entries, actor, &window));
        }

        tracing::info!(
            actor,
            users = playlists.len(),
            current = total.current,
            previous = total.previous,
            "counted playlist additions"
        );

        let growth = total.finish();
        cache::store_growth(&self.cache, actor, &growth, self.ttl).await;

        Ok(growth)
    }

    /// Look up the author of every course in `playlist`, concurrently.
    async fn resolve_authors(
        &self, playlist: &UserPlaylist,
    ) -> Result<Vec<AuthoredEntry>, DashboardError> {
        let lookups = playlist.entries.iter().map(|entry| async move {
            let author = self
                .store
                .course_author(&entry.course)
                .await
                .context(ResolveCourseSnafu {
                    course: entry.course.clone(),
                })?;

            Ok::<_, DashboardError>(AuthoredEntry::new(author, entry.date))
        });

        try_join_all(lookups).await
    }
}
