//! Cache layout of the dashboard figures.
//!
//! Every figure lives under its own key with its own expiry, so a reader may see a mix of
//! values from two different computations. The window is stored as JSON, every scalar in its
//! `Display` form (`inf` and `NaN` included).

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use super::Cache;
use crate::Located;
use crate::service::DashboardStats;
use crate::stats::{StatsWindow, SubscriptionGrowth};

pub const STATS: &str = "stats";
pub const USERS_COUNT: &str = "usersCount";
pub const SUBSCRIPTION_COUNT: &str = "subscriptionCount";
pub const VIEWS_COUNT: &str = "viewsCount";
pub const SUBSCRIPTION_PERCENTAGE: &str = "subscriptionPercentage";
pub const VIEWS_PERCENTAGE: &str = "viewsPercentage";
pub const USERS_PERCENTAGE: &str = "usersPercentage";
pub const SUBSCRIPTION_PROFIT: &str = "subscriptionProfit";
pub const VIEWS_PROFIT: &str = "viewsProfit";
pub const USERS_PROFIT: &str = "usersProfit";

pub const SUBSCRIBED_COUNT: &str = "subscribedCount";
pub const SUBSCRIBED_PERCENTAGE: &str = "subscribedpercentage";

/// Every key written by [store_stats], in write order.
pub const STATS_KEYS: [&str; 10] = [
    STATS,
    USERS_COUNT,
    SUBSCRIPTION_COUNT,
    VIEWS_COUNT,
    SUBSCRIPTION_PERCENTAGE,
    VIEWS_PERCENTAGE,
    USERS_PERCENTAGE,
    SUBSCRIPTION_PROFIT,
    VIEWS_PROFIT,
    USERS_PROFIT,
];

/// Growth figures are per instructor.
pub fn subscribed_key(base: &str, actor: &str) -> String {
    format!("{base}:{actor}")
}

pub fn encode_scalar(value: impl Display) -> Vec<u8> {
    value.to_string().into_bytes()
}

pub fn decode_scalar<T: FromStr>(bytes: &[u8]) -> Option<T> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

/// Read one key, treating backend failures as a miss.
async fn lookup(cache: &impl Cache, key: &str) -> Option<Vec<u8>> {
    match cache.get(key).await {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, location = %error.location(), key, "could not read cache entry, treating it as a miss");
            None
        }
    }
}

async fn lookup_scalar<T: FromStr>(cache: &impl Cache, key: &str) -> Option<T> {
    let bytes = lookup(cache, key).await?;
    let value = decode_scalar(&bytes);
    if value.is_none() {
        tracing::warn!(key, "cache entry is not a valid scalar, treating it as a miss");
    }
    value
}

/// Write one key, logging and skipping failures.
async fn put(cache: &impl Cache, key: &str, value: Vec<u8>, ttl: Duration) {
    if let Err(error) = cache.set_with_expiry(key, value, ttl).await {
        tracing::warn!(%error, location = %error.location(), key, "could not write cache entry");
    }
}

/// Returns the cached dashboard only when all ten keys are present and decodable.
pub async fn load_stats(cache: &impl Cache) -> Option<DashboardStats> {
    let window = {
        let bytes = lookup(cache, STATS).await?;
        match serde_json::from_slice::<StatsWindow>(&bytes) {
            Ok(window) => window,
            Err(error) => {
                tracing::warn!(%error, key = STATS, "cached window is malformed, treating it as a miss");
                return None;
            }
        }
    };

    Some(DashboardStats {
        stats: window,
        users_count: lookup_scalar(cache, USERS_COUNT).await?,
        subscription_count: lookup_scalar(cache, SUBSCRIPTION_COUNT).await?,
        views_count: lookup_scalar(cache, VIEWS_COUNT).await?,
        subscription_percentage: lookup_scalar(cache, SUBSCRIPTION_PERCENTAGE).await?,
        views_percentage: lookup_scalar(cache, VIEWS_PERCENTAGE).await?,
        users_percentage: lookup_scalar(cache, USERS_PERCENTAGE).await?,
        subscription_profit: lookup_scalar(cache, SUBSCRIPTION_PROFIT).await?,
        views_profit: lookup_scalar(cache, VIEWS_PROFIT).await?,
        users_profit: lookup_scalar(cache, USERS_PROFIT).await?,
    })
}

/// Writes the ten dashboard keys one after another, each with `ttl`.
pub async fn store_stats(cache: &impl Cache, stats: &DashboardStats, ttl: Duration) {
    match serde_json::to_vec(&stats.stats) {
        Ok(window) => put(cache, STATS, window, ttl).await,
        Err(error) => tracing::warn!(%error, key = STATS, "could not encode window for the cache"),
    }

    put(cache, USERS_COUNT, encode_scalar(stats.users_count), ttl).await;
    put(cache, SUBSCRIPTION_COUNT, encode_scalar(stats.subscription_count), ttl).await;
    put(cache, VIEWS_COUNT, encode_scalar(stats.views_count), ttl).await;
    put(cache, SUBSCRIPTION_PERCENTAGE, encode_scalar(stats.subscription_percentage), ttl).await;
    put(cache, VIEWS_PERCENTAGE, encode_scalar(stats.views_percentage), ttl).await;
    put(cache, USERS_PERCENTAGE, encode_scalar(stats.users_percentage), ttl).await;
    put(cache, SUBSCRIPTION_PROFIT, encode_scalar(stats.subscription_profit), ttl).await;
    put(cache, VIEWS_PROFIT, encode_scalar(stats.views_profit), ttl).await;
    put(cache, USERS_PROFIT, encode_scalar(stats.users_profit), ttl).await;
}

pub async fn load_growth(cache: &impl Cache, actor: &str) -> Option<SubscriptionGrowth> {
    let count = lookup_scalar(cache, &subscribed_key(SUBSCRIBED_COUNT, actor)).await?;
    let percentage = lookup_scalar(cache, &subscribed_key(SUBSCRIBED_PERCENTAGE, actor)).await?;
    Some(SubscriptionGrowth::new(count, percentage))
}

pub async fn store_growth(
    cache: &impl Cache, actor: &str, growth: &SubscriptionGrowth, ttl: Duration,
) {
    let count_key = subscribed_key(SUBSCRIBED_COUNT, actor);
    let percentage_key = subscribed_key(SUBSCRIBED_PERCENTAGE, actor);

    put(cache, &count_key, encode_scalar(growth.count), ttl).await;
    put(cache, &percentage_key, encode_scalar(growth.percentage), ttl).await;
}
