use derive_new::new;
use serde::{Deserialize, Serialize};

use super::window::StatsWindow;

/// Current value of one metric and how it moved since the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub current_value: u64,
    /// May be infinite or `NaN`, see [compute_deltas].
    pub percentage_change: f64,
    pub is_increase: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Deltas {
    pub users: MetricDelta,
    pub subscription: MetricDelta,
    pub views: MetricDelta,
}

/// Compare the newest period of `window` against the one before it.
///
/// The zero guard is asymmetric: users and views only fall back to `current * 100` when the
/// previous subscription count is zero as well. Once `previous.subscription != 0`, all three
/// metrics are divided by their previous value, so a zero previous users/views count yields
/// `inf` (or `NaN` for `0 / 0`).
pub fn compute_deltas(window: &StatsWindow) -> Deltas {
    let current = window.current();
    let previous = window.previous();

    let (mut users, mut views, mut subscription) = (0.0, 0.0, 0.0);
    let (mut users_up, mut views_up, mut subscription_up) = (true, true, true);

    if previous.users == 0 {
        users = current.users as f64 * 100.0;
    }
    if previous.views == 0 {
        views = current.views as f64 * 100.0;
    }
    if previous.subscription == 0 {
        subscription = current.subscription as f64 * 100.0;
    } else {
        users = percentage(current.users, previous.users);
        views = percentage(current.views, previous.views);
        subscription = percentage(current.subscription, previous.subscription);

        // NaN is not a decrease
        users_up = !(users < 0.0);
        views_up = !(views < 0.0);
        subscription_up = !(subscription < 0.0);
    }

    Deltas {
        users: MetricDelta::new(current.users, users, users_up),
        subscription: MetricDelta::new(current.subscription, subscription, subscription_up),
        views: MetricDelta::new(current.views, views, views_up),
    }
}

fn percentage(current: u64, previous: u64) -> f64 {
    let difference = current as f64 - previous as f64;
    difference / previous as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::SnapshotRecord;
    use crate::stats::build_window;

    fn record(users: u64, views: u64, subscription: u64) -> SnapshotRecord {
        SnapshotRecord::new(users, subscription, views, None)
    }

    /// Window whose last two entries are `previous` then `current`.
    fn window(previous: SnapshotRecord, current: SnapshotRecord) -> StatsWindow {
        build_window(&[current, previous])
    }

    #[test]
    fn zero_previous_multiplies_current_by_hundred() {
        let deltas = compute_deltas(&window(record(0, 0, 0), record(10, 20, 0)));

        assert_eq!(deltas.users.percentage_change, 1000.0);
        assert_eq!(deltas.views.percentage_change, 2000.0);
        assert_eq!(deltas.subscription.percentage_change, 0.0);
        assert!(deltas.users.is_increase);
        assert!(deltas.views.is_increase);
        assert!(deltas.subscription.is_increase, "no change should count as an increase");
    }

    #[test]
    fn nonzero_previous_subscription_divides_every_metric() {
        let deltas = compute_deltas(&window(record(0, 5, 10), record(3, 10, 15)));

        assert_eq!(deltas.users.percentage_change, f64::INFINITY);
        assert_eq!(deltas.views.percentage_change, 100.0);
        assert_eq!(deltas.subscription.percentage_change, 50.0);
        assert!(deltas.users.is_increase);
    }

    #[test]
    fn zero_over_zero_is_nan_and_not_a_decrease() {
        let deltas = compute_deltas(&window(record(0, 4, 2), record(0, 4, 2)));

        assert!(deltas.users.percentage_change.is_nan());
        assert!(deltas.users.is_increase);
        assert_eq!(deltas.views.percentage_change, 0.0);
        assert!(deltas.views.is_increase);
    }

    #[test]
    fn zero_previous_subscription_leaves_other_metrics_at_zero() {
        let deltas = compute_deltas(&window(record(8, 4, 0), record(12, 2, 3)));

        assert_eq!(deltas.users.percentage_change, 0.0, "users are not divided when the guard fails");
        assert_eq!(deltas.views.percentage_change, 0.0);
        assert_eq!(deltas.subscription.percentage_change, 300.0);
        assert!(deltas.users.is_increase && deltas.views.is_increase);
    }

    #[test]
    fn decreases_are_flagged() {
        let deltas = compute_deltas(&window(record(200, 50, 40), record(150, 60, 30)));

        assert_eq!(deltas.users.percentage_change, -25.0);
        assert!(!deltas.users.is_increase);
        assert_eq!(deltas.views.percentage_change, 20.0);
        assert!(deltas.views.is_increase);
        assert_eq!(deltas.subscription.percentage_change, -25.0);
        assert!(!deltas.subscription.is_increase);
    }

    #[test]
    fn current_values_come_from_the_newest_record() {
        let deltas = compute_deltas(&window(record(1, 2, 3), record(7, 8, 9)));

        assert_eq!(deltas.users.current_value, 7);
        assert_eq!(deltas.views.current_value, 8);
        assert_eq!(deltas.subscription.current_value, 9);
    }

    #[test]
    fn empty_window_has_no_change() {
        let deltas = compute_deltas(&build_window(&[]));
        assert_eq!(deltas.users, MetricDelta::new(0, 0.0, true));
        assert_eq!(deltas.views, MetricDelta::new(0, 0.0, true));
        assert_eq!(deltas.subscription, MetricDelta::new(0, 0.0, true));
    }

    #[test]
    fn computing_twice_gives_the_same_deltas() {
        let window = window(record(3, 9, 4), record(5, 6, 7));
        assert_eq!(compute_deltas(&window), compute_deltas(&window));
    }
}
