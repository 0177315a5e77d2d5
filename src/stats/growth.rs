use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::model::AuthoredEntry;
use crate::time::{month_anchor, Timestamp};

/// Month-over-month change in playlist additions of one instructor's courses.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, new)]
pub struct SubscriptionGrowth {
    /// Current month minus previous month, may be negative.
    pub count: i64,
    pub percentage: f64,
}

/// The two trailing buckets entries are sorted into, both anchored to the 5th of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthWindow {
    pub current_start: Timestamp,
    pub previous_start: Timestamp,
}

impl GrowthWindow {
    pub fn ending_at(now: Timestamp) -> Self {
        Self {
            current_start: month_anchor(now, 1),
            previous_start: month_anchor(now, 2),
        }
    }
}

/// Running bucket counts. Tallies from independent users merge by addition, in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthTally {
    pub current: u64,
    pub previous: u64,
}

impl GrowthTally {
    pub fn record(&mut self, date: Timestamp, window: &GrowthWindow) {
        if date > window.current_start {
            self.current += 1;
        } else if date > window.previous_start {
            self.previous += 1;
        }
    }

    pub fn merge(self, other: GrowthTally) -> GrowthTally {
        GrowthTally {
            current: self.current + other.current,
            previous: self.previous + other.previous,
        }
    }

    pub fn finish(self) -> SubscriptionGrowth {
        let count = self.current as i64 - self.previous as i64;
        let percentage = if self.previous == 0 {
            count as f64 * 100.0
        } else {
            count as f64 / self.previous as f64 * 100.0
        };

        SubscriptionGrowth::new(count, percentage)
    }
}

/// Count the entries authored by `actor` in each bucket of the window ending at `now`.
pub fn tally<'a>(
    entries: impl IntoIterator<Item = &'a AuthoredEntry>, actor: &str, window: &GrowthWindow,
) -> GrowthTally {
    entries
        .into_iter()
        .filter(|entry| entry.author.as_deref() == Some(actor))
        .fold(GrowthTally::default(), |mut tally, entry| {
            tally.record(entry.date, window);
            tally
        })
}

pub fn subscription_growth<'a>(
    entries: impl IntoIterator<Item = &'a AuthoredEntry>, actor: &str, now: Timestamp,
) -> SubscriptionGrowth {
    tally(entries, actor, &GrowthWindow::ending_at(now)).finish()
}
