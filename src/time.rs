use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

pub type Timestamp = DateTime<Utc>;

/// Day of the month that every period boundary is anchored to.
pub const ANCHOR_DAY: u32 = 5;

pub fn now() -> Timestamp {
    Utc::now()
}

/// `now` with its day pinned to [ANCHOR_DAY] and shifted back `months` calendar months.
///
/// The time of day is kept. Pinning happens before the shift so that the result never
/// overflows into the following month (the 5th exists in every month).
pub fn month_anchor(now: Timestamp, months: u32) -> Timestamp {
    now.with_day(ANCHOR_DAY)
        .and_then(|pinned| pinned.checked_sub_months(Months::new(months)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The first instant strictly after `now` that falls on the 5th of a month at midnight UTC.
pub fn next_snapshot_at(now: Timestamp) -> Timestamp {
    let this_month = NaiveDate::from_ymd_opt(now.year(), now.month(), ANCHOR_DAY)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());

    match this_month {
        Some(candidate) if candidate > now => candidate,
        Some(candidate) => candidate
            .checked_add_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// The snapshot due after the one at `due`, given the wall clock reads `now`.
///
/// Never returns `due` again, even when `now` is still slightly before it.
pub fn following_snapshot_at(due: Timestamp, now: Timestamp) -> Timestamp {
    next_snapshot_at(due.max(now))
}

/// Time left until `target`, zero if it has already passed.
pub fn duration_until(target: Timestamp, now: Timestamp) -> std::time::Duration {
    (target - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn anchor_pins_day_and_keeps_time() {
        let now = at(2026, 10, 14, 9, 30);
        assert_eq!(month_anchor(now, 1), at(2026, 9, 5, 9, 30));
        assert_eq!(month_anchor(now, 2), at(2026, 8, 5, 9, 30));
    }

    #[test]
    fn anchor_crosses_year_boundary() {
        let now = at(2026, 1, 31, 23, 0);
        assert_eq!(month_anchor(now, 1), at(2025, 12, 5, 23, 0));
        assert_eq!(month_anchor(now, 2), at(2025, 11, 5, 23, 0));
    }

    #[test]
    fn anchor_does_not_overflow_short_months() {
        let now = at(2026, 3, 31, 12, 0);
        assert_eq!(
            month_anchor(now, 1),
            at(2026, 2, 5, 12, 0),
            "march 31st minus one month should land in february"
        );
    }

    #[test]
    fn next_snapshot_later_this_month() {
        let now = at(2026, 10, 2, 8, 0);
        assert_eq!(next_snapshot_at(now), at(2026, 10, 5, 0, 0));
    }

    #[test]
    fn next_snapshot_rolls_over_to_next_month() {
        assert_eq!(next_snapshot_at(at(2026, 10, 14, 9, 30)), at(2026, 11, 5, 0, 0));
        assert_eq!(next_snapshot_at(at(2026, 12, 20, 0, 0)), at(2027, 1, 5, 0, 0));
    }

    #[test]
    fn next_snapshot_is_strictly_in_the_future() {
        let exactly = at(2026, 10, 5, 0, 0);
        assert_eq!(
            next_snapshot_at(exactly),
            at(2026, 11, 5, 0, 0),
            "a snapshot due right now should schedule the following month"
        );
    }

    #[test]
    fn early_wake_does_not_repeat_the_same_snapshot() {
        let due = at(2026, 11, 5, 0, 0);
        let woke = due - chrono::Duration::milliseconds(2);

        assert_eq!(following_snapshot_at(due, woke), at(2026, 12, 5, 0, 0));
    }

    #[test]
    fn late_wake_skips_to_the_snapshot_after_now() {
        let due = at(2026, 11, 5, 0, 0);
        assert_eq!(following_snapshot_at(due, due), at(2026, 12, 5, 0, 0));
        assert_eq!(following_snapshot_at(due, at(2027, 1, 9, 0, 0)), at(2027, 2, 5, 0, 0));
    }

    #[test]
    fn duration_until_past_target_is_zero() {
        let now = at(2026, 10, 14, 9, 30);
        assert_eq!(duration_until(at(2026, 10, 1, 0, 0), now), std::time::Duration::ZERO);
        assert_eq!(
            duration_until(at(2026, 10, 14, 10, 30), now),
            std::time::Duration::from_secs(3600)
        );
    }
}
