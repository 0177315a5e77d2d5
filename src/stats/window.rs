use serde::{Deserialize, Serialize};

use crate::model::SnapshotRecord;

/// Number of periods shown on the dashboard.
pub const WINDOW_LEN: usize = 12;

/// The most recent [WINDOW_LEN] snapshots, oldest first.
///
/// The length is part of the type; a short history is padded at the front with
/// [SnapshotRecord::PLACEHOLDER].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StatsWindow([SnapshotRecord; WINDOW_LEN]);

impl StatsWindow {
    /// The newest entry (index 11).
    pub fn current(&self) -> &SnapshotRecord {
        &self.0[WINDOW_LEN - 1]
    }

    /// The entry before [StatsWindow::current] (index 10).
    pub fn previous(&self) -> &SnapshotRecord {
        &self.0[WINDOW_LEN - 2]
    }

    pub fn records(&self) -> &[SnapshotRecord; WINDOW_LEN] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotRecord> {
        self.0.iter()
    }

    /// How many entries are real records rather than padding.
    pub fn real_len(&self) -> usize {
        self.0.iter().filter(|record| !record.is_placeholder()).count()
    }
}

impl std::ops::Index<usize> for StatsWindow {
    type Output = SnapshotRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Build the dashboard window from a history ordered newest first.
///
/// Only the first [WINDOW_LEN] records are used; anything beyond that is older than the window.
pub fn build_window(history: &[SnapshotRecord]) -> StatsWindow {
    let recent = &history[..history.len().min(WINDOW_LEN)];
    let padding = WINDOW_LEN - recent.len();

    StatsWindow(std::array::from_fn(|slot| {
        if slot < padding {
            SnapshotRecord::PLACEHOLDER
        } else {
            recent[WINDOW_LEN - 1 - slot]
        }
    }))
}
