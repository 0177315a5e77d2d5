use super::*;

use crate::time::Timestamp;

/// One periodic statistics sample of the platform.
///
/// Placeholder records, used to pad a short history, carry zero counts and no timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub users: u64,
    pub subscription: u64,
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl SnapshotRecord {
    pub const PLACEHOLDER: SnapshotRecord = SnapshotRecord {
        users: 0,
        subscription: 0,
        views: 0,
        created_at: None,
    };

    /// A freshly opened period: all counts zero, stamped with `at`.
    pub fn opened_at(at: Timestamp) -> Self {
        Self::new(0, 0, 0, Some(at))
    }

    pub fn is_placeholder(&self) -> bool {
        self.created_at.is_none()
    }
}
