use super::*;

use crate::time::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, new)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A course that a user added to their playlist, and when.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct PlaylistEntry {
    pub course: CourseId,
    pub date: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct UserPlaylist {
    pub user: String,
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
}

/// A playlist entry with the author of its course resolved.
///
/// `author` is `None` when the course no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct AuthoredEntry {
    pub author: Option<String>,
    pub date: Timestamp,
}
