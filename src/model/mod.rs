use derive_new::new;
use serde::{Deserialize, Serialize};

pub use playlist::*;
pub use snapshot::*;

mod playlist;
mod snapshot;
