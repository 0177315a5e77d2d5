//! Pure aggregation over already-fetched statistics. Nothing in here performs I/O.

pub use delta::*;
pub use growth::*;
pub use window::*;

mod delta;
mod growth;
mod window;
