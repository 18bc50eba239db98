//! Process-wide tracing setup: a bootstrap subscriber whose filter and output
//! format are replaced once settings are loaded.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
