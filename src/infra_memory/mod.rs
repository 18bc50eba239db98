//! In-process storage backend. Backs the `memory` store setting and the tests.

mod friendship_repo_memory;
mod user_repo_memory;

pub use friendship_repo_memory::*;
pub use user_repo_memory::*;

mod repo_tx_memory;

pub use repo_tx_memory::*;
