mod clock;
mod friendship_repo;
mod user_repo;

mod repo_tx;

pub use clock::*;
pub use friendship_repo::*;
pub use user_repo::*;

pub use repo_tx::*;
