mod friend;
mod unit;
mod user;
mod user_event;

pub use friend::*;
pub use unit::*;
pub use user::*;
pub use user_event::*;
