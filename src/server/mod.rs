mod event_consumer_impl;
mod event_handler_impl;
mod event_publisher_impl;
mod port;
mod retry;
mod server;

pub use event_consumer_impl::*;
pub use event_handler_impl::*;
pub use event_publisher_impl::*;
pub use port::*;
pub use retry::*;
pub use server::*;
