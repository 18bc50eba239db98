mod directory_service_impl;
mod relationship_service_impl;
mod user_service_impl;

pub use directory_service_impl::*;
pub use relationship_service_impl::*;
pub use user_service_impl::*;
