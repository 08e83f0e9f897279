// linkshelf/src/application/mod.rs
pub mod error;
pub mod notifier;
pub mod services;
pub mod sync;
pub mod views;

pub use services::bookmark_service_impl::BookmarkServiceImpl;
