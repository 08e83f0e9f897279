// linkshelf/src/domain/mod.rs
pub mod bookmark;
pub mod change;
pub mod error;
pub mod repositories;
pub mod subscription;
pub mod user;
