pub mod di;
pub mod favicon;
pub mod feed;
pub mod repositories;
