pub mod cache;
pub mod quality;
pub mod scores;
pub mod setup;
pub mod summary;
pub mod ui;
