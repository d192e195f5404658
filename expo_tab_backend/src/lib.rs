pub mod actions;
pub mod coordinator;
pub mod feed;
pub mod views;

pub use actions::Action;
pub use views::{LoadedView, View};
