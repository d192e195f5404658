pub mod schema;
pub mod domain;
pub mod group;
pub mod prelude;
pub mod utilities;
pub mod info;
pub mod matrix;
pub mod mock;

pub use group::*;
