pub mod api;
pub mod config;
pub mod core;
pub mod errors;
pub mod store;

pub use errors::{Error, Result};
