pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod persist;
pub mod schema;
pub mod serialize;
pub mod sink;
pub mod state;
pub mod validate;
