pub mod api;
pub mod config;

pub use catfarm_core::{db, models, Database};
