//! Core library for the cat farm.
//!
//! This crate provides the cat model, request-input validation and the
//! SQLite-backed store, independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use catfarm_core::db::Database;
//! use catfarm_core::models::CatFilter;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let cats = db.list_cats(&CatFilter::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;
pub mod validate;

// Re-export commonly used types at crate root
pub use db::Database;
