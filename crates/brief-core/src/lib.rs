//! Core types and trait definitions for the case-brief store.
//!
//! This crate is free of database and process dependencies. The SQLite
//! backend, the TeX codec and the CLI all depend on it.

pub mod brief;
pub mod catalog;
pub mod error;
pub mod store;

pub use error::{Error, Result};
