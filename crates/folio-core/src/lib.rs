//! Core types and trait definitions for the Folio content store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends and the API layer depend on it; it depends on nothing
//! proprietary.

pub mod collection;
pub mod credentials;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod seed;
pub mod session;
pub mod showcase;
pub mod stats;
pub mod store;

pub use error::{Error, ErrorKind, Result, StoreError};
