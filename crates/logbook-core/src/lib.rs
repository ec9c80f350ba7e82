//! Core types and trait definitions for the document logbook.
//!
//! This crate is free of database and CLI dependencies. It holds the
//! temporal-string codec, the business-day counter, the processing-day
//! resolver, and the document model they operate on.

pub mod business_days;
pub mod document;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod processing;
pub mod stats;
pub mod store;
pub mod temporal;

pub use error::{Error, ParseError, Result, ValidationError};
