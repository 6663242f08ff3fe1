//! Market Lane Core - Shared types library.
//!
//! This crate provides the domain types used across all Market Lane
//! components:
//! - `admin` - Live replica synchronization and mutation pipeline
//! - `integration-tests` - End-to-end scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Entities, newtype IDs, collection kinds, and the order
//!   status lifecycle

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
