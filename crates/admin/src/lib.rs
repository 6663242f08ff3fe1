//! Market Lane Admin library.
//!
//! The admin core keeps an in-memory view of three remotely-stored
//! collections (`products`, `categories`, `orders`) continuously consistent
//! with a remote document store, and performs every operator write against
//! that store - optionally preceded by a binary asset upload.
//!
//! # Architecture
//!
//! - [`store`] - the remote document store seam: full-snapshot change
//!   streams plus create/update/delete
//! - [`replica`] - the local, read-only replica of each collection
//! - [`subscription`] - owns one live stream per collection and forwards
//!   snapshots into the replica
//! - [`pipeline`] - validated compound mutations (upload then write) and
//!   the order status lifecycle
//! - [`upload`] - single multipart POST to the third-party asset host
//! - [`auth`] - consumed session capability; the core only gates on
//!   session presence
//!
//! There is no optimistic local update: a mutation's effect becomes
//! visible to readers only through the next snapshot delivery for the
//! affected collection.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod replica;
pub mod store;
pub mod subscription;
pub mod upload;

pub use config::AdminConfig;
pub use error::MutationError;
pub use pipeline::{MutationPipeline, ProductInput};
pub use replica::ReplicaStore;
pub use store::{Document, RemoteStore, Snapshot, StoreError};
pub use subscription::SubscriptionManager;
pub use upload::{AssetFile, AssetHostClient, AssetUpload, UploadError, UploadedAsset};
