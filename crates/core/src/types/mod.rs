//! Core types for Market Lane.
//!
//! This module provides the entity types mirrored from the remote document
//! store, plus the enums the synchronization layer is keyed on.

pub mod category;
pub mod collection;
pub mod id;
pub mod order;
pub mod product;
pub mod status;

pub use category::Category;
pub use collection::{CollectionKind, UnknownCollection};
pub use id::DocumentId;
pub use order::{CustomerInfo, Order, OrderItem};
pub use product::Product;
pub use status::{OrderStatus, UnknownOrderStatus};
