//! Document-store access for bookshelf.
//!
//! Resource modules talk to a [`DocumentCollection`] and never to a driver
//! directly. [`Store`] is the single shared handle created at startup; it
//! hands out collections backed by MongoDB or by process memory.

pub mod collection;
pub mod error;
pub mod memory;
pub mod module;
pub mod mongo;
pub mod query;
pub mod store;

pub use collection::{DocumentCollection, Record, RecordStream};
pub use error::StoreError;
pub use module::{create_module, DatabaseModule};
pub use query::{Filter, Update};
pub use store::Store;

pub use mongodb::bson;
pub use mongodb::bson::oid::ObjectId;
