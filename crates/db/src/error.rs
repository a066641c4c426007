use mongodb::bson::{self, oid::ObjectId};
use thiserror::Error;

/// Failures raised by a document collection.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store operation failed: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("duplicate key: a document with _id {0} already exists")]
    DuplicateKey(ObjectId),

    #[error("unexpected identifier '{0}': expected an ObjectId")]
    UnexpectedId(String),
}
