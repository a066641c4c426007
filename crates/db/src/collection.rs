use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Serialize};

use crate::{Filter, StoreError, Update};

/// Types that can be stored in and read back from a collection.
pub trait Record: Serialize + DeserializeOwned + Unpin + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Unpin + Send + Sync + 'static {}

/// Lazily decoded query results. Dropping the stream releases the cursor.
pub type RecordStream<T> = BoxStream<'static, Result<T, StoreError>>;

/// The operations resource handlers issue against a collection.
#[async_trait]
pub trait DocumentCollection<T: Record>: Send + Sync {
    /// Stream every document matching `filter`, in store order.
    async fn find(&self, filter: Filter) -> Result<RecordStream<T>, StoreError>;

    async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError>;

    /// Insert a document, returning its `_id`. The store assigns one when absent.
    async fn insert_one(&self, record: &T) -> Result<ObjectId, StoreError>;

    /// Apply `update` to the first match and return the document as it was
    /// before the update.
    async fn find_one_and_update(
        &self,
        filter: Filter,
        update: Update,
    ) -> Result<Option<T>, StoreError>;

    /// Delete the first match, returning how many documents were removed.
    async fn delete_one(&self, filter: Filter) -> Result<u64, StoreError>;
}
