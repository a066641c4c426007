use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::oid::ObjectId;

use crate::{DocumentCollection, Filter, Record, RecordStream, StoreError, Update};

/// A collection served by a MongoDB deployment.
pub struct MongoCollection<T: Send + Sync> {
    inner: mongodb::Collection<T>,
}

impl<T: Send + Sync> MongoCollection<T> {
    pub fn new(inner: mongodb::Collection<T>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Record> DocumentCollection<T> for MongoCollection<T> {
    async fn find(&self, filter: Filter) -> Result<RecordStream<T>, StoreError> {
        let cursor = self.inner.find(filter.into_document()).await?;
        Ok(cursor.map_err(StoreError::from).boxed())
    }

    async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        Ok(self.inner.find_one(filter.into_document()).await?)
    }

    async fn insert_one(&self, record: &T) -> Result<ObjectId, StoreError> {
        let outcome = self.inner.insert_one(record).await?;
        outcome
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::UnexpectedId(outcome.inserted_id.to_string()))
    }

    async fn find_one_and_update(
        &self,
        filter: Filter,
        update: Update,
    ) -> Result<Option<T>, StoreError> {
        Ok(self
            .inner
            .find_one_and_update(filter.into_document(), update.into_document())
            .await?)
    }

    async fn delete_one(&self, filter: Filter) -> Result<u64, StoreError> {
        let outcome = self.inner.delete_one(filter.into_document()).await?;
        Ok(outcome.deleted_count)
    }
}
