use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use crate::{DocumentCollection, Filter, Record, RecordStream, StoreError, Update};

type Documents = Arc<RwLock<Vec<Document>>>;

/// Named collections of raw BSON documents kept in process memory.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<Mutex<HashMap<String, Documents>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self, name: &str) -> Documents {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        collections.entry(name.to_string()).or_default().clone()
    }

    /// Typed view over the named collection. Views of the same name share data.
    pub fn collection<T: Record>(&self, name: &str) -> InMemoryCollection<T> {
        InMemoryCollection {
            documents: self.documents(name),
            _record: PhantomData,
        }
    }

    /// Store a raw document as-is, bypassing typed encoding.
    pub async fn seed(&self, name: &str, document: Document) {
        self.documents(name).write().await.push(document);
    }
}

/// A collection whose documents live in an [`InMemoryStore`].
pub struct InMemoryCollection<T> {
    documents: Documents,
    _record: PhantomData<fn() -> T>,
}

impl<T> InMemoryCollection<T> {
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<T: Record> DocumentCollection<T> for InMemoryCollection<T> {
    async fn find(&self, filter: Filter) -> Result<RecordStream<T>, StoreError> {
        let snapshot: Vec<Document> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect();

        Ok(stream::iter(snapshot)
            .map(|document| bson::from_document(document).map_err(StoreError::from))
            .boxed())
    }

    async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|document| filter.matches(document))
            .map(|document| bson::from_document(document.clone()).map_err(StoreError::from))
            .transpose()
    }

    async fn insert_one(&self, record: &T) -> Result<ObjectId, StoreError> {
        let mut document = bson::to_document(record)?;
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => return Err(StoreError::UnexpectedId(other.to_string())),
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let mut documents = self.documents.write().await;
        if documents.iter().any(|existing| Filter::Id(id).matches(existing)) {
            return Err(StoreError::DuplicateKey(id));
        }
        documents.push(document);

        Ok(id)
    }

    async fn find_one_and_update(
        &self,
        filter: Filter,
        update: Update,
    ) -> Result<Option<T>, StoreError> {
        let mut documents = self.documents.write().await;
        let Some(target) = documents.iter_mut().find(|document| filter.matches(document)) else {
            return Ok(None);
        };

        let previous = target.clone();
        update.apply(target);

        Ok(Some(bson::from_document(previous)?))
    }

    async fn delete_one(&self, filter: Filter) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        match documents.iter().position(|document| filter.matches(document)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
