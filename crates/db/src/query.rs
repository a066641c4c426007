use mongodb::bson::{doc, oid::ObjectId, Document};

/// Selects the documents an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Empty filter, matches every document.
    All,
    /// Equality match on `_id`.
    Id(ObjectId),
}

impl Filter {
    pub fn into_document(self) -> Document {
        match self {
            Filter::All => Document::new(),
            Filter::Id(id) => doc! { "_id": id },
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => document
                .get_object_id("_id")
                .map(|found| found == *id)
                .unwrap_or(false),
        }
    }
}

/// A `$set` of top-level fields. Nested documents are replaced whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    fields: Document,
}

impl Update {
    pub fn set(fields: Document) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn into_document(self) -> Document {
        doc! { "$set": self.fields }
    }

    /// Apply the update to a stored document in place.
    pub fn apply(&self, target: &mut Document) {
        for (key, value) in &self.fields {
            target.insert(key.clone(), value.clone());
        }
    }
}
