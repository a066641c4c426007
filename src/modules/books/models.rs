use bookshelf_db::{bson::doc, ObjectId, Update};
use bookshelf_http::error::AppError;
use serde::{Deserialize, Serialize};

/// Author details embedded in a book; has no identity of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub firstname: String,
    pub lastname: String,
}

/// A book as stored in the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Assigned by the store on insert and never changed afterwards
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Author,
}

/// A book as returned by the API, with its id as a 24-character hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub author: Author,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            isbn: record.isbn,
            title: record.title,
            author: record.author,
        }
    }
}

/// Request body for create and update. Omitted fields are empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookInput {
    /// Only honoured on create
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub isbn: String,
    pub title: String,
    pub author: Author,
}

impl BookInput {
    /// Record to insert. A client-supplied id must be valid and is kept.
    pub fn into_record(self) -> Result<BookRecord, AppError> {
        let id = match self.id.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_id(raw)?),
        };

        Ok(BookRecord {
            id,
            isbn: self.isbn,
            title: self.title,
            author: self.author,
        })
    }

    /// Overwrites `isbn`, `title` and the whole `author`, including with
    /// empty values for fields the client left out. Never touches `_id`.
    pub fn into_update(self) -> Update {
        Update::set(doc! {
            "isbn": self.isbn,
            "title": self.title,
            "author": {
                "firstname": self.author.firstname,
                "lastname": self.author.lastname,
            },
        })
    }
}

/// Outcome of a create: the id the store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub inserted_id: String,
}

/// Outcome of a delete: 0 when nothing matched, 1 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Parse an externally supplied book id.
pub fn parse_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| {
        AppError::bad_request(format!(
            "invalid book id '{}': expected a 24-character hex string",
            raw
        ))
    })
}
