use crate::assessment::PropertyRecord;

/// Record store keyed by parcel identifier.
pub trait PropertyStore: Send + Sync {
    fn get(&self, parcel_id: &str) -> Result<Option<PropertyRecord>, RepositoryError>;
    /// Insert or replace the record stored under its parcel identifier.
    fn put(&self, record: PropertyRecord) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record has no parcel id")]
    MissingParcelId,
    #[error("property {0} not found")]
    NotFound(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
