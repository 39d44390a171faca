use std::future::Future;

use uuid::Uuid;

use super::errors::{DomainError, StorageError};
use super::receipt::{ListResult, Receipt, ReceiptDraft, ReceiptFilter};
use super::user::{NewUser, User};

pub trait ReceiptRepository: Send + Sync + 'static {
    /// Insert the receipt and all of its line items atomically.
    fn create(&self, owner_id: Uuid, draft: ReceiptDraft) -> Result<Receipt, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Receipt>, DomainError>;
    fn list(
        &self,
        owner_id: Uuid,
        filter: &ReceiptFilter,
        offset: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;
    /// Store `url` unless the receipt already has one; returns whichever URL
    /// ends up stored.
    fn save_text_url(&self, id: Uuid, url: &str) -> Result<String, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
}

/// Durable storage for rendered receipt text.
///
/// Uploading twice under the same key overwrites the object and yields the
/// same URL.
pub trait ObjectStorage: Send + Sync + 'static {
    fn upload(
        &self,
        bytes: Vec<u8>,
        key: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}
