//! In-memory ports used by service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, StorageError};
use crate::domain::ports::{ObjectStorage, ReceiptRepository, UserRepository};
use crate::domain::receipt::{ListResult, Receipt, ReceiptDraft, ReceiptFilter, ReceiptSummary};
use crate::domain::user::{NewUser, User};

#[derive(Default)]
pub struct InMemoryReceiptRepository {
    receipts: Mutex<Vec<Receipt>>,
}

impl InMemoryReceiptRepository {
    pub fn insert(&self, receipt: Receipt) {
        self.receipts.lock().unwrap().push(receipt);
    }
}

fn passes_filter(receipt: &Receipt, filter: &ReceiptFilter) -> bool {
    filter.min_total.as_ref().map_or(true, |min| &receipt.total >= min)
        && filter.max_total.as_ref().map_or(true, |max| &receipt.total <= max)
        && filter
            .payment_type
            .map_or(true, |kind| receipt.payment.kind == kind)
        && filter.start_date.map_or(true, |start| receipt.created_at >= start)
        && filter.end_date.map_or(true, |end| receipt.created_at <= end)
}

impl ReceiptRepository for InMemoryReceiptRepository {
    fn create(&self, owner_id: Uuid, draft: ReceiptDraft) -> Result<Receipt, DomainError> {
        let receipt = Receipt {
            id: Uuid::new_v4(),
            owner_id,
            items: draft.items,
            payment: draft.payment,
            total: draft.total,
            change: draft.change,
            created_at: Utc::now(),
            text_url: None,
        };
        self.insert(receipt.clone());
        Ok(receipt)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Receipt>, DomainError> {
        let receipts = self.receipts.lock().unwrap();
        Ok(receipts.iter().find(|r| r.id == id).cloned())
    }

    fn list(
        &self,
        owner_id: Uuid,
        filter: &ReceiptFilter,
        offset: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let receipts = self.receipts.lock().unwrap();
        let mut selected: Vec<&Receipt> = receipts
            .iter()
            .filter(|r| r.owner_id == owner_id && passes_filter(r, filter))
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = selected.len() as i64;
        let items = selected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| ReceiptSummary {
                id: r.id,
                created_at: r.created_at,
                total: r.total.clone(),
                payment: r.payment.clone(),
            })
            .collect();
        Ok(ListResult { items, total })
    }

    fn save_text_url(&self, id: Uuid, url: &str) -> Result<String, DomainError> {
        let mut receipts = self.receipts.lock().unwrap();
        let receipt = receipts
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(DomainError::NotFound)?;
        Ok(receipt.text_url.get_or_insert_with(|| url.to_string()).clone())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(DomainError::Conflict(
                "username or email already registered".to_string(),
            ));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            hashed_password: user.hashed_password,
            is_active: true,
            is_superuser: false,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

/// Records uploads and can be switched into a failing mode.
#[derive(Clone, Default)]
pub struct RecordingStorage {
    uploads: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    last_body: Arc<Mutex<Option<(String, Vec<u8>)>>>,
}

impl RecordingStorage {
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn last_upload(&self) -> Option<(String, Vec<u8>)> {
        self.last_body.lock().unwrap().clone()
    }
}

impl ObjectStorage for RecordingStorage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected { status: 503 });
        }
        *self.last_body.lock().unwrap() = Some((key.to_string(), bytes));
        Ok(format!("https://files.test/{}", key))
    }
}
