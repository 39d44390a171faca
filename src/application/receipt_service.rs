use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::domain::errors::{DomainError, StorageError};
use crate::domain::ports::{ObjectStorage, ReceiptRepository};
use crate::domain::receipt::{
    LineItemInput, ListResult, Payment, Receipt, ReceiptDraft, ReceiptFilter,
};
use crate::domain::render::{render_receipt, ReceiptTemplate, MAX_LINE_WIDTH};

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 100;

pub struct ReceiptService<S> {
    repo: Arc<dyn ReceiptRepository>,
    storage: S,
    template: ReceiptTemplate,
    line_width: usize,
}

impl<S: ObjectStorage> ReceiptService<S> {
    pub fn new(
        repo: Arc<dyn ReceiptRepository>,
        storage: S,
        template: ReceiptTemplate,
        line_width: usize,
    ) -> Self {
        Self {
            repo,
            storage,
            template,
            line_width,
        }
    }

    pub fn create_receipt(
        &self,
        owner_id: Uuid,
        items: Vec<LineItemInput>,
        payment: Payment,
    ) -> Result<Receipt, DomainError> {
        let draft = ReceiptDraft::new(items, payment)?;
        self.repo.create(owner_id, draft)
    }

    /// Receipts of other users are reported as missing.
    pub fn get_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<Receipt, DomainError> {
        match self.repo.find_by_id(id)? {
            Some(receipt) if receipt.owner_id == owner_id => Ok(receipt),
            _ => Err(DomainError::NotFound),
        }
    }

    pub fn list_receipts(
        &self,
        owner_id: Uuid,
        filter: &ReceiptFilter,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ListResult, DomainError> {
        let (offset, limit) = page_bounds(offset, limit)?;

        if let (Some(min), Some(max)) = (&filter.min_total, &filter.max_total) {
            if min > max {
                return Err(DomainError::InvalidInput(
                    "min_total must not exceed max_total".to_string(),
                ));
            }
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(DomainError::InvalidInput(
                    "start_date must not be after end_date".to_string(),
                ));
            }
        }

        self.repo.list(owner_id, filter, offset, limit)
    }

    /// Render a receipt as fixed-width lines. Any receipt id may be rendered.
    pub fn render_text(
        &self,
        id: Uuid,
        line_width: Option<usize>,
    ) -> Result<Vec<String>, DomainError> {
        let line_width = line_width.unwrap_or(self.line_width);
        if line_width == 0 || line_width > MAX_LINE_WIDTH {
            return Err(DomainError::InvalidInput(format!(
                "line_width must be between 1 and {}",
                MAX_LINE_WIDTH
            )));
        }

        let receipt = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        Ok(render_receipt(&receipt, &self.template, line_width))
    }

    /// Upload the rendered text once and return its URL.
    ///
    /// A receipt that already has a URL is returned as-is. A failed upload
    /// leaves the receipt untouched so the next call tries again.
    pub async fn publish_text(&self, id: Uuid) -> Result<String, DomainError> {
        let repo = Arc::clone(&self.repo);
        let receipt = run_blocking(move || repo.find_by_id(id))
            .await?
            .ok_or(DomainError::NotFound)?;

        if let Some(url) = receipt.text_url {
            return Ok(url);
        }

        let text = render_receipt(&receipt, &self.template, self.line_width).join("\n");
        let (staged, bytes) = run_blocking(move || stage_text(&text)).await?;
        let key = text_key(id);
        let uploaded = self.storage.upload(bytes, &key).await;
        drop(staged);
        let url = uploaded.map_err(|e| {
            log::error!("Uploading text of receipt {} failed: {}", id, e);
            DomainError::Storage(e)
        })?;

        let repo = Arc::clone(&self.repo);
        let stored = run_blocking(move || repo.save_text_url(id, &url)).await?;
        log::info!("Published text of receipt {} at {}", id, stored);
        Ok(stored)
    }
}

/// Resolve paging parameters: offset defaults to 0 and must not be negative,
/// limit defaults to 10 and is clamped into `1..=100`.
pub fn page_bounds(offset: Option<i64>, limit: Option<i64>) -> Result<(i64, i64), DomainError> {
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(DomainError::InvalidInput(
            "offset must not be negative".to_string(),
        ));
    }
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    Ok((offset, limit))
}

/// Write the rendered text to a temporary file and read back the bytes the
/// upload will send. The file is removed when the handle is dropped.
fn stage_text(text: &str) -> Result<(NamedTempFile, Vec<u8>), DomainError> {
    let mut file = tempfile::Builder::new()
        .prefix("receipt-")
        .suffix(".txt")
        .tempfile()
        .map_err(StorageError::from)?;
    file.write_all(text.as_bytes()).map_err(StorageError::from)?;
    file.flush().map_err(StorageError::from)?;
    let bytes = std::fs::read(file.path()).map_err(StorageError::from)?;
    Ok((file, bytes))
}

fn text_key(id: Uuid) -> String {
    format!("receipts/{}.txt", id)
}

async fn run_blocking<T, F>(f: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
}
