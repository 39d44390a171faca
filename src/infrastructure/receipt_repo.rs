use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ReceiptRepository;
use crate::domain::receipt::{
    LineItem, ListResult, Payment, PaymentType, Receipt, ReceiptDraft, ReceiptFilter,
    ReceiptSummary,
};
use crate::schema::{products, receipts};

use super::models::{NewProductRow, NewReceiptRow, ProductRow, ReceiptRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                DomainError::InvalidInput("referenced user does not exist".to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row mapping ───────────────────────────────────────────────────────────────

fn payment_from_row(row: &ReceiptRow) -> Result<Payment, DomainError> {
    let kind: PaymentType = row.payment_type.parse().map_err(|_| {
        DomainError::Internal(format!(
            "receipt {} has unknown payment type '{}'",
            row.id, row.payment_type
        ))
    })?;
    Ok(Payment {
        kind,
        amount: row.payment_amount.clone(),
    })
}

fn receipt_from_rows(row: ReceiptRow, items: Vec<LineItem>) -> Result<Receipt, DomainError> {
    let payment = payment_from_row(&row)?;
    Ok(Receipt {
        id: row.id,
        owner_id: row.owner_id,
        items,
        payment,
        total: row.total,
        change: row.change_amount,
        created_at: row.created_at,
        text_url: row.text_url,
    })
}

fn filtered(owner_id: Uuid, filter: &ReceiptFilter) -> receipts::BoxedQuery<'static, Pg> {
    let mut query = receipts::table
        .filter(receipts::owner_id.eq(owner_id))
        .into_boxed();

    if let Some(min) = &filter.min_total {
        query = query.filter(receipts::total.ge(min.clone()));
    }
    if let Some(max) = &filter.max_total {
        query = query.filter(receipts::total.le(max.clone()));
    }
    if let Some(kind) = filter.payment_type {
        query = query.filter(receipts::payment_type.eq(kind.as_str()));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(receipts::created_at.ge(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(receipts::created_at.le(end));
    }
    query
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselReceiptRepository {
    pool: DbPool,
}

impl DieselReceiptRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ReceiptRepository for DieselReceiptRepository {
    fn create(&self, owner_id: Uuid, draft: ReceiptDraft) -> Result<Receipt, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let receipt_id = Uuid::new_v4();
            let row = diesel::insert_into(receipts::table)
                .values(&NewReceiptRow {
                    id: receipt_id,
                    owner_id,
                    total: draft.total.clone(),
                    change_amount: draft.change.clone(),
                    payment_type: draft.payment.kind.as_str().to_string(),
                    payment_amount: draft.payment.amount.clone(),
                })
                .returning(ReceiptRow::as_returning())
                .get_result(conn)?;

            let new_products: Vec<NewProductRow> = draft
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| NewProductRow {
                    id: Uuid::new_v4(),
                    receipt_id,
                    position: position as i32,
                    name: item.name.clone(),
                    price: item.price.clone(),
                    quantity: item.quantity.clone(),
                    total: item.total.clone(),
                })
                .collect();
            if !new_products.is_empty() {
                diesel::insert_into(products::table)
                    .values(&new_products)
                    .execute(conn)?;
            }

            receipt_from_rows(row, draft.items)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Receipt>, DomainError> {
        let mut conn = self.pool.get()?;

        let receipt = receipts::table
            .filter(receipts::id.eq(id))
            .select(ReceiptRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };

        let items = ProductRow::belonging_to(&receipt)
            .select(ProductRow::as_select())
            .order(products::position.asc())
            .load(&mut conn)?
            .into_iter()
            .map(|p| LineItem {
                name: p.name,
                price: p.price,
                quantity: p.quantity,
                total: p.total,
            })
            .collect();

        receipt_from_rows(receipt, items).map(Some)
    }

    fn list(
        &self,
        owner_id: Uuid,
        filter: &ReceiptFilter,
        offset: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(owner_id, filter).count().get_result(conn)?;

            let rows = filtered(owner_id, filter)
                .select(ReceiptRow::as_select())
                .order((receipts::created_at.desc(), receipts::id.asc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            let items = rows
                .into_iter()
                .map(|row| {
                    Ok(ReceiptSummary {
                        payment: payment_from_row(&row)?,
                        id: row.id,
                        created_at: row.created_at,
                        total: row.total,
                    })
                })
                .collect::<Result<Vec<_>, DomainError>>()?;

            Ok(ListResult { items, total })
        })
    }

    fn save_text_url(&self, id: Uuid, url: &str) -> Result<String, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(
                receipts::table
                    .filter(receipts::id.eq(id))
                    .filter(receipts::text_url.is_null()),
            )
            .set(receipts::text_url.eq(url))
            .execute(conn)?;

            if updated == 1 {
                return Ok(url.to_string());
            }

            // Either the receipt is gone or another request stored a URL first.
            let stored: Option<Option<String>> = receipts::table
                .filter(receipts::id.eq(id))
                .select(receipts::text_url)
                .first(conn)
                .optional()?;

            match stored {
                None => Err(DomainError::NotFound),
                Some(Some(existing)) => Ok(existing),
                Some(None) => Err(DomainError::Internal(format!(
                    "text url of receipt {} was not stored",
                    id
                ))),
            }
        })
    }
}
