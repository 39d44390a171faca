use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{products, receipts, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = receipts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReceiptRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub total: BigDecimal,
    pub change_amount: BigDecimal,
    pub payment_type: String,
    pub payment_amount: BigDecimal,
    pub text_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = receipts)]
pub struct NewReceiptRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub total: BigDecimal,
    pub change_amount: BigDecimal,
    pub payment_type: String,
    pub payment_amount: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = products)]
#[diesel(belongs_to(ReceiptRow, foreign_key = receipt_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub position: i32,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub position: i32,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}
