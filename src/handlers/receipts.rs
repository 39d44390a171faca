use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::receipt_service::page_bounds;
use crate::domain::money::{format_money, parse_amount};
use crate::domain::receipt::{
    LineItem, LineItemInput, Payment, PaymentType, Receipt, ReceiptFilter, ReceiptSummary,
};
use crate::errors::AppError;
use crate::AppReceiptService;

use super::CurrentUser;

// ── Decimal input ────────────────────────────────────────────────────────────

/// Amounts may arrive as JSON numbers or strings; both are parsed from their
/// decimal text so `10.1` stays exactly `10.1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalInput {
    Number(serde_json::Number),
    Text(String),
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match DecimalInput::deserialize(deserializer)? {
        DecimalInput::Number(n) => n.to_string(),
        DecimalInput::Text(s) => s,
    };
    parse_amount(&raw).map_err(serde::de::Error::custom)
}

fn parse_decimal_param(name: &str, raw: Option<&str>) -> Result<Option<BigDecimal>, AppError> {
    raw.map(|value| {
        parse_amount(value).map_err(|e| AppError::BadRequest(format!("{}: {}", name, e)))
    })
    .transpose()
}

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64, example = 10.5)]
    pub price: BigDecimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64, example = 2)]
    pub quantity: BigDecimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[serde(rename = "type")]
    pub kind: PaymentType,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64, example = 30.0)]
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReceiptRequest {
    pub products: Vec<ProductRequest>,
    pub payment: PaymentRequest,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub name: String,
    /// Two-decimal string, e.g. "10.50"
    pub price: String,
    pub quantity: String,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    #[serde(rename = "type")]
    pub kind: PaymentType,
    pub amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptResponse {
    pub id: Uuid,
    pub products: Vec<ProductResponse>,
    pub payment: PaymentResponse,
    pub total: String,
    pub change: String,
    pub created_at: String,
    pub text_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptSummaryResponse {
    pub id: Uuid,
    pub created_at: String,
    pub total: String,
    pub payment: PaymentResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListReceiptsResponse {
    pub items: Vec<ReceiptSummaryResponse>,
    pub total_count: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TextUrlResponse {
    pub url: String,
}

fn payment_response(payment: &Payment) -> PaymentResponse {
    PaymentResponse {
        kind: payment.kind,
        amount: format_money(&payment.amount),
    }
}

impl From<&LineItem> for ProductResponse {
    fn from(item: &LineItem) -> Self {
        ProductResponse {
            name: item.name.clone(),
            price: format_money(&item.price),
            quantity: format_money(&item.quantity),
            total: format_money(&item.total),
        }
    }
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        ReceiptResponse {
            id: receipt.id,
            products: receipt.items.iter().map(ProductResponse::from).collect(),
            payment: payment_response(&receipt.payment),
            total: format_money(&receipt.total),
            change: format_money(&receipt.change),
            created_at: receipt.created_at.to_rfc3339(),
            text_url: receipt.text_url,
        }
    }
}

impl From<ReceiptSummary> for ReceiptSummaryResponse {
    fn from(summary: ReceiptSummary) -> Self {
        ReceiptSummaryResponse {
            id: summary.id,
            created_at: summary.created_at.to_rfc3339(),
            total: format_money(&summary.total),
            payment: payment_response(&summary.payment),
        }
    }
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListReceiptsParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub min_total: Option<String>,
    pub max_total: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TextParams {
    pub line_width: Option<usize>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /receipts
///
/// Creates a receipt with its products in one transaction. Totals and change
/// are computed server-side; a payment smaller than the total is rejected.
#[utoipa::path(
    post,
    path = "/receipts",
    request_body = CreateReceiptRequest,
    params(
        ("X-User-Id" = Uuid, Header, description = "Id of the calling user"),
    ),
    responses(
        (status = 201, description = "Receipt created", body = ReceiptResponse),
        (status = 400, description = "Invalid input or insufficient funds"),
        (status = 401, description = "Missing or malformed X-User-Id"),
    ),
    tag = "receipts"
)]
pub async fn create_receipt(
    service: web::Data<AppReceiptService>,
    user: CurrentUser,
    body: web::Json<CreateReceiptRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let items = body
        .products
        .into_iter()
        .map(|p| LineItemInput {
            name: p.name,
            price: p.price,
            quantity: p.quantity,
        })
        .collect();
    let payment = Payment {
        kind: body.payment.kind,
        amount: body.payment.amount,
    };

    let receipt = web::block(move || service.create_receipt(user.0, items, payment)).await??;

    Ok(HttpResponse::Created().json(ReceiptResponse::from(receipt)))
}

/// GET /receipts
///
/// Lists the caller's receipts, newest first, without their products.
#[utoipa::path(
    get,
    path = "/receipts",
    params(
        ("X-User-Id" = Uuid, Header, description = "Id of the calling user"),
        ("offset" = Option<i64>, Query, description = "Receipts to skip (default 0)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 10, max 100)"),
        ("min_total" = Option<String>, Query, description = "Lowest total, inclusive"),
        ("max_total" = Option<String>, Query, description = "Highest total, inclusive"),
        ("payment_type" = Option<PaymentType>, Query, description = "cash or cashless"),
        ("start_date" = Option<String>, Query, description = "RFC 3339, inclusive"),
        ("end_date" = Option<String>, Query, description = "RFC 3339, inclusive"),
    ),
    responses(
        (status = 200, description = "Page of receipts", body = ListReceiptsResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Missing or malformed X-User-Id"),
    ),
    tag = "receipts"
)]
pub async fn list_receipts(
    service: web::Data<AppReceiptService>,
    user: CurrentUser,
    query: web::Query<ListReceiptsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = ReceiptFilter {
        min_total: parse_decimal_param("min_total", params.min_total.as_deref())?,
        max_total: parse_decimal_param("max_total", params.max_total.as_deref())?,
        payment_type: params.payment_type,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let (offset, limit) = page_bounds(params.offset, params.limit)?;

    let result =
        web::block(move || service.list_receipts(user.0, &filter, Some(offset), Some(limit)))
            .await??;

    Ok(HttpResponse::Ok().json(ListReceiptsResponse {
        items: result
            .items
            .into_iter()
            .map(ReceiptSummaryResponse::from)
            .collect(),
        total_count: result.total,
        offset,
        limit,
    }))
}

/// GET /receipts/{id}
///
/// Returns one of the caller's receipts with its products.
#[utoipa::path(
    get,
    path = "/receipts/{id}",
    params(
        ("id" = Uuid, Path, description = "Receipt UUID"),
        ("X-User-Id" = Uuid, Header, description = "Id of the calling user"),
    ),
    responses(
        (status = 200, description = "Receipt found", body = ReceiptResponse),
        (status = 401, description = "Missing or malformed X-User-Id"),
        (status = 404, description = "Receipt not found"),
    ),
    tag = "receipts"
)]
pub async fn get_receipt(
    service: web::Data<AppReceiptService>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let receipt_id = path.into_inner();

    let receipt = web::block(move || service.get_receipt(user.0, receipt_id)).await??;

    Ok(HttpResponse::Ok().json(ReceiptResponse::from(receipt)))
}

/// GET /receipts/{id}/text
///
/// Public: renders the receipt as fixed-width lines.
#[utoipa::path(
    get,
    path = "/receipts/{id}/text",
    params(
        ("id" = Uuid, Path, description = "Receipt UUID"),
        ("line_width" = Option<usize>, Query, description = "Characters per line (default 32)"),
    ),
    responses(
        (status = 200, description = "Rendered lines", body = Vec<String>),
        (status = 400, description = "line_width out of range"),
        (status = 404, description = "Receipt not found"),
    ),
    tag = "receipts"
)]
pub async fn get_receipt_text(
    service: web::Data<AppReceiptService>,
    path: web::Path<Uuid>,
    query: web::Query<TextParams>,
) -> Result<HttpResponse, AppError> {
    let receipt_id = path.into_inner();
    let line_width = query.into_inner().line_width;

    let lines = web::block(move || service.render_text(receipt_id, line_width)).await??;

    Ok(HttpResponse::Ok().json(lines))
}

/// GET /receipts/{id}/text-url
///
/// Public: uploads the rendered text on first use and returns its URL.
#[utoipa::path(
    get,
    path = "/receipts/{id}/text-url",
    params(
        ("id" = Uuid, Path, description = "Receipt UUID"),
    ),
    responses(
        (status = 200, description = "URL of the rendered text", body = TextUrlResponse),
        (status = 404, description = "Receipt not found"),
        (status = 502, description = "Object storage unavailable"),
    ),
    tag = "receipts"
)]
pub async fn get_receipt_text_url(
    service: web::Data<AppReceiptService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let receipt_id = path.into_inner();

    let url = service.publish_text(receipt_id).await?;

    Ok(HttpResponse::Ok().json(TextUrlResponse { url }))
}
