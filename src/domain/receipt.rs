use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::money::{amount_limit_exceeded, check_amount, round_money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Cashless,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Cashless => "cashless",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentType::Cash),
            "cashless" => Ok(PaymentType::Cashless),
            other => Err(DomainError::InvalidInput(format!(
                "unknown payment type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub kind: PaymentType,
    pub amount: BigDecimal,
}

/// One product line as submitted by the client.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub name: String,
    pub price: BigDecimal,
    pub quantity: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub price: BigDecimal,
    pub quantity: BigDecimal,
    pub total: BigDecimal,
}

impl LineItem {
    fn from_input(input: LineItemInput) -> Result<Self, DomainError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInput(
                "product name must not be blank".to_string(),
            ));
        }
        check_amount(&input.price)?;
        check_amount(&input.quantity)?;
        let zero = BigDecimal::from(0);
        if input.price < zero {
            return Err(DomainError::InvalidInput(format!(
                "price of '{}' must not be negative",
                name
            )));
        }
        if input.quantity < zero {
            return Err(DomainError::InvalidInput(format!(
                "quantity of '{}' must not be negative",
                name
            )));
        }

        let total = round_money(&(&input.price * &input.quantity));
        if amount_limit_exceeded(&total) {
            return Err(DomainError::InvalidInput(format!(
                "total of '{}' is too large",
                name
            )));
        }
        Ok(LineItem {
            name,
            price: input.price,
            quantity: input.quantity,
            total,
        })
    }
}

/// A validated receipt that has not been persisted yet.
///
/// Construction is the only place the totals are computed, so a draft that
/// exists always satisfies `change = payment.amount - total >= 0`.
#[derive(Debug, Clone)]
pub struct ReceiptDraft {
    pub items: Vec<LineItem>,
    pub payment: Payment,
    pub total: BigDecimal,
    pub change: BigDecimal,
}

impl ReceiptDraft {
    pub fn new(items: Vec<LineItemInput>, payment: Payment) -> Result<Self, DomainError> {
        check_amount(&payment.amount)?;
        if payment.amount < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput(
                "payment amount must not be negative".to_string(),
            ));
        }

        let items = items
            .into_iter()
            .map(LineItem::from_input)
            .collect::<Result<Vec<_>, _>>()?;

        let sum = items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + &item.total);
        let total = round_money(&sum);
        if amount_limit_exceeded(&total) {
            return Err(DomainError::InvalidInput(
                "receipt total is too large".to_string(),
            ));
        }
        let change = round_money(&(&payment.amount - &total));
        if change < BigDecimal::from(0) {
            return Err(DomainError::InsufficientFunds);
        }

        Ok(ReceiptDraft {
            items,
            payment,
            total,
            change,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub items: Vec<LineItem>,
    pub payment: Payment,
    pub total: BigDecimal,
    pub change: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub text_url: Option<String>,
}

/// Receipt without its line items, as returned by listings.
#[derive(Debug, Clone)]
pub struct ReceiptSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total: BigDecimal,
    pub payment: Payment,
}

#[derive(Debug, Clone, Default)]
pub struct ReceiptFilter {
    pub min_total: Option<BigDecimal>,
    pub max_total: Option<BigDecimal>,
    pub payment_type: Option<PaymentType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<ReceiptSummary>,
    pub total: i64,
}
