//! Fixed-width "register tape" rendering of a receipt.
//!
//! Widths are counted in characters, so Cyrillic labels line up the same way
//! ASCII ones do. When a label and its amount do not fit into the line the
//! padding is clamped to zero and the line is allowed to overflow. Centering
//! puts the odd leftover space on the right.

use super::money::format_money;
use super::receipt::{LineItem, PaymentType, Receipt};

pub const DEFAULT_LINE_WIDTH: usize = 32;
pub const MAX_LINE_WIDTH: usize = 256;

/// Fixed strings printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptTemplate {
    pub merchant_name: String,
    pub total_label: String,
    pub cash_label: String,
    pub cashless_label: String,
    pub change_label: String,
    pub closing_message: String,
}

impl Default for ReceiptTemplate {
    fn default() -> Self {
        ReceiptTemplate {
            merchant_name: "ФОП Джонсонюк Борис".to_string(),
            total_label: "СУМА".to_string(),
            cash_label: "Готівка".to_string(),
            cashless_label: "Картка".to_string(),
            change_label: "Решта".to_string(),
            closing_message: "Дякуємо за покупку!".to_string(),
        }
    }
}

impl ReceiptTemplate {
    pub fn with_merchant_name(mut self, name: impl Into<String>) -> Self {
        self.merchant_name = name.into();
        self
    }

    fn payment_label(&self, kind: PaymentType) -> &str {
        match kind {
            PaymentType::Cash => &self.cash_label,
            PaymentType::Cashless => &self.cashless_label,
        }
    }
}

/// Render `receipt` into lines of `line_width` characters.
///
/// `line_width` must be positive; callers validate it before getting here.
pub fn render_receipt(
    receipt: &Receipt,
    template: &ReceiptTemplate,
    line_width: usize,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(center(&template.merchant_name, line_width));
    lines.push(rule('=', line_width));

    for (index, item) in receipt.items.iter().enumerate() {
        lines.extend(wrap_words(&item.name, line_width));
        lines.push(item_line(item, line_width));
        if index + 1 < receipt.items.len() {
            lines.push(rule('-', line_width));
        }
    }

    lines.push(rule('=', line_width));
    lines.push(justify(
        &template.total_label,
        &format_money(&receipt.total),
        line_width,
    ));
    lines.push(justify(
        template.payment_label(receipt.payment.kind),
        &format_money(&receipt.payment.amount),
        line_width,
    ));
    lines.push(justify(
        &template.change_label,
        &format_money(&receipt.change),
        line_width,
    ));
    lines.push(rule('=', line_width));

    let stamp = receipt.created_at.format("%d.%m.%Y %H:%M").to_string();
    lines.push(center(&stamp, line_width));
    lines.push(center(&template.closing_message, line_width));

    lines
}

fn item_line(item: &LineItem, width: usize) -> String {
    let left = format!(
        "{} x {}",
        format_money(&item.quantity),
        format_money(&item.price)
    );
    justify(&left, &format_money(&item.total), width)
}

fn rule(fill: char, width: usize) -> String {
    std::iter::repeat(fill).take(width).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `left`, then spaces, then `right`, `width` characters in total.
fn justify(left: &str, right: &str, width: usize) -> String {
    let gap = width.saturating_sub(char_len(left) + char_len(right));
    format!("{}{}{}", left, " ".repeat(gap), right)
}

fn center(text: &str, width: usize) -> String {
    let free = width.saturating_sub(char_len(text));
    let left = free / 2;
    let right = free - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Greedy word wrap. Words are never split; a word wider than `width`
/// occupies a line of its own.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = char_len(word);
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
