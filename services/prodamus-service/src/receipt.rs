//! Line items as the gateway expects them: an ordered list of
//! `{name, price, quantity, sku}` records.

use bigdecimal::BigDecimal;
use common_money::format_amount;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Longest product name the gateway accepts, in characters.
pub const MAX_NAME_CHARS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub price: BigDecimal,
    pub quantity: u32,
    #[serde(default)]
    pub sku: String,
}

impl ReceiptItem {
    pub fn new(name: impl Into<String>, price: BigDecimal, quantity: u32) -> Self {
        Self { name: name.into(), price, quantity, sku: String::new() }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    /// Wire record. All scalars are strings so the map signs exactly like the gateway's
    /// form-encoded echo of it.
    pub fn to_value(&self) -> Value {
        json!({
            "name": truncate_chars(&self.name, MAX_NAME_CHARS),
            "price": format_amount(&self.price),
            "quantity": self.quantity.to_string(),
            "sku": self.sku,
        })
    }
}

/// Source of line items for a payment. Hosts with their own order model implement this.
pub trait ReceiptSerializer {
    fn items(&self) -> Vec<ReceiptItem>;

    fn to_products(&self) -> Value {
        Value::Array(self.items().iter().map(ReceiptItem::to_value).collect())
    }
}

impl ReceiptSerializer for [ReceiptItem] {
    fn items(&self) -> Vec<ReceiptItem> {
        self.to_vec()
    }
}

impl ReceiptSerializer for Vec<ReceiptItem> {
    fn items(&self) -> Vec<ReceiptItem> {
        self.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
}

impl Receipt {
    pub fn new(phone: Option<String>, email: Option<String>, items: Vec<ReceiptItem>) -> Self {
        Self { phone, email, items }
    }

    /// JSON text of the product list, as the legacy invoice API takes it in `cart`.
    pub fn to_json(&self) -> String {
        self.to_products().to_string()
    }
}

impl ReceiptSerializer for Receipt {
    fn items(&self) -> Vec<ReceiptItem> {
        self.items.clone()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn record_shape() {
        let item = ReceiptItem::new("Widget", BigDecimal::from(250), 1);
        assert_eq!(
            item.to_value(),
            json!({"name": "Widget", "price": "250.00", "quantity": "1", "sku": ""})
        );
    }

    #[test]
    fn long_names_are_cut_by_characters() {
        let name = "ж".repeat(200);
        let item = ReceiptItem::new(name, BigDecimal::from(1), 1);
        let v = item.to_value();
        assert_eq!(v["name"].as_str().unwrap().chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn order_is_preserved() {
        let receipt = Receipt::new(
            None,
            Some("x@y.com".into()),
            vec![
                ReceiptItem::new("b", BigDecimal::from_str("1.5").unwrap(), 2),
                ReceiptItem::new("a", BigDecimal::from(3), 1).with_sku("A-1"),
            ],
        );
        let products = receipt.to_products();
        assert_eq!(products[0]["name"], "b");
        assert_eq!(products[0]["price"], "1.50");
        assert_eq!(products[1]["sku"], "A-1");
        assert!(receipt.to_json().starts_with("[{"));
    }
}
