// tests/support/entities.rs
use change_audit::domain::audit::Auditable;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i64,
    pub amount: i64,
    pub note: Option<String>,
}

impl Invoice {
    pub fn new(id: i64, amount: i64) -> Self {
        Self {
            id,
            amount,
            note: None,
        }
    }
}

impl Auditable for Invoice {
    const ENTITY_TYPE: &'static str = "Invoice";
    const KEY_FIELDS: &'static [&'static str] = &["Id"];
    const FIELDS: &'static [&'static str] = &["Amount", "Note"];

    fn key_values(&self) -> Vec<Value> {
        vec![json!(self.id)]
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![("Amount", json!(self.amount)), ("Note", json!(self.note))]
    }
}

/// Composite key `(OrderId, Line)`, mapped to `Sales.OrderLines`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_id: i64,
    pub line: String,
    pub sku: String,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(order_id: i64, line: &str, sku: &str, quantity: i64) -> Self {
        Self {
            order_id,
            line: line.to_string(),
            sku: sku.to_string(),
            quantity,
        }
    }
}

impl Auditable for OrderLine {
    const ENTITY_TYPE: &'static str = "OrderLine";
    const KEY_FIELDS: &'static [&'static str] = &["OrderId", "Line"];
    const FIELDS: &'static [&'static str] = &["Sku", "Quantity"];

    fn key_values(&self) -> Vec<Value> {
        vec![json!(self.order_id), json!(self.line)]
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![("Sku", json!(self.sku)), ("Quantity", json!(self.quantity))]
    }
}
