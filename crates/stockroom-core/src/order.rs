//! # Order Rules
//!
//! Validation, sanitizing and arithmetic for customer orders.
//!
//! ## Create Flow
//! ```text
//! CreateOrderRequest (raw JSON, every field optional)
//!        │
//!        ▼  validate()  ── collects EVERY problem ──► ValidationError::Many
//!        │
//!        ▼  sanitize free text (<, >, javascript:, on*=)
//!        │
//! ValidatedOrder
//!        │
//!        ▼  stockroom-db looks up each product (name, sku, tax rate)
//!        │
//!        ▼  OrderTotals::compute(lines, shipping, discount)
//!        │
//! Order { status: pending, payment_status: pending }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::{Money, TaxRate};
use crate::types::{Order, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::validation::{is_valid_postal_code, is_valid_reference_id, sanitize_text, ValidationResult};
use crate::{
    DEFAULT_CURRENCY, MAX_ADJUSTMENT_CENTS, MAX_LINE_QUANTITY, MAX_ORDER_ITEMS, MAX_UNIT_PRICE_CENTS,
};

/// Countries orders can ship to.
pub const ALLOWED_COUNTRIES: &[&str] = &["USA", "Canada", "Mexico"];

const MAX_CUSTOMER_ID_LEN: usize = 50;
const MAX_ADDRESS_FIELD_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 1000;

// =============================================================================
// Requests
// =============================================================================

/// One requested line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price_cents: Option<i64>,
}

/// Address as submitted; every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct AddressRequest {
    pub name: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct CreateOrderRequest {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Option<Vec<OrderLineRequest>>,
    pub shipping_address: Option<AddressRequest>,
    pub billing_address: Option<AddressRequest>,
    pub payment_method: Option<String>,
    pub shipping_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// A line that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// A create request that passed validation and was sanitized.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub currency: String,
    pub notes: Option<String>,
}

/// Reads a required address field, recording why it is unusable.
fn address_field(
    value: Option<&String>,
    label: &str,
    errors: &mut Vec<String>,
) -> String {
    // "address_line_1" reads as "address line_1", matching the form labels.
    let label = label.replacen('_', " ", 1);
    match value.map(String::as_str) {
        None | Some("") => {
            errors.push(format!("Shipping {label} is required"));
            String::new()
        }
        Some(v) if v.chars().count() > MAX_ADDRESS_FIELD_LEN => {
            errors.push(format!("Shipping {label} too long"));
            String::new()
        }
        Some(v) => v.to_string(),
    }
}

fn sanitize_opt(value: Option<String>) -> Option<String> {
    value.map(|v| sanitize_text(&v)).filter(|v| !v.is_empty())
}

impl AddressRequest {
    fn sanitized(self) -> ShippingAddress {
        ShippingAddress {
            name: sanitize_text(self.name.as_deref().unwrap_or_default()),
            address_line_1: sanitize_text(self.address_line_1.as_deref().unwrap_or_default()),
            address_line_2: sanitize_opt(self.address_line_2),
            city: sanitize_text(self.city.as_deref().unwrap_or_default()),
            state: sanitize_text(self.state.as_deref().unwrap_or_default()),
            postal_code: sanitize_text(self.postal_code.as_deref().unwrap_or_default()),
            country: sanitize_text(self.country.as_deref().unwrap_or_default()),
            phone: sanitize_opt(self.phone),
        }
    }
}

impl CreateOrderRequest {
    /// Checks every rule and returns all failures at once.
    ///
    /// ## Rules
    /// - customer_id present, at most 50 characters
    /// - 1 to 100 items; product ids `[A-Za-z0-9_-]{1,50}`, quantity
    ///   1..=10000, unit price above zero and at most 1,000,000.00
    /// - shipping name/line 1/city/state/postal code/country present and at
    ///   most 100 characters; postal code `[A-Za-z0-9 -]{3,10}`; country in
    ///   [`ALLOWED_COUNTRIES`]
    /// - payment method is a known [`PaymentMethod`]
    /// - shipping and discount between 0 and 1,000,000.00
    /// - notes at most 1000 characters
    pub fn validate(self) -> ValidationResult<ValidatedOrder> {
        let mut errors: Vec<String> = Vec::new();

        let customer_id = match self.customer_id.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Customer ID is required".into());
                String::new()
            }
            Some(id) if id.chars().count() > MAX_CUSTOMER_ID_LEN => {
                errors.push("Customer ID too long".into());
                String::new()
            }
            Some(id) => id.to_string(),
        };

        let mut lines = Vec::new();
        match self.items.as_deref() {
            None | Some([]) => errors.push("At least one item is required".into()),
            Some(items) if items.len() > MAX_ORDER_ITEMS => {
                errors.push(format!("Too many items (max {MAX_ORDER_ITEMS})"))
            }
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    let n = index + 1;
                    let before = errors.len();

                    match item.product_id.as_deref() {
                        None | Some("") => errors.push(format!("Item {n}: Product ID is required")),
                        Some(id) if !is_valid_reference_id(id) => errors.push(format!(
                            "Item {n}: Invalid product ID format - received: {id}"
                        )),
                        Some(_) => {}
                    }
                    match item.quantity {
                        None => errors.push(format!("Item {n}: Valid quantity is required")),
                        Some(q) if q <= 0 => errors.push(format!("Item {n}: Valid quantity is required")),
                        Some(q) if q > MAX_LINE_QUANTITY => errors.push(format!("Item {n}: Quantity too large")),
                        Some(_) => {}
                    }
                    match item.unit_price_cents {
                        None => errors.push(format!("Item {n}: Valid unit price is required")),
                        Some(p) if p <= 0 => errors.push(format!("Item {n}: Valid unit price is required")),
                        Some(p) if p > MAX_UNIT_PRICE_CENTS => errors.push(format!("Item {n}: Unit price too high")),
                        Some(_) => {}
                    }

                    if errors.len() == before {
                        if let (Some(product_id), Some(quantity), Some(unit_price_cents)) =
                            (&item.product_id, item.quantity, item.unit_price_cents)
                        {
                            lines.push(OrderLine {
                                product_id: product_id.clone(),
                                quantity,
                                unit_price_cents,
                            });
                        }
                    }
                }
            }
        }

        let shipping_address = match &self.shipping_address {
            None => {
                errors.push("Shipping address is required".into());
                None
            }
            Some(addr) => {
                let fields = [
                    (addr.name.as_ref(), "name"),
                    (addr.address_line_1.as_ref(), "address_line_1"),
                    (addr.city.as_ref(), "city"),
                    (addr.state.as_ref(), "state"),
                    (addr.postal_code.as_ref(), "postal_code"),
                    (addr.country.as_ref(), "country"),
                ];
                for (value, label) in fields {
                    address_field(value, label, &mut errors);
                }
                if let Some(code) = addr.postal_code.as_deref().filter(|c| !c.is_empty()) {
                    if !is_valid_postal_code(code) {
                        errors.push("Invalid postal code format".into());
                    }
                }
                if !addr
                    .country
                    .as_deref()
                    .is_some_and(|c| ALLOWED_COUNTRIES.contains(&c))
                {
                    errors.push("Invalid country".into());
                }
                Some(addr.clone())
            }
        };

        let payment_method = match self.payment_method.as_deref().map(str::parse::<PaymentMethod>) {
            Some(Ok(method)) => Some(method),
            _ => {
                errors.push("Invalid payment method".into());
                None
            }
        };

        if self
            .notes
            .as_deref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
        {
            errors.push(format!("Notes too long (max {MAX_NOTES_LEN} characters)"));
        }

        for (amount, label) in [(self.shipping_cents, "Shipping"), (self.discount_cents, "Discount")] {
            match amount {
                Some(c) if c < 0 => errors.push(format!("{label} cannot be negative")),
                Some(c) if c > MAX_ADJUSTMENT_CENTS => errors.push(format!("{label} too high")),
                _ => {}
            }
        }

        let (Some(shipping_address), Some(payment_method), true) =
            (shipping_address, payment_method, errors.is_empty())
        else {
            return Err(ValidationError::Many(errors));
        };

        Ok(ValidatedOrder {
            customer_id: sanitize_text(&customer_id),
            customer_name: sanitize_opt(self.customer_name),
            customer_email: self.customer_email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            lines,
            shipping_address: shipping_address.sanitized(),
            billing_address: self.billing_address.map(AddressRequest::sanitized),
            payment_method,
            shipping_cents: self.shipping_cents.unwrap_or(0),
            discount_cents: self.discount_cents.unwrap_or(0),
            currency: self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            notes: sanitize_opt(self.notes),
        })
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Money summary of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// A priced line ready for totalling.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: i64,
    pub tax_rate: TaxRate,
}

impl OrderTotals {
    /// subtotal = Σ qty × unit, tax = Σ per-line tax, total = subtotal +
    /// tax + shipping − discount, never below zero.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::{Money, TaxRate};
    /// use stockroom_core::order::{OrderTotals, PricedLine};
    ///
    /// let lines = [PricedLine {
    ///     unit_price: Money::from_cents(1000),
    ///     quantity: 2,
    ///     tax_rate: TaxRate::from_bps(825),
    /// }];
    /// let totals = OrderTotals::compute(&lines, Money::from_cents(500), Money::zero()).unwrap();
    /// assert_eq!(totals.subtotal_cents, 2000);
    /// assert_eq!(totals.tax_cents, 165);
    /// assert_eq!(totals.total_cents, 2665);
    /// ```
    ///
    /// ## Errors
    /// `Rule` when any intermediate amount leaves the `i64` range.
    pub fn compute(lines: &[PricedLine], shipping: Money, discount: Money) -> ValidationResult<OrderTotals> {
        let overflow = || ValidationError::Rule("Order total is out of range".into());
        let mut subtotal = Money::zero();
        let mut tax = Money::zero();

        for line in lines {
            let line_total = line.unit_price.multiply_quantity(line.quantity).ok_or_else(overflow)?;
            subtotal = subtotal.checked_add(line_total).ok_or_else(overflow)?;
            tax = tax
                .checked_add(line_total.calculate_tax(line.tax_rate))
                .ok_or_else(overflow)?;
        }

        let total = subtotal
            .checked_add(tax)
            .and_then(|t| t.checked_add(shipping))
            .and_then(|t| t.checked_sub(discount))
            .ok_or_else(overflow)?
            .non_negative();

        Ok(OrderTotals {
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            shipping_cents: shipping.cents(),
            discount_cents: discount.cents(),
            total_cents: total.cents(),
        })
    }
}

/// Builds `ORD-YYYYMMDD-XXXXXX` from the creation time and a random suffix.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

// =============================================================================
// Updates and Fulfillment
// =============================================================================

/// Body of `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_carrier: Option<String>,
    pub tracking_url: Option<String>,
    pub notes: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub billing_address: Option<ShippingAddress>,
}

impl Order {
    /// Sparse merge; a new status stamps its timestamp.
    pub fn apply(&mut self, patch: OrderPatch, now: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.stamp_status(status, now);
        }
        if let Some(payment_status) = patch.payment_status {
            self.payment_status = payment_status;
        }
        if let Some(name) = patch.customer_name {
            self.customer_name = Some(sanitize_text(&name));
        }
        if let Some(email) = patch.customer_email {
            self.customer_email = Some(email.trim().to_string());
        }
        if patch.tracking_number.is_some() {
            self.tracking_number = patch.tracking_number;
        }
        if patch.shipping_carrier.is_some() {
            self.shipping_carrier = patch.shipping_carrier;
        }
        if patch.tracking_url.is_some() {
            self.tracking_url = patch.tracking_url;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(sanitize_text(&notes));
        }
        if let Some(address) = patch.shipping_address {
            self.shipping_address = address;
        }
        if patch.billing_address.is_some() {
            self.billing_address = patch.billing_address;
        }
        self.updated_at = now;
    }
}

/// Carrier details supplied when an order ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ShipmentInfo {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub notes: Option<String>,
}

/// Body of `PUT /api/orders/{id}/fulfill`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FulfillRequest {
    pub status: String,
    #[serde(default)]
    pub shipment_info: Option<ShipmentInfo>,
}

impl FulfillRequest {
    /// Parses the requested status and checks it is fulfillable.
    pub fn target_status(&self) -> ValidationResult<OrderStatus> {
        match self.status.parse::<OrderStatus>() {
            Ok(status) if status.is_fulfillable() => Ok(status),
            _ => Err(ValidationError::NotAllowed {
                field: "status".into(),
                allowed: OrderStatus::FULFILLABLE
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

/// Batch operations offered by `PUT /api/orders/bulk-fulfill`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BulkAction {
    StartProcessing,
    MarkPacked,
    MarkShipped,
    MarkDelivered,
    Cancel,
}

impl BulkAction {
    /// Status every order in the batch is moved to.
    pub const fn target_status(&self) -> OrderStatus {
        match self {
            BulkAction::StartProcessing => OrderStatus::Processing,
            BulkAction::MarkPacked => OrderStatus::Packed,
            BulkAction::MarkShipped => OrderStatus::Shipped,
            BulkAction::MarkDelivered => OrderStatus::Delivered,
            BulkAction::Cancel => OrderStatus::Cancelled,
        }
    }
}

/// Body of `PUT /api/orders/bulk-fulfill`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkFulfillRequest {
    pub order_ids: Vec<String>,
    pub action: BulkAction,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: Some("cust-42".into()),
            customer_name: Some("Ada <b>Lovelace</b>".into()),
            customer_email: Some("ada@example.com".into()),
            items: Some(vec![OrderLineRequest {
                product_id: Some("prod-1".into()),
                quantity: Some(2),
                unit_price_cents: Some(1999),
            }]),
            shipping_address: Some(AddressRequest {
                name: Some("Ada Lovelace".into()),
                address_line_1: Some("1 Analytical Way".into()),
                city: Some("Toronto".into()),
                state: Some("ON".into()),
                postal_code: Some("M5V 2T6".into()),
                country: Some("Canada".into()),
                ..Default::default()
            }),
            payment_method: Some("credit_card".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request_is_sanitized() {
        let order = valid_request().validate().unwrap();
        assert_eq!(order.customer_name.as_deref(), Some("Ada bLovelace/b"));
        assert_eq!(order.payment_method, PaymentMethod::CreditCard);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.currency, "USD");
    }

    #[test]
    fn test_empty_request_reports_everything() {
        let err = CreateOrderRequest::default().validate().unwrap_err();
        let messages = err.messages();
        assert_eq!(
            messages,
            vec![
                "Customer ID is required".to_string(),
                "At least one item is required".to_string(),
                "Shipping address is required".to_string(),
                "Invalid payment method".to_string(),
            ]
        );
    }

    #[test]
    fn test_item_and_address_errors_are_numbered_and_labelled() {
        let mut request = valid_request();
        request.items = Some(vec![
            OrderLineRequest {
                product_id: Some("bad id!".into()),
                quantity: Some(0),
                unit_price_cents: Some(MAX_UNIT_PRICE_CENTS + 1),
            },
        ]);
        request.shipping_address = Some(AddressRequest {
            postal_code: Some("#1".into()),
            country: Some("France".into()),
            ..Default::default()
        });

        let messages = request.validate().unwrap_err().messages();
        assert!(messages.contains(&"Item 1: Invalid product ID format - received: bad id!".to_string()));
        assert!(messages.contains(&"Item 1: Valid quantity is required".to_string()));
        assert!(messages.contains(&"Item 1: Unit price too high".to_string()));
        assert!(messages.contains(&"Shipping address line_1 is required".to_string()));
        assert!(messages.contains(&"Invalid postal code format".to_string()));
        assert!(messages.contains(&"Invalid country".to_string()));
    }

    #[test]
    fn test_too_many_items() {
        let mut request = valid_request();
        request.items = Some(vec![OrderLineRequest::default(); MAX_ORDER_ITEMS + 1]);
        let messages = request.validate().unwrap_err().messages();
        assert_eq!(messages, vec!["Too many items (max 100)".to_string()]);
    }

    #[test]
    fn test_totals_formula() {
        let lines = [
            PricedLine {
                unit_price: Money::from_cents(25),
                quantity: 1,
                tax_rate: TaxRate::from_bps(1000),
            },
            PricedLine {
                unit_price: Money::from_cents(35),
                quantity: 1,
                tax_rate: TaxRate::from_bps(1000),
            },
        ];
        let totals = OrderTotals::compute(&lines, Money::from_cents(100), Money::from_cents(10)).unwrap();
        assert_eq!(totals.subtotal_cents, 60);
        // 2.5 -> 2 and 3.5 -> 4 under half-to-even
        assert_eq!(totals.tax_cents, 6);
        assert_eq!(totals.total_cents, 60 + 6 + 100 - 10);
    }

    #[test]
    fn test_totals_never_negative() {
        let lines = [PricedLine {
            unit_price: Money::from_cents(100),
            quantity: 1,
            tax_rate: TaxRate::zero(),
        }];
        let totals = OrderTotals::compute(&lines, Money::zero(), Money::from_cents(500)).unwrap();
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let huge = [PricedLine {
            unit_price: Money::from_cents(i64::MAX / 2),
            quantity: 3,
            tax_rate: TaxRate::zero(),
        }];
        let err = OrderTotals::compute(&huge, Money::zero(), Money::zero()).unwrap_err();
        assert_eq!(err.to_string(), "Order total is out of range");

        let one = [PricedLine {
            unit_price: Money::from_cents(100),
            quantity: 1,
            tax_rate: TaxRate::zero(),
        }];
        assert!(OrderTotals::compute(&one, Money::from_cents(i64::MAX), Money::zero()).is_err());
    }

    #[test]
    fn test_shipping_and_discount_are_bounded() {
        let mut request = valid_request();
        request.shipping_cents = Some(i64::MAX);
        request.discount_cents = Some(-1);
        let messages = request.validate().unwrap_err().messages();
        assert_eq!(
            messages,
            vec!["Shipping too high".to_string(), "Discount cannot be negative".to_string()]
        );

        let mut request = valid_request();
        request.shipping_cents = Some(MAX_ADJUSTMENT_CENTS);
        request.discount_cents = Some(MAX_ADJUSTMENT_CENTS);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_order_number_format() {
        let now = "2024-03-09T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ORD-20240309-"));
        assert_eq!(number.len(), "ORD-20240309-".len() + 6);
    }

    #[test]
    fn test_fulfill_target_status() {
        let ok = FulfillRequest { status: "packed".into(), shipment_info: None };
        assert_eq!(ok.target_status().unwrap(), OrderStatus::Packed);

        let bad = FulfillRequest { status: "cancelled".into(), shipment_info: None };
        assert!(bad.target_status().is_err());
    }

    #[test]
    fn test_bulk_action_mapping() {
        let action: BulkAction = serde_json::from_str("\"mark_shipped\"").unwrap();
        assert_eq!(action.target_status(), OrderStatus::Shipped);
        assert_eq!(BulkAction::Cancel.target_status(), OrderStatus::Cancelled);
    }
}
