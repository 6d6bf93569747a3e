//! # Return Rules
//!
//! Requests for customer returns and refunds against shipped orders.
//!
//! ```text
//! POST /api/orders/returns ──► pending ──► approved ──► refund ──► refunded
//!                                  │            (order becomes "returned")
//!                                  └──► rejected / cancelled / ...
//! ```
//!
//! Only a pending return may be deleted, and only an approved one refunded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{OrderReturn, OrderStatus, ReturnStatus};
use crate::validation::{sanitize_text, ValidationResult};
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_ITEMS};

const MAX_REASON_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;

/// Order statuses a return can be opened against.
pub const RETURNABLE: &[OrderStatus] = &[
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Returned,
];

// =============================================================================
// Create
// =============================================================================

/// One requested return line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ReturnLineRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub refund_cents: Option<i64>,
}

/// Body of `POST /api/orders/returns`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct CreateReturnRequest {
    pub order_id: Option<String>,
    pub items: Option<Vec<ReturnLineRequest>>,
    pub reason: Option<String>,
    pub description: Option<String>,
}

/// A return line that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnLine {
    pub product_id: String,
    pub quantity: i64,
    pub refund_cents: i64,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReturn {
    pub order_id: String,
    pub lines: Vec<ReturnLine>,
    pub reason: String,
    pub description: Option<String>,
}

impl ValidatedReturn {
    /// Sum of the requested refunds, or `None` on overflow.
    pub fn total_refund_cents(&self) -> Option<i64> {
        self.lines
            .iter()
            .try_fold(0i64, |sum, line| sum.checked_add(line.refund_cents))
    }
}

impl CreateReturnRequest {
    /// Checks every rule and returns all failures at once.
    pub fn validate(self) -> ValidationResult<ValidatedReturn> {
        let mut errors: Vec<String> = Vec::new();

        let order_id = self
            .order_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if order_id.is_none() {
            errors.push("Order ID is required".into());
        }

        let mut lines = Vec::new();
        match self.items.as_deref() {
            None | Some([]) => errors.push("At least one item is required".into()),
            Some(items) if items.len() > MAX_ORDER_ITEMS => {
                errors.push(format!("Too many items (max {MAX_ORDER_ITEMS})"))
            }
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    let n = index + 1;
                    let product_id = item.product_id.as_deref().map(str::trim).filter(|p| !p.is_empty());
                    let quantity = item.quantity.filter(|q| (1..=MAX_LINE_QUANTITY).contains(q));
                    let refund = item.refund_cents.filter(|r| *r >= 0);

                    if product_id.is_none() {
                        errors.push(format!("Item {n}: Product ID is required"));
                    }
                    if quantity.is_none() {
                        errors.push(format!("Item {n}: Valid quantity is required"));
                    }
                    if refund.is_none() {
                        errors.push(format!("Item {n}: Refund amount cannot be negative"));
                    }
                    if let (Some(product_id), Some(quantity), Some(refund_cents)) = (product_id, quantity, refund) {
                        lines.push(ReturnLine {
                            product_id: product_id.to_string(),
                            quantity,
                            refund_cents,
                        });
                    }
                }
            }
        }

        let reason = self.reason.map(|r| sanitize_text(&r)).filter(|r| !r.is_empty());
        match &reason {
            None => errors.push("Return reason is required".into()),
            Some(r) if r.chars().count() > MAX_REASON_LEN => errors.push("Return reason too long".into()),
            Some(_) => {}
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            errors.push(format!("Description too long (max {MAX_DESCRIPTION_LEN} characters)"));
        }

        let (Some(order_id), Some(reason), true) = (order_id, reason, errors.is_empty()) else {
            return Err(ValidationError::Many(errors));
        };

        Ok(ValidatedReturn {
            order_id,
            lines,
            reason,
            description: self.description.map(|d| sanitize_text(&d)).filter(|d| !d.is_empty()),
        })
    }
}

/// Builds `RET-YYYYMMDD-XXXXXXXXX`.
pub fn generate_return_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("RET-{}-{}", now.format("%Y%m%d"), suffix)
}

// =============================================================================
// Update and Refund
// =============================================================================

/// Body of `PUT /api/orders/returns/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ReturnPatch {
    pub status: Option<ReturnStatus>,
    pub notes: Option<String>,
}

impl OrderReturn {
    /// Applies a status/notes change. Refunds go through [`RefundRequest`].
    pub fn apply(&mut self, patch: ReturnPatch, now: DateTime<Utc>) -> ValidationResult<()> {
        if patch.status == Some(ReturnStatus::Refunded) {
            return Err(ValidationError::Rule(
                "Use the refund endpoint to mark a return refunded".into(),
            ));
        }
        if let Some(status) = patch.status {
            self.stamp_status(status, now);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(sanitize_text(&notes)).filter(|n| !n.is_empty());
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Body of `POST /api/orders/returns/{id}/refund`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct RefundRequest {
    pub amount_cents: Option<i64>,
    pub method: Option<String>,
}

/// A refund that passed validation against its return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRefund {
    pub amount_cents: i64,
    pub method: String,
    pub transaction_id: String,
}

impl RefundRequest {
    /// Amount above zero and within the return total; method present.
    pub fn validate(self, total_refund_cents: i64) -> ValidationResult<ValidatedRefund> {
        let amount_cents = match self.amount_cents {
            Some(a) if a > 0 => a,
            _ => return Err(ValidationError::Rule("Valid refund amount is required".into())),
        };
        let Some(method) = self.method.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()) else {
            return Err(ValidationError::Rule("Refund method is required".into()));
        };
        if amount_cents > total_refund_cents {
            return Err(ValidationError::Rule(
                "Refund amount cannot exceed total refund amount".into(),
            ));
        }

        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
        Ok(ValidatedRefund {
            amount_cents,
            method,
            transaction_id: format!("REFUND-{}", suffix.to_ascii_uppercase()),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateReturnRequest {
        CreateReturnRequest {
            order_id: Some("o1".into()),
            items: Some(vec![ReturnLineRequest {
                product_id: Some("p1".into()),
                quantity: Some(1),
                refund_cents: Some(1500),
            }]),
            reason: Some("Damaged in transit".into()),
            description: None,
        }
    }

    fn pending_return() -> OrderReturn {
        let now = Utc::now();
        OrderReturn {
            id: "r1".into(),
            return_number: generate_return_number(now),
            order_id: "o1".into(),
            customer_id: "c1".into(),
            status: ReturnStatus::Pending,
            reason: "Damaged".into(),
            description: None,
            notes: None,
            total_refund_cents: 1500,
            refunded_cents: None,
            refund_method: None,
            refund_transaction_id: None,
            approved_at: None,
            rejected_at: None,
            received_at: None,
            refunded_at: None,
            created_at: now,
            updated_at: now,
            items: vec![],
        }
    }

    #[test]
    fn test_valid_return() {
        let validated = request().validate().unwrap();
        assert_eq!(validated.order_id, "o1");
        assert_eq!(validated.total_refund_cents(), Some(1500));
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = CreateReturnRequest::default().validate().unwrap_err();
        let messages = err.messages();
        assert!(messages.contains(&"Order ID is required".to_string()));
        assert!(messages.contains(&"At least one item is required".to_string()));
        assert!(messages.contains(&"Return reason is required".to_string()));
    }

    #[test]
    fn test_bad_line_is_numbered() {
        let mut req = request();
        req.items = Some(vec![ReturnLineRequest {
            product_id: Some("p1".into()),
            quantity: Some(0),
            refund_cents: Some(-1),
        }]);
        let messages = req.validate().unwrap_err().messages();
        assert!(messages.contains(&"Item 1: Valid quantity is required".to_string()));
        assert!(messages.contains(&"Item 1: Refund amount cannot be negative".to_string()));
    }

    #[test]
    fn test_return_number_shape() {
        let number = generate_return_number(Utc::now());
        assert!(number.starts_with("RET-"));
        assert_eq!(number.len(), "RET-20240101-".len() + 9);
    }

    #[test]
    fn test_apply_stamps_approval() {
        let mut ret = pending_return();
        ret.apply(
            ReturnPatch { status: Some(ReturnStatus::Approved), notes: Some("ok".into()) },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ret.status, ReturnStatus::Approved);
        assert!(ret.approved_at.is_some());
        assert_eq!(ret.notes.as_deref(), Some("ok"));
    }

    #[test]
    fn test_apply_refuses_refunded_status() {
        let mut ret = pending_return();
        let err = ret
            .apply(ReturnPatch { status: Some(ReturnStatus::Refunded), notes: None }, Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("refund endpoint"));
        assert_eq!(ret.status, ReturnStatus::Pending);
    }

    #[test]
    fn test_refund_rules() {
        let ok = RefundRequest { amount_cents: Some(1000), method: Some("card".into()) }
            .validate(1500)
            .unwrap();
        assert!(ok.transaction_id.starts_with("REFUND-"));

        let too_much = RefundRequest { amount_cents: Some(2000), method: Some("card".into()) }.validate(1500);
        assert!(too_much.unwrap_err().to_string().contains("cannot exceed"));

        let no_method = RefundRequest { amount_cents: Some(100), method: None }.validate(1500);
        assert!(no_method.unwrap_err().to_string().contains("method"));

        let zero = RefundRequest { amount_cents: Some(0), method: Some("card".into()) }.validate(1500);
        assert!(zero.is_err());
    }
}
