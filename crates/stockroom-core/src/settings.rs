//! # Settings Documents
//!
//! Company profile and invoice preferences. Each is a single JSON document
//! stored under a section key; a section that has never been saved reads
//! back as its [`Default`].
//!
//! ```text
//! settings table
//! ┌──────────┬───────────────────────────────┐
//! │ section  │ document (JSON)               │
//! ├──────────┼───────────────────────────────┤
//! │ company  │ CompanySettings               │
//! │ invoice  │ InvoiceSettings               │
//! └──────────┴───────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::TaxRate;
use crate::validation::{collect, validate_email, validate_hex_color, ValidationResult};

/// A settings document stored under a fixed section key.
pub trait SettingsDocument: Serialize + DeserializeOwned + Default + Send + Sync {
    /// Row key in the settings table.
    const SECTION: &'static str;

    /// Checks the document before it is saved.
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// Company
// =============================================================================

/// Company profile used on invoices and the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct CompanySettings {
    pub company_name: String,
    pub legal_name: String,
    pub tax_id: String,
    pub registration_number: String,
    pub industry: String,
    pub company_size: String,
    pub year_founded: String,

    pub email: String,
    pub phone: String,
    pub website: String,

    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,

    /// `#rrggbb`
    pub primary_color: String,
    /// `#rrggbb`
    pub secondary_color: String,
    pub enable_custom_logo: bool,
    pub enable_dark_mode: bool,
    pub logo_url: Option<String>,

    /// `HH:MM`
    pub business_hours_start: String,
    /// `HH:MM`
    pub business_hours_end: String,
    pub business_days: Vec<String>,
    pub time_zone: String,

    pub fiscal_year_start: String,
    pub currency: String,
    pub default_tax_rate_bps: u32,
    pub enable_automatic_tax_calculation: bool,
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            company_name: "Acme Corporation".into(),
            legal_name: "Acme Inc.".into(),
            tax_id: "US123456789".into(),
            registration_number: "REG-987654321".into(),
            industry: "technology".into(),
            company_size: "medium".into(),
            year_founded: "2010".into(),
            email: "info@acmecorp.com".into(),
            phone: "+1 (555) 123-4567".into(),
            website: "https://www.acmecorp.com".into(),
            address_line_1: "123 Main Street".into(),
            address_line_2: "Suite 100".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            postal_code: "94105".into(),
            country: "United States".into(),
            primary_color: "#3b82f6".into(),
            secondary_color: "#10b981".into(),
            enable_custom_logo: true,
            enable_dark_mode: true,
            logo_url: None,
            business_hours_start: "09:00".into(),
            business_hours_end: "17:00".into(),
            business_days: ["monday", "tuesday", "wednesday", "thursday", "friday"]
                .into_iter()
                .map(String::from)
                .collect(),
            time_zone: "America/Los_Angeles".into(),
            fiscal_year_start: "january".into(),
            currency: crate::DEFAULT_CURRENCY.into(),
            default_tax_rate_bps: 850,
            enable_automatic_tax_calculation: true,
        }
    }
}

impl SettingsDocument for CompanySettings {
    const SECTION: &'static str = "company";

    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.company_name.trim().is_empty() {
            errors.push(ValidationError::required("company_name"));
        }
        if let Err(e) = validate_email("email", &self.email) {
            errors.push(e);
        }
        for (field, value) in [
            ("primary_color", &self.primary_color),
            ("secondary_color", &self.secondary_color),
        ] {
            if let Err(e) = validate_hex_color(field, value) {
                errors.push(e);
            }
        }
        if self.default_tax_rate_bps > TaxRate::MAX_BPS {
            errors.push(ValidationError::OutOfRange {
                field: "default_tax_rate_bps".into(),
                min: 0,
                max: TaxRate::MAX_BPS as i64,
            });
        }

        collect(errors)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A named extra field printed on invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomField {
    pub name: String,
    pub enabled: bool,
}

/// Invoice numbering, defaults, email and reminder preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct InvoiceSettings {
    pub invoice_prefix: String,
    pub next_invoice_number: i64,
    pub enable_auto_numbering: bool,
    pub reset_numbering_yearly: bool,

    pub default_due_terms: String,
    pub default_notes: String,
    pub default_terms: String,
    pub default_tax_rate_bps: u32,

    pub enable_automatic_emails: bool,
    pub default_email_subject: String,
    pub default_email_body: String,
    pub cc_emails: String,
    pub bcc_emails: String,

    pub accept_credit_cards: bool,
    pub accept_bank_transfers: bool,
    pub accept_paypal: bool,
    pub accept_cash: bool,
    pub accept_checks: bool,

    pub logo_position: String,
    pub color_scheme: String,
    pub show_paid_stamp: bool,
    pub show_signature: bool,
    pub signature_text: String,

    pub enable_payment_reminders: bool,
    /// Days after the due date; must be strictly ascending.
    pub reminder_days: Vec<u32>,
    pub reminder_email_subject: String,
    pub reminder_email_body: String,

    pub custom_fields: Vec<CustomField>,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        InvoiceSettings {
            invoice_prefix: "INV-".into(),
            next_invoice_number: 1001,
            enable_auto_numbering: true,
            reset_numbering_yearly: false,
            default_due_terms: "net30".into(),
            default_notes: "Thank you for your business!".into(),
            default_terms: "Payment is due within the specified terms.".into(),
            default_tax_rate_bps: 850,
            enable_automatic_emails: true,
            default_email_subject: "Invoice {invoice_number} from {company_name}".into(),
            default_email_body: "Dear {client_name},\n\nPlease find attached invoice {invoice_number} for {invoice_amount}.\n\nPayment is due by {due_date}.\n\nThank you for your business!\n\n{company_name}".into(),
            cc_emails: String::new(),
            bcc_emails: String::new(),
            accept_credit_cards: true,
            accept_bank_transfers: true,
            accept_paypal: true,
            accept_cash: true,
            accept_checks: true,
            logo_position: "left".into(),
            color_scheme: "blue".into(),
            show_paid_stamp: true,
            show_signature: true,
            signature_text: "Authorized Signature".into(),
            enable_payment_reminders: true,
            reminder_days: vec![3, 7, 14],
            reminder_email_subject: "Payment Reminder: Invoice {invoice_number}".into(),
            reminder_email_body: "Dear {client_name},\n\nThis is a friendly reminder that invoice {invoice_number} for {invoice_amount} is now {days_overdue} days overdue.\n\nPlease make payment at your earliest convenience.\n\nThank you,\n{company_name}".into(),
            custom_fields: vec![
                CustomField { name: "Purchase Order".into(), enabled: true },
                CustomField { name: "Project".into(), enabled: true },
                CustomField { name: "Department".into(), enabled: false },
            ],
        }
    }
}

/// Longest allowed invoice number prefix.
pub const MAX_INVOICE_PREFIX_LEN: usize = 10;

impl SettingsDocument for InvoiceSettings {
    const SECTION: &'static str = "invoice";

    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.invoice_prefix.chars().count() > MAX_INVOICE_PREFIX_LEN {
            errors.push(ValidationError::TooLong {
                field: "invoice_prefix".into(),
                max: MAX_INVOICE_PREFIX_LEN,
            });
        }
        if self.next_invoice_number < 1 {
            errors.push(ValidationError::MustBePositive {
                field: "next_invoice_number".into(),
            });
        }
        if self.default_tax_rate_bps > TaxRate::MAX_BPS {
            errors.push(ValidationError::OutOfRange {
                field: "default_tax_rate_bps".into(),
                min: 0,
                max: TaxRate::MAX_BPS as i64,
            });
        }
        if self.reminder_days.windows(2).any(|w| w[0] >= w[1]) {
            errors.push(ValidationError::Rule(
                "Reminder days must be in ascending order".into(),
            ));
        }

        collect(errors)
    }
}
