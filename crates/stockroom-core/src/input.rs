//! # Write Models
//!
//! Request bodies for creating and updating catalog records, plus the
//! sparse-merge rules that turn them into entities.
//!
//! ```text
//! POST body ──► XxxInput ──► Xxx::create(input, now) ──► validated record
//! PUT  body ──► XxxInput ──► record.apply(input, now) ─► validated record
//!                              (only fields present in the body change)
//! ```
//!
//! The same input type serves both verbs: on create the required fields
//! are checked for presence, on update an absent field keeps its value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::slug::{resolve_slug, slugify};
use crate::types::{
    Category, Media, MediaType, Product, ProductStatus, Supplier, SupplierStatus, SupplierType,
};
use crate::validation::{validate_product, validate_required_text, validate_supplier, ValidationResult};
use crate::{DEFAULT_CURRENCY, SYSTEM_ACTOR};

/// Overwrites `target` when the input carried a value.
fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

/// Like [`merge`] for nullable columns.
fn merge_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Category
// =============================================================================

/// Body of `POST /api/categories` and `PUT /api/categories/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct CategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl Category {
    /// Builds a new category; the slug comes from the input or the name.
    pub fn create(input: CategoryInput, now: DateTime<Utc>) -> ValidationResult<Category> {
        let name = input.name.unwrap_or_default();
        validate_required_text("name", &name, 255)?;

        let slug = resolve_slug(input.slug.as_deref(), &name);
        if slug.is_empty() {
            return Err(ValidationError::Rule("Name must contain letters or numbers".into()));
        }

        Ok(Category {
            id: new_id(),
            slug,
            name: name.trim().to_string(),
            description: input.description,
            parent_id: input.parent_id.filter(|p| !p.is_empty()),
            image_url: input.image_url,
            sort_order: input.sort_order.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            is_featured: input.is_featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
        })
    }

    /// Sparse merge. A new name without a slug regenerates the slug.
    pub fn apply(&mut self, input: CategoryInput, now: DateTime<Utc>) -> ValidationResult<()> {
        if let Some(name) = input.name {
            validate_required_text("name", &name, 255)?;
            let name = name.trim().to_string();
            if name != self.name && input.slug.is_none() {
                self.slug = slugify(&name);
            }
            self.name = name;
        }
        if let Some(slug) = input.slug.as_deref() {
            self.slug = resolve_slug(Some(slug), &self.name);
        }
        if self.slug.is_empty() {
            return Err(ValidationError::Rule("Name must contain letters or numbers".into()));
        }
        if let Some(parent) = input.parent_id {
            if parent == self.id {
                return Err(ValidationError::Rule("A category cannot be its own parent".into()));
            }
            self.parent_id = Some(parent).filter(|p| !p.is_empty());
        }

        merge_opt(&mut self.description, input.description);
        merge_opt(&mut self.image_url, input.image_url);
        merge(&mut self.sort_order, input.sort_order);
        merge(&mut self.is_active, input.is_active);
        merge(&mut self.is_featured, input.is_featured);
        self.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Product
// =============================================================================

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub base_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
    pub cost_price_cents: Option<i64>,
    pub discount_bps: Option<u32>,
    pub tax_rate_bps: Option<u32>,
    pub stock_quantity: Option<i64>,
    pub min_stock_level: Option<i64>,
    pub max_stock_level: Option<i64>,
    pub track_inventory: Option<bool>,
    pub status: Option<ProductStatus>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub requires_shipping: Option<bool>,
    pub weight_grams: Option<i64>,
    pub featured_image_url: Option<String>,
    pub gallery_images: Option<Vec<String>>,
    pub meta_keywords: Option<Vec<String>>,
    #[ts(type = "Record<string, unknown> | null")]
    pub attributes: Option<serde_json::Value>,
}

impl Product {
    /// Builds and validates a new product.
    ///
    /// ## Errors
    /// - Missing name, category, base or selling price (one combined message)
    /// - Any rule in [`validate_product`]
    pub fn create(input: ProductInput, now: DateTime<Utc>) -> ValidationResult<Product> {
        let (Some(name), Some(category_id), Some(base), Some(selling)) = (
            input.name.filter(|n| !n.trim().is_empty()),
            input.category_id.filter(|c| !c.trim().is_empty()),
            input.base_price_cents,
            input.selling_price_cents,
        ) else {
            return Err(ValidationError::Rule(
                "Name, category_id, base_price, and selling_price are required".into(),
            ));
        };

        let name = name.trim().to_string();
        let product = Product {
            id: new_id(),
            slug: resolve_slug(input.slug.as_deref(), &name),
            name,
            description: input.description,
            category_id,
            sku: input.sku.filter(|s| !s.is_empty()),
            barcode: input.barcode,
            brand: input.brand,
            base_price_cents: base,
            selling_price_cents: selling,
            cost_price_cents: input.cost_price_cents,
            discount_bps: input.discount_bps.unwrap_or(0),
            tax_rate_bps: input.tax_rate_bps.unwrap_or(0),
            stock_quantity: input.stock_quantity.unwrap_or(0),
            min_stock_level: input.min_stock_level.unwrap_or(0),
            max_stock_level: input.max_stock_level,
            track_inventory: input.track_inventory.unwrap_or(true),
            status: input.status.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
            is_featured: input.is_featured.unwrap_or(false),
            is_digital: input.is_digital.unwrap_or(false),
            requires_shipping: input.requires_shipping.unwrap_or(true),
            weight_grams: input.weight_grams,
            featured_image_url: input.featured_image_url,
            gallery_images: input.gallery_images.unwrap_or_default(),
            meta_keywords: input.meta_keywords.unwrap_or_default(),
            attributes: input
                .attributes
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            created_at: now,
            updated_at: now,
        };

        validate_product(&product)?;
        Ok(product)
    }

    /// Sparse merge, then the full product rules on the merged record.
    pub fn apply(&mut self, input: ProductInput, now: DateTime<Utc>) -> ValidationResult<()> {
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name != self.name && input.slug.is_none() {
                self.slug = slugify(&name);
            }
            self.name = name;
        }
        if let Some(slug) = input.slug.as_deref() {
            self.slug = resolve_slug(Some(slug), &self.name);
        }

        merge_opt(&mut self.description, input.description);
        merge(&mut self.category_id, input.category_id);
        merge_opt(&mut self.sku, input.sku.filter(|s| !s.is_empty()));
        merge_opt(&mut self.barcode, input.barcode);
        merge_opt(&mut self.brand, input.brand);
        merge(&mut self.base_price_cents, input.base_price_cents);
        merge(&mut self.selling_price_cents, input.selling_price_cents);
        merge_opt(&mut self.cost_price_cents, input.cost_price_cents);
        merge(&mut self.discount_bps, input.discount_bps);
        merge(&mut self.tax_rate_bps, input.tax_rate_bps);
        merge(&mut self.stock_quantity, input.stock_quantity);
        merge(&mut self.min_stock_level, input.min_stock_level);
        merge_opt(&mut self.max_stock_level, input.max_stock_level);
        merge(&mut self.track_inventory, input.track_inventory);
        merge(&mut self.status, input.status);
        merge(&mut self.is_active, input.is_active);
        merge(&mut self.is_featured, input.is_featured);
        merge(&mut self.is_digital, input.is_digital);
        merge(&mut self.requires_shipping, input.requires_shipping);
        merge_opt(&mut self.weight_grams, input.weight_grams);
        merge_opt(&mut self.featured_image_url, input.featured_image_url);
        merge(&mut self.gallery_images, input.gallery_images);
        merge(&mut self.meta_keywords, input.meta_keywords);
        merge(&mut self.attributes, input.attributes);
        self.updated_at = now;

        validate_product(self)
    }
}

// =============================================================================
// Media
// =============================================================================

/// An uploaded file that has been written under the media root.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMedia {
    pub file_name: String,
    /// Path relative to the media root.
    pub file_path: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size_bytes: i64,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Body of `PUT /api/media/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct MediaPatch {
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub display_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl Media {
    /// Builds a media row for `product_id`.
    pub fn create(
        product_id: &str,
        input: NewMedia,
        url: String,
        display_order: i64,
        is_primary: bool,
        now: DateTime<Utc>,
    ) -> ValidationResult<Media> {
        validate_required_text("file_name", &input.file_name, 255)?;
        validate_required_text("file_path", &input.file_path, 1024)?;
        if input.file_size_bytes < 0 {
            return Err(ValidationError::Rule("File size cannot be negative".into()));
        }

        Ok(Media {
            id: new_id(),
            product_id: product_id.to_string(),
            file_name: input.file_name,
            file_path: input.file_path,
            url,
            media_type: input.media_type,
            mime_type: input.mime_type,
            file_size_bytes: input.file_size_bytes,
            alt_text: input.alt_text,
            caption: input.caption,
            is_primary,
            display_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: MediaPatch, now: DateTime<Utc>) {
        merge_opt(&mut self.alt_text, patch.alt_text);
        merge_opt(&mut self.caption, patch.caption);
        merge(&mut self.display_order, patch.display_order);
        merge(&mut self.is_active, patch.is_active);
        self.updated_at = now;
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// Body of `POST /api/suppliers` and `PUT /api/suppliers/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct SupplierInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub business_registration: Option<String>,
    pub business_type: Option<String>,
    pub primary_contact_name: Option<String>,
    pub primary_contact_email: Option<String>,
    pub primary_contact_phone: Option<String>,
    pub payment_terms: Option<String>,
    pub credit_limit_cents: Option<i64>,
    pub currency: Option<String>,
    pub rating: Option<f64>,
    pub lead_time_days: Option<i64>,
    pub minimum_order_cents: Option<i64>,
    pub status: Option<SupplierStatus>,
    pub supplier_type: Option<SupplierType>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub created_by: Option<String>,
}

/// Business type recorded when none is given.
pub const DEFAULT_BUSINESS_TYPE: &str = "corporation";

impl Supplier {
    /// Builds a supplier with defaults for everything optional.
    pub fn create(input: SupplierInput, now: DateTime<Utc>) -> ValidationResult<Supplier> {
        let (Some(name), Some(email)) = (
            input.name.filter(|n| !n.trim().is_empty()),
            input.email.filter(|e| !e.trim().is_empty()),
        ) else {
            return Err(ValidationError::Rule("Name and email are required".into()));
        };

        let supplier = Supplier {
            id: new_id(),
            name: name.trim().to_string(),
            code: input.code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            email: email.trim().to_string(),
            phone: input.phone,
            website: input.website,
            address_line_1: input.address_line_1,
            address_line_2: input.address_line_2,
            city: input.city,
            state: input.state,
            postal_code: input.postal_code,
            country: input.country,
            tax_id: input.tax_id,
            business_registration: input.business_registration,
            business_type: input
                .business_type
                .unwrap_or_else(|| DEFAULT_BUSINESS_TYPE.to_string()),
            primary_contact_name: input.primary_contact_name,
            primary_contact_email: input.primary_contact_email,
            primary_contact_phone: input.primary_contact_phone,
            payment_terms: input.payment_terms,
            credit_limit_cents: input.credit_limit_cents,
            currency: input.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            rating: input.rating,
            lead_time_days: input.lead_time_days,
            minimum_order_cents: input.minimum_order_cents,
            status: input.status.unwrap_or_default(),
            supplier_type: input.supplier_type.unwrap_or_default(),
            category: input.category,
            notes: input.notes,
            internal_notes: input.internal_notes,
            created_by: input.created_by.unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
            created_at: now,
            updated_at: now,
        };

        validate_supplier(&supplier)?;
        Ok(supplier)
    }

    /// Sparse merge. `created_by` never changes after creation.
    pub fn apply(&mut self, input: SupplierInput, now: DateTime<Utc>) -> ValidationResult<()> {
        merge(&mut self.name, input.name.map(|n| n.trim().to_string()));
        merge_opt(&mut self.code, input.code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()));
        merge(&mut self.email, input.email.map(|e| e.trim().to_string()));
        merge_opt(&mut self.phone, input.phone);
        merge_opt(&mut self.website, input.website);
        merge_opt(&mut self.address_line_1, input.address_line_1);
        merge_opt(&mut self.address_line_2, input.address_line_2);
        merge_opt(&mut self.city, input.city);
        merge_opt(&mut self.state, input.state);
        merge_opt(&mut self.postal_code, input.postal_code);
        merge_opt(&mut self.country, input.country);
        merge_opt(&mut self.tax_id, input.tax_id);
        merge_opt(&mut self.business_registration, input.business_registration);
        merge(&mut self.business_type, input.business_type);
        merge_opt(&mut self.primary_contact_name, input.primary_contact_name);
        merge_opt(&mut self.primary_contact_email, input.primary_contact_email);
        merge_opt(&mut self.primary_contact_phone, input.primary_contact_phone);
        merge_opt(&mut self.payment_terms, input.payment_terms);
        merge_opt(&mut self.credit_limit_cents, input.credit_limit_cents);
        merge(&mut self.currency, input.currency);
        merge_opt(&mut self.rating, input.rating);
        merge_opt(&mut self.lead_time_days, input.lead_time_days);
        merge_opt(&mut self.minimum_order_cents, input.minimum_order_cents);
        merge(&mut self.status, input.status);
        merge(&mut self.supplier_type, input.supplier_type);
        merge_opt(&mut self.category, input.category);
        merge_opt(&mut self.notes, input.notes);
        merge_opt(&mut self.internal_notes, input.internal_notes);
        self.updated_at = now;

        validate_supplier(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
