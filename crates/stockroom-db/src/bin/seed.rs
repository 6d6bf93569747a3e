//! # Seed Data Generator
//!
//! Populates a database with development data: a small category tree,
//! products in each category, a handful of suppliers and sample orders.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom_dev.db
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Running against a database that already has products does nothing.

use std::env;

use anyhow::{Context, Result};
use chrono::Utc;
use stockroom_core::input::{CategoryInput, ProductInput, SupplierInput};
use stockroom_core::order::{OrderLine, ValidatedOrder};
use stockroom_core::{
    Category, OrderStatus, PaymentMethod, Product, ProductStatus, ShippingAddress, Supplier,
    SupplierStatus, SupplierType,
};
use stockroom_db::{Database, DbConfig, ProductFilter};
use tracing_subscriber::EnvFilter;

/// `(category, [(product, sku, price cents, stock)])`
const CATALOG: &[(&str, &[(&str, &str, i64, i64)])] = &[
    (
        "Electronics",
        &[
            ("Wireless Headphones", "ELEC-HP-001", 12999, 45),
            ("Bluetooth Speaker", "ELEC-SP-002", 7999, 30),
            ("USB-C Charger", "ELEC-CH-003", 2499, 120),
            ("Smart Watch", "ELEC-SW-004", 24999, 4),
        ],
    ),
    (
        "Home & Kitchen",
        &[
            ("Ceramic Mug Set", "HOME-MG-001", 3499, 60),
            ("Chef Knife", "HOME-KN-002", 8999, 15),
            ("French Press", "HOME-FP-003", 3999, 2),
        ],
    ),
    (
        "Outdoor",
        &[
            ("Camping Tent", "OUT-TN-001", 19999, 8),
            ("Hiking Backpack", "OUT-BP-002", 11999, 22),
            ("Water Bottle", "OUT-WB-003", 1999, 0),
        ],
    ),
];

/// `(name, code, email, type, status, rating)`
const SUPPLIERS: &[(&str, &str, &str, SupplierType, SupplierStatus, f64)] = &[
    ("TechSource Manufacturing", "TSM-001", "sales@techsource.example", SupplierType::Manufacturer, SupplierStatus::Active, 4.6),
    ("Global Home Distributors", "GHD-002", "orders@globalhome.example", SupplierType::Distributor, SupplierStatus::Active, 4.2),
    ("Trailhead Wholesale", "THW-003", "hello@trailhead.example", SupplierType::Wholesaler, SupplierStatus::Pending, 3.8),
    ("QuickShip Logistics", "QSL-004", "ops@quickship.example", SupplierType::ServiceProvider, SupplierStatus::Inactive, 3.1),
];

const TAX_RATES: &[u32] = &[0, 500, 825, 1000];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./stockroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    let existing = db.products().list(&ProductFilter::default()).await?.total;
    if existing > 0 {
        println!("Database already has {existing} products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let mut products: Vec<Product> = Vec::new();

    for (index, (category_name, items)) in CATALOG.iter().enumerate() {
        let category = Category::create(
            CategoryInput {
                name: Some(category_name.to_string()),
                sort_order: Some(index as i64),
                is_featured: Some(index == 0),
                ..Default::default()
            },
            now,
        )?;
        db.categories().create(&category).await?;

        for (seed, (name, sku, price, stock)) in items.iter().enumerate() {
            let product = Product::create(
                ProductInput {
                    name: Some(name.to_string()),
                    category_id: Some(category.id.clone()),
                    sku: Some(sku.to_string()),
                    base_price_cents: Some(price * 80 / 100),
                    selling_price_cents: Some(*price),
                    cost_price_cents: Some(price * 55 / 100),
                    tax_rate_bps: Some(TAX_RATES[seed % TAX_RATES.len()]),
                    stock_quantity: Some(*stock),
                    min_stock_level: Some(5),
                    status: Some(ProductStatus::Published),
                    is_featured: Some(seed == 0),
                    ..Default::default()
                },
                now,
            )?;
            db.products().create(&product).await?;
            products.push(product);
        }
        println!("  Category {category_name}: {} products", items.len());
    }

    for (name, code, email, supplier_type, status, rating) in SUPPLIERS {
        let supplier = Supplier::create(
            SupplierInput {
                name: Some(name.to_string()),
                code: Some(code.to_string()),
                email: Some(email.to_string()),
                supplier_type: Some(*supplier_type),
                status: Some(*status),
                rating: Some(*rating),
                payment_terms: Some("Net 30".into()),
                lead_time_days: Some(14),
                ..Default::default()
            },
            now,
        )?;
        db.suppliers().create(&supplier).await?;
    }
    println!("  Suppliers: {}", SUPPLIERS.len());

    let address = ShippingAddress {
        name: "Jordan Rivera".into(),
        address_line_1: "500 Market Street".into(),
        address_line_2: Some("Suite 12".into()),
        city: "San Francisco".into(),
        state: "CA".into(),
        postal_code: "94105".into(),
        country: "USA".into(),
        phone: Some("+1 415 555 0100".into()),
    };

    let statuses = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];
    for (n, status) in statuses.iter().enumerate() {
        let lines = products
            .iter()
            .skip(n)
            .step_by(3)
            .take(2)
            .map(|p| OrderLine {
                product_id: p.id.clone(),
                quantity: (n as i64 % 3) + 1,
                unit_price_cents: p.selling_price_cents,
            })
            .collect();

        let order = db
            .orders()
            .create(ValidatedOrder {
                customer_id: format!("CUST-{:04}", n + 1),
                customer_name: Some(address.name.clone()),
                customer_email: Some(format!("customer{}@example.com", n + 1)),
                lines,
                shipping_address: address.clone(),
                billing_address: None,
                payment_method: PaymentMethod::CreditCard,
                shipping_cents: 999,
                discount_cents: 0,
                currency: "USD".into(),
                notes: None,
            })
            .await?;

        if *status != OrderStatus::Pending {
            db.orders().set_status(&order.id, *status).await?;
        }
    }
    println!("  Orders: {}", statuses.len());

    println!();
    println!("Seed complete!");
    Ok(())
}
